//! The scalar evaluator: a pure function from a trimmed string to a [`Value`].
//!
//! Rule order is observable behavior (§4.1 of the spec this module
//! implements) and must not be reordered — an all-digit string with a
//! leading zero becomes an octal `Int`, not a decimal one, for instance.

use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

const TRUTHY: &[&str] = &["true", "on", "+", "yes", "y"];
const FALSY: &[&str] = &["false", "off", "-", "no", "n"];

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^
        (?P<year>[0-9][0-9][0-9][0-9])
        -(?P<month>[0-9][0-9]?)
        -(?P<day>[0-9][0-9]?)
        (?:
            (?:[Tt]|[ \t]+)
            (?P<hour>[0-9][0-9]?)
            :(?P<minute>[0-9][0-9])
            :(?P<second>[0-9][0-9])
            (?:\.(?P<fraction>[0-9]*))?
            (?:[ \t]*(?P<tz>Z|[+-][0-9][0-9]?(?::[0-9][0-9])?))?
        )?
        $",
    )
    .expect("static timestamp pattern is valid")
});

static COMMA_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]{1,3}(,[0-9]{3})*(\.[0-9]*)?$").expect("static pattern is valid")
});

fn eq_ignore_case_in(s: &str, set: &[&str]) -> bool {
    set.iter().any(|candidate| s.eq_ignore_ascii_case(candidate))
}

/// Evaluate an already-trimmed scalar string into a typed [`Value`].
#[must_use]
pub fn evaluate(s: &str) -> Value {
    // 1. null
    if s.is_empty() || s == "~" || s.eq_ignore_ascii_case("null") {
        return Value::Null;
    }

    // 2. explicit `!str` tag
    if let Some(rest) = s.strip_prefix("!str") {
        return Value::String(rest.to_owned());
    }

    // 3. explicit `! ` integer tag
    if let Some(rest) = s.strip_prefix("! ") {
        if let Ok(i) = rest.trim().parse::<i64>() {
            return Value::Int(i);
        }
        return Value::String(s.to_owned());
    }

    // 4. all-ASCII-digits: octal (leading zero, len > 1) or decimal, else String
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        if s.len() > 1 && s.starts_with('0') {
            if let Ok(i) = i64::from_str_radix(s, 8) {
                return Value::Int(i);
            }
            return Value::String(s.to_owned());
        }
        if let Ok(i) = s.parse::<i64>()
            && i.to_string() == s
        {
            return Value::Int(i);
        }
        return Value::String(s.to_owned());
    }

    // 5 / 6. truthy / falsy sets (includes the lone `+` / `-` boundary case)
    if eq_ignore_case_in(s, TRUTHY) {
        return Value::Bool(true);
    }
    if eq_ignore_case_in(s, FALSY) {
        return Value::Bool(false);
    }

    // 7. hex literal -> Int, else a locale-insensitive numeric -> Float
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
        && let Ok(i) = i64::from_str_radix(rest, 16)
    {
        return Value::Int(i);
    }
    if let Some(rest) = s.strip_prefix("-0x").or_else(|| s.strip_prefix("-0X"))
        && let Ok(i) = i64::from_str_radix(rest, 16)
    {
        return Value::Int(-i);
    }

    // 7 (cont'd). any other locale-insensitive numeric literal -> Float
    if looks_numeric(s)
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }

    // 8. .inf / .nan -> +infinity (treat both as "unbounded positive" rather than introducing NaN)
    let unsigned = s.strip_prefix('+').unwrap_or(s);
    if unsigned.eq_ignore_ascii_case(".inf") || unsigned.eq_ignore_ascii_case(".nan") {
        return Value::Float(f64::INFINITY);
    }

    // 9. -.inf -> -infinity
    if s.eq_ignore_ascii_case("-.inf") {
        return Value::Float(f64::NEG_INFINITY);
    }

    // 10. signed decimal with comma thousands separators -> Float
    if COMMA_FLOAT_RE.is_match(s) {
        let stripped: String = s.chars().filter(|&c| c != ',').collect();
        if let Ok(f) = stripped.parse::<f64>() {
            return Value::Float(f);
        }
    }

    // 11. ISO-8601-ish timestamp -> epoch seconds
    if let Some(ts) = parse_timestamp(s) {
        return Value::Timestamp(ts);
    }

    // 12. otherwise, String
    Value::String(s.to_owned())
}

/// A cheap pre-filter so we don't hand every plain string to `f64::parse`
/// (which accepts things like `"inf"`/`"nan"` bare that rules 8/9 already
/// special-cased under their dotted spellings).
fn looks_numeric(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '+' || c == '-')
        && s.chars().any(|c| c.is_ascii_digit())
}

fn parse_timestamp(s: &str) -> Option<i64> {
    let caps = TIMESTAMP_RE.captures(s)?;
    let year: i64 = caps.name("year")?.as_str().parse().ok()?;
    let month: i64 = caps.name("month")?.as_str().parse().ok()?;
    let day: i64 = caps.name("day")?.as_str().parse().ok()?;
    let hour: i64 = caps
        .name("hour")
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    let minute: i64 = caps
        .name("minute")
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    let second: i64 = caps
        .name("second")
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;

    let days = days_from_civil(year, month, day);
    let mut epoch = days * 86_400 + hour * 3600 + minute * 60 + second;

    if let Some(tz) = caps.name("tz") {
        let tz = tz.as_str();
        if tz != "Z" && tz != "z" {
            let sign = if tz.starts_with('-') { -1 } else { 1 };
            let rest = &tz[1..];
            let mut parts = rest.split(':');
            let tz_hour: i64 = parts.next()?.parse().ok()?;
            let tz_min: i64 = parts.next().map_or(Ok(0), str::parse).ok()?;
            epoch -= sign * (tz_hour * 3600 + tz_min * 60);
        }
    }

    Some(epoch)
}

/// Howard Hinnant's days-from-civil algorithm, proleptic Gregorian, epoch
/// 1970-01-01. Avoids pulling in a calendar crate for a single conversion.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}
