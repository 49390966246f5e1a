//! A `serde::Deserializer` over `&Value`, so a caller can deserialize
//! straight into a typed Rust struct instead of walking the value tree by
//! hand: `let cfg: MyConfig = liteyaml::from_str(text)?;`.
//!
//! Structurally this mirrors the teacher crate's `Yaml` deserializer; the
//! main simplification is that [`Value::Float`] already holds an `f64`
//! rather than the teacher's string-backed `Real` variant.

use crate::error::Error;
use crate::value::Value;
use serde::de::{
    self, DeserializeOwned, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};

/// Parse `text` and deserialize the result into `T`.
pub fn from_str<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    let value = crate::document::parse(text)?;
    T::deserialize(ValueDeserializer::new(&value))
}

/// Parse `bytes` as UTF-8 YAML and deserialize the result into `T`.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::Custom(e.to_string()))?;
    from_str(text)
}

pub struct ValueDeserializer<'de> {
    value: &'de Value,
}

impl<'de> ValueDeserializer<'de> {
    #[inline]
    pub fn new(value: &'de Value) -> Self {
        ValueDeserializer { value }
    }
}

#[inline]
fn visit_integer<'de, V: Visitor<'de>>(value: i64, visitor: V) -> Result<V::Value, Error> {
    if value < 0 {
        if value >= i8::MIN as i64 {
            visitor.visit_i8(value as i8)
        } else if value >= i16::MIN as i64 {
            visitor.visit_i16(value as i16)
        } else if value >= i32::MIN as i64 {
            visitor.visit_i32(value as i32)
        } else {
            visitor.visit_i64(value)
        }
    } else if value <= u8::MAX as i64 {
        visitor.visit_u8(value as u8)
    } else if value <= u16::MAX as i64 {
        visitor.visit_u16(value as u16)
    } else if value <= u32::MAX as i64 {
        visitor.visit_u32(value as u32)
    } else {
        visitor.visit_u64(value as u64)
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    #[inline]
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Int(i) => visit_integer(*i, visitor),
            Value::Float(f) => visitor.visit_f64(*f),
            Value::Timestamp(t) => visitor.visit_i64(*t),
            Value::String(s) => visitor.visit_str(s),
            Value::Sequence(_) => self.deserialize_seq(visitor),
            Value::Mapping(_) => self.deserialize_map(visitor),
        }
    }

    #[inline]
    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(*b),
            _ => Err(Error::Custom("expected boolean".into())),
        }
    }

    #[inline]
    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= i8::MIN as i64 && *i <= i8::MAX as i64 => {
                visitor.visit_i8(*i as i8)
            }
            _ => Err(Error::Custom("expected an i8-range integer".into())),
        }
    }

    #[inline]
    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= i16::MIN as i64 && *i <= i16::MAX as i64 => {
                visitor.visit_i16(*i as i16)
            }
            _ => Err(Error::Custom("expected an i16-range integer".into())),
        }
    }

    #[inline]
    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= i32::MIN as i64 && *i <= i32::MAX as i64 => {
                visitor.visit_i32(*i as i32)
            }
            _ => Err(Error::Custom("expected an i32-range integer".into())),
        }
    }

    #[inline]
    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) => visitor.visit_i64(*i),
            Value::Timestamp(t) => visitor.visit_i64(*t),
            _ => Err(Error::Custom("expected integer".into())),
        }
    }

    #[inline]
    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= 0 && *i <= u8::MAX as i64 => visitor.visit_u8(*i as u8),
            _ => Err(Error::Custom("expected a u8-range integer".into())),
        }
    }

    #[inline]
    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= 0 && *i <= u16::MAX as i64 => visitor.visit_u16(*i as u16),
            _ => Err(Error::Custom("expected a u16-range integer".into())),
        }
    }

    #[inline]
    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= 0 && *i <= u32::MAX as i64 => visitor.visit_u32(*i as u32),
            _ => Err(Error::Custom("expected a u32-range integer".into())),
        }
    }

    #[inline]
    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= 0 => visitor.visit_u64(*i as u64),
            _ => Err(Error::Custom("expected a non-negative integer".into())),
        }
    }

    #[inline]
    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Float(f) => visitor.visit_f32(*f as f32),
            Value::Int(i) => visitor.visit_f32(*i as f32),
            _ => Err(Error::Custom("expected a number".into())),
        }
    }

    #[inline]
    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Float(f) => visitor.visit_f64(*f),
            Value::Int(i) => visitor.visit_f64(*i as f64),
            _ => Err(Error::Custom("expected a number".into())),
        }
    }

    #[inline]
    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => {
                let mut chars = s.chars();
                if let Some(ch) = chars.next()
                    && chars.next().is_none()
                {
                    return visitor.visit_char(ch);
                }
                Err(Error::Custom("string is not a single character".into()))
            }
            _ => Err(Error::Custom("expected string".into())),
        }
    }

    #[inline]
    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_str(s),
            Value::Int(i) => visitor.visit_str(&i.to_string()),
            Value::Float(f) => visitor.visit_str(&f.to_string()),
            Value::Bool(b) => visitor.visit_str(if *b { "true" } else { "false" }),
            Value::Null => visitor.visit_str(""),
            _ => Err(Error::Custom("cannot convert to string".into())),
        }
    }

    #[inline]
    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    #[inline]
    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_bytes(s.as_bytes()),
            _ => Err(Error::Custom("expected string for bytes".into())),
        }
    }

    #[inline]
    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    #[inline]
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    #[inline]
    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(Error::Custom("expected null for unit".into())),
        }
    }

    #[inline]
    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    #[inline]
    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    #[inline]
    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Sequence(seq) => visitor.visit_seq(SeqDeserializer::new(seq.iter())),
            Value::Null => visitor.visit_seq(SeqDeserializer::new([].iter())),
            _ => Err(Error::Custom("expected sequence".into())),
        }
    }

    #[inline]
    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    #[inline]
    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    #[inline]
    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Mapping(map) => visitor.visit_map(MapDeserializer::new(map.iter())),
            Value::Null => {
                let empty: &[(&Value, &Value)] = &[];
                visitor.visit_map(MapDeserializer::new(empty.iter().copied()))
            }
            _ => Err(Error::Custom("expected mapping".into())),
        }
    }

    #[inline]
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    #[inline]
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(StringEnumDeserializer::new(s)),
            Value::Mapping(map) if map.len() == 1 => {
                let (key, value) = map
                    .iter()
                    .next()
                    .ok_or_else(|| Error::Custom("empty enum map".into()))?;
                visitor.visit_enum(MapEnumDeserializer::new(key, value))
            }
            _ => Err(Error::Custom(
                "expected string or single-entry map for enum".into(),
            )),
        }
    }

    #[inline]
    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    #[inline]
    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    #[inline]
    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) => visitor.visit_i128(*i as i128),
            _ => Err(Error::Custom("expected integer".into())),
        }
    }

    #[inline]
    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) if *i >= 0 => visitor.visit_u128(*i as u128),
            _ => Err(Error::Custom("expected a non-negative integer".into())),
        }
    }
}

pub struct SeqDeserializer<'de, I> {
    iter: I,
    _phantom: std::marker::PhantomData<&'de ()>,
}

impl<'de, I> SeqDeserializer<'de, I> {
    #[inline]
    fn new(iter: I) -> Self {
        SeqDeserializer {
            iter,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<'de, I> SeqAccess<'de> for SeqDeserializer<'de, I>
where
    I: Iterator<Item = &'de Value>,
{
    type Error = Error;

    #[inline]
    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

pub struct MapDeserializer<'de, I> {
    iter: I,
    next_value: Option<&'de Value>,
    _phantom: std::marker::PhantomData<&'de ()>,
}

impl<'de, I> MapDeserializer<'de, I> {
    #[inline]
    fn new(iter: I) -> Self {
        MapDeserializer {
            iter,
            next_value: None,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<'de, I> MapAccess<'de> for MapDeserializer<'de, I>
where
    I: Iterator<Item = (&'de Value, &'de Value)>,
{
    type Error = Error;

    #[inline]
    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.next_value = Some(value);
                seed.deserialize(ValueDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    #[inline]
    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.next_value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::Custom("no value available".into())),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

pub struct StringEnumDeserializer<'de> {
    value: &'de str,
}

impl<'de> StringEnumDeserializer<'de> {
    #[inline]
    fn new(value: &'de str) -> Self {
        StringEnumDeserializer { value }
    }
}

impl<'de> EnumAccess<'de> for StringEnumDeserializer<'de> {
    type Error = Error;
    type Variant = UnitVariantDeserializer;

    #[inline]
    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        use serde::de::value::StrDeserializer;
        let deserializer: StrDeserializer<Error> = self.value.into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, UnitVariantDeserializer))
    }
}

pub struct MapEnumDeserializer<'de> {
    key: &'de Value,
    value: &'de Value,
}

impl<'de> MapEnumDeserializer<'de> {
    #[inline]
    fn new(key: &'de Value, value: &'de Value) -> Self {
        MapEnumDeserializer { key, value }
    }
}

impl<'de> EnumAccess<'de> for MapEnumDeserializer<'de> {
    type Error = Error;
    type Variant = ValueDeserializer<'de>;

    #[inline]
    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(self.key))?;
        Ok((variant, ValueDeserializer::new(self.value)))
    }
}

pub struct UnitVariantDeserializer;

impl<'de> VariantAccess<'de> for UnitVariantDeserializer {
    type Error = Error;

    #[inline]
    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    #[inline]
    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        Err(Error::Custom("unit variant cannot be newtype".into()))
    }

    #[inline]
    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::Custom("unit variant cannot be tuple".into()))
    }

    #[inline]
    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::Custom("unit variant cannot be struct".into()))
    }
}

impl<'de> VariantAccess<'de> for ValueDeserializer<'de> {
    type Error = Error;

    #[inline]
    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            Value::Null => Ok(()),
            _ => Err(Error::Custom("expected null for unit variant".into())),
        }
    }

    #[inline]
    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    #[inline]
    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    #[inline]
    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        count: i32,
        enabled: bool,
        tags: Vec<String>,
    }

    #[test]
    fn deserializes_a_struct() {
        let cfg: Config = from_str(
            "name: widget\ncount: 3\nenabled: true\ntags:\n  - a\n  - b\n",
        )
        .unwrap();
        assert_eq!(
            cfg,
            Config {
                name: "widget".into(),
                count: 3,
                enabled: true,
                tags: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn deserializes_nested_maps() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Outer {
            inner: Inner,
        }
        #[derive(Deserialize, Debug, PartialEq)]
        struct Inner {
            value: i32,
        }
        let out: Outer = from_str("inner:\n  value: 5\n").unwrap();
        assert_eq!(out, Outer { inner: Inner { value: 5 } });
    }
}
