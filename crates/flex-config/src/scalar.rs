//! Cell values and single-row records.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A single cell of a [`TabularDocument`](crate::TabularDocument).
#[derive(Debug, Clone, Default)]
pub enum Scalar {
    /// Placeholder for a column the row never set.
    #[default]
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

static MISSING: Scalar = Scalar::Missing;

impl Scalar {
    pub fn is_missing(&self) -> bool {
        matches!(self, Scalar::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric view; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Parses a text cell as written by the text codecs. Empty text is
    /// missing; a leading [`TEXT_QUOTE`] marks a string kept verbatim.
    pub fn parse_text(text: &str) -> Scalar {
        if text.is_empty() {
            return Scalar::Missing;
        }
        if let Some(verbatim) = text.strip_prefix(TEXT_QUOTE) {
            return Scalar::Str(verbatim.to_string());
        }
        Self::infer_text(text)
    }

    fn infer_text(text: &str) -> Scalar {
        match text {
            "true" => return Scalar::Bool(true),
            "false" => return Scalar::Bool(false),
            _ => {}
        }
        if let Ok(value) = text.parse::<i64>() {
            return Scalar::Int(value);
        }
        if let Ok(value) = text.parse::<f64>() {
            return Scalar::Float(value);
        }
        Scalar::Str(text.to_string())
    }

    /// Text form understood by [`Scalar::parse_text`]. Floats keep a fractional
    /// part or exponent so they do not come back as integers. Strings that
    /// would read back as another value (`""`, `"true"`, `"0042"`, `"nan"`, or
    /// anything starting with the quote) are prefixed with [`TEXT_QUOTE`].
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Missing => String::new(),
            Scalar::Bool(value) => value.to_string(),
            Scalar::Int(value) => value.to_string(),
            Scalar::Float(value) => format!("{value:?}"),
            Scalar::Str(value) => {
                let plain = !value.is_empty()
                    && !value.starts_with(TEXT_QUOTE)
                    && matches!(Self::infer_text(value), Scalar::Str(_));
                if plain {
                    value.clone()
                } else {
                    format!("{TEXT_QUOTE}{value}")
                }
            }
        }
    }
}

/// Marks a text cell whose remainder is a string, never a number or bool.
pub const TEXT_QUOTE: char = '\'';

impl PartialEq for Scalar {
    /// Floats compare by bit pattern, with every NaN equal to every other NaN.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Missing, Scalar::Missing) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Missing => f.write_str("NaN"),
            Scalar::Str(value) => f.write_str(value),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Missing, Into::into)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Missing => serializer.serialize_none(),
            Scalar::Bool(value) => serializer.serialize_bool(*value),
            Scalar::Int(value) => serializer.serialize_i64(*value),
            Scalar::Float(value) => serializer.serialize_f64(*value),
            Scalar::Str(value) => serializer.serialize_str(value),
        }
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, a number or a string")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Scalar, E> {
        Ok(Scalar::Missing)
    }

    fn visit_none<E: de::Error>(self) -> Result<Scalar, E> {
        Ok(Scalar::Missing)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Scalar, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Scalar, E> {
        Ok(Scalar::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Scalar, E> {
        Ok(Scalar::Int(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Scalar, E> {
        Ok(i64::try_from(value).map_or(Scalar::Float(value as f64), Scalar::Int))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Scalar, E> {
        Ok(Scalar::Float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Scalar, E> {
        Ok(Scalar::Str(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Scalar, E> {
        Ok(Scalar::Str(value))
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// One row: ordered column name to value mapping.
///
/// Equality is field equality. A key holding [`Scalar::Missing`] equals an
/// absent key, and key order is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Scalar>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a field, returning the previous value. Existing keys keep their position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.0.get(key)
    }

    /// Like [`Record::get`] but absent keys read as [`Scalar::Missing`].
    pub fn field(&self, key: &str) -> &Scalar {
        self.0.get(key).unwrap_or(&MISSING)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlays `other` on a copy of `self`: new keys are appended, existing keys overwritten.
    pub fn merged(&self, other: &Record) -> Record {
        let mut merged = self.clone();
        for (key, value) in &other.0 {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.0.iter().all(|(key, value)| other.field(key) == value)
            && other.0.iter().all(|(key, value)| self.field(key) == value)
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Record {
    type Item = (String, Scalar);
    type IntoIter = indexmap::map::IntoIter<String, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<IndexMap<String, Scalar>> for Record {
    fn from(map: IndexMap<String, Scalar>) -> Self {
        Record(map)
    }
}
