//! Log records and their fields.

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::fmt;
use std::panic::Location;

use super::level::Level;

/// Scalar value attached to a record field.
///
/// Anything that is not a scalar is carried as text (see [`FieldValue::display`]),
/// so every value can always be encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text, also the fallback for non-scalar values.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point; non-finite values encode as strings.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// JSON `null`.
    Null,
}

impl FieldValue {
    /// Stringify any displayable value.
    pub fn display(value: impl fmt::Display) -> Self {
        Self::Str(value.to_string())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Uint(u) => serializer.serialize_u64(*u),
            // JSON has no NaN or infinity
            Self::Float(f) if !f.is_finite() => serializer.serialize_str(&f.to_string()),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_unit(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
        }
    }
}

macro_rules! field_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for FieldValue {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

field_from!(Int as i64: i8, i16, i32, i64);
field_from!(Uint as u64: u8, u16, u32, u64);
field_from!(Float as f64: f32, f64);
field_from!(Bool as bool: bool);
field_from!(Str as String: String, &str, char);

impl From<isize> for FieldValue {
    fn from(value: isize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::display(value), Self::Int)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        u64::try_from(value).map_or_else(|_| Self::display(value), Self::Uint)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered key/value pairs attached to a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, FieldValue)>);

impl Fields {
    /// Empty field list.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field, keeping insertion order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.push((key.into(), value.into()));
    }

    /// Builder-style [`Fields::push`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Several displayable values rendered as one space-separated message.
///
/// Built by the [`values!`](crate::values) macro for the plain multi-value form.
pub struct Values<'a>(pub &'a [&'a dyn fmt::Display]);

impl fmt::Display for Values<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Source location of the code that emitted a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file.
    pub file: &'static str,
    /// Line within `file`.
    pub line: u32,
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single log record.
///
/// Built once per emission and never modified afterwards; fields are only
/// reachable through accessors.
#[derive(Debug, Clone)]
pub struct Record {
    timestamp: DateTime<Local>,
    level: Level,
    message: String,
    fields: Fields,
    caller: Option<CallSite>,
}

impl Record {
    /// Record stamped at `timestamp`.
    pub fn new(
        timestamp: DateTime<Local>,
        level: Level,
        message: impl Into<String>,
        fields: Fields,
        caller: Option<CallSite>,
    ) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            fields,
            caller,
        }
    }

    /// Emission time.
    pub const fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }

    /// Severity.
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Extra key/value pairs.
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Call site, when caller capture is enabled.
    pub const fn caller(&self) -> Option<CallSite> {
        self.caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_insertion_order() {
        let fields = Fields::new()
            .with("zeta", 1)
            .with("alpha", "two")
            .with("mid", true);

        let keys: Vec<_> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(fields.get("alpha"), Some(&FieldValue::Str("two".to_string())));
    }

    #[test]
    fn test_option_and_wide_integers_convert() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(7u8)), FieldValue::Uint(7));
        assert_eq!(FieldValue::from(-3isize), FieldValue::Int(-3));
        assert_eq!(FieldValue::from(3usize), FieldValue::Uint(3));
    }

    #[test]
    fn test_non_finite_float_serializes_as_text() {
        let json = serde_json::to_string(&FieldValue::Float(f64::NAN)).unwrap();
        assert_eq!(json, "\"NaN\"");
        let json = serde_json::to_string(&FieldValue::Float(f64::INFINITY)).unwrap();
        assert_eq!(json, "\"inf\"");
    }

    #[test]
    fn test_values_join_with_spaces() {
        let code = 42;
        let rendered = Values(&[&"request", &code, &'!']).to_string();
        assert_eq!(rendered, "request 42 !");
        assert_eq!(Values(&[]).to_string(), "");
    }

    #[test]
    fn test_call_site_from_location() {
        let site = CallSite::from(Location::caller());
        assert!(site.line > 0);
        assert!(site.to_string().contains(':'));
    }
}
