use convert_case::{Case, Casing};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::str::FromStr;

///
/// FieldPath
///
/// Dotted document path in canonical form. Every segment is camelCase;
/// segments starting with `_` and purely numeric (positional) segments are
/// kept verbatim.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Canonicalize a raw path, or describe why it is not one.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("field path is empty".to_string());
        }

        let segments = raw
            .split('.')
            .map(canonical_segment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(segments.join(".")))
    }

    /// Wrap a path that is already canonical, such as a static table entry.
    pub(crate) fn from_canonical(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        debug_assert_eq!(Self::parse(&raw).as_ref().map(Self::as_str), Ok(raw.as_str()));

        Self(raw)
    }

    /// `self` followed by the segments of `child`.
    #[must_use]
    pub fn join(&self, child: &Self) -> Self {
        Self(format!("{}.{}", self.0, child.0))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First segment, the top-level property the path lives under.
    #[must_use]
    pub fn root(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Whether `self` equals `other` or lies underneath it.
    #[must_use]
    pub fn starts_with(&self, other: &Self) -> bool {
        self.0 == other.0
            || self
                .0
                .strip_prefix(other.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

fn canonical_segment(segment: &str) -> Result<String, String> {
    let Some(first) = segment.chars().next() else {
        return Err("field path has an empty segment".to_string());
    };

    if let Some(bad) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(format!("invalid character '{bad}' in field segment '{segment}'"));
    }

    if first == '_' || segment.chars().all(|c| c.is_ascii_digit()) {
        return Ok(segment.to_string());
    }

    if !first.is_ascii_alphabetic() {
        return Err(format!("field segment '{segment}' must start with a letter"));
    }

    Ok(segment.to_case(Case::Camel))
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_camel_cased() {
        for (raw, expected) in [
            ("Name", "name"),
            ("CreatedAt", "createdAt"),
            ("created_at", "createdAt"),
            ("createdAt", "createdAt"),
            ("Address.PostCode", "address.postCode"),
        ] {
            assert_eq!(FieldPath::parse(raw).unwrap().as_str(), expected, "{raw}");
        }
    }

    #[test]
    fn underscore_and_positional_segments_are_verbatim() {
        assert_eq!(FieldPath::parse("_id").unwrap().as_str(), "_id");
        assert_eq!(FieldPath::parse("Tags.0").unwrap().as_str(), "tags.0");
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for raw in ["", "a..b", "a.", "1abc", "na-me", "a b", "$where"] {
            assert!(FieldPath::parse(raw).is_err(), "{raw:?}");
        }
    }

    #[test]
    fn prefix_matching_respects_segments() {
        let path = FieldPath::parse("address.postCode").unwrap();
        let root = FieldPath::parse("address").unwrap();
        let other = FieldPath::parse("addr").unwrap();

        assert!(path.starts_with(&root));
        assert!(!path.starts_with(&other));
        assert_eq!(path.root(), "address");
    }
}
