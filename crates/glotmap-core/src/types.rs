//! Locale, entity id and tag newtypes.
//!
//! All string-shaped identifiers in the system are validated once at the
//! boundary and carried as newtypes afterwards, so downstream code never
//! has to re-check shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// ============================================================================
// Locale
// ============================================================================

/// Two-letter lowercase language code identifying a vocabulary partition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(code: &str) -> Result<Self> {
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(Error::InvalidArgument(format!(
                "malformed locale: {code:?} (expected two lowercase letters)"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

// ============================================================================
// Entity id
// ============================================================================

/// 32-character lowercase-hex entity identifier, generated at ingestion
/// time and stable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Draw a fresh identifier from the 128-bit uuid4 space.
    ///
    /// Uniqueness against already-persisted entities is the ingestor's
    /// responsibility; this only guarantees the shape.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn parse(s: &str) -> Result<Self> {
        if s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidArgument(format!(
                "malformed entity id: {s:?} (expected 32 lowercase hex chars)"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tags
// ============================================================================

/// Locale-qualified, human-authored tag string exactly as ingested
/// (e.g. `en:Progressive_Rock`). Source of truth for display and for
/// storage keys; normalization happens only at mapping time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTag(String);

impl RawTag {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        split_qualified(&tag)?;
        Ok(Self(tag))
    }

    pub fn locale(&self) -> Locale {
        // Shape was validated at construction.
        Locale(self.0[..2].to_string())
    }

    /// The raw text after the `ll:` prefix.
    pub fn text(&self) -> &str {
        &self.0[3..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RawTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalized form of a raw tag, used exclusively as a key into the
/// embedding/similarity space. Produced by [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedTag(pub(crate) String);

impl NormalizedTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a locale-qualified tag into `(locale, text)`, rejecting anything
/// that does not match the `ll:text` shape.
pub(crate) fn split_qualified(tag: &str) -> Result<(Locale, &str)> {
    let bytes = tag.as_bytes();
    if bytes.len() < 3 || bytes[2] != b':' {
        return Err(Error::InvalidTagFormat(tag.to_string()));
    }
    let locale = Locale::new(&tag[..2]).map_err(|_| Error::InvalidTagFormat(tag.to_string()))?;
    Ok((locale, &tag[3..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_accepts_two_lowercase_letters() {
        assert!(Locale::new("en").is_ok());
        assert!(Locale::new("ja").is_ok());
    }

    #[test]
    fn locale_rejects_bad_shapes() {
        for bad in ["EN", "e", "eng", "e1", ""] {
            assert!(Locale::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn entity_id_generate_has_expected_shape() {
        let eid = EntityId::generate();
        assert_eq!(eid.as_str().len(), 32);
        assert!(eid
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        // And round-trips through parse.
        assert!(EntityId::parse(eid.as_str()).is_ok());
    }

    #[test]
    fn entity_id_parse_rejects_uppercase_and_short() {
        assert!(EntityId::parse("ABCDEF00112233445566778899AABBCC").is_err());
        assert!(EntityId::parse("abc").is_err());
    }

    #[test]
    fn raw_tag_exposes_locale_and_text() {
        let tag = RawTag::new("en:Hard Rock").unwrap();
        assert_eq!(tag.locale().as_str(), "en");
        assert_eq!(tag.text(), "Hard Rock");
    }

    #[test]
    fn raw_tag_rejects_unqualified_strings() {
        assert!(RawTag::new("rock").is_err());
        assert!(RawTag::new("e:rock").is_err());
        assert!(RawTag::new("EN:rock").is_err());
        assert!(RawTag::new("").is_err());
    }

    #[test]
    fn raw_tag_accepts_empty_text() {
        // `en:` is degenerate but shaped correctly; the original treated
        // the text portion as opaque.
        assert!(RawTag::new("en:").is_ok());
    }
}
