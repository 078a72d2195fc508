use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which feed a favourited item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Home,
    ToonBites,
    CinematicCravings,
    Trending,
    Explore,
    Recommendations,
}

impl ContentSource {
    pub const ALL: [ContentSource; 6] = [
        ContentSource::Home,
        ContentSource::ToonBites,
        ContentSource::CinematicCravings,
        ContentSource::Trending,
        ContentSource::Explore,
        ContentSource::Recommendations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentSource::Home => "home",
            ContentSource::ToonBites => "toon_bites",
            ContentSource::CinematicCravings => "cinematic_cravings",
            ContentSource::Trending => "trending",
            ContentSource::Explore => "explore",
            ContentSource::Recommendations => "recommendations",
        }
    }

    /// Thousands block each source used for its numeric ids.
    fn legacy_block(self) -> i64 {
        match self {
            ContentSource::Home => 1,
            ContentSource::ToonBites => 2,
            ContentSource::CinematicCravings => 3,
            ContentSource::Trending => 4,
            ContentSource::Explore => 5,
            ContentSource::Recommendations => 8,
        }
    }
}

impl FromStr for ContentSource {
    type Err = ContentKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentSource::ALL
            .into_iter()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| ContentKeyError::UnknownSource(s.to_string()))
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContentKeyError {
    #[error("unknown content source `{0}`")]
    UnknownSource(String),
    #[error("malformed content key `{0}`")]
    Malformed(String),
    #[error("legacy id {0} is outside every known range")]
    UnmappedLegacyId(i64),
}

/// Composite identity of a favourited item: `(source, local_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub source: ContentSource,
    pub local_id: i64,
}

impl ContentKey {
    pub fn new(source: ContentSource, local_id: i64) -> Self {
        Self { source, local_id }
    }

    /// Map an old flat numeric id by its thousands range.
    pub fn from_legacy(id: i64) -> Result<Self, ContentKeyError> {
        let block = id.div_euclid(1000);
        ContentSource::ALL
            .into_iter()
            .find(|src| src.legacy_block() == block)
            .map(|source| Self::new(source, id))
            .ok_or(ContentKeyError::UnmappedLegacyId(id))
    }

    /// Accepts `source:local_id` or a bare legacy number.
    pub fn parse_path(raw: &str) -> Result<Self, ContentKeyError> {
        match raw.parse::<i64>() {
            Ok(id) => Self::from_legacy(id),
            Err(_) => raw.parse(),
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.local_id)
    }
}

impl FromStr for ContentKey {
    type Err = ContentKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, local_id) = s
            .split_once(':')
            .ok_or_else(|| ContentKeyError::Malformed(s.to_string()))?;
        let local_id = local_id
            .parse::<i64>()
            .map_err(|_| ContentKeyError::Malformed(s.to_string()))?;
        Ok(Self::new(source.parse()?, local_id))
    }
}

impl Serialize for ContentKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Wire forms: `"source:local_id"`, a numeric string, or a bare legacy number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Legacy(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for ContentKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match RawKey::deserialize(deserializer)? {
            RawKey::Legacy(id) => ContentKey::from_legacy(id),
            RawKey::Text(raw) => ContentKey::parse_path(&raw),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_is_source_colon_id() {
        let key = ContentKey::new(ContentSource::ToonBites, 2003);
        assert_eq!(key.to_string(), "toon_bites:2003");
        assert_eq!("toon_bites:2003".parse::<ContentKey>().unwrap(), key);
    }

    #[test]
    fn legacy_ranges_map_to_sources() {
        let cases = [
            (1001, ContentSource::Home),
            (2999, ContentSource::ToonBites),
            (3000, ContentSource::CinematicCravings),
            (4010, ContentSource::Trending),
            (5500, ContentSource::Explore),
            (8001, ContentSource::Recommendations),
        ];
        for (id, source) in cases {
            assert_eq!(ContentKey::from_legacy(id).unwrap(), ContentKey::new(source, id));
        }
    }

    #[test]
    fn unmapped_legacy_ids_are_rejected() {
        for id in [0, 999, 6000, 7123, 9000, -1] {
            assert_eq!(
                ContentKey::from_legacy(id),
                Err(ContentKeyError::UnmappedLegacyId(id))
            );
        }
    }

    #[test]
    fn parse_path_accepts_both_forms() {
        assert_eq!(
            ContentKey::parse_path("4002").unwrap(),
            ContentKey::new(ContentSource::Trending, 4002)
        );
        assert_eq!(
            ContentKey::parse_path("explore:12").unwrap(),
            ContentKey::new(ContentSource::Explore, 12)
        );
        assert!(matches!(
            ContentKey::parse_path("pantry:1"),
            Err(ContentKeyError::UnknownSource(_))
        ));
        assert!(matches!(
            ContentKey::parse_path("home:abc"),
            Err(ContentKeyError::Malformed(_))
        ));
        assert!(matches!(
            ContentKey::parse_path("home"),
            Err(ContentKeyError::Malformed(_))
        ));
    }

    #[test]
    fn serde_uses_text_form() {
        let key = ContentKey::new(ContentSource::Home, 1004);
        assert_eq!(serde_json::to_value(key).unwrap(), "home:1004");
        let back: ContentKey = serde_json::from_str("\"1004\"").unwrap();
        assert_eq!(back, key);
        let numeric: ContentKey = serde_json::from_str("1004").unwrap();
        assert_eq!(numeric, key);
        assert!(serde_json::from_str::<ContentKey>("6001").is_err());
        assert!(serde_json::from_str::<ContentKey>("true").is_err());
    }
}
