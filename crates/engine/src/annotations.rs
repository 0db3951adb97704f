//! Availability-annotation vocabulary.
//!
//! Two things live here: the recognition predicate the analyzer uses to
//! decide whether a line announces availability metadata, and the boundary
//! types for facts handed over by an external binary metadata reader
//! (platform ids, availability kinds, version formatting). The predicate
//! is pure and total; only the id-mapping constructors can fail, because
//! an id outside the modeled range is a modeling gap that must not be
//! silently ignored.

use crate::error::{EngineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of attribute names that count as availability metadata:
/// legacy kinds, platform shorthands (positive and negative), and the
/// modern OS-platform family.
pub const AVAILABILITY_ATTRIBUTES: &[&str] = &[
    // legacy kinds
    "Introduced",
    "Deprecated",
    "Unavailable",
    "Obsoleted",
    // platform shorthands
    "iOS",
    "Mac",
    "TV",
    "Watch",
    "MacCatalyst",
    "NoiOS",
    "NoMac",
    "NoTV",
    "NoWatch",
    "NoMacCatalyst",
    // modern kinds
    "SupportedOSPlatform",
    "UnsupportedOSPlatform",
    "ObsoletedOSPlatform",
];

static ATTRIBUTE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\s*([A-Za-z_][A-Za-z0-9_]*)").expect("attribute name pattern"));

/// Check an attribute name against the closed availability set.
#[must_use]
pub fn is_availability_attribute_name(name: &str) -> bool {
    AVAILABILITY_ATTRIBUTES.contains(&name)
}

/// Metadata recognition predicate: does this line apply an availability
/// attribute? Pure and total; anything unrecognized is simply `false`.
#[must_use]
pub fn is_availability_annotation(line: &str) -> bool {
    let trimmed = line.trim();
    ATTRIBUTE_NAME
        .captures(trimmed)
        .map(|caps| is_availability_attribute_name(&caps[1]))
        .unwrap_or(false)
}

/// Kind of an availability fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailabilityKind {
    Introduced,
    Deprecated,
    Obsoleted,
    Unavailable,
}

impl AvailabilityKind {
    /// Map a reader-supplied kind id
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(Self::Introduced),
            1 => Ok(Self::Deprecated),
            2 => Ok(Self::Obsoleted),
            3 => Ok(Self::Unavailable),
            other => Err(EngineError::UnknownAvailabilityKind(other)),
        }
    }

    /// Legacy attribute name for this kind
    #[must_use]
    pub const fn legacy_attribute(self) -> &'static str {
        match self {
            Self::Introduced => "Introduced",
            Self::Deprecated => "Deprecated",
            Self::Obsoleted => "Obsoleted",
            Self::Unavailable => "Unavailable",
        }
    }
}

/// Platform a fact applies to.
///
/// Reader ids 0 and 6 mean "no platform" and are discarded by mapping to
/// `None`; anything above 6 is unrecognized and fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    MacOsX,
    Ios,
    WatchOs,
    TvOs,
    MacCatalyst,
}

impl Platform {
    /// Map a reader-supplied platform id
    pub fn from_id(id: u8) -> Result<Option<Self>> {
        match id {
            0 | 6 => Ok(None),
            1 => Ok(Some(Self::MacOsX)),
            2 => Ok(Some(Self::Ios)),
            3 => Ok(Some(Self::WatchOs)),
            4 => Ok(Some(Self::TvOs)),
            5 => Ok(Some(Self::MacCatalyst)),
            other => Err(EngineError::UnknownPlatform(other)),
        }
    }

    /// Platform token used by the modern annotation convention
    #[must_use]
    pub const fn net_name(self) -> &'static str {
        match self {
            Self::MacOsX => "macos",
            Self::Ios => "ios",
            Self::WatchOs => "watchos",
            Self::TvOs => "tvos",
            Self::MacCatalyst => "maccatalyst",
        }
    }
}

/// An OS version as recorded by the metadata reader.
///
/// A point value of 255 means "unspecified" and is omitted from output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub point: Option<u32>,
}

impl OsVersion {
    const UNSPECIFIED_POINT: u32 = 255;

    #[must_use]
    pub fn from_reader(major: u32, minor: u32, point: u32) -> Self {
        Self {
            major,
            minor,
            point: (point != Self::UNSPECIFIED_POINT).then_some(point),
        }
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point {
            Some(point) => write!(f, "{}.{}.{}", self.major, self.minor, point),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

/// One historical availability fact for a member, as handed over by the
/// external binary metadata reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityFact {
    pub kind: AvailabilityKind,
    pub platform: Platform,
    pub version: Option<OsVersion>,
    pub message: Option<String>,
}

impl AvailabilityFact {
    /// Platform string for the modern convention, e.g. `"ios13.1"`
    #[must_use]
    pub fn platform_string(&self) -> String {
        match self.version {
            Some(version) => format!("{}{}", self.platform.net_name(), version),
            None => self.platform.net_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_recognizes_legacy_and_modern() {
        assert!(is_availability_annotation("[Introduced (PlatformName.iOS, 11, 0)]"));
        assert!(is_availability_annotation("\t[Deprecated (PlatformName.MacOSX, 10, 14)]"));
        assert!(is_availability_annotation("[Watch (5, 0)]"));
        assert!(is_availability_annotation("[NoMacCatalyst]"));
        assert!(is_availability_annotation("[SupportedOSPlatform (\"ios13.0\")]"));
        assert!(is_availability_annotation("[UnsupportedOSPlatform (\"tvos\")]"));
    }

    #[test]
    fn test_predicate_is_total_and_strict() {
        assert!(!is_availability_annotation("[Serializable]"));
        assert!(!is_availability_annotation("public void Foo ();"));
        assert!(!is_availability_annotation("// commented out"));
        assert!(!is_availability_annotation(""));
    }

    #[test]
    fn test_kind_ids() {
        assert_eq!(AvailabilityKind::from_id(0).unwrap(), AvailabilityKind::Introduced);
        assert_eq!(AvailabilityKind::from_id(3).unwrap(), AvailabilityKind::Unavailable);
        assert!(AvailabilityKind::from_id(9).is_err());
    }

    #[test]
    fn test_platform_ids() {
        assert_eq!(Platform::from_id(0).unwrap(), None);
        assert_eq!(Platform::from_id(6).unwrap(), None);
        assert_eq!(Platform::from_id(2).unwrap(), Some(Platform::Ios));
        assert_eq!(Platform::from_id(5).unwrap(), Some(Platform::MacCatalyst));
        assert!(Platform::from_id(7).is_err());
    }

    #[test]
    fn test_version_formatting() {
        assert_eq!(OsVersion::from_reader(11, 0, 255).to_string(), "11.0");
        assert_eq!(OsVersion::from_reader(13, 1, 2).to_string(), "13.1.2");
    }

    #[test]
    fn test_platform_string() {
        let fact = AvailabilityFact {
            kind: AvailabilityKind::Introduced,
            platform: Platform::Ios,
            version: Some(OsVersion::from_reader(13, 1, 255)),
            message: None,
        };
        assert_eq!(fact.platform_string(), "ios13.1");
    }
}
