//! Java version numbers
//!
//! A `VersionNumber` holds up to four components (`feature.interim.update.patch`).
//! Components that were not given compare as `0`, which makes `17` and `17.0.0`
//! equal and orders `17` before `17.0.1`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::errors::{DiscoError, Result};

static VERSION_PATTERN: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?(?:_(\d+))?"));

/// Four-level Java version number with a total order
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionNumber {
    feature: Option<u32>,
    interim: Option<u32>,
    update: Option<u32>,
    patch: Option<u32>,
}

impl VersionNumber {
    /// Version naming only a feature line (e.g. `17`)
    pub fn new(feature: u32) -> Self {
        Self {
            feature: Some(feature),
            ..Default::default()
        }
    }

    /// Version with every component given
    pub fn from_parts(feature: u32, interim: u32, update: u32, patch: u32) -> Self {
        Self {
            feature: Some(feature),
            interim: Some(interim),
            update: Some(update),
            patch: Some(patch),
        }
    }

    /// Parse a Java version string
    ///
    /// Build metadata and pre-release suffixes (`+8`, `-ea+5`) are ignored.
    /// The legacy `1.x.y_z` form is mapped onto the modern scheme.
    ///
    /// # Example
    ///
    /// ```
    /// use disco_core::VersionNumber;
    ///
    /// let v = VersionNumber::parse("17.0.2+8").unwrap();
    /// assert_eq!(v.feature(), Some(17));
    /// assert_eq!(v.update(), Some(2));
    ///
    /// let legacy = VersionNumber::parse("1.8.0_292").unwrap();
    /// assert_eq!(legacy.to_string(), "8.0.292");
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let re = VERSION_PATTERN
            .as_ref()
            .map_err(|e| DiscoError::InvalidVersion(format!("Regex error: {}", e)))?;

        let caps = re
            .captures(text)
            .ok_or_else(|| DiscoError::InvalidVersion(text.to_string()))?;

        let component = |idx: usize| -> Result<Option<u32>> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse::<u32>()
                    .map(Some)
                    .map_err(|_| DiscoError::InvalidVersion(text.to_string())),
                None => Ok(None),
            }
        };

        let feature = component(1)?;
        let interim = component(2)?;
        let update = component(3)?;
        let patch = component(4)?;
        let legacy_update = component(5)?;

        if feature == Some(1) && interim.is_some() {
            return Ok(Self {
                feature: interim,
                interim: update.or(Some(0)),
                update: legacy_update.or(patch),
                patch: None,
            });
        }

        Ok(Self {
            feature,
            interim,
            update,
            patch,
        })
    }

    pub fn feature(&self) -> Option<u32> {
        self.feature
    }

    pub fn interim(&self) -> Option<u32> {
        self.interim
    }

    pub fn update(&self) -> Option<u32> {
        self.update
    }

    pub fn patch(&self) -> Option<u32> {
        self.patch
    }

    /// Components with absent values read as `0`
    pub fn components(&self) -> [u32; 4] {
        [
            self.feature.unwrap_or(0),
            self.interim.unwrap_or(0),
            self.update.unwrap_or(0),
            self.patch.unwrap_or(0),
        ]
    }

    fn raw(&self) -> [Option<u32>; 4] {
        [self.feature, self.interim, self.update, self.patch]
    }

    /// Hierarchical partial match against a requested version
    ///
    /// The match depth is the deepest component of `requested` that is present
    /// and non-zero (the feature always counts). Components up to that depth
    /// must be equal, deeper ones are wildcards: `11.0.2.0` matches every patch
    /// of `11.0.2`, while `11.0.2.3` matches only patch 3.
    pub fn matches_partial(&self, requested: &VersionNumber) -> bool {
        let depth = requested
            .raw()
            .iter()
            .rposition(|c| matches!(c, Some(v) if *v != 0))
            .unwrap_or(0);

        let mine = self.components();
        let theirs = requested.components();
        mine[..=depth] == theirs[..=depth]
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(&other.components())
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}

impl Hash for VersionNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components().hash(state);
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.raw();
        let last = raw.iter().rposition(Option::is_some).unwrap_or(0);
        let parts: Vec<String> = raw[..=last]
            .iter()
            .map(|c| c.unwrap_or(0).to_string())
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for VersionNumber {
    type Err = DiscoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for VersionNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        VersionNumber::parse(&text).map_err(serde::de::Error::custom)
    }
}
