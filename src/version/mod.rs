// src/version/mod.rs

//! Version handling and range intersection for package dependencies
//!
//! A dependency accepts an interval of versions: an inclusive minimum and a
//! maximum, either of which may be the open bound `any`. Ranges for the same
//! dependency are merged by intersection.
//!
//! Versions compare component by component after splitting on `.`, `-`, `+`
//! and `~`. Numeric components compare as integers, other components compare
//! lexically, and a numeric component sorts before a non-numeric one. When one
//! version is a prefix of the other, the shorter one is lower (`1.0 < 1.0.1`).

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// The literal token for an open bound
pub const ANY: &str = "any";

/// A single version bound
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    /// Open bound: lowest as a minimum, highest as a maximum
    Any,
    /// A concrete version string such as `1.2.3` or `2.0-rc1`
    Release(String),
}

impl Version {
    /// Parse a version token
    ///
    /// `any` (case-insensitive) yields the open bound; anything else that is
    /// not blank is kept as a release string.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidVersion(s.to_string()));
        }
        if s.eq_ignore_ascii_case(ANY) {
            return Ok(Self::Any);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(Error::InvalidVersion(s.to_string()));
        }
        Ok(Self::Release(s.to_string()))
    }

    /// Is this the open bound?
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Compare two versions used as minimums (`any` is the lowest)
    pub fn cmp_as_min(&self, other: &Version) -> Ordering {
        match (self, other) {
            (Self::Any, Self::Any) => Ordering::Equal,
            (Self::Any, _) => Ordering::Less,
            (_, Self::Any) => Ordering::Greater,
            (Self::Release(a), Self::Release(b)) => compare_release(a, b),
        }
    }

    /// Compare two versions used as maximums (`any` is the highest)
    pub fn cmp_as_max(&self, other: &Version) -> Ordering {
        match (self, other) {
            (Self::Any, Self::Any) => Ordering::Equal,
            (Self::Any, _) => Ordering::Greater,
            (_, Self::Any) => Ordering::Less,
            (Self::Release(a), Self::Release(b)) => compare_release(a, b),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "{}", ANY),
            Self::Release(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One component of a split version string
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Numeric(u64),
    Text(&'a str),
}

impl Ord for Segment<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
            (Segment::Numeric(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Numeric(_)) => Ordering::Greater,
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Segment<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn segments(v: &str) -> impl Iterator<Item = Segment<'_>> {
    v.split(['.', '-', '+', '~'])
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<u64>() {
            Ok(n) => Segment::Numeric(n),
            Err(_) => Segment::Text(s),
        })
}

/// Dotted-numeric comparison of two release strings
pub fn compare_release(a: &str, b: &str) -> Ordering {
    segments(a).cmp(segments(b))
}

/// Acceptable interval of versions for a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRange {
    /// Inclusive minimum
    pub min: Version,
    /// Maximum (`Any` when unbounded)
    pub max: Version,
}

/// Returned when two ranges have an empty intersection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("version ranges {left} and {right} do not intersect")]
pub struct VersionConflict {
    pub left: VersionRange,
    pub right: VersionRange,
}

impl VersionRange {
    /// The unbounded range `[any, any]`
    pub fn any() -> Self {
        Self {
            min: Version::Any,
            max: Version::Any,
        }
    }

    /// Build a range from explicit bounds, rejecting `min > max`
    pub fn new(min: Version, max: Version) -> Result<Self> {
        let range = Self { min, max };
        if range.is_empty() {
            return Err(Error::InvalidVersion(format!(
                "minimum {} exceeds maximum {}",
                range.min, range.max
            )));
        }
        Ok(range)
    }

    /// A range with an inclusive minimum and no maximum
    pub fn at_least(min: Version) -> Self {
        Self {
            min,
            max: Version::Any,
        }
    }

    /// Parse a textual clause
    ///
    /// Accepted forms:
    /// - `1.2` → `[1.2, any]`
    /// - `any` → `[any, any]`
    /// - `[1.2, 2.0]` or `1.2, 2.0` → explicit pair
    pub fn parse(clause: &str) -> Result<Self> {
        let trimmed = clause.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed);

        match inner.split_once(',') {
            Some((min, max)) => Self::from_pair(min, max),
            None => Ok(Self::at_least(Version::parse(inner)?)),
        }
    }

    /// Build a range from a `(min, max)` pair of tokens
    pub fn from_pair(min: &str, max: &str) -> Result<Self> {
        Self::new(Version::parse(min)?, Version::parse(max)?)
    }

    /// True when neither bound restricts anything
    pub fn is_any(&self) -> bool {
        self.min.is_any() && self.max.is_any()
    }

    fn is_empty(&self) -> bool {
        match (&self.min, &self.max) {
            (Version::Release(min), Version::Release(max)) => {
                compare_release(min, max) == Ordering::Greater
            }
            _ => false,
        }
    }

    /// Tighten two ranges into one
    ///
    /// The result keeps the higher minimum and the lower maximum; when the
    /// minimum would exceed the maximum the ranges conflict.
    pub fn intersect(&self, other: &VersionRange) -> std::result::Result<Self, VersionConflict> {
        let min = match self.min.cmp_as_min(&other.min) {
            Ordering::Less => other.min.clone(),
            _ => self.min.clone(),
        };
        let max = match self.max.cmp_as_max(&other.max) {
            Ordering::Greater => other.max.clone(),
            _ => self.max.clone(),
        };

        let merged = Self { min, max };
        if merged.is_empty() {
            return Err(VersionConflict {
                left: self.clone(),
                right: other.clone(),
            });
        }
        Ok(merged)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
