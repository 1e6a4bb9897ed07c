//! Core domain types for Hero Workout.
//!
//! This module defines the fundamental types used throughout the system:
//! - Locations, both as a catalog filter and as a resolved training site
//! - Intensity tiers and their duration ranges
//! - Exercise templates (catalog entries) and planned exercises (plan slots)

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Location Types
// ============================================================================

/// Where an exercise may be performed, as declared by the catalog
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Indoor,
    Outdoor,
    Any,
}

impl Location {
    /// Whether a template declared at `self` may be planned under `filter`
    pub fn admits(self, filter: Location) -> bool {
        self == filter || filter == Location::Any || self == Location::Any
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Indoor => "indoor",
            Location::Outdoor => "outdoor",
            Location::Any => "any",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indoor" => Ok(Location::Indoor),
            "outdoor" => Ok(Location::Outdoor),
            "any" => Ok(Location::Any),
            other => Err(Error::Config(format!(
                "Unknown location '{}' (expected indoor, outdoor or any)",
                other
            ))),
        }
    }
}

/// A resolved training site. Planned exercises never carry `any`.
///
/// Ordering puts `Indoor` before `Outdoor`, which is the order a mixed
/// session is walked in.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    Indoor,
    Outdoor,
}

impl Site {
    pub fn as_str(self) -> &'static str {
        match self {
            Site::Indoor => "indoor",
            Site::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Site> for Location {
    fn from(site: Site) -> Self {
        match site {
            Site::Indoor => Location::Indoor,
            Site::Outdoor => Location::Outdoor,
        }
    }
}

// ============================================================================
// Intensity Types
// ============================================================================

/// Named intensity tier selecting a duration range
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Easy,
    Medium,
    Heroic,
}

impl Intensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Easy => "easy",
            Intensity::Medium => "medium",
            Intensity::Heroic => "heroic",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Intensity::Easy),
            "medium" => Ok(Intensity::Medium),
            "heroic" => Ok(Intensity::Heroic),
            other => Err(Error::Config(format!(
                "Unknown intensity '{}' (expected easy, medium or heroic)",
                other
            ))),
        }
    }
}

/// Inclusive range of seconds, written as `[min, max]` in the catalog
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
}

impl DurationRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, seconds: u32) -> bool {
        (self.min..=self.max).contains(&seconds)
    }
}

impl From<[u32; 2]> for DurationRange {
    fn from([min, max]: [u32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<DurationRange> for [u32; 2] {
    fn from(range: DurationRange) -> Self {
        [range.min, range.max]
    }
}

// ============================================================================
// Exercise Types
// ============================================================================

fn default_max_reps() -> u32 {
    1
}

/// A catalog-defined exercise blueprint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTemplate {
    pub name: String,
    /// Filled from the catalog section key when loading from YAML
    #[serde(default)]
    pub category: String,
    pub location: Location,
    #[serde(default)]
    pub props: Vec<String>,
    #[serde(default = "default_max_reps")]
    pub max_reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<BTreeMap<Intensity, DurationRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
}

impl ExerciseTemplate {
    /// Minimal template with no props, variants or durations
    pub fn new(name: impl Into<String>, category: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            location,
            props: Vec::new(),
            max_reps: default_max_reps(),
            duration_sec: None,
            variants: None,
        }
    }
}

/// One slot of a plan: a template with its random choices fixed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,
    pub category: String,
    pub location: Site,
    pub props: Vec<String>,
    pub max_reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<BTreeMap<Intensity, DurationRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
    pub assigned_variant: Option<String>,
    pub assigned_duration: Option<u32>,
}

impl PlannedExercise {
    /// Copy every template field and attach the resolved choices
    pub fn resolve(
        template: &ExerciseTemplate,
        location: Site,
        assigned_variant: Option<String>,
        assigned_duration: Option<u32>,
    ) -> Self {
        let ExerciseTemplate {
            name,
            category,
            location: _,
            props,
            max_reps,
            duration_sec,
            variants,
        } = template.clone();

        Self {
            name,
            category,
            location,
            props,
            max_reps,
            duration_sec,
            variants,
            assigned_variant,
            assigned_duration,
        }
    }
}
