//! Exercise catalog loading and the built-in default catalog.
//!
//! Catalog files are YAML documents grouping templates under category keys:
//!
//! ```yaml
//! categories:
//!   cardio:
//!     - name: burpee
//!       location: any
//!       max_reps: 3
//!       duration_sec:
//!         easy: [20, 30]
//! ```

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with the built-in exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// On-disk layout: category name -> templates
#[derive(Debug, Deserialize)]
struct CatalogFile {
    categories: BTreeMap<String, Vec<ExerciseTemplate>>,
}

/// An ordered collection of exercise templates
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    templates: Vec<ExerciseTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<ExerciseTemplate>) -> Self {
        Self { templates }
    }

    /// Load and validate a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Load(format!("Unable to read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_yaml_str(&contents)?;
        tracing::info!(
            "Loaded {} exercises from {:?}",
            catalog.templates.len(),
            path
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Load(format!("Malformed catalog: {}", e)))?;

        let templates = file
            .categories
            .into_iter()
            .flat_map(|(category, templates)| {
                templates.into_iter().map(move |mut template| {
                    template.category = category.clone();
                    template
                })
            })
            .collect();

        let catalog = Self { templates };
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(Error::Load(errors.join("; ")));
        }
        Ok(catalog)
    }

    pub fn templates(&self) -> &[ExerciseTemplate] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates grouped by category, in catalog order within each group
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&ExerciseTemplate>> {
        let mut groups: BTreeMap<&str, Vec<&ExerciseTemplate>> = BTreeMap::new();
        for template in &self.templates {
            groups
                .entry(template.category.as_str())
                .or_default()
                .push(template);
        }
        groups
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.templates.is_empty() {
            errors.push("Catalog has no exercises".to_string());
        }

        for template in &self.templates {
            let label = if template.name.is_empty() {
                format!("<unnamed in '{}'>", template.category)
            } else {
                format!("'{}'", template.name)
            };

            if template.name.is_empty() {
                errors.push(format!(
                    "Exercise in category '{}' has empty name",
                    template.category
                ));
            }
            if template.category.is_empty() {
                errors.push(format!("Exercise {} has empty category", label));
            }
            if template.max_reps == 0 {
                errors.push(format!("Exercise {}: max_reps must be at least 1", label));
            }
            if let Some(variants) = &template.variants {
                if variants.is_empty() {
                    errors.push(format!("Exercise {}: variants list is empty", label));
                }
            }
            if let Some(ranges) = &template.duration_sec {
                for (intensity, range) in ranges {
                    if range.min > range.max {
                        errors.push(format!(
                            "Exercise {}: {} duration min {} > max {}",
                            label, intensity, range.min, range.max
                        ));
                    }
                }
            }
        }

        errors
    }
}

fn durations(easy: [u32; 2], medium: [u32; 2], heroic: [u32; 2]) -> BTreeMap<Intensity, DurationRange> {
    BTreeMap::from([
        (Intensity::Easy, easy.into()),
        (Intensity::Medium, medium.into()),
        (Intensity::Heroic, heroic.into()),
    ])
}

fn template(
    name: &str,
    category: &str,
    location: Location,
    props: &[&str],
    max_reps: u32,
    duration_sec: Option<BTreeMap<Intensity, DurationRange>>,
    variants: &[&str],
) -> ExerciseTemplate {
    ExerciseTemplate {
        name: name.into(),
        category: category.into(),
        location,
        props: props.iter().map(|p| p.to_string()).collect(),
        max_reps,
        duration_sec,
        variants: if variants.is_empty() {
            None
        } else {
            Some(variants.iter().map(|v| v.to_string()).collect())
        },
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let templates = vec![
        // ====================================================================
        // Cardio
        // ====================================================================
        template(
            "burpee",
            "cardio",
            Location::Any,
            &[],
            3,
            Some(durations([20, 30], [30, 45], [45, 60])),
            &["four_count", "six_count", "seal"],
        ),
        template(
            "jumping_jacks",
            "cardio",
            Location::Any,
            &[],
            2,
            Some(durations([30, 45], [45, 60], [60, 90])),
            &[],
        ),
        template(
            "hill_sprint",
            "cardio",
            Location::Outdoor,
            &[],
            2,
            Some(durations([10, 15], [15, 20], [20, 30])),
            &[],
        ),
        template(
            "skipping",
            "cardio",
            Location::Outdoor,
            &["skipping_rope"],
            1,
            Some(durations([45, 60], [60, 90], [90, 120])),
            &["basic_bounce", "double_under"],
        ),
        // ====================================================================
        // Strength
        // ====================================================================
        template(
            "kettlebell_swing",
            "strength",
            Location::Any,
            &["kettlebell"],
            2,
            Some(durations([20, 30], [30, 45], [45, 60])),
            &["two_hand", "single_arm"],
        ),
        template(
            "push_ups",
            "strength",
            Location::Indoor,
            &[],
            2,
            Some(durations([20, 30], [30, 40], [40, 60])),
            &["wide", "diamond", "archer"],
        ),
        template(
            "pull_ups",
            "strength",
            Location::Indoor,
            &["pullup_bar"],
            1,
            Some(durations([15, 20], [20, 30], [30, 40])),
            &[],
        ),
        template(
            "walking_lunges",
            "strength",
            Location::Outdoor,
            &[],
            1,
            Some(durations([30, 40], [40, 60], [60, 75])),
            &[],
        ),
        // ====================================================================
        // Core
        // ====================================================================
        template(
            "plank",
            "core",
            Location::Indoor,
            &["mat"],
            2,
            Some(durations([30, 45], [45, 60], [60, 90])),
            &["forearm", "side"],
        ),
        template(
            "hollow_hold",
            "core",
            Location::Indoor,
            &["mat"],
            1,
            Some(durations([20, 30], [30, 40], [40, 60])),
            &[],
        ),
        template(
            "hanging_knee_raise",
            "core",
            Location::Outdoor,
            &["pullup_bar"],
            1,
            Some(durations([20, 30], [30, 40], [40, 50])),
            &[],
        ),
        // ====================================================================
        // Mobility
        // ====================================================================
        template(
            "hip_cars",
            "mobility",
            Location::Any,
            &[],
            1,
            Some(durations([60, 60], [60, 90], [90, 120])),
            &[],
        ),
        template(
            "shoulder_dislocates",
            "mobility",
            Location::Indoor,
            &["resistance_band"],
            1,
            Some(durations([45, 60], [60, 75], [75, 90])),
            &[],
        ),
    ];

    Catalog { templates }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
categories:
  cardio:
    - name: burpee
      location: any
      props: []
      max_reps: 3
      duration_sec:
        easy: [20, 30]
        medium: [30, 45]
        heroic: [45, 60]
      variants: [classic, seal]
  core:
    - name: plank
      location: indoor
      props: [mat]
"#;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.templates().len(), 13);
        assert_eq!(catalog.by_category().len(), 4);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_default_catalog_covers_every_intensity() {
        for template in get_default_catalog().templates() {
            let ranges = template.duration_sec.as_ref().unwrap();
            assert_eq!(ranges.len(), 3, "{} is missing a range", template.name);
        }
    }

    #[test]
    fn test_parse_assigns_category_from_key() {
        let catalog = Catalog::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(catalog.templates().len(), 2);

        let burpee = &catalog.templates()[0];
        assert_eq!(burpee.category, "cardio");
        assert_eq!(burpee.max_reps, 3);
        assert_eq!(burpee.location, Location::Any);

        let plank = &catalog.templates()[1];
        assert_eq!(plank.category, "core");
        assert_eq!(plank.max_reps, 1);
        assert_eq!(plank.props, vec!["mat".to_string()]);
    }

    #[test]
    fn test_missing_required_field_is_load_error() {
        let yaml = "categories:\n  core:\n    - name: plank\n";
        let result = Catalog::from_yaml_str(yaml);
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_malformed_yaml_is_load_error() {
        let result = Catalog::from_yaml_str("categories: [unterminated");
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_invalid_metadata_is_load_error() {
        let yaml = r#"
categories:
  cardio:
    - name: sprint
      location: outdoor
      max_reps: 0
      variants: []
      duration_sec:
        easy: [30, 10]
"#;
        match Catalog::from_yaml_str(yaml) {
            Err(Error::Load(msg)) => {
                assert!(msg.contains("max_reps"));
                assert!(msg.contains("variants"));
                assert!(msg.contains("min 30 > max 10"));
            }
            other => panic!("Expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_catalog_is_load_error() {
        let result = Catalog::from_yaml_str("categories: {}");
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("heroic_exercises.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.templates().len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nonexistent.yaml");

        let result = Catalog::load(&path);
        assert!(matches!(result, Err(Error::Load(_))));
    }
}
