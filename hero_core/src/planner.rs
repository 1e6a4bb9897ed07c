//! Randomized session planner.
//!
//! Selection works per category so that large categories do not crowd out
//! small ones:
//! - A category is sampled uniformly from those with exercises left
//! - Within the category, exercises are taken in (shuffled) FIFO order
//! - The previous exercise is never picked again immediately while any
//!   other exercise is still available
//! - Exercises with `max_reps > 1` stay in rotation until their reps run out

use crate::{Error, ExerciseTemplate, Intensity, Location, PlannedExercise, Result, Site};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

/// Union of required props per resolved location
pub type PropsByLocation = BTreeMap<Site, BTreeSet<String>>;

/// A template together with how many more times it may be picked
#[derive(Clone, Debug)]
struct Slot {
    template: ExerciseTemplate,
    remaining: u32,
}

/// Builds plans from a private working copy of the eligible templates
pub struct Planner<R = StdRng> {
    intensity: Intensity,
    location: Location,
    eligible_by_category: BTreeMap<String, Vec<Slot>>,
    rng: R,
}

impl Planner<StdRng> {
    /// Create a planner seeded from OS entropy
    pub fn new(
        templates: &[ExerciseTemplate],
        intensity: Intensity,
        location: Location,
    ) -> Result<Self> {
        Self::with_rng(templates, intensity, location, StdRng::from_entropy())
    }

    /// Create a planner with a reproducible seed
    pub fn seeded(
        templates: &[ExerciseTemplate],
        intensity: Intensity,
        location: Location,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(templates, intensity, location, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Planner<R> {
    /// Create a planner drawing all randomness from `rng`
    ///
    /// Templates are copied; the caller's data is never modified.
    pub fn with_rng(
        templates: &[ExerciseTemplate],
        intensity: Intensity,
        location: Location,
        mut rng: R,
    ) -> Result<Self> {
        let mut eligible_by_category: BTreeMap<String, Vec<Slot>> = BTreeMap::new();
        for template in templates.iter().filter(|t| t.location.admits(location)) {
            eligible_by_category
                .entry(template.category.clone())
                .or_default()
                .push(Slot {
                    template: template.clone(),
                    remaining: template.max_reps,
                });
        }

        if eligible_by_category.is_empty() {
            return Err(Error::NoEligibleExercises {
                location: location.to_string(),
            });
        }

        for slots in eligible_by_category.values_mut() {
            slots.shuffle(&mut rng);
        }

        tracing::debug!(
            "Planner ready: {} categories eligible for location {} at {} intensity",
            eligible_by_category.len(),
            location,
            intensity
        );

        Ok(Self {
            intensity,
            location,
            eligible_by_category,
            rng,
        })
    }

    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Categories that still have exercises left
    pub fn categories(&self) -> Vec<&str> {
        self.eligible_by_category.keys().map(String::as_str).collect()
    }

    /// Plan up to `count` exercises
    ///
    /// The plan is shorter than `count` only when the eligible exercises run
    /// out. When the location filter is `any`, indoor exercises are moved
    /// ahead of outdoor ones (stable), otherwise selection order is kept.
    ///
    /// If every remaining category offers nothing but a repeat of the
    /// previous exercise, the repeat is allowed rather than ending the plan.
    pub fn plan(&mut self, count: usize) -> Result<Vec<PlannedExercise>> {
        let mut planned: Vec<PlannedExercise> = Vec::with_capacity(count);
        // Categories found to hold only a repeat since the last pick
        let mut blocked: BTreeSet<String> = BTreeSet::new();

        while planned.len() < count {
            if self.eligible_by_category.is_empty() {
                tracing::debug!("Categories exhausted after {} exercises", planned.len());
                break;
            }

            let previous = planned.last().map(|e| e.name.clone());

            let open: Vec<&String> = self
                .eligible_by_category
                .keys()
                .filter(|c| !blocked.contains(*c))
                .collect();
            let (category, allow_repeat) = match open.choose(&mut self.rng) {
                Some(category) => ((*category).clone(), false),
                None => {
                    let all: Vec<&String> = self.eligible_by_category.keys().collect();
                    match all.choose(&mut self.rng) {
                        Some(category) => {
                            tracing::debug!(
                                "Nothing to add without repeating {:?}, allowing repeat",
                                previous
                            );
                            ((*category).clone(), true)
                        }
                        None => break,
                    }
                }
            };

            let Some(slots) = self.eligible_by_category.get(&category) else {
                break;
            };
            let Some(index) = slots.iter().position(|slot| {
                allow_repeat || previous.as_deref() != Some(slot.template.name.as_str())
            }) else {
                blocked.insert(category);
                continue;
            };

            let exercise = resolve(&slots[index].template, self.intensity, &mut self.rng)?;
            self.consume(&category, index);

            tracing::debug!(
                "{} | Category: {} | Variant: {:?} | Duration: {:?}",
                exercise.name,
                category,
                exercise.assigned_variant,
                exercise.assigned_duration
            );

            planned.push(exercise);
            blocked.clear();
        }

        if self.location == Location::Any {
            planned.sort_by_key(|e| e.location);
        }

        Ok(planned)
    }

    /// Aggregate props per location for a plan
    pub fn props_by_location(&self, plan: &[PlannedExercise]) -> PropsByLocation {
        props_by_location(plan)
    }

    /// Use up one rep of the slot at `index`, retiring it (and its category)
    /// when nothing is left
    fn consume(&mut self, category: &str, index: usize) {
        let emptied = match self.eligible_by_category.get_mut(category) {
            Some(slots) => {
                if slots[index].remaining > 1 {
                    slots[index].remaining -= 1;
                    slots.shuffle(&mut self.rng);
                } else {
                    slots.remove(index);
                }
                slots.is_empty()
            }
            None => false,
        };

        if emptied {
            self.eligible_by_category.remove(category);
        }
    }
}

/// Fix the random choices of one appearance of `template`
fn resolve<R: Rng>(
    template: &ExerciseTemplate,
    intensity: Intensity,
    rng: &mut R,
) -> Result<PlannedExercise> {
    let assigned_variant = template
        .variants
        .as_ref()
        .and_then(|variants| variants.choose(rng).cloned());

    let assigned_duration = match &template.duration_sec {
        Some(ranges) => {
            let range = ranges.get(&intensity).ok_or_else(|| {
                Error::Config(format!(
                    "Exercise '{}' has no duration range for intensity '{}'",
                    template.name, intensity
                ))
            })?;
            if range.min > range.max {
                return Err(Error::Config(format!(
                    "Exercise '{}' has an empty {} duration range [{}, {}]",
                    template.name, intensity, range.min, range.max
                )));
            }
            Some(rng.gen_range(range.min..=range.max))
        }
        None => None,
    };

    let site = match template.location {
        Location::Indoor => Site::Indoor,
        Location::Outdoor => Site::Outdoor,
        Location::Any => {
            if rng.gen_bool(0.5) {
                Site::Indoor
            } else {
                Site::Outdoor
            }
        }
    };

    Ok(PlannedExercise::resolve(
        template,
        site,
        assigned_variant,
        assigned_duration,
    ))
}

/// Union of required props per resolved location
///
/// Locations whose exercises need no props are left out.
pub fn props_by_location(plan: &[PlannedExercise]) -> PropsByLocation {
    let mut props = PropsByLocation::new();
    for exercise in plan {
        for prop in &exercise.props {
            props
                .entry(exercise.location)
                .or_default()
                .insert(prop.clone());
        }
    }
    props
}

/// Human-readable plan listing followed by the numbered props
pub fn format_plan(plan: &[PlannedExercise]) -> Vec<String> {
    let mut lines: Vec<String> = plan
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            format!(
                "{}. {} | Variant: {} | Duration: {} | Location: {}",
                idx + 1,
                e.name,
                e.assigned_variant.as_deref().unwrap_or("-"),
                e.assigned_duration
                    .map(|d| format!("{}s", d))
                    .unwrap_or_else(|| "-".into()),
                e.location
            )
        })
        .collect();

    let props: Vec<String> = props_by_location(plan)
        .into_iter()
        .flat_map(|(site, props)| props.into_iter().map(move |p| format!("{} ({})", p, site)))
        .collect();

    if !props.is_empty() {
        lines.push("Props:".into());
        lines.extend(
            props
                .into_iter()
                .enumerate()
                .map(|(idx, p)| format!("{}. {}", idx + 1, p)),
        );
    }

    lines
}
