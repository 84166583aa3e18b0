//! Per-episode parameter resolution.
//!
//! Once per reset the resolver picks the episode's level, population
//! counts, pool capacities, and time limit from exactly one source, highest
//! precedence first:
//!
//! 1. **Heuristic**: some agent of the ending episode (or the decision
//!    source itself) is heuristic-driven, so manual values apply.
//! 2. **Manual override**: `manual.override_level` is set.
//! 3. **Curriculum**: values come from the attached [`CurriculumSource`],
//!    each key falling back to a fixed default when absent.
//!
//! With no curriculum attached the manual values apply.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tracing::{debug, info, warn};

use freezetag_types::{Level, Outcome};

use crate::config::ManualConfig;

/// Curriculum key for the level index.
pub const LEVEL_INDEX_KEY: &str = "level_index";
/// Curriculum key for the runner count.
pub const NUM_RUNNERS_KEY: &str = "num_runners";
/// Curriculum key for the tagger count.
pub const NUM_TAGGERS_KEY: &str = "num_taggers";
/// Curriculum key for the food pool capacity.
pub const NUM_FOODBALLS_KEY: &str = "num_foodballs";
/// Curriculum key for the freeze charge pool capacity.
pub const NUM_FREEZEBALLS_KEY: &str = "num_freezeballs";
/// Curriculum key for the time limit in seconds.
pub const TIME_LIMIT_KEY: &str = "time_limit";

const CURRICULUM_LEVEL_INDEX: f64 = 0.0;
const CURRICULUM_NUM_RUNNERS: f64 = 5.0;
const CURRICULUM_NUM_TAGGERS: f64 = 0.0;
const CURRICULUM_NUM_FOODBALLS: f64 = 10.0;
const CURRICULUM_NUM_FREEZEBALLS: f64 = 5.0;
const CURRICULUM_TIME_LIMIT: f64 = 60.0;

/// Largest population or pool count a curriculum may request.
pub const MAX_CURRICULUM_COUNT: u32 = 1000;

/// An external provider of string-keyed numeric episode parameters.
pub trait CurriculumSource: Send {
    /// Value for `key`, or `None` if the source does not define it.
    fn get(&self, key: &str) -> Option<f64>;

    /// Notification that an episode ended with `outcome`. Sources that
    /// advance through lessons use this to count episodes.
    fn episode_ended(&mut self, _outcome: Outcome) {}
}

/// A fixed set of curriculum values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapCurriculum {
    values: Vec<(String, f64)>,
}

impl MapCurriculum {
    /// An empty curriculum; every key falls back to its default.
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Set `key` to `value`, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.values.retain(|(k, _)| k != key);
        self.values.push((key.to_owned(), value));
        self
    }
}

impl CurriculumSource for MapCurriculum {
    fn get(&self, key: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }
}

/// Which source produced the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSource {
    /// A heuristic-driven agent forced manual values.
    Heuristic,
    /// The manual override flag (or a missing curriculum) forced manual
    /// values.
    Manual,
    /// Values came from the curriculum.
    Curriculum,
}

/// Parameters for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParameters {
    /// Where the values came from.
    pub source: ParameterSource,
    /// Raw level index, kept for change reporting.
    pub level_index: i64,
    /// Level played.
    pub level: Level,
    /// Runners to spawn.
    pub num_runners: u32,
    /// Taggers to spawn (pursuit only).
    pub num_taggers: u32,
    /// Food pool capacity.
    pub food_capacity: u32,
    /// Freeze charge pool capacity.
    pub charge_capacity: u32,
    /// Time limit in milliseconds.
    pub time_limit_ms: u64,
}

/// The result of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The parameters.
    pub params: ResolvedParameters,
    /// Level index of the previous episode, if there was one.
    pub previous_level_index: Option<i64>,
}

impl Resolution {
    /// Whether the level index differs from the previous episode's.
    pub fn level_changed(&self) -> bool {
        self.previous_level_index
            .is_some_and(|prev| prev != self.params.level_index)
    }
}

/// Chooses each episode's parameters.
pub struct ParameterResolver {
    manual: ManualConfig,
    curriculum: Option<Box<dyn CurriculumSource>>,
    previous_level_index: Option<i64>,
}

impl core::fmt::Debug for ParameterResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParameterResolver")
            .field("manual", &self.manual)
            .field("has_curriculum", &self.curriculum.is_some())
            .field("previous_level_index", &self.previous_level_index)
            .finish()
    }
}

impl ParameterResolver {
    /// A resolver that always uses `manual`.
    pub const fn manual(manual: ManualConfig) -> Self {
        Self {
            manual,
            curriculum: None,
            previous_level_index: None,
        }
    }

    /// A resolver that consults `curriculum` unless a higher-precedence
    /// source applies.
    pub fn with_curriculum(manual: ManualConfig, curriculum: Box<dyn CurriculumSource>) -> Self {
        Self {
            manual,
            curriculum: Some(curriculum),
            previous_level_index: None,
        }
    }

    /// Resolve parameters for the next episode.
    ///
    /// `heuristic` reports whether any agent of the ending episode, or the
    /// decision source, is heuristic-driven.
    pub fn resolve(&mut self, heuristic: bool) -> Resolution {
        let params = match (&self.curriculum, heuristic, self.manual.override_level) {
            (_, true, _) => self.manual_params(ParameterSource::Heuristic),
            (_, false, true) | (None, false, false) => self.manual_params(ParameterSource::Manual),
            (Some(curriculum), false, false) => self.curriculum_params(curriculum.as_ref()),
        };

        let previous_level_index = self.previous_level_index.replace(params.level_index);
        let resolution = Resolution {
            params,
            previous_level_index,
        };
        if resolution.level_changed() {
            info!(
                from = ?previous_level_index,
                to = params.level_index,
                level = %params.level,
                "level changed"
            );
        }
        debug!(source = ?params.source, ?params, "episode parameters resolved");
        resolution
    }

    /// Forward an episode outcome to the curriculum, if any.
    pub fn episode_ended(&mut self, outcome: Outcome) {
        if let Some(curriculum) = self.curriculum.as_mut() {
            curriculum.episode_ended(outcome);
        }
    }

    fn manual_params(&self, source: ParameterSource) -> ResolvedParameters {
        let manual = &self.manual;
        ResolvedParameters {
            source,
            level_index: manual.level_index,
            level: Level::from_index(manual.level_index),
            num_runners: manual.num_runners,
            num_taggers: manual.num_taggers,
            food_capacity: manual.num_foodballs,
            charge_capacity: manual.num_freezeballs,
            time_limit_ms: self.manual_time_limit_ms(),
        }
    }

    fn curriculum_params(&self, curriculum: &dyn CurriculumSource) -> ResolvedParameters {
        let read = |key: &str, default: f64| curriculum.get(key).unwrap_or(default);
        let level_index = truncate_i64(read(LEVEL_INDEX_KEY, CURRICULUM_LEVEL_INDEX));
        let time_limit_secs = read(TIME_LIMIT_KEY, CURRICULUM_TIME_LIMIT);
        let time_limit_ms = secs_to_ms(time_limit_secs).unwrap_or_else(|| {
            warn!(
                time_limit = time_limit_secs,
                fallback_secs = self.manual.time_limit_secs,
                "curriculum time limit unusable, using manual value"
            );
            self.manual_time_limit_ms()
        });

        ResolvedParameters {
            source: ParameterSource::Curriculum,
            level_index,
            level: Level::from_index(level_index),
            num_runners: capped_count(NUM_RUNNERS_KEY, read(NUM_RUNNERS_KEY, CURRICULUM_NUM_RUNNERS)),
            num_taggers: capped_count(NUM_TAGGERS_KEY, read(NUM_TAGGERS_KEY, CURRICULUM_NUM_TAGGERS)),
            food_capacity: capped_count(
                NUM_FOODBALLS_KEY,
                read(NUM_FOODBALLS_KEY, CURRICULUM_NUM_FOODBALLS),
            ),
            charge_capacity: capped_count(
                NUM_FREEZEBALLS_KEY,
                read(NUM_FREEZEBALLS_KEY, CURRICULUM_NUM_FREEZEBALLS),
            ),
            time_limit_ms,
        }
    }

    fn manual_time_limit_ms(&self) -> u64 {
        secs_to_ms(self.manual.time_limit_secs).unwrap_or_else(|| {
            warn!(
                time_limit = self.manual.time_limit_secs,
                "manual time limit unusable, using 60 seconds"
            );
            60_000
        })
    }
}

/// Truncate a curriculum count and cap it at [`MAX_CURRICULUM_COUNT`].
fn capped_count(key: &str, value: f64) -> u32 {
    let count = truncate_count(value);
    if count > MAX_CURRICULUM_COUNT {
        warn!(
            key,
            requested = value,
            cap = MAX_CURRICULUM_COUNT,
            "curriculum count too large, capping"
        );
        return MAX_CURRICULUM_COUNT;
    }
    count
}

/// Truncate toward zero; negatives and NaN become 0, huge values saturate.
fn truncate_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    Decimal::from_f64(value)
        .and_then(|d| d.trunc().to_u32())
        .unwrap_or(u32::MAX)
}

/// Truncate toward zero; NaN becomes 0, out-of-range values saturate.
fn truncate_i64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    Decimal::from_f64(value)
        .and_then(|d| d.trunc().to_i64())
        .unwrap_or(if value < 0.0 { i64::MIN } else { i64::MAX })
}

/// Seconds to whole milliseconds. `None` for non-positive, non-finite, or
/// unrepresentable values.
fn secs_to_ms(secs: f64) -> Option<u64> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Decimal::from_f64(secs)?
        .checked_mul(Decimal::ONE_THOUSAND)?
        .round()
        .to_u64()
        .filter(|ms| *ms > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn manual() -> ManualConfig {
        ManualConfig {
            level_index: 1,
            num_runners: 4,
            num_taggers: 2,
            num_foodballs: 3,
            num_freezeballs: 7,
            time_limit_secs: 30.0,
            ..ManualConfig::default()
        }
    }

    #[test]
    fn no_curriculum_uses_manual() {
        let mut resolver = ParameterResolver::manual(manual());
        let params = resolver.resolve(false).params;
        assert_eq!(params.source, ParameterSource::Manual);
        assert_eq!(params.level, Level::Pursuit);
        assert_eq!(params.num_runners, 4);
        assert_eq!(params.charge_capacity, 7);
        assert_eq!(params.time_limit_ms, 30_000);
    }

    #[test]
    fn curriculum_with_defaults() {
        let curriculum = MapCurriculum::new().with(NUM_RUNNERS_KEY, 8.9);
        let mut resolver = ParameterResolver::with_curriculum(manual(), Box::new(curriculum));
        let params = resolver.resolve(false).params;
        assert_eq!(params.source, ParameterSource::Curriculum);
        assert_eq!(params.num_runners, 8);
        assert_eq!(params.num_taggers, 0);
        assert_eq!(params.food_capacity, 10);
        assert_eq!(params.charge_capacity, 5);
        assert_eq!(params.level, Level::Forage);
        assert_eq!(params.time_limit_ms, 60_000);
    }

    #[test]
    fn heuristic_beats_curriculum() {
        let curriculum = MapCurriculum::new().with(LEVEL_INDEX_KEY, 0.0);
        let mut resolver = ParameterResolver::with_curriculum(manual(), Box::new(curriculum));
        let params = resolver.resolve(true).params;
        assert_eq!(params.source, ParameterSource::Heuristic);
        assert_eq!(params.level_index, 1);
    }

    #[test]
    fn override_flag_beats_curriculum() {
        let mut config = manual();
        config.override_level = true;
        let curriculum = MapCurriculum::new().with(NUM_RUNNERS_KEY, 9.0);
        let mut resolver = ParameterResolver::with_curriculum(config, Box::new(curriculum));
        let params = resolver.resolve(false).params;
        assert_eq!(params.source, ParameterSource::Manual);
        assert_eq!(params.num_runners, 4);
    }

    #[test]
    fn negative_counts_clamp_and_bad_time_falls_back() {
        let curriculum = MapCurriculum::new()
            .with(NUM_TAGGERS_KEY, -3.0)
            .with(TIME_LIMIT_KEY, f64::NAN);
        let mut resolver = ParameterResolver::with_curriculum(manual(), Box::new(curriculum));
        let params = resolver.resolve(false).params;
        assert_eq!(params.num_taggers, 0);
        assert_eq!(params.time_limit_ms, 30_000);
    }

    #[test]
    fn huge_curriculum_counts_are_capped() {
        let curriculum = MapCurriculum::new()
            .with(NUM_RUNNERS_KEY, 1e12)
            .with(NUM_FOODBALLS_KEY, f64::INFINITY)
            .with(NUM_FREEZEBALLS_KEY, 1000.0);
        let mut resolver = ParameterResolver::with_curriculum(manual(), Box::new(curriculum));
        let params = resolver.resolve(false).params;
        assert_eq!(params.num_runners, MAX_CURRICULUM_COUNT);
        assert_eq!(params.food_capacity, MAX_CURRICULUM_COUNT);
        assert_eq!(params.charge_capacity, 1000);
        assert_eq!(params.num_taggers, 0);
    }

    #[test]
    fn level_change_is_reported() {
        let mut resolver = ParameterResolver::with_curriculum(
            manual(),
            Box::new(MapCurriculum::new().with(LEVEL_INDEX_KEY, 0.0)),
        );
        let first = resolver.resolve(false);
        assert_eq!(first.previous_level_index, None);
        assert!(!first.level_changed());

        let second = resolver.resolve(true);
        assert_eq!(second.previous_level_index, Some(0));
        assert!(second.level_changed());

        let third = resolver.resolve(true);
        assert!(!third.level_changed());
    }

    #[test]
    fn non_canonical_level_index_plays_forage() {
        let curriculum = MapCurriculum::new().with(LEVEL_INDEX_KEY, 2.7);
        let mut resolver = ParameterResolver::with_curriculum(manual(), Box::new(curriculum));
        let params = resolver.resolve(false).params;
        assert_eq!(params.level_index, 2);
        assert_eq!(params.level, Level::Forage);
    }
}
