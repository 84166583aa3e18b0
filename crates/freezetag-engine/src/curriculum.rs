//! Lesson schedule: a file-driven curriculum.
//!
//! A schedule is an ordered list of lessons. Each lesson names a set of
//! curriculum values and how many episodes it must serve before the next
//! lesson takes over. The last lesson never ends.
//!
//! ```yaml
//! lessons:
//!   - name: forage
//!     min_episodes: 200
//!     level_index: 0
//!     num_runners: 3
//!   - name: pursuit
//!     level_index: 1
//!     num_taggers: 1
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use freezetag_core::CurriculumSource;
use freezetag_types::Outcome;

use crate::error::EngineError;

/// One stage of the curriculum.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lesson {
    /// Label used in logs.
    pub name: String,

    /// Episodes to play before moving on.
    #[serde(default)]
    pub min_episodes: u32,

    /// Curriculum keys and their values for this lesson.
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    lessons: Vec<Lesson>,
}

/// Curriculum that walks through lessons by episode count.
#[derive(Debug, Clone)]
pub struct LessonSchedule {
    lessons: Vec<Lesson>,
    current: usize,
    served: u32,
}

impl LessonSchedule {
    /// Start a schedule at its first lesson.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ScheduleInvalid`] for an empty schedule.
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, EngineError> {
        if lessons.is_empty() {
            return Err(EngineError::ScheduleInvalid {
                reason: "schedule has no lessons".to_owned(),
            });
        }
        Ok(Self {
            lessons,
            current: 0,
            served: 0,
        })
    }

    /// Load a schedule from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the file is unreadable, malformed, or
    /// empty.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EngineError::ScheduleIo {
            path: path.to_owned(),
            source,
        })?;
        let file: ScheduleFile =
            serde_yml::from_str(&contents).map_err(|source| EngineError::ScheduleParse {
                path: path.to_owned(),
                source,
            })?;
        Self::new(file.lessons)
    }

    /// The lesson currently in force.
    pub fn current(&self) -> Option<&Lesson> {
        self.lessons.get(self.current)
    }

    /// Position of the current lesson.
    pub const fn lesson_index(&self) -> usize {
        self.current
    }

    /// Episodes played in the current lesson.
    pub const fn served(&self) -> u32 {
        self.served
    }
}

impl CurriculumSource for LessonSchedule {
    fn get(&self, key: &str) -> Option<f64> {
        self.current()?.values.get(key).copied()
    }

    fn episode_ended(&mut self, _outcome: Outcome) {
        self.served = self.served.saturating_add(1);
        let Some(lesson) = self.current() else {
            return;
        };
        if self.served < lesson.min_episodes {
            return;
        }
        let next = self.current.saturating_add(1);
        if let Some(upcoming) = self.lessons.get(next) {
            info!(
                from = lesson.name,
                to = upcoming.name,
                episodes = self.served,
                "curriculum lesson advanced"
            );
            self.current = next;
            self.served = 0;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freezetag_core::params::{LEVEL_INDEX_KEY, NUM_RUNNERS_KEY, NUM_TAGGERS_KEY};

    use super::*;

    const SCHEDULE: &str = "
lessons:
  - name: forage
    min_episodes: 2
    level_index: 0
    num_runners: 3
  - name: pursuit
    min_episodes: 1
    level_index: 1
    num_taggers: 1
";

    fn schedule() -> LessonSchedule {
        let file: ScheduleFile = serde_yml::from_str(SCHEDULE).unwrap();
        LessonSchedule::new(file.lessons).unwrap()
    }

    #[test]
    fn lessons_carry_their_values() {
        let s = schedule();
        assert_eq!(s.current().unwrap().name, "forage");
        assert_eq!(s.get(NUM_RUNNERS_KEY), Some(3.0));
        assert_eq!(s.get(NUM_TAGGERS_KEY), None);
    }

    #[test]
    fn advances_after_quota_and_stays_on_last() {
        let mut s = schedule();
        s.episode_ended(Outcome::RunnersWin);
        assert_eq!(s.lesson_index(), 0);
        s.episode_ended(Outcome::RunnersWin);
        assert_eq!(s.lesson_index(), 1);
        assert_eq!(s.served(), 0);
        assert_eq!(s.get(LEVEL_INDEX_KEY), Some(1.0));

        for _ in 0..5 {
            s.episode_ended(Outcome::TaggersWin);
        }
        assert_eq!(s.lesson_index(), 1);
        assert_eq!(s.served(), 5);
    }

    #[test]
    fn empty_schedule_rejected() {
        assert!(matches!(
            LessonSchedule::new(Vec::new()),
            Err(EngineError::ScheduleInvalid { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LessonSchedule::from_file(Path::new("/nonexistent/lessons.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lessons.yaml"));
    }
}
