//! Recording core of a lesson observation.
//!
//!  - [Recorder] keeps the append-only event log and running per-category totals.
//!  - [reconcile::reconcile] turns the log into closed START→END intervals.
//!
//! Nothing in here reads a clock. Every query that depends on "now" receives it as an argument.

pub mod entities;
pub mod reconcile;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

use entities::{Category, CategoryDuration, CategoryTotal, Event, Transition};
use reconcile::{reconcile, RecordViews};

/// Event log plus the totals derived from it. One recorder corresponds to one observed lesson.
///
/// The recorder expects to be driven by a single caller at a time and does no locking.
#[derive(Debug, Default)]
pub struct Recorder {
    log: Vec<Event>,
    totals: Vec<CategoryTotal>,
    index: HashMap<Category, usize>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` to the log and updates the totals of its category.
    ///
    /// The event is kept in the log even when it is rejected, so the log stays a faithful
    /// transcript of what was pressed. A START on an already open category moves the open
    /// timestamp to the new START. An END without an open START fails with
    /// [Error::InvalidState]. An END whose interval would push the total out of the range of
    /// [Duration] fails with [Error::InvalidArgument] and leaves the totals as they were.
    #[instrument(skip_all, fields(kind = %event.category, event = %event.transition, time = %event.timestamp))]
    pub fn record(&mut self, event: Event) -> Result<()> {
        let category = event.category.clone();
        let transition = event.transition;
        let timestamp = event.timestamp;

        self.log.push(event);
        let total = self.total_mut(category);

        match transition {
            Transition::Start => {
                if let Some(previous) = total.open_since.replace(timestamp) {
                    debug!("Category was already open since {previous}, latest START wins");
                }
            }
            Transition::End => {
                let Some(open_since) = total.open_since else {
                    warn!("END without an open START");
                    return Err(Error::InvalidState {
                        category: total.category.clone(),
                    });
                };
                let delta = timestamp - open_since;
                if delta < Duration::zero() {
                    warn!("Interval ends before it starts, delta {delta}");
                }
                // Totals stay untouched when the sum doesn't fit, the category remains open.
                let Some(accumulated) = total.accumulated.checked_add(&delta) else {
                    warn!("Adding {delta} to {} overflows", total.accumulated);
                    return Err(Error::InvalidArgument("duration out of range".into()));
                };
                total.accumulated = accumulated;
                total.open_since = None;
            }
        }
        debug!("Recorded event, total {}", total.accumulated);
        Ok(())
    }

    /// Returns the total of `category` including an open interval measured up to `now`.
    /// Unknown categories have a zero total.
    pub fn get_total(&self, category: &str, now: DateTime<Utc>) -> Duration {
        match self.index.get(category) {
            Some(&i) => self.totals[i].live(now),
            None => {
                warn!("Category {category} has not been recorded");
                Duration::zero()
            }
        }
    }

    /// Totals of every known category in the order categories first appeared. All open intervals
    /// are measured against the same `now`.
    pub fn get_all_total(&self, now: DateTime<Utc>) -> Vec<CategoryDuration> {
        self.totals
            .iter()
            .map(|total| CategoryDuration {
                category: total.category.clone(),
                duration: total.live(now),
            })
            .collect()
    }

    pub fn category_total(&self, category: &str) -> Option<&CategoryTotal> {
        self.index.get(category).map(|&i| &self.totals[i])
    }

    pub fn log(&self) -> &[Event] {
        &self.log
    }

    /// Closed intervals of the current log. See [reconcile].
    pub fn records(&self) -> RecordViews<'_> {
        reconcile(&self.log)
    }

    /// Forgets every event and total. Used when a new lesson starts.
    pub fn reset(&mut self) {
        debug!("Resetting recorder with {} events", self.log.len());
        self.log.clear();
        self.totals.clear();
        self.index.clear();
    }

    fn total_mut(&mut self, category: Category) -> &mut CategoryTotal {
        let i = match self.index.get(&category) {
            Some(&i) => i,
            None => {
                let i = self.totals.len();
                self.totals.push(CategoryTotal::new(category.clone()));
                self.index.insert(category, i);
                i
            }
        };
        &mut self.totals[i]
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::{
        error::Error,
        recorder::{
            entities::{Category, Event},
            Recorder,
        },
        utils::logging::TEST_LOGGING,
    };

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(), NaiveTime::MIN);

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE) + Duration::seconds(seconds)
    }

    fn category(name: &str) -> Category {
        Category::new(name).unwrap()
    }

    #[test]
    fn test_closed_interval_adds_to_total() {
        *TEST_LOGGING;
        let mut recorder = Recorder::new();
        recorder.record(Event::start(category("a"), at(2))).unwrap();
        recorder.record(Event::end(category("a"), at(9))).unwrap();
        recorder.record(Event::start(category("a"), at(20))).unwrap();
        recorder.record(Event::end(category("a"), at(25))).unwrap();

        assert_eq!(recorder.get_total("a", at(100)), Duration::seconds(12));
        assert!(!recorder.category_total("a").unwrap().is_open());
    }

    #[test]
    fn test_end_without_start_is_rejected_but_logged() {
        *TEST_LOGGING;
        let mut recorder = Recorder::new();
        let result = recorder.record(Event::end(category("a"), at(5)));

        assert!(matches!(result, Err(Error::InvalidState { category }) if category.as_str() == "a"));
        assert_eq!(recorder.log().len(), 1);
        assert_eq!(recorder.get_total("a", at(10)), Duration::zero());
    }

    #[test]
    fn test_second_end_is_rejected() {
        let mut recorder = Recorder::new();
        recorder.record(Event::start(category("a"), at(0))).unwrap();
        recorder.record(Event::end(category("a"), at(3))).unwrap();
        assert!(matches!(
            recorder.record(Event::end(category("a"), at(4))),
            Err(Error::InvalidState { .. })
        ));
        assert_eq!(recorder.get_total("a", at(10)), Duration::seconds(3));
    }

    #[test]
    fn test_latest_start_wins() {
        let mut recorder = Recorder::new();
        recorder.record(Event::start(category("a"), at(0))).unwrap();
        recorder.record(Event::start(category("a"), at(3))).unwrap();
        recorder.record(Event::end(category("a"), at(10))).unwrap();

        assert_eq!(recorder.get_total("a", at(10)), Duration::seconds(7));
    }

    #[test]
    fn test_non_monotonic_timestamps_give_negative_total() {
        let mut recorder = Recorder::new();
        recorder.record(Event::start(category("a"), at(10))).unwrap();
        recorder.record(Event::end(category("a"), at(4))).unwrap();

        assert_eq!(recorder.get_total("a", at(20)), Duration::seconds(-6));
    }

    #[test]
    fn test_open_interval_is_measured_against_now() {
        let mut recorder = Recorder::new();
        recorder.record(Event::start(category("a"), at(0))).unwrap();
        recorder.record(Event::end(category("a"), at(5))).unwrap();
        recorder.record(Event::start(category("a"), at(10))).unwrap();
        recorder.record(Event::start(category("b"), at(12))).unwrap();

        assert_eq!(recorder.get_total("a", at(30)), Duration::seconds(25));

        let totals = recorder.get_all_total(at(30));
        let names = totals
            .iter()
            .map(|v| v.category.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(totals[0].duration, Duration::seconds(25));
        assert_eq!(totals[1].duration, Duration::seconds(18));
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        *TEST_LOGGING;
        let mut recorder = Recorder::new();
        let mut overflowed = false;
        for _ in 0..2000 {
            recorder
                .record(Event::start(category("a"), DateTime::<Utc>::MIN_UTC))
                .unwrap();
            let before = recorder.category_total("a").unwrap().clone();
            match recorder.record(Event::end(category("a"), DateTime::<Utc>::MAX_UTC)) {
                Ok(()) => continue,
                Err(e) => {
                    assert!(matches!(e, Error::InvalidArgument(_)));
                    assert_eq!(recorder.category_total("a"), Some(&before));
                    assert!(recorder.category_total("a").unwrap().is_open());
                    overflowed = true;
                    break;
                }
            }
        }
        assert!(overflowed);

        // Queries saturate instead of panicking.
        let now = DateTime::<Utc>::MAX_UTC;
        assert_eq!(recorder.get_total("a", now), Duration::max_value());
        assert_eq!(recorder.get_all_total(now)[0].duration, Duration::max_value());
    }

    #[test]
    fn test_unknown_category_has_zero_total() {
        *TEST_LOGGING;
        let recorder = Recorder::new();
        assert_eq!(recorder.get_total("missing", at(0)), Duration::zero());
        assert!(recorder.get_all_total(at(0)).is_empty());
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut recorder = Recorder::new();
        recorder.record(Event::start(category("a"), at(0))).unwrap();
        recorder.record(Event::end(category("a"), at(5))).unwrap();
        recorder.reset();

        assert!(recorder.log().is_empty());
        assert!(recorder.get_all_total(at(10)).is_empty());
        assert_eq!(recorder.records().count(), 0);
    }
}
