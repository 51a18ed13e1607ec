use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::entities::{AudioClip, Category, Event};

/// A closed START→END interval reconstructed from the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordView {
    #[serde(rename = "kind")]
    pub category: Category,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Option<RecordPayload>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioClip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_text: Option<String>,
}

impl RecordView {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn audio(&self) -> Option<&AudioClip> {
        self.payload.as_ref().and_then(|v| v.audio.as_ref())
    }

    pub fn text(&self) -> Option<&str> {
        self.payload.as_ref().and_then(|v| v.text.as_deref())
    }

    /// Fills `rendered_text` by running `render` over the attached text. Views without text are
    /// returned unchanged.
    pub fn with_rendered_text(self, render: impl FnOnce(&str) -> String) -> Self {
        let payload = self.payload.map(|payload| RecordPayload {
            rendered_text: payload.text.as_deref().map(render),
            ..payload
        });
        Self { payload, ..self }
    }
}

/// Lazily pairs the entries of an event log. Produced by [reconcile].
#[derive(Clone, Debug)]
pub struct RecordViews<'a> {
    log: &'a [Event],
    position: usize,
}

impl Iterator for RecordViews<'_> {
    type Item = RecordView;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position + 1 < self.log.len() {
            let start = &self.log[self.position];
            let end = &self.log[self.position + 1];
            self.position += 1;

            if start.is_start() && end.is_end() && start.category == end.category {
                return Some(RecordView {
                    category: start.category.clone(),
                    start: start.timestamp,
                    end: end.timestamp,
                    payload: end.payload.as_ref().map(|payload| RecordPayload {
                        audio: payload.audio.clone(),
                        text: payload.text.clone(),
                        rendered_text: None,
                    }),
                });
            }
        }
        self.position = self.log.len();
        None
    }
}

/// Turns the log into closed intervals, in log order.
///
/// Only a START immediately followed by an END of the same category forms an interval. Everything
/// else is dropped without an error: a START followed by another START, an END of another
/// category, an END without a START and a START at the end of the log. This also means that
/// categories recorded at the same time, with interleaved events, lose their intervals. Use
/// [dropped_event_count] to find out how much of the log didn't make it.
///
/// The function doesn't touch the log, so calling it again on the same log gives the same views,
/// and calling it on a longer log only appends the newly closed intervals.
pub fn reconcile(log: &[Event]) -> RecordViews<'_> {
    RecordViews { log, position: 0 }
}

/// Number of log entries that are not part of any reconciled interval.
pub fn dropped_event_count(log: &[Event]) -> usize {
    log.len() - 2 * reconcile(log).count()
}
