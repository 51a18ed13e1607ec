//! A recording session ties a [ButtonPanel] to a [Recorder] and stamps button presses with a
//! [Clock]. A session is owned by whatever drives the lesson. There is no global recorder.

pub mod buttons;
pub mod transcript;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::{
    error::{Error, Result},
    recorder::{
        entities::{Category, CategoryDuration, Event, Payload},
        reconcile::RecordViews,
        Recorder,
    },
    utils::clock::Clock,
};

use buttons::ButtonPanel;

pub struct Session {
    recorder: Recorder,
    panel: ButtonPanel,
    clock: Box<dyn Clock>,
}

impl Session {
    pub fn new(panel: ButtonPanel, clock: Box<dyn Clock>) -> Self {
        Self {
            recorder: Recorder::new(),
            panel,
            clock,
        }
    }

    /// Presses a button and records every event produced by the press.
    pub fn click(&mut self, name: &str) -> Result<()> {
        let now = self.clock.time();
        let events = self.panel.click(name, now)?;
        self.record_all(events)
    }

    /// Ends every active category, e.g. when the observer stops recording.
    pub fn stop(&mut self) -> Result<()> {
        let now = self.clock.time();
        let events = self.panel.deactivate_all(now);
        self.record_all(events)
    }

    /// Ends the active category `name` with `payload` attached. This is how the result of a
    /// capture that finished in the background reaches the log: exactly one END per capture.
    pub fn close_with_payload(&mut self, name: &str, payload: Payload) -> Result<()> {
        let Some(category) = self.panel.release(name) else {
            return Err(Error::InvalidState {
                category: Category::new(name)?,
            });
        };
        let now = self.clock.time();
        self.recorder
            .record(Event::end(category, now).with_payload(payload))
    }

    /// Live totals at the current instant of the session clock.
    pub fn totals(&self) -> Vec<CategoryDuration> {
        self.recorder.get_all_total(self.now())
    }

    pub fn records(&self) -> RecordViews<'_> {
        self.recorder.records()
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn panel(&self) -> &ButtonPanel {
        &self.panel
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.time()
    }

    /// Starts over with an empty log and every button switched off.
    pub fn reset(&mut self) {
        debug!("Resetting session");
        let now = self.clock.time();
        self.panel.deactivate_all(now);
        self.recorder.reset();
    }

    fn record_all(&mut self, events: Vec<Event>) -> Result<()> {
        for event in events {
            self.recorder
                .record(event)
                .inspect_err(|e| error!("Panel and recorder disagree: {e}"))?;
        }
        Ok(())
    }
}
