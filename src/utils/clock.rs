use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing the current instant to a recording session.
/// The recording core never asks for the time itself, so tests can replace the clock freely.
pub trait Clock: Send + Sync + 'static {
    fn time(&self) -> DateTime<Utc>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
