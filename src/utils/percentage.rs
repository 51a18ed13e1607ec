use std::{fmt::Display, ops::Deref};

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `value` in `whole`. There is no meaningful share of an empty or negative whole, or of
/// a negative value, so those give `None`.
pub fn duration_percentage(value: Duration, whole: Duration) -> Option<Percentage> {
    if whole <= Duration::zero() {
        return None;
    }
    Percentage::new_opt(value.num_milliseconds() as f64 / whole.num_milliseconds() as f64 * 100.)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::duration_percentage;

    #[test]
    fn test_duration_percentage() {
        let share = duration_percentage(Duration::seconds(15), Duration::seconds(60)).unwrap();
        assert_eq!(*share, 25.);
        assert_eq!(share.to_string(), "25%");
        assert_eq!(duration_percentage(Duration::seconds(1), Duration::zero()), None);
        assert_eq!(
            duration_percentage(Duration::seconds(-1), Duration::seconds(10)),
            None
        );
    }
}
