use std::{borrow::Borrow, fmt::Display, str::FromStr, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Name of an observed activity, for example "explanation" or "interaction". Never empty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(Arc<str>);

impl Category {
    /// Keeps `name` exactly as given. Names made only of whitespace are rejected.
    pub fn new(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument("category name can't be empty".into()));
        }
        Ok(Self(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Category {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Category::new(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transition {
    Start,
    End,
}

impl Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Start => write!(f, "START"),
            Transition::End => write!(f, "END"),
        }
    }
}

impl FromStr for Transition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "START" => Ok(Transition::Start),
            "END" => Ok(Transition::End),
            other => Err(Error::InvalidArgument(format!(
                "unknown transition {other:?}, expected START or END"
            ))),
        }
    }
}

/// Binary audio produced by the capture side. The bytes are shared, so cloning events and record
/// views doesn't copy the clip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioClip {
    pub mime_type: Arc<str>,
    pub data: Arc<[u8]>,
}

impl AudioClip {
    pub fn new(mime_type: &str, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Exports only see a short description of the clip. Raw audio never ends up in a text export.
impl Serialize for AudioClip {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{} ({} bytes)", self.mime_type, self.data.len()))
    }
}

/// Data attached to an END event once the matching capture finished.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioClip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Payload {
    pub fn audio(audio: AudioClip) -> Self {
        Self {
            audio: Some(audio),
            text: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            audio: None,
            text: Some(text.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.text.is_none()
    }
}

/// A single button press. Events are never changed after they enter the log.
///
/// Serialized field names follow the exported column names: `kind`, `event`, `time`, then
/// `audio` and `text` when present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(rename = "kind")]
    pub category: Category,
    #[serde(rename = "event")]
    pub transition: Transition,
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Option<Payload>,
}

impl Event {
    pub fn new(category: Category, transition: Transition, timestamp: DateTime<Utc>) -> Self {
        Self {
            category,
            transition,
            timestamp,
            payload: None,
        }
    }

    pub fn start(category: Category, timestamp: DateTime<Utc>) -> Self {
        Self::new(category, Transition::Start, timestamp)
    }

    pub fn end(category: Category, timestamp: DateTime<Utc>) -> Self {
        Self::new(category, Transition::End, timestamp)
    }

    /// Builds an event out of loosely typed input, e.g. values coming from a UI or a file.
    pub fn parse(category: &str, transition: &str, timestamp: DateTime<Utc>) -> Result<Self> {
        Ok(Self::new(
            Category::new(category)?,
            transition.parse()?,
            timestamp,
        ))
    }

    /// Empty payloads are dropped so that `payload.is_some()` always means there is something
    /// attached.
    pub fn with_payload(self, payload: Payload) -> Self {
        Self {
            payload: (!payload.is_empty()).then_some(payload),
            ..self
        }
    }

    pub fn is_start(&self) -> bool {
        self.transition == Transition::Start
    }

    pub fn is_end(&self) -> bool {
        self.transition == Transition::End
    }
}

/// Running total of one category.
///
/// `open_since` is set only while the latest event of the category is a START that hasn't been
/// closed yet. `accumulated` covers closed intervals only and may go negative when timestamps
/// were supplied out of order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub accumulated: Duration,
    pub open_since: Option<DateTime<Utc>>,
}

impl CategoryTotal {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            accumulated: Duration::zero(),
            open_since: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open_since.is_some()
    }

    /// Total including the currently open interval, measured up to `now`. Saturates at the
    /// bounds of [Duration].
    pub fn live(&self, now: DateTime<Utc>) -> Duration {
        let Some(open_since) = self.open_since else {
            return self.accumulated;
        };
        let open = now - open_since;
        self.accumulated.checked_add(&open).unwrap_or(if open < Duration::zero() {
            Duration::min_value()
        } else {
            Duration::max_value()
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryDuration {
    pub category: Category,
    pub duration: Duration,
}
