//! Reading of event transcripts saved by the observation UI.
//!
//! A transcript stores one JSON encoded [EventEntity] per line, in the order the events were
//! recorded.

use std::path::Path;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use fs4::tokio::AsyncFileExt;
use serde::{Deserialize, Serialize};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::{debug, warn};

use crate::{
    error::Error,
    recorder::{
        entities::{AudioClip, Event, Payload},
        Recorder,
    },
};

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct EventEntity {
    pub kind: String,
    pub event: String,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioEntity>,
}

/// Audio is stored inline as base64.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AudioEntity {
    pub mime_type: String,
    pub data: String,
}

impl TryFrom<EventEntity> for Event {
    type Error = Error;

    fn try_from(
        EventEntity {
            kind,
            event,
            time,
            text,
            audio,
        }: EventEntity,
    ) -> Result<Self, Self::Error> {
        let audio = audio
            .map(|v| {
                STANDARD
                    .decode(v.data.as_bytes())
                    .map(|data| AudioClip::new(&v.mime_type, data))
                    .map_err(|e| Error::InvalidArgument(format!("audio isn't valid base64: {e}")))
            })
            .transpose()?;

        Ok(Event::parse(&kind, &event, time)?.with_payload(Payload { audio, text }))
    }
}

impl From<&Event> for EventEntity {
    fn from(event: &Event) -> Self {
        let payload = event.payload.clone().unwrap_or_default();
        EventEntity {
            kind: event.category.to_string(),
            event: event.transition.to_string(),
            time: event.timestamp,
            text: payload.text,
            audio: payload.audio.map(|v| AudioEntity {
                mime_type: v.mime_type.to_string(),
                data: STANDARD.encode(&v.data),
            }),
        }
    }
}

/// Reads every event of the transcript at `path`. Lines that can't be parsed are skipped: a
/// transcript cut short by a crash still loads up to the broken line.
pub async fn read_transcript(path: &Path) -> Result<Vec<Event>> {
    debug!("Reading transcript {path:?}");
    let file = File::open(path)
        .await
        .with_context(|| format!("Can't open transcript {path:?}"))?;
    file.lock_shared()?;
    let buffer = BufReader::new(file);
    let mut lines = buffer.lines();
    let mut events = vec![];
    let mut line_number = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let entity = match serde_json::from_str::<EventEntity>(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping illegal json at {path:?}:{line_number} {line}: {e}");
                continue;
            }
        };
        match Event::try_from(entity) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping illegal event at {path:?}:{line_number}: {e}"),
        }
    }

    lines.into_inner().into_inner().unlock_async().await?;

    Ok(events)
}

/// Feeds `events` into a fresh recorder. Events the recorder rejects stay in its log and are
/// counted instead of aborting the replay.
pub fn replay(events: impl IntoIterator<Item = Event>) -> (Recorder, usize) {
    let mut recorder = Recorder::new();
    let mut rejected = 0;
    for event in events {
        if let Err(e) = recorder.record(event) {
            warn!("Replayed event was rejected: {e}");
            rejected += 1;
        }
    }
    (recorder, rejected)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
    use tempfile::NamedTempFile;

    use crate::{
        recorder::entities::{AudioClip, Category, Event, Payload, Transition},
        utils::logging::TEST_LOGGING,
    };

    use super::{read_transcript, replay, EventEntity};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(), NaiveTime::MIN);

    fn transcript(lines: &[String]) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        file.flush()?;
        Ok(file)
    }

    #[tokio::test]
    async fn test_read_transcript_basic() -> Result<()> {
        *TEST_LOGGING;
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let category = Category::new("explanation")?;
        let events = vec![
            Event::start(category.clone(), start),
            Event::end(category, start + Duration::seconds(42)).with_payload(Payload {
                audio: Some(AudioClip::new("audio/webm", vec![1u8, 2, 3, 4])),
                text: Some("teacher explains fractions".into()),
            }),
        ];
        let lines = events
            .iter()
            .map(|v| serde_json::to_string(&EventEntity::from(v)))
            .collect::<Result<Vec<_>, _>>()?;
        let file = transcript(&lines)?;

        let read = read_transcript(file.path()).await?;
        assert_eq!(read, events);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_transcript_skips_broken_lines() -> Result<()> {
        *TEST_LOGGING;
        let file = transcript(&[
            r#"{"kind":"a","event":"START","time":"2024-04-05T00:00:00Z"}"#.into(),
            r#"{"kind":"a","event":"PAUSE","time":"2024-04-05T00:00:01Z"}"#.into(),
            "".into(),
            r#"{"kind":"a","event":"END","time":"2024-04-05T00:00:05Z"}"#.into(),
            r#"{"kind":"a","event":"STA"#.into(),
        ])?;

        let read = read_transcript(file.path()).await?;
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].transition, Transition::Start);
        assert_eq!(read[1].transition, Transition::End);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_transcript_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_transcript(&dir.path().join("missing.jsonl"))
            .await
            .is_err());
    }

    #[test]
    fn test_replay_counts_rejected_events() {
        *TEST_LOGGING;
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let a = Category::new("a").unwrap();
        let b = Category::new("b").unwrap();
        let events = vec![
            Event::end(b, start),
            Event::start(a.clone(), start),
            Event::end(a, start + Duration::seconds(5)),
        ];

        let (recorder, rejected) = replay(events);
        assert_eq!(rejected, 1);
        assert_eq!(recorder.log().len(), 3);
        assert_eq!(
            recorder.get_total("a", start + Duration::seconds(60)),
            Duration::seconds(5)
        );
    }
}
