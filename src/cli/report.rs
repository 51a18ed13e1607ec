use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    recorder::{
        entities::{CategoryDuration, Event},
        reconcile::{dropped_event_count, reconcile, RecordView},
        Recorder,
    },
    session::transcript::{read_transcript, replay},
    utils::{
        clock::{Clock, DefaultClock},
        percentage::duration_percentage,
        time::format_duration,
    },
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct TotalsCommand {
    #[arg(long, short, help = "Transcript file, one JSON event per line")]
    input: PathBuf,
    #[arg(
        long,
        help = "Instant open categories are measured up to. Examples are \"1 hour ago\", \"12:00 16/03/2025\". Defaults to now"
    )]
    at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Command to process `totals` command. Replays a transcript and prints how long every category
/// was active.
pub async fn process_totals_command(
    TotalsCommand {
        input,
        at,
        date_style,
    }: TotalsCommand,
) -> Result<()> {
    let now = parse_instant(at, date_style, &DefaultClock)?;
    let (recorder, rejected) = replay(read_transcript(&input).await?);
    if rejected > 0 {
        println!("{rejected} events had no matching START and were not counted");
    }

    for line in totals_lines(&recorder, now) {
        println!("{line}");
    }
    Ok(())
}

/// Command to process `records` command. Prints every closed interval of a transcript.
pub async fn process_records_command(input: &Path) -> Result<()> {
    let events = read_transcript(input).await?;

    for line in records_lines(&events) {
        println!("{line}");
    }
    let dropped = dropped_event_count(&events);
    if dropped > 0 {
        println!("{dropped} events were not part of any interval");
    }
    Ok(())
}

fn parse_instant(
    at: Option<String>,
    date_style: DateStyle,
    clock: &impl Clock,
) -> Result<DateTime<Utc>> {
    let now = clock.time();
    let Some(at) = at else {
        return Ok(now);
    };
    match parse_date_string(&at, now.with_timezone(&Local), date_style.into()) {
        Ok(v) => Ok(v.with_timezone(&Utc)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate instant {e}"),
            )
            .into()),
    }
}

fn totals_lines(recorder: &Recorder, now: DateTime<Utc>) -> Vec<String> {
    let totals = recorder.get_all_total(now);
    let whole = totals
        .iter()
        .try_fold(Duration::zero(), |sum, v| sum.checked_add(&v.duration));

    totals
        .into_iter()
        .map(|CategoryDuration { category, duration }| {
            let share = whole
                .and_then(|whole| duration_percentage(duration, whole))
                .map(|v| format!("{}%", *v as i32))
                .unwrap_or_else(|| "-".into());
            let open = recorder
                .category_total(category.as_str())
                .is_some_and(|v| v.is_open());
            format!(
                "{category}\t{share}\t{}{}",
                format_duration(duration),
                if open { "\t(open)" } else { "" }
            )
        })
        .collect()
}

fn records_lines(events: &[Event]) -> Vec<String> {
    reconcile(events)
        .map(|view| format_record(&view))
        .collect()
}

fn format_record(view: &RecordView) -> String {
    let time_format = "%x %H:%M:%S";
    let mut line = format!(
        "{}\t{}\t{}\t{}",
        view.start.with_timezone(&Local).format(time_format),
        view.end.with_timezone(&Local).format(time_format),
        format_duration(view.duration()),
        view.category
    );
    if let Some(audio) = view.audio() {
        line += &format!("\t[{} {} bytes]", audio.mime_type, audio.len());
    }
    if let Some(text) = view.text() {
        line += &format!("\t{}", text.replace('\n', " "));
    }
    line
}
