use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    export::{export, Delimiter},
    recorder::{entities::Event, reconcile::reconcile},
    session::transcript::read_transcript,
};

#[derive(Debug, Parser)]
pub struct ExportCommand {
    #[arg(long, short, help = "Transcript file, one JSON event per line")]
    input: PathBuf,
    #[arg(long, short, default_value_t = Delimiter::Comma, help = "Field delimiter")]
    delimiter: Delimiter,
    #[arg(
        long,
        help = "Export closed intervals instead of the raw events"
    )]
    records: bool,
    #[arg(long, short, help = "Write into a file instead of stdout")]
    output: Option<PathBuf>,
}

/// Command to process `export` command.
pub async fn process_export_command(
    ExportCommand {
        input,
        delimiter,
        records,
        output,
    }: ExportCommand,
) -> Result<()> {
    let events = read_transcript(&input).await?;
    let text = render_export(&events, delimiter, records)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, text)
                .await
                .with_context(|| format!("Can't write export into {path:?}"))?;
            info!("Exported {input:?} into {path:?}");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn render_export(events: &[Event], delimiter: Delimiter, records: bool) -> Result<String> {
    let text = if records {
        export(&reconcile(events).collect::<Vec<_>>(), delimiter)?
    } else {
        export(events, delimiter)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::{
        export::Delimiter,
        recorder::entities::{Category, Event},
    };

    use super::render_export;

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(), NaiveTime::MIN);

    #[test]
    fn test_render_export() {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let category = Category::new("praise").unwrap();
        let events = vec![
            Event::start(category.clone(), start),
            Event::end(category, start + Duration::seconds(3)),
        ];

        assert_eq!(
            render_export(&events, Delimiter::Tab, false).unwrap(),
            "kind\tevent\ttime\npraise\tSTART\t2024-04-05T00:00:00Z\npraise\tEND\t2024-04-05T00:00:03Z"
        );
        assert_eq!(
            render_export(&events, Delimiter::Comma, true).unwrap(),
            "kind,start,end\npraise,2024-04-05T00:00:00Z,2024-04-05T00:00:03Z"
        );
        assert!(render_export(&[], Delimiter::Comma, false).is_err());
    }
}
