use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::feedback::prompt::{LessonMetadata, PromptTemplate};

#[derive(Debug, Parser)]
pub struct PromptCommand {
    #[arg(long, help = "File with a custom prompt. <<grade>>, <<subject>> and <<note>> are replaced")]
    template: Option<PathBuf>,
    #[arg(long)]
    grade: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long, help = "Goal of the lesson")]
    note: Option<String>,
}

pub fn process_prompt_command(
    PromptCommand {
        template,
        grade,
        subject,
        note,
    }: PromptCommand,
) -> Result<()> {
    let template = match template {
        Some(path) => PromptTemplate::from_file(&path)?,
        None => PromptTemplate::default(),
    };
    println!(
        "{}",
        template.render(&LessonMetadata {
            grade,
            subject,
            note
        })
    );
    Ok(())
}
