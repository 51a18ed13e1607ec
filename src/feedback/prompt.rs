//! Prompt sent along with a lesson recording.

use std::{fs, path::Path};

use anyhow::{Context, Result};

/// Default instructions for the model. `<<grade>>`, `<<subject>>` and `<<note>>` are replaced with
/// the lesson metadata.
pub const DEFAULT_PROMPT: &str = "\
You are an assistant that analyzes lessons and helps teachers run better ones.
The audio that follows contains what the teacher and the students said during the lesson.
Analyze it from the point of view below and give feedback grounded in concrete actions.

# Lesson overview
Grade: <<grade>>
Subject: <<subject>>
Lesson goal: <<note>>

# Point of view
How the teacher's actions relate to reaching the lesson goal

# Details of what was said
- What exactly did the teacher say during the lesson? List the teacher's statements as bullet points.
- What was the intent of each statement? (e.g. introduction, instruction, explanation, question, encouragement, evaluation)
";

const PLACEHOLDERS: [&str; 3] = ["<<grade>>", "<<subject>>", "<<note>>"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonMetadata {
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let template = fs::read_to_string(path)
            .with_context(|| format!("Can't read prompt template {path:?}"))?;
        Ok(Self::new(template))
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Fills every placeholder, ignoring case. Missing metadata becomes an empty string.
    pub fn render(&self, metadata: &LessonMetadata) -> String {
        let values = [&metadata.grade, &metadata.subject, &metadata.note];
        PLACEHOLDERS
            .iter()
            .zip(values)
            .fold(self.template.clone(), |text, (placeholder, value)| {
                replace_ignore_ascii_case(&text, placeholder, value.as_deref().unwrap_or_default())
            })
    }
}

/// `pattern` has to be ASCII. Lowercasing ASCII keeps byte offsets intact, so positions found in
/// the lowercased text are valid in the original one.
fn replace_ignore_ascii_case(text: &str, pattern: &str, replacement: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for (position, _) in lowered.match_indices(&pattern) {
        result.push_str(&text[last..position]);
        result.push_str(replacement);
        last = position + pattern.len();
    }
    result.push_str(&text[last..]);
    result
}

#[cfg(test)]
mod tests {
    use super::{LessonMetadata, PromptTemplate};

    #[test]
    fn test_render_replaces_placeholders() {
        let template = PromptTemplate::new("Grade <<grade>>, <<SUBJECT>>: <<Note>>. <<grade>>!");
        let rendered = template.render(&LessonMetadata {
            grade: Some("5".into()),
            subject: Some("math".into()),
            note: Some("fractions".into()),
        });
        assert_eq!(rendered, "Grade 5, math: fractions. 5!");
    }

    #[test]
    fn test_render_missing_values() {
        let template = PromptTemplate::new("算数 <<grade>>年 <<subject>>");
        let rendered = template.render(&LessonMetadata {
            grade: None,
            subject: Some("理科".into()),
            note: None,
        });
        assert_eq!(rendered, "算数 年 理科");
    }

    #[test]
    fn test_default_template_has_no_placeholders_left() {
        let rendered = PromptTemplate::default().render(&LessonMetadata::default());
        assert!(!rendered.contains("<<"));
        assert!(rendered.contains("Grade: \n"));
    }
}
