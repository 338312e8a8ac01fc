//! Quiz records and authoring validation.

use serde::{Deserialize, Serialize};

use crate::error::{ClubError, Result};

/// A multiple-choice quiz question. `correct_option` is a zero-based index
/// into `options`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

impl QuizItem {
    /// Build a quiz from raw authoring input: a comma-separated option list
    /// and a 1-based correct-answer number, as typed by a human.
    ///
    /// Empty options are trimmed away; at least two must survive, and the
    /// answer number must land inside the surviving list. Violations fail
    /// with a validation error and nothing is stored.
    pub fn from_author_input(
        question: impl Into<String>,
        raw_options: &str,
        correct_number: usize,
    ) -> Result<Self> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ClubError::validation("Question must not be empty"));
        }

        let options = parse_options(raw_options);
        if options.len() < 2 {
            return Err(ClubError::validation(
                "A quiz needs at least 2 non-empty options",
            ));
        }
        if correct_number < 1 || correct_number > options.len() {
            return Err(ClubError::validation(format!(
                "Correct answer number must be between 1 and {}",
                options.len()
            )));
        }

        Ok(Self {
            id: None,
            question,
            options,
            // Authors count from 1, storage counts from 0.
            correct_option: correct_number - 1,
        })
    }

    /// Check the stored-shape invariant: ≥2 options, correct index in range.
    pub fn validate(&self) -> Result<()> {
        if self.options.len() < 2 {
            return Err(ClubError::validation(
                "A quiz needs at least 2 options",
            ));
        }
        if self.correct_option >= self.options.len() {
            return Err(ClubError::validation(format!(
                "correct_option {} is out of range for {} options",
                self.correct_option,
                self.options.len()
            )));
        }
        Ok(())
    }

    /// The text of the correct option.
    pub fn correct_text(&self) -> &str {
        &self.options[self.correct_option]
    }
}

/// Split a comma-separated option list, trimming whitespace and discarding
/// empty entries.
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Partial update for a quiz record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_trims_and_drops_empties() {
        assert_eq!(parse_options("A, B,,  C"), vec!["A", "B", "C"]);
        assert_eq!(parse_options("  ,, "), Vec::<String>::new());
    }

    #[test]
    fn test_authoring_converts_one_based_answer() {
        let quiz = QuizItem::from_author_input("Which port is SSH?", "21, 22, 23", 2)
            .expect("valid authoring input");
        assert_eq!(quiz.options, vec!["21", "22", "23"]);
        assert_eq!(quiz.correct_option, 1);
        assert_eq!(quiz.correct_text(), "22");
    }

    #[test]
    fn test_authoring_rejects_out_of_range_answer() {
        assert!(matches!(
            QuizItem::from_author_input("Q", "A, B, C", 0),
            Err(ClubError::Validation(_))
        ));
        assert!(matches!(
            QuizItem::from_author_input("Q", "A, B, C", 4),
            Err(ClubError::Validation(_))
        ));
    }

    #[test]
    fn test_authoring_rejects_too_few_options() {
        assert!(matches!(
            QuizItem::from_author_input("Q", "only-one,,  ", 1),
            Err(ClubError::Validation(_))
        ));
    }

    #[test]
    fn test_authoring_rejects_blank_question() {
        assert!(matches!(
            QuizItem::from_author_input("   ", "A, B", 1),
            Err(ClubError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_stored_shape() {
        let good = QuizItem {
            id: None,
            question: "Q".into(),
            options: vec!["X".into(), "Y".into()],
            correct_option: 0,
        };
        assert!(good.validate().is_ok());

        let bad = QuizItem { correct_option: 2, ..good };
        assert!(bad.validate().is_err());
    }
}
