//! Puzzle data model and draft validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PuzzleId;

/// Minimum number of non-empty options for a multiple-choice puzzle.
pub const MIN_MCQ_OPTIONS: usize = 2;

/// Puzzle types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    /// Free-text answer compared case-insensitively.
    #[default]
    Short,
    /// Multiple choice with one correct option.
    Mcq,
}

impl PuzzleKind {
    /// Name used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleKind::Short => "short",
            PuzzleKind::Mcq => "mcq",
        }
    }

    /// Parse a stored kind name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "short" => Some(PuzzleKind::Short),
            "mcq" => Some(PuzzleKind::Mcq),
            _ => None,
        }
    }
}

/// A player's answer to a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Index of the chosen option.
    Choice(usize),
    /// Free text.
    Text(String),
}

/// How a puzzle decides whether an answer is correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerRule {
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    ShortAnswer {
        expected: String,
    },
}

impl AnswerRule {
    pub fn kind(&self) -> PuzzleKind {
        match self {
            AnswerRule::MultipleChoice { .. } => PuzzleKind::Mcq,
            AnswerRule::ShortAnswer { .. } => PuzzleKind::Short,
        }
    }

    /// Check an answer. Answers of the wrong shape are never correct.
    pub fn accepts(&self, answer: &Answer) -> bool {
        match (self, answer) {
            (AnswerRule::MultipleChoice { correct_index, .. }, Answer::Choice(choice)) => {
                choice == correct_index
            }
            (AnswerRule::ShortAnswer { expected }, Answer::Text(text)) => {
                normalize(text) == normalize(expected)
            }
            _ => false,
        }
    }

    /// Interpret raw player input for this rule: a number for multiple
    /// choice, the text itself otherwise.
    pub fn parse_answer(&self, input: &str) -> Answer {
        match self {
            AnswerRule::MultipleChoice { .. } => match input.trim().parse() {
                Ok(index) => Answer::Choice(index),
                Err(_) => Answer::Text(input.to_string()),
            },
            AnswerRule::ShortAnswer { .. } => Answer::Text(input.to_string()),
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A validated puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub id: PuzzleId,
    pub question: String,
    pub rule: AnswerRule,
    /// Optional embedded illustration (data URL).
    pub image_data_url: Option<String>,
    /// Hint shown after a wrong answer.
    pub clue: Option<String>,
}

impl Puzzle {
    pub fn kind(&self) -> PuzzleKind {
        self.rule.kind()
    }

    /// Turn the puzzle back into an editable draft bound to its id.
    pub fn to_draft(&self) -> PuzzleDraft {
        let (options, correct_index, expected_answer) = match &self.rule {
            AnswerRule::MultipleChoice {
                options,
                correct_index,
            } => (options.clone(), Some(*correct_index), String::new()),
            AnswerRule::ShortAnswer { expected } => (Vec::new(), None, expected.clone()),
        };

        PuzzleDraft {
            id: Some(self.id.clone()),
            kind: self.kind(),
            question: self.question.clone(),
            options,
            correct_index,
            expected_answer,
            image_data_url: self.image_data_url.clone(),
            clue: self.clue.clone(),
        }
    }
}

/// Fields of a puzzle draft that validation can reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleField {
    Question,
    Options,
    CorrectIndex,
    ExpectedAnswer,
}

impl PuzzleField {
    pub fn name(&self) -> &'static str {
        match self {
            PuzzleField::Question => "question",
            PuzzleField::Options => "options",
            PuzzleField::CorrectIndex => "correctIndex",
            PuzzleField::ExpectedAnswer => "expectedAnswer",
        }
    }
}

impl fmt::Display for PuzzleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A draft was missing required fields for its type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Puzzle is missing or has invalid: {}", field_list(.fields))]
pub struct ValidationError {
    pub fields: Vec<PuzzleField>,
}

fn field_list(fields: &[PuzzleField]) -> String {
    fields
        .iter()
        .map(PuzzleField::name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn contains(&self, field: PuzzleField) -> bool {
        self.fields.contains(&field)
    }
}

/// Form contents for creating or editing a puzzle.
///
/// Drafts are deliberately loose (every field of every type is present);
/// [`PuzzleDraft::validate`] turns them into a [`Puzzle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzleDraft {
    /// Set when editing an existing puzzle.
    pub id: Option<PuzzleId>,
    pub kind: PuzzleKind,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: Option<usize>,
    pub expected_answer: String,
    pub image_data_url: Option<String>,
    pub clue: Option<String>,
}

impl PuzzleDraft {
    /// Draft for a short-answer puzzle.
    pub fn short(question: impl Into<String>, expected_answer: impl Into<String>) -> Self {
        Self {
            kind: PuzzleKind::Short,
            question: question.into(),
            expected_answer: expected_answer.into(),
            ..Default::default()
        }
    }

    /// Draft for a multiple-choice puzzle.
    pub fn mcq<S: Into<String>>(
        question: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        correct_index: usize,
    ) -> Self {
        Self {
            kind: PuzzleKind::Mcq,
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_index: Some(correct_index),
            ..Default::default()
        }
    }

    /// Bind the draft to an existing puzzle so saving replaces it.
    pub fn editing(mut self, id: PuzzleId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_clue(mut self, clue: impl Into<String>) -> Self {
        self.clue = Some(clue.into());
        self
    }

    pub fn with_image(mut self, data_url: impl Into<String>) -> Self {
        self.image_data_url = Some(data_url.into());
        self
    }

    /// Validate the draft and build the puzzle it describes.
    ///
    /// Empty multiple-choice options are dropped and the correct index is
    /// re-targeted; an index pointing at an empty option is rejected.
    pub fn validate(self, id: PuzzleId) -> Result<Puzzle, ValidationError> {
        let mut fields = Vec::new();

        let question = self.question.trim().to_string();
        if question.is_empty() {
            fields.push(PuzzleField::Question);
        }

        let rule = match self.kind {
            PuzzleKind::Mcq => {
                let mut options = Vec::with_capacity(self.options.len());
                let mut correct_index = None;
                for (i, option) in self.options.iter().enumerate() {
                    if option.trim().is_empty() {
                        continue;
                    }
                    if self.correct_index == Some(i) {
                        correct_index = Some(options.len());
                    }
                    options.push(option.trim().to_string());
                }

                if options.len() < MIN_MCQ_OPTIONS {
                    fields.push(PuzzleField::Options);
                }
                match correct_index {
                    Some(correct_index) => Some(AnswerRule::MultipleChoice {
                        options,
                        correct_index,
                    }),
                    None => {
                        fields.push(PuzzleField::CorrectIndex);
                        None
                    }
                }
            }
            PuzzleKind::Short => {
                let expected = self.expected_answer.trim().to_string();
                if expected.is_empty() {
                    fields.push(PuzzleField::ExpectedAnswer);
                    None
                } else {
                    Some(AnswerRule::ShortAnswer { expected })
                }
            }
        };

        match rule {
            Some(rule) if fields.is_empty() => Ok(Puzzle {
                id,
                question,
                rule,
                image_data_url: self.image_data_url.filter(|s| !s.is_empty()),
                clue: self
                    .clue
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            }),
            _ => Err(ValidationError { fields }),
        }
    }
}
