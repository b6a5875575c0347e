// Database model structs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Returned when a stored or submitted discriminator names no known kind.
#[derive(Debug)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" is not a valid choice.", self.0)
    }
}

impl std::error::Error for UnknownKind {}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Field values written by course create/update.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseInput {
    pub title: String,
    pub description: String,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Practice,
    Reading,
    Video,
}

impl LessonType {
    pub fn as_str(self) -> &'static str {
        match self {
            LessonType::Practice => "practice",
            LessonType::Reading => "reading",
            LessonType::Video => "video",
        }
    }
}

impl std::str::FromStr for LessonType {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "practice" => Ok(LessonType::Practice),
            "reading" => Ok(LessonType::Reading),
            "video" => Ok(LessonType::Video),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for LessonType {
    type Error = UnknownKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    #[sqlx(rename = "kind", try_from = "String")]
    pub lesson_type: LessonType,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonInput {
    pub title: String,
    pub lesson_type: LessonType,
    pub content: Option<String>,
    pub video_url: Option<String>,
}

/// Discriminator persisted on the base `questions` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    TrueFalse,
    MultipleChoice,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::MultipleChoice => "multiple_choice",
        }
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true_false" => Ok(QuestionKind::TrueFalse),
            "multiple_choice" => Ok(QuestionKind::MultipleChoice),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Variant-specific fields of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionBody {
    TrueFalse {
        correct_answer: bool,
    },
    MultipleChoice {
        options: Vec<String>,
        correct_answer: String,
    },
}

impl QuestionBody {
    pub fn kind(&self) -> QuestionKind {
        match self {
            QuestionBody::TrueFalse { .. } => QuestionKind::TrueFalse,
            QuestionBody::MultipleChoice { .. } => QuestionKind::MultipleChoice,
        }
    }
}

/// Outcome of resolving a stored question to its concrete variant.
///
/// `Unknown` marks a base row whose discriminator has no matching extension
/// row. Read paths keep serving such rows instead of failing the response.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionVariant {
    Known(QuestionBody),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: i64,
    pub lesson_id: i64,
    pub text: String,
    pub variant: QuestionVariant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub text: String,
    pub body: QuestionBody,
}

/// Text token stored in `true_false_questions.correct_answer`.
pub fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Parses the boolean spellings accepted for a true/false answer.
pub fn parse_bool_token(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Base row with both extension tables left-joined.
#[derive(sqlx::FromRow)]
pub(crate) struct QuestionRow {
    pub id: i64,
    pub lesson_id: i64,
    pub text: String,
    pub kind: String,
    pub tf_correct_answer: Option<String>,
    pub mc_options: Option<String>,
    pub mc_correct_answer: Option<String>,
}

impl QuestionRow {
    pub fn resolve(self) -> Question {
        let variant = match self.kind.parse::<QuestionKind>() {
            Ok(QuestionKind::TrueFalse) => self
                .tf_correct_answer
                .as_deref()
                .and_then(parse_bool_token)
                .map(|correct_answer| QuestionBody::TrueFalse { correct_answer }),
            Ok(QuestionKind::MultipleChoice) => self
                .mc_options
                .as_deref()
                .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
                .zip(self.mc_correct_answer)
                .map(|(options, correct_answer)| QuestionBody::MultipleChoice {
                    options,
                    correct_answer,
                }),
            Err(_) => None,
        };

        let variant = match variant {
            Some(body) => QuestionVariant::Known(body),
            None => {
                tracing::warn!(
                    question_id = self.id,
                    kind = %self.kind,
                    "question has no matching variant row"
                );
                QuestionVariant::Unknown
            }
        };

        Question {
            id: self.id,
            lesson_id: self.lesson_id,
            text: self.text,
            variant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerInput {
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str) -> QuestionRow {
        QuestionRow {
            id: 7,
            lesson_id: 3,
            text: "Is water wet?".to_string(),
            kind: kind.to_string(),
            tf_correct_answer: None,
            mc_options: None,
            mc_correct_answer: None,
        }
    }

    #[test]
    fn resolves_true_false_from_text_token() {
        let mut r = row("true_false");
        r.tf_correct_answer = Some("false".to_string());

        let q = r.resolve();
        assert_eq!(
            q.variant,
            QuestionVariant::Known(QuestionBody::TrueFalse {
                correct_answer: false
            })
        );
    }

    #[test]
    fn resolves_multiple_choice_with_ordered_options() {
        let mut r = row("multiple_choice");
        r.mc_options = Some(r#"["b","a","c"]"#.to_string());
        r.mc_correct_answer = Some("a".to_string());

        let q = r.resolve();
        assert_eq!(
            q.variant,
            QuestionVariant::Known(QuestionBody::MultipleChoice {
                options: vec!["b".to_string(), "a".to_string(), "c".to_string()],
                correct_answer: "a".to_string(),
            })
        );
    }

    #[test]
    fn missing_extension_row_resolves_to_unknown() {
        assert_eq!(row("true_false").resolve().variant, QuestionVariant::Unknown);
        assert_eq!(
            row("multiple_choice").resolve().variant,
            QuestionVariant::Unknown
        );
    }

    #[test]
    fn discriminator_must_match_extension() {
        // A multiple-choice row carrying only true/false data is not trusted.
        let mut r = row("multiple_choice");
        r.tf_correct_answer = Some("true".to_string());
        assert_eq!(r.resolve().variant, QuestionVariant::Unknown);
    }

    #[test]
    fn bool_tokens() {
        assert_eq!(parse_bool_token("TRUE"), Some(true));
        assert_eq!(parse_bool_token("0"), Some(false));
        assert_eq!(parse_bool_token("yes please"), None);
        assert_eq!(bool_token(true), "true");
        assert_eq!(bool_token(false), "false");
    }

    #[test]
    fn lesson_type_parsing() {
        assert_eq!("reading".parse::<LessonType>().unwrap(), LessonType::Reading);
        let err = "podcast".parse::<LessonType>().unwrap_err();
        assert_eq!(err.to_string(), "\"podcast\" is not a valid choice.");
    }
}
