use serde::Serialize;

use crate::db::{Question, QuestionBody, QuestionVariant};

/// `correct_answer` is a boolean for true/false and a string for multiple choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Bool(bool),
    Text(String),
}

/// Common envelope shared by every question variant.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<CorrectAnswer>,
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        let (kind, options, correct_answer) = match question.variant {
            QuestionVariant::Known(QuestionBody::TrueFalse { correct_answer }) => (
                "true_false",
                None,
                Some(CorrectAnswer::Bool(correct_answer)),
            ),
            QuestionVariant::Known(QuestionBody::MultipleChoice {
                options,
                correct_answer,
            }) => (
                "multiple_choice",
                Some(options),
                Some(CorrectAnswer::Text(correct_answer)),
            ),
            QuestionVariant::Unknown => ("unknown", None, None),
        };

        Self {
            id: question.id,
            text: question.text,
            kind,
            options,
            correct_answer,
        }
    }
}
