//! Request bodies and their validation.
//!
//! Every form field is read as a raw JSON value so that missing, blank or
//! wrongly typed fields are all reported per field instead of as a single
//! decode error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    db::{
        parse_bool_token, Answer, AnswerInput, Course, CourseInput, Lesson, LessonInput, LessonType,
        NewQuestion, Question, QuestionBody, QuestionVariant, UnknownKind,
    },
    names,
    rejections::{AppError, FieldErrors},
    services::generation::{GenerateQuestions, GenerateReading},
};

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";
const NOT_A_LIST: &str = "Expected a list of items.";

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(Value::Null)`).
fn deserialize_some<'de, D>(d: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(d).map(Some)
}

#[derive(Default)]
struct Errors(FieldErrors);

impl Errors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    fn text(&mut self, field: &str, value: Option<Value>, max_len: Option<usize>) -> String {
        match value {
            None | Some(Value::Null) => {
                self.add(field, REQUIRED);
                String::new()
            }
            Some(Value::String(value)) => {
                self.check_text(field, &value, max_len);
                value
            }
            Some(_) => {
                self.add(field, NOT_A_STRING);
                String::new()
            }
        }
    }

    /// Nullable text: `None` when absent, `Some(None)` for an explicit `null`.
    fn nullable_text(&mut self, field: &str, value: Option<Value>) -> Option<Option<String>> {
        match value {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(value)) => Some(Some(value)),
            Some(_) => {
                self.add(field, NOT_A_STRING);
                Some(None)
            }
        }
    }

    fn check_text(&mut self, field: &str, value: &str, max_len: Option<usize>) {
        if value.trim().is_empty() {
            self.add(field, BLANK);
        } else if let Some(max) = max_len.filter(|max| value.chars().count() > *max) {
            self.add(
                field,
                format!("Ensure this field has no more than {max} characters."),
            );
        }
    }

    /// Integers may also arrive as numeric strings.
    fn integer(&mut self, field: &str, value: Option<Value>) -> Option<i64> {
        let parsed = match value? {
            Value::Null => return None,
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.add(field, NOT_AN_INTEGER);
        }
        parsed
    }

    fn id(&mut self, field: &str, value: Option<Value>) -> i64 {
        if matches!(value, None | Some(Value::Null)) {
            self.add(field, REQUIRED);
            return 0;
        }
        self.integer(field, value).unwrap_or(0)
    }

    fn boolean(&mut self, field: &str, value: Option<Value>) -> Option<bool> {
        let parsed = match value? {
            Value::Null => return None,
            Value::Bool(b) => Some(b),
            Value::String(token) => parse_bool_token(&token),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            self.add(field, NOT_A_BOOLEAN);
        }
        parsed
    }

    fn string_list(&mut self, field: &str, value: Option<Value>) -> Vec<String> {
        let items = match value {
            None | Some(Value::Null) => {
                self.add(field, REQUIRED);
                return Vec::new();
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.add(field, NOT_A_LIST);
                return Vec::new();
            }
        };

        let mut strings = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) if !s.trim().is_empty() => strings.push(s),
                Value::String(_) => self.add(field, BLANK),
                _ => self.add(field, NOT_A_STRING),
            }
        }
        strings
    }

    fn lesson_type(&mut self, value: Option<Value>) -> LessonType {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.add("type", REQUIRED);
                return LessonType::Practice;
            }
            Some(Value::String(s)) => s.parse::<LessonType>(),
            Some(other) => Err(UnknownKind(other.to_string())),
        };
        parsed.unwrap_or_else(|e| {
            self.add("type", e.to_string());
            LessonType::Practice
        })
    }

    fn check_url(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value else { return };
        let valid = reqwest::Url::parse(value)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
        if !valid {
            self.add(field, "Enter a valid URL.");
        }
    }

    fn finish<T>(self, value: T) -> Result<T, AppError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

/// Blank URLs are stored as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn text_value(value: &str) -> Option<Value> {
    Some(Value::String(value.to_string()))
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CourseForm {
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub author: Option<Value>,
}

impl CourseForm {
    pub fn validate(self) -> Result<CourseInput, AppError> {
        let mut errors = Errors::default();
        let input = CourseInput {
            title: errors.text("title", self.title, Some(names::MAX_TITLE_LENGTH)),
            description: errors.text("description", self.description, None),
            author: errors.text("author", self.author, Some(names::MAX_TITLE_LENGTH)),
        };
        errors.finish(input)
    }

    /// Applies the fields present in the form on top of `course`.
    pub fn merge(self, course: &Course) -> Result<CourseInput, AppError> {
        CourseForm {
            title: self.title.or_else(|| text_value(&course.title)),
            description: self.description.or_else(|| text_value(&course.description)),
            author: self.author.or_else(|| text_value(&course.author)),
        }
        .validate()
    }
}

// ---------------------------------------------------------------------------
// Lesson
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct LessonForm {
    pub course_id: Option<Value>,
    pub title: Option<Value>,
    #[serde(rename = "type")]
    pub lesson_type: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub video_url: Option<Value>,
}

impl LessonForm {
    /// Validates the lesson fields; `course_id` is left to the caller since
    /// `add_lesson` takes it from the path.
    pub fn validate(self) -> Result<(Option<i64>, LessonInput), AppError> {
        let mut errors = Errors::default();
        let course_id = errors.integer("course_id", self.course_id);
        let title = errors.text("title", self.title, Some(names::MAX_TITLE_LENGTH));
        let lesson_type = errors.lesson_type(self.lesson_type);
        let content = errors.nullable_text("content", self.content).flatten();
        let video_url = non_blank(errors.nullable_text("video_url", self.video_url).flatten());
        errors.check_url("video_url", video_url.as_deref());

        let input = LessonInput {
            title,
            lesson_type,
            content,
            video_url,
        };
        errors.finish((course_id, input))
    }

    /// Validates a full body that must name its course.
    pub fn validate_with_course(self) -> Result<(i64, LessonInput), AppError> {
        let missing_course = matches!(self.course_id, None | Some(Value::Null));
        match self.validate() {
            Ok((Some(course_id), input)) => Ok((course_id, input)),
            Ok((None, _)) => Err(AppError::field("course_id", REQUIRED)),
            Err(AppError::Validation(mut errors)) if missing_course => {
                errors.insert("course_id".to_string(), vec![REQUIRED.to_string()]);
                Err(AppError::Validation(errors))
            }
            Err(e) => Err(e),
        }
    }

    /// Full update: `title` and `type` are required, while an omitted
    /// `course_id`, `content` or `video_url` keeps its stored value. An explicit
    /// `null` still clears the nullable fields.
    pub fn update(self, lesson: &Lesson) -> Result<(i64, LessonInput), AppError> {
        LessonForm {
            course_id: self.course_id.or(Some(Value::from(lesson.course_id))),
            title: self.title,
            lesson_type: self.lesson_type,
            content: self.content.or_else(|| Some(Value::from(lesson.content.clone()))),
            video_url: self
                .video_url
                .or_else(|| Some(Value::from(lesson.video_url.clone()))),
        }
        .validate_with_course()
    }

    /// Partial update: every omitted field keeps its stored value.
    pub fn merge(self, lesson: &Lesson) -> Result<(i64, LessonInput), AppError> {
        LessonForm {
            title: self.title.or_else(|| text_value(&lesson.title)),
            lesson_type: self
                .lesson_type
                .or_else(|| text_value(lesson.lesson_type.as_str())),
            ..self
        }
        .update(lesson)
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// Question body as submitted. `type` selects the variant and therefore which
/// of the remaining fields are read.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionForm {
    pub lesson_id: Option<Value>,
    pub text: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    pub options: Option<Value>,
    pub correct_answer: Option<Value>,
}

impl QuestionForm {
    /// Dispatches on `type`. An unrecognised type is rejected before any field
    /// is looked at.
    pub fn validate(mut self) -> Result<(Option<i64>, NewQuestion), AppError> {
        match self.kind.as_ref().and_then(Value::as_str) {
            Some("true_false") => {
                self.normalize_true_false();
                self.validate_true_false()
            }
            Some("multiple_choice") => self.validate_multiple_choice(),
            _ => Err(AppError::Input("Invalid question type")),
        }
    }

    /// Partial update. Omitted fields keep their stored values; the variant
    /// fields are only carried over while the question keeps its `type`.
    pub fn merge(self, question: &Question) -> Result<(Option<i64>, NewQuestion), AppError> {
        let current = match &question.variant {
            QuestionVariant::Known(body) => Some(body),
            QuestionVariant::Unknown => None,
        };
        let kind = self
            .kind
            .or_else(|| current.and_then(|body| text_value(body.kind().as_str())));
        let requested = kind.as_ref().and_then(Value::as_str);

        let (options, correct_answer) =
            match current.filter(|body| requested == Some(body.kind().as_str())) {
                Some(QuestionBody::TrueFalse { correct_answer }) => (
                    self.options,
                    self.correct_answer.or(Some(Value::Bool(*correct_answer))),
                ),
                Some(QuestionBody::MultipleChoice {
                    options,
                    correct_answer,
                }) => (
                    self.options.or_else(|| Some(Value::from(options.clone()))),
                    self.correct_answer.or_else(|| text_value(correct_answer)),
                ),
                None => (self.options, self.correct_answer),
            };

        QuestionForm {
            lesson_id: self.lesson_id,
            text: self.text.or_else(|| text_value(&question.text)),
            kind,
            options,
            correct_answer,
        }
        .validate()
    }

    /// Native booleans are rewritten to the lowercase text token the
    /// true/false column stores, so both spellings take the same path.
    fn normalize_true_false(&mut self) {
        if let Some(Value::Bool(b)) = self.correct_answer {
            self.correct_answer = Some(Value::String(b.to_string()));
        }
    }

    fn validate_true_false(self) -> Result<(Option<i64>, NewQuestion), AppError> {
        let mut errors = Errors::default();
        let lesson_id = errors.integer("lesson_id", self.lesson_id);
        let text = errors.text("text", self.text, None);

        let correct_answer = match self.correct_answer {
            None | Some(Value::Null) => {
                errors.add("correct_answer", REQUIRED);
                false
            }
            value => errors.boolean("correct_answer", value).unwrap_or(false),
        };

        let question = NewQuestion {
            text,
            body: QuestionBody::TrueFalse { correct_answer },
        };
        errors.finish((lesson_id, question))
    }

    fn validate_multiple_choice(self) -> Result<(Option<i64>, NewQuestion), AppError> {
        let mut errors = Errors::default();
        let lesson_id = errors.integer("lesson_id", self.lesson_id);
        let text = errors.text("text", self.text, None);

        let options = errors.string_list("options", self.options);
        if options.is_empty() && !errors.0.contains_key("options") {
            errors.add("options", "This list may not be empty.");
        }

        let correct_answer = match self.correct_answer {
            None | Some(Value::Null) => {
                errors.add("correct_answer", REQUIRED);
                String::new()
            }
            Some(Value::String(answer)) => {
                if answer.trim().is_empty() {
                    errors.add("correct_answer", BLANK);
                } else if !options.is_empty() && !options.contains(&answer) {
                    errors.add("correct_answer", "Must match one of the options.");
                }
                answer
            }
            Some(_) => {
                errors.add("correct_answer", NOT_A_STRING);
                String::new()
            }
        };

        let question = NewQuestion {
            text,
            body: QuestionBody::MultipleChoice {
                options,
                correct_answer,
            },
        };
        errors.finish((lesson_id, question))
    }
}

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AnswerForm {
    pub question_id: Option<Value>,
    pub text: Option<Value>,
    pub is_correct: Option<Value>,
}

impl AnswerForm {
    pub fn validate(self) -> Result<AnswerInput, AppError> {
        let mut errors = Errors::default();
        let input = AnswerInput {
            question_id: errors.id("question_id", self.question_id),
            text: errors.text("text", self.text, None),
            is_correct: errors
                .boolean("is_correct", self.is_correct)
                .unwrap_or(false),
        };
        errors.finish(input)
    }

    pub fn merge(self, answer: &Answer) -> Result<AnswerInput, AppError> {
        AnswerForm {
            question_id: self.question_id.or(Some(Value::from(answer.question_id))),
            text: self.text.or_else(|| text_value(&answer.text)),
            is_correct: self.is_correct.or(Some(Value::Bool(answer.is_correct))),
        }
        .validate()
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuestionsForm {
    pub course_id: Option<Value>,
    pub lesson_id: Option<Value>,
    pub student_interests: Option<Value>,
    pub lesson_topic: Option<Value>,
    pub num_questions: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateReadingForm {
    pub course_id: Option<Value>,
    pub lesson_id: Option<Value>,
    pub student_interests: Option<Value>,
    pub lesson_topic: Option<Value>,
}

impl GenerateQuestionsForm {
    pub fn validate(self) -> Result<GenerateQuestions, AppError> {
        let mut errors = Errors::default();
        let course_id = errors.id("course_id", self.course_id);
        let lesson_id = errors.id("lesson_id", self.lesson_id);
        let student_interests = errors.string_list("student_interests", self.student_interests);
        let lesson_topic = errors.text("lesson_topic", self.lesson_topic, None);

        let num_questions = errors
            .integer("num_questions", self.num_questions)
            .unwrap_or(names::DEFAULT_NUM_QUESTIONS as i64);
        if num_questions < names::MIN_NUM_QUESTIONS as i64 {
            errors.add(
                "num_questions",
                format!(
                    "Ensure this value is greater than or equal to {}.",
                    names::MIN_NUM_QUESTIONS
                ),
            );
        } else if num_questions > names::MAX_NUM_QUESTIONS as i64 {
            errors.add(
                "num_questions",
                format!(
                    "Ensure this value is less than or equal to {}.",
                    names::MAX_NUM_QUESTIONS
                ),
            );
        }

        errors.finish(GenerateQuestions {
            course_id,
            lesson_id,
            student_interests,
            lesson_topic,
            num_questions: num_questions.clamp(0, names::MAX_NUM_QUESTIONS as i64) as usize,
        })
    }
}

impl GenerateReadingForm {
    pub fn validate(self) -> Result<GenerateReading, AppError> {
        let mut errors = Errors::default();
        let request = GenerateReading {
            course_id: errors.id("course_id", self.course_id),
            lesson_id: errors.id("lesson_id", self.lesson_id),
            student_interests: errors.string_list("student_interests", self.student_interests),
            lesson_topic: errors.text("lesson_topic", self.lesson_topic, None),
        };
        errors.finish(request)
    }
}
