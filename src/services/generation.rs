use color_eyre::{
    eyre::{bail, ensure, WrapErr},
    Result,
};
use serde::Deserialize;

use crate::completion::OpenAiClient;
use crate::db::{Course, Db, Lesson, LessonType, NewQuestion, Question, QuestionBody};
use crate::names;

// ---------------------------------------------------------------------------
// ContentRepository trait (the storage calls generation needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait ContentRepository: Send + Sync {
    fn find_course(
        &self,
        course_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Course>>> + Send;

    fn find_lesson(
        &self,
        lesson_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Lesson>>> + Send;

    fn insert_question(
        &self,
        lesson_id: i64,
        question: &NewQuestion,
    ) -> impl std::future::Future<Output = Result<Question>> + Send;

    fn replace_lesson_content(
        &self,
        lesson_id: i64,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Option<Lesson>>> + Send;
}

impl ContentRepository for Db {
    async fn find_course(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course(course_id).await
    }

    async fn find_lesson(&self, lesson_id: i64) -> Result<Option<Lesson>> {
        self.get_lesson(lesson_id).await
    }

    async fn insert_question(&self, lesson_id: i64, question: &NewQuestion) -> Result<Question> {
        self.create_question(lesson_id, question).await
    }

    async fn replace_lesson_content(&self, lesson_id: i64, content: &str) -> Result<Option<Lesson>> {
        self.set_lesson_content(lesson_id, content).await
    }
}

// ---------------------------------------------------------------------------
// CompletionClient trait (the external text-generation service)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` and returns the generated text.
    fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// Context attached to content-store errors, so callers can tell them apart
/// from completion and parse failures.
#[derive(Debug, Clone, Copy)]
pub struct StorageFailure;

impl std::fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("content storage failed")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateQuestions {
    pub course_id: i64,
    pub lesson_id: i64,
    pub student_interests: Vec<String>,
    pub lesson_topic: String,
    pub num_questions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReading {
    pub course_id: i64,
    pub lesson_id: i64,
    pub student_interests: Vec<String>,
    pub lesson_topic: String,
}

#[derive(Debug)]
pub enum GenerationOutcome<T> {
    Generated(T),
    CourseNotFound,
    /// The lesson does not exist or belongs to another course.
    LessonNotFound,
    /// The lesson's type does not accept this kind of content.
    WrongLessonType,
}

// ---------------------------------------------------------------------------
// GenerationService
// ---------------------------------------------------------------------------

pub struct GenerationService<R: ContentRepository = Db, C: CompletionClient = OpenAiClient> {
    repo: R,
    client: C,
}

impl<R: ContentRepository + Clone, C: CompletionClient + Clone> Clone for GenerationService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            client: self.client.clone(),
        }
    }
}

impl<R: ContentRepository, C: CompletionClient> GenerationService<R, C> {
    pub fn new(repo: R, client: C) -> Self {
        Self { repo, client }
    }

    /// Drafts `num_questions` multiple-choice questions and stores them under
    /// the lesson. The AI output is fully validated before the first insert.
    pub async fn generate_questions(
        &self,
        request: &GenerateQuestions,
    ) -> Result<GenerationOutcome<Vec<Question>>> {
        let (course, lesson) = match self.locate(request.course_id, request.lesson_id).await? {
            Ok(found) => found,
            Err(outcome) => return Ok(outcome),
        };

        if lesson.lesson_type != LessonType::Practice {
            return Ok(GenerationOutcome::WrongLessonType);
        }

        let prompt = questions_prompt(&course, &lesson, request);
        let text = self
            .client
            .complete(&prompt, names::QUESTIONS_MAX_TOKENS)
            .await
            .wrap_err("AI completion request failed")?;

        let drafts = parse_generated_questions(&text, request.num_questions)?;

        // Each insert is its own transaction; a storage failure here leaves
        // the questions inserted so far in place.
        let mut created = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            created.push(
                self.repo
                    .insert_question(lesson.id, draft)
                    .await
                    .wrap_err(StorageFailure)?,
            );
        }

        tracing::info!(
            "generated {} questions for lesson_id: {}",
            created.len(),
            lesson.id
        );
        Ok(GenerationOutcome::Generated(created))
    }

    /// Replaces a reading lesson's content with AI-written Markdown.
    pub async fn generate_reading(
        &self,
        request: &GenerateReading,
    ) -> Result<GenerationOutcome<Lesson>> {
        let (course, lesson) = match self.locate(request.course_id, request.lesson_id).await? {
            Ok(found) => found,
            Err(outcome) => return Ok(outcome),
        };

        if lesson.lesson_type != LessonType::Reading {
            return Ok(GenerationOutcome::WrongLessonType);
        }

        let prompt = reading_prompt(&course, &lesson, request);
        let text = self
            .client
            .complete(&prompt, names::READING_MAX_TOKENS)
            .await
            .wrap_err("AI completion request failed")?;

        let content = text.trim();
        ensure!(!content.is_empty(), "AI response was empty");

        let updated = self
            .repo
            .replace_lesson_content(lesson.id, content)
            .await
            .wrap_err(StorageFailure)?;
        let Some(lesson) = updated else {
            // Deleted between lookup and update.
            return Ok(GenerationOutcome::LessonNotFound);
        };

        tracing::info!("generated reading content for lesson_id: {}", lesson.id);
        Ok(GenerationOutcome::Generated(lesson))
    }

    async fn locate<T>(
        &self,
        course_id: i64,
        lesson_id: i64,
    ) -> Result<Result<(Course, Lesson), GenerationOutcome<T>>> {
        let Some(course) = self
            .repo
            .find_course(course_id)
            .await
            .wrap_err(StorageFailure)?
        else {
            return Ok(Err(GenerationOutcome::CourseNotFound));
        };

        match self
            .repo
            .find_lesson(lesson_id)
            .await
            .wrap_err(StorageFailure)?
        {
            Some(lesson) if lesson.course_id == course.id => Ok(Ok((course, lesson))),
            _ => Ok(Err(GenerationOutcome::LessonNotFound)),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

fn interests_phrase(interests: &[String]) -> String {
    if interests.is_empty() {
        "a broad range of everyday topics".to_string()
    } else {
        interests.join(", ")
    }
}

pub(crate) fn questions_prompt(course: &Course, lesson: &Lesson, request: &GenerateQuestions) -> String {
    format!(
        "You are writing practice questions for the course \"{course}\", lesson \"{lesson}\".\n\
         Write {n} multiple-choice questions about {topic}. Use examples that relate to \
         the student's interests: {interests}.\n\
         Respond with only a JSON array and no other text. Each element must be an object \
         with the keys \"question\" (string), \"options\" (array of exactly {options} strings) \
         and \"correct_option_index\" (integer from 0 to {last}, the index of the correct option).",
        course = course.title,
        lesson = lesson.title,
        n = request.num_questions,
        topic = request.lesson_topic,
        interests = interests_phrase(&request.student_interests),
        options = names::GENERATED_OPTION_COUNT,
        last = names::GENERATED_OPTION_COUNT - 1,
    )
}

pub(crate) fn reading_prompt(course: &Course, lesson: &Lesson, request: &GenerateReading) -> String {
    format!(
        "You are writing reading material for the course \"{course}\", lesson \"{lesson}\".\n\
         Explain {topic} clearly for a student, using examples drawn from their interests: \
         {interests}.\n\
         Format the answer as Markdown with a title, short sections and a brief summary.",
        course = course.title,
        lesson = lesson.title,
        topic = request.lesson_topic,
        interests = interests_phrase(&request.student_interests),
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_option_index: i64,
}

/// Extracts and validates the question list from the model's reply.
///
/// The reply must contain a JSON array (surrounding prose or code fences are
/// ignored) of exactly `expected` well-formed items.
pub fn parse_generated_questions(text: &str, expected: usize) -> Result<Vec<NewQuestion>> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        bail!("AI response did not contain a JSON array");
    };
    ensure!(start < end, "AI response did not contain a JSON array");

    let items: Vec<GeneratedQuestion> = serde_json::from_str(&text[start..=end])
        .wrap_err("AI response is not a list of question objects")?;

    ensure!(
        items.len() == expected,
        "AI response contained {} questions, expected {expected}",
        items.len()
    );

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let n = i + 1;
            let text = item.question.trim().to_string();
            ensure!(!text.is_empty(), "question {n} has no text");
            ensure!(
                item.options.len() == names::GENERATED_OPTION_COUNT,
                "question {n} has {} options, expected {}",
                item.options.len(),
                names::GENERATED_OPTION_COUNT
            );

            let options: Vec<String> = item.options.iter().map(|o| o.trim().to_string()).collect();
            ensure!(
                options.iter().all(|o| !o.is_empty()),
                "question {n} has a blank option"
            );

            let index = usize::try_from(item.correct_option_index)
                .ok()
                .filter(|idx| *idx < options.len());
            let Some(index) = index else {
                bail!(
                    "question {n} has correct_option_index {} outside 0..{}",
                    item.correct_option_index,
                    options.len()
                );
            };

            let correct_answer = options[index].clone();
            Ok(NewQuestion {
                text,
                body: QuestionBody::MultipleChoice {
                    options,
                    correct_answer,
                },
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
