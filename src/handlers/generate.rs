use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use color_eyre::Report;

use crate::{
    extractors::JsonBody,
    models::{GenerateQuestionsForm, GenerateReadingForm},
    names,
    rejections::{AppError, ResultExt},
    services::generation::{GenerationOutcome, StorageFailure},
    views::{LessonView, QuestionView},
    AppState,
};

use super::{lesson::lesson_view, PRACTICE_ONLY};

const READING_ONLY: &str = "Reading content can only be generated for reading lessons";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::GENERATE_QUESTIONS_URL, post(generate_questions))
        .route(names::GENERATE_READING_URL, post(generate_reading))
}

fn not_generated<T>(outcome: GenerationOutcome<T>, wrong_type: &'static str) -> AppError {
    match outcome {
        GenerationOutcome::CourseNotFound => AppError::NotFound("Course not found"),
        GenerationOutcome::LessonNotFound | GenerationOutcome::Generated(_) => {
            AppError::NotFound("Lesson not found in this course")
        }
        GenerationOutcome::WrongLessonType => AppError::Input(wrong_type),
    }
}

/// Storage errors stay internal; completion and parse failures are passed
/// through with their message.
fn reject_generation<T>(result: Result<T, Report>, message: &'static str) -> Result<T, AppError> {
    match result {
        Err(e) if e.downcast_ref::<StorageFailure>().is_some() => Err(e).reject(message),
        other => other.reject_raw(message),
    }
}

#[tracing::instrument(skip_all, fields(course_id, lesson_id))]
async fn generate_questions(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<GenerateQuestionsForm>,
) -> Result<(StatusCode, Json<Vec<QuestionView>>), AppError> {
    let request = form.validate()?;
    let span = tracing::Span::current();
    span.record("course_id", request.course_id);
    span.record("lesson_id", request.lesson_id);

    let outcome = reject_generation(
        state.generation.generate_questions(&request).await,
        "could not generate questions",
    )?;

    match outcome {
        GenerationOutcome::Generated(questions) => Ok((
            StatusCode::CREATED,
            Json(questions.into_iter().map(QuestionView::from).collect()),
        )),
        other => Err(not_generated(other, PRACTICE_ONLY)),
    }
}

#[tracing::instrument(skip_all, fields(course_id, lesson_id))]
async fn generate_reading(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<GenerateReadingForm>,
) -> Result<Json<LessonView>, AppError> {
    let request = form.validate()?;
    let span = tracing::Span::current();
    span.record("course_id", request.course_id);
    span.record("lesson_id", request.lesson_id);

    let outcome = reject_generation(
        state.generation.generate_reading(&request).await,
        "could not generate reading content",
    )?;

    match outcome {
        GenerationOutcome::Generated(lesson) => Ok(Json(lesson_view(&state.db, lesson).await?)),
        other => Err(not_generated(other, READING_ONLY)),
    }
}
