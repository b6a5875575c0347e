use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::{Db, Lesson, LessonInput},
    extractors::JsonBody,
    models::{LessonForm, QuestionForm},
    rejections::{AppError, OptionExt, ResultExt},
    views::{LessonView, QuestionView},
    AppState,
};

use super::{ensure_practice, invalid_pk};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/lessons/{id}",
            get(get_lesson)
                .put(update_lesson)
                .patch(patch_lesson)
                .delete(delete_lesson),
        )
        .route("/lessons/{id}/add_question", post(add_question))
}

#[derive(Deserialize)]
struct LessonFilter {
    course_id: Option<i64>,
}

/// Lesson with every question resolved to its concrete variant.
pub(crate) async fn lesson_view(db: &Db, lesson: Lesson) -> Result<LessonView, AppError> {
    let questions = db
        .lesson_questions(lesson.id)
        .await
        .reject("could not get lesson questions")?;

    Ok(LessonView::new(
        lesson,
        questions.into_iter().map(QuestionView::from).collect(),
    ))
}

pub(crate) async fn find_lesson(db: &Db, lesson_id: i64) -> Result<Lesson, AppError> {
    db.get_lesson(lesson_id)
        .await
        .reject("could not get lesson")?
        .or_not_found("Lesson not found")
}

async fn ensure_course_exists(db: &Db, course_id: i64) -> Result<(), AppError> {
    match db.get_course(course_id).await.reject("could not get course")? {
        Some(_) => Ok(()),
        None => Err(invalid_pk("course_id", course_id)),
    }
}

async fn list_lessons(
    State(state): State<AppState>,
    Query(filter): Query<LessonFilter>,
) -> Result<Json<Vec<LessonView>>, AppError> {
    let lessons = state
        .db
        .lessons(filter.course_id)
        .await
        .reject("could not get lessons")?;

    let mut views = Vec::with_capacity(lessons.len());
    for lesson in lessons {
        views.push(lesson_view(&state.db, lesson).await?);
    }

    Ok(Json(views))
}

async fn create_lesson(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<LessonForm>,
) -> Result<(StatusCode, Json<LessonView>), AppError> {
    let (course_id, input) = form.validate_with_course()?;
    ensure_course_exists(&state.db, course_id).await?;

    let lesson = state
        .db
        .create_lesson(course_id, &input)
        .await
        .reject("could not create lesson")?;

    Ok((StatusCode::CREATED, Json(LessonView::new(lesson, Vec::new()))))
}

async fn get_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<Json<LessonView>, AppError> {
    let lesson = find_lesson(&state.db, lesson_id).await?;
    Ok(Json(lesson_view(&state.db, lesson).await?))
}

async fn save_lesson(
    db: &Db,
    lesson: &Lesson,
    course_id: i64,
    input: &LessonInput,
) -> Result<LessonView, AppError> {
    if course_id != lesson.course_id {
        ensure_course_exists(db, course_id).await?;
    }

    let lesson = db
        .update_lesson(lesson.id, course_id, input)
        .await
        .reject("could not update lesson")?
        .or_not_found("Lesson not found")?;

    lesson_view(db, lesson).await
}

/// Full update. Omitted `course_id`, `content` and `video_url` keep their values.
async fn update_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    JsonBody(form): JsonBody<LessonForm>,
) -> Result<Json<LessonView>, AppError> {
    let lesson = find_lesson(&state.db, lesson_id).await?;
    let (course_id, input) = form.update(&lesson)?;

    Ok(Json(save_lesson(&state.db, &lesson, course_id, &input).await?))
}

async fn patch_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    JsonBody(form): JsonBody<LessonForm>,
) -> Result<Json<LessonView>, AppError> {
    let lesson = find_lesson(&state.db, lesson_id).await?;
    let (course_id, input) = form.merge(&lesson)?;

    Ok(Json(save_lesson(&state.db, &lesson, course_id, &input).await?))
}

async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .db
        .delete_lesson(lesson_id)
        .await
        .reject("could not delete lesson")?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Lesson not found"))
    }
}

/// Creates a question of the submitted `type` under a practice lesson.
/// The lesson gate is checked before the body is validated.
#[tracing::instrument(skip_all, fields(lesson_id))]
async fn add_question(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    JsonBody(form): JsonBody<QuestionForm>,
) -> Result<(StatusCode, Json<QuestionView>), AppError> {
    tracing::Span::current().record("lesson_id", lesson_id);

    let lesson = find_lesson(&state.db, lesson_id).await?;
    ensure_practice(&lesson)?;

    let (_, question) = form.validate()?;
    let question = state
        .db
        .create_question(lesson.id, &question)
        .await
        .reject("could not create question")?;

    Ok((StatusCode::CREATED, Json(question.into())))
}
