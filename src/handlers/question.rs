use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::{Db, Lesson, NewQuestion, Question},
    extractors::JsonBody,
    models::QuestionForm,
    rejections::{AppError, OptionExt, ResultExt},
    views::QuestionView,
    AppState,
};

use super::{ensure_practice, invalid_pk};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route(
            "/questions/{id}",
            get(get_question)
                .put(update_question)
                .patch(patch_question)
                .delete(delete_question),
        )
}

#[derive(Deserialize)]
struct QuestionFilter {
    lesson_id: Option<i64>,
}

async fn find_question(db: &Db, question_id: i64) -> Result<Question, AppError> {
    db.get_question(question_id)
        .await
        .reject("could not get question")?
        .or_not_found("Question not found")
}

/// Looks up the lesson named in a question body and applies the practice gate.
async fn target_lesson(db: &Db, lesson_id: i64) -> Result<Lesson, AppError> {
    let lesson = db
        .get_lesson(lesson_id)
        .await
        .reject("could not get lesson")?
        .ok_or_else(|| invalid_pk("lesson_id", lesson_id))?;

    ensure_practice(&lesson)?;
    Ok(lesson)
}

async fn list_questions(
    State(state): State<AppState>,
    Query(filter): Query<QuestionFilter>,
) -> Result<Json<Vec<QuestionView>>, AppError> {
    let questions = state
        .db
        .questions(filter.lesson_id)
        .await
        .reject("could not get questions")?;

    Ok(Json(questions.into_iter().map(QuestionView::from).collect()))
}

async fn create_question(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<QuestionForm>,
) -> Result<(StatusCode, Json<QuestionView>), AppError> {
    let (lesson_id, question) = form.validate()?;
    let lesson_id =
        lesson_id.ok_or_else(|| AppError::field("lesson_id", "This field is required."))?;
    let lesson = target_lesson(&state.db, lesson_id).await?;

    let question = state
        .db
        .create_question(lesson.id, &question)
        .await
        .reject("could not create question")?;

    Ok((StatusCode::CREATED, Json(question.into())))
}

async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Json<QuestionView>, AppError> {
    let question = find_question(&state.db, question_id).await?;
    Ok(Json(question.into()))
}

async fn save_question(
    db: &Db,
    existing: &Question,
    lesson_id: Option<i64>,
    question: &NewQuestion,
) -> Result<QuestionView, AppError> {
    let lesson_id = match lesson_id {
        Some(id) if id != existing.lesson_id => target_lesson(db, id).await?.id,
        _ => existing.lesson_id,
    };

    let updated = db
        .update_question(existing.id, lesson_id, question)
        .await
        .reject("could not update question")?
        .or_not_found("Question not found")?;

    Ok(updated.into())
}

/// Replaces text and variant fields. A different `type` switches the variant
/// in place; a different `lesson_id` moves the question (practice lessons only).
async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    JsonBody(form): JsonBody<QuestionForm>,
) -> Result<Json<QuestionView>, AppError> {
    let existing = find_question(&state.db, question_id).await?;
    let (lesson_id, question) = form.validate()?;
    Ok(Json(save_question(&state.db, &existing, lesson_id, &question).await?))
}

async fn patch_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    JsonBody(form): JsonBody<QuestionForm>,
) -> Result<Json<QuestionView>, AppError> {
    let existing = find_question(&state.db, question_id).await?;
    let (lesson_id, question) = form.merge(&existing)?;
    Ok(Json(save_question(&state.db, &existing, lesson_id, &question).await?))
}

async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .db
        .delete_question(question_id)
        .await
        .reject("could not delete question")?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Question not found"))
    }
}
