use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::{Answer, AnswerInput, Db},
    extractors::JsonBody,
    models::AnswerForm,
    rejections::{AppError, OptionExt, ResultExt},
    views::AnswerView,
    AppState,
};

use super::invalid_pk;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/answers", get(list_answers).post(create_answer))
        .route(
            "/answers/{id}",
            get(get_answer)
                .put(update_answer)
                .patch(patch_answer)
                .delete(delete_answer),
        )
}

#[derive(Deserialize)]
struct AnswerFilter {
    question_id: Option<i64>,
}

async fn find_answer(db: &Db, answer_id: i64) -> Result<Answer, AppError> {
    db.get_answer(answer_id)
        .await
        .reject("could not get answer")?
        .or_not_found("Answer not found")
}

async fn ensure_question_exists(db: &Db, question_id: i64) -> Result<(), AppError> {
    match db
        .get_question(question_id)
        .await
        .reject("could not get question")?
    {
        Some(_) => Ok(()),
        None => Err(invalid_pk("question_id", question_id)),
    }
}

async fn list_answers(
    State(state): State<AppState>,
    Query(filter): Query<AnswerFilter>,
) -> Result<Json<Vec<AnswerView>>, AppError> {
    let answers = state
        .db
        .answers(filter.question_id)
        .await
        .reject("could not get answers")?;

    Ok(Json(answers.into_iter().map(AnswerView::from).collect()))
}

async fn create_answer(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<AnswerForm>,
) -> Result<(StatusCode, Json<AnswerView>), AppError> {
    let input = form.validate()?;
    ensure_question_exists(&state.db, input.question_id).await?;

    let answer = state
        .db
        .create_answer(&input)
        .await
        .reject("could not create answer")?;

    Ok((StatusCode::CREATED, Json(answer.into())))
}

async fn get_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<i64>,
) -> Result<Json<AnswerView>, AppError> {
    Ok(Json(find_answer(&state.db, answer_id).await?.into()))
}

async fn save_answer(
    db: &Db,
    answer: &Answer,
    input: &AnswerInput,
) -> Result<AnswerView, AppError> {
    if input.question_id != answer.question_id {
        ensure_question_exists(db, input.question_id).await?;
    }

    let answer = db
        .update_answer(answer.id, input)
        .await
        .reject("could not update answer")?
        .or_not_found("Answer not found")?;

    Ok(answer.into())
}

async fn update_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<i64>,
    JsonBody(form): JsonBody<AnswerForm>,
) -> Result<Json<AnswerView>, AppError> {
    let answer = find_answer(&state.db, answer_id).await?;
    let input = form.validate()?;
    Ok(Json(save_answer(&state.db, &answer, &input).await?))
}

async fn patch_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<i64>,
    JsonBody(form): JsonBody<AnswerForm>,
) -> Result<Json<AnswerView>, AppError> {
    let answer = find_answer(&state.db, answer_id).await?;
    let input = form.merge(&answer)?;
    Ok(Json(save_answer(&state.db, &answer, &input).await?))
}

async fn delete_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .db
        .delete_answer(answer_id)
        .await
        .reject("could not delete answer")?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Answer not found"))
    }
}
