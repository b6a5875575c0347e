use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::{
    db::{Course, Db},
    extractors::JsonBody,
    models::{CourseForm, LessonForm},
    rejections::{AppError, OptionExt, ResultExt},
    views::{CourseView, LessonView},
    AppState,
};

use super::lesson::lesson_view;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course)
                .put(update_course)
                .patch(patch_course)
                .delete(delete_course),
        )
        .route("/courses/{id}/add_lesson", post(add_lesson))
}

/// Course with its lessons, each carrying its resolved questions.
pub(crate) async fn course_view(db: &Db, course: Course) -> Result<CourseView, AppError> {
    let lessons = db
        .lessons(Some(course.id))
        .await
        .reject("could not get lessons")?;

    let mut views = Vec::with_capacity(lessons.len());
    for lesson in lessons {
        views.push(lesson_view(db, lesson).await?);
    }

    Ok(CourseView::new(course, views))
}

async fn find_course(db: &Db, course_id: i64) -> Result<Course, AppError> {
    db.get_course(course_id)
        .await
        .reject("could not get course")?
        .or_not_found("Course not found")
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseView>>, AppError> {
    let courses = state.db.courses().await.reject("could not get courses")?;

    let mut views = Vec::with_capacity(courses.len());
    for course in courses {
        views.push(course_view(&state.db, course).await?);
    }

    Ok(Json(views))
}

async fn create_course(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<CourseForm>,
) -> Result<(StatusCode, Json<CourseView>), AppError> {
    let input = form.validate()?;
    let course = state
        .db
        .create_course(&input)
        .await
        .reject("could not create course")?;

    Ok((StatusCode::CREATED, Json(CourseView::new(course, Vec::new()))))
}

async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseView>, AppError> {
    let course = find_course(&state.db, course_id).await?;
    Ok(Json(course_view(&state.db, course).await?))
}

async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    JsonBody(form): JsonBody<CourseForm>,
) -> Result<Json<CourseView>, AppError> {
    let input = form.validate()?;
    let course = state
        .db
        .update_course(course_id, &input)
        .await
        .reject("could not update course")?
        .or_not_found("Course not found")?;

    Ok(Json(course_view(&state.db, course).await?))
}

async fn patch_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    JsonBody(form): JsonBody<CourseForm>,
) -> Result<Json<CourseView>, AppError> {
    let course = find_course(&state.db, course_id).await?;
    let input = form.merge(&course)?;
    let course = state
        .db
        .update_course(course_id, &input)
        .await
        .reject("could not update course")?
        .or_not_found("Course not found")?;

    Ok(Json(course_view(&state.db, course).await?))
}

#[tracing::instrument(skip_all, fields(course_id))]
async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::Span::current().record("course_id", course_id);

    let deleted = state
        .db
        .delete_course(course_id)
        .await
        .reject("could not delete course")?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Course not found"))
    }
}

/// Creates a lesson under the course named in the path.
#[tracing::instrument(skip_all, fields(course_id))]
async fn add_lesson(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    JsonBody(form): JsonBody<LessonForm>,
) -> Result<(StatusCode, Json<LessonView>), AppError> {
    tracing::Span::current().record("course_id", course_id);

    let course = find_course(&state.db, course_id).await?;
    let (_, input) = form.validate()?;
    let lesson = state
        .db
        .create_lesson(course.id, &input)
        .await
        .reject("could not create lesson")?;

    Ok((StatusCode::CREATED, Json(LessonView::new(lesson, Vec::new()))))
}
