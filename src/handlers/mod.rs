pub mod answer;
pub mod course;
pub mod generate;
pub mod lesson;
pub mod question;

use crate::{
    db::{Lesson, LessonType},
    rejections::AppError,
};

pub(crate) const PRACTICE_ONLY: &str = "Questions can only be added to practice lessons";

/// Questions may only be attached to practice lessons.
pub(crate) fn ensure_practice(lesson: &Lesson) -> Result<(), AppError> {
    if lesson.lesson_type == LessonType::Practice {
        Ok(())
    } else {
        tracing::warn!(
            "rejected question for {} lesson_id: {}",
            lesson.lesson_type.as_str(),
            lesson.id
        );
        Err(AppError::Input(PRACTICE_ONLY))
    }
}

/// Validation error for a body field naming a row that does not exist.
pub(crate) fn invalid_pk(field: &str, id: i64) -> AppError {
    AppError::field(field, format!("Invalid pk \"{id}\" - object does not exist."))
}
