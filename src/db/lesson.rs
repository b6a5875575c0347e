use chrono::Utc;
use color_eyre::Result;

use super::models::{Lesson, LessonInput};
use super::Db;

const LESSON_COLUMNS: &str = "id, course_id, title, kind, content, video_url, created_at";

impl Db {
    pub async fn create_lesson(&self, course_id: i64, input: &LessonInput) -> Result<Lesson> {
        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            r#"
            INSERT INTO lessons (course_id, title, kind, content, video_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {LESSON_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(&input.title)
        .bind(input.lesson_type.as_str())
        .bind(&input.content)
        .bind(&input.video_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "new {} lesson created with id: {} for course_id: {course_id}",
            input.lesson_type.as_str(),
            lesson.id
        );
        Ok(lesson)
    }

    /// All lessons, optionally restricted to one course, oldest first.
    pub async fn lessons(&self, course_id: Option<i64>) -> Result<Vec<Lesson>> {
        let lessons = sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE (? IS NULL OR course_id = ?) ORDER BY id"
        ))
        .bind(course_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lessons)
    }

    pub async fn get_lesson(&self, lesson_id: i64) -> Result<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?"
        ))
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lesson)
    }

    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        course_id: i64,
        input: &LessonInput,
    ) -> Result<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            r#"
            UPDATE lessons SET course_id = ?, title = ?, kind = ?, content = ?, video_url = ?
            WHERE id = ?
            RETURNING {LESSON_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(&input.title)
        .bind(input.lesson_type.as_str())
        .bind(&input.content)
        .bind(&input.video_url)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        if lesson.is_some() {
            tracing::info!("lesson updated with id: {lesson_id}");
        }
        Ok(lesson)
    }

    /// Overwrites the lesson body text, leaving every other field untouched.
    pub async fn set_lesson_content(
        &self,
        lesson_id: i64,
        content: &str,
    ) -> Result<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "UPDATE lessons SET content = ? WHERE id = ? RETURNING {LESSON_COLUMNS}"
        ))
        .bind(content)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        if lesson.is_some() {
            tracing::info!("lesson content replaced for id: {lesson_id}");
        }
        Ok(lesson)
    }

    pub async fn delete_lesson(&self, lesson_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
            .bind(lesson_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("lesson deleted with id: {lesson_id}");
        }
        Ok(deleted)
    }
}
