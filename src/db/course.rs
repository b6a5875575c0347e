use chrono::Utc;
use color_eyre::Result;

use super::models::{Course, CourseInput};
use super::Db;

impl Db {
    pub async fn create_course(&self, input: &CourseInput) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (title, description, author, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, description, author, created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.author)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("new course created with id: {}", course.id);
        Ok(course)
    }

    pub async fn courses(&self) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, author, created_at FROM courses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    pub async fn get_course(&self, course_id: i64) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, author, created_at FROM courses WHERE id = ?",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        input: &CourseInput,
    ) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses SET title = ?, description = ?, author = ?
            WHERE id = ?
            RETURNING id, title, description, author, created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.author)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        if course.is_some() {
            tracing::info!("course updated with id: {course_id}");
        }
        Ok(course)
    }

    /// Deletes the course; lessons, their questions and answers go with it.
    /// Returns `false` when no course had that id.
    pub async fn delete_course(&self, course_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("course deleted with id: {course_id}");
        }
        Ok(deleted)
    }
}
