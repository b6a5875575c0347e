use color_eyre::Result;

use super::models::{Answer, AnswerInput};
use super::Db;

impl Db {
    pub async fn create_answer(&self, input: &AnswerInput) -> Result<Answer> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (question_id, text, is_correct) VALUES (?, ?, ?)
            RETURNING id, question_id, text, is_correct
            "#,
        )
        .bind(input.question_id)
        .bind(&input.text)
        .bind(input.is_correct)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "answer created with id: {} for question_id: {}",
            answer.id,
            input.question_id
        );
        Ok(answer)
    }

    pub async fn answers(&self, question_id: Option<i64>) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, question_id, text, is_correct FROM answers
            WHERE (? IS NULL OR question_id = ?)
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    pub async fn get_answer(&self, answer_id: i64) -> Result<Option<Answer>> {
        let answer = sqlx::query_as::<_, Answer>(
            "SELECT id, question_id, text, is_correct FROM answers WHERE id = ?",
        )
        .bind(answer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(answer)
    }

    pub async fn update_answer(
        &self,
        answer_id: i64,
        input: &AnswerInput,
    ) -> Result<Option<Answer>> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            UPDATE answers SET question_id = ?, text = ?, is_correct = ?
            WHERE id = ?
            RETURNING id, question_id, text, is_correct
            "#,
        )
        .bind(input.question_id)
        .bind(&input.text)
        .bind(input.is_correct)
        .bind(answer_id)
        .fetch_optional(&self.pool)
        .await?;

        if answer.is_some() {
            tracing::info!("answer updated with id: {answer_id}");
        }
        Ok(answer)
    }

    pub async fn delete_answer(&self, answer_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM answers WHERE id = ?")
            .bind(answer_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("answer deleted with id: {answer_id}");
        }
        Ok(deleted)
    }
}
