use color_eyre::{eyre::OptionExt, Result};
use sqlx::{Sqlite, Transaction};

use super::models::{bool_token, NewQuestion, Question, QuestionBody, QuestionRow};
use super::Db;

/// Base row plus both extension rows; the discriminator picks which one counts.
const SELECT_QUESTIONS: &str = r#"
    SELECT
        q.id AS id,
        q.lesson_id AS lesson_id,
        q.text AS text,
        q.kind AS kind,
        tf.correct_answer AS tf_correct_answer,
        mc.options AS mc_options,
        mc.correct_answer AS mc_correct_answer
    FROM questions q
    LEFT JOIN true_false_questions tf ON tf.question_id = q.id
    LEFT JOIN multiple_choice_questions mc ON mc.question_id = q.id
"#;

impl Db {
    /// Inserts the base row and the variant's extension row atomically.
    pub async fn create_question(&self, lesson_id: i64, question: &NewQuestion) -> Result<Question> {
        let mut tx = self.pool.begin().await?;

        let question_id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (lesson_id, text, kind) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(lesson_id)
        .bind(&question.text)
        .bind(question.body.kind().as_str())
        .fetch_one(&mut *tx)
        .await?;

        insert_variant(&mut tx, question_id, &question.body).await?;

        tx.commit().await?;

        tracing::info!(
            "new {} question created with id: {question_id} for lesson_id: {lesson_id}",
            question.body.kind().as_str()
        );

        self.get_question(question_id)
            .await?
            .ok_or_eyre("created question could not be read back")
    }

    pub async fn get_question(&self, question_id: i64) -> Result<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!("{SELECT_QUESTIONS} WHERE q.id = ?"))
            .bind(question_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(QuestionRow::resolve))
    }

    /// Questions of one lesson, each resolved to its variant, in creation order.
    pub async fn lesson_questions(&self, lesson_id: i64) -> Result<Vec<Question>> {
        self.questions(Some(lesson_id)).await
    }

    pub async fn questions(&self, lesson_id: Option<i64>) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "{SELECT_QUESTIONS} WHERE (? IS NULL OR q.lesson_id = ?) ORDER BY q.id"
        ))
        .bind(lesson_id)
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuestionRow::resolve).collect())
    }

    /// Rewrites the question, replacing whichever extension row it had.
    /// Switching between variants keeps the question id (and its answers).
    pub async fn update_question(
        &self,
        question_id: i64,
        lesson_id: i64,
        question: &NewQuestion,
    ) -> Result<Option<Question>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE questions SET lesson_id = ?, text = ?, kind = ? WHERE id = ?")
            .bind(lesson_id)
            .bind(&question.text)
            .bind(question.body.kind().as_str())
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM true_false_questions WHERE question_id = ?")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM multiple_choice_questions WHERE question_id = ?")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        insert_variant(&mut tx, question_id, &question.body).await?;

        tx.commit().await?;

        tracing::info!("question updated with id: {question_id}");
        self.get_question(question_id).await
    }

    pub async fn delete_question(&self, question_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(question_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("question deleted with id: {question_id}");
        }
        Ok(deleted)
    }
}

async fn insert_variant(
    tx: &mut Transaction<'_, Sqlite>,
    question_id: i64,
    body: &QuestionBody,
) -> Result<()> {
    match body {
        QuestionBody::TrueFalse { correct_answer } => {
            sqlx::query(
                "INSERT INTO true_false_questions (question_id, correct_answer) VALUES (?, ?)",
            )
            .bind(question_id)
            .bind(bool_token(*correct_answer))
            .execute(&mut **tx)
            .await?;
        }
        QuestionBody::MultipleChoice {
            options,
            correct_answer,
        } => {
            sqlx::query(
                "INSERT INTO multiple_choice_questions (question_id, options, correct_answer) VALUES (?, ?, ?)",
            )
            .bind(question_id)
            .bind(serde_json::to_string(options)?)
            .bind(correct_answer)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}
