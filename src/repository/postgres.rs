// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use super::{QuizRepository, ResultRepository, StorageError, UserRepository};
use crate::models::{
    question::Question,
    quiz::Quiz,
    result::{NewResult, QuizResult},
    user::{NewUser, User},
};

const QUIZ_COLUMNS: &str = "id, title, description, passing_score, created_at";
const RESULT_COLUMNS: &str =
    "id, user_id, quiz_id, score, total_questions, passed, answers, created_at";
const USER_COLUMNS: &str = "id, email, name, password, role, created_at";

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizRepository for PgRepository {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StorageError> {
        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, StorageError> {
        sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, StorageError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, quiz_id, question_text, options, correct_answer, order_index
            FROM questions
            WHERE quiz_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn insert_quiz(&self, quiz: &Quiz, questions: &[Question]) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO quizzes (id, title, description, passing_score, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(quiz.id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(quiz.passing_score)
        .bind(quiz.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        for question in questions {
            sqlx::query(
                r#"
                INSERT INTO questions (id, quiz_id, question_text, options, correct_answer, order_index)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(question.id)
            .bind(quiz.id)
            .bind(&question.question_text)
            .bind(&question.options)
            .bind(question.correct_answer)
            .bind(question.order_index)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl ResultRepository for PgRepository {
    async fn insert_result(&self, result: &NewResult) -> Result<QuizResult, StorageError> {
        let row = sqlx::query_as::<_, QuizResult>(&format!(
            r#"
            INSERT INTO results (user_id, quiz_id, score, total_questions, passed, answers)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RESULT_COLUMNS}
            "#
        ))
        .bind(result.user_id)
        .bind(result.quiz_id)
        .bind(result.score)
        .bind(result.total_questions)
        .bind(result.passed)
        .bind(Json(result.answers.clone()))
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_result(&self, id: Uuid) -> Result<QuizResult, StorageError> {
        sqlx::query_as::<_, QuizResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM results WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn list_results_for_user(&self, user_id: Uuid) -> Result<Vec<QuizResult>, StorageError> {
        let results = sqlx::query_as::<_, QuizResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM results WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, StorageError> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }
}
