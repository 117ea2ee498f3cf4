// src/repository/memory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use super::{QuizRepository, ResultRepository, StorageError, UserRepository};
use crate::models::{
    question::Question,
    quiz::Quiz,
    result::{NewResult, QuizResult},
    user::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    quizzes: HashMap<Uuid, Quiz>,
    questions: HashMap<Uuid, Vec<Question>>,
    results: Vec<QuizResult>,
    users: HashMap<Uuid, User>,
}

/// Process-local storage with the same semantics as the Postgres backend.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StorageError> {
        let guard = self.lock()?;
        let mut quizzes: Vec<Quiz> = guard.quizzes.values().cloned().collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quizzes)
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, StorageError> {
        let guard = self.lock()?;
        guard.quizzes.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        let mut questions = guard.questions.get(&quiz_id).cloned().unwrap_or_default();
        questions.sort_by_key(|q| q.order_index);
        Ok(questions)
    }

    async fn insert_quiz(&self, quiz: &Quiz, questions: &[Question]) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        if guard.quizzes.contains_key(&quiz.id) {
            return Ok(false);
        }
        guard.quizzes.insert(quiz.id, quiz.clone());
        guard.questions.insert(quiz.id, questions.to_vec());
        Ok(true)
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn insert_result(&self, result: &NewResult) -> Result<QuizResult, StorageError> {
        let mut guard = self.lock()?;
        let row = QuizResult {
            id: Uuid::new_v4(),
            user_id: result.user_id,
            quiz_id: result.quiz_id,
            score: result.score,
            total_questions: result.total_questions,
            passed: result.passed,
            answers: Json(result.answers.clone()),
            created_at: Utc::now(),
        };
        guard.results.push(row.clone());
        Ok(row)
    }

    async fn get_result(&self, id: Uuid) -> Result<QuizResult, StorageError> {
        let guard = self.lock()?;
        guard
            .results
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_results_for_user(&self, user_id: Uuid) -> Result<Vec<QuizResult>, StorageError> {
        let guard = self.lock()?;
        // Stable sort over reversed insertion order: later pushes win timestamp ties.
        let mut results: Vec<QuizResult> = guard
            .results
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, StorageError> {
        let mut guard = self.lock()?;
        if guard.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::Conflict(format!(
                "email '{}' already registered",
                user.email
            )));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            name: user.name.clone(),
            password: user.password_hash.clone(),
            role: user.role.clone(),
            created_at: Utc::now(),
        };
        guard.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StorageError> {
        let guard = self.lock()?;
        guard.users.get(&id).cloned().ok_or(StorageError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(title: &str) -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            passing_score: 70,
            created_at: Utc::now(),
        }
    }

    fn question(quiz_id: Uuid, order_index: i32) -> Question {
        Question {
            id: Uuid::new_v4(),
            quiz_id,
            question_text: format!("Question {order_index}"),
            options: Json(vec!["A".to_string(), "B".to_string()]),
            correct_answer: 0,
            order_index,
        }
    }

    #[tokio::test]
    async fn questions_come_back_sorted_by_order_index() {
        let repo = InMemoryRepository::new();
        let q = quiz("Sorting");
        let questions = vec![question(q.id, 3), question(q.id, 1), question(q.id, 2)];
        assert!(repo.insert_quiz(&q, &questions).await.unwrap());

        let loaded = repo.list_questions(q.id).await.unwrap();
        let order: Vec<i32> = loaded.iter().map(|q| q.order_index).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn insert_quiz_is_idempotent() {
        let repo = InMemoryRepository::new();
        let q = quiz("Once");
        assert!(repo.insert_quiz(&q, &[question(q.id, 1)]).await.unwrap());
        assert!(!repo.insert_quiz(&q, &[question(q.id, 1)]).await.unwrap());
        assert_eq!(repo.list_quizzes().await.unwrap().len(), 1);
        assert_eq!(repo.list_questions(q.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = InMemoryRepository::new();
        let user = NewUser {
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
        };
        repo.create_user(&user).await.unwrap();
        assert!(matches!(
            repo.create_user(&user).await,
            Err(StorageError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.get_quiz(Uuid::new_v4()).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.get_result(Uuid::new_v4()).await,
            Err(StorageError::NotFound)
        ));
        assert!(repo.list_questions(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
