// src/session/registry.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::{
    repository::{ResultRepository, StorageError},
    session::state::{QuizSession, SessionError, SessionView, Submission},
};

/// Idle time after which an unfinished session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(4 * 60 * 60);

type SessionMap = HashMap<Uuid, Slot>;

struct Slot {
    session: Arc<AsyncMutex<QuizSession>>,
    user_id: Uuid,
    quiz_id: Uuid,
    expires_at: Instant,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Live sessions of all users, keyed by session id.
///
/// The map lock is only held to look a slot up; each session has its own
/// async lock so requests against one session run one at a time.
///
/// A user holds at most one live session per quiz: starting the quiz again
/// replaces the previous attempt. Sessions idle for longer than the TTL are
/// treated as abandoned and purged.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<SessionMap>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

fn lock(sessions: &Mutex<SessionMap>) -> MutexGuard<'_, SessionMap> {
    sessions.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Registers a freshly loaded session and returns its first view.
    ///
    /// Expired sessions and the user's previous session on the same quiz are
    /// dropped first.
    pub fn insert(&self, session: QuizSession) -> SessionView {
        let view = session.view();
        let user_id = session.user_id();
        let quiz_id = session.quiz().id;
        let now = Instant::now();

        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, slot| {
            !slot.is_expired(now) && !(slot.user_id == user_id && slot.quiz_id == quiz_id)
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} stale quiz sessions", evicted);
        }

        sessions.insert(
            session.id(),
            Slot {
                session: Arc::new(AsyncMutex::new(session)),
                user_id,
                quiz_id,
                expires_at: now + self.ttl,
            },
        );
        view
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn view(&self, user_id: Uuid, session_id: Uuid) -> Result<SessionView, SessionError> {
        self.with_session(user_id, session_id, |session| Ok(session.view()))
            .await
    }

    /// Runs `f` against the caller's session and returns the resulting view.
    pub async fn update<F>(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        f: F,
    ) -> Result<SessionView, SessionError>
    where
        F: FnOnce(&mut QuizSession) -> Result<(), SessionError>,
    {
        self.with_session(user_id, session_id, |session| {
            f(session)?;
            Ok(session.view())
        })
        .await
    }

    /// Submits the caller's session and drops it from the registry on success.
    ///
    /// The insert and the removal run on their own task; a dropped request
    /// never interrupts them.
    pub async fn submit(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        results: Arc<dyn ResultRepository>,
    ) -> Result<Submission, SessionError> {
        let slot = self.slot(user_id, session_id)?;
        let sessions = Arc::clone(&self.sessions);

        let task = tokio::spawn(async move {
            let mut session = slot.lock().await;
            let submission = session.submit(results.as_ref()).await?;
            lock(&sessions).remove(&session_id);
            Ok(submission)
        });

        task.await
            .map_err(|e| SessionError::Persistence(StorageError::Database(e.to_string())))?
    }

    /// Abandons the caller's session. Nothing was persisted, so nothing is undone.
    pub async fn abandon(&self, user_id: Uuid, session_id: Uuid) -> Result<(), SessionError> {
        self.slot(user_id, session_id)?;
        lock(&self.sessions).remove(&session_id);
        Ok(())
    }

    async fn with_session<T, F>(&self, user_id: Uuid, session_id: Uuid, f: F) -> Result<T, SessionError>
    where
        F: FnOnce(&mut QuizSession) -> Result<T, SessionError>,
    {
        let slot = self.slot(user_id, session_id)?;
        let mut session = slot.lock().await;
        f(&mut *session)
    }

    /// Looks up the caller's session and pushes its expiry forward.
    /// Expired sessions and sessions of other users are reported as unknown.
    fn slot(&self, user_id: Uuid, session_id: Uuid) -> Result<Arc<AsyncMutex<QuizSession>>, SessionError> {
        let now = Instant::now();
        let mut sessions = lock(&self.sessions);

        let expired = match sessions.get_mut(&session_id) {
            Some(slot) if slot.user_id != user_id => return Err(SessionError::UnknownSession),
            Some(slot) if !slot.is_expired(now) => {
                slot.expires_at = now + self.ttl;
                return Ok(Arc::clone(&slot.session));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            sessions.remove(&session_id);
        }
        Err(SessionError::UnknownSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{question::Question, quiz::Quiz};
    use crate::repository::{InMemoryRepository, QuizRepository};
    use chrono::Utc;
    use sqlx::types::Json;

    async fn loaded_session(repo: &InMemoryRepository, user_id: Uuid) -> QuizSession {
        let quiz_id = seeded_quiz(repo).await;
        QuizSession::load(repo, user_id, quiz_id).await.unwrap()
    }

    async fn seeded_quiz(repo: &InMemoryRepository) -> Uuid {
        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: "Registry".to_string(),
            description: String::new(),
            passing_score: 50,
            created_at: Utc::now(),
        };
        let questions = vec![Question {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            question_text: "Pick A".to_string(),
            options: Json(vec!["A".to_string(), "B".to_string()]),
            correct_answer: 0,
            order_index: 1,
        }];
        repo.insert_quiz(&quiz, &questions).await.unwrap();
        quiz.id
    }

    #[tokio::test]
    async fn sessions_are_private_to_their_owner() {
        let repo = InMemoryRepository::new();
        let registry = SessionRegistry::new();
        let owner = Uuid::new_v4();
        let view = registry.insert(loaded_session(&repo, owner).await);

        assert!(registry.view(owner, view.session_id).await.is_ok());
        assert!(matches!(
            registry.view(Uuid::new_v4(), view.session_id).await,
            Err(SessionError::UnknownSession)
        ));
        assert!(matches!(
            registry
                .update(Uuid::new_v4(), view.session_id, |s| s.select_answer(0))
                .await,
            Err(SessionError::UnknownSession)
        ));
    }

    #[tokio::test]
    async fn submit_removes_the_session() {
        let repo = InMemoryRepository::new();
        let registry = SessionRegistry::new();
        let owner = Uuid::new_v4();
        let view = registry.insert(loaded_session(&repo, owner).await);

        registry
            .update(owner, view.session_id, |s| s.select_answer(0))
            .await
            .unwrap();
        let submission = registry
            .submit(owner, view.session_id, Arc::new(repo.clone()))
            .await
            .unwrap();

        assert_eq!(submission.score.percentage, 100);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.view(owner, view.session_id).await,
            Err(SessionError::UnknownSession)
        ));
    }

    #[tokio::test]
    async fn failed_validation_keeps_the_session() {
        let repo = InMemoryRepository::new();
        let registry = SessionRegistry::new();
        let owner = Uuid::new_v4();
        let view = registry.insert(loaded_session(&repo, owner).await);

        let err = registry
            .submit(owner, view.session_id, Arc::new(repo.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn abandon_discards_the_session() {
        let repo = InMemoryRepository::new();
        let registry = SessionRegistry::new();
        let owner = Uuid::new_v4();
        let view = registry.insert(loaded_session(&repo, owner).await);

        registry.abandon(owner, view.session_id).await.unwrap();
        assert!(registry.is_empty());
        assert!(repo.list_results_for_user(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restarting_a_quiz_replaces_the_previous_session() {
        let repo = InMemoryRepository::new();
        let registry = SessionRegistry::new();
        let owner = Uuid::new_v4();
        let quiz_id = seeded_quiz(&repo).await;

        let first = registry.insert(QuizSession::load(&repo, owner, quiz_id).await.unwrap());
        for _ in 0..1_000 {
            registry.insert(QuizSession::load(&repo, owner, quiz_id).await.unwrap());
        }
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.view(owner, first.session_id).await,
            Err(SessionError::UnknownSession)
        ));

        // Other quizzes and other users keep their own sessions
        registry.insert(loaded_session(&repo, owner).await);
        registry.insert(QuizSession::load(&repo, Uuid::new_v4(), quiz_id).await.unwrap());
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let repo = InMemoryRepository::new();
        let registry = SessionRegistry::with_ttl(Duration::from_millis(50));
        let owner = Uuid::new_v4();
        let stale = registry.insert(loaded_session(&repo, owner).await);
        assert!(registry.view(owner, stale.session_id).await.is_ok());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(matches!(
            registry.view(owner, stale.session_id).await,
            Err(SessionError::UnknownSession)
        ));

        let other = registry.insert(loaded_session(&repo, Uuid::new_v4()).await);
        tokio::time::sleep(Duration::from_millis(80)).await;
        registry.insert(loaded_session(&repo, owner).await);
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.view(owner, other.session_id).await,
            Err(SessionError::UnknownSession)
        ));
    }

    #[tokio::test]
    async fn dropped_submit_request_still_closes_the_session() {
        let repo = InMemoryRepository::new();
        let registry = SessionRegistry::new();
        let owner = Uuid::new_v4();
        let view = registry.insert(loaded_session(&repo, owner).await);
        registry
            .update(owner, view.session_id, |s| s.select_answer(0))
            .await
            .unwrap();

        // Poll the submit once, then drop it
        let submit = registry.submit(owner, view.session_id, Arc::new(repo.clone()));
        let _ = tokio::time::timeout(Duration::ZERO, submit).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(registry.is_empty());
        assert_eq!(repo.list_results_for_user(owner).await.unwrap().len(), 1);
    }
}
