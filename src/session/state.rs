// src/session/state.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        question::{PublicQuestion, Question},
        quiz::Quiz,
        result::NewResult,
    },
    repository::{QuizRepository, ResultRepository, StorageError},
    session::scoring::{Score, score_answers},
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The quiz does not exist or has no questions.
    #[error("quiz not found")]
    NotFound,

    /// No live session with this id belongs to the caller.
    #[error("session not found")]
    UnknownSession,

    #[error("{0}")]
    Validation(String),

    #[error("cannot {action} while the session is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },

    #[error("persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

/// Lifecycle of a loaded session.
///
/// Loading is the pending `QuizSession::load` future and a failed load is
/// `SessionError::NotFound`, so no session value ever exists in those states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Ready,
    Submitting,
    Submitted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Ready => "ready",
            SessionState::Submitting => "submitting",
            SessionState::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub result_id: Uuid,
    pub score: Score,
}

/// Read-only snapshot of a session handed to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub quiz_id: Uuid,
    pub quiz_title: String,
    pub passing_score: i32,
    pub state: SessionState,
    pub current_index: usize,
    pub question_count: usize,
    pub current_question: PublicQuestion,
    /// One slot per question; `null` while unanswered.
    pub answers: Vec<Option<usize>>,
    pub answered_count: usize,
    /// `(current_index + 1) / question_count`.
    pub progress: f64,
    pub result_id: Option<Uuid>,
}

/// One user's attempt at one quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    user_id: Uuid,
    quiz: Quiz,
    questions: Vec<Question>,
    current: usize,
    answers: Vec<Option<usize>>,
    state: SessionState,
    result_id: Option<Uuid>,
}

impl QuizSession {
    /// Fetches the quiz and its ordered questions and starts a fresh attempt.
    ///
    /// Fails with `SessionError::NotFound` if the quiz is missing or empty.
    pub async fn load(
        quizzes: &dyn QuizRepository,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Self, SessionError> {
        let quiz = match quizzes.get_quiz(quiz_id).await {
            Ok(quiz) => quiz,
            Err(StorageError::NotFound) => return Err(SessionError::NotFound),
            Err(e) => return Err(SessionError::Persistence(e)),
        };
        let questions = quizzes.list_questions(quiz_id).await?;

        Self::new(user_id, quiz, questions)
    }

    /// Starts an attempt over already loaded questions, sorted by `order_index`.
    pub fn new(user_id: Uuid, quiz: Quiz, mut questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NotFound);
        }
        questions.sort_by_key(|q| q.order_index);

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            quiz,
            answers: vec![None; questions.len()],
            questions,
            current: 0,
            state: SessionState::Ready,
            result_id: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn result_id(&self) -> Option<Uuid> {
        self.result_id
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Zero-based indices of questions that still have no answer.
    pub fn unanswered(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.is_none().then_some(i))
            .collect()
    }

    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.questions.len() as f64
    }

    /// Records `option` as the answer to the current question. Last write wins.
    pub fn select_answer(&mut self, option: usize) -> Result<(), SessionError> {
        self.ensure_ready("select an answer")?;

        let available = self.current_question().option_count();
        if option >= available {
            return Err(SessionError::Validation(format!(
                "option {option} is out of range for a question with {available} options"
            )));
        }

        self.answers[self.current] = Some(option);
        Ok(())
    }

    /// Moves to the next question; no-op on the last one.
    pub fn advance(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Moves to the previous question; no-op on the first one.
    pub fn retreat(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Jumps straight to question `index`.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.questions.len() {
            return Err(SessionError::Validation(format!(
                "question {index} does not exist; the quiz has {} questions",
                self.questions.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    /// Grades the attempt and persists exactly one new result row.
    ///
    /// Every question must be answered. On a storage failure the session
    /// returns to `Ready` and can be submitted again.
    pub async fn submit(&mut self, results: &dyn ResultRepository) -> Result<Submission, SessionError> {
        let (record, score) = self.prepare_submission()?;

        self.state = SessionState::Submitting;
        match results.insert_result(&record).await {
            Ok(row) => {
                self.state = SessionState::Submitted;
                self.result_id = Some(row.id);
                tracing::info!(
                    "Session {} submitted: quiz {} scored {}% ({}/{})",
                    self.id,
                    self.quiz.id,
                    score.percentage,
                    score.correct,
                    score.total
                );
                Ok(Submission {
                    result_id: row.id,
                    score,
                })
            }
            Err(e) => {
                self.state = SessionState::Ready;
                tracing::error!("Failed to save result for session {}: {:?}", self.id, e);
                Err(SessionError::Persistence(e))
            }
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            quiz_id: self.quiz.id,
            quiz_title: self.quiz.title.clone(),
            passing_score: self.quiz.passing_score,
            state: self.state,
            current_index: self.current,
            question_count: self.questions.len(),
            current_question: PublicQuestion::from(self.current_question()),
            answers: self.answers.clone(),
            answered_count: self.answered_count(),
            progress: self.progress(),
            result_id: self.result_id,
        }
    }

    fn ensure_ready(&self, action: &'static str) -> Result<(), SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::InvalidState {
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    fn prepare_submission(&self) -> Result<(NewResult, Score), SessionError> {
        self.ensure_ready("submit")?;

        let unanswered = self.unanswered();
        if !unanswered.is_empty() {
            let numbers: Vec<String> = unanswered.iter().map(|i| (i + 1).to_string()).collect();
            return Err(SessionError::Validation(format!(
                "Please answer all questions before submitting (unanswered: {})",
                numbers.join(", ")
            )));
        }

        let chosen: Vec<usize> = self.answers.iter().flatten().copied().collect();
        let score = score_answers(&self.questions, &chosen, self.quiz.passing_score);

        let record = NewResult {
            user_id: self.user_id,
            quiz_id: self.quiz.id,
            score: score.percentage,
            total_questions: self.questions.len() as i32,
            passed: score.passed,
            answers: chosen.iter().map(|&a| a as i32).collect(),
        };

        Ok((record, score))
    }
}
