// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

use crate::models::quiz::Quiz;

/// Represents the 'results' table in the database.
/// One row per submitted attempt; rows are never updated.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,

    /// Rounded percentage, 0..=100.
    pub score: i32,
    pub total_questions: i32,
    pub passed: bool,

    /// Chosen option index per question, in question order.
    pub answers: Json<Vec<i32>>,

    pub created_at: DateTime<Utc>,
}

impl QuizResult {
    /// Number of correct answers implied by the stored percentage.
    pub fn correct_answers(&self) -> i32 {
        (f64::from(self.score) / 100.0 * f64::from(self.total_questions)).round() as i32
    }
}

/// Values for inserting a new result row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub passed: bool,
    pub answers: Vec<i32>,
}

/// Response for a single result page.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultDetails {
    pub result: QuizResult,
    pub quiz: Quiz,
    pub correct_answers: i32,
}

/// Response for a successful quiz submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub result_id: Uuid,
    pub score: i32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub passed: bool,
}

/// Aggregate figures shown on the dashboard.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub completed: usize,
    pub passed: usize,
    pub average_score: i32,
}

impl DashboardStats {
    pub fn from_results(results: &[QuizResult]) -> Self {
        let completed = results.len();
        if completed == 0 {
            return Self::default();
        }
        let passed = results.iter().filter(|r| r.passed).count();
        let total: i64 = results.iter().map(|r| i64::from(r.score)).sum();
        let average_score = (total as f64 / completed as f64).round() as i32;

        Self {
            completed,
            passed,
            average_score,
        }
    }
}

/// A quiz card on the dashboard with the user's latest attempt, if any.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardQuiz {
    pub quiz: Quiz,
    pub latest_result: Option<QuizResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub quizzes: Vec<DashboardQuiz>,
    pub results: Vec<QuizResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: i32, total: i32, passed: bool) -> QuizResult {
        QuizResult {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            score,
            total_questions: total,
            passed,
            answers: Json(vec![0; total as usize]),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_correct_answers_from_score() {
        assert_eq!(result(80, 5, true).correct_answers(), 4);
        assert_eq!(result(67, 3, false).correct_answers(), 2);
        assert_eq!(result(0, 4, false).correct_answers(), 0);
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = DashboardStats::from_results(&[
            result(80, 5, true),
            result(60, 5, false),
            result(65, 3, false),
        ]);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.passed, 1);
        // 205 / 3 = 68.33
        assert_eq!(stats.average_score, 68);
    }

    #[test]
    fn test_dashboard_stats_empty() {
        assert_eq!(DashboardStats::from_results(&[]), DashboardStats::default());
    }
}
