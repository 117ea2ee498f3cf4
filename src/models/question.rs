// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_text: String,

    /// Answer options in display order.
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Index into `options` of the correct answer.
    pub correct_answer: i32,

    /// Sort key of the question within its quiz.
    pub order_index: i32,
}

impl Question {
    /// Returns true when `option` is the correct answer for this question.
    pub fn is_correct(&self, option: usize) -> bool {
        usize::try_from(self.correct_answer).is_ok_and(|correct| correct == option)
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

/// DTO for sending a question to the quiz taker (excludes the correct answer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text.clone(),
            options: q.options.0.clone(),
        }
    }
}

/// DTO for one question inside a quiz creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: i32,
}

pub(crate) fn validate_questions(
    questions: &[CreateQuestionRequest],
) -> Result<(), validator::ValidationError> {
    if questions.is_empty() {
        return Err(validator::ValidationError::new("questions_cannot_be_empty"));
    }
    for q in questions {
        if q.question_text.trim().is_empty() || q.question_text.len() > 1000 {
            return Err(validator::ValidationError::new("invalid_question_text"));
        }
        if q.options.len() < 2 {
            return Err(validator::ValidationError::new("too_few_options"));
        }
        if q.options.iter().any(|opt| opt.is_empty() || opt.len() > 500) {
            return Err(validator::ValidationError::new("invalid_option"));
        }
        let in_range = usize::try_from(q.correct_answer).is_ok_and(|i| i < q.options.len());
        if !in_range {
            return Err(validator::ValidationError::new("correct_answer_out_of_range"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], correct: i32) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: "Which one?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct,
        }
    }

    #[test]
    fn test_validate_questions_accepts_well_formed() {
        assert!(validate_questions(&[question(&["A", "B"], 1)]).is_ok());
    }

    #[test]
    fn test_validate_questions_rejects_bad_input() {
        assert!(validate_questions(&[]).is_err());
        assert!(validate_questions(&[question(&["A"], 0)]).is_err());
        assert!(validate_questions(&[question(&["A", "B"], 2)]).is_err());
        assert!(validate_questions(&[question(&["A", "B"], -1)]).is_err());
    }

    #[test]
    fn test_is_correct() {
        let q = Question {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            question_text: "2 + 2".to_string(),
            options: Json(vec!["3".to_string(), "4".to_string()]),
            correct_answer: 1,
            order_index: 1,
        };
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.option_count(), 2);
    }
}
