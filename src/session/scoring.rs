// src/session/scoring.rs

use crate::models::question::Question;

/// Outcome of grading one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    /// `round(100 * correct / total)`, halves rounded up.
    pub percentage: i32,
    pub passed: bool,
}

/// Grades `answers` against `questions` position by position.
///
/// The percentage is computed in integers so that the rounding is exact:
/// `(200 * correct + total) / (2 * total)` is `floor(100 * correct / total + 0.5)`.
pub fn score_answers(questions: &[Question], answers: &[usize], passing_score: i32) -> Score {
    let total = questions.len();
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.is_correct(**answer))
        .count();

    let percentage = if total == 0 {
        0
    } else {
        ((200 * correct + total) / (2 * total)) as i32
    };

    Score {
        correct,
        total,
        percentage,
        passed: percentage >= passing_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use uuid::Uuid;

    /// Builds `n` questions whose correct answer is always option 0.
    fn questions(n: usize) -> Vec<Question> {
        let quiz_id = Uuid::new_v4();
        (0..n)
            .map(|i| Question {
                id: Uuid::new_v4(),
                quiz_id,
                question_text: format!("Q{i}"),
                options: Json(vec!["A".into(), "B".into(), "C".into()]),
                correct_answer: 0,
                order_index: i as i32,
            })
            .collect()
    }

    fn answers_with_correct(n: usize, correct: usize) -> Vec<usize> {
        (0..n).map(|i| if i < correct { 0 } else { 1 }).collect()
    }

    #[test]
    fn test_score_four_of_five_passes() {
        let score = score_answers(&questions(5), &answers_with_correct(5, 4), 70);
        assert_eq!(score.correct, 4);
        assert_eq!(score.percentage, 80);
        assert!(score.passed);
    }

    #[test]
    fn test_score_three_of_five_fails() {
        let score = score_answers(&questions(5), &answers_with_correct(5, 3), 70);
        assert_eq!(score.percentage, 60);
        assert!(!score.passed);
    }

    #[test]
    fn test_score_two_of_three_rounds_to_67() {
        let score = score_answers(&questions(3), &answers_with_correct(3, 2), 70);
        assert_eq!(score.percentage, 67);
        assert!(!score.passed);
    }

    #[test]
    fn test_score_one_of_three_rounds_down() {
        let score = score_answers(&questions(3), &answers_with_correct(3, 1), 70);
        assert_eq!(score.percentage, 33);
    }

    #[test]
    fn test_score_half_rounds_up() {
        // 1 / 8 = 12.5%
        let score = score_answers(&questions(8), &answers_with_correct(8, 1), 10);
        assert_eq!(score.percentage, 13);
        assert!(score.passed);
    }

    #[test]
    fn test_score_exact_threshold_passes() {
        let score = score_answers(&questions(10), &answers_with_correct(10, 7), 70);
        assert_eq!(score.percentage, 70);
        assert!(score.passed);
    }

    #[test]
    fn test_score_perfect_and_zero() {
        let perfect = score_answers(&questions(4), &answers_with_correct(4, 4), 100);
        assert_eq!(perfect.percentage, 100);
        assert!(perfect.passed);

        let zero = score_answers(&questions(4), &answers_with_correct(4, 0), 0);
        assert_eq!(zero.percentage, 0);
        assert!(zero.passed);
    }
}
