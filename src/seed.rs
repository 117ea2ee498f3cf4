// src/seed.rs

//! Startup and on-demand seeding: demo quizzes and the admin account.

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{question::Question, quiz::Quiz, user::NewUser},
    repository::{QuizRepository, StorageError, UserRepository},
    utils::hash::hash_password,
};

struct SampleQuiz {
    id: u128,
    title: &'static str,
    description: &'static str,
    passing_score: i32,
    questions: &'static [(&'static str, &'static [&'static str], i32)],
}

const SAMPLE_QUIZZES: &[SampleQuiz] = &[
    SampleQuiz {
        id: 0x5a3d_0001,
        title: "JavaScript Fundamentals",
        description: "Test your knowledge of JavaScript basics including variables, functions, and data types.",
        passing_score: 70,
        questions: &[
            (
                "Which of the following is used to declare a variable in JavaScript?",
                &["var", "let", "const", "All of the above"],
                3,
            ),
            (
                "What is the result of typeof null in JavaScript?",
                &["null", "undefined", "object", "boolean"],
                2,
            ),
            (
                "Which method is used to add an element to the end of an array?",
                &["push()", "pop()", "shift()", "unshift()"],
                0,
            ),
            (
                "What does the \"===\" operator do in JavaScript?",
                &["Assignment", "Loose equality", "Strict equality", "Not equal"],
                2,
            ),
            (
                "Which of the following is NOT a JavaScript data type?",
                &["String", "Number", "Boolean", "Float"],
                3,
            ),
        ],
    },
    SampleQuiz {
        id: 0x5a3d_0002,
        title: "React Development",
        description: "Assess your React skills covering components, hooks, and state management.",
        passing_score: 75,
        questions: &[
            (
                "What is JSX?",
                &["A JavaScript library", "A syntax extension for JavaScript", "A CSS framework", "A database"],
                1,
            ),
            (
                "Which hook is used to manage state in functional components?",
                &["useEffect", "useState", "useContext", "useCallback"],
                1,
            ),
            (
                "What is the purpose of the key prop in React lists?",
                &["Styling", "Performance optimization", "Event handling", "Data binding"],
                1,
            ),
            (
                "When does useEffect run by default?",
                &["Before render", "After every render", "Only on mount", "On state change"],
                1,
            ),
            (
                "What is React context used for?",
                &["Styling components", "Managing global state", "Routing", "API calls"],
                1,
            ),
        ],
    },
    SampleQuiz {
        id: 0x5a3d_0003,
        title: "Web Development Basics",
        description: "Fundamental concepts of HTML, CSS, and web development principles.",
        passing_score: 65,
        questions: &[
            (
                "What does HTML stand for?",
                &[
                    "Hyper Text Markup Language",
                    "High Tech Modern Language",
                    "Home Tool Markup Language",
                    "Hyperlink and Text Markup Language",
                ],
                0,
            ),
            (
                "Which CSS property is used to change the text color?",
                &["text-color", "color", "font-color", "text-style"],
                1,
            ),
            (
                "What is the correct HTML element for the largest heading?",
                &["<h6>", "<heading>", "<h1>", "<header>"],
                2,
            ),
            (
                "Which HTTP method is used to retrieve data?",
                &["POST", "PUT", "GET", "DELETE"],
                2,
            ),
            (
                "What does CSS stand for?",
                &["Computer Style Sheets", "Cascading Style Sheets", "Creative Style Sheets", "Colorful Style Sheets"],
                1,
            ),
        ],
    },
];

/// Inserts the demo quizzes that are not there yet.
///
/// Ids are fixed, so running this again never duplicates anything.
/// Returns how many quizzes were newly inserted.
pub async fn load_sample_data(quizzes: &dyn QuizRepository) -> Result<usize, StorageError> {
    let mut inserted = 0;

    for sample in SAMPLE_QUIZZES {
        let quiz = Quiz {
            id: Uuid::from_u128(sample.id),
            title: sample.title.to_string(),
            description: sample.description.to_string(),
            passing_score: sample.passing_score,
            created_at: Utc::now(),
        };
        let questions: Vec<Question> = sample
            .questions
            .iter()
            .enumerate()
            .map(|(i, (text, options, correct))| Question {
                id: Uuid::from_u128((sample.id << 16) | (i as u128 + 1)),
                quiz_id: quiz.id,
                question_text: text.to_string(),
                options: Json(options.iter().map(|o| o.to_string()).collect()),
                correct_answer: *correct,
                order_index: i as i32 + 1,
            })
            .collect();

        if quizzes.insert_quiz(&quiz, &questions).await? {
            tracing::info!("Seeded sample quiz: {}", quiz.title);
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Creates the admin account from `ADMIN_EMAIL` / `ADMIN_PASSWORD` if it does not exist.
pub async fn seed_admin_user(users: &dyn UserRepository, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    if users.find_user_by_email(email).await?.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", email);
    let password_hash = hash_password(password)?;
    users
        .create_user(&NewUser {
            email: email.clone(),
            name: "Administrator".to_string(),
            password_hash,
            role: "admin".to_string(),
        })
        .await?;
    tracing::info!("Admin user created successfully.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    #[tokio::test]
    async fn sample_data_loads_once() {
        let repo = InMemoryRepository::new();
        assert_eq!(load_sample_data(&repo).await.unwrap(), 3);
        assert_eq!(load_sample_data(&repo).await.unwrap(), 0);

        let quizzes = repo.list_quizzes().await.unwrap();
        assert_eq!(quizzes.len(), 3);
        for quiz in quizzes {
            let questions = repo.list_questions(quiz.id).await.unwrap();
            assert_eq!(questions.len(), 5);
            assert!(questions.iter().all(|q| q.is_correct(q.correct_answer as usize)));
        }
    }
}
