// src/certificate.rs

//! Certificates of completion for passed results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{quiz::Quiz, result::QuizResult};

pub const ISSUER: &str = "CertifyMe Platform";

/// Everything printed on a certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub result_id: Uuid,
    /// Short human-readable id: last 8 characters of the result id, upper-cased.
    pub certificate_id: String,
    pub recipient_name: String,
    pub quiz_title: String,
    pub score: i32,
    pub completion_date: String,
    pub issuer: String,
}

impl Certificate {
    /// Builds the certificate for `result`, or `None` if the attempt did not pass.
    pub fn issue(result: &QuizResult, quiz: &Quiz, recipient_name: &str) -> Option<Self> {
        if !result.passed {
            return None;
        }

        Some(Self {
            result_id: result.id,
            certificate_id: short_id(result.id),
            recipient_name: recipient_name.to_string(),
            quiz_title: quiz.title.clone(),
            score: result.score,
            completion_date: result.created_at.format("%B %-d, %Y").to_string(),
            issuer: ISSUER.to_string(),
        })
    }

    /// Download name: the quiz title with whitespace runs replaced by `_`.
    /// Control characters and quotes are dropped so the name fits in a header.
    pub fn file_name(&self) -> String {
        let stem = self
            .quiz_title
            .split_whitespace()
            .map(|word| word.chars().filter(|c| !c.is_control() && *c != '"').collect::<String>())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        format!("{stem}_Certificate.html")
    }

    /// Renders a standalone, printable A4-landscape HTML document.
    pub fn render_html(&self) -> String {
        let name = ammonia::clean_text(&self.recipient_name);
        let title = ammonia::clean_text(&self.quiz_title);
        let date = ammonia::clean_text(&self.completion_date);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} Certificate</title>
<style>
@page {{ size: A4 landscape; margin: 0; }}
body {{ margin: 0; font-family: Georgia, serif; background: #ffffff; color: #1f2937; }}
.certificate {{ position: relative; box-sizing: border-box; width: 297mm; height: 210mm; padding: 24mm; border: 8px double #2563eb; text-align: center; }}
h1 {{ font-size: 36pt; color: #2563eb; margin: 0 0 8mm; }}
.recipient {{ font-size: 28pt; font-weight: bold; border-bottom: 2px solid #93c5fd; display: inline-block; padding: 0 12mm 2mm; }}
.quiz {{ font-size: 22pt; color: #2563eb; }}
.figures {{ margin-top: 10mm; }}
.figures div {{ display: inline-block; margin: 0 12mm; }}
.signature {{ margin-top: 16mm; }}
.signature div {{ width: 60mm; border-bottom: 2px solid #9ca3af; margin: 0 auto 2mm; }}
.id {{ position: absolute; bottom: 6mm; right: 8mm; font-size: 9pt; color: #6b7280; }}
</style>
</head>
<body>
<div class="certificate">
<h1>Certificate of Completion</h1>
<p>This is to certify that</p>
<p class="recipient">{name}</p>
<p>has successfully completed the</p>
<p class="quiz">{title}</p>
<div class="figures">
<div><strong>{score}%</strong><br>Final Score</div>
<div><strong>{date}</strong><br>Date of Completion</div>
</div>
<div class="signature"><div></div>{issuer}</div>
<p class="id">Certificate ID: {id}</p>
</div>
</body>
</html>
"#,
            score = self.score,
            issuer = ISSUER,
            id = self.certificate_id,
        )
    }
}

fn short_id(id: Uuid) -> String {
    let text = id.simple().to_string();
    text[text.len() - 8..].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;

    fn quiz(title: &str) -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            passing_score: 70,
            created_at: Utc::now(),
        }
    }

    fn result(passed: bool) -> QuizResult {
        QuizResult {
            id: Uuid::parse_str("0b5c1d7e-2f3a-4c5d-8e9f-a1b2c3d4e5f6").unwrap(),
            user_id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            score: if passed { 80 } else { 40 },
            total_questions: 5,
            passed,
            answers: Json(vec![0, 1, 2, 0, 1]),
            created_at: Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_failed_result_has_no_certificate() {
        assert!(Certificate::issue(&result(false), &quiz("Rust"), "Ada").is_none());
    }

    #[test]
    fn test_certificate_fields() {
        let cert = Certificate::issue(&result(true), &quiz("JavaScript Fundamentals"), "Ada").unwrap();
        assert_eq!(cert.certificate_id, "C3D4E5F6");
        assert_eq!(cert.completion_date, "March 7, 2026");
        assert_eq!(cert.score, 80);
        assert_eq!(cert.issuer, ISSUER);
        assert_eq!(cert.file_name(), "JavaScript_Fundamentals_Certificate.html");
    }

    #[test]
    fn test_file_name_collapses_whitespace() {
        let cert = Certificate::issue(&result(true), &quiz("Web  Development\tBasics"), "Ada").unwrap();
        assert_eq!(cert.file_name(), "Web_Development_Basics_Certificate.html");
    }

    #[test]
    fn test_file_name_drops_control_characters() {
        let cert = Certificate::issue(&result(true), &quiz("Quiz\u{1}One \"Two\" \u{7f}"), "Ada").unwrap();
        let name = cert.file_name();
        assert_eq!(name, "QuizOne_Two_Certificate.html");
        assert!(axum::http::HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")).is_ok());
    }

    #[test]
    fn test_render_escapes_user_text() {
        let cert = Certificate::issue(
            &result(true),
            &quiz("Rust"),
            "<script>alert(1)</script>",
        )
        .unwrap();
        let html = cert.render_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Certificate ID: C3D4E5F6"));
        assert!(html.contains("80%"));
    }
}
