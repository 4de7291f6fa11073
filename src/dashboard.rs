// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Progress and dashboard statistics derived from backend records.
//!
//! Pure functions over already-fetched data; nothing here does I/O.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Course, LearningRecord, Transaction, TransactionType};

/// Progress of a single-video course: 100 once any record for it is
/// completed, otherwise 0.
pub fn course_progress(records: &[LearningRecord], course_id: &str) -> u8 {
    if records
        .iter()
        .any(|r| r.course_id == course_id && r.completed)
    {
        100
    } else {
        0
    }
}

/// Completed lessons of `course_id` as a rounded percentage of
/// `total_lessons`. A course without lessons reports 0.
pub fn lesson_progress(records: &[LearningRecord], course_id: &str, total_lessons: usize) -> u8 {
    if total_lessons == 0 {
        return 0;
    }
    let completed = records
        .iter()
        .filter(|r| r.course_id == course_id && r.completed)
        .count();
    let percent = (completed as f64 / total_lessons as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Where a student left off.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueLearning {
    pub course_id: String,
    pub lesson_id: Option<String>,
    pub last_watched_at: Option<String>,
    pub progress_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    /// Distinct courses with at least one record.
    pub enrolled_courses: usize,
    /// Courses with at least one completed record.
    pub completed_courses: usize,
    /// Most recently watched incomplete course.
    pub continue_learning: Option<ContinueLearning>,
}

pub fn student_summary(records: &[LearningRecord]) -> StudentSummary {
    let enrolled: HashSet<&str> = records.iter().map(|r| r.course_id.as_str()).collect();

    let mut completed_per_course: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let entry = completed_per_course.entry(record.course_id.as_str()).or_default();
        if record.completed {
            *entry += 1;
        }
    }
    let completed_courses = completed_per_course.values().filter(|&&n| n > 0).count();

    let mut incomplete: Vec<&LearningRecord> = records.iter().filter(|r| !r.completed).collect();
    // Newest first; records without a parseable timestamp sort last.
    incomplete.sort_by(|a, b| watched_at(b).cmp(&watched_at(a)));
    let continue_learning = incomplete.first().map(|r| ContinueLearning {
        course_id: r.course_id.clone(),
        lesson_id: r.lesson_id.clone(),
        last_watched_at: r.last_watched_at.clone(),
        progress_percentage: r.progress_percentage,
    });

    StudentSummary {
        enrolled_courses: enrolled.len(),
        completed_courses,
        continue_learning,
    }
}

fn watched_at(record: &LearningRecord) -> Option<DateTime<Utc>> {
    record
        .last_watched_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub total_courses: usize,
    /// Distinct buyers of the teacher's courses.
    pub total_students: usize,
    /// Sum of YD paid to the teacher.
    pub total_earnings: f64,
    /// Mean course rating to one decimal; 0.0 without courses.
    pub average_rating: f64,
}

pub fn teacher_summary(
    teacher: &str,
    courses: &[Course],
    transactions: &[Transaction],
) -> TeacherSummary {
    let paid_to_teacher = || {
        transactions
            .iter()
            .filter(move |tx| tx.to_wallet_address.same_as(teacher))
    };

    let students: HashSet<String> = paid_to_teacher()
        .filter(|tx| tx.transaction_type == TransactionType::CoursePurchase)
        .map(|tx| tx.from_wallet_address.as_str().to_ascii_lowercase())
        .collect();

    let total_earnings: f64 = paid_to_teacher().map(|tx| tx.amount_yd).sum();

    let average_rating = if courses.is_empty() {
        0.0
    } else {
        let sum: f64 = courses.iter().map(|c| c.rating.unwrap_or(0.0)).sum();
        (sum / courses.len() as f64 * 10.0).round() / 10.0
    };

    TeacherSummary {
        total_courses: courses.len(),
        total_students: students.len(),
        total_earnings,
        average_rating,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const TEACHER: &str = "0xAAAAaaaaAAAAaaaaAAAAaaaaAAAAaaaaAAAAaaaa";

    fn record(course: &str, lesson: Option<&str>, completed: bool, watched: Option<&str>) -> LearningRecord {
        LearningRecord {
            id: format!("{course}-{}", lesson.unwrap_or("video")),
            course_id: course.to_string(),
            lesson_id: lesson.map(str::to_string),
            progress_percentage: if completed { 100.0 } else { 40.0 },
            completed,
            last_watched_at: watched.map(str::to_string),
        }
    }

    fn tx(from: &str, to: &str, amount: f64, kind: &str) -> Transaction {
        serde_json::from_value(json!({
            "id": format!("{from}-{amount}"),
            "fromWalletAddress": from,
            "toWalletAddress": to,
            "amountYd": amount,
            "transactionType": kind,
            "status": "confirmed"
        }))
        .unwrap()
    }

    fn course(rating: Option<f64>) -> Course {
        serde_json::from_value(json!({
            "id": "c",
            "title": "t",
            "priceYd": 10.0,
            "status": "published",
            "teacherWalletAddress": TEACHER,
            "rating": rating
        }))
        .unwrap()
    }

    #[test]
    fn single_video_progress() {
        let records = vec![record("c1", None, true, None), record("c2", None, false, None)];
        assert_eq!(course_progress(&records, "c1"), 100);
        assert_eq!(course_progress(&records, "c2"), 0);
        assert_eq!(course_progress(&records, "c3"), 0);
    }

    #[test]
    fn lesson_progress_rounds() {
        let records = vec![
            record("c1", Some("l1"), true, None),
            record("c1", Some("l2"), false, None),
        ];
        assert_eq!(lesson_progress(&records, "c1", 3), 33);
        assert_eq!(lesson_progress(&records, "c1", 0), 0);
    }

    #[test]
    fn student_summary_counts_and_continue_entry() {
        let records = vec![
            record("c1", Some("l1"), true, Some("2025-12-01T10:00:00Z")),
            record("c1", Some("l2"), false, Some("2025-12-03T10:00:00Z")),
            record("c2", None, false, Some("2025-12-05T08:00:00+02:00")),
            record("c3", None, false, None),
        ];

        let summary = student_summary(&records);

        assert_eq!(summary.enrolled_courses, 3);
        assert_eq!(summary.completed_courses, 1);
        let next = summary.continue_learning.unwrap();
        assert_eq!(next.course_id, "c2");
        assert_eq!(next.progress_percentage, 40.0);
    }

    #[test]
    fn student_summary_empty() {
        let summary = student_summary(&[]);
        assert_eq!(summary.enrolled_courses, 0);
        assert_eq!(summary.completed_courses, 0);
        assert!(summary.continue_learning.is_none());
    }

    #[test]
    fn teacher_summary_matches_dashboard() {
        let student_a = "0x1111111111111111111111111111111111111111";
        let student_b = "0x2222222222222222222222222222222222222222";
        let transactions = vec![
            tx(student_a, &TEACHER.to_lowercase(), 10.0, "course_purchase"),
            tx(&student_a.to_uppercase().replacen("0X", "0x", 1), TEACHER, 15.0, "course_purchase"),
            tx(student_b, TEACHER, 5.0, "reward"),
            tx(student_b, student_a, 99.0, "course_purchase"),
        ];
        let courses = vec![course(Some(4.5)), course(Some(4.0)), course(None)];

        let summary = teacher_summary(TEACHER, &courses, &transactions);

        assert_eq!(summary.total_courses, 3);
        assert_eq!(summary.total_students, 1);
        assert_eq!(summary.total_earnings, 30.0);
        assert_eq!(summary.average_rating, 2.8);
    }

    #[test]
    fn teacher_without_courses_has_zero_rating() {
        let summary = teacher_summary(TEACHER, &[], &[]);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.total_earnings, 0.0);
    }
}
