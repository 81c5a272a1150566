use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rules::LetterGrade;

/// Candidate lists surfaced to the presentation layer. The store itself
/// accepts any department or semester string.
pub const DEPARTMENTS: &[&str] = &[
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Business Administration",
    "Economics",
    "Education",
    "Engineering",
    "Medicine",
];

pub const SEMESTERS: &[&str] = &[
    "Semester 1 - 2024/2025",
    "Semester 2 - 2024/2025",
    "Semester 1 - 2023/2024",
    "Semester 2 - 2023/2024",
];

/// Anything that can render a human-readable detail block about itself.
pub trait Describable {
    fn details(&self) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub student_id: String,
    pub department: String,
    pub year_of_study: i64,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        student_id: impl Into<String>,
        department: impl Into<String>,
        year_of_study: i64,
    ) -> Self {
        Student {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            student_id: student_id.into(),
            department: department.into(),
            year_of_study,
            enrolled_courses: Vec::new(),
            updated_at: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now().to_rfc3339());
    }

    /// Course codes are unique per student; re-enrolling is a no-op.
    pub fn enroll(&mut self, course_code: &str) -> bool {
        if self.enrolled_courses.iter().any(|c| c == course_code) {
            return false;
        }
        self.enrolled_courses.push(course_code.to_string());
        true
    }
}

impl Describable for Student {
    fn details(&self) -> String {
        let mut out = String::new();
        out.push_str("=== STUDENT DETAILS ===\n");
        out.push_str(&format!("Student ID: {}\n", self.student_id));
        out.push_str(&format!("Name: {}\n", self.name));
        out.push_str(&format!("Email: {}\n", self.email));
        out.push_str(&format!("Phone: {}\n", self.phone));
        out.push_str(&format!("Department: {}\n", self.department));
        out.push_str(&format!("Year of Study: {}\n", self.year_of_study));
        out.push_str(&format!(
            "Enrolled Courses: {}\n",
            self.enrolled_courses.len()
        ));
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_code: String,
    pub name: String,
    pub credits: i64,
    pub instructor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Describable for Course {
    fn details(&self) -> String {
        format!(
            "{} - {} ({} credits)\nInstructor: {}",
            self.course_code, self.name, self.credits, self.instructor
        )
    }
}

/// Join of one student and one course. At most one live grade exists per
/// (student_id, course_code) pair; the store enforces that on save.
///
/// Score, letter and points stay consistent by construction: the derived
/// fields are private and recomputed on every score mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub student_id: String,
    pub course_code: String,
    score: f64,
    letter_grade: LetterGrade,
    grade_point: f64,
    pub semester: String,
}

impl Grade {
    /// Callers validate the score range before constructing.
    pub fn new(
        student_id: impl Into<String>,
        course_code: impl Into<String>,
        score: f64,
        semester: impl Into<String>,
    ) -> Self {
        let letter = LetterGrade::from_score(score);
        Grade {
            student_id: student_id.into(),
            course_code: course_code.into(),
            score,
            letter_grade: letter,
            grade_point: letter.points(),
            semester: semester.into(),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    #[allow(dead_code)]
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
        self.letter_grade = LetterGrade::from_score(score);
        self.grade_point = self.letter_grade.points();
    }

    pub fn letter_grade(&self) -> LetterGrade {
        self.letter_grade
    }

    pub fn grade_point(&self) -> f64 {
        self.grade_point
    }

    pub fn is_for(&self, student_id: &str, course_code: &str) -> bool {
        self.student_id == student_id && self.course_code == course_code
    }
}
