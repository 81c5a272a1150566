use anyhow::Context;
use chrono::Local;
use serde::Serialize;
use std::path::Path;

use crate::model::Describable;
use crate::rules::{self, ClassStanding, GradeStatistics, GradedUnit};
use crate::store::{Store, StoreError};

/// Full plain-text transcript for one student: detail block, course table,
/// CGPA, class standing and the grade statistics summary.
pub fn student_transcript(store: &Store, student_id: &str) -> Result<String, StoreError> {
    let student = store
        .find_student(student_id)
        .ok_or_else(|| StoreError::new("not_found", "student not found"))?;

    let cgpa = store.cgpa_for(student_id);
    let mut out = String::new();
    out.push_str(&format!(
        "Generated: {}\n\n",
        Local::now().format("%Y-%m-%d")
    ));
    out.push_str(&student.details());
    out.push_str(&format!("Current GPA: {:.2}\n", cgpa));
    out.push('\n');

    let grades = store.grades_by_student(student_id);
    if grades.is_empty() {
        out.push_str("No grades recorded.\n");
    } else {
        out.push_str("=== COURSES AND GRADES ===\n");
        out.push_str("Course Code\tCourse Name\t\tScore\tGrade\tPoints\tSemester\n");
        out.push_str(
            "------------------------------------------------------------------------\n",
        );
        for grade in &grades {
            // Courses can disappear after a cascade; keep the row readable.
            let course_name = store
                .find_course(&grade.course_code)
                .map(|c| c.name.as_str())
                .unwrap_or("(course removed)");
            out.push_str(&format!(
                "{:<12}\t{:<20}\t{:.1}\t{}\t{:.1}\t{}\n",
                grade.course_code,
                course_name,
                grade.score(),
                grade.letter_grade().as_str(),
                grade.grade_point(),
                grade.semester
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("Cumulative GPA (CGPA): {:.2}\n", cgpa));
    out.push_str(&format!(
        "Class Standing: {}\n",
        ClassStanding::from_gpa(cgpa).as_str()
    ));

    let stats = GradeStatistics::compute(&store.graded_units_for(student_id));
    out.push('\n');
    out.push_str(&stats.summary());

    Ok(out)
}

/// Writes the finished transcript verbatim to a caller-chosen path.
pub fn export_transcript(store: &Store, student_id: &str, path: &Path) -> Result<(), StoreError> {
    let report = student_transcript(store, student_id)?;
    std::fs::write(path, report)
        .with_context(|| format!("failed to write transcript to {}", path.display()))
        .map_err(|e| StoreError::new("persist_failed", format!("{e:#}")))
}

pub fn statistics_for_student(
    store: &Store,
    student_id: &str,
) -> Result<GradeStatistics, StoreError> {
    if store.find_student(student_id).is_none() {
        return Err(StoreError::new("not_found", "student not found"));
    }
    Ok(GradeStatistics::compute(
        &store.graded_units_for(student_id),
    ))
}

pub fn statistics_for_course(
    store: &Store,
    course_code: &str,
) -> Result<GradeStatistics, StoreError> {
    let Some(course) = store.find_course(course_code) else {
        return Err(StoreError::new("not_found", "course not found"));
    };
    let units: Vec<GradedUnit> = store
        .grades_by_course(course_code)
        .into_iter()
        .map(|g| GradedUnit {
            score: g.score(),
            letter: g.letter_grade(),
            credits: course.credits,
        })
        .collect();
    Ok(GradeStatistics::compute(&units))
}

pub fn statistics_overall(store: &Store) -> GradeStatistics {
    let units: Vec<GradedUnit> = store
        .grades()
        .iter()
        .filter_map(|g| {
            store.find_course(&g.course_code).map(|c| GradedUnit {
                score: g.score(),
                letter: g.letter_grade(),
                credits: c.credits,
            })
        })
        .collect();
    GradeStatistics::compute(&units)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HonorRollEntry {
    pub student_id: String,
    pub name: String,
    pub cgpa: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub total_courses: usize,
    pub total_grades: usize,
    pub average_gpa: f64,
    pub honor_roll: Vec<HonorRollEntry>,
}

/// Aggregate view over the whole store. Average GPA counts only students
/// with at least one grade; the honor roll is every student at CGPA >= 3.5.
pub fn dashboard_summary(store: &Store) -> DashboardSummary {
    let mut total_gpa = 0.0_f64;
    let mut graded_students = 0_usize;
    let mut honor_roll = Vec::new();

    for student in store.students() {
        if store.grades_by_student(&student.student_id).is_empty() {
            continue;
        }
        let cgpa = store.cgpa_for(&student.student_id);
        total_gpa += cgpa;
        graded_students += 1;
        if rules::is_honor_roll(cgpa) {
            honor_roll.push(HonorRollEntry {
                student_id: student.student_id.clone(),
                name: student.name.clone(),
                cgpa,
            });
        }
    }

    DashboardSummary {
        total_students: store.students().len(),
        total_courses: store.courses().len(),
        total_grades: store.grades().len(),
        average_gpa: if graded_students > 0 {
            total_gpa / graded_students as f64
        } else {
            0.0
        },
        honor_roll,
    }
}
