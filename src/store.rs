use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::model::{Course, Grade, Student};
use crate::rules::{self, GradedUnit};

pub const STUDENTS_FILE: &str = "students.json";
pub const COURSES_FILE: &str = "courses.json";
pub const GRADES_FILE: &str = "grades.json";

#[derive(Debug, Clone, Serialize)]
pub struct StoreError {
    pub code: String,
    pub message: String,
}

impl StoreError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        StoreError {
            code: code.to_string(),
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        StoreError::new("not_found", format!("{} not found", what))
    }

    fn persist(e: anyhow::Error) -> Self {
        StoreError::new("persist_failed", format!("{e:#}"))
    }
}

/// Three process-local collections with whole-file persistence. Every
/// mutating call rewrites the affected collection file; there is no
/// locking and no partial write protocol.
pub struct Store {
    data_dir: PathBuf,
    students: Vec<Student>,
    courses: Vec<Course>,
    grades: Vec<Grade>,
    load_warnings: Vec<String>,
}

impl Store {
    /// Missing collection files read as empty. A malformed file leaves its
    /// collection empty and is reported through `load_warnings` instead of
    /// failing the open.
    pub fn open(data_dir: &Path) -> anyhow::Result<Store> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let mut warnings = Vec::new();
        let students = load_collection(&data_dir.join(STUDENTS_FILE), "students", &mut warnings);
        let courses = load_collection(&data_dir.join(COURSES_FILE), "courses", &mut warnings);
        let grades = load_collection(&data_dir.join(GRADES_FILE), "grades", &mut warnings);

        Ok(Store {
            data_dir: data_dir.to_path_buf(),
            students,
            courses,
            grades,
            load_warnings: warnings,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn find_student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.student_id == student_id)
    }

    /// Upsert by student id: silently becomes an update when the key exists.
    pub fn save_student(&mut self, student: Student) -> Result<(), StoreError> {
        if self.find_student(&student.student_id).is_some() {
            return self.update_student(student);
        }
        self.students.push(student);
        self.persist_students()
    }

    pub fn update_student(&mut self, mut student: Student) -> Result<(), StoreError> {
        let Some(idx) = self
            .students
            .iter()
            .position(|s| s.student_id == student.student_id)
        else {
            return Err(StoreError::not_found("student"));
        };
        student.touch();
        self.students[idx] = student;
        self.persist_students()
    }

    /// Removes the student and every grade referencing it.
    pub fn delete_student(&mut self, student_id: &str) -> Result<(), StoreError> {
        let before = self.students.len();
        self.students.retain(|s| s.student_id != student_id);
        if self.students.len() == before {
            return Err(StoreError::not_found("student"));
        }
        self.grades.retain(|g| g.student_id != student_id);
        self.persist_grades()?;
        self.persist_students()
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn find_course(&self, course_code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_code == course_code)
    }

    /// Upsert by course code, same merged semantics as `save_student`.
    pub fn save_course(&mut self, course: Course) -> Result<(), StoreError> {
        if self.find_course(&course.course_code).is_some() {
            return self.update_course(course);
        }
        self.courses.push(course);
        self.persist_courses()
    }

    pub fn update_course(&mut self, course: Course) -> Result<(), StoreError> {
        let Some(idx) = self
            .courses
            .iter()
            .position(|c| c.course_code == course.course_code)
        else {
            return Err(StoreError::not_found("course"));
        };
        self.courses[idx] = course;
        self.persist_courses()
    }

    /// Removes the course and every grade referencing it.
    pub fn delete_course(&mut self, course_code: &str) -> Result<(), StoreError> {
        let before = self.courses.len();
        self.courses.retain(|c| c.course_code != course_code);
        if self.courses.len() == before {
            return Err(StoreError::not_found("course"));
        }
        self.grades.retain(|g| g.course_code != course_code);
        self.persist_grades()?;
        self.persist_courses()
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    /// Replaces any existing grade for the same (student, course) pair, so
    /// the collection holds at most one grade per pair. The global list is
    /// the single source of truth; per-student views are queries.
    pub fn save_grade(&mut self, grade: Grade) -> Result<(), StoreError> {
        if self.find_student(&grade.student_id).is_none() {
            return Err(StoreError::not_found("student"));
        }
        if self.find_course(&grade.course_code).is_none() {
            return Err(StoreError::not_found("course"));
        }
        self.grades
            .retain(|g| !g.is_for(&grade.student_id, &grade.course_code));
        self.grades.push(grade);
        self.persist_grades()
    }

    pub fn delete_grade(&mut self, student_id: &str, course_code: &str) -> Result<(), StoreError> {
        let before = self.grades.len();
        self.grades.retain(|g| !g.is_for(student_id, course_code));
        if self.grades.len() == before {
            return Err(StoreError::not_found("grade"));
        }
        self.persist_grades()
    }

    pub fn grades_by_student(&self, student_id: &str) -> Vec<&Grade> {
        self.grades
            .iter()
            .filter(|g| g.student_id == student_id)
            .collect()
    }

    pub fn grades_by_course(&self, course_code: &str) -> Vec<&Grade> {
        self.grades
            .iter()
            .filter(|g| g.course_code == course_code)
            .collect()
    }

    /// Returns false when the student was already enrolled.
    pub fn enroll(&mut self, student_id: &str, course_code: &str) -> Result<bool, StoreError> {
        if self.find_course(course_code).is_none() {
            return Err(StoreError::not_found("course"));
        }
        let Some(student) = self.students.iter_mut().find(|s| s.student_id == student_id) else {
            return Err(StoreError::not_found("student"));
        };
        let added = student.enroll(course_code);
        if added {
            student.touch();
            self.persist_students()?;
        }
        Ok(added)
    }

    /// Joins a student's grades to their courses. Grades whose course has
    /// since been removed are skipped.
    pub fn graded_units_for(&self, student_id: &str) -> Vec<GradedUnit> {
        self.grades
            .iter()
            .filter(|g| g.student_id == student_id)
            .filter_map(|g| {
                self.find_course(&g.course_code).map(|c| GradedUnit {
                    score: g.score(),
                    letter: g.letter_grade(),
                    credits: c.credits,
                })
            })
            .collect()
    }

    pub fn cgpa_for(&self, student_id: &str) -> f64 {
        rules::gpa(self.graded_units_for(student_id))
    }

    /// Full flush of all three collections. Attempts every file even when an
    /// earlier one fails; the first error is reported.
    pub fn save_all(&self) -> Result<(), StoreError> {
        let mut first_err = None;
        for res in [
            self.persist_students(),
            self.persist_courses(),
            self.persist_grades(),
        ] {
            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.students.clear();
        self.courses.clear();
        self.grades.clear();
        self.save_all()
    }

    fn persist_students(&self) -> Result<(), StoreError> {
        write_collection(&self.data_dir.join(STUDENTS_FILE), &self.students)
            .map_err(StoreError::persist)
    }

    fn persist_courses(&self) -> Result<(), StoreError> {
        write_collection(&self.data_dir.join(COURSES_FILE), &self.courses)
            .map_err(StoreError::persist)
    }

    fn persist_grades(&self) -> Result<(), StoreError> {
        write_collection(&self.data_dir.join(GRADES_FILE), &self.grades)
            .map_err(StoreError::persist)
    }
}

fn load_collection<T: DeserializeOwned>(
    path: &Path,
    label: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            warnings.push(format!("failed to read {} file: {}", label, e));
            return Vec::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            warnings.push(format!("failed to parse {} file: {}", label, e));
            Vec::new()
        }
    }
}

fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(items)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_store(prefix: &str) -> Store {
        let dir = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        Store::open(&dir).expect("open store")
    }

    fn student(student_id: &str) -> Student {
        Student::new(
            "Jane Doe",
            "jane@chuka.ac.ke",
            "0712345678",
            student_id,
            "Computer Science",
            2,
        )
    }

    fn course(code: &str, credits: i64) -> Course {
        Course {
            course_code: code.to_string(),
            name: "Object Oriented Programming".to_string(),
            credits,
            instructor: "Dr Mwangi".to_string(),
            description: None,
        }
    }

    #[test]
    fn save_student_upserts_by_key() {
        let mut store = temp_store("gradebook-store-upsert");
        store.save_student(student("CS1234")).expect("save");
        let mut replacement = student("CS1234");
        replacement.name = "Janet Doe".to_string();
        store.save_student(replacement).expect("upsert");

        assert_eq!(store.students().len(), 1);
        assert_eq!(store.find_student("CS1234").expect("find").name, "Janet Doe");
    }

    #[test]
    fn update_missing_student_reports_not_found() {
        let mut store = temp_store("gradebook-store-update-missing");
        let err = store.update_student(student("CS9999")).unwrap_err();
        assert_eq!(err.code, "not_found");
        assert!(store.students().is_empty());
    }

    #[test]
    fn save_grade_replaces_existing_pair() {
        let mut store = temp_store("gradebook-store-grade-pair");
        store.save_student(student("CS1234")).expect("save student");
        store.save_course(course("ACSC 223", 4)).expect("save course");

        store
            .save_grade(Grade::new("CS1234", "ACSC 223", 55.0, "Semester 1 - 2024/2025"))
            .expect("first grade");
        store
            .save_grade(Grade::new("CS1234", "ACSC 223", 82.0, "Semester 1 - 2024/2025"))
            .expect("replacement grade");

        let grades = store.grades_by_student("CS1234");
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].score(), 82.0);
    }

    #[test]
    fn save_grade_requires_both_entities() {
        let mut store = temp_store("gradebook-store-grade-refs");
        store.save_student(student("CS1234")).expect("save student");
        let err = store
            .save_grade(Grade::new("CS1234", "ACSC 223", 55.0, "Semester 1 - 2024/2025"))
            .unwrap_err();
        assert_eq!(err.code, "not_found");
        assert!(store.grades().is_empty());
    }

    #[test]
    fn deleting_student_cascades_to_grades() {
        let mut store = temp_store("gradebook-store-cascade");
        store.save_student(student("CS1234")).expect("save student");
        store.save_course(course("ACSC 223", 4)).expect("save course");
        store
            .save_grade(Grade::new("CS1234", "ACSC 223", 71.0, "Semester 1 - 2024/2025"))
            .expect("save grade");

        store.delete_student("CS1234").expect("delete");
        assert!(store.grades_by_student("CS1234").is_empty());
        assert!(store.grades().is_empty());
    }

    #[test]
    fn deleting_course_cascades_to_grades() {
        let mut store = temp_store("gradebook-store-course-cascade");
        store.save_student(student("CS1234")).expect("save student");
        store.save_course(course("ACSC 223", 4)).expect("save course");
        store
            .save_grade(Grade::new("CS1234", "ACSC 223", 71.0, "Semester 1 - 2024/2025"))
            .expect("save grade");

        store.delete_course("ACSC 223").expect("delete");
        assert!(store.grades_by_course("ACSC 223").is_empty());
        assert!(store.find_student("CS1234").is_some());
    }

    #[test]
    fn collections_round_trip_across_reopen() {
        let dir = std::env::temp_dir().join(format!(
            "gradebook-store-roundtrip-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        {
            let mut store = Store::open(&dir).expect("open");
            store.save_student(student("CS1234")).expect("save student");
            store.save_course(course("ACSC 223", 4)).expect("save course");
            store
                .save_grade(Grade::new("CS1234", "ACSC 223", 64.5, "Semester 2 - 2024/2025"))
                .expect("save grade");
        }

        let store = Store::open(&dir).expect("reopen");
        assert!(store.load_warnings().is_empty());
        let s = store.find_student("CS1234").expect("student survives");
        assert_eq!(s.name, "Jane Doe");
        let g = store.grades_by_student("CS1234");
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].score(), 64.5);
        assert_eq!(g[0].grade_point(), 3.0);
        assert_eq!(g[0].semester, "Semester 2 - 2024/2025");
    }

    #[test]
    fn malformed_collection_file_warns_and_loads_empty() {
        let dir = std::env::temp_dir().join(format!(
            "gradebook-store-malformed-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(STUDENTS_FILE), "not json").expect("write garbage");

        let store = Store::open(&dir).expect("open despite garbage");
        assert!(store.students().is_empty());
        assert_eq!(store.load_warnings().len(), 1);
        assert!(store.load_warnings()[0].contains("students"));
    }

    #[test]
    fn cgpa_joins_grades_to_course_credits() {
        let mut store = temp_store("gradebook-store-cgpa");
        store.save_student(student("CS1234")).expect("save student");
        store.save_course(course("ACSC 223", 4)).expect("save c1");
        store.save_course(course("MAT 101", 2)).expect("save c2");
        store
            .save_grade(Grade::new("CS1234", "ACSC 223", 85.0, "Semester 1 - 2024/2025"))
            .expect("grade a");
        store
            .save_grade(Grade::new("CS1234", "MAT 101", 55.0, "Semester 1 - 2024/2025"))
            .expect("grade c");

        // (4.0*4 + 2.0*2) / 6 credit-weighted
        assert!((store.cgpa_for("CS1234") - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn enroll_is_idempotent_per_course() {
        let mut store = temp_store("gradebook-store-enroll");
        store.save_student(student("CS1234")).expect("save student");
        store.save_course(course("ACSC 223", 4)).expect("save course");

        assert!(store.enroll("CS1234", "ACSC 223").expect("enroll"));
        assert!(!store.enroll("CS1234", "ACSC 223").expect("re-enroll"));
        assert_eq!(
            store.find_student("CS1234").expect("find").enrolled_courses,
            vec!["ACSC 223".to_string()]
        );
    }
}
