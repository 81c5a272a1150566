use serde::{Deserialize, Serialize};

pub const HONOR_ROLL_MIN: f64 = 3.5;

/// Categorical label for a GPA value. Thresholds are fixed constants.
/// Serializes as its display label ("First Class", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassStanding {
    FirstClass,
    SecondClassUpper,
    SecondClassLower,
    Pass,
    Fail,
}

impl ClassStanding {
    pub fn from_gpa(gpa: f64) -> Self {
        if gpa >= 3.5 {
            ClassStanding::FirstClass
        } else if gpa >= 3.0 {
            ClassStanding::SecondClassUpper
        } else if gpa >= 2.5 {
            ClassStanding::SecondClassLower
        } else if gpa >= 2.0 {
            ClassStanding::Pass
        } else {
            ClassStanding::Fail
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassStanding::FirstClass => "First Class",
            ClassStanding::SecondClassUpper => "Second Class Upper",
            ClassStanding::SecondClassLower => "Second Class Lower",
            ClassStanding::Pass => "Pass",
            ClassStanding::Fail => "Fail",
        }
    }
}

impl Serialize for ClassStanding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Letter bucket for a raw score. Bands are inclusive at their lower edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            LetterGrade::A
        } else if score >= 60.0 {
            LetterGrade::B
        } else if score >= 50.0 {
            LetterGrade::C
        } else if score >= 40.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }

    /// Unrecognized input maps to F (0.0 points); no error is raised.
    #[allow(dead_code)]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => LetterGrade::A,
            "B" => LetterGrade::B,
            "C" => LetterGrade::C,
            "D" => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }

    pub fn points(self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::B => 3.0,
            LetterGrade::C => 2.0,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

/// One graded course as the aggregations see it: the raw score, its letter
/// bucket, and the credit weight of the course it was earned in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradedUnit {
    pub score: f64,
    pub letter: LetterGrade,
    pub credits: i64,
}

/// Credit-weighted grade-point average. Empty input and zero total credits
/// both come back as 0.0.
pub fn gpa<I>(units: I) -> f64
where
    I: IntoIterator<Item = GradedUnit>,
{
    let mut points = 0.0_f64;
    let mut credits = 0_i64;
    for u in units {
        points += u.letter.points() * u.credits as f64;
        credits += u.credits;
    }
    if credits > 0 {
        points / credits as f64
    } else {
        0.0
    }
}

pub fn total_credits<I>(units: I) -> i64
where
    I: IntoIterator<Item = GradedUnit>,
{
    units.into_iter().map(|u| u.credits).sum()
}

pub fn is_honor_roll(cgpa: f64) -> bool {
    cgpa >= HONOR_ROLL_MIN
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStatistics {
    pub count_a: usize,
    pub count_b: usize,
    pub count_c: usize,
    pub count_d: usize,
    pub count_f: usize,
    pub total_courses: usize,
    pub average_score: f64,
    pub gpa: f64,
    pub class_standing: ClassStanding,
}

impl GradeStatistics {
    pub fn compute(units: &[GradedUnit]) -> Self {
        let mut count_a = 0;
        let mut count_b = 0;
        let mut count_c = 0;
        let mut count_d = 0;
        let mut count_f = 0;
        let mut total_score = 0.0_f64;
        for u in units {
            total_score += u.score;
            match u.letter {
                LetterGrade::A => count_a += 1,
                LetterGrade::B => count_b += 1,
                LetterGrade::C => count_c += 1,
                LetterGrade::D => count_d += 1,
                LetterGrade::F => count_f += 1,
            }
        }
        let average_score = if units.is_empty() {
            0.0
        } else {
            total_score / units.len() as f64
        };
        let gpa = gpa(units.iter().copied());
        GradeStatistics {
            count_a,
            count_b,
            count_c,
            count_d,
            count_f,
            total_courses: units.len(),
            average_score,
            gpa,
            class_standing: ClassStanding::from_gpa(gpa),
        }
    }

    /// Plain-text block appended to transcripts.
    pub fn summary(&self) -> String {
        if self.total_courses == 0 {
            return "No grades available".to_string();
        }
        let mut out = String::new();
        out.push_str("=== GRADE STATISTICS ===\n");
        out.push_str(&format!("Total Courses: {}\n", self.total_courses));
        out.push_str(&format!("Average Score: {:.2}\n", self.average_score));
        out.push_str(&format!("GPA: {:.2}\n", self.gpa));
        out.push_str(&format!(
            "Class Standing: {}\n",
            self.class_standing.as_str()
        ));
        out.push_str("\nGrade Distribution:\n");
        out.push_str(&format!("A: {}\n", self.count_a));
        out.push_str(&format!("B: {}\n", self.count_b));
        out.push_str(&format!("C: {}\n", self.count_c));
        out.push_str(&format!("D: {}\n", self.count_d));
        out.push_str(&format!("F: {}\n", self.count_f));
        out
    }
}
