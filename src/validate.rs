use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

// Exactly 10 digits, or '+' followed by exactly 12 digits.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$|^\+[0-9]{12}$").unwrap());

static STUDENT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,4}[0-9]{3,6}$").unwrap());

static COURSE_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3,4}\s?[0-9]{3}$").unwrap());

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

pub fn is_empty(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    !is_empty(email) && EMAIL_PATTERN.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    !is_empty(phone) && PHONE_PATTERN.is_match(phone.trim())
}

pub fn is_valid_student_id(student_id: &str) -> bool {
    !is_empty(student_id) && STUDENT_ID_PATTERN.is_match(student_id.trim())
}

pub fn is_valid_course_code(course_code: &str) -> bool {
    !is_empty(course_code) && COURSE_CODE_PATTERN.is_match(course_code.trim())
}

pub fn is_valid_name(name: &str) -> bool {
    !is_empty(name) && NAME_PATTERN.is_match(name.trim())
}

pub fn is_valid_score(score: f64) -> bool {
    (0.0..=100.0).contains(&score)
}

pub fn is_valid_credits(credits: i64) -> bool {
    (1..=10).contains(&credits)
}

pub fn is_valid_year_of_study(year: i64) -> bool {
    (1..=6).contains(&year)
}
