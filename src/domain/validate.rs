//! Field constraint checks shared by the write paths.
//!
//! Violations are collected rather than short-circuited so a 400
//! response can report every failing field at once. Field labels use
//! the wire names, since violations are serialized into the response
//! body verbatim.

use serde::Serialize;

const NAME_MAX_CHARS: usize = 255;
const TITLE_MAX_CHARS: usize = 255;
const COVER_TEXT_MAX_CHARS: usize = 2000;

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn check_author(first_name: &str, last_name: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_required(&mut violations, "firstName", first_name, NAME_MAX_CHARS);
    check_required(&mut violations, "lastName", last_name, NAME_MAX_CHARS);
    violations
}

pub fn check_book(title: &str, cover_text: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_required(&mut violations, "title", title, TITLE_MAX_CHARS);
    if cover_text.chars().count() > COVER_TEXT_MAX_CHARS {
        violations.push(Violation::new(
            "coverText",
            format!("must be at most {COVER_TEXT_MAX_CHARS} characters"),
        ));
    }
    violations
}

fn check_required(
    violations: &mut Vec<Violation>,
    field: &'static str,
    value: &str,
    max_chars: usize,
) {
    if value.trim().is_empty() {
        violations.push(Violation::new(field, "must not be blank"));
    } else if value.chars().count() > max_chars {
        violations.push(Violation::new(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
}
