//! Validator functions and the error kinds they produce
//!
//! Every validator is a pure function of the current value (or, for group
//! validators, of a read-only view of the whole group). Failures are data:
//! they are collected into a node's [`ValidationErrors`], never raised.

use std::fmt;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::field::FieldValue;
use super::tree::{FieldPath, FormGroup};

/// Tag identifying which validator failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Range,
    Match,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::MinLength => "minlength",
            ErrorKind::MaxLength => "maxlength",
            ErrorKind::Pattern => "pattern",
            ErrorKind::Range => "range",
            ErrorKind::Match => "match",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failing validator kinds of one node, in the order they were recorded.
///
/// Serializes as `{"required": true, "pattern": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ErrorKind>);

impl ValidationErrors {
    /// Record a failure; repeated kinds keep their first position
    pub fn insert(&mut self, kind: ErrorKind) {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` when nothing failed
    pub fn into_option(self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl FromIterator<ErrorKind> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ErrorKind>>(iter: I) -> Self {
        let mut errors = ValidationErrors::default();
        for kind in iter {
            errors.insert(kind);
        }
        errors
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for kind in &self.0 {
            map.serialize_entry(kind.as_str(), &true)?;
        }
        map.end()
    }
}

/// One failing validator located in the tree, for display and logging
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub path: FieldPath,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Validators attachable to a single field
#[derive(Debug, Clone)]
pub enum Validator {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    RatingRange { min: f64, max: f64 },
}

impl Validator {
    /// Build a pattern validator from a regular expression source
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Validator::Pattern)
    }

    pub fn validate(&self, value: &FieldValue) -> Option<ErrorKind> {
        match self {
            Validator::Required => required(value),
            Validator::MinLength(n) => min_length(*n, value),
            Validator::MaxLength(n) => max_length(*n, value),
            Validator::Pattern(re) => pattern(re, value),
            Validator::RatingRange { min, max } => rating_range(*min, *max, value),
        }
    }
}

/// Validators that look at a whole group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupValidator {
    EmailMatcher,
}

impl GroupValidator {
    pub fn validate(&self, group: &FormGroup) -> Option<ErrorKind> {
        match self {
            GroupValidator::EmailMatcher => email_matcher(group),
        }
    }
}

pub fn required(value: &FieldValue) -> Option<ErrorKind> {
    value.is_empty().then_some(ErrorKind::Required)
}

fn char_len(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::Text(s) if !s.is_empty() => Some(s.chars().count()),
        _ => None,
    }
}

/// Empty values pass; required-ness is a separate validator
pub fn min_length(min: usize, value: &FieldValue) -> Option<ErrorKind> {
    char_len(value)
        .filter(|len| *len < min)
        .map(|_| ErrorKind::MinLength)
}

pub fn max_length(max: usize, value: &FieldValue) -> Option<ErrorKind> {
    char_len(value)
        .filter(|len| *len > max)
        .map(|_| ErrorKind::MaxLength)
}

/// Unanchored: passes when the expression is found anywhere in the text
pub fn pattern(re: &Regex, value: &FieldValue) -> Option<ErrorKind> {
    if value.is_empty() {
        return None;
    }
    match value {
        FieldValue::Text(s) if re.is_match(s) => None,
        FieldValue::Number(n) if re.is_match(&n.to_string()) => None,
        _ => Some(ErrorKind::Pattern),
    }
}

/// An absent rating is not flagged here; NaN and non-numeric input are
pub fn rating_range(min: f64, max: f64, value: &FieldValue) -> Option<ErrorKind> {
    if value.is_empty() {
        return None;
    }
    match value.as_number() {
        Some(n) if !n.is_nan() && n >= min && n <= max => None,
        _ => Some(ErrorKind::Range),
    }
}

/// Compares `email` and `confirmEmail` once the user has edited both
pub fn email_matcher(group: &FormGroup) -> Option<ErrorKind> {
    let (email, confirm) = match (group.field("email"), group.field("confirmEmail")) {
        (Some(email), Some(confirm)) => (email, confirm),
        _ => return None,
    };

    if email.is_pristine() || confirm.is_pristine() {
        return None;
    }

    if email.value() == confirm.value() {
        None
    } else {
        Some(ErrorKind::Match)
    }
}
