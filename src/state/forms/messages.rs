//! Human-readable validation messages

use super::field::FormField;
use super::validators::ErrorKind;

/// Display text for the email field's error kinds
const EMAIL_MESSAGES: &[(ErrorKind, &str)] = &[
    (ErrorKind::Required, "Please enter your email address."),
    (ErrorKind::Pattern, "Please enter a valid email address"),
];

fn email_text(kind: ErrorKind) -> Option<&'static str> {
    EMAIL_MESSAGES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, text)| *text)
}

/// Message shown under the email input.
///
/// Empty until the user has interacted with the field; kinds without a
/// message contribute nothing.
pub fn email_message(field: &FormField) -> String {
    if !(field.is_touched() || field.is_dirty()) {
        return String::new();
    }
    let Some(errors) = field.errors() else {
        return String::new();
    };
    errors
        .iter()
        .filter_map(email_text)
        .collect::<Vec<_>>()
        .join(" ")
}
