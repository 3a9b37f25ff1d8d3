//! Structural form errors

use thiserror::Error;

use super::tree::FieldPath;

/// Failures raised to callers that mutate the tree.
///
/// Validation failures are not errors in this sense; they live in each
/// node's `errors`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("no form field at `{path}`")]
    UnknownField { path: FieldPath },

    #[error("missing value for form field `{path}`")]
    MissingField { path: FieldPath },

    #[error("value for `{path}` does not fit the form shape")]
    InvalidValue { path: FieldPath },
}

impl FormError {
    pub fn path(&self) -> &FieldPath {
        match self {
            FormError::UnknownField { path }
            | FormError::MissingField { path }
            | FormError::InvalidValue { path } => path,
        }
    }
}
