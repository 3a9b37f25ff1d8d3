//! Form domain layer
//!
//! Typed fields, pure validators, the form tree and the fixed customer
//! sign-up form built on top of them.

mod error;
mod field;
mod form_state;
mod messages;
mod tree;
mod validators;

pub use error::FormError;
pub use field::{FieldValue, FormField};
pub use form_state::{paths, CustomerForm, PhoneRequirement, NOTIFY_BY_TEXT};
pub use messages::email_message;
pub use tree::{FieldPath, FormGroup, FormList, FormNode, PatchPolicy};
pub use validators::{
    email_matcher, max_length, min_length, pattern, rating_range, required, ErrorKind,
    GroupValidator, ValidationError, ValidationErrors, Validator,
};
