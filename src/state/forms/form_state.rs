//! Customer sign-up form state

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

use super::error::FormError;
use super::field::{FieldValue, FormField};
use super::messages;
use super::tree::{FieldPath, FormGroup, FormList, PatchPolicy};
use super::validators::{GroupValidator, ValidationError, Validator};

/// Dotted paths of the fixed form shape
pub mod paths {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL_GROUP: &str = "emailGroup";
    pub const EMAIL: &str = "emailGroup.email";
    pub const CONFIRM_EMAIL: &str = "emailGroup.confirmEmail";
    pub const PHONE: &str = "phone";
    pub const NOTIFICATION: &str = "notificationMethod";
    pub const RATING: &str = "rating";
    pub const SEND_CATALOG: &str = "sendCatalog";
    pub const ADDRESSES: &str = "addresses";
}

/// Notification choice that makes the phone number mandatory
pub const NOTIFY_BY_TEXT: &str = "text";

const EMAIL_PATTERN: &str = "[a-z0-9._%+-]+@[a-z0-9.-]+";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// Validator set of the phone field, driven by the notification choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneRequirement {
    #[default]
    NoneRequired,
    Required,
}

impl PhoneRequirement {
    pub fn for_notification(method: &FieldValue) -> Self {
        if method.as_text() == Some(NOTIFY_BY_TEXT) {
            PhoneRequirement::Required
        } else {
            PhoneRequirement::NoneRequired
        }
    }

    pub fn validators(self) -> Vec<Validator> {
        match self {
            PhoneRequirement::NoneRequired => Vec::new(),
            PhoneRequirement::Required => vec![Validator::Required],
        }
    }
}

// Customer Form
#[derive(Debug, Clone)]
pub struct CustomerForm {
    root: FormGroup,
    phone_requirement: PhoneRequirement,
    patch_policy: PatchPolicy,
}

impl CustomerForm {
    pub fn new() -> Self {
        Self::with_patch_policy(PatchPolicy::default())
    }

    pub fn with_patch_policy(patch_policy: PatchPolicy) -> Self {
        let email_group = FormGroup::new(paths::EMAIL_GROUP)
            .with_field(FormField::with_validators(
                "email",
                FieldValue::text(""),
                vec![Validator::Required, Validator::Pattern(EMAIL_REGEX.clone())],
            ))
            .with_field(FormField::with_validators(
                "confirmEmail",
                FieldValue::text(""),
                vec![Validator::Required],
            ))
            .with_validator(GroupValidator::EmailMatcher);

        let mut root = FormGroup::new("customerForm")
            .with_field(FormField::with_validators(
                paths::FIRST_NAME,
                FieldValue::text(""),
                vec![Validator::Required, Validator::MinLength(3)],
            ))
            .with_field(FormField::with_validators(
                paths::LAST_NAME,
                FieldValue::text(""),
                vec![Validator::Required, Validator::MaxLength(50)],
            ))
            .with_group(email_group)
            .with_field(FormField::text(paths::PHONE))
            .with_field(FormField::new(paths::NOTIFICATION, FieldValue::text("email")))
            .with_field(FormField::with_validators(
                paths::RATING,
                FieldValue::Empty,
                vec![Validator::RatingRange { min: 1.0, max: 5.0 }],
            ))
            .with_field(FormField::new(paths::SEND_CATALOG, FieldValue::Bool(true)))
            .with_list(FormList::new(paths::ADDRESSES, Self::build_address_group, 1));
        root.update_validity();

        Self {
            root,
            phone_requirement: PhoneRequirement::default(),
            patch_policy,
        }
    }

    /// One address entry with default values and no validators
    pub fn build_address_group() -> FormGroup {
        FormGroup::new("address")
            .with_field(FormField::new("addressType", FieldValue::text("home")))
            .with_field(FormField::text("street1"))
            .with_field(FormField::text("street2"))
            .with_field(FormField::text("city"))
            .with_field(FormField::text("state"))
            .with_field(FormField::text("zip"))
    }

    pub fn root(&self) -> &FormGroup {
        &self.root
    }

    pub fn patch_policy(&self) -> PatchPolicy {
        self.patch_policy
    }

    pub fn field(&self, path: &str) -> Option<&FormField> {
        self.root.find_field(&FieldPath::parse(path))
    }

    pub fn email_group(&self) -> Option<&FormGroup> {
        self.root.find_group(&FieldPath::parse(paths::EMAIL_GROUP))
    }

    pub fn addresses(&self) -> &[FormGroup] {
        self.root
            .list(paths::ADDRESSES)
            .map(FormList::entries)
            .unwrap_or_default()
    }

    /// Append a fresh address entry
    pub fn add_address(&mut self) {
        match self.root.list_mut(paths::ADDRESSES) {
            Some(list) => {
                list.push();
                tracing::debug!(count = list.len(), "address added");
            }
            None => tracing::warn!("form has no address list"),
        }
        self.root.update_validity();
    }

    /// Update only the leaves named in `partial`. Nothing changes on error.
    pub fn patch_values(&mut self, partial: &Value) -> Result<Vec<FieldPath>, FormError> {
        let mut plan = Vec::new();
        self.root
            .plan_patch(partial, &FieldPath::root(), self.patch_policy, &mut plan)?;
        let changed = self.root.apply(plan);
        self.react_to(&changed);
        Ok(changed)
    }

    /// Replace every leaf value. Nothing changes on error.
    pub fn set_value(&mut self, full: &Value) -> Result<Vec<FieldPath>, FormError> {
        let mut plan = Vec::new();
        self.root.plan_replace(full, &FieldPath::root(), &mut plan)?;
        let changed = self.root.apply(plan);
        self.react_to(&changed);
        Ok(changed)
    }

    /// A value typed by the user: assigns it and marks the field dirty
    pub fn input(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError> {
        let field = self
            .root
            .find_field_mut(path)
            .ok_or_else(|| FormError::UnknownField { path: path.clone() })?;
        field.set_value(value);
        field.mark_dirty();
        self.root.update_validity();
        self.react_to(std::slice::from_ref(path));
        Ok(())
    }

    // A new notification choice swaps the phone validators in the same step
    fn react_to(&mut self, changed: &[FieldPath]) {
        if changed.iter().any(|path| path.matches(paths::NOTIFICATION)) {
            self.refresh_phone_requirement();
        }
    }

    fn refresh_phone_requirement(&mut self) {
        let method = self
            .field(paths::NOTIFICATION)
            .map(|f| f.value().clone())
            .unwrap_or_default();
        self.set_notification(&method);
    }

    /// Focus left the field
    pub fn touch(&mut self, path: &FieldPath) -> Result<(), FormError> {
        self.root
            .find_field_mut(path)
            .ok_or_else(|| FormError::UnknownField { path: path.clone() })?
            .mark_touched();
        Ok(())
    }

    /// Fill in the demo customer
    pub fn populate_test_data(&mut self) -> Result<Vec<FieldPath>, FormError> {
        self.patch_values(&json!({
            "firstName": "Jose",
            "lastName": "Ben",
            "sendCatalog": false,
        }))
    }

    /// Restore every initial value, the single default address and the
    /// phone requirement that matches the default notification choice
    pub fn reset(&mut self) {
        self.root.reset();
        self.refresh_phone_requirement();
    }

    pub fn phone_requirement(&self) -> PhoneRequirement {
        self.phone_requirement
    }

    /// Swap the phone validators for the given notification choice and
    /// recompute so errors reflect the new set
    pub fn set_notification(&mut self, method: &FieldValue) {
        let requirement = PhoneRequirement::for_notification(method);
        self.phone_requirement = requirement;
        if let Some(phone) = self.root.find_field_mut(&FieldPath::parse(paths::PHONE)) {
            phone.set_validators(requirement.validators());
        }
        self.root.update_validity();
        tracing::debug!(?requirement, "phone requirement updated");
    }

    /// Message for the email input, derived from its current errors
    pub fn email_message(&self) -> String {
        self.field(paths::EMAIL)
            .map(messages::email_message)
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Value {
        self.root.snapshot()
    }

    pub fn collect_errors(&self) -> Vec<ValidationError> {
        self.root.collect_errors()
    }

    pub fn is_valid(&self) -> bool {
        self.root.is_valid()
    }
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::validators::ErrorKind;

    fn dirty(form: &mut CustomerForm, path: &str, value: &str) {
        form.input(&FieldPath::parse(path), FieldValue::text(value)).unwrap();
    }

    mod construction {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_default_snapshot() {
            let form = CustomerForm::new();
            assert_eq!(
                form.snapshot(),
                json!({
                    "firstName": "",
                    "lastName": "",
                    "emailGroup": {"email": "", "confirmEmail": ""},
                    "phone": "",
                    "notificationMethod": "email",
                    "rating": null,
                    "sendCatalog": true,
                    "addresses": [{
                        "addressType": "home",
                        "street1": "",
                        "street2": "",
                        "city": "",
                        "state": "",
                        "zip": ""
                    }]
                })
            );
        }

        #[test]
        fn test_default_equals_new() {
            let form = CustomerForm::default();
            assert_eq!(form.snapshot(), CustomerForm::new().snapshot());
            assert_eq!(form.patch_policy(), PatchPolicy::Strict);
        }

        #[test]
        fn test_default_form_is_invalid_on_required_fields() {
            let form = CustomerForm::new();
            assert!(!form.is_valid());
            let failing: Vec<String> = form
                .collect_errors()
                .iter()
                .map(ToString::to_string)
                .collect();
            assert_eq!(
                failing,
                vec![
                    "firstName: required",
                    "lastName: required",
                    "emailGroup.email: required",
                    "emailGroup.confirmEmail: required",
                ]
            );
        }

        #[test]
        fn test_phone_starts_without_validators() {
            let form = CustomerForm::new();
            assert_eq!(form.phone_requirement(), PhoneRequirement::NoneRequired);
            assert!(form.field(paths::PHONE).unwrap().validators().is_empty());
        }

        #[test]
        fn test_empty_rating_is_not_flagged() {
            let form = CustomerForm::new();
            assert!(form.field(paths::RATING).unwrap().is_valid());
        }
    }

    mod addresses {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_add_address_twice() {
            let mut form = CustomerForm::new();
            let initial = form.addresses().len();
            form.add_address();
            form.add_address();
            assert_eq!(form.addresses().len(), initial + 2);
            for entry in form.addresses() {
                assert!(entry.is_valid());
                assert_eq!(entry.snapshot(), CustomerForm::build_address_group().snapshot());
            }
        }

        #[test]
        fn test_add_address_preserves_existing_entries() {
            let mut form = CustomerForm::new();
            form.patch_values(&json!({"addresses": [{"city": "Lyon"}]})).unwrap();
            form.add_address();
            assert_eq!(form.snapshot()["addresses"][0]["city"], json!("Lyon"));
            assert_eq!(form.snapshot()["addresses"][1]["city"], json!(""));
        }

        #[test]
        fn test_entries_are_independent() {
            let mut form = CustomerForm::new();
            form.add_address();
            dirty(&mut form, "addresses.1.zip", "75001");
            assert_eq!(form.field("addresses.0.zip").unwrap().value(), &FieldValue::text(""));
            assert!(form.field("addresses.1.zip").unwrap().is_dirty());
        }
    }

    mod patching {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_patch_updates_exactly_named_fields() {
            let mut form = CustomerForm::new();
            dirty(&mut form, paths::EMAIL, "a@b.com");
            dirty(&mut form, paths::PHONE, "555-0100");
            let before = form.snapshot();

            let changed = form
                .patch_values(&json!({"firstName": "Jose", "lastName": "Ben", "sendCatalog": false}))
                .unwrap();

            assert_eq!(
                changed,
                vec![
                    FieldPath::parse(paths::FIRST_NAME),
                    FieldPath::parse(paths::LAST_NAME),
                    FieldPath::parse(paths::SEND_CATALOG),
                ]
            );
            let mut expected = before;
            expected["firstName"] = json!("Jose");
            expected["lastName"] = json!("Ben");
            expected["sendCatalog"] = json!(false);
            assert_eq!(form.snapshot(), expected);
        }

        #[test]
        fn test_populate_test_data() {
            let mut form = CustomerForm::new();
            form.populate_test_data().unwrap();
            let snapshot = form.snapshot();
            assert_eq!(snapshot["firstName"], json!("Jose"));
            assert_eq!(snapshot["lastName"], json!("Ben"));
            assert_eq!(snapshot["sendCatalog"], json!(false));
            assert!(form.field(paths::FIRST_NAME).unwrap().is_valid());
            // programmatic values never mark fields dirty
            assert!(form.field(paths::FIRST_NAME).unwrap().is_pristine());
        }

        #[test]
        fn test_strict_patch_is_all_or_nothing() {
            let mut form = CustomerForm::new();
            let before = form.snapshot();
            let err = form
                .patch_values(&json!({"firstName": "Jose", "nickname": "J"}))
                .unwrap_err();
            assert_eq!(err, FormError::UnknownField { path: "nickname".into() });
            assert_eq!(form.snapshot(), before);
        }

        #[test]
        fn test_lenient_patch_ignores_unknown() {
            let mut form = CustomerForm::with_patch_policy(PatchPolicy::Lenient);
            let changed = form
                .patch_values(&json!({"firstName": "Jose", "nickname": "J"}))
                .unwrap();
            assert_eq!(changed, vec![FieldPath::parse(paths::FIRST_NAME)]);
            assert_eq!(form.snapshot()["firstName"], json!("Jose"));
        }

        #[test]
        fn test_set_value_requires_every_field() {
            let mut form = CustomerForm::new();
            let before = form.snapshot();
            let err = form
                .set_value(&json!({
                    "firstName": "Jose",
                    "lastName": "Ben",
                    "emailGroup": {"email": "test@test.com", "confirmEmail": "test@test.com"},
                    "sendCatalog": false
                }))
                .unwrap_err();
            assert_eq!(err, FormError::MissingField { path: "phone".into() });
            assert_eq!(form.snapshot(), before);
        }

        #[test]
        fn test_set_value_full_replacement() {
            let mut form = CustomerForm::new();
            let mut full = form.snapshot();
            full["firstName"] = json!("Jose");
            full["rating"] = json!(4);
            full["addresses"][0]["city"] = json!("Porto");

            let changed = form.set_value(&full).unwrap();

            assert_eq!(changed.len(), 14);
            assert_eq!(form.snapshot(), full);
            assert!(form.field(paths::RATING).unwrap().is_valid());
        }
    }

    mod interaction {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_input_unknown_field() {
            let mut form = CustomerForm::new();
            let err = form
                .input(&"emailGroup.nickname".into(), FieldValue::text("x"))
                .unwrap_err();
            assert_eq!(err, FormError::UnknownField { path: "emailGroup.nickname".into() });
        }

        #[test]
        fn test_touch_marks_only_that_field() {
            let mut form = CustomerForm::new();
            form.touch(&FieldPath::parse(paths::EMAIL)).unwrap();
            assert!(form.field(paths::EMAIL).unwrap().is_touched());
            assert!(!form.field(paths::CONFIRM_EMAIL).unwrap().is_touched());
            assert!(form.touch(&"nope".into()).is_err());
        }

        #[test]
        fn test_rating_out_of_range() {
            let mut form = CustomerForm::new();
            form.patch_values(&json!({"rating": 6})).unwrap();
            assert!(form
                .field(paths::RATING)
                .unwrap()
                .errors()
                .unwrap()
                .contains(ErrorKind::Range));
        }

        #[test]
        fn test_first_name_too_short() {
            let mut form = CustomerForm::new();
            dirty(&mut form, paths::FIRST_NAME, "Jo");
            let errors = form.field(paths::FIRST_NAME).unwrap().errors().unwrap();
            assert_eq!(errors.iter().collect::<Vec<_>>(), vec![ErrorKind::MinLength]);
        }

        #[test]
        fn test_reset_restores_defaults() {
            let mut form = CustomerForm::new();
            dirty(&mut form, paths::FIRST_NAME, "Jose");
            form.set_notification(&FieldValue::text(NOTIFY_BY_TEXT));
            form.add_address();
            form.reset();
            assert_eq!(form.snapshot(), CustomerForm::new().snapshot());
            assert_eq!(form.phone_requirement(), PhoneRequirement::NoneRequired);
            assert!(form.field(paths::FIRST_NAME).unwrap().is_pristine());
        }
    }

    mod phone_requirement {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_text_makes_phone_required() {
            let mut form = CustomerForm::new();
            form.set_notification(&FieldValue::text("text"));
            let phone = form.field(paths::PHONE).unwrap();
            assert!(phone
                .validators()
                .iter()
                .any(|v| matches!(v, Validator::Required)));
            assert!(phone.errors().unwrap().contains(ErrorKind::Required));
        }

        #[test]
        fn test_other_method_clears_validators_and_errors() {
            let mut form = CustomerForm::new();
            form.set_notification(&FieldValue::text("text"));
            form.set_notification(&FieldValue::text("email"));
            let phone = form.field(paths::PHONE).unwrap();
            assert!(phone.validators().is_empty());
            assert!(phone.errors().is_none());
            assert_eq!(form.phone_requirement(), PhoneRequirement::NoneRequired);
        }

        #[test]
        fn test_required_phone_with_value_is_valid() {
            let mut form = CustomerForm::new();
            dirty(&mut form, paths::PHONE, "555-0100");
            form.set_notification(&FieldValue::text("text"));
            assert!(form.field(paths::PHONE).unwrap().is_valid());
        }

        #[test]
        fn test_patched_notification_method_requires_phone() {
            let mut form = CustomerForm::new();
            form.patch_values(&json!({"notificationMethod": "text"})).unwrap();
            assert_eq!(form.phone_requirement(), PhoneRequirement::Required);
            assert!(form
                .field(paths::PHONE)
                .unwrap()
                .errors()
                .unwrap()
                .contains(ErrorKind::Required));
        }

        #[test]
        fn test_old_notification_key_is_unknown() {
            let mut form = CustomerForm::new();
            let err = form.patch_values(&json!({"notification": "text"})).unwrap_err();
            assert_eq!(err, FormError::UnknownField { path: "notification".into() });
            assert_eq!(form.phone_requirement(), PhoneRequirement::NoneRequired);
        }

        #[test]
        fn test_typed_and_replaced_notification_follow_the_same_rule() {
            let mut form = CustomerForm::new();
            dirty(&mut form, paths::NOTIFICATION, "text");
            assert_eq!(form.phone_requirement(), PhoneRequirement::Required);

            let mut full = form.snapshot();
            full["notificationMethod"] = json!("email");
            form.set_value(&full).unwrap();
            assert_eq!(form.phone_requirement(), PhoneRequirement::NoneRequired);
            assert!(form.field(paths::PHONE).unwrap().validators().is_empty());
        }

        #[test]
        fn test_for_notification_is_exact() {
            assert_eq!(
                PhoneRequirement::for_notification(&FieldValue::text("Text")),
                PhoneRequirement::NoneRequired
            );
            assert_eq!(
                PhoneRequirement::for_notification(&FieldValue::Empty),
                PhoneRequirement::NoneRequired
            );
        }
    }

    mod email_group {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_matching_then_mismatching_emails() {
            let mut form = CustomerForm::new();
            dirty(&mut form, paths::EMAIL, "a@b.com");
            dirty(&mut form, paths::CONFIRM_EMAIL, "a@b.com");
            assert!(form.email_group().unwrap().errors().is_none());

            dirty(&mut form, paths::CONFIRM_EMAIL, "x@b.com");
            let errors = form.email_group().unwrap().errors().unwrap();
            assert_eq!(serde_json::to_value(errors).unwrap(), json!({"match": true}));
        }

        #[test]
        fn test_programmatic_values_keep_children_pristine() {
            let mut form = CustomerForm::new();
            form.patch_values(&json!({"emailGroup": {"email": "a@b.com", "confirmEmail": "x@b.com"}}))
                .unwrap();
            assert!(form.email_group().unwrap().errors().is_none());
        }

        #[test]
        fn test_email_message_follows_errors() {
            let mut form = CustomerForm::new();
            assert_eq!(form.email_message(), "");
            form.touch(&FieldPath::parse(paths::EMAIL)).unwrap();
            assert_eq!(form.email_message(), "Please enter your email address.");
            dirty(&mut form, paths::EMAIL, "not-an-email");
            assert_eq!(form.email_message(), "Please enter a valid email address");
            dirty(&mut form, paths::EMAIL, "a@b.com");
            assert_eq!(form.email_message(), "");
        }
    }
}
