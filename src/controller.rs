//! Reactive wiring and the form event loop
//!
//! The controller owns the form. The form itself swaps the phone validators
//! when `notificationMethod` changes; the controller adds the timed reaction:
//! a change to `emailGroup.email` (re)arms a debounce timer, and when it
//! elapses the email message is recomputed and published.
//!
//! Events are handled one at a time on a single task. The debounce deadline
//! is awaited in the same `select!`, so the deferred recomputation never
//! interleaves with an event handler.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::config::SignupConfig;
use crate::sink::{Submission, SubmissionSink};
use crate::state::{paths, CustomerForm, Debouncer, FieldPath, FieldValue, FormError};

/// Input from the UI layer
#[derive(Debug)]
pub enum FormEvent {
    /// The user typed or picked a value
    Input { path: FieldPath, value: FieldValue },
    /// Focus left a field
    Touch { path: FieldPath },
    /// Programmatic partial update
    Patch(Value),
    /// Programmatic full replacement
    Replace(Value),
    AddAddress,
    PopulateTestData,
    Reset,
    Save,
    /// Reply with the current value tree
    Snapshot(oneshot::Sender<Value>),
}

/// Published email message and how many times it has been recomputed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    pub text: String,
    pub recomputations: u64,
}

pub struct FormController {
    form: CustomerForm,
    email_debounce: Debouncer,
    sink: Box<dyn SubmissionSink>,
    message_tx: watch::Sender<EmailMessage>,
}

impl FormController {
    pub fn new(config: &SignupConfig, sink: Box<dyn SubmissionSink>) -> Self {
        let (message_tx, _) = watch::channel(EmailMessage::default());
        Self {
            form: CustomerForm::with_patch_policy(config.patch_policy()),
            email_debounce: Debouncer::new(config.debounce()),
            sink,
            message_tx,
        }
    }

    pub fn form(&self) -> &CustomerForm {
        &self.form
    }

    pub fn email_debounce(&self) -> &Debouncer {
        &self.email_debounce
    }

    /// Watch the email message as it is recomputed
    pub fn subscribe(&self) -> watch::Receiver<EmailMessage> {
        self.message_tx.subscribe()
    }

    pub fn email_message(&self) -> EmailMessage {
        self.message_tx.borrow().clone()
    }

    /// Apply one event. Structural errors leave the form untouched.
    pub async fn handle(&mut self, event: FormEvent) -> Result<(), FormError> {
        match event {
            FormEvent::Input { path, value } => {
                self.form.input(&path, value)?;
                self.react(&[path]);
            }
            FormEvent::Touch { path } => self.form.touch(&path)?,
            FormEvent::Patch(partial) => {
                let changed = self.form.patch_values(&partial)?;
                self.react(&changed);
            }
            FormEvent::Replace(full) => {
                let changed = self.form.set_value(&full)?;
                self.react(&changed);
            }
            FormEvent::AddAddress => self.form.add_address(),
            FormEvent::PopulateTestData => {
                let changed = self.form.populate_test_data()?;
                self.react(&changed);
            }
            FormEvent::Reset => {
                self.form.reset();
                self.email_debounce.cancel();
                self.refresh_email_message();
            }
            FormEvent::Save => {
                self.save().await;
            }
            FormEvent::Snapshot(reply) => {
                // The requester may have gone away; nothing to do then
                let _ = reply.send(self.form.snapshot());
            }
        }
        Ok(())
    }

    fn react(&mut self, changed: &[FieldPath]) {
        if changed.iter().any(|path| path.matches(paths::EMAIL)) {
            self.email_debounce.trigger();
            debug!(delay = ?self.email_debounce.delay(), "email changed, message pending");
        }
    }

    /// Recompute the email message from the field's current errors and publish it
    pub fn refresh_email_message(&mut self) {
        let text = self.form.email_message();
        debug!(message = %text, "email message recomputed");
        self.message_tx.send_modify(|message| {
            message.text = text;
            message.recomputations += 1;
        });
    }

    /// Snapshot the form and hand it to the sink. Sink failures are logged.
    pub async fn save(&self) -> Submission {
        let submission = Submission::new(self.form.snapshot(), self.form.is_valid());
        let failing: Vec<String> = self
            .form
            .collect_errors()
            .iter()
            .map(ToString::to_string)
            .collect();
        info!(id = %submission.id, valid = submission.valid, ?failing, "saving form");

        if let Err(err) = self.sink.submit(&submission).await {
            warn!("Failed to save submission {}: {err:#}", submission.id);
        }
        submission
    }

    /// Process events until every sender is dropped. A pending debounce
    /// deadline is discarded on exit.
    pub async fn run(mut self, mut events: mpsc::Receiver<FormEvent>) {
        loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) => {
                        if let Err(err) = self.handle(event).await {
                            warn!(path = %err.path(), "Rejected form event: {err}");
                        }
                    }
                    None => break,
                },
                () = self.email_debounce.elapsed() => self.refresh_email_message(),
            }
        }
        debug!(
            pending = self.email_debounce.is_pending(),
            "form event loop stopped"
        );
    }
}
