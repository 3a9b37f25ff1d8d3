//! Line-delimited JSON commands accepted by the headless driver
//!
//! ```text
//! {"op": "input", "path": "emailGroup.email", "value": "a@b.com"}
//! {"op": "touch", "path": "emailGroup.email"}
//! {"op": "patch", "value": {"firstName": "Jose"}}
//! {"op": "addAddress"}
//! {"op": "save"}
//! ```

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::controller::FormEvent;
use crate::state::{FieldPath, FieldValue, FormError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    Input { path: String, value: Value },
    Touch { path: String },
    Patch { value: Value },
    Replace { value: Value },
    AddAddress,
    PopulateTestData,
    Reset,
    Save,
    Snapshot,
}

impl Command {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Convert into a controller event. `Snapshot` also returns the
    /// receiving end of its reply.
    pub fn into_event(self) -> Result<(FormEvent, Option<oneshot::Receiver<Value>>), FormError> {
        let event = match self {
            Command::Input { path, value } => {
                let path = FieldPath::parse(&path);
                let value = FieldValue::from_json(&value)
                    .ok_or_else(|| FormError::InvalidValue { path: path.clone() })?;
                FormEvent::Input { path, value }
            }
            Command::Touch { path } => FormEvent::Touch {
                path: FieldPath::parse(&path),
            },
            Command::Patch { value } => FormEvent::Patch(value),
            Command::Replace { value } => FormEvent::Replace(value),
            Command::AddAddress => FormEvent::AddAddress,
            Command::PopulateTestData => FormEvent::PopulateTestData,
            Command::Reset => FormEvent::Reset,
            Command::Save => FormEvent::Save,
            Command::Snapshot => {
                let (tx, rx) = oneshot::channel();
                return Ok((FormEvent::Snapshot(tx), Some(rx)));
            }
        };
        Ok((event, None))
    }
}
