//! Reconciliation action types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single decision a policy makes for one device in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Leave the device alone.
    NoAction,
    /// Set `key` to `values`, keeping every other attribute.
    SetAttribute { key: String, values: Vec<String> },
    /// Remove `key` from the device.
    DeleteAttribute { key: String },
}

impl Action {
    /// Set a single-valued attribute.
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Action::SetAttribute {
            key: key.into(),
            values: vec![value.into()],
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Action::DeleteAttribute { key: key.into() }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::NoAction => ActionKind::None,
            Action::SetAttribute { .. } => ActionKind::Set,
            Action::DeleteAttribute { .. } => ActionKind::Delete,
        }
    }

    /// True for actions that write to the MDM.
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::NoAction)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::NoAction => write!(f, "none"),
            Action::SetAttribute { key, values } => write!(f, "set {key}={}", values.join("|")),
            Action::DeleteAttribute { key } => write!(f, "delete {key}"),
        }
    }
}

/// Action discriminant, used as a statistics key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    None,
    Set,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::None => write!(f, "none"),
            ActionKind::Set => write!(f, "set"),
            ActionKind::Delete => write!(f, "delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display() {
        assert_eq!(Action::NoAction.to_string(), "none");
        assert_eq!(
            Action::set("custom_ciscoamp", "active").to_string(),
            "set custom_ciscoamp=active"
        );
        assert_eq!(Action::delete("releasechannel").to_string(), "delete releasechannel");
    }

    #[test]
    fn test_action_kind() {
        assert_eq!(Action::NoAction.kind(), ActionKind::None);
        assert_eq!(Action::set("k", "v").kind(), ActionKind::Set);
        assert_eq!(Action::delete("k").kind(), ActionKind::Delete);
        assert!(!Action::NoAction.is_write());
        assert!(Action::delete("k").is_write());
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_value(Action::set("sas_owned", "Yes")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "set_attribute", "key": "sas_owned", "values": ["Yes"]})
        );
    }
}
