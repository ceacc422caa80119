//! Reconciliation policies
//!
//! Each policy turns one device snapshot, plus whatever evidence it was built
//! with, into at most one [`Action`]. Policies hold no mutable state, so a
//! decision depends only on the snapshots taken at the start of the run.

use mdmsync_connector::{Device, DirectoryRecord, DirectorySnapshot, PlatformType};
use std::collections::HashSet;

use crate::types::Action;

/// A per-device decision table.
pub trait ReconcilePolicy: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Devices outside the policy's scope are not evaluated at all.
    fn applies_to(&self, _device: &Device) -> bool {
        true
    }

    /// Decide what to do with one in-scope device.
    fn decide(&self, device: &Device) -> Action;

    /// True when `action` is justified only by the device being absent from
    /// the evidence. Such writes are withheld when the evidence lost pages.
    fn relies_on_absence(&self, _action: &Action) -> bool {
        false
    }
}

/// Tag every device that has an app installed with `key = value`.
///
/// The input devices are the app-inventory hits themselves. A device whose
/// attribute already holds exactly `[value]` is left alone.
#[derive(Debug, Clone)]
pub struct AppPresenceTag {
    pub key: String,
    pub value: String,
}

impl AppPresenceTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl ReconcilePolicy for AppPresenceTag {
    fn name(&self) -> &'static str {
        "app-presence-tag"
    }

    fn decide(&self, device: &Device) -> Action {
        let current = device.custom_attributes.values(&self.key);
        if current.len() == 1 && current[0] == self.value {
            Action::NoAction
        } else {
            Action::set(&self.key, &self.value)
        }
    }
}

pub const AMP_ATTRIBUTE: &str = "custom_ciscoamp";
pub const AMP_ACTIVE: &str = "active";
pub const AMP_REMOVED: &str = "removed";
pub const AMP_BUNDLE_ID: &str = "com.cisco.amp";
pub const AMP_VIOLATION_POLICIES: [&str; 2] = [
    "[Production] Cisco Amp Activation",
    "[Dev] Cisco Amp Activation",
];

/// Toggle an exclusion attribute on Android devices with hysteresis.
///
/// | violation | app installed | attribute | action       |
/// |-----------|---------------|-----------|--------------|
/// | yes       | any           | active    | none         |
/// | yes       | any           | other     | set active   |
/// | no        | no            | active    | set removed  |
/// | otherwise |               |           | none         |
#[derive(Debug, Clone)]
pub struct AmpToggle {
    pub key: String,
    pub violation_policies: Vec<String>,
    /// Device ids the app-inventory query found the app on.
    pub app_installed: HashSet<i64>,
}

impl AmpToggle {
    pub fn new(app_installed: HashSet<i64>) -> Self {
        Self {
            key: AMP_ATTRIBUTE.to_string(),
            violation_policies: AMP_VIOLATION_POLICIES.iter().map(|p| (*p).to_string()).collect(),
            app_installed,
        }
    }

    #[must_use]
    pub fn with_violation_policies(mut self, policies: Vec<String>) -> Self {
        self.violation_policies = policies;
        self
    }

    fn violated(&self, device: &Device) -> bool {
        self.violation_policies.iter().any(|p| device.has_violation(p))
    }
}

impl ReconcilePolicy for AmpToggle {
    fn name(&self) -> &'static str {
        "amp-toggle"
    }

    fn applies_to(&self, device: &Device) -> bool {
        device.platform_type == PlatformType::Android
    }

    fn decide(&self, device: &Device) -> Action {
        let active = device.custom_attributes.contains_value(&self.key, AMP_ACTIVE);

        if self.violated(device) {
            if active {
                Action::NoAction
            } else {
                Action::set(&self.key, AMP_ACTIVE)
            }
        } else if active && !self.app_installed.contains(&device.id) {
            Action::set(&self.key, AMP_REMOVED)
        } else {
            Action::NoAction
        }
    }

    fn relies_on_absence(&self, action: &Action) -> bool {
        *action == Action::set(&self.key, AMP_REMOVED)
    }
}

pub const DEP_ATTRIBUTE: &str = "dep";
pub const OWNERSHIP_ATTRIBUTE: &str = "sas_owned";

/// Classify Mac ownership by presence in the asset directory.
///
/// DEP-enrolled devices (`dep` contains "Yes") are skipped. Otherwise the
/// ownership attribute is set to "Yes" when the serial is in the directory
/// and "No" when it is not, in both cases only when it does not already
/// hold that value.
#[derive(Debug, Clone)]
pub struct OwnershipClassification<'a> {
    pub dep_key: String,
    pub owned_key: String,
    directory: &'a DirectorySnapshot,
}

impl<'a> OwnershipClassification<'a> {
    pub fn new(directory: &'a DirectorySnapshot) -> Self {
        Self {
            dep_key: DEP_ATTRIBUTE.to_string(),
            owned_key: OWNERSHIP_ATTRIBUTE.to_string(),
            directory,
        }
    }

    pub fn in_directory(&self, device: &Device) -> bool {
        device
            .serial_number
            .as_deref()
            .is_some_and(|serial| self.directory.contains(serial))
    }
}

impl ReconcilePolicy for OwnershipClassification<'_> {
    fn name(&self) -> &'static str {
        "ownership"
    }

    fn applies_to(&self, device: &Device) -> bool {
        device.platform_type == PlatformType::Osx
    }

    fn decide(&self, device: &Device) -> Action {
        let attrs = &device.custom_attributes;
        if attrs.contains_value(&self.dep_key, "Yes") {
            return Action::NoAction;
        }

        let target = if self.in_directory(device) { "Yes" } else { "No" };
        if attrs.contains_value(&self.owned_key, target) {
            Action::NoAction
        } else {
            Action::set(&self.owned_key, target)
        }
    }

    fn relies_on_absence(&self, action: &Action) -> bool {
        *action == Action::set(&self.owned_key, "No")
    }
}

pub const RELEASE_CHANNEL_ATTRIBUTE: &str = "releasechannel";
pub const PREPROD_CHANNEL: &str = "PreProd";
const TESTING_ENVIRONMENT: &str = "TESTING";

/// True when any environment field of the record reads "testing" in any case.
pub fn is_phase_tester(record: &DirectoryRecord) -> bool {
    record
        .environments()
        .any(|env| env.to_uppercase() == TESTING_ENVIRONMENT)
}

/// Promote phase testers to the pre-production channel and demote everyone
/// else the directory knows about.
///
/// A serial with any phase-tester record counts as a phase tester. A serial
/// the directory does not know is left alone.
#[derive(Debug, Clone)]
pub struct ChannelPromotion {
    pub key: String,
    pub channel: String,
    phase_testers: HashSet<String>,
    non_testers: HashSet<String>,
}

impl ChannelPromotion {
    /// Split the directory into the two subsets.
    pub fn from_directory(directory: &DirectorySnapshot) -> Self {
        let mut phase_testers = HashSet::new();
        let mut non_testers = HashSet::new();

        for (serial, records) in directory.classification() {
            if records.iter().any(is_phase_tester) {
                phase_testers.insert(serial.clone());
            } else {
                non_testers.insert(serial.clone());
            }
        }

        Self::new(phase_testers, non_testers)
    }

    pub fn new(phase_testers: HashSet<String>, non_testers: HashSet<String>) -> Self {
        Self {
            key: RELEASE_CHANNEL_ATTRIBUTE.to_string(),
            channel: PREPROD_CHANNEL.to_string(),
            phase_testers,
            non_testers,
        }
    }

    pub fn phase_tester_count(&self) -> usize {
        self.phase_testers.len()
    }

    pub fn non_tester_count(&self) -> usize {
        self.non_testers.len()
    }
}

impl ReconcilePolicy for ChannelPromotion {
    fn name(&self) -> &'static str {
        "release-channel"
    }

    fn applies_to(&self, device: &Device) -> bool {
        device.platform_type == PlatformType::Osx
    }

    fn decide(&self, device: &Device) -> Action {
        let Some(serial) = device.serial_number.as_deref() else {
            return Action::NoAction;
        };
        let on_channel = device
            .custom_attributes
            .contains_value(&self.key, &self.channel);

        if self.phase_testers.contains(serial) {
            if on_channel {
                Action::NoAction
            } else {
                Action::set(&self.key, &self.channel)
            }
        } else if self.non_testers.contains(serial) && on_channel {
            Action::delete(&self.key)
        } else {
            Action::NoAction
        }
    }

    /// A tester record on a lost page would have kept the device on the channel.
    fn relies_on_absence(&self, action: &Action) -> bool {
        matches!(action, Action::DeleteAttribute { .. })
    }
}
