//! Wire models for the MDM and the secondary directory.
//!
//! Decoding is lenient where the backends are: absent or malformed optional
//! fields fall back to empty values instead of failing the record.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Device platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlatformType {
    Ios,
    Android,
    Osx,
    #[default]
    #[serde(other)]
    Other,
}

impl PlatformType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Ios => "IOS",
            PlatformType::Android => "ANDROID",
            PlatformType::Osx => "OSX",
            PlatformType::Other => "OTHER",
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationState {
    Active,
    Pending,
    Retired,
    Wiped,
    #[default]
    #[serde(other)]
    Other,
}

impl RegistrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationState::Active => "ACTIVE",
            RegistrationState::Pending => "PENDING",
            RegistrationState::Retired => "RETIRED",
            RegistrationState::Wiped => "WIPED",
            RegistrationState::Other => "OTHER",
        }
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom attributes of a device: key to ordered values.
///
/// The MDM models every attribute as multi-valued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomAttributes(BTreeMap<String, Vec<String>>);

impl CustomAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values for a key (empty when the key is absent).
    pub fn values(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// True when `key` is present and one of its values equals `value`.
    pub fn contains_value(&self, key: &str, value: &str) -> bool {
        self.values(key).iter().any(|v| v == value)
    }

    /// Copy with `key` set to `values`; every other key is kept as is.
    #[must_use]
    pub fn with_value(&self, key: &str, values: Vec<String>) -> Self {
        let mut merged = self.0.clone();
        merged.insert(key.to_string(), values);
        Self(merged)
    }

    /// Copy without `key`.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        let mut remaining = self.0.clone();
        remaining.remove(key);
        Self(remaining)
    }

    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.insert(key.into(), values);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Parse the MDM's `{"attrs": {key: [values]}}` envelope.
    ///
    /// Anything unexpected (missing envelope, non-array values) degrades to
    /// fewer attributes rather than an error.
    pub fn from_wire(value: &Value) -> Self {
        let Some(attrs) = value.get("attrs").and_then(Value::as_object) else {
            return Self::default();
        };

        let map = attrs
            .iter()
            .map(|(key, values)| {
                let values = match values {
                    Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
                    other => scalar_to_string(other).into_iter().collect(),
                };
                (key.clone(), values)
            })
            .collect();

        Self(map)
    }

    /// Render as the `{"attrs": ...}` envelope the MDM expects on writes.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({ "attrs": self.0 })
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for CustomAttributes {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_attributes<'de, D>(deserializer: D) -> Result<CustomAttributes, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(CustomAttributes::from_wire(&value))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected string or number, got {value}")))
}

/// Back-reference to the partition a device was collected from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRef {
    pub id: i64,
    pub name: String,
}

/// An organizational partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_count: u64,
}

impl Space {
    pub fn reference(&self) -> SpaceRef {
        SpaceRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// A managed device as returned by the device search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform_type: PlatformType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub registration_state: RegistrationState,
    /// Epoch milliseconds.
    #[serde(default)]
    pub last_checkin: Option<i64>,
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub custom_attributes: CustomAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub violated_policies: Vec<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub device_model: Option<String>,
    #[serde(default)]
    pub pretty_model: Option<String>,
    #[serde(default)]
    pub client_device_identifier: Option<String>,
    #[serde(default)]
    pub platform_version: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    /// Attached during collection; never part of the wire record.
    #[serde(skip)]
    pub space: Option<SpaceRef>,
}

impl Device {
    /// Minimal device, mostly for fixtures.
    pub fn new(id: i64, platform_type: PlatformType) -> Self {
        Self {
            id,
            uid: String::new(),
            serial_number: None,
            platform_type,
            registration_state: RegistrationState::Active,
            last_checkin: None,
            custom_attributes: CustomAttributes::new(),
            violated_policies: Vec::new(),
            device_name: None,
            device_model: None,
            pretty_model: None,
            client_device_identifier: None,
            platform_version: None,
            email_address: None,
            space: None,
        }
    }

    /// Copy of this device annotated with the partition that returned it.
    #[must_use]
    pub fn in_space(self, space: SpaceRef) -> Self {
        Self {
            space: Some(space),
            ..self
        }
    }

    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: &str, values: &[&str]) -> Self {
        self.custom_attributes
            .insert(key, values.iter().map(|v| (*v).to_string()).collect());
        self
    }

    #[must_use]
    pub fn with_violation(mut self, policy: impl Into<String>) -> Self {
        self.violated_policies.push(policy.into());
        self
    }

    pub fn has_violation(&self, policy: &str) -> bool {
        self.violated_policies.iter().any(|p| p == policy)
    }

    pub fn last_checkin_at(&self) -> Option<DateTime<Utc>> {
        self.last_checkin
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }
}

/// App bundle platform for inventory queries; the endpoint takes one per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppPlatform {
    Ios,
    Android,
}

impl AppPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppPlatform::Ios => "IOS",
            AppPlatform::Android => "ANDROID",
        }
    }
}

impl fmt::Display for AppPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device found with a given app installed, tagged with the query that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInventoryRecord {
    pub device: Device,
    pub bundle_id: String,
    pub platform: AppPlatform,
}

/// A configuration (policy) as applied to one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

/// An asset record from the secondary directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub serial: String,
    #[serde(default)]
    pub munki_environment: Option<String>,
    #[serde(default)]
    pub salt_environment: Option<String>,
    #[serde(default)]
    pub mobileiron_environment: Option<String>,
}

impl DirectoryRecord {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            munki_environment: None,
            salt_environment: None,
            mobileiron_environment: None,
        }
    }

    /// Environment classification fields that are set.
    pub fn environments(&self) -> impl Iterator<Item = &str> {
        [
            self.munki_environment.as_deref(),
            self.salt_environment.as_deref(),
            self.mobileiron_environment.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}
