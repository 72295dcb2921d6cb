//! The closed set of network preferences an OEM can assign to a package

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PreferenceError;

/// How networks are requested on behalf of a package
///
/// Serialized as its integer value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum NetworkPreference {
    /// Default behavior, equivalent to not setting any preference
    #[default]
    Default = 0,
    /// Unmetered if available, else OEM_PAID, else the general default network
    OemPaid = 1,
    /// Unmetered if available, else OEM_PAID, else no network
    OemPaidNoFallback = 2,
    /// Only OEM_PAID networks
    OemPaidOnly = 3,
    /// Only OEM_PRIVATE networks
    OemPrivateOnly = 4,
}

impl NetworkPreference {
    /// Every preference, in integer order
    pub const ALL: [NetworkPreference; 5] = [
        NetworkPreference::Default,
        NetworkPreference::OemPaid,
        NetworkPreference::OemPaidNoFallback,
        NetworkPreference::OemPaidOnly,
        NetworkPreference::OemPrivateOnly,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Platform constant name, e.g. `OEM_NETWORK_PREFERENCE_OEM_PAID`
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkPreference::Default => "OEM_NETWORK_PREFERENCE_DEFAULT",
            NetworkPreference::OemPaid => "OEM_NETWORK_PREFERENCE_OEM_PAID",
            NetworkPreference::OemPaidNoFallback => "OEM_NETWORK_PREFERENCE_OEM_PAID_NO_FALLBACK",
            NetworkPreference::OemPaidOnly => "OEM_NETWORK_PREFERENCE_OEM_PAID_ONLY",
            NetworkPreference::OemPrivateOnly => "OEM_NETWORK_PREFERENCE_OEM_PRIVATE_ONLY",
        }
    }
}

impl fmt::Display for NetworkPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<NetworkPreference> for i32 {
    fn from(preference: NetworkPreference) -> Self {
        preference.as_i32()
    }
}

impl TryFrom<i32> for NetworkPreference {
    type Error = PreferenceError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        NetworkPreference::ALL
            .into_iter()
            .find(|preference| preference.as_i32() == value)
            .ok_or_else(|| {
                PreferenceError::InvalidArgument(format!("unknown network preference {}", value))
            })
    }
}

/// Name for a raw preference value
///
/// Known values map to their constant name; anything else is rendered as
/// lower-case hex so that diagnostics still show what was received.
pub fn preference_to_string(value: i32) -> String {
    match NetworkPreference::try_from(value) {
        Ok(preference) => preference.as_str().to_string(),
        Err(_) => format!("{:x}", value),
    }
}
