//! Immutable package → network preference mappings
//!
//! This module provides the two halves of the copy-on-build pattern:
//! - `OemNetworkPreferences`: an immutable snapshot, compared by content
//! - `OemNetworkPreferencesBuilder`: the mutable accumulator that produces it

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PreferenceError, Result};
use crate::preference::NetworkPreference;

/// Flat dictionary form used for serialization: package name → integer value
pub type PreferenceBundle = BTreeMap<String, i32>;

// ============================================================================
// OemNetworkPreferences - immutable snapshot
// ============================================================================

/// Per-package network preferences set by the OEM
///
/// Equality and hashing depend only on the package/preference pairs, never on
/// the order they were added in. Serializes as a flat map of package name to
/// integer preference value.
///
/// # Example
///
/// ```rust
/// use oem_preferences::{NetworkPreference, OemNetworkPreferences};
///
/// let mut builder = OemNetworkPreferences::builder();
/// builder
///     .add_network_preference("com.example.maps", NetworkPreference::OemPaid)?
///     .add_network_preference("com.example.fleet", NetworkPreference::OemPrivateOnly)?;
/// let preferences = builder.build();
///
/// assert_eq!(preferences.len(), 2);
/// assert_eq!(
///     preferences.get("com.example.maps"),
///     Some(NetworkPreference::OemPaid)
/// );
///
/// let json = preferences.to_json()?;
/// assert_eq!(OemNetworkPreferences::from_json(&json)?, preferences);
/// # Ok::<(), oem_preferences::PreferenceError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "PreferenceBundle", try_from = "PreferenceBundle")]
pub struct OemNetworkPreferences {
    mappings: BTreeMap<String, NetworkPreference>,
}

impl OemNetworkPreferences {
    /// Start an empty builder
    pub fn builder() -> OemNetworkPreferencesBuilder {
        OemNetworkPreferencesBuilder::new()
    }

    /// All mappings, keyed by package name
    pub fn network_preferences(&self) -> &BTreeMap<String, NetworkPreference> {
        &self.mappings
    }

    /// Preference for a package, if one was set
    pub fn get(&self, package_name: &str) -> Option<NetworkPreference> {
        self.mappings.get(package_name).copied()
    }

    pub fn contains(&self, package_name: &str) -> bool {
        self.mappings.contains_key(package_name)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NetworkPreference)> {
        self.mappings
            .iter()
            .map(|(package, preference)| (package.as_str(), *preference))
    }

    /// Convert to the flat dictionary used on the wire
    pub fn to_bundle(&self) -> PreferenceBundle {
        self.mappings
            .iter()
            .map(|(package, preference)| (package.clone(), preference.as_i32()))
            .collect()
    }

    /// Rebuild from a flat dictionary
    ///
    /// Fails with [`PreferenceError::InvalidArgument`] on an unknown preference
    /// value.
    pub fn from_bundle<I>(bundle: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, i32)>,
    {
        let mut builder = OemNetworkPreferencesBuilder::new();
        for (package, value) in bundle {
            builder.add_raw_network_preference(package, value)?;
        }
        Ok(builder.build())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for OemNetworkPreferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OemNetworkPreferences{{mappings={{")?;
        for (i, (package, preference)) in self.mappings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", package, preference)?;
        }
        write!(f, "}}}}")
    }
}

impl From<OemNetworkPreferences> for PreferenceBundle {
    fn from(preferences: OemNetworkPreferences) -> Self {
        preferences.to_bundle()
    }
}

impl TryFrom<PreferenceBundle> for OemNetworkPreferences {
    type Error = PreferenceError;

    fn try_from(bundle: PreferenceBundle) -> Result<Self> {
        Self::from_bundle(bundle)
    }
}

impl<'a> IntoIterator for &'a OemNetworkPreferences {
    type Item = (&'a String, &'a NetworkPreference);
    type IntoIter = std::collections::btree_map::Iter<'a, String, NetworkPreference>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}

// ============================================================================
// OemNetworkPreferencesBuilder - mutable accumulator
// ============================================================================

/// Accumulates mappings and produces [`OemNetworkPreferences`] snapshots
///
/// `build` copies the current mappings, so the builder can keep being mutated
/// without affecting snapshots it already produced.
#[derive(Debug, Clone, Default)]
pub struct OemNetworkPreferencesBuilder {
    mappings: BTreeMap<String, NetworkPreference>,
}

impl OemNetworkPreferencesBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder seeded with a copy of existing preferences
    pub fn from_preferences(preferences: &OemNetworkPreferences) -> Self {
        Self {
            mappings: preferences.mappings.clone(),
        }
    }

    /// Set the preference for a package, replacing any previous value
    ///
    /// Every string is a valid package name, including an empty one.
    pub fn add_network_preference(
        &mut self,
        package_name: impl Into<String>,
        preference: NetworkPreference,
    ) -> Result<&mut Self> {
        let package_name = package_name.into();

        if let Some(previous) = self.mappings.insert(package_name.clone(), preference) {
            tracing::trace!(
                package = %package_name,
                %previous,
                %preference,
                "Replaced network preference"
            );
        }

        Ok(self)
    }

    /// Set the preference for a package from its integer value
    pub fn add_raw_network_preference(
        &mut self,
        package_name: impl Into<String>,
        value: i32,
    ) -> Result<&mut Self> {
        let preference = NetworkPreference::try_from(value)?;
        self.add_network_preference(package_name, preference)
    }

    /// Remove the preference for a package; absent packages are ignored
    pub fn remove_network_preference(&mut self, package_name: &str) -> Result<&mut Self> {
        self.mappings.remove(package_name);
        Ok(self)
    }

    /// Snapshot the current mappings
    pub fn build(&self) -> OemNetworkPreferences {
        OemNetworkPreferences {
            mappings: self.mappings.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl From<&OemNetworkPreferences> for OemNetworkPreferencesBuilder {
    fn from(preferences: &OemNetworkPreferences) -> Self {
        Self::from_preferences(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_preferences() {
        let preferences = OemNetworkPreferences::builder().build();
        assert!(preferences.is_empty());
        assert_eq!(preferences, OemNetworkPreferences::default());
        assert_eq!(preferences.to_string(), "OemNetworkPreferences{mappings={}}");
    }

    #[test]
    fn test_add_overwrites_existing_value() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.app", NetworkPreference::OemPaid)
            .unwrap()
            .add_network_preference("com.example.app", NetworkPreference::OemPaidOnly)
            .unwrap();

        let preferences = builder.build();
        assert_eq!(preferences.len(), 1);
        assert_eq!(
            preferences.get("com.example.app"),
            Some(NetworkPreference::OemPaidOnly)
        );
    }

    #[test]
    fn test_add_then_remove() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.app", NetworkPreference::OemPaid)
            .unwrap()
            .remove_network_preference("com.example.app")
            .unwrap();

        let preferences = builder.build();
        assert!(!preferences.contains("com.example.app"));
        assert!(preferences.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.app", NetworkPreference::OemPaid)
            .unwrap();
        builder.remove_network_preference("com.example.other").unwrap();

        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_blank_package_names_are_ordinary_keys() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("", NetworkPreference::OemPaid)
            .unwrap()
            .add_network_preference("   ", NetworkPreference::OemPrivateOnly)
            .unwrap();

        let preferences = builder.build();
        assert_eq!(preferences.len(), 2);
        assert_eq!(preferences.get(""), Some(NetworkPreference::OemPaid));
        assert_eq!(preferences.get("   "), Some(NetworkPreference::OemPrivateOnly));

        let json = preferences.to_json().unwrap();
        assert_eq!(json, r#"{"":1,"   ":4}"#);
        assert_eq!(OemNetworkPreferences::from_json(&json).unwrap(), preferences);

        builder.remove_network_preference("").unwrap();
        let remaining = builder.build();
        assert!(!remaining.contains(""));
        assert!(remaining.contains("   "));
    }

    #[test]
    fn test_unknown_raw_value_rejected() {
        let mut builder = OemNetworkPreferencesBuilder::new();

        assert!(matches!(
            builder.add_raw_network_preference("com.example.app", 42),
            Err(PreferenceError::InvalidArgument(_))
        ));
        assert!(builder.is_empty());

        builder
            .add_raw_network_preference("com.example.app", 2)
            .unwrap();
        assert_eq!(
            builder.build().get("com.example.app"),
            Some(NetworkPreference::OemPaidNoFallback)
        );
    }

    #[test]
    fn test_build_is_a_snapshot() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.a", NetworkPreference::OemPaid)
            .unwrap();
        let first = builder.build();

        builder
            .add_network_preference("com.example.b", NetworkPreference::OemPaidOnly)
            .unwrap()
            .remove_network_preference("com.example.a")
            .unwrap();
        let second = builder.build();

        assert_eq!(first.len(), 1);
        assert_eq!(first.get("com.example.a"), Some(NetworkPreference::OemPaid));
        assert!(!first.contains("com.example.b"));

        assert_eq!(second.len(), 1);
        assert!(!second.contains("com.example.a"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_builder_from_preferences_copies() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.a", NetworkPreference::OemPaid)
            .unwrap();
        let original = builder.build();

        let mut derived = OemNetworkPreferencesBuilder::from(&original);
        derived
            .add_network_preference("com.example.b", NetworkPreference::OemPrivateOnly)
            .unwrap();

        assert_eq!(original.len(), 1);
        assert_eq!(derived.build().len(), 2);
    }

    #[test]
    fn test_bundle_round_trip() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.a", NetworkPreference::OemPaid)
            .unwrap()
            .add_network_preference("com.example.b", NetworkPreference::Default)
            .unwrap();
        let preferences = builder.build();

        let bundle = preferences.to_bundle();
        assert_eq!(bundle.get("com.example.a"), Some(&1));
        assert_eq!(bundle.get("com.example.b"), Some(&0));
        assert_eq!(bundle.len(), 2);

        assert_eq!(OemNetworkPreferences::from_bundle(bundle).unwrap(), preferences);
    }

    #[test]
    fn test_json_shape() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.b", NetworkPreference::OemPaidOnly)
            .unwrap()
            .add_network_preference("com.example.a", NetworkPreference::OemPaid)
            .unwrap();

        assert_eq!(
            builder.build().to_json().unwrap(),
            r#"{"com.example.a":1,"com.example.b":3}"#
        );
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            OemNetworkPreferences::from_json(r#"{"com.example.a":17}"#),
            Err(PreferenceError::Serialization(_))
        ));
        assert!(matches!(
            OemNetworkPreferences::from_json(r#"{"com.example.a":null}"#),
            Err(PreferenceError::Serialization(_))
        ));
    }

    #[test]
    fn test_display() {
        let mut builder = OemNetworkPreferencesBuilder::new();
        builder
            .add_network_preference("com.example.b", NetworkPreference::OemPaidOnly)
            .unwrap()
            .add_network_preference("com.example.a", NetworkPreference::OemPaid)
            .unwrap();

        assert_eq!(
            builder.build().to_string(),
            "OemNetworkPreferences{mappings={com.example.a=OEM_NETWORK_PREFERENCE_OEM_PAID, \
             com.example.b=OEM_NETWORK_PREFERENCE_OEM_PAID_ONLY}}"
        );
    }
}
