//! Per-package OEM network preferences.
//!
//! An OEM can ask that traffic from specific packages be routed over OEM
//! networks (`OEM_PAID`, `OEM_PRIVATE`) instead of the system default. This
//! crate models that request as an immutable map from package name to
//! [`NetworkPreference`].
//!
//! # Overview
//!
//! - [`NetworkPreference`]: the closed set of preference values, serialized as
//!   integers.
//! - [`OemNetworkPreferences`]: an immutable snapshot, compared by content.
//! - [`OemNetworkPreferencesBuilder`]: a mutable accumulator; every `build`
//!   returns an independent copy.
//!
//! # Example
//!
//! ```
//! use oem_preferences::{NetworkPreference, OemNetworkPreferences};
//!
//! let mut builder = OemNetworkPreferences::builder();
//! builder.add_network_preference("com.example.fleet", NetworkPreference::OemPrivateOnly)?;
//! let preferences = builder.build();
//!
//! println!("{}", preferences);
//! # Ok::<(), oem_preferences::PreferenceError>(())
//! ```

pub mod error;
pub mod preference;
pub mod preferences;

pub use error::{PreferenceError, Result};
pub use preference::{preference_to_string, NetworkPreference};
pub use preferences::{OemNetworkPreferences, OemNetworkPreferencesBuilder, PreferenceBundle};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        NetworkPreference, OemNetworkPreferences, OemNetworkPreferencesBuilder, PreferenceError,
    };
}
