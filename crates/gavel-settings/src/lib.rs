//! # gavel-settings
//!
//! Layered configuration for the hub:
//!
//! 1. Compiled defaults ([`HubSettings::default`])
//! 2. Deep-merged user values from `~/.gavel/settings.json`
//! 3. Environment variable overrides (`GAVEL_*`, highest priority)
//!
//! Invalid env values are ignored with a warning rather than failing
//! startup; an invalid settings file is an error.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::SettingsError;
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{AuthSettings, ChatSettings, HubSettings, ServerSettings};
