//! Named Settings Profiles
//!
//! A [`ProfileSet`] is the document the persistence layer stores: every
//! profile as a flat settings object, the active profile name, and whether
//! the tutorial has been completed.
//!
//! ```text
//! {
//!   "active_profile": "Default",
//!   "profiles": { "Default": { "rect_padding": 170, ... } },
//!   "tutorial_completed": false
//! }
//! ```
//!
//! The `Default` profile always exists and cannot be deleted. An active name
//! that does not match any profile falls back to `Default`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::error::{ConfigError, Result};
use super::settings::Settings;
use super::types::ConfigUpdate;

/// Name of the profile that always exists
pub const DEFAULT_PROFILE: &str = "Default";

fn default_active() -> String {
    DEFAULT_PROFILE.to_string()
}

/// Named settings profiles plus session flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    #[serde(default = "default_active")]
    active_profile: String,

    #[serde(default)]
    profiles: BTreeMap<String, Settings>,

    #[serde(default)]
    tutorial_completed: bool,
}

impl Default for ProfileSet {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), Settings::default());
        Self {
            active_profile: default_active(),
            profiles,
            tutorial_completed: false,
        }
    }
}

impl ProfileSet {
    /// Set containing only the default profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored document and repair it
    pub fn from_json(text: &str) -> Result<Self> {
        let mut set: ProfileSet = serde_json::from_str(text)?;
        set.repair();
        Ok(set)
    }

    /// Serialize for storage
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Ensure `Default` exists and the active name is valid
    pub fn repair(&mut self) {
        if !self.profiles.contains_key(DEFAULT_PROFILE) {
            info!("Adding missing '{}' profile", DEFAULT_PROFILE);
            self.profiles
                .insert(DEFAULT_PROFILE.to_string(), Settings::default());
        }
        if !self.profiles.contains_key(&self.active_profile) {
            warn!(
                "Active profile '{}' not found, using '{}'",
                self.active_profile, DEFAULT_PROFILE
            );
            self.active_profile = default_active();
        }
    }

    /// Name of the active profile
    pub fn active_name(&self) -> &str {
        &self.active_profile
    }

    /// Settings of the active profile
    pub fn active(&self) -> Settings {
        self.profiles
            .get(&self.active_profile)
            .or_else(|| self.profiles.get(DEFAULT_PROFILE))
            .cloned()
            .unwrap_or_default()
    }

    /// Settings of a named profile
    pub fn get(&self, name: &str) -> Option<&Settings> {
        self.profiles.get(name)
    }

    /// Profile names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// No profiles at all (only before [`ProfileSet::repair`])
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Create or overwrite a profile
    pub fn save(&mut self, name: &str, settings: Settings) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidProfileName(name.to_string()));
        }
        info!("Saving profile '{}'", name);
        self.profiles.insert(name.to_string(), settings);
        Ok(())
    }

    /// Delete a profile; the active profile falls back to `Default`
    pub fn delete(&mut self, name: &str) -> Result<Settings> {
        if name == DEFAULT_PROFILE {
            return Err(ConfigError::ProtectedProfile(name.to_string()));
        }
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
        if self.active_profile == name {
            self.active_profile = default_active();
        }
        info!("Deleted profile '{}'", name);
        Ok(removed)
    }

    /// Make a profile active and return the update for the running loop
    pub fn switch_to(&mut self, name: &str) -> Result<ConfigUpdate> {
        let settings = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
        let update = ConfigUpdate::from_config(&settings.engine);
        self.active_profile = name.to_string();
        info!("Switched to profile '{}'", name);
        Ok(update)
    }

    /// Tutorial has been completed or skipped
    pub fn tutorial_completed(&self) -> bool {
        self.tutorial_completed
    }

    /// Record tutorial completion
    pub fn set_tutorial_completed(&mut self, completed: bool) {
        self.tutorial_completed = completed;
    }
}
