//! User Profile
//!
//! Profile data created during onboarding and edited on the profile
//! screen. The remote profile is the source of truth; [`ProfileStore`]
//! keeps a local JSON copy (fixed filename, no versioning or migrations)
//! for offline continuity and reconciles it whenever the remote copy is
//! fetched or written.

use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Active nutrition plan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Caloric deficit
    Cut,
    /// Maintenance calories
    #[default]
    Maintain,
    /// Caloric surplus
    Bulk,
}

impl Plan {
    /// All plans in UI cycling order
    pub const ALL: [Self; 3] = [Self::Cut, Self::Maintain, Self::Bulk];

    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cut => "Cut",
            Self::Maintain => "Maintain",
            Self::Bulk => "Bulk",
        }
    }
}

/// UI color theme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme
    #[default]
    Dark,
    /// Light theme
    Light,
}

/// User profile
///
/// Serialized camelCase on the wire and in the local cache file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Body weight in kg
    pub weight_kg: f64,
    /// Height in cm
    pub height_cm: u32,
    /// Active nutrition plan
    pub plan: Plan,
    /// UI theme preference
    pub theme: Theme,
    /// Whether onboarding has been completed
    pub onboarding_complete: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            weight_kg: 75.0,
            height_cm: 175,
            plan: Plan::default(),
            theme: Theme::default(),
            onboarding_complete: false,
        }
    }
}

/// Local profile cache with explicit load/save/clear lifecycle
pub struct ProfileStore {
    path: Option<PathBuf>,
    profile: RwLock<UserProfile>,
}

impl ProfileStore {
    /// Store persisted at the given JSON file path
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            profile: RwLock::new(UserProfile::default()),
        }
    }

    /// Memory-only store (offline mode, tests)
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            profile: RwLock::new(UserProfile::default()),
        }
    }

    /// Current profile snapshot
    #[must_use]
    pub fn get(&self) -> UserProfile {
        self.profile.read().clone()
    }

    /// Load the cached copy from disk, if one exists
    ///
    /// A missing or unreadable file leaves the default profile in place;
    /// the cache is best-effort and the remote copy is the source of truth.
    pub fn load(&self) -> bool {
        let Some(path) = self.path.as_ref() else {
            return false;
        };
        let Ok(raw) = fs::read_to_string(path) else {
            return false;
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => {
                *self.profile.write() = profile;
                tracing::debug!("profile cache loaded");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable profile cache");
                false
            }
        }
    }

    /// Replace the profile and persist it (reconcile with remote truth)
    pub fn set(&self, profile: UserProfile) {
        *self.profile.write() = profile.clone();
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let persist = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&profile)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            fs::write(path, json)
        };
        if let Err(err) = persist() {
            tracing::warn!(error = %err, "failed to persist profile cache");
        }
    }

    /// Reset to defaults and remove the cache file (logout)
    pub fn clear(&self) {
        *self.profile.write() = UserProfile::default();
        if let Some(path) = self.path.as_ref() {
            if let Err(err) = fs::remove_file(path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(error = %err, "failed to remove profile cache");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile {
            weight_kg: 82.5,
            height_cm: 180,
            plan: Plan::Cut,
            theme: Theme::Light,
            onboarding_complete: true,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["weightKg"], serde_json::json!(82.5));
        assert_eq!(value["plan"], serde_json::json!("cut"));
        assert_eq!(value["onboardingComplete"], serde_json::json!(true));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{"plan":"bulk"}"#).unwrap();
        assert_eq!(profile.plan, Plan::Bulk);
        assert!(!profile.onboarding_complete);
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let store = ProfileStore::new(path.clone());
        let mut profile = UserProfile::default();
        profile.plan = Plan::Bulk;
        profile.onboarding_complete = true;
        store.set(profile.clone());

        let restored = ProfileStore::new(path);
        assert!(restored.load());
        assert_eq!(restored.get(), profile);
    }

    #[test]
    fn test_clear_resets_and_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        let store = ProfileStore::new(path.clone());
        let mut profile = UserProfile::default();
        profile.weight_kg = 90.0;
        store.set(profile);

        store.clear();
        assert_eq!(store.get(), UserProfile::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "not json").unwrap();

        let store = ProfileStore::new(path);
        assert!(!store.load());
        assert_eq!(store.get(), UserProfile::default());
    }
}
