//! Named configuration profiles.
//!
//! A profile is a whole-configuration snapshot stored as its own JSON file
//! under the profiles directory, so different games or applications can keep
//! separate hotkey tables. Loading a profile also rewrites the main
//! configuration file, making the profile the active configuration.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{HotclickError, Result};

/// Name of the profile that always exists and cannot be deleted or renamed.
pub const DEFAULT_PROFILE: &str = "default";

/// Manages whole-configuration snapshots in a profiles directory.
pub struct ProfileManager {
    profiles_dir: PathBuf,
    config_path: PathBuf,
}

impl ProfileManager {
    /// Open (and if needed initialize) the profiles directory.
    ///
    /// The `default` profile is seeded from the current configuration file
    /// when one exists, otherwise from the starter configuration.
    pub fn new(profiles_dir: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Result<Self> {
        let manager = Self {
            profiles_dir: profiles_dir.into(),
            config_path: config_path.into(),
        };
        fs::create_dir_all(&manager.profiles_dir)?;
        manager.ensure_default()?;
        Ok(manager)
    }

    fn ensure_default(&self) -> Result<()> {
        let path = self.profile_path(DEFAULT_PROFILE);
        if path.exists() {
            return Ok(());
        }

        if self.config_path.exists() {
            fs::copy(&self.config_path, &path)?;
            info!("created default profile from existing configuration");
        } else {
            Config::default().save_to_file(&path)?;
            info!("created empty default profile");
        }
        Ok(())
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.json"))
    }

    fn validate_name(name: &str) -> Result<()> {
        let has_separator = name.chars().any(std::path::is_separator);
        if name.is_empty() || has_separator || name == "." || name == ".." {
            return Err(HotclickError::profile(format!(
                "invalid profile name '{name}'"
            )));
        }
        Ok(())
    }

    /// Names of all stored profiles, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut profiles = Vec::new();
        for entry in fs::read_dir(&self.profiles_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    profiles.push(stem.to_string());
                }
            }
        }
        profiles.sort();
        Ok(profiles)
    }

    /// Store `config` as a profile, overwriting an existing one of the same
    /// name.
    pub fn save(&self, name: &str, config: &Config) -> Result<()> {
        Self::validate_name(name)?;
        config.save_to_file(self.profile_path(name))?;
        info!(profile = name, "saved profile");
        Ok(())
    }

    /// Load a profile and make it the active configuration (the main config
    /// file is rewritten).
    pub fn load(&self, name: &str) -> Result<Config> {
        Self::validate_name(name)?;
        let path = self.profile_path(name);
        if !path.exists() {
            return Err(HotclickError::profile(format!("profile not found: {name}")));
        }

        let config = Config::from_file(&path)?;
        config.save_to_file(&self.config_path)?;
        info!(profile = name, "loaded profile");
        Ok(config)
    }

    /// Delete a profile. The default profile is protected.
    pub fn delete(&self, name: &str) -> Result<()> {
        Self::validate_name(name)?;
        if name == DEFAULT_PROFILE {
            return Err(HotclickError::profile("cannot delete the default profile"));
        }

        let path = self.profile_path(name);
        if !path.exists() {
            return Err(HotclickError::profile(format!("profile not found: {name}")));
        }
        fs::remove_file(path)?;
        info!(profile = name, "deleted profile");
        Ok(())
    }

    /// Rename a profile. The default profile is protected, and an existing
    /// profile is never clobbered.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        Self::validate_name(from)?;
        Self::validate_name(to)?;
        if from == DEFAULT_PROFILE {
            return Err(HotclickError::profile("cannot rename the default profile"));
        }

        let from_path = self.profile_path(from);
        let to_path = self.profile_path(to);
        if !from_path.exists() {
            return Err(HotclickError::profile(format!("profile not found: {from}")));
        }
        if to_path.exists() {
            return Err(HotclickError::profile(format!(
                "profile already exists: {to}"
            )));
        }

        fs::rename(from_path, to_path)?;
        info!(from, to, "renamed profile");
        Ok(())
    }

    /// Path of the profiles directory.
    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }
}
