//! Transform configuration resource.
//!
//! Controls how property setters treat zero or near-zero scales. Loaded from
//! an INI file; missing keys keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [transform]
//! degenerate_policy = reject
//! scale_epsilon = 0.000001
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

const DEFAULT_SCALE_EPSILON: f32 = 1e-6;
const DEFAULT_CONFIG_PATH: &str = "./transform.ini";

/// What a scale setter does when asked to reach a degenerate scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Fail with `DegenerateTransform` and leave the transform untouched.
    #[default]
    Reject,
    /// Push target scale components away from zero to `scale_epsilon`,
    /// keeping their sign. A divisor that is already degenerate is still
    /// rejected.
    Clamp,
}

impl DegeneratePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegeneratePolicy::Reject => "reject",
            DegeneratePolicy::Clamp => "clamp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(DegeneratePolicy::Reject),
            "clamp" => Some(DegeneratePolicy::Clamp),
            _ => None,
        }
    }
}

/// Transform configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct TransformConfig {
    pub degenerate_policy: DegeneratePolicy,
    /// Magnitude under which a scale component counts as zero.
    pub scale_epsilon: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformConfig {
    pub fn new() -> Self {
        Self {
            degenerate_policy: DegeneratePolicy::default(),
            scale_epsilon: DEFAULT_SCALE_EPSILON,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration bound to a custom file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Builder-style: set the degenerate policy.
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Whether `v` is too close to zero to divide by.
    pub fn is_degenerate(&self, v: f32) -> bool {
        !v.is_finite() || v.abs() < self.scale_epsilon
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Unknown policy names are
    /// ignored with a warning.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply_ini(&config);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply_ini(&config);
        Ok(())
    }

    fn apply_ini(&mut self, config: &Ini) {
        if let Some(policy) = config.get("transform", "degenerate_policy") {
            match DegeneratePolicy::parse(&policy) {
                Some(p) => self.degenerate_policy = p,
                None => warn!(
                    "Unknown degenerate_policy '{}', keeping {}",
                    policy,
                    self.degenerate_policy.as_str()
                ),
            }
        }
        if let Some(eps) = config.getfloat("transform", "scale_epsilon").ok().flatten() {
            self.scale_epsilon = eps.abs() as f32;
        }

        info!(
            "Loaded transform config: policy={}, scale_epsilon={}",
            self.degenerate_policy.as_str(),
            self.scale_epsilon
        );
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();
        config.set(
            "transform",
            "degenerate_policy",
            Some(self.degenerate_policy.as_str().to_string()),
        );
        config.set(
            "transform",
            "scale_epsilon",
            Some(self.scale_epsilon.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved transform config to {:?}", self.config_path);

        Ok(())
    }
}
