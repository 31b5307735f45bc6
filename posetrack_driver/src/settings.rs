// posetrack_driver/src/settings.rs

//! Driver settings, layered from built-in defaults, an optional TOML file and
//! `POSETRACK_` environment variables (later layers win).

use std::collections::HashSet;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use posetrack_core::config::ExtrapolationConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::device::Handedness;
use crate::mounting::MountingSettings;

/// Prefix for environment overrides. Nested keys are separated by `__`,
/// e.g. `POSETRACK_EXTRAPOLATION__SMOOTHING_FACTOR=0.3`.
pub const ENV_PREFIX: &str = "POSETRACK_";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("serial '{0}' is used by more than one device")]
    DuplicateSerial(String),

    #[error("a device has an empty serial")]
    EmptySerial,
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        SettingsError::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HmdSettings {
    pub serial: String,
    pub mounting: MountingSettings,
}

impl Default for HmdSettings {
    fn default() -> Self {
        Self {
            serial: "PTK-HMD-0001".to_owned(),
            mounting: MountingSettings::head_mounted(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerSettings {
    pub serial: String,
    pub handedness: Handedness,
    pub mounting: MountingSettings,
}

/// Everything the driver needs to build its devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverSettings {
    /// Shared by every device.
    pub extrapolation: ExtrapolationConfig,
    pub hmd: HmdSettings,
    pub controllers: Vec<ControllerSettings>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            extrapolation: ExtrapolationConfig::default(),
            hmd: HmdSettings::default(),
            controllers: vec![
                ControllerSettings {
                    serial: "PTK-CTL-L001".to_owned(),
                    handedness: Handedness::Left,
                    mounting: MountingSettings::default(),
                },
                ControllerSettings {
                    serial: "PTK-CTL-R001".to_owned(),
                    handedness: Handedness::Right,
                    mounting: MountingSettings::default(),
                },
            ],
        }
    }
}

impl DriverSettings {
    /// The provider stack used by `load`. A missing file is skipped.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(DriverSettings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads, validates and clamps the settings.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        info!("Loading driver settings from: {}", path.display());
        Self::from_figment(&Self::figment(path))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, SettingsError> {
        let mut settings: DriverSettings = figment.extract()?;
        settings.extrapolation = settings.extrapolation.clamped();
        settings.validate()?;
        Ok(settings)
    }

    /// Every serial must be non-empty and unique across devices.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut seen = HashSet::new();
        let serials = std::iter::once(&self.hmd.serial)
            .chain(self.controllers.iter().map(|c| &c.serial));
        for serial in serials {
            if serial.is_empty() {
                return Err(SettingsError::EmptySerial);
            }
            if !seen.insert(serial.as_str()) {
                return Err(SettingsError::DuplicateSerial(serial.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(DriverSettings::default().validate().is_ok());
    }

    #[test]
    fn duplicate_serials_are_rejected() {
        let mut settings = DriverSettings::default();
        settings.controllers[1].serial = settings.hmd.serial.clone();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::DuplicateSerial(serial)) if serial == "PTK-HMD-0001"
        ));
    }

    #[test]
    fn empty_serial_is_rejected() {
        let mut settings = DriverSettings::default();
        settings.controllers.push(ControllerSettings::default());
        assert!(matches!(settings.validate(), Err(SettingsError::EmptySerial)));
    }

    #[test]
    fn settings_survive_a_toml_dump() {
        let settings = DriverSettings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: DriverSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
