// posetrack_driver/tests/settings_loading.rs

use std::path::Path;

use figment::Jail;
use posetrack_driver::prelude::*;

const FILE: &str = "posetrack.toml";

#[test]
fn missing_file_yields_defaults() {
    Jail::expect_with(|_jail| {
        let settings = DriverSettings::load(Path::new(FILE)).unwrap();
        assert_eq!(settings, DriverSettings::default());
        Ok(())
    });
}

#[test]
fn file_values_are_merged_over_defaults_and_clamped() {
    Jail::expect_with(|jail| {
        jail.create_file(
            FILE,
            r#"
                [extrapolation]
                capacity = 3
                smoothing_factor = 1.5

                [hmd]
                serial = "HMD-XYZ"

                [[controllers]]
                serial = "CTL-A"
                handedness = "left"
                mounting = { pitch_deg = 10.0 }
            "#,
        )?;

        let settings = DriverSettings::load(Path::new(FILE)).unwrap();
        assert_eq!(settings.extrapolation.capacity, 5);
        assert_eq!(settings.extrapolation.smoothing_factor, 0.99);
        assert_eq!(settings.extrapolation.max_age_seconds, 1.0);

        assert_eq!(settings.hmd.serial, "HMD-XYZ");
        assert_eq!(settings.hmd.mounting, MountingSettings::head_mounted());

        assert_eq!(settings.controllers.len(), 1);
        assert_eq!(settings.controllers[0].handedness, Handedness::Left);
        assert_eq!(settings.controllers[0].mounting.pitch_deg, 10.0);
        assert_eq!(settings.controllers[0].mounting.yaw_deg, 0.0);
        Ok(())
    });
}

#[test]
fn environment_overrides_the_file() {
    Jail::expect_with(|jail| {
        jail.create_file(FILE, "[extrapolation]\nmax_age_seconds = 2.0\n")?;
        jail.set_env("POSETRACK_EXTRAPOLATION__MAX_AGE_SECONDS", "0.25");
        jail.set_env("POSETRACK_HMD__SERIAL", "HMD-ENV");

        let settings = DriverSettings::load(Path::new(FILE)).unwrap();
        assert_eq!(settings.extrapolation.max_age_seconds, 0.25);
        assert_eq!(settings.hmd.serial, "HMD-ENV");
        Ok(())
    });
}

#[test]
fn unknown_keys_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(FILE, "[extrapolation]\ncapacty = 12\n")?;
        let result = DriverSettings::load(Path::new(FILE));
        assert!(matches!(result, Err(SettingsError::Figment(_))));
        Ok(())
    });
}

#[test]
fn duplicate_serials_in_the_file_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            FILE,
            r#"
                [[controllers]]
                serial = "PTK-HMD-0001"
            "#,
        )?;
        let result = DriverSettings::load(Path::new(FILE));
        assert!(matches!(result, Err(SettingsError::DuplicateSerial(_))));
        Ok(())
    });
}

#[test]
fn loaded_settings_build_a_working_driver() {
    Jail::expect_with(|jail| {
        jail.create_file(FILE, "[[controllers]]\nserial = \"SOLO\"\nhandedness = \"right\"\n")?;
        let settings = DriverSettings::load(Path::new(FILE)).unwrap();

        let mut driver = Driver::from_settings(ManualClock::starting_at(0.0), &settings);
        driver.activate_all();
        let kinds: Vec<DeviceKind> = driver.devices().map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![DeviceKind::Hmd, DeviceKind::Controller]);
        assert_eq!(driver.controller_mut("SOLO").unwrap().handedness(), Handedness::Right);
        Ok(())
    });
}
