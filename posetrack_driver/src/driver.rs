// posetrack_driver/src/driver.rs

//! The per-process driver: owns every tracked device and the shared session.

use posetrack_core::config::ExtrapolationConfig;
use posetrack_core::diagnostics::{DiagnosticSink, TracingDiagnostics};
use posetrack_core::predictor::IngestOutcome;
use posetrack_core::types::RawSample;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::device::{ControllerDevice, HmdDevice, TrackedDevice};
use crate::session::SessionContext;
use crate::settings::DriverSettings;
use crate::sink::PoseSink;

pub struct Driver<C: Clock, D: DiagnosticSink = TracingDiagnostics> {
    clock: C,
    session: SessionContext,
    devices: Vec<Box<dyn TrackedDevice>>,
    diagnostics: D,
}

impl<C: Clock> Driver<C, TracingDiagnostics> {
    pub fn new(clock: C) -> Self {
        Self::with_diagnostics(clock, TracingDiagnostics)
    }

    /// Builds a driver with one HMD and every configured controller.
    /// Devices are registered but not yet active.
    pub fn from_settings(clock: C, settings: &DriverSettings) -> Self {
        let mut driver = Self::new(clock);
        driver.populate(settings);
        driver
    }
}

impl<C: Clock, D: DiagnosticSink> Driver<C, D> {
    pub fn with_diagnostics(clock: C, diagnostics: D) -> Self {
        Self {
            clock,
            session: SessionContext::default(),
            devices: Vec::new(),
            diagnostics,
        }
    }

    /// Registers the devices described by `settings`.
    pub fn populate(&mut self, settings: &DriverSettings) {
        let config = settings.extrapolation.clamped();
        self.add_device(Box::new(HmdDevice::new(
            settings.hmd.serial.clone(),
            config,
            settings.hmd.mounting.to_isometry(),
        )));
        for controller in &settings.controllers {
            self.add_device(Box::new(ControllerDevice::new(
                controller.serial.clone(),
                controller.handedness,
                config,
                controller.mounting.to_isometry(),
            )));
        }
    }

    pub fn add_device(&mut self, device: Box<dyn TrackedDevice>) {
        debug!("Registering device {} ({:?})", device.serial(), device.kind());
        self.devices.push(device);
    }

    /// Activates every registered device, handing out indices in registration order.
    pub fn activate_all(&mut self) {
        for (index, device) in self.devices.iter_mut().enumerate() {
            device.activate(index as u32);
        }
    }

    /// Returns `false` if no device has this serial.
    pub fn deactivate(&mut self, serial: &str) -> bool {
        match self.device_mut(serial) {
            Some(device) => {
                info!("Deactivating device {}", serial);
                device.deactivate();
                true
            }
            None => false,
        }
    }

    pub fn devices(&self) -> impl Iterator<Item = &dyn TrackedDevice> + '_ {
        self.devices.iter().map(|d| &**d)
    }

    pub fn device(&self, serial: &str) -> Option<&dyn TrackedDevice> {
        self.devices().find(|d| d.serial() == serial)
    }

    pub fn device_mut(&mut self, serial: &str) -> Option<&mut (dyn TrackedDevice + 'static)> {
        self.devices
            .iter_mut()
            .find(|d| d.serial() == serial)
            .map(|d| &mut **d)
    }

    /// Looks up a controller by serial, downcasting from the device trait.
    pub fn controller_mut(&mut self, serial: &str) -> Option<&mut ControllerDevice> {
        self.device_mut(serial)?
            .as_any_mut()
            .downcast_mut::<ControllerDevice>()
    }

    pub fn hmd_mut(&mut self, serial: &str) -> Option<&mut HmdDevice> {
        self.device_mut(serial)?.as_any_mut().downcast_mut::<HmdDevice>()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }

    /// Routes a raw tracking sample to the device with `serial`, stamped with
    /// the driver clock.
    ///
    /// # Returns
    /// `None` if the device is unknown or inactive.
    pub fn ingest_sample(&mut self, serial: &str, sample: &RawSample) -> Option<IngestOutcome> {
        let now = self.clock.now_seconds();
        let Some(device) = self
            .devices
            .iter_mut()
            .find(|d| d.serial() == serial)
        else {
            warn!("Sample for unknown device {}", serial);
            return None;
        };
        device.ingest_sample(sample, now, &mut self.diagnostics)
    }

    /// Runs one host frame: every active device computes its pose and the
    /// ready ones are pushed to `sink`.
    ///
    /// # Returns
    /// The number of poses published.
    pub fn run_frame(&mut self, sink: &mut dyn PoseSink) -> usize {
        let now = self.clock.now_seconds();
        let mut published = 0;
        for device in &mut self.devices {
            let Some(index) = device.device_index() else {
                continue;
            };
            if let Some(pose) = device.update(&self.session, now) {
                sink.pose_updated(index, &pose);
                published += 1;
            }
        }
        published
    }

    /// Applies new tuning to every device. Histories are cold-reset.
    pub fn reconfigure(&mut self, capacity: usize, max_age_seconds: f64, smoothing_factor: f64) {
        let config = ExtrapolationConfig::new(capacity, max_age_seconds, smoothing_factor);
        for device in &mut self.devices {
            device.predictor_mut().apply_config(config);
        }
    }
}
