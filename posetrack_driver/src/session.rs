// posetrack_driver/src/session.rs

//! State shared between all devices of one driver session.
//!
//! A controller button may change the height offset that the head-mounted
//! unit publishes with, so this lives above the devices and is handed to
//! each of them by reference on every frame.

use tracing::info;

/// One press of a height button moves every device by this much.
pub const HEIGHT_STEP_M: f64 = 0.02;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionContext {
    /// Added to the published Y position of every device, in metres.
    height_offset: f64,
    /// While set, the head-mounted unit freezes its orientation.
    view_lock_requested: bool,
}

impl SessionContext {
    pub fn height_offset(&self) -> f64 {
        self.height_offset
    }

    pub fn raise_height(&mut self) {
        self.height_offset += HEIGHT_STEP_M;
    }

    pub fn lower_height(&mut self) {
        self.height_offset -= HEIGHT_STEP_M;
    }

    pub fn reset_height(&mut self) {
        self.height_offset = 0.0;
    }

    pub fn view_lock_requested(&self) -> bool {
        self.view_lock_requested
    }

    pub fn request_view_lock(&mut self, requested: bool) {
        if requested != self.view_lock_requested {
            info!("View lock {}", if requested { "requested" } else { "released" });
        }
        self.view_lock_requested = requested;
    }
}
