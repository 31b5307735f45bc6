// posetrack_core/src/channels.rs

use crate::types::TrackedPose;
use nalgebra::{Quaternion, Vector3};

/// The number of independently regressed channels in a pose.
pub const CHANNEL_COUNT: usize = 7;

/// A pose flattened into its regression channels, in `PoseChannel::ALL` order.
pub type ChannelVector = [f64; CHANNEL_COUNT];

/// An enum naming every scalar channel the extrapolator fits a trend to.
/// The declaration order is the layout of a `ChannelVector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseChannel {
    // --- Cartesian Position ---
    Px,
    Py,
    Pz,
    // --- Orientation (as a quaternion, scalar first) ---
    Qw,
    Qx,
    Qy,
    Qz,
}

impl PoseChannel {
    pub const ALL: [PoseChannel; CHANNEL_COUNT] = [
        PoseChannel::Px,
        PoseChannel::Py,
        PoseChannel::Pz,
        PoseChannel::Qw,
        PoseChannel::Qx,
        PoseChannel::Qy,
        PoseChannel::Qz,
    ];

    /// Index of this channel inside a `ChannelVector`.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TrackedPose {
    /// Reads a single channel.
    pub fn channel(&self, channel: PoseChannel) -> f64 {
        match channel {
            PoseChannel::Px => self.position.x,
            PoseChannel::Py => self.position.y,
            PoseChannel::Pz => self.position.z,
            PoseChannel::Qw => self.orientation.w,
            PoseChannel::Qx => self.orientation.i,
            PoseChannel::Qy => self.orientation.j,
            PoseChannel::Qz => self.orientation.k,
        }
    }

    /// Rebuilds a pose from a channel vector. The orientation is taken as-is,
    /// it is not renormalized here.
    pub fn from_channels(values: &ChannelVector) -> Self {
        Self {
            position: Vector3::new(values[0], values[1], values[2]),
            orientation: Quaternion::new(values[3], values[4], values[5], values[6]),
        }
    }
}
