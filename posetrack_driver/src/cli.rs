// posetrack_driver/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::replay::ReplayOptions;

/// Replays a synthetic tracking session through the pose predictor and
/// reports how closely the published poses follow the true motion.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the driver settings TOML file. Missing files fall back to defaults.
    #[arg(short, long, default_value = "posetrack.toml")]
    pub settings: PathBuf,

    /// Length of the replayed session, in seconds.
    #[arg(short, long, default_value_t = 5.0)]
    pub duration: f64,

    /// Host frame rate, in Hz.
    #[arg(long, default_value_t = 90.0)]
    pub frame_rate: f64,

    /// Tracker sample rate, in Hz.
    #[arg(long, default_value_t = 60.0)]
    pub sample_rate: f64,

    /// Delay between a sample's capture and its arrival, in seconds.
    #[arg(long, default_value_t = 0.02)]
    pub latency: f64,

    /// Standard deviation of the position noise, in meters.
    #[arg(long, default_value_t = 0.002)]
    pub noise: f64,

    /// Displace every Nth sample by a metre to exercise outlier rejection.
    #[arg(long)]
    pub glitch_every: Option<usize>,

    /// Seed for the noise generator. Random if omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the resolved settings as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_settings: bool,
}

impl Cli {
    pub fn replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            duration_s: self.duration,
            frame_rate_hz: self.frame_rate,
            sample_rate_hz: self.sample_rate,
            latency_s: self.latency,
            noise_m: self.noise,
            glitch_every: self.glitch_every,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_typical_headset() {
        let cli = Cli::parse_from(["posetrack-replay"]);
        assert_eq!(cli.settings, PathBuf::from("posetrack.toml"));
        assert_eq!(cli.frame_rate, 90.0);
        assert!(cli.seed.is_none());
        assert!(!cli.print_settings);
    }

    #[test]
    fn flags_map_onto_replay_options() {
        let cli = Cli::parse_from([
            "posetrack-replay",
            "--duration",
            "2",
            "--seed",
            "7",
            "--glitch-every",
            "30",
        ]);
        let options = cli.replay_options();
        assert_eq!(options.duration_s, 2.0);
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.glitch_every, Some(30));
    }
}
