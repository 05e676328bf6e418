//! Per-evaluation input record.

/// Number of signal input channels (`a` through `d`).
pub const INPUT_CHANNELS: usize = 4;

/// Global clock and transport values, refreshed once per sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlobalValues {
    /// `fs`: free-running seconds.
    pub free_seconds: f64,
    /// `f`: free-running samples.
    pub free_samples: f64,
    /// `ps`: seconds since host transport start.
    pub position_seconds: f64,
    /// `p`: samples since host transport start.
    pub position_samples: f64,
    /// `rs`: seconds since note start.
    pub note_seconds: f64,
    /// `r`: samples since note start.
    pub note_samples: f64,
    /// `n`: note phase (256 per cycle of the note frequency).
    pub note_phase: f64,
    /// `t`: 8 kHz bytebeat counter since note start.
    pub byte_time: f64,
    /// `nf`: note frequency in Hz.
    pub note_frequency: f64,
    /// `sr`: sample rate in Hz.
    pub sample_rate: f64,
    /// `bps`: host beats per second.
    pub beats_per_second: f64,
}

/// Everything a program can read during one evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RuntimeInputs {
    pub channels: [f64; INPUT_CHANNELS],
    pub globals: GlobalValues,
}

impl RuntimeInputs {
    pub fn new(channels: [f64; INPUT_CHANNELS], globals: GlobalValues) -> Self {
        Self { channels, globals }
    }

    /// Inputs with only the signal channels set.
    pub fn from_channels(channels: [f64; INPUT_CHANNELS]) -> Self {
        Self {
            channels,
            globals: GlobalValues::default(),
        }
    }
}
