//! File formats for bytegraph.
//!
//! Patches are stored as TOML; rendered audio is exported as WAV.

mod patch_format;
mod wav_format;

pub use patch_format::{load_patch, save_patch, PATCH_VERSION};
pub use wav_format::{frames_to_wav, write_wav, MAX_WAV_FRAMES};

use bg_engine::GraphError;

/// Errors from reading or writing patch and WAV files.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("malformed patch file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize patch: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unsupported patch version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid patch: {0}")]
    Graph(#[from] GraphError),
    #[error("{frames} frames do not fit in a WAV file")]
    WavTooLong { frames: usize },
    #[error("sample rate {0} Hz is too high for a WAV header")]
    SampleRateTooHigh(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
