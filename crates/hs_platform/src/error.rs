use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is {size} bytes, larger than the 4 GiB debug file limit", path.display())]
    FileTooLarge { path: PathBuf, size: u64 },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no default audio output device")]
    NoAudioDevice,
    #[error("audio device has no usable output config: {0}")]
    AudioConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported audio sample format {0:?}")]
    AudioSampleFormat(cpal::SampleFormat),
    #[error("failed to open audio stream: {0}")]
    AudioBuild(#[from] cpal::BuildStreamError),
    #[error("failed to start audio stream: {0}")]
    AudioPlay(#[from] cpal::PlayStreamError),
}
