use std::path::PathBuf;

use thiserror::Error;

pub const USAGE: &str = "usage: hs_game [--replay <file.json>] [--record <file.json>]";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Replay file whose inputs drive the first ticks.
    pub replay: Option<PathBuf>,
    /// Where to write the ticks' inputs on exit.
    pub record: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("{0} expects a file path")]
    MissingValue(&'static str),
    #[error("unknown argument '{0}'")]
    Unknown(String),
}

/// Parse the arguments after the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<LaunchOptions, LaunchError> {
    let mut options = LaunchOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--replay" => {
                let path = args.next().ok_or(LaunchError::MissingValue("--replay"))?;
                options.replay = Some(PathBuf::from(path));
            }
            "--record" => {
                let path = args.next().ok_or(LaunchError::MissingValue("--record"))?;
                options.record = Some(PathBuf::from(path));
            }
            _ => return Err(LaunchError::Unknown(arg)),
        }
    }
    Ok(options)
}
