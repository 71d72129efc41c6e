use std::path::PathBuf;

use thiserror::Error;

use crate::color::ParseColorError;

/// Everything that can stop an image on its way to the terminal.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot decode {}: {source}", path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("render invariant violated: {0}")]
    RenderInvariantViolation(String),

    #[error("worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("terminal size query failed: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("writing output failed: {0}")]
    Output(#[source] std::io::Error),
}

impl RenderError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            RenderError::InvalidConfig(_) | RenderError::DecodeFailure { .. } => 2,
            RenderError::Io { .. } | RenderError::Output(_) => 255,
            RenderError::RenderInvariantViolation(_)
            | RenderError::WorkerPool(_)
            | RenderError::Terminal(_) => 1,
        }
    }
}

impl From<ParseColorError> for RenderError {
    fn from(err: ParseColorError) -> Self {
        RenderError::InvalidConfig(format!("matte color: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(RenderError::InvalidConfig("x".into()).exit_code(), 2);
        assert_eq!(
            RenderError::RenderInvariantViolation("x".into()).exit_code(),
            1
        );
        let io = RenderError::Io {
            path: PathBuf::from("missing.png"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(io.exit_code(), 255);
        assert_eq!(
            RenderError::Output(std::io::Error::from(std::io::ErrorKind::BrokenPipe)).exit_code(),
            255
        );
    }

    #[test]
    fn test_parse_color_error_is_invalid_config() {
        let err: RenderError = ParseColorError::InvalidLength.into();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
