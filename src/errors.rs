use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while parsing or running a pipeline.
///
/// Variants raised inside a spawned context only ever terminate that context.
/// `Channel`, `Spawn` and `Io` are fatal to the shell itself.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: nix::Error,
    },

    #[error("missing command name")]
    EmptyCommand,

    #[error("invalid argument (contains NUL byte): {0:?}")]
    InvalidArgument(String),

    #[error("cannot open {}: {source}", .path.display())]
    Redirection {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("expected a file name after '{0}'")]
    MissingRedirectTarget(&'static str),

    #[error("stage {stage}: {stream} redirection conflicts with the pipe")]
    RedirectConflict { stage: usize, stream: &'static str },

    #[error("failed to create pipe: {0}")]
    Channel(nix::Error),

    #[error("cannot connect {stream} to the pipe: {source}")]
    Bind {
        stream: &'static str,
        #[source]
        source: nix::Error,
    },

    #[error("failed to create process: {0}")]
    Spawn(nix::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Errors after which the shell cannot safely prompt again.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Channel(_) | ShellError::Spawn(_) | ShellError::Io(_)
        )
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
