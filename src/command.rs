use crate::errors::{ShellError, ShellResult};
use crate::redirects::{self, Redirects};
use nix::errno::Errno;
use nix::unistd::execvp;
use std::ffi::{CString, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

/// Bytes that separate words. Nothing else is special: quotes are plain text.
const DELIMITERS: &[u8] = b" \t\n";

fn is_delimiter(byte: &u8) -> bool {
    DELIMITERS.contains(byte)
}

/// Split stage text into words on runs of space, tab or newline. Bytes are
/// kept as they are; the text does not need to be UTF-8.
pub fn tokenize(text: &[u8]) -> Vec<OsString> {
    text.split(is_delimiter)
        .filter(|word| !word.is_empty())
        .map(|word| OsStr::from_bytes(word).to_os_string())
        .collect()
}

/// True when the text holds no words at all.
pub fn is_blank(text: &[u8]) -> bool {
    text.iter().all(is_delimiter)
}

/// One command of a pipeline: what to run and where its standard streams
/// should point before any pipe is connected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    pub argv: Vec<OsString>,
    pub redirects: Redirects,
}

impl Stage {
    pub fn parse(text: &[u8]) -> Self {
        let (argv, redirects) = redirects::extract(tokenize(text));
        Self { argv, redirects }
    }

    pub fn program(&self) -> Option<&OsStr> {
        self.argv.first().map(OsString::as_os_str)
    }

    fn exec_args(&self) -> ShellResult<Vec<CString>> {
        self.argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes())
                    .map_err(|_| ShellError::InvalidArgument(arg.to_string_lossy().into_owned()))
            })
            .collect()
    }

    /// Replace the current process image with this stage's program, searching
    /// `PATH` like the shell would. Only returns on failure.
    pub fn exec(&self) -> ShellError {
        let program = match self.program() {
            Some(program) => program.to_string_lossy().into_owned(),
            None => return ShellError::EmptyCommand,
        };
        let args = match self.exec_args() {
            Ok(args) => args,
            Err(e) => return e,
        };

        match execvp(&args[0], &args) {
            Err(Errno::ENOENT) => ShellError::CommandNotFound(program),
            Err(source) => ShellError::Exec { program, source },
            Ok(never) => match never {},
        }
    }
}
