use crate::errors::{ShellError, ShellResult};
use nix::unistd::{dup2_stdin, dup2_stdout};
use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

pub const INPUT_OPERATOR: &str = "<";
pub const OUTPUT_OPERATOR: &str = ">";

/// Permission bits for files created by output redirection.
const OUTPUT_MODE: u32 = 0o644;

/// The file an operator points at. `Missing` is kept around instead of being
/// rejected at parse time so the error surfaces in the stage that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Path(PathBuf),
    Missing,
}

/// Effective redirection targets of one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirects {
    pub input: Option<Target>,
    pub output: Option<Target>,
}

/// Strip `<` / `>` operators and their file names out of a token list.
///
/// Operators are only recognized as standalone tokens. When one appears more
/// than once the last occurrence wins.
pub fn extract(tokens: Vec<OsString>) -> (Vec<OsString>, Redirects) {
    let mut args = Vec::with_capacity(tokens.len());
    let mut redirects = Redirects::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        let slot = if token.as_os_str() == OsStr::new(INPUT_OPERATOR) {
            &mut redirects.input
        } else if token.as_os_str() == OsStr::new(OUTPUT_OPERATOR) {
            &mut redirects.output
        } else {
            args.push(token);
            continue;
        };
        *slot = Some(match tokens.next() {
            Some(path) => Target::Path(PathBuf::from(path)),
            None => Target::Missing,
        });
    }

    (args, redirects)
}

/// Open the stage's redirection files and bind them to stdin/stdout of the
/// calling process. Only meant to run inside a freshly forked context.
pub fn apply(redirects: &Redirects) -> ShellResult<()> {
    if let Some(target) = &redirects.input {
        let path = target_path(target, INPUT_OPERATOR)?;
        let file = File::open(path).map_err(|source| ShellError::Redirection {
            path: path.clone(),
            source,
        })?;
        bind(path, dup2_stdin(&file))?;
    }

    if let Some(target) = &redirects.output {
        let path = target_path(target, OUTPUT_OPERATOR)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(OUTPUT_MODE)
            .open(path)
            .map_err(|source| ShellError::Redirection {
                path: path.clone(),
                source,
            })?;
        bind(path, dup2_stdout(&file))?;
    }

    Ok(())
}

fn target_path<'a>(target: &'a Target, operator: &'static str) -> ShellResult<&'a PathBuf> {
    match target {
        Target::Path(path) => Ok(path),
        Target::Missing => Err(ShellError::MissingRedirectTarget(operator)),
    }
}

fn bind(path: &Path, result: nix::Result<()>) -> ShellResult<()> {
    result.map_err(|errno| ShellError::Redirection {
        path: path.to_path_buf(),
        source: errno.into(),
    })
}
