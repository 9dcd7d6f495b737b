use crate::command::{is_blank, Stage};
use crate::errors::{ShellError, ShellResult};
use crate::redirects;
use colored::Colorize;
use log::{debug, warn};
use nix::sys::wait::waitpid;
use nix::unistd::{dup2_stdin, dup2_stdout, fork, pipe, ForkResult, Pid};
use std::os::fd::OwnedFd;

pub const PIPE_OPERATOR: u8 = b'|';

/// What to do when a stage redirects a stream that a pipe also connects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// The file is still opened, then the pipe replaces it.
    #[default]
    PipeWins,
    /// Refuse to run the pipeline at all.
    Exclusive,
}

/// Split user input into stage texts
/// e.g., "ls -l | grep rshell | wc -l" -> ["ls -l ", " grep rshell ", " wc -l"]
pub fn split_pipeline(input: &[u8]) -> Vec<&[u8]> {
    input.split(|&byte| byte == PIPE_OPERATOR).collect()
}

/// Every stage parsed from one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Blank input gives an empty pipeline. Anything else gives one stage per
    /// `|`-separated segment, including empty ones.
    pub fn parse(input: &[u8]) -> Self {
        if is_blank(input) {
            return Self::default();
        }

        Self {
            stages: split_pipeline(input).into_iter().map(Stage::parse).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Number of pipes needed to connect the stages.
    pub fn channel_count(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Find redirections that a pipe will override: input on any stage but the
    /// first, output on any stage but the last.
    pub fn check_redirects(&self, policy: RedirectPolicy) -> ShellResult<()> {
        let last = self.channel_count();
        for (i, stage) in self.stages.iter().enumerate() {
            let conflicts = [
                ("input", i > 0 && stage.redirects.input.is_some()),
                ("output", i < last && stage.redirects.output.is_some()),
            ];
            for (stream, conflict) in conflicts {
                if !conflict {
                    continue;
                }
                match policy {
                    RedirectPolicy::PipeWins => {
                        debug!("stage {}: {} redirection superseded by pipe", i + 1, stream)
                    }
                    RedirectPolicy::Exclusive => {
                        return Err(ShellError::RedirectConflict { stage: i + 1, stream })
                    }
                }
            }
        }
        Ok(())
    }
}

/// Both ends of one inter-stage pipe.
struct Channel {
    read: OwnedFd,
    write: OwnedFd,
}

fn open_channels(count: usize) -> ShellResult<Vec<Channel>> {
    (0..count)
        .map(|_| {
            let (read, write) = pipe().map_err(ShellError::Channel)?;
            Ok(Channel { read, write })
        })
        .collect()
}

/// Execute a pipeline of commands
/// Connects stdout of each command to stdin of the next and blocks until
/// every spawned process has exited. Exit statuses are not inspected.
pub fn run_pipeline(pipeline: &Pipeline, policy: RedirectPolicy) -> ShellResult<()> {
    if pipeline.is_empty() {
        return Ok(());
    }
    pipeline.check_redirects(policy)?;

    let count = pipeline.len();
    let mut channels = open_channels(pipeline.channel_count())?;
    debug!("running {} stage(s) over {} pipe(s)", count, channels.len());

    let mut children = Vec::with_capacity(count);
    for (i, stage) in pipeline.stages.iter().enumerate() {
        // SAFETY: the child only touches its own copies of `stage` and
        // `channels` before exec or `_exit`.
        match unsafe { fork() }.map_err(ShellError::Spawn)? {
            ForkResult::Parent { child } => {
                debug!("spawned {} for stage {}: {:?}", child, i + 1, stage.argv);
                children.push(child);
            }
            ForkResult::Child => run_stage(stage, i, count, std::mem::take(&mut channels)),
        }
    }

    // The parent keeps no pipe end once every stage holds its own.
    drop(channels);

    wait_all(&children);
    Ok(())
}

/// Body of a spawned context. Never returns: either the program image is
/// replaced or the context exits with status 1.
fn run_stage(stage: &Stage, index: usize, count: usize, channels: Vec<Channel>) -> ! {
    let err = match connect(stage, index, count, channels) {
        Ok(()) => stage.exec(),
        Err(e) => e,
    };
    eprintln!("{}", err.to_string().red());
    // SAFETY: `_exit` skips the parent's atexit handlers and stdio buffers,
    // which this forked copy must not run.
    unsafe { libc::_exit(1) }
}

/// File redirections first, then pipe ends on top of them. Consumes the
/// channel list so every inherited pipe descriptor is closed on return.
fn connect(stage: &Stage, index: usize, count: usize, channels: Vec<Channel>) -> ShellResult<()> {
    redirects::apply(&stage.redirects)?;

    if index > 0 {
        bind_pipe("stdin", dup2_stdin(&channels[index - 1].read))?;
    }
    if index + 1 < count {
        bind_pipe("stdout", dup2_stdout(&channels[index].write))?;
    }

    drop(channels);
    Ok(())
}

fn bind_pipe(stream: &'static str, result: nix::Result<()>) -> ShellResult<()> {
    result.map_err(|source| ShellError::Bind { stream, source })
}

fn wait_all(children: &[Pid]) {
    for &pid in children {
        match waitpid(pid, None) {
            Ok(status) => debug!("reaped {}: {:?}", pid, status),
            Err(e) => warn!("waitpid({}) failed: {}", pid, e),
        }
    }
}
