use crate::config::Config;
use crate::errors::ShellResult;
use crate::pipes::{run_pipeline, Pipeline, RedirectPolicy};
use crate::prompt::Prompt;
use colored::Colorize;
use log::debug;
use std::io::{self, BufRead, Write};

pub struct Shell {
    prompt: Prompt,
    exit_command: String,
    policy: RedirectPolicy,
}

impl Shell {
    pub fn new(config: &Config) -> Self {
        Self {
            prompt: Prompt::new(),
            exit_command: config.exit_command.clone(),
            policy: config.redirect_policy(),
        }
    }

    /// Prompt, read and run lines until end of input or the exit command.
    /// Returns early only on errors that leave the shell unusable.
    pub fn run(&mut self) -> ShellResult<()> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut stdout = io::stdout();
        let mut buf = Vec::new();

        loop {
            write!(stdout, "{}", self.prompt.get_string())?;
            stdout.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            if self.is_exit(&buf) {
                break;
            }
            self.execute(&buf)?;
        }

        Ok(())
    }

    fn is_exit(&self, line: &[u8]) -> bool {
        line.strip_suffix(b"\n").unwrap_or(line) == self.exit_command.as_bytes()
    }

    fn execute(&self, line: &[u8]) -> ShellResult<()> {
        let pipeline = Pipeline::parse(line);
        debug!("parsed {:?}", pipeline);

        match run_pipeline(&pipeline, self.policy) {
            Err(e) if !e.is_fatal() => {
                eprintln!("{}", e.to_string().red());
                Ok(())
            }
            result => result,
        }
    }
}
