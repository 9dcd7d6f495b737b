use clap::Parser;
use colored::Colorize;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::process;

mod command;
mod config;
mod errors;
mod pipes;
mod prompt;
mod redirects;
mod shell;

use config::Config;
use shell::Shell;

fn main() {
    let config = Config::parse();

    let color = if config.no_color {
        colored::control::set_override(false);
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    // Fails only when a logger is already installed.
    let _ = TermLogger::init(
        config.log_level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        color,
    );

    let mut shell = Shell::new(&config);
    if let Err(e) = shell.run() {
        eprintln!("{}", e.to_string().red());
        process::exit(1);
    }
}
