use crate::pipes::RedirectPolicy;
use clap::Parser;
use log::LevelFilter;

/// Shell command line arguments
#[derive(Parser, Debug)]
#[command(name = "pipesh", version)]
#[command(about = "A small shell that runs pipelines of external programs", long_about = None)]
pub struct Config {
    /// Refuse pipelines where a file redirection collides with a pipe
    #[arg(long)]
    pub strict_redirects: bool,

    /// Line that ends the session
    #[arg(long, value_name = "WORD", default_value = "exit")]
    pub exit_command: String,

    /// Diagnostics written to stderr (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,

    /// Disable colored prompt and error messages
    #[arg(long)]
    pub no_color: bool,
}

impl Config {
    pub fn redirect_policy(&self) -> RedirectPolicy {
        if self.strict_redirects {
            RedirectPolicy::Exclusive
        } else {
            RedirectPolicy::PipeWins
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["pipesh"]).unwrap();
        assert_eq!(config.redirect_policy(), RedirectPolicy::PipeWins);
        assert_eq!(config.exit_command, "exit");
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert!(!config.no_color);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "pipesh",
            "--strict-redirects",
            "--exit-command",
            "quit",
            "--log-level",
            "debug",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(config.redirect_policy(), RedirectPolicy::Exclusive);
        assert_eq!(config.exit_command, "quit");
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.no_color);
    }

    #[test]
    fn test_bad_level_rejected() {
        assert!(Config::try_parse_from(["pipesh", "--log-level", "loud"]).is_err());
    }
}
