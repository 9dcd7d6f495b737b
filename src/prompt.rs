use colored::Colorize;
use std::env;

pub struct Prompt {
    user: String,
    separator: String,
}

impl Prompt {
    /// Resolve the user name once; `$USER` first, then the account database.
    pub fn new() -> Self {
        let user = env::var("USER")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(whoami::username);
        Self::for_user(user)
    }

    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            separator: String::from("> "),
        }
    }

    pub fn get_string(&self) -> String {
        format!("{}{}", self.user, self.separator).yellow().to_string()
    }
}
