use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub request_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let request_path = std::env::var("SKILL_FORGE_REQUEST")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self {
            log_level,
            request_path,
        }
    }

    /// A path given on the command line wins over the environment.
    pub fn with_request_arg(mut self, arg: Option<String>) -> Self {
        if let Some(path) = arg.filter(|value| !value.trim().is_empty()) {
            self.request_path = Some(PathBuf::from(path));
        }
        self
    }
}
