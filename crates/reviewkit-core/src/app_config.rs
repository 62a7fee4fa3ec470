use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// JSON file standing in for the browser profile's local storage.
    pub store_path: PathBuf,
    pub sites_path: PathBuf,
    pub backup_dir: PathBuf,
    /// Length of a freshly created countdown window.
    pub countdown_default_days: u32,
    pub click_log_capacity: usize,
    pub min_comment_chars: usize,
    /// Ratings shown on the page before any visitor rated; added to the
    /// stored count for display and used as the `total_reviews` reset value.
    pub baseline_ratings: u64,
    /// Demo comments rendered statically on the page.
    pub seeded_comments: u64,
    pub backup_interval_secs: u64,
    /// Used as the click url when a tracked link carries none.
    pub page_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            log_level: "info".to_string(),
            store_path: PathBuf::from("./data/reviewkit.json"),
            sites_path: PathBuf::from("./config/sites.yaml"),
            backup_dir: PathBuf::from("./data/backups"),
            countdown_default_days: 30,
            click_log_capacity: 1000,
            min_comment_chars: 10,
            baseline_ratings: 22,
            seeded_comments: 4,
            backup_interval_secs: 30,
            page_url: "https://example.com/".to_string(),
        }
    }
}
