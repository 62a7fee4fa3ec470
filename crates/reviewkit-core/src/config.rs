use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Longest default countdown accepted from the environment, about a century.
const MAX_COUNTDOWN_DAYS: u32 = 36_500;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; absent ones fall back to [`AppConfig::default`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let defaults = AppConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    let to_usize = |var: &str, value: u64| -> Result<usize, ConfigError> {
        usize::try_from(value).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("REVIEWKIT_ENV", "development"))?;
    let log_level = or_default("REVIEWKIT_LOG_LEVEL", &defaults.log_level);

    let path_or_default = |var: &str, default: &PathBuf| -> PathBuf {
        lookup(var).map_or_else(|_| default.clone(), PathBuf::from)
    };
    let store_path = path_or_default("REVIEWKIT_STORE_PATH", &defaults.store_path);
    let sites_path = path_or_default("REVIEWKIT_SITES_PATH", &defaults.sites_path);
    let backup_dir = path_or_default("REVIEWKIT_BACKUP_DIR", &defaults.backup_dir);

    let countdown_days = parse_num(
        "REVIEWKIT_COUNTDOWN_DAYS",
        u64::from(defaults.countdown_default_days),
    )?;
    let countdown_default_days =
        u32::try_from(countdown_days).map_err(|e| ConfigError::InvalidEnvVar {
            var: "REVIEWKIT_COUNTDOWN_DAYS".to_string(),
            reason: e.to_string(),
        })?;
    if countdown_default_days == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVIEWKIT_COUNTDOWN_DAYS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if countdown_default_days > MAX_COUNTDOWN_DAYS {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVIEWKIT_COUNTDOWN_DAYS".to_string(),
            reason: format!("must be at most {MAX_COUNTDOWN_DAYS}"),
        });
    }

    let capacity = parse_num(
        "REVIEWKIT_CLICK_LOG_CAPACITY",
        defaults.click_log_capacity as u64,
    )?;
    let click_log_capacity = to_usize("REVIEWKIT_CLICK_LOG_CAPACITY", capacity)?;
    if click_log_capacity == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVIEWKIT_CLICK_LOG_CAPACITY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let min_chars = parse_num(
        "REVIEWKIT_MIN_COMMENT_CHARS",
        defaults.min_comment_chars as u64,
    )?;
    let min_comment_chars = to_usize("REVIEWKIT_MIN_COMMENT_CHARS", min_chars)?;

    let baseline_ratings = parse_num("REVIEWKIT_BASELINE_RATINGS", defaults.baseline_ratings)?;
    let seeded_comments = parse_num("REVIEWKIT_SEEDED_COMMENTS", defaults.seeded_comments)?;
    let backup_interval_secs =
        parse_num("REVIEWKIT_BACKUP_INTERVAL_SECS", defaults.backup_interval_secs)?;
    let page_url = or_default("REVIEWKIT_PAGE_URL", &defaults.page_url);

    Ok(AppConfig {
        env,
        log_level,
        store_path,
        sites_path,
        backup_dir,
        countdown_default_days,
        click_log_capacity,
        min_comment_chars,
        baseline_ratings,
        seeded_comments,
        backup_interval_secs,
        page_url,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVIEWKIT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
