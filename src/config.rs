use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("no page URL configured")]
    EmptyPageUrl,
    #[error("poll interval must be at least one second")]
    ZeroInterval,
    #[error("tool not found at {0}")]
    ToolNotFound(PathBuf),
}

/// Runtime configuration, validated once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the page believed to host a livestream.
    pub page_url: String,
    /// Time between livestream checks.
    pub poll_interval: Duration,
    /// Give up after this many checks. `None` polls forever. At least one
    /// check is always made.
    pub max_attempts: Option<u32>,
    /// Double the wait after every missed check.
    pub backoff: bool,
    /// File the stream is recorded into.
    pub output: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub ytdlp_path: PathBuf,
    /// Extra arguments passed through to yt-dlp verbatim (cookies, user
    /// agent overrides, ...).
    pub ytdlp_args: Vec<String>,
    /// How long a single yt-dlp invocation may run before it is killed.
    pub resolve_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_url: String::new(),
            poll_interval: Duration::from_secs(30),
            max_attempts: None,
            backoff: false,
            output: PathBuf::from("recorded_stream.mp4"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ytdlp_path: PathBuf::from("yt-dlp"),
            ytdlp_args: Vec::new(),
            resolve_timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_url.trim().is_empty() {
            return Err(ConfigError::EmptyPageUrl);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        check_tool_path(&self.ytdlp_path)?;
        check_tool_path(&self.ffmpeg_path)?;
        Ok(())
    }
}

// Bare program names are resolved through PATH at spawn time; only explicit
// paths can be checked up front.
fn check_tool_path(path: &Path) -> Result<(), ConfigError> {
    if path.components().count() > 1 && !path.exists() {
        return Err(ConfigError::ToolNotFound(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            page_url: "https://www.youtube.com/@NASA/live".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn default_page_url_is_rejected() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPageUrl));

        let config = Config {
            page_url: "   ".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::EmptyPageUrl
        ));
    }

    #[test]
    fn valid_config_passes() {
        valid_config().validate().expect("config should validate");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = Config {
            poll_interval: Duration::ZERO,
            ..valid_config()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::ZeroInterval
        ));
    }

    #[test]
    fn missing_explicit_tool_path_is_rejected() {
        let config = Config {
            ffmpeg_path: PathBuf::from("/nonexistent/bin/ffmpeg"),
            ..valid_config()
        };
        match config.validate().unwrap_err() {
            ConfigError::ToolNotFound(path) => {
                assert_eq!(path, PathBuf::from("/nonexistent/bin/ffmpeg"))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn bare_tool_names_are_left_to_path_lookup() {
        let config = Config {
            ytdlp_path: PathBuf::from("definitely-not-installed"),
            ..valid_config()
        };
        config.validate().expect("bare names are not checked");
    }
}
