//! Runtime configuration assembled from command-line flags and environment

use std::time::Duration;

use crate::error::{Error, Result};

pub(crate) const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_DAYS: u32 = 7;

/// Extra distance around the viewport that still counts as "about to be seen"
pub(crate) const DEFAULT_VIEWPORT_MARGIN: u32 = 200;
pub(crate) const DEFAULT_VIEWPORT_HEIGHT: u32 = 900;

/// Items per lazily loaded history page
pub(crate) const DEFAULT_PAGE_SIZE: usize = 3;
pub(crate) const MAX_PAGE_SIZE: u64 = 1000;

pub(crate) struct Config {
    pub(crate) api_base: String,
    pub(crate) timeout: Duration,
    pub(crate) viewport: Viewport,
}

/// Visible window of the dashboard, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) height: u32,
    pub(crate) margin: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            height: DEFAULT_VIEWPORT_HEIGHT,
            margin: DEFAULT_VIEWPORT_MARGIN,
        }
    }
}

impl Config {
    pub(crate) fn new(api_base: &str, timeout_secs: u64) -> Result<Self> {
        let api_base = api_base.trim().trim_end_matches('/').to_string();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(Error::Config(format!(
                "API base must be an http(s) URL, got '{}'",
                api_base
            )));
        }
        if timeout_secs == 0 {
            return Err(Error::Config("timeout must be positive".to_string()));
        }

        Ok(Self {
            api_base,
            timeout: Duration::from_secs(timeout_secs),
            viewport: Viewport::default(),
        })
    }

    pub(crate) fn with_viewport(mut self, height: u32, margin: u32) -> Self {
        self.viewport = Viewport { height, margin };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = Config::new("http://tracker.local:8000/", 5).unwrap();
        assert_eq!(config.api_base, "http://tracker.local:8000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_non_http_base_rejected() {
        assert!(Config::new("tracker.local", 5).is_err());
        assert!(Config::new("ftp://tracker.local", 5).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Config::new(DEFAULT_API_BASE, 0).is_err());
    }

    #[test]
    fn test_defaults_within_bounds() {
        assert!(DEFAULT_DAYS >= 1);
        assert!((1..=MAX_PAGE_SIZE).contains(&(DEFAULT_PAGE_SIZE as u64)));
        let config = Config::new(DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS).unwrap();
        assert_eq!(config.viewport, Viewport::default());
    }

    #[test]
    fn test_viewport_override() {
        let config = Config::new(DEFAULT_API_BASE, 5)
            .unwrap()
            .with_viewport(600, 50);
        assert_eq!(
            config.viewport,
            Viewport {
                height: 600,
                margin: 50
            }
        );
    }
}
