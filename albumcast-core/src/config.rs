use std::fmt;
use std::time::Duration;

use crate::error::{RelayError, Result};

pub const DEFAULT_GALLERY_HOST: &str = "https://telegra.ph";
pub const DEFAULT_SEND_PAUSE: Duration = Duration::from_secs(25);

/// Credentials and tunables, read once at startup.
#[derive(Clone)]
pub struct Settings {
    pub telegraph_token: String,
    pub telegram_token: String,
    pub chat_id: String,
    pub gallery_host: String,
    pub send_pause: Duration,
    /// Minimum spacing between gallery host calls. Zero disables pacing.
    pub publish_interval: Duration,
    /// Per-request HTTP timeout. `None` leaves requests unbounded.
    pub http_timeout: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| RelayError::Config(format!("{key} must be set")))
        };
        let seconds = |key: &str, default: Duration| -> Result<Duration> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| {
                        RelayError::Config(format!("{key} must be a whole number of seconds, got {raw:?}"))
                    }),
            }
        };

        let optional_seconds = |key: &str| -> Result<Option<Duration>> {
            match lookup(key).filter(|raw| !raw.trim().is_empty()) {
                None => Ok(None),
                Some(_) => seconds(key, Duration::ZERO).map(Some),
            }
        };

        let gallery_host = lookup("ALBUMCAST_GALLERY_HOST")
            .map(|host| host.trim().trim_end_matches('/').to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_GALLERY_HOST.to_string());

        Ok(Self {
            telegraph_token: required("TELEGRAPH_ACCESS_TOKEN")?,
            telegram_token: required("TELEGRAM_ACCESS_TOKEN")?,
            chat_id: required("TELEGRAM_GROUP_ID")?,
            gallery_host,
            send_pause: seconds("ALBUMCAST_SEND_PAUSE_SECS", DEFAULT_SEND_PAUSE)?,
            publish_interval: seconds("ALBUMCAST_PUBLISH_INTERVAL_SECS", Duration::ZERO)?,
            http_timeout: optional_seconds("ALBUMCAST_HTTP_TIMEOUT_SECS")?,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("telegraph_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("gallery_host", &self.gallery_host)
            .field("send_pause", &self.send_pause)
            .field("publish_interval", &self.publish_interval)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("TELEGRAPH_ACCESS_TOKEN", "graph-token"),
        ("TELEGRAM_ACCESS_TOKEN", "123:bot-token"),
        ("TELEGRAM_GROUP_ID", "-1001234"),
    ];

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(settings.chat_id, "-1001234");
        assert_eq!(settings.gallery_host, DEFAULT_GALLERY_HOST);
        assert_eq!(settings.send_pause, DEFAULT_SEND_PAUSE);
        assert_eq!(settings.publish_interval, Duration::ZERO);
        assert_eq!(settings.http_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALBUMCAST_GALLERY_HOST", "https://graph.example.org/"));
        pairs.push(("ALBUMCAST_SEND_PAUSE_SECS", "3"));
        let settings = Settings::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(settings.gallery_host, "https://graph.example.org");
        assert_eq!(settings.send_pause, Duration::from_secs(3));
        assert_eq!(settings.http_timeout, None);
    }

    #[test]
    fn test_publish_interval_and_timeout() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALBUMCAST_PUBLISH_INTERVAL_SECS", "4"));
        pairs.push(("ALBUMCAST_HTTP_TIMEOUT_SECS", "600"));
        let settings = Settings::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(settings.publish_interval, Duration::from_secs(4));
        assert_eq!(settings.http_timeout, Some(Duration::from_secs(600)));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALBUMCAST_HTTP_TIMEOUT_SECS", "forever"));
        assert!(Settings::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_missing_required() {
        let err = Settings::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_GROUP_ID"));

        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("TELEGRAPH_ACCESS_TOKEN", "   ");
        assert!(Settings::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_bad_pause() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALBUMCAST_SEND_PAUSE_SECS", "soon"));
        let err = Settings::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("ALBUMCAST_SEND_PAUSE_SECS"));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let settings = Settings::from_lookup(lookup(&REQUIRED)).unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("bot-token"));
        assert!(!rendered.contains("graph-token"));
    }
}
