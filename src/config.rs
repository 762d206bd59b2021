use crate::upstream::UpstreamConfig;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub is_dev: bool,
    /// Whole-request timeout for origin fetches, in seconds (default: 30)
    pub upstream_timeout_secs: u64,
    /// Connect timeout for origin fetches, in seconds (default: 10)
    pub upstream_connect_timeout_secs: u64,
    /// Static channel catalog served at `/api/channels` (optional)
    pub channels_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In DEV mode, provides sensible defaults. In PROD mode, `PORT` is required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        // Port: required in prod, defaults to 3000 in dev
        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        let upstream_timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|e| format!("Invalid UPSTREAM_TIMEOUT_SECS: {e}"))?;

        let upstream_connect_timeout_secs = env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|e| format!("Invalid UPSTREAM_CONNECT_TIMEOUT_SECS: {e}"))?;

        let channels_path = env::var("CHANNELS_PATH").ok().filter(|p| !p.is_empty());

        Ok(Config {
            port,
            is_dev,
            upstream_timeout_secs,
            upstream_connect_timeout_secs,
            channels_path,
        })
    }

    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            timeout: Duration::from_secs(self.upstream_timeout_secs),
            connect_timeout: Duration::from_secs(self.upstream_connect_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serialize all env-var tests to prevent races between parallel test threads.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Set env vars, run `f`, then restore original state.
    ///
    /// `set` — vars to set; `unset` — vars to remove before running `f`.
    fn with_env(set: &[(&str, &str)], unset: &[&str], f: impl FnOnce()) {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());

        let save_set: Vec<(&str, Option<String>)> = set
            .iter()
            .map(|(k, _)| (*k, std::env::var(k).ok()))
            .collect();
        let save_unset: Vec<(&str, Option<String>)> =
            unset.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        for (k, v) in set {
            // SAFETY: serialized by ENV_LOCK — no other thread modifies env vars concurrently.
            unsafe { std::env::set_var(k, v) };
        }
        for k in unset {
            unsafe { std::env::remove_var(k) };
        }

        f();

        for (k, old) in save_set.into_iter().chain(save_unset) {
            match old {
                Some(v) => unsafe { std::env::set_var(k, v) },
                None => unsafe { std::env::remove_var(k) },
            }
        }
    }

    #[test]
    fn dev_mode_uses_defaults() {
        with_env(
            &[("DEV_MODE", "true")],
            &[
                "PORT",
                "UPSTREAM_TIMEOUT_SECS",
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
                "CHANNELS_PATH",
            ],
            || {
                let config = Config::from_env().expect("should succeed in dev mode");
                assert!(config.is_dev);
                assert_eq!(config.port, 3000);
                assert_eq!(config.upstream_timeout_secs, 30);
                assert_eq!(config.upstream_connect_timeout_secs, 10);
                assert_eq!(config.channels_path, None);
            },
        );
    }

    #[test]
    fn prod_mode_requires_port() {
        with_env(&[], &["DEV_MODE", "PORT"], || {
            let result = Config::from_env();
            assert!(result.is_err(), "Should fail without PORT in prod mode");
        });
    }

    #[test]
    fn prod_mode_with_port() {
        with_env(&[("PORT", "8080")], &["DEV_MODE"], || {
            let config = Config::from_env().unwrap();
            assert!(!config.is_dev);
            assert_eq!(config.port, 8080);
        });
    }

    #[test]
    fn invalid_port_is_rejected() {
        with_env(&[("DEV_MODE", "true"), ("PORT", "not-a-port")], &[], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn upstream_timeouts_parsed() {
        with_env(
            &[
                ("DEV_MODE", "true"),
                ("UPSTREAM_TIMEOUT_SECS", "5"),
                ("UPSTREAM_CONNECT_TIMEOUT_SECS", "2"),
            ],
            &[],
            || {
                let config = Config::from_env().unwrap();
                let upstream = config.upstream();
                assert_eq!(upstream.timeout, Duration::from_secs(5));
                assert_eq!(upstream.connect_timeout, Duration::from_secs(2));
            },
        );
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        with_env(
            &[("DEV_MODE", "true"), ("UPSTREAM_TIMEOUT_SECS", "soon")],
            &[],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn channels_path_read_when_set() {
        with_env(
            &[("DEV_MODE", "true"), ("CHANNELS_PATH", "/srv/channels.json")],
            &[],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.channels_path.as_deref(), Some("/srv/channels.json"));
            },
        );
    }

    #[test]
    fn empty_channels_path_is_none() {
        with_env(&[("DEV_MODE", "true"), ("CHANNELS_PATH", "")], &[], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.channels_path, None);
        });
    }
}
