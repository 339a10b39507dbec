use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub backend_url: String,
    pub probe_url: String,
    pub probe_interval: Duration,
    pub probe_timeout: Duration,
    pub replay_timeout: Duration,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_or("SIGNALEMENT_DATABASE_URL", "sqlite://signalement-queue.db");
        let backend_url = env_or("SIGNALEMENT_BACKEND_URL", "http://localhost:8080/api/auth");
        let probe_url = env_or("SIGNALEMENT_PROBE_URL", "https://www.google.com/favicon.ico");

        let probe_interval: u64 = env_or("SIGNALEMENT_PROBE_INTERVAL_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid SIGNALEMENT_PROBE_INTERVAL_SECS: {e}"))?;

        let probe_timeout: u64 = env_or("SIGNALEMENT_PROBE_TIMEOUT_MS", "2500")
            .parse()
            .map_err(|e| format!("Invalid SIGNALEMENT_PROBE_TIMEOUT_MS: {e}"))?;

        let replay_timeout: u64 = env_or("SIGNALEMENT_REPLAY_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid SIGNALEMENT_REPLAY_TIMEOUT_SECS: {e}"))?;

        let host: IpAddr = env_or("SIGNALEMENT_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| format!("Invalid SIGNALEMENT_HOST: {e}"))?;

        let port: u16 = env_or("SIGNALEMENT_PORT", "3100")
            .parse()
            .map_err(|e| format!("Invalid SIGNALEMENT_PORT: {e}"))?;

        let log_level = env_or("SIGNALEMENT_LOG_LEVEL", "info");

        let config = Config {
            database_url,
            backend_url,
            probe_url,
            probe_interval: Duration::from_secs(probe_interval),
            probe_timeout: Duration::from_millis(probe_timeout),
            replay_timeout: Duration::from_secs(replay_timeout),
            host,
            port,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the agent spin or fail every replay.
    pub fn validate(&self) -> Result<(), String> {
        if self.probe_interval.is_zero() {
            return Err("SIGNALEMENT_PROBE_INTERVAL_SECS must be greater than zero".to_string());
        }
        if self.replay_timeout.is_zero() {
            return Err("SIGNALEMENT_REPLAY_TIMEOUT_SECS must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
