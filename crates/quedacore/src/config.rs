use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: quedabot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "quedabot.log".to_string()));

/// Default currency assumed when the organizer types a bare amount
/// at the price step ("1500" → 1500 EUR).
/// Read from DEFAULT_CURRENCY environment variable
pub static DEFAULT_CURRENCY: Lazy<String> =
    Lazy::new(|| env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "EUR".to_string()).to_uppercase());

/// Backend REST API configuration
pub mod api {
    use once_cell::sync::Lazy;
    use std::env;
    use std::time::Duration;

    /// Base URL of the event platform's REST API
    /// Read from API_BASE_URL environment variable
    /// Default: http://localhost:8080/api
    pub static BASE_URL: Lazy<String> =
        Lazy::new(|| env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080/api".to_string()));

    /// Request timeout for API calls (in seconds)
    /// Read from API_TIMEOUT_SECS environment variable
    /// Default: 30
    pub static TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30)
    });

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*TIMEOUT_SECS)
    }
}

/// Data-source mode: where event data comes from
pub mod data {
    use once_cell::sync::Lazy;
    use std::env;

    /// One of "api" (live REST backend) or "file" (local JSON seed,
    /// used for demos and development without a running backend).
    /// Read from DATA_MODE environment variable
    /// Default: api
    pub static MODE: Lazy<String> = Lazy::new(|| {
        env::var("DATA_MODE")
            .unwrap_or_else(|_| "api".to_string())
            .to_lowercase()
    });

    /// Seed file for file mode
    /// Read from DATA_FILE environment variable
    /// Default: datos.json
    pub static FILE: Lazy<String> = Lazy::new(|| env::var("DATA_FILE").unwrap_or_else(|_| "datos.json".to_string()));
}

/// Idle-state expiry configuration
pub mod expiry {
    use once_cell::sync::Lazy;
    use std::env;
    use std::time::Duration;

    /// Minutes a login session may sit idle before the sweeper evicts it
    /// Read from SESSION_TTL_MINUTES environment variable
    /// Default: 1440 (24 h)
    pub static SESSION_TTL_MINUTES: Lazy<u64> = Lazy::new(|| {
        env::var("SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1440)
    });

    /// Minutes a wizard may sit idle before it is discarded
    /// Read from WIZARD_TTL_MINUTES environment variable
    /// Default: 30
    pub static WIZARD_TTL_MINUTES: Lazy<u64> = Lazy::new(|| {
        env::var("WIZARD_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30)
    });

    /// Interval between sweeper passes (in seconds)
    /// Read from CLEANUP_INTERVAL_SECS environment variable
    /// Default: 60
    pub static CLEANUP_INTERVAL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("CLEANUP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60)
    });

    /// Session idle TTL duration
    pub fn session_ttl() -> Duration {
        Duration::from_secs(*SESSION_TTL_MINUTES * 60)
    }

    /// Wizard idle TTL duration
    pub fn wizard_ttl() -> Duration {
        Duration::from_secs(*WIZARD_TTL_MINUTES * 60)
    }

    /// Sweep interval duration
    pub fn cleanup_interval() -> Duration {
        Duration::from_secs(*CLEANUP_INTERVAL_SECS)
    }
}

/// Dispatcher retry configuration
pub mod retry {
    use std::time::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }
}

/// Network configuration for the Telegram client itself
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
