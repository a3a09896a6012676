use std::{fmt, path::Path, time::Duration};

use log::LevelFilter;
use url::Url;

use crate::{Error, Result, TransportProfile};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/";
pub const DEFAULT_ROUTER_URL: &str = "https://router.project-osrm.org/";
pub const DEFAULT_USER_AGENT: &str = concat!("route-planner/", env!("CARGO_PKG_VERSION"));
/// Nominatim's usage policy allows one request per second.
pub const DEFAULT_GEOCODE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ADDRESSES: usize = 10;

/// User-facing route settings. Persisted by the host application, never here.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settings {
    pub profile: TransportProfile,
    pub optimization_enabled: bool,
    pub max_addresses: usize,
    pub auto_geocode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: TransportProfile::Driving,
            optimization_enabled: true,
            max_addresses: DEFAULT_MAX_ADDRESSES,
            auto_geocode: true,
        }
    }
}

/// Runtime options for the planner, its service adapters and logging.
#[derive(Clone, Debug)]
pub struct PlannerOptions {
    /// Base URL of a Nominatim-compatible geocoding service.
    pub geocoder_url: String,
    /// Base URL of an OSRM-compatible routing service.
    pub router_url: String,
    /// `User-Agent` sent with every request. Nominatim rejects anonymous clients.
    pub user_agent: String,
    /// Transport-level timeout for a single HTTP request.
    pub request_timeout_secs: u64,
    /// Pause between sequential batch geocoding requests.
    pub geocode_delay_ms: u64,
    pub settings: Settings,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub log_timestamp: bool,
    /// Optional log file path. Empty means stderr.
    pub log_output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            "off" => Ok(Self::Off),
            other => Err(Error::invalid_input(format!(
                "invalid value for --log-level: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(Error::invalid_input(format!(
                "invalid value for --log-format: {other}"
            ))),
        }
    }
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            router_url: DEFAULT_ROUTER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            geocode_delay_ms: DEFAULT_GEOCODE_DELAY_MS,
            settings: Settings::default(),
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
        }
    }
}

impl PlannerOptions {
    pub fn validate(&self) -> Result<()> {
        parse_base_url("geocoder-url", &self.geocoder_url)?;
        parse_base_url("router-url", &self.router_url)?;
        if self.user_agent.trim().is_empty() {
            return Err(Error::invalid_input("user-agent must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::invalid_input("request-timeout must be > 0"));
        }
        if self.settings.max_addresses < 2 {
            return Err(Error::invalid_input("max-addresses must be >= 2"));
        }
        Ok(())
    }

    pub fn geocoder_base(&self) -> Result<Url> {
        parse_base_url("geocoder-url", &self.geocoder_url)
    }

    pub fn router_base(&self) -> Result<Url> {
        parse_base_url("router-url", &self.router_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn geocode_delay(&self) -> Duration {
        Duration::from_millis(self.geocode_delay_ms)
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        if self.log_output.trim().is_empty() {
            None
        } else {
            Some(Path::new(&self.log_output))
        }
    }
}

/// Parses a service base URL, forcing a trailing slash so relative joins keep
/// any path prefix.
fn parse_base_url(name: &str, raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| Error::invalid_input(format!("invalid {name} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::invalid_input(format!(
            "invalid {name} '{raw}': unsupported scheme {other}"
        ))),
    }
}

impl fmt::Display for PlannerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "geocoder_url={} router_url={} profile={} optimization={} max_addresses={} \
             auto_geocode={} geocode_delay_ms={} timeout_s={}",
            self.geocoder_url,
            self.router_url,
            self.settings.profile,
            self.settings.optimization_enabled,
            self.settings.max_addresses,
            self.settings.auto_geocode,
            self.geocode_delay_ms,
            self.request_timeout_secs,
        )
    }
}
