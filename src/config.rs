use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::is_six_digit_pincode;

/// Complete application configuration, loaded from environment variables or
/// default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub warehouse: WarehouseConfig,
    pub carrier: CarrierConfig,
    /// Optional JSON snapshot of seller companies to preload.
    pub sellers_file: Option<PathBuf>,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment
    /// variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            warehouse: WarehouseConfig::from_env(),
            carrier: CarrierConfig::from_env(),
            sellers_file: env_string("CARTONIZE_SELLERS_FILE").map(PathBuf::from),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;

    fn from_env() -> Self {
        let host_value =
            env_string("CARTONIZE_API_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse CARTONIZE_API_HOST ('{}'): {}. Using {}.",
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    Self::DEFAULT_HOST
                        .parse::<IpAddr>()
                        .expect("Default host must be valid"),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string("CARTONIZE_API_PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    eprintln!(
                        "⚠️ CARTONIZE_API_PORT must not be 0. Using {}.",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    eprintln!(
                        "⚠️ Could not parse CARTONIZE_API_PORT ('{}'): {}. Using {}.",
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Fallback constants for incomplete address data.
///
/// These are business defaults tied to the operator's home warehouse, so
/// they are configuration rather than derived logic.
#[derive(Clone, Debug)]
pub struct WarehouseConfig {
    pub default_pincode: String,
    pub default_city: String,
    pub default_state: String,
    pub default_street: String,
    pub default_country: String,
}

impl WarehouseConfig {
    const DEFAULT_PINCODE: &'static str = "560068";
    const DEFAULT_CITY: &'static str = "Bengaluru";
    const DEFAULT_STATE: &'static str = "Karnataka";
    const DEFAULT_STREET: &'static str = "139/2 Hosur Road, Bommanahalli";
    const DEFAULT_COUNTRY: &'static str = "India";

    fn from_env() -> Self {
        Self {
            default_pincode: pincode_or_default(
                env_string("CARTONIZE_PICKUP_PINCODE"),
                Self::DEFAULT_PINCODE,
            ),
            default_city: env_string("CARTONIZE_PICKUP_CITY")
                .unwrap_or_else(|| Self::DEFAULT_CITY.to_string()),
            default_state: env_string("CARTONIZE_PICKUP_STATE")
                .unwrap_or_else(|| Self::DEFAULT_STATE.to_string()),
            default_street: env_string("CARTONIZE_PICKUP_STREET")
                .unwrap_or_else(|| Self::DEFAULT_STREET.to_string()),
            default_country: env_string("CARTONIZE_PICKUP_COUNTRY")
                .unwrap_or_else(|| Self::DEFAULT_COUNTRY.to_string()),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            default_pincode: Self::DEFAULT_PINCODE.to_string(),
            default_city: Self::DEFAULT_CITY.to_string(),
            default_state: Self::DEFAULT_STATE.to_string(),
            default_street: Self::DEFAULT_STREET.to_string(),
            default_country: Self::DEFAULT_COUNTRY.to_string(),
        }
    }
}

/// Configuration for the Hexalog carrier client.
#[derive(Clone, Debug)]
pub struct CarrierConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl CarrierConfig {
    const DEFAULT_BASE_URL: &'static str = "https://api.hexalog.in";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    fn from_env() -> Self {
        Self {
            base_url: env_string("CARTONIZE_HEXALOG_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            api_key: env_string("CARTONIZE_HEXALOG_API_KEY"),
            timeout: timeout_or_default(
                env_string("CARTONIZE_HTTP_TIMEOUT_SECS"),
                Self::DEFAULT_TIMEOUT_SECS,
            ),
        }
    }
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn pincode_or_default(raw: Option<String>, default: &str) -> String {
    match raw {
        Some(value) if is_six_digit_pincode(&value) => value,
        Some(value) => {
            eprintln!(
                "⚠️ CARTONIZE_PICKUP_PINCODE ('{}') is not a 6-digit pincode. Using {}.",
                value, default
            );
            default.to_string()
        }
        None => default.to_string(),
    }
}

fn timeout_or_default(raw: Option<String>, default_secs: u64) -> Duration {
    match raw {
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            Ok(_) => {
                eprintln!(
                    "⚠️ CARTONIZE_HTTP_TIMEOUT_SECS must not be 0. Using {}s.",
                    default_secs
                );
                Duration::from_secs(default_secs)
            }
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse CARTONIZE_HTTP_TIMEOUT_SECS ('{}'): {}. Using {}s.",
                    value, err, default_secs
                );
                Duration::from_secs(default_secs)
            }
        },
        None => Duration::from_secs(default_secs),
    }
}
