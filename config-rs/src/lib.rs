//! config-rs/lib.rs
//! Shared configuration utilities for consistent service configuration
//! Provides standardized functions for port/address/data-source management

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "TRAJECTORY")
/// * `default_port` - The default port to use if not specified in environment
///
/// # Returns
/// The port number to use for the service
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    env::var(&var_name)
        .unwrap_or_else(|_| default_port.to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        })
}

/// Create a SocketAddr for binding a service
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "TRAJECTORY")
/// * `default_port` - The default port to use if not specified in environment
///
/// # Returns
/// A SocketAddr configured with the appropriate bind address and port
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    // Check if there's a full address override
    if let Ok(addr_str) = env::var(&var_name) {
        if let Ok(addr) = addr_str.parse::<SocketAddr>() {
            return addr;
        } else {
            log::warn!("Invalid address format in {}, using default", var_name);
        }
    }

    // Use the port from environment or default
    let port = get_service_port(service_name, default_port);
    format!("0.0.0.0:{}", port).parse().unwrap()
}

/// One configured trajectory data source: a path, optionally pinned to an
/// explicit format name instead of auto-detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub path: PathBuf,
    pub format: Option<String>,
}

/// Parse the data-source list from the environment.
///
/// `TRAJECTORY_DATA_SOURCES` is a comma-separated list of entries, each either
/// a bare path or `path=format` to pin the adapter explicitly:
///
/// ```text
/// TRAJECTORY_DATA_SOURCES=./alfworld_expert_traj,./rebel_coldstart_clean.json=rebel_json
/// ```
///
/// Entries are returned in configured order; empty entries are dropped.
pub fn get_data_sources() -> Vec<DataSource> {
    let raw = env::var("TRAJECTORY_DATA_SOURCES").unwrap_or_default();
    parse_data_sources(&raw)
}

/// Parse a comma-separated source list (exposed for testing).
pub fn parse_data_sources(raw: &str) -> Vec<DataSource> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((path, format)) => DataSource {
                path: PathBuf::from(path.trim()),
                format: Some(format.trim().to_string()),
            },
            None => DataSource {
                path: PathBuf::from(entry),
                format: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_service_port() {
        // Test with environment variable
        std::env::set_var("TEST_SERVICE_PORT", "9000");
        assert_eq!(get_service_port("TEST", 8000), 9000);

        // Test with default
        std::env::remove_var("UNKNOWN_SERVICE_PORT");
        assert_eq!(get_service_port("UNKNOWN", 8000), 8000);
    }

    #[test]
    fn test_parse_data_sources() {
        let sources = parse_data_sources("./data/alfworld, ./data/rebel.json=rebel_json");
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].path, PathBuf::from("./data/alfworld"));
        assert_eq!(sources[0].format, None);
        assert_eq!(sources[1].path, PathBuf::from("./data/rebel.json"));
        assert_eq!(sources[1].format.as_deref(), Some("rebel_json"));
    }

    #[test]
    fn test_parse_data_sources_empty() {
        assert!(parse_data_sources("").is_empty());
        assert!(parse_data_sources(" , ,").is_empty());
    }
}
