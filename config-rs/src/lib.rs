//! config-rs/lib.rs
//! Environment-driven address helpers shared by the RCA desk crates.
//! Provides standardized functions for port/address management

use std::env;
use std::net::{Ipv4Addr, SocketAddr};

/// Name used for the gateway's own `<NAME>_SERVICE_*` variables.
pub const GATEWAY_SERVICE: &str = "RCA_GATEWAY";

/// Name used for the external analysis backend's `<NAME>_SERVICE_*` variables.
pub const ANALYSIS_SERVICE: &str = "ANALYSIS";

/// Load a `.env` file from the working directory if present.
///
/// Missing files are not an error; every variable read by this crate has a default.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(_) => log::debug!("No .env file found, using process environment"),
    }
}

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "RCA_GATEWAY", "ANALYSIS")
/// * `default_port` - The default port to use if not specified in environment
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name) {
        Ok(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        }),
        Err(_) => default_port,
    }
}

/// Create a SocketAddr for binding a service
///
/// `<NAME>_SERVICE_ADDR` may hold either `host:port` or `http://host:port`;
/// anything else falls back to `0.0.0.0:<port>`.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let stripped = addr_str
            .strip_prefix("http://")
            .or_else(|| addr_str.strip_prefix("https://"))
            .unwrap_or(&addr_str);
        match stripped.trim_end_matches('/').parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Get client connection address for connecting to a service
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "ANALYSIS")
/// * `default_port` - The default port to use if not specified in environment
/// * `host` - Optional host to use if not specified in environment (default: "localhost")
///
/// # Returns
/// A base URL without a trailing slash
pub fn get_client_address(service_name: &str, default_port: u16, host: Option<&str>) -> String {
    let addr_var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    // A full address override wins over the port variable
    if let Ok(addr) = env::var(&addr_var_name) {
        return addr.trim_end_matches('/').to_string();
    }

    let port = get_service_port(service_name, default_port);
    let host = host.unwrap_or("localhost");
    format!("http://{}:{}", host, port)
}

/// Return the explicit client address override for a service, if one is set.
pub fn client_address_override(service_name: &str) -> Option<String> {
    let addr_var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());
    let port_var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());

    if env::var(&addr_var_name).is_ok() || env::var(&port_var_name).is_ok() {
        Some(get_client_address(service_name, 80, None))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_service_port() {
        std::env::set_var("PORTTEST_SERVICE_PORT", "9000");
        assert_eq!(get_service_port("porttest", 8000), 9000);

        std::env::set_var("BADPORT_SERVICE_PORT", "not-a-port");
        assert_eq!(get_service_port("BADPORT", 8000), 8000);

        std::env::remove_var("UNKNOWN_SERVICE_PORT");
        assert_eq!(get_service_port("UNKNOWN", 8000), 8000);
    }

    #[test]
    fn test_get_bind_address() {
        std::env::set_var("BINDTEST_SERVICE_ADDR", "http://127.0.0.1:7100");
        assert_eq!(
            get_bind_address("BINDTEST", 8000),
            "127.0.0.1:7100".parse::<SocketAddr>().unwrap()
        );

        std::env::remove_var("BINDDEFAULT_SERVICE_ADDR");
        std::env::remove_var("BINDDEFAULT_SERVICE_PORT");
        assert_eq!(get_bind_address("BINDDEFAULT", 8000).port(), 8000);
    }

    #[test]
    fn test_get_client_address() {
        std::env::set_var("CLIENTTEST_SERVICE_ADDR", "http://example.com:9000/");
        assert_eq!(get_client_address("CLIENTTEST", 8000, None), "http://example.com:9000");

        std::env::remove_var("CLIENTPORT_SERVICE_ADDR");
        std::env::set_var("CLIENTPORT_SERVICE_PORT", "9000");
        assert_eq!(get_client_address("CLIENTPORT", 8000, None), "http://localhost:9000");

        std::env::remove_var("NOCLIENT_SERVICE_ADDR");
        std::env::remove_var("NOCLIENT_SERVICE_PORT");
        assert_eq!(get_client_address("NOCLIENT", 8000, None), "http://localhost:8000");
        assert_eq!(
            get_client_address("NOCLIENT", 8000, Some("analysis.local")),
            "http://analysis.local:8000"
        );
        assert_eq!(client_address_override("NOCLIENT"), None);
    }
}
