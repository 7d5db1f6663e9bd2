/*!
 * Server Configuration Tests
 * Environment-driven settings
 */

use memsim_kernel::api::ServerConfig;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::time::Duration;

const KEYS: [&str; 4] = [
    "MEMSIM_ADDR",
    "MEMSIM_MAX_CONNECTIONS",
    "MEMSIM_TIMEOUT_SECS",
    "MEMSIM_INITIAL_CAPACITY",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_env() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.address.to_string(), "127.0.0.1:8000");
    assert_eq!(config.initial_capacity, None);
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("MEMSIM_ADDR", "0.0.0.0:9100");
    std::env::set_var("MEMSIM_MAX_CONNECTIONS", "8");
    std::env::set_var("MEMSIM_TIMEOUT_SECS", "30");
    std::env::set_var("MEMSIM_INITIAL_CAPACITY", "2048");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.address.port(), 9100);
    assert_eq!(config.max_connections, 8);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.initial_capacity, Some(2048));
}

#[test]
#[serial]
fn test_invalid_env_values_rejected() {
    for (key, value) in [
        ("MEMSIM_ADDR", "not-an-address"),
        ("MEMSIM_MAX_CONNECTIONS", "0"),
        ("MEMSIM_TIMEOUT_SECS", "soon"),
        ("MEMSIM_INITIAL_CAPACITY", "0"),
    ] {
        clear_env();
        std::env::set_var(key, value);
        assert!(ServerConfig::from_env().is_err(), "{}={} accepted", key, value);
    }
    clear_env();
}
