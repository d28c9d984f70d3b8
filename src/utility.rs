//! Utility functions for configuration parsing

use crate::configuration::CONFIG;

/// Looks up `key` in `KEY=VALUE` configuration text.
///
/// Whitespace around keys and values is ignored; the first match wins.
pub fn config_value<'a>(config: &'a str, key: &str) -> Option<&'a str> {
    config
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, value)| value.trim())
}

/// Extracts the WiFi SSID from configuration.
///
/// # Returns
/// * `&str` - WiFi network SSID
pub fn get_ssid() -> &'static str {
    config_value(CONFIG, "WIFI_NETWORK").unwrap_or("YOUR_WIFI_SSID")
}

/// Extracts the WiFi password from configuration.
///
/// # Returns
/// * `&str` - WiFi network password
pub fn get_wifi_password() -> &'static str {
    config_value(CONFIG, "WIFI_PASSWORD").unwrap_or("YOUR_WIFI_PASSWORD")
}

/// Extracts the IP of the remote command peer (app / home automation).
///
/// # Returns
/// * `&str` - peer IP address in format "a.b.c.d"
pub fn get_remote_peer_ip() -> &'static str {
    config_value(CONFIG, "REMOTE_PEER_IP").unwrap_or("192.168.1.50")
}

/// UDP port used for remote commands and forwarded observations.
pub fn get_remote_port() -> u16 {
    config_value(CONFIG, "REMOTE_PORT")
        .and_then(|port| port.parse().ok())
        .unwrap_or(4210)
}

/// Parse IP address string "a.b.c.d" into `[u8; 4]` array.
///
/// # Arguments
/// * `ip_str` - IP address string in dotted decimal format
///
/// # Returns
/// * `Option<[u8; 4]>` - IP address as byte array, `None` on parse error
pub fn parse_ip(ip_str: &str) -> Option<[u8; 4]> {
    let parts: heapless::Vec<&str, 5> = ip_str.split('.').take(5).collect();
    if parts.len() != 4 {
        return None;
    }

    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        *octet = part.trim().parse().ok()?;
    }
    Some(octets)
}
