//! Utility functions for Manioc

use if_addrs::IfAddr;

/// Returns true when the string is empty or only whitespace.
///
/// ```
/// use manioc_common::is_blank;
///
/// assert!(is_blank(""));
/// assert!(is_blank("  \t"));
/// assert!(!is_blank(" app "));
/// ```
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// First non-loopback IPv4 address of this host, `127.0.0.1` when there is none
pub fn local_ip() -> String {
    let addrs = if_addrs::get_if_addrs().unwrap_or_default();
    addrs
        .iter()
        .filter(|iface| !iface.is_loopback())
        .find_map(|iface| match &iface.addr {
            IfAddr::V4(v4) => Some(v4.ip.to_string()),
            IfAddr::V6(_) => None,
        })
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" "));
        assert!(is_blank("\n\t"));
        assert!(!is_blank("a"));
    }

    #[test]
    fn test_local_ip_returns_valid_ip() {
        let ip = local_ip();
        assert!(
            ip == "127.0.0.1" || ip.split('.').filter_map(|s| s.parse::<u8>().ok()).count() == 4
        );
    }
}
