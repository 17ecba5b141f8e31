//! Stable per-host source identity.

/// Source ID for this node: `<hostname>-<12 hex chars>`.
///
/// The suffix is the leading 6 bytes of SHA-256 over the hostname — a
/// deterministic stand-in for a hardware address, stable for the process
/// (and host) lifetime.
pub fn source_id() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-node".to_string());
    let digest = fl_crypto::hash::digest(host.as_bytes());
    format!("{host}-{}", &digest[..12])
}
