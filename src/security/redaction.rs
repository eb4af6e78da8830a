// Helpers that keep secret bytes out of `Debug` output and log lines.
use std::env;

/// Set to `1` to print secret bytes in `Debug` output. Local debugging only.
pub const PRINT_SECRETS_ENV: &str = "ION_KEYS_PRINT_SECRETS";

fn printing_allowed() -> bool {
    env::var(PRINT_SECRETS_ENV).ok().as_deref() == Some("1")
}

/// Render secret bytes as a length-only placeholder unless printing is explicitly allowed.
pub fn redact_hex_bytes(bytes: &[u8]) -> String {
    if printing_allowed() {
        return format!("0x{}", hex::encode(bytes));
    }
    format!("<redacted hex len={}>", bytes.len())
}
