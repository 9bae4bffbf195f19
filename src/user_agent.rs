//! User-Agent header sent to the backend.

use std::sync::OnceLock;

const CLIENT_NAME: &str = "pam-grants";

const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

static USER_AGENT: OnceLock<String> = OnceLock::new();

/// Returns the User-Agent string, computed once.
///
/// Format: `pam-grants/0.1.0 (rust/1.92; linux/x86_64)`
pub fn user_agent() -> &'static str {
    USER_AGENT.get_or_init(|| {
        format!(
            "{}/{} (rust/{}; {}/{})",
            CLIENT_NAME,
            CLIENT_VERSION,
            env!("CARGO_PKG_RUST_VERSION"),
            os_name(),
            std::env::consts::ARCH,
        )
    })
}

fn os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
}
