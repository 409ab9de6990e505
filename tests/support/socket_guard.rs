//! Loopback helpers for tests that talk to a local HTTP server.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "LINKRELAY_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock server, or returns `None` when loopback sockets cannot be
/// bound. Panics instead when `LINKRELAY_REQUIRE_SOCKET_TESTS` is set.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }
    assert!(
        !sockets_required(),
        "cannot bind a loopback socket and {REQUIRE_ENV} is set"
    );
    eprintln!("skipping relay test: cannot bind a loopback socket (set {REQUIRE_ENV}=1 to fail)");
    None
}

/// Base URL of a loopback port with nothing listening on it.
pub fn closed_local_base() -> Option<String> {
    let listener = TcpListener::bind("127.0.0.1:0").ok()?;
    let addr = listener.local_addr().ok()?;
    drop(listener);
    Some(format!("http://{addr}"))
}
