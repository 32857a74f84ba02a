//! Structured logging setup using **tracing**.
//!
//! The library itself only emits events through the `tracing` macros;
//! installing a subscriber is the application's job. The CLI calls
//! [`init_logging`] once at startup.

/// Initializes the global tracing collector (subscriber).
///
/// This should be called *once* at the beginning of the application's
/// runtime. It configures structured JSON output to stderr so stdout stays
/// clean for tool output (trees, DOT, JSON documents).
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g. `RUST_LOG=deadpy=debug`)
pub fn init_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
