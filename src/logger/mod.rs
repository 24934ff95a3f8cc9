//! Logger module
//!
//! Provides logging utilities for the gateway including:
//! - Server lifecycle and startup probe logging
//! - Upstream call logging with the API key redacted
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::Config;
use std::net::SocketAddr;

/// Characters of an upstream URL shown in the log
const URL_LOG_CHARS: usize = 90;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        &config.logging.level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write through the global writer, or straight to stdout/stderr before `init()`
fn write(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level <= LogLevel::Warn => eprintln!("{message}"),
        None => println!("{message}"),
    }
}

fn write_info(message: &str) {
    write(LogLevel::Info, message);
}

pub fn log_server_start<'a>(
    addr: &SocketAddr,
    config: &Config,
    api_paths: impl Iterator<Item = &'a str>,
) {
    write_info("╔═══════════════════════════════════════════════╗");
    write_info("║   🏏  Cricket Dashboard Gateway               ║");
    write_info("╚═══════════════════════════════════════════════╝");
    write_info(&format!("  ✅  Open → http://{addr}"));
    write_info(&format!(
        "  📡  Endpoints: {}",
        api_paths.collect::<Vec<_>>().join("  ")
    ));
    write_info(&format!(
        "  🌐  Upstream: {} (timeout {}s)",
        config.upstream.base_url, config.upstream.timeout_secs
    ));
    write_info(&format!("  📄  Dashboard: {}", config.dashboard_path().display()));
    write_info(&format!("  Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("  Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("  Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("  Error log: {path}"));
    }
    write_info("  🛑  Ctrl+C to stop\n");
}

pub fn log_shutdown() {
    write_info("\n👋 Stopped.");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(
        LogLevel::Debug,
        &format!("[Connection] Accepted from: {peer_addr}"),
    );
}

pub fn log_connection_idle(peer_addr: &SocketAddr, idle_secs: u64) {
    write(
        LogLevel::Debug,
        &format!("[Connection] Closing {peer_addr} after {idle_secs}s idle"),
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(
        LogLevel::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_error(message: &str) {
    write(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(LogLevel::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_proxy_call(url: &str) {
    let shown: String = redact_api_key(url).chars().take(URL_LOG_CHARS).collect();
    write_info(&format!("  🌐 {shown}"));
}

pub fn log_upstream_preview(peek: &str) {
    write(LogLevel::Debug, &format!("  📦 {peek}"));
}

pub fn log_upstream_http_error(status: u16, detail: &str) {
    write(LogLevel::Warn, &format!("  ❌ HTTP {status}: {detail}"));
}

pub fn log_upstream_failure(kind: &str, reason: &str) {
    write(LogLevel::Warn, &format!("  ❌ {kind}: {reason}"));
}

pub fn log_probe_start() {
    write_info("\n🔍 Testing API key...");
}

pub fn log_probe_skipped(reason: &str) {
    write_info(&format!("  ⚠️  Probe skipped: {reason}"));
}

pub fn log_probe_connected(count: usize) {
    write_info(&format!("  ✅ Connected! Matches available: {count}"));
}

pub fn log_probe_match(live: bool, name: &str, id: &str) {
    let status = if live { "🔴 LIVE" } else { "📅" };
    write_info(&format!("     {status} {name}  ID: {id}"));
}

pub fn log_probe_failed(reason: &str) {
    write(
        LogLevel::Warn,
        &format!("  ⚠️  {reason} (demo mode will work in browser)"),
    );
}

/// Replace the value of every `apikey` query parameter with `***`
pub fn redact_api_key(url: &str) -> String {
    let Some((head, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("apikey", _)) => "apikey=***".to_string(),
            _ => pair.to_string(),
        })
        .collect();
    format!("{head}?{}", redacted.join("&"))
}
