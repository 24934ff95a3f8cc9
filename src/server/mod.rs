// Server module entry
// Listener setup, per-connection tasks, the accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::run;
