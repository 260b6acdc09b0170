// 服务器模块入口
// Listener setup, per-connection serving and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// Rust 不允许 loop 作为模块名（关键字），改用 server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_reusable_listener;
pub use server_loop::run;
