pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod pipehash_toml;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, cap_workers_by_fd_limit, max_open_fds, workers_for_fd_limit};
pub use logger::setup_logging;
