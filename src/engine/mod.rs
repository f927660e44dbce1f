//! Driver payloads (walk, hash, print) and the CLI around them

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod output;
pub mod tools;
pub mod walk;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::{hash_file, hash_path};
pub use output::{OutputFormat, format_digest, print_digest};
pub use tools::{glob_match, is_excluded, is_os_hidden_file};
pub use walk::{WalkPlan, walk_files};
