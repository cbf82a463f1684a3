//! Process-local stores for development and tests. Contents are lost on exit.

mod refresh_token_repo_memory;
mod user_repo_memory;

pub use refresh_token_repo_memory::*;
pub use user_repo_memory::*;
