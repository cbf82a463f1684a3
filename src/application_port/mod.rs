mod credential_hasher;
mod session_service;
mod token_codec;
mod user_service;

pub use credential_hasher::*;
pub use session_service::*;
pub use token_codec::*;
pub use user_service::*;
