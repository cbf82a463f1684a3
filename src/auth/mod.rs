//! `Authorization` header parsing shared by the session layer and the router.

mod header;
pub use header::*;
