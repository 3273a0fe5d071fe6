//! HTTP surface of the evaluation service.
//!
//! Routes: `GET /`, `GET /health`, `POST /evaluate`, `GET /reports/:filename`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::build_router;
pub use server::serve;
pub use types::ApiContext;
