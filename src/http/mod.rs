//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID layers, request bodies)
//!     → server.rs (Axum router, timeout + trace layers)
//!     → orchestrator (fallback run)
//!     → response.rs (text, or generic 503)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{GenerateRequest, X_REQUEST_ID};
pub use response::{ErrorResponse, GenerateResponse};
pub use server::{AppState, HttpServer};
