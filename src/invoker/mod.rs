//! Model invocation subsystem.
//!
//! # Data Flow
//! ```text
//! (backend, prompt)
//!     → request.rs (JSON body + sampling parameters)
//!     → client.rs (POST with bearer credential, deadline)
//!     → response.rs (detect response shape, extract text)
//!     → Ok(text) | Err(InvokeError)
//!
//! Debug export:
//!     (backend, prompt) → curl.rs → shell command
//! ```
//!
//! # Design Decisions
//! - Provider-agnostic: shapes are matched, not modeled as types per provider
//! - Unrecognized bodies normalize to empty text instead of erroring
//! - The credential only ever leaves in the Authorization header

pub mod client;
pub mod curl;
pub mod request;
pub mod response;

pub use client::{HttpModelInvoker, InvokeError, ModelInvoker};
pub use curl::{curl_command, CredentialDisplay};
pub use request::{GenerationParameters, GenerationRequest};
pub use response::{normalize_response, ResponseShape};
