//! HTTP gateway exposing document upload, question answering and field
//! extraction over a single shared session.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use router::build_router;
pub use server::{AppState, GatewayServer};
