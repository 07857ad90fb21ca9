//! Configuration, logistics field extraction, and the document session that
//! ties upload, question answering and structured extraction together.

pub mod config;
pub mod extract;
pub mod session;

pub use docintel_memory::document::DocumentError;
pub use extract::{ExtractedFields, Field};
pub use session::{Answer, Session, SessionError, UploadSummary};
