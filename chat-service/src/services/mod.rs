pub mod formatter;
pub mod metrics;
pub mod providers;
pub mod responder;

pub use formatter::{PassthroughFormatter, ResponseFormatter, TidyFormatter};
pub use responder::{ChatResponder, FALLBACK_RESPONSE};
