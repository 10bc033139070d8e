//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per request)
//! 2. `TraceLayer` (`http_request` span with status and latency)
//! 3. Request ID (recorded into the span, Sentry scope and response)
//! 4. CORS (only when origins are configured)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
