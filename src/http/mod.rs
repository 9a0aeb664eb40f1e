//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, forwarded header selection)
//!     → proxy.rs (path → bucket/key, backend fetch)
//!     → response.rs (mirror object or render fault)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::SERVER_NAME;
pub use server::{AppState, HttpServer};
