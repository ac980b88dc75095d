//! Echo Server
//!
//! ```text
//! ┌──────────────────────────────┐
//! │         EchoServer           │   bind + accept loop
//! │  (owns ConnectionStats)      │
//! └──────────────┬───────────────┘
//!                │ accept()
//!                │ tokio::spawn (detached)
//!                ▼
//! ┌──────────────────────────────┐     ┌──────────────────┐
//! │     handle_connection        │────>│ ConnectionStats  │
//! │ recv_some → uppercase →      │     │ Mutex<usize>     │
//! │ send_all, until peer close   │     └──────────────────┘
//! └──────────────────────────────┘
//! ```
//!
//! One task per connection, each with its own scratch buffer. The only
//! state shared between tasks is [`ConnectionStats`].

pub mod handler;
pub mod listener;
pub mod stats;

pub use handler::{handle_connection, ConnectionError};
pub use listener::{EchoServer, ServerError};
pub use stats::{ConnectionGuard, ConnectionStats};
