//! Reverse-proxy pipeline.
//!
//! # Data Flow
//! ```text
//! Matched upstream route + inbound request
//!     → resolver.rs (static target_url or registry lookup, path join)
//!     → executor.rs (header filter, gateway headers, outbound call)
//!     → http::response (deadline-bounded streaming body)
//!     → Client
//! ```
//!
//! # Design Decisions
//! - Bodies are streamed in both directions, never buffered
//! - One deadline covers the whole round trip, body included
//! - No retries and no load balancing

pub mod executor;
pub mod resolver;

pub use executor::{HttpClient, Outbound, ProxyExecutor, GATEWAY_ID};
pub use resolver::TargetResolver;
