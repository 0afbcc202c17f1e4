//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route:
//!     → auth.rs (presence check when the route requires auth)
//!     → headers.rs (strip hop-by-hop headers)
//!     → Pass to proxy executor
//!
//! Backend response:
//!     → headers.rs (strip hop-by-hop headers)
//!     → Client
//! ```
//!
//! # Design Decisions
//! - The auth gate is a presence check, not authentication
//! - Fail closed: a gated route without a credential is rejected

pub mod auth;
pub mod headers;
