//! Structured logging for the comparison engine
//!
//! One initialization point (`init(profile)`), three operation macros
//! (`log_op_start!`, `log_op_end!`, `log_op_error!`) that stamp every event
//! with the component, operation and event type from
//! `deepeq_core_types::schema`, and an in-memory capture layer so tests can
//! assert on emitted events.
//!
//! ```rust
//! use deepeq_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
