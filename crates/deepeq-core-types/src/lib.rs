//! Core types shared across deepeq facilities
//!
//! This crate provides the canonical schema constants used by both the
//! error facility and the logging facility of `deepeq-core`:
//!
//! - **Field keys**: structured logging field names
//! - **Event names**: operation boundary events

pub mod schema;
