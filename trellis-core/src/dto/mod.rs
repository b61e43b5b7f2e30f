//! Data transfer objects
//!
//! Request/response types exchanged between the gateway API, the client
//! crate, and the CLI.

pub mod job;
