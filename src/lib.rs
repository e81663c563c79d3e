//! Proxy auto-config generation and host routing.
//!
//! [`engine`] decides, per host, whether a connection goes `direct`, through
//! the `blocked` circumvention transport, or through the `default` one.
//! [`pac`] renders the same policy as a PAC script for browsers.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod init;
pub mod logger;
pub mod pac;
pub mod stats;
