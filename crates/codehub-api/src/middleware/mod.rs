//! HTTP middleware: request logging, CORS, compression.

pub mod compression;
pub mod cors;
pub mod logging;
