//! HTTP request handlers for the gateway
//!
//! Catalog requests are answered by the dispatcher; the remaining handlers
//! cover CORS preflight and health probes.

pub mod catalog;
pub mod health;
pub mod options;
