//! catalogplus-proxy - Forwarding provider
//!
//! Implements `ResourceDiscoveryService` and `VirtualClassificationSystem`
//! by forwarding every call over HTTP to a remote search front end. This
//! lets the gateway run in front of an existing discovery service without
//! linking it in.

mod proxy;

pub use proxy::{HttpDiscoveryService, ProxyConfig};
