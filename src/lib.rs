// ABOUTME: Root module for callbridge - bridges a realtime model session to
// ABOUTME: schema-described tools over a duplex channel.

pub mod channel;
pub mod credential;
pub mod error;
pub mod prelude;
pub mod session;
pub mod tool;
pub mod tools;

pub use error::BridgeError;
