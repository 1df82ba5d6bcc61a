// ABOUTME: Session module - event classification, transcript state, outbound
// ABOUTME: frames, and the event router.

mod event;
mod frame;
mod router;
mod state;

pub use event::*;
pub use frame::*;
pub use router::*;
pub use state::*;

#[cfg(test)]
mod router_test;
