//! Session module for lesson progression
//!
//! Provides an explicit state machine with three phases:
//! - AwaitingHold: listening for a sustained hold on the current item
//! - Celebrating: a sign succeeded, input is paused for a short window
//! - Finished: the last item was completed; manual navigation may reopen
//!
//! [`SessionController`] is synchronous and fully drivable from tests.
//! [`SessionRuntime`] wires it to detector frames, commands, and the
//! celebration delay.

mod controller;
mod runtime;

pub use crate::events::Phase;
pub use controller::{
    CelebrationTimer, Navigation, SessionConfig, SessionController, SessionError,
    DEFAULT_CELEBRATION_MS,
};
pub use runtime::{SessionCommand, SessionRuntime};
