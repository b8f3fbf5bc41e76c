//! Room module: the async actor boundary around [`crate::game::GameState`].
//!
//! The room runs in its own tokio task with an mpsc message inbox; replies
//! travel on per-request oneshot channels. Connections subscribe an mpsc
//! sender and receive best-effort notifications after every state change.
//! The actor ticks the state machine once per second to drive its timed
//! phases.

pub mod actor;
pub mod messages;

pub use actor::{RoomActor, RoomClosed, RoomHandle};
pub use messages::{RoomMessage, RoomNotification, RoomResponse, RoomStatus};
