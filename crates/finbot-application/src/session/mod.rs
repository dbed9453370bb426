mod controller;

pub use controller::{PendingReply, SessionController};
