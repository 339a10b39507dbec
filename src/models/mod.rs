pub mod queued_action;

pub use queued_action::{Action, Decoded, ProfileUpdate, QueueRow, QueuedAction, RegistrationForm};
