mod events;
mod store;

pub use events::EventLog;
pub use store::{SelectedStory, SessionStore, StateScope, CHOICE_ACK};
