pub mod content;
pub mod playback_state;
pub mod story;
