pub mod media_deck;
pub mod media_stream;
pub mod story_player;
pub mod viewport;
