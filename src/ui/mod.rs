pub mod app;
pub mod chrome;
pub mod story_view;
