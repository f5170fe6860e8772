/// Positions the horizontal story strip. Purely visual: the player never
/// hears back from it.
pub trait ViewportScroller {
    fn scroll_to_index(&mut self, index: usize);
}

/// Scroll target for an egui strip whose pages are exactly one viewport wide.
/// The offset is recomputed every frame so a resized window stays aligned.
#[derive(Debug, Default)]
pub struct StripViewport {
    target: usize,
}

impl StripViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn offset(&self, page_width: f32) -> f32 {
        self.target as f32 * page_width
    }
}

impl ViewportScroller for StripViewport {
    fn scroll_to_index(&mut self, index: usize) {
        self.target = index;
    }
}

#[cfg(test)]
pub mod testing {
    use super::ViewportScroller;

    /// Records every scroll command it receives.
    #[derive(Debug, Default)]
    pub struct RecordingScroller {
        pub commands: Vec<usize>,
    }

    impl ViewportScroller for RecordingScroller {
        fn scroll_to_index(&mut self, index: usize) {
            self.commands.push(index);
        }
    }
}
