use crate::error::{Result, StoryError};
use crate::types::story::{StoryRecord, StorySequence};

/// Progress value of a fully watched story.
pub const PROGRESS_COMPLETE: u8 = 100;
/// Progress added by every tick.
pub const PROGRESS_STEP: u8 = 1;

/// Outcome of a single state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No stories; nothing changed.
    Idle,
    /// The active story advanced its progress but stays active.
    Progressed,
    /// The active story finished and `next_index` became active.
    /// `wrapped` is set when a full pass completed and every bar was reset.
    Advanced { next_index: usize, wrapped: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPlayback {
    Playing,
    Paused,
}

/// Which story is active and how far each progress bar has filled.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    sequence: StorySequence,
    active_index: usize,
    progress: Vec<u8>,
}

impl PlaybackState {
    pub fn new(sequence: StorySequence) -> Self {
        let progress = vec![0; sequence.len()];
        PlaybackState {
            sequence,
            active_index: 0,
            progress,
        }
    }

    pub fn sequence(&self) -> &StorySequence {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_idle(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn progress(&self) -> &[u8] {
        &self.progress
    }

    pub fn active_record(&self) -> Option<&StoryRecord> {
        self.sequence.get(self.active_index)
    }

    pub fn record(&self, index: usize) -> Result<&StoryRecord> {
        self.sequence.get(index).ok_or(StoryError::InvariantViolation {
            index,
            len: self.len(),
        })
    }

    /// Only the active story plays; every other one is paused.
    pub fn media_playback(&self, index: usize) -> Result<MediaPlayback> {
        self.record(index)?;
        Ok(if index == self.active_index {
            MediaPlayback::Playing
        } else {
            MediaPlayback::Paused
        })
    }

    /// Timer-driven step: fills the active bar and moves on once it is full.
    pub fn tick(&mut self) -> Transition {
        if self.is_idle() {
            return Transition::Idle;
        }
        let cell = &mut self.progress[self.active_index];
        *cell = cell.saturating_add(PROGRESS_STEP).min(PROGRESS_COMPLETE);
        if *cell == PROGRESS_COMPLETE {
            self.complete_active()
        } else {
            Transition::Progressed
        }
    }

    /// User-driven skip: finishes the active story immediately.
    pub fn skip(&mut self) -> Transition {
        if self.is_idle() {
            return Transition::Idle;
        }
        self.complete_active()
    }

    /// The one place a story is finished, shared by `tick` and `skip`.
    fn complete_active(&mut self) -> Transition {
        let len = self.len();
        self.progress[self.active_index] = PROGRESS_COMPLETE;
        let next_index = (self.active_index + 1) % len;
        self.active_index = next_index;
        let wrapped = next_index == 0;
        if wrapped {
            self.progress.iter_mut().for_each(|p| *p = 0);
        }
        Transition::Advanced {
            next_index,
            wrapped,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(StorySequence::empty())
    }
}
