use std::cell::RefCell;
use std::rc::Rc;

use pinata_core::{AudioCue, AudioSink, HapticCategory, TactileOutput};

/// Tactile output that records played category indices. Clones share the log.
#[derive(Clone, Debug)]
pub struct RecordingTactile {
    supported: bool,
    played: Rc<RefCell<Vec<u8>>>,
}

impl RecordingTactile {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            played: Rc::default(),
        }
    }

    pub fn played(&self) -> Vec<u8> {
        self.played.borrow().clone()
    }

    /// Played pulses per category, in platform index order.
    pub fn counts(&self) -> [usize; 6] {
        let mut counts = [0; 6];
        for &index in self.played.borrow().iter() {
            if let Some(slot) = counts.get_mut(index as usize) {
                *slot += 1;
            }
        }
        counts
    }

    pub fn count(&self, category: HapticCategory) -> usize {
        self.counts()[category.index() as usize]
    }
}

impl Default for RecordingTactile {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TactileOutput for RecordingTactile {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn play(&mut self, category_index: u8) {
        self.played.borrow_mut().push(category_index);
    }
}

/// Audio sink that records cues. Clones share the log.
#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    cues: Rc<RefCell<Vec<AudioCue>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<AudioCue> {
        self.cues.borrow().clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play_one_shot(&mut self, cue: AudioCue) {
        self.cues.borrow_mut().push(cue);
    }
}
