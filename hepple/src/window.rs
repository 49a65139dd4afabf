// hepple/src/window.rs
//
// Seven-slot window of (word, tag, candidate tags) around the word being
// retagged. One window belongs to one tagging pass.

/// Marker word and tag of empty window slots.
pub const SENTINEL: &str = "STAART";

pub const WINDOW_SIZE: usize = 7;

/// Index of the word being decided.
pub const CENTER: usize = 3;

/// Number of sentinels pushed after a sentence to flush the window.
pub const FLUSH: usize = WINDOW_SIZE - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub word: String,
    pub tag: String,
    /// Candidate tags, most frequent first.
    pub candidates: Vec<String>,
    sentinel: bool,
}

impl Slot {
    pub fn new<W: Into<String>, T: Into<String>>(word: W, tag: T, candidates: Vec<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
            candidates,
            sentinel: false,
        }
    }

    pub fn sentinel() -> Self {
        Self {
            word: SENTINEL.to_string(),
            tag: SENTINEL.to_string(),
            candidates: vec![SENTINEL.to_string()],
            sentinel: true,
        }
    }

    /// True for window padding, even if a real word is spelled `STAART`.
    pub fn is_sentinel(&self) -> bool {
        self.sentinel
    }

    /// First candidate tag, which selects the rules tried for this slot.
    pub fn first_candidate(&self) -> &str {
        self.candidates.first().map(String::as_str).unwrap_or(&self.tag)
    }
}

#[derive(Debug, Clone)]
pub struct Window {
    slots: [Slot; WINDOW_SIZE],
}

impl Window {
    /// A window filled with sentinels.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::sentinel()),
        }
    }

    /// Shift every slot one place left and put `slot` last.
    pub fn push(&mut self, slot: Slot) {
        self.slots.rotate_left(1);
        self.slots[WINDOW_SIZE - 1] = slot;
    }

    pub fn slot(&self, i: usize) -> &Slot {
        &self.slots[i]
    }

    pub fn word(&self, i: usize) -> &str {
        &self.slots[i].word
    }

    pub fn tag(&self, i: usize) -> &str {
        &self.slots[i].tag
    }

    pub fn set_tag(&mut self, i: usize, tag: &str) {
        self.slots[i].tag = tag.to_string();
    }

    pub fn has_candidate(&self, i: usize, tag: &str) -> bool {
        self.slots[i].candidates.iter().any(|c| c == tag)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_shifts_left() {
        let mut w = Window::new();
        assert!(w.slot(0).is_sentinel());
        w.push(Slot::new("the", "at1", vec!["at1".into()]));
        assert_eq!(w.word(6), "the");
        w.push(Slot::new("cat", "n1", vec!["n1".into()]));
        assert_eq!(w.word(5), "the");
        assert_eq!(w.word(6), "cat");
        assert_eq!(w.tag(4), SENTINEL);
    }

    #[test]
    fn real_staart_word_is_not_a_sentinel() {
        let s = Slot::new(SENTINEL, "np1", vec![]);
        assert!(!s.is_sentinel());
        assert_eq!(s.first_candidate(), "np1");
    }
}
