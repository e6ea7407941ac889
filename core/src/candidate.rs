//! Candidate values and candidate-strip selection state.

use serde::{Deserialize, Serialize};

/// A single conversion candidate for a reading.
///
/// `rare_tone` marks that the matched tone is a minority reading for the
/// character, so a renderer can de-emphasize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    #[serde(default)]
    pub rare_tone: bool,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T, rare_tone: bool) -> Self {
        Candidate {
            text: text.into(),
            rare_tone,
        }
    }
}

/// Selection state over a candidate list.
///
/// `selected` is the highlighted candidate. `scroll_anchor` and
/// `anchor_right` remember which element the strip viewport was last anchored
/// to and on which side; they persist across re-renders of the same list so
/// the strip does not jump (see [`crate::ScrollPlanner`]).
///
/// Invariant: while the list is non-empty, `selected` stays in
/// `0..len`; when it is empty the whole selection is the zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub selected: usize,
    pub scroll_anchor: usize,
    pub anchor_right: bool,
}

impl Selection {
    /// Back to the zero selection (first candidate, left-anchored).
    pub fn reset(&mut self) {
        *self = Selection::default();
    }

    /// Re-establish the invariant against a list of `len` candidates.
    pub fn clamp_to(&mut self, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        if self.selected >= len {
            self.selected = len - 1;
        }
        if self.scroll_anchor >= len {
            self.scroll_anchor = len - 1;
        }
    }

    /// Move the highlight one candidate left, stopping at the first.
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move the highlight one candidate right, stopping at the last of `len`.
    pub fn select_next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_to_empty_resets() {
        let mut sel = Selection {
            selected: 3,
            scroll_anchor: 2,
            anchor_right: true,
        };
        sel.clamp_to(0);
        assert_eq!(sel, Selection::default());
    }

    #[test]
    fn clamp_to_shorter_list() {
        let mut sel = Selection {
            selected: 5,
            scroll_anchor: 4,
            anchor_right: true,
        };
        sel.clamp_to(3);
        assert_eq!(sel.selected, 2);
        assert_eq!(sel.scroll_anchor, 2);
        // Anchor side is part of the remembered view, not clamped away
        assert!(sel.anchor_right);
    }

    #[test]
    fn prev_and_next_stay_in_range() {
        let mut sel = Selection::default();
        sel.select_prev();
        assert_eq!(sel.selected, 0);
        sel.select_next(3);
        sel.select_next(3);
        sel.select_next(3);
        assert_eq!(sel.selected, 2);
        sel.select_next(0);
        assert_eq!(sel.selected, 2);
    }

    #[test]
    fn candidate_json_rare_tone_defaults_false() {
        let c: Candidate = serde_json::from_str(r#"{"text": "我"}"#).unwrap();
        assert!(!c.rare_tone);
    }
}
