//! The composing session state machine.
//!
//! A session owns the raw keystroke buffer and the candidate list/selection
//! derived from it. Host adapters translate native key events into
//! [`InputEvent`] values and hand them to [`ComposingSession::handle`]
//! together with their [`HostTextSink`]; the session updates its state and
//! makes at most one sink call per event.
//!
//! Two macro-states fall out of the data: idle (empty raw buffer) and
//! composing. The session is never destroyed; commit, cancel, or an external
//! host edit return it to idle.

use crate::candidate::{Candidate, Selection};
use crate::dict::CandidateDict;
use crate::host::HostTextSink;
use crate::tokenizer::{is_tone_digit, tokenize};
use std::sync::Arc;

/// Normalized input events, computed by a host adapter from raw key or tap
/// events (see the adapter contract in the crate docs). Keystrokes carrying
/// Alt/Control/Meta modifiers never reach the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A letter or tone digit to append to the raw buffer.
    Char(char),
    /// A tone digit from the dedicated tone row: replaces the tone of a
    /// syllable completed by the immediately preceding keystroke, otherwise
    /// appends like `Char`.
    ToneReplace(char),
    /// Delete the last raw character, or delegate to the host when idle.
    Backspace,
    /// Move the candidate highlight left.
    SelectPrev,
    /// Move the candidate highlight right.
    SelectNext,
    /// Commit the highlighted candidate.
    CommitCandidate,
    /// Commit the raw buffer verbatim, or insert a newline when idle.
    CommitRaw,
    /// The host field changed under us (cursor moved, contents replaced);
    /// abandon the composition without committing.
    HostTextChanged,
}

/// Composition state: raw buffer, derived candidates, and selection.
pub struct ComposingSession {
    dict: Arc<CandidateDict>,
    raw: String,
    candidates: Vec<Candidate>,
    selection: Selection,
    // Whether the previous buffer-mutating event was itself a tone digit;
    // gates tone replacement.
    last_key_was_tone: bool,
}

impl ComposingSession {
    pub fn new(dict: Arc<CandidateDict>) -> Self {
        Self {
            dict,
            raw: String::new(),
            candidates: Vec::new(),
            selection: Selection::default(),
            last_key_was_tone: false,
        }
    }

    /// The raw keystroke buffer accumulated since composition began.
    pub fn raw_input(&self) -> &str {
        &self.raw
    }

    /// Candidates for the current reading, most likely first.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Mutable selection access for the renderer's scroll planner, which
    /// updates the anchor fields across renders.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// False while idle (empty raw buffer).
    pub fn is_composing(&self) -> bool {
        !self.raw.is_empty()
    }

    /// Handle one normalized event. Infallible: every event has a defined
    /// effect in every state, possibly a no-op.
    pub fn handle<S: HostTextSink>(&mut self, event: InputEvent, sink: &mut S) {
        match event {
            InputEvent::Char(c) => {
                self.raw.push(c);
                self.last_key_was_tone = is_tone_digit(c);
                self.refresh_candidates();
                self.push_marked(sink);
            }
            InputEvent::ToneReplace(c) => {
                // Replace only when the previous keystroke completed a
                // syllable with its tone digit; otherwise this is a plain
                // append.
                if self.last_key_was_tone && self.tone_just_completed() {
                    self.raw.pop();
                }
                self.raw.push(c);
                self.last_key_was_tone = is_tone_digit(c);
                self.refresh_candidates();
                self.push_marked(sink);
            }
            InputEvent::Backspace => {
                if self.raw.is_empty() {
                    // Nothing to compose; the host field owns the deletion
                    sink.delete_backward();
                } else {
                    self.raw.pop();
                    self.last_key_was_tone = false;
                    self.refresh_candidates();
                    self.push_marked(sink);
                }
            }
            InputEvent::SelectPrev => {
                if !self.candidates.is_empty() {
                    self.selection.select_prev();
                }
            }
            InputEvent::SelectNext => {
                let len = self.candidates.len();
                if len > 0 {
                    self.selection.select_next(len);
                }
            }
            InputEvent::CommitCandidate => {
                if let Some(candidate) = self.candidates.get(self.selection.selected) {
                    let text = candidate.text.clone();
                    self.reset();
                    sink.commit_text(&text);
                }
            }
            InputEvent::CommitRaw => {
                if self.raw.is_empty() {
                    // Idle: the engine is inert, pass a literal newline through
                    sink.commit_text("\n");
                } else {
                    let raw = std::mem::take(&mut self.raw);
                    self.reset();
                    sink.commit_text(&raw);
                }
            }
            InputEvent::HostTextChanged => {
                // External edits invalidate the composing context outright;
                // no sink call, nothing survives
                self.reset();
            }
        }
    }

    /// True when the raw buffer ends exactly on a completed syllable.
    fn tone_just_completed(&self) -> bool {
        let input = tokenize(&self.raw);
        !input.syllables.is_empty() && input.remainder.is_empty()
    }

    /// Recompute candidates from the raw buffer. A changed list resets the
    /// selection; an identical list preserves it (clamped to the new length).
    fn refresh_candidates(&mut self) {
        let input = tokenize(&self.raw);
        let next = self.dict.lookup(&input.syllables);
        if next != self.candidates {
            self.selection.reset();
        } else {
            self.selection.clamp_to(next.len());
        }
        self.candidates = next;
    }

    /// Push the marked text for the current buffer, cursor at the end.
    fn push_marked<S: HostTextSink>(&self, sink: &mut S) {
        sink.set_composing_text(&tokenize(&self.raw).display(), 0);
    }

    fn reset(&mut self) {
        self.raw.clear();
        self.candidates.clear();
        self.selection.reset();
        self.last_key_was_tone = false;
    }
}
