//! tonepin-core
//!
//! Composition engine for tone-marked pinyin entry of Chinese characters.
//! A user types a latin-letter syllable followed by a tone digit (1-5); the
//! engine segments the keystroke buffer into syllables, looks up ranked
//! character candidates for the accumulated reading, and lets the user browse
//! and commit a candidate or the raw text.
//!
//! The engine is host-agnostic: platform bindings (a mobile keyboard
//! extension, a browser content script, the terminal adapter in `tonepin-cli`)
//! translate their native key events into [`InputEvent`] values and implement
//! [`HostTextSink`] over their editable text target.
//!
//! Adapter contract for the event mapping: letters `a`-`z` and digits `1`-`5`
//! become `Char`, taps on a dedicated tone row become `ToneReplace`,
//! backspace/delete becomes `Backspace`, enter becomes `CommitRaw`, the
//! select control (space when candidates are showing, or a tap on one)
//! becomes `CommitCandidate`, left/right browse controls become `SelectPrev`
//! / `SelectNext`, and any notification that the host field changed without
//! going through the engine becomes `HostTextChanged`. Keystrokes carrying
//! Alt/Control/Meta modifiers are dropped by the adapter and never reach the
//! engine.
//!
//! Public API:
//! - `tokenize` / `TokenizedInput` / `Syllable` - raw-buffer segmentation
//! - `CandidateDict` - reading key → ranked candidate lookup
//! - `ComposingSession` / `InputEvent` / `HostTextSink` - the session state machine
//! - `ModifierKeyFsm` - shift/caps/number/symbol layer state
//! - `ScrollPlanner` - candidate strip scroll anchoring
//! - `Config` - engine tuning knobs

use serde::{Deserialize, Serialize};

pub mod tokenizer;
pub use tokenizer::{is_tone_digit, tokenize, Syllable, TokenizedInput};

pub mod candidate;
pub use candidate::{Candidate, Selection};

pub mod dict;
pub use dict::{reading_key, CandidateDict, DictEntry};

pub mod host;
pub use host::HostTextSink;

pub mod session;
pub use session::{ComposingSession, InputEvent};

pub mod modifier;
pub use modifier::{ModifierEvent, ModifierKeyFsm, ModifierState, TimerRequest, TimerToken};

pub mod scroll;
pub use scroll::{Extent, ScrollPlanner};

/// Engine configuration.
///
/// Host-facing tuning knobs only; dictionary content and key layouts are not
/// configuration, they are data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Delay before a single shift tap latches into held shift (ms).
    pub shift_delay_ms: u64,

    /// Edge padding used when anchoring the candidate strip viewport, in the
    /// same units as the candidate extents.
    pub scroll_padding: f32,

    /// Maximum number of entries in the reading-key → candidates cache.
    pub max_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Half a second, matching standard mobile keyboard shift behavior
            shift_delay_ms: 500,
            scroll_padding: 5.0,
            max_cache_size: 1024,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The shift auto-latch delay as a `Duration`.
    pub fn shift_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shift_delay_ms)
    }
}
