//! Interactive terminal host for the tonepin composition engine.
//!
//! This binary is a thin host adapter: it maps typed characters to
//! normalized input events, implements `HostTextSink` over an in-memory
//! document, and renders the marked text plus a scrolled candidate strip
//! after every line. It exists to exercise the engine end to end; real hosts
//! (keyboard extensions, content scripts) bind the same API to their native
//! text targets.

use anyhow::{Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tonepin_core::{
    CandidateDict, ComposingSession, Config, Extent, HostTextSink, InputEvent, ModifierEvent,
    ModifierKeyFsm, ModifierState, ScrollPlanner, TimerRequest,
};

/// Key rows per modifier layer, as a keyboard surface would label them.
static LAYER_ROWS: Lazy<Vec<(ModifierState, [&'static str; 3])>> = Lazy::new(|| {
    vec![
        (
            ModifierState::Normal,
            ["qwertyuiop", "asdfghjkl", "zxcvbnm"],
        ),
        (
            ModifierState::JustShift,
            ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"],
        ),
        (
            ModifierState::Shift,
            ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"],
        ),
        (
            ModifierState::CapsLock,
            ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"],
        ),
        (
            ModifierState::Number,
            ["1234567890", "-/：；（）$@“”", "。，、？！."],
        ),
        (
            ModifierState::Symbol,
            ["【】｛｝#%^*+=", "_—\\｜～《》€&·", "…，、？！‘"],
        ),
    ]
});

#[derive(Parser, Debug)]
#[command(name = "tonepin", about = "Interactive tone-marked pinyin composition")]
struct Args {
    /// Directory containing dict.fst + dict.bincode built by tonepin-tools
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON dictionary file (the browser interchange form)
    #[arg(long)]
    dict_json: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// The editable text target: committed document plus inline marked text.
#[derive(Default)]
struct TerminalDoc {
    committed: String,
    marked: String,
}

impl HostTextSink for TerminalDoc {
    fn set_composing_text(&mut self, text: &str, _cursor_offset_from_end: usize) {
        self.marked = text.to_string();
    }

    fn commit_text(&mut self, text: &str) {
        self.committed.push_str(text);
        self.marked.clear();
    }

    fn delete_backward(&mut self) {
        self.committed.pop();
    }
}

fn load_dict(args: &Args) -> Result<CandidateDict> {
    if let Some(dir) = &args.data_dir {
        let dict =
            CandidateDict::load_from_fst_bincode(dir.join("dict.fst"), dir.join("dict.bincode"))
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("loading dictionary from {}", dir.display()))?;
        eprintln!("✓ Loaded dictionary from {}", dir.display());
        return Ok(dict);
    }
    if let Some(path) = &args.dict_json {
        let dict = CandidateDict::load_from_json(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("loading dictionary from {}", path.display()))?;
        eprintln!("✓ Loaded dictionary from {}", path.display());
        return Ok(dict);
    }
    eprintln!("ℹ No dictionary given, using the built-in demo table");
    Ok(CandidateDict::load_demo())
}

/// Render the candidate strip through the scroll planner, bracketing the
/// highlighted candidate and eliding whatever is scrolled out of view.
fn render_candidates(session: &mut ComposingSession, planner: &ScrollPlanner, viewport: f32) {
    if session.candidates().is_empty() {
        return;
    }

    // Cell width in columns: Han characters are double width, plus padding
    let mut extents = Vec::new();
    let mut x = 0.0;
    for candidate in session.candidates() {
        let w = candidate.text.chars().count() as f32 * 2.0 + 2.0;
        extents.push(Extent::new(x, x + w));
        x += w;
    }

    let selected = session.selection().selected;
    let offset = planner.plan(&extents, session.selection_mut());

    let mut strip = String::new();
    for (i, (candidate, extent)) in session.candidates().iter().zip(&extents).enumerate() {
        if extent.right <= offset || extent.left >= offset + viewport {
            continue;
        }
        let rare = if candidate.rare_tone { "·" } else { "" };
        if i == selected {
            strip.push_str(&format!("[{}{}] ", candidate.text, rare));
        } else {
            strip.push_str(&format!(" {}{}  ", candidate.text, rare));
        }
    }
    println!("candidates: {}", strip.trim_end());
}

fn render_layer(fsm: &ModifierKeyFsm) {
    let rows = LAYER_ROWS
        .iter()
        .find(|(state, _)| *state == fsm.state())
        .map(|(_, rows)| rows)
        .expect("every state has rows");
    println!("layer ({:?}): {}", fsm.state(), rows.join(" / "));
}

fn print_banner() {
    println!("tonepin interactive composition");
    println!();
    println!("  a-z 1-5   type letters and tone digits");
    println!("  ! @ # $ % tone row (replaces a just-typed tone)");
    println!("  < >       browse candidates");
    println!("  space     commit the highlighted candidate");
    println!("  -         backspace");
    println!("  ;         commit raw input (enter)");
    println!("  ~         simulate an external host edit");
    println!("  + =       shift / number mode keys");
    println!("  :q        quit");
    println!();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    // The engine cannot compose without its dictionary; bail out before
    // accepting any input
    let dict = Arc::new(load_dict(&args)?);

    let viewport = 60.0;
    let planner = ScrollPlanner::new(viewport, config.scroll_padding);
    let mut session = ComposingSession::new(Arc::clone(&dict));
    let mut doc = TerminalDoc::default();
    let mut fsm = ModifierKeyFsm::new(config.shift_delay());
    let mut pending_latch: Option<(TimerRequest, Instant)> = None;

    print_banner();
    render_layer(&fsm);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line == ":q" {
            break;
        }

        // Deliver the shift-delay one-shot if it would have fired while the
        // user was idle between lines
        if let Some((request, armed_at)) = pending_latch {
            if armed_at.elapsed() >= request.after {
                fsm.handle(ModifierEvent::ShiftDelayElapsed(request.token));
                pending_latch = None;
            }
        }

        for c in line.chars() {
            let modifier_event = match c {
                '+' => ModifierEvent::TapShift,
                '=' => ModifierEvent::TapNum,
                _ => ModifierEvent::TapAnyKey,
            };
            // No need to unschedule on key activity: the FSM invalidates the
            // token, so a late delivery is a no-op
            if let Some(request) = fsm.handle(modifier_event) {
                pending_latch = Some((request, Instant::now()));
            }

            let event = match c {
                'a'..='z' | '1'..='5' => Some(InputEvent::Char(c)),
                '!' => Some(InputEvent::ToneReplace('1')),
                '@' => Some(InputEvent::ToneReplace('2')),
                '#' => Some(InputEvent::ToneReplace('3')),
                '$' => Some(InputEvent::ToneReplace('4')),
                '%' => Some(InputEvent::ToneReplace('5')),
                '<' => Some(InputEvent::SelectPrev),
                '>' => Some(InputEvent::SelectNext),
                '-' => Some(InputEvent::Backspace),
                ';' => Some(InputEvent::CommitRaw),
                '~' => Some(InputEvent::HostTextChanged),
                ' ' => {
                    if !session.candidates().is_empty() {
                        Some(InputEvent::CommitCandidate)
                    } else if session.is_composing() {
                        Some(InputEvent::Char(' '))
                    } else {
                        doc.commit_text(" ");
                        None
                    }
                }
                _ => None,
            };
            if let Some(event) = event {
                session.handle(event, &mut doc);
            }
        }

        println!();
        println!("document:   {}", doc.committed);
        if session.is_composing() {
            println!("composing:  {}", doc.marked);
        }
        render_candidates(&mut session, &planner, viewport);
        render_layer(&fsm);
    }

    Ok(())
}
