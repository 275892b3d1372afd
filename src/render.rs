//! Renderer collaborators: apply a `CoverageSet` to a document.
use std::io::Write;
use std::ops::Range;

use serde::Serialize;

use crate::config::Composition;
use crate::error::Error;
use crate::types::{CoverageSet, CoverageState};

const RESET: &str = "\x1b[0m";

/// Clear-screen and cursor-home sequence used before a full repaint.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// One applied decoration in a `DecorationLayer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoration {
    /// One-based, end-exclusive character positions.
    pub range: Range<u64>,
    /// Coverage state of the range.
    pub state: CoverageState,
    /// Style token the host maps to a face.
    pub style: &'static str,
}

/// In-memory decoration store with full-replace semantics.
#[derive(Debug, Default)]
pub struct DecorationLayer {
    /// Currently applied decorations, in annotation order.
    decorations: Vec<Decoration>,
}

impl DecorationLayer {
    /// Decorations from the most recent `apply`, empty after `clear`.
    pub fn decorations(&self) -> &[Decoration] {
        return &self.decorations;
    }
}

/// Applies resolved annotations to a live presentation surface.
/// `apply` is a full replace: nothing from an earlier set survives it, and
/// a failed `apply` should leave the earlier set in place where it can.
pub trait Renderer {
    /// Replace whatever is shown with a resolved set over `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the presentation surface cannot be written.
    fn apply(&mut self, document: &str, set: &CoverageSet) -> Result<(), Error>;

    /// Remove every decoration this renderer applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the presentation surface cannot be written.
    fn clear(&mut self) -> Result<(), Error>;
}

impl Renderer for DecorationLayer {
    fn apply(&mut self, _document: &str, set: &CoverageSet) -> Result<(), Error> {
        self.decorations = set
            .iter()
            .map(|a| {
                return Decoration {
                    range: a.range.clone(),
                    state: a.state,
                    style: a.state.style_token(),
                };
            })
            .collect();
        return Ok(());
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.decorations.clear();
        return Ok(());
    }
}

/// How `render_annotated` marks covered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// ANSI colors, one per state.
    Ansi,
    /// `{style-token text}` runs, for terminals without color and for tests.
    Plain,
}

/// Writes the annotated document to a terminal or any other writer.
pub struct TerminalRenderer<W> {
    /// Overlap policy.
    composition: Composition,
    /// Output markup.
    markup: Markup,
    /// Destination.
    out: W,
    /// A frame has been written and would need repainting over.
    painted: bool,
}

impl<W: Write> TerminalRenderer<W> {
    /// Build a renderer writing to `out`.
    pub fn new(out: W, markup: Markup, composition: Composition) -> Self {
        return Self { composition, markup, out, painted: false };
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn apply(&mut self, document: &str, set: &CoverageSet) -> Result<(), Error> {
        let rendered = render_annotated(document, set, self.composition, self.markup);
        self.clear()?;
        self.out.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        self.painted = true;
        return Ok(());
    }

    /// Repaint the screen only over an earlier frame; a first frame must
    /// not wipe the terminal or leak escapes into redirected output.
    fn clear(&mut self) -> Result<(), Error> {
        if self.painted && self.markup == Markup::Ansi {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.painted = false;
        return Ok(());
    }
}

/// ANSI color for a state.
fn ansi_color(state: CoverageState) -> &'static str {
    return match state {
        CoverageState::BothBranchesTaken => "\x1b[36m",
        CoverageState::ConditionalizedOut => "\x1b[90m",
        CoverageState::Executed => "\x1b[32m",
        CoverageState::NeitherBranchTaken => "\x1b[35m",
        CoverageState::NotExecuted => "\x1b[31m",
        CoverageState::NotInstrumented => "\x1b[2m",
        CoverageState::OneBranchTaken => "\x1b[33m",
    };
}

/// State drawn for each character of the document under `composition`.
fn character_states(
    char_count: usize,
    set: &CoverageSet,
    composition: Composition,
) -> Vec<Option<CoverageState>> {
    let mut states = vec![None; char_count];

    for annotation in set {
        // One-based positions to zero-based character indices.
        let (Ok(start), Ok(end)) = (
            usize::try_from(annotation.range.start.saturating_sub(1)),
            usize::try_from(annotation.range.end.saturating_sub(1)),
        ) else {
            continue;
        };
        let Some(cells) = states.get_mut(start..end.min(char_count)) else {
            continue;
        };
        for cell in cells {
            if composition == Composition::Last || cell.is_none() {
                *cell = Some(annotation.state);
            }
        }
    }

    return states;
}

/// Render `document` with each covered run marked by its state.
pub fn render_annotated(
    document: &str,
    set: &CoverageSet,
    composition: Composition,
    markup: Markup,
) -> String {
    let chars: Vec<char> = document.chars().collect();
    let states = character_states(chars.len(), set, composition);

    let mut out = String::with_capacity(document.len());
    let mut current: Option<CoverageState> = None;

    for (ch, state) in chars.iter().zip(states) {
        if state != current {
            close_run(&mut out, current, markup);
            open_run(&mut out, state, markup);
            current = state;
        }
        out.push(*ch);
    }
    close_run(&mut out, current, markup);

    return out;
}

/// Emit the closing markup for the run in progress, if any.
fn close_run(out: &mut String, state: Option<CoverageState>, markup: Markup) {
    if state.is_none() {
        return;
    }
    match markup {
        Markup::Ansi => out.push_str(RESET),
        Markup::Plain => out.push('}'),
    }
}

/// Emit the opening markup for a new run, if it is covered.
fn open_run(out: &mut String, state: Option<CoverageState>, markup: Markup) {
    let Some(state) = state else {
        return;
    };
    match markup {
        Markup::Ansi => out.push_str(ansi_color(state)),
        Markup::Plain => {
            out.push('{');
            out.push_str(state.style_token());
            out.push(' ');
        },
    }
}
