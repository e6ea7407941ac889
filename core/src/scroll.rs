//! Candidate strip scroll anchoring.
//!
//! Candidate lists are often wider than the strip that shows them. The
//! planner keeps the highlighted candidate visible while scrolling as little
//! as possible: the viewport is first re-anchored to the element it was last
//! anchored to (so re-rendering the same list does not jump), and only if the
//! highlighted element is clipped does the viewport move, becoming flush with
//! the clipped side. The element and side it moved to are remembered in the
//! [`Selection`] for the next render.

use crate::candidate::Selection;

/// Display extent of one candidate along the scroll axis, in whatever units
/// the renderer measures in (pixels, columns).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub left: f32,
    pub right: f32,
}

impl Extent {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

/// Plans scroll offsets for a candidate strip viewport.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPlanner {
    viewport: f32,
    padding: f32,
}

impl ScrollPlanner {
    /// `viewport` is the visible width of the strip; `padding` is the gap
    /// kept between an anchored element and the viewport edge
    /// ([`crate::Config::scroll_padding`]).
    pub fn new(viewport: f32, padding: f32) -> Self {
        Self { viewport, padding }
    }

    /// Compute the scroll offset for the given extents and selection,
    /// updating the selection's anchor fields when the viewport had to move
    /// to uncover the highlighted element.
    ///
    /// After planning, the highlighted extent lies inside
    /// `[offset, offset + viewport]` whenever it fits at all (an element
    /// wider than the viewport can only be flush on one side).
    pub fn plan(&self, extents: &[Extent], selection: &mut Selection) -> f32 {
        if extents.is_empty() {
            return 0.0;
        }
        selection.clamp_to(extents.len());

        let flush_left = |e: Extent| e.left - self.padding;
        let flush_right = |e: Extent| e.right - self.viewport + self.padding;

        // First restore the view the user last saw
        let anchor = extents[selection.scroll_anchor];
        let mut offset = if selection.anchor_right {
            flush_right(anchor)
        } else {
            flush_left(anchor)
        };

        // Then make sure the highlighted element is uncovered
        let selected = extents[selection.selected];
        if offset + self.viewport < selected.right {
            offset = flush_right(selected);
            selection.scroll_anchor = selection.selected;
            selection.anchor_right = true;
        } else if selected.left < offset {
            offset = flush_left(selected);
            selection.scroll_anchor = selection.selected;
            selection.anchor_right = false;
        }

        offset.max(0.0)
    }
}
