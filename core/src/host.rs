//! The boundary to the editable text target.

/// Minimal interface to the host text field (native text-input proxy, DOM
/// element, terminal document). Implemented once per host; the engine
/// depends on nothing else about the platform.
///
/// Calls are fire-and-forget: the engine does not await acknowledgment,
/// retry, or roll back its own state if the host rejects an edit. The next
/// keystroke recomputes everything from the session's raw buffer.
pub trait HostTextSink {
    /// Replace the pre-edit ("marked") text shown inline while composing.
    /// `cursor_offset_from_end` positions the host cursor counting back from
    /// the end of the composed text; the session always passes 0.
    fn set_composing_text(&mut self, text: &str, cursor_offset_from_end: usize);

    /// Finalize text into the document, ending any active composition.
    fn commit_text(&mut self, text: &str);

    /// Delete one character before the cursor in the host document.
    fn delete_backward(&mut self);
}
