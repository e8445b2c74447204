//! Group selection: the single highlighted group and its original colour.

use crate::dom::{Document, NodeId};

const BACKGROUND: &str = "background-color";

/// Tracks which group selector is highlighted and the colour to restore
/// when the highlight moves elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active: Option<NodeId>,
    restore_color: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn restore_color(&self) -> Option<&str> {
        self.restore_color.as_deref()
    }

    /// Highlights `element`, restoring the previously selected element first.
    ///
    /// The element's computed background is read before it is touched, so
    /// selecting the same element twice still restores its original colour.
    pub fn select(&mut self, doc: &mut Document, element: NodeId, highlight: &str) {
        if let Some(previous) = self.active.take() {
            match self.restore_color.take() {
                Some(color) => doc.set_style(previous, BACKGROUND, &color),
                None => doc.remove_style(previous, BACKGROUND),
            }
        }
        self.restore_color = doc.computed_style(element, BACKGROUND);
        doc.set_style(element, BACKGROUND, highlight);
        self.active = Some(element);
        tracing::trace!(?element, restore = ?self.restore_color(), "group highlighted");
    }
}
