//! Expandable detail panel attached to a case row.
//!
//! Expansion is not tracked anywhere else: a row is expanded exactly when it
//! has an `output` panel child, so re-rendering the case list resets it.

use crate::dom::{Document, Element, Markup, NodeId};
use crate::model::TestCase;

pub const PANEL_CLASS: &str = "output";

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Expanded,
    Collapsed,
}

/// The panel attached to `row`, if any.
pub fn panel(doc: &Document, row: NodeId) -> Option<NodeId> {
    doc.children(row)
        .iter()
        .copied()
        .find(|c| doc.has_class(*c, PANEL_CLASS))
}

pub fn is_expanded(doc: &Document, row: NodeId) -> bool {
    panel(doc, row).is_some()
}

/// Expands a collapsed row or collapses an expanded one.
pub fn toggle(doc: &mut Document, row: NodeId, case: &TestCase) -> Expansion {
    if let Some(existing) = panel(doc, row) {
        doc.remove(existing);
        return Expansion::Collapsed;
    }
    doc.append_markup(row, &render_panel(case));
    Expansion::Expanded
}

fn render_panel(case: &TestCase) -> Markup {
    Element::new("div")
        .class(PANEL_CLASS)
        .child(
            Element::new("span")
                .class("console")
                .class_if(!case.passed, "failed")
                .text(case.console_text()),
        )
        .child(
            Element::new("div")
                .class("detail")
                .child(
                    Element::new("div")
                        .class("package")
                        .child(Element::new("strong").text("Package:"))
                        .text(format!(" {}", case.package)),
                )
                // The report data has no filename; the label stays empty.
                .child(
                    Element::new("div")
                        .class("filename")
                        .child(Element::new("strong").text("Filename:"))
                        .text(" "),
                ),
        )
        .into()
}
