//! Report view: the interaction controller over the UI tree.
//!
//! The view owns the document, the two containers (group selectors and case
//! list) and the selection context. Clicks arrive through [`ReportView::dispatch`],
//! the single delegated entry point, and are routed by the container that
//! holds the target.
//!
//! - Clicking a group highlights it and re-renders the case list.
//! - Shift-click expands every case of the group.
//! - A group with exactly one case expands it automatically.
//! - Clicking a case row toggles its detail panel.
//!
//! Stray clicks (no identifying attributes, unknown ids) are ignored.

pub mod detail;
pub mod render;
pub mod selection;

pub use detail::Expansion;
pub use selection::SelectionState;

use crate::dom::{Document, NodeId, Stylesheet};
use crate::model::{ReportError, ResultStore};

use render::{GROUP_ATTR, GROUP_SELECTOR_ATTR, INDEX_ATTR};

/// Background used to mark the selected group.
pub const DEFAULT_HIGHLIGHT: &str = "black";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Pixel size of a group selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSize {
    pub width: u32,
    pub height: u32,
}

impl IndicatorSize {
    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Parses `"24"` (square) or `"32x16"` (width x height).
    pub fn parse(value: &str) -> Result<Self, ReportError> {
        let value = value.trim().to_lowercase();
        let dimension = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| ReportError::InvalidSize(value.clone()))
        };
        match value.split_once('x') {
            None => Ok(Self::square(dimension(&value)?)),
            Some((_, h)) if h.contains('x') => Err(ReportError::InvalidSize(format!(
                "{value} (only one x is allowed)"
            ))),
            Some((w, h)) => Ok(Self {
                width: dimension(w)?,
                height: dimension(h)?,
            }),
        }
    }
}

impl Default for IndicatorSize {
    fn default() -> Self {
        Self::square(24)
    }
}

/// View settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Background applied to the selected group.
    pub highlight: String,
    /// Group clicked when an event carries no target.
    pub default_group: Option<usize>,
    pub indicator_size: IndicatorSize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            highlight: DEFAULT_HIGHLIGHT.to_string(),
            default_group: None,
            indicator_size: IndicatorSize::default(),
        }
    }
}

/// Stylesheet of the report page. Group colours come from here, which is
/// what selection reads back when it records the colour to restore.
pub fn report_stylesheet() -> Stylesheet {
    Stylesheet::new()
        .rule(".group", "background-color", "green")
        .rule(".group.skipped", "background-color", "yellow")
        .rule(".group.failed", "background-color", "red")
        .rule(".row.failed", "color", "red")
        .rule(".status", "color", "green")
        .rule(".status.failed", "color", "red")
        .rule(".console", "color", "gray")
        .rule(".console.failed", "color", "red")
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// A click delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickEvent {
    /// Element under the pointer. Synthetic events may carry none.
    pub target: Option<NodeId>,
    pub shift_key: bool,
}

impl ClickEvent {
    pub const fn on(target: NodeId) -> Self {
        Self {
            target: Some(target),
            shift_key: false,
        }
    }

    pub const fn shift(target: NodeId) -> Self {
        Self {
            target: Some(target),
            shift_key: true,
        }
    }
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing matched; the tree is untouched.
    Ignored,
    /// A group was selected and its cases rendered; `expanded` rows were opened.
    GroupSelected { group: usize, expanded: usize },
    /// A case row's panel was toggled.
    Toggled {
        group: usize,
        index: usize,
        expansion: Expansion,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Report View
// ─────────────────────────────────────────────────────────────────────────────

/// Interaction controller for one report view.
#[derive(Debug)]
pub struct ReportView {
    store: ResultStore,
    doc: Document,
    group_list: NodeId,
    case_list: NodeId,
    selection: SelectionState,
    default_target: Option<NodeId>,
    config: ViewConfig,
}

impl ReportView {
    /// Binds a view to an existing document and its two containers.
    pub fn new(
        store: ResultStore,
        doc: Document,
        group_list: NodeId,
        case_list: NodeId,
        config: ViewConfig,
    ) -> Self {
        let default_target = config.default_group.and_then(|id| {
            doc.children(group_list)
                .iter()
                .copied()
                .find(|c| doc.attr(*c, GROUP_SELECTOR_ATTR) == Some(id.to_string().as_str()))
        });
        Self {
            store,
            doc,
            group_list,
            case_list,
            selection: SelectionState::new(),
            default_target,
            config,
        }
    }

    /// Builds a fresh document with both containers and one selector per group.
    pub fn mount(store: ResultStore, config: ViewConfig) -> Self {
        let mut doc = Document::new(report_stylesheet());
        let root = doc.root();
        let group_list = doc.create_element("div");
        doc.set_attr(group_list, "id", "testResults");
        doc.append_child(root, group_list);
        let case_list = doc.create_element("div");
        doc.set_attr(case_list, "id", "testGroupList");
        doc.append_child(root, case_list);
        let selectors = render::render_group_selectors(&store, config.indicator_size);
        doc.replace_children(group_list, &selectors);
        Self::new(store, doc, group_list, case_list, config)
    }

    pub const fn store(&self) -> &ResultStore {
        &self.store
    }

    pub const fn document(&self) -> &Document {
        &self.doc
    }

    pub const fn group_list(&self) -> NodeId {
        self.group_list
    }

    pub const fn case_list(&self) -> NodeId {
        self.case_list
    }

    /// Group selector elements, in group order.
    pub fn group_selectors(&self) -> &[NodeId] {
        self.doc.children(self.group_list)
    }

    /// Rendered case rows, in case order.
    pub fn rows(&self) -> &[NodeId] {
        self.doc.children(self.case_list)
    }

    /// Id of the group whose cases are currently rendered.
    pub fn selected_group(&self) -> Option<usize> {
        self.selection
            .active()
            .and_then(|el| self.doc.attr(el, GROUP_SELECTOR_ATTR))
            .and_then(|id| id.parse().ok())
    }

    /// Routes a click to the container holding its target.
    pub fn dispatch(&mut self, event: ClickEvent) -> Outcome {
        let Some(target) = event.target.or(self.default_target) else {
            tracing::debug!("click without target and no default target");
            return Outcome::Ignored;
        };
        if self.doc.contains(self.group_list, target) {
            self.group_list_click(target, event.shift_key)
        } else if self.doc.contains(self.case_list, target) {
            self.case_list_click(target)
        } else {
            tracing::debug!(?target, "click outside both containers");
            Outcome::Ignored
        }
    }

    /// Handles a click inside the group list.
    pub fn group_list_click(&mut self, target: NodeId, shift_key: bool) -> Outcome {
        let Some(selector) = self
            .doc
            .closest_with_attr(target, GROUP_SELECTOR_ATTR, self.group_list)
        else {
            tracing::debug!(?target, "group click without group id");
            return Outcome::Ignored;
        };
        let Some(group_id) = self
            .doc
            .attr(selector, GROUP_SELECTOR_ATTR)
            .and_then(|v| v.parse::<usize>().ok())
        else {
            tracing::debug!(?selector, "group id is not an index");
            return Outcome::Ignored;
        };
        let Some(group) = self.store.group(group_id) else {
            tracing::debug!(group_id, "group id not in report");
            return Outcome::Ignored;
        };

        self.selection
            .select(&mut self.doc, selector, &self.config.highlight);
        let rows = self
            .doc
            .replace_children(self.case_list, &render::render_cases(group));

        let to_expand: &[NodeId] = if shift_key {
            &rows
        } else if rows.len() == 1 {
            &rows[..1]
        } else {
            &[]
        };
        for (row, case) in to_expand.iter().zip(&group.cases) {
            detail::toggle(&mut self.doc, *row, case);
        }
        tracing::debug!(
            group_id,
            cases = rows.len(),
            expanded = to_expand.len(),
            shift_key,
            "group selected"
        );
        Outcome::GroupSelected {
            group: group_id,
            expanded: to_expand.len(),
        }
    }

    /// Handles a click inside the case list.
    pub fn case_list_click(&mut self, target: NodeId) -> Outcome {
        let Some(row) = self.doc.closest_with_attr(target, INDEX_ATTR, self.case_list) else {
            return Outcome::Ignored;
        };
        let parse = |name: &str| {
            self.doc
                .attr(row, name)
                .and_then(|v| v.parse::<usize>().ok())
        };
        let (Some(group), Some(index)) = (parse(GROUP_ATTR), parse(INDEX_ATTR)) else {
            tracing::debug!(?row, "case row with malformed attributes");
            return Outcome::Ignored;
        };
        let Some(case) = self.store.case(group, index) else {
            tracing::debug!(group, index, "case not in report");
            return Outcome::Ignored;
        };
        let expansion = detail::toggle(&mut self.doc, row, case);
        tracing::debug!(group, index, ?expansion, "case toggled");
        Outcome::Toggled {
            group,
            index,
            expansion,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
