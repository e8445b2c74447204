//! Markup for the group selectors and the case list.

use crate::dom::{Element, Markup};
use crate::model::{ResultStore, TestCase, TestGroup};

use super::IndicatorSize;

pub const PASS_GLYPH: &str = "✓";
pub const FAIL_GLYPH: &str = "✗";
pub const CLOCK_GLYPH: &str = "⏱";

/// Attribute naming the group that owns a case row.
pub const GROUP_ATTR: &str = "data-group-id";
/// Attribute naming a case's position within its group.
pub const INDEX_ATTR: &str = "data-index";
/// Attribute identifying a group selector.
pub const GROUP_SELECTOR_ATTR: &str = "id";

/// Duration text shown on a row, e.g. `"0.25s "`.
pub fn duration_text(elapsed_seconds: f64) -> String {
    format!("{elapsed_seconds}s ")
}

/// One row per case, in group order.
pub fn render_cases(group: &TestGroup) -> Vec<Markup> {
    group
        .cases
        .iter()
        .enumerate()
        .map(|(index, case)| render_row(group.id, index, case))
        .collect()
}

fn render_row(group_id: usize, index: usize, case: &TestCase) -> Markup {
    let failed = !case.passed;
    Element::new("div")
        .class("row")
        .class_if(failed, "failed")
        .attr(GROUP_ATTR, group_id)
        .attr(INDEX_ATTR, index)
        .child(
            Element::new("span")
                .class("status")
                .class_if(failed, "failed")
                .text(if case.passed { PASS_GLYPH } else { FAIL_GLYPH }),
        )
        .child(Element::new("span").class("title").text(case.name.as_str()))
        .child(
            Element::new("span")
                .class("duration")
                .child(Element::new("span").text(duration_text(case.elapsed_seconds)))
                .text(CLOCK_GLYPH),
        )
        .into()
}

/// Clickable selectors, one per group, coloured by the group's outcome.
pub fn render_group_selectors(store: &ResultStore, size: IndicatorSize) -> Vec<Markup> {
    store
        .groups()
        .iter()
        .map(|group| {
            let mut el = Element::new("div").class("group");
            if let Some(class) = group.indicator().class() {
                el = el.class(class);
            }
            el.attr(GROUP_SELECTOR_ATTR, group.id)
                .attr("title", group.label())
                .style("width", format!("{}px", size.width))
                .style("height", format!("{}px", size.height))
                .into()
        })
        .collect()
}
