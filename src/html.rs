//! Static HTML snapshot of a report view.
//!
//! Serializes the view's current UI tree (selection highlight, rendered case
//! list, open detail panels) into a self-contained page.

use chrono::NaiveDateTime;

use crate::dom::escape;
use crate::view::ReportView;

const BASE_CSS: &str = "\
body { font-family: sans-serif; margin: 1em; }
#testResults { display: flex; flex-wrap: wrap; gap: 2px; margin-bottom: 1em; }
.group { cursor: pointer; }
.row { padding: 4px; border-bottom: 1px solid #ddd; cursor: pointer; }
.duration { float: right; }
.console { display: block; white-space: pre-wrap; font-family: monospace; }
.detail { font-size: smaller; margin-top: 4px; }
";

/// Date stamp in the form `March 4, 2026 09:05:01`.
pub fn execution_date(stamp: NaiveDateTime) -> String {
    stamp.format("%B %-d, %Y %H:%M:%S").to_string()
}

/// Renders the full page for `view`.
pub fn render_page(view: &ReportView, title: &str, stamp: NaiveDateTime) -> String {
    let summary = view.store().summary();
    let doc = view.document();
    let title = escape(title, false);
    let css = doc.stylesheet().to_css();
    let date = execution_date(stamp);
    let groups = doc.outer_html(view.group_list());
    let cases = doc.outer_html(view.case_list());
    let (total, passed, failed, skipped) = (
        summary.total(),
        summary.passed,
        summary.failed,
        summary.skipped,
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
{BASE_CSS}{css}</style>
</head>
<body>
<header>
<h1>{title}</h1>
<div class="summary">Total: {total} | Passed: {passed} | Failed: {failed} | Skipped: {skipped}</div>
<div class="executionDate">{date}</div>
</header>
{groups}
{cases}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::store;
    use crate::view::{ClickEvent, ViewConfig};
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 4)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
    }

    #[test]
    fn execution_date_format() {
        assert_eq!(execution_date(stamp()), "March 4, 2026 09:05:01");
    }

    #[test]
    fn page_contains_summary_selectors_and_css() {
        let view = ReportView::mount(store(), ViewConfig::default());
        let page = render_page(&view, "My <Report>", stamp());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>My &lt;Report&gt;</title>"));
        assert!(page.contains("Total: 6 | Passed: 5 | Failed: 1 | Skipped: 0"));
        assert!(page.contains(".group.failed { background-color: red; }"));
        assert!(page.contains("<div class=\"group failed\" id=\"0\""));
        assert!(page.contains("<div id=\"testGroupList\"></div>"));
    }

    #[test]
    fn page_reflects_view_state() {
        let mut view = ReportView::mount(store(), ViewConfig::default());
        let target = view.group_selectors()[0];
        view.dispatch(ClickEvent::shift(target));
        let page = render_page(&view, "r", stamp());
        assert_eq!(page.matches("<div class=\"output\">").count(), 3);
        assert!(page.contains("background-color: black;"));
        assert!(page.contains("<span class=\"console failed\">=== RUN TestBeta\n--- FAIL\n</span>"));
    }
}
