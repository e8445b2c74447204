//! Report data: test groups and their test cases.
//!
//! The store is built once by the loader and is read-only afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while loading a report document or parsing report flags.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML report: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("unsupported report format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
    #[error("malformed size value: {0}")]
    InvalidSize(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A single test's recorded outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestCase {
    #[serde(rename = "TestName")]
    pub name: String,
    pub package: String,
    #[serde(rename = "ElapsedTime", default)]
    pub elapsed_seconds: f64,
    #[serde(rename = "Output", default)]
    pub output_lines: Vec<String>,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub skipped: bool,
}

impl TestCase {
    /// Concatenated console output, in recorded order, with no separator.
    pub fn console_text(&self) -> String {
        self.output_lines.concat()
    }
}

/// Aggregate status of a group, used to colour its selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupIndicator {
    Passed,
    Failed,
    Skipped,
}

impl GroupIndicator {
    /// CSS modifier class carried by the group selector, if any.
    pub const fn class(self) -> Option<&'static str> {
        match self {
            Self::Passed => None,
            Self::Failed => Some("failed"),
            Self::Skipped => Some("skipped"),
        }
    }
}

/// A collection of test cases reported together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestGroup {
    /// Positional index inside the store; reassigned by [`ResultStore::from_groups`].
    #[serde(skip)]
    pub id: usize,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(rename = "TestResults", default)]
    pub cases: Vec<TestCase>,
}

impl TestGroup {
    /// A group is failed if any case failed without being skipped, skipped if
    /// any case was skipped instead of passing, passed otherwise.
    pub fn indicator(&self) -> GroupIndicator {
        if self.cases.iter().any(|c| !c.passed && !c.skipped) {
            GroupIndicator::Failed
        } else if self.cases.iter().any(|c| !c.passed && c.skipped) {
            GroupIndicator::Skipped
        } else {
            GroupIndicator::Passed
        }
    }

    /// Label shown for the group: its package name, or `group <id>`.
    pub fn label(&self) -> String {
        self.package_name
            .clone()
            .unwrap_or_else(|| format!("group {}", self.id))
    }
}

/// Pass/fail/skip counts over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Store
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered, read-only sequence of test groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    groups: Vec<TestGroup>,
}

impl ResultStore {
    /// Builds a store, assigning every group its positional id.
    pub fn from_groups(mut groups: Vec<TestGroup>) -> Self {
        for (i, group) in groups.iter_mut().enumerate() {
            group.id = i;
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[TestGroup] {
        &self.groups
    }

    pub fn group(&self, id: usize) -> Option<&TestGroup> {
        self.groups.get(id)
    }

    pub fn case(&self, group_id: usize, index: usize) -> Option<&TestCase> {
        self.group(group_id).and_then(|g| g.cases.get(index))
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for case in self.groups.iter().flat_map(|g| &g.cases) {
            if case.passed {
                summary.passed += 1;
            } else if case.skipped {
                summary.skipped += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loader
// ─────────────────────────────────────────────────────────────────────────────

/// Loads a store from a JSON or YAML report document.
pub fn load_store(path: &Path) -> Result<ResultStore, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let groups: Vec<TestGroup> = match ext.as_str() {
        "json" => serde_json::from_str(&content)?,
        "yaml" | "yml" => serde_yaml_ng::from_str(&content)?,
        _ => return Err(ReportError::UnsupportedFormat(ext)),
    };
    tracing::debug!(path = %path.display(), groups = groups.len(), "loaded report");
    Ok(ResultStore::from_groups(groups))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::fixtures::{case, group, store};
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn ids_follow_position() {
        let store = store();
        let ids: Vec<usize> = store.groups().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn lookups_out_of_range_are_none() {
        let store = store();
        assert!(store.group(3).is_none());
        assert!(store.case(0, 3).is_none());
        assert!(store.case(9, 0).is_none());
        assert_eq!(store.case(0, 1).map(|c| c.name.as_str()), Some("TestBeta"));
    }

    #[test]
    fn summary_counts() {
        let mut skipped = case("TestSkip", false, &[]);
        skipped.skipped = true;
        let store = ResultStore::from_groups(vec![group(vec![
            case("a", true, &[]),
            case("b", false, &[]),
            skipped,
        ])]);
        assert_eq!(
            store.summary(),
            Summary {
                passed: 1,
                failed: 1,
                skipped: 1
            }
        );
        assert_eq!(store.summary().total(), 3);
    }

    #[test]
    fn group_indicator() {
        let store = store();
        assert_eq!(store.groups()[0].indicator(), GroupIndicator::Failed);
        assert_eq!(store.groups()[1].indicator(), GroupIndicator::Passed);

        let mut skipped = case("TestSkip", false, &[]);
        skipped.skipped = true;
        let skipped_group = group(vec![case("a", true, &[]), skipped]);
        assert_eq!(skipped_group.indicator(), GroupIndicator::Skipped);

        let mut passed_and_skipped = case("TestBoth", true, &[]);
        passed_and_skipped.skipped = true;
        let store = ResultStore::from_groups(vec![group(vec![passed_and_skipped])]);
        assert_eq!(store.groups()[0].indicator(), GroupIndicator::Passed);
        assert_eq!(store.summary().skipped, 0);
        assert_eq!(GroupIndicator::Skipped.class(), Some("skipped"));
        assert_eq!(GroupIndicator::Passed.class(), None);
    }

    #[test]
    fn console_text_concatenates_without_separator() {
        let c = case("t", true, &["a", "b\n", "c"]);
        assert_eq!(c.console_text(), "ab\nc");
    }

    #[test]
    fn load_json_report() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"PackageName": "example.com/api", "TestResults": [
                {{"TestName": "TestGet", "Package": "example.com/api", "ElapsedTime": 0.5,
                  "Output": ["=== RUN TestGet\n"], "Passed": true}}
            ]}}, {{"TestResults": []}}]"#
        )
        .unwrap();
        let store = load_store(file.path()).unwrap();
        assert_eq!(store.groups().len(), 2);
        assert_eq!(store.groups()[0].label(), "example.com/api");
        assert_eq!(store.groups()[1].label(), "group 1");
        let case = store.case(0, 0).unwrap();
        assert_eq!(case.name, "TestGet");
        assert!(case.passed);
        assert!(!case.skipped);
        assert_eq!(case.elapsed_seconds, 0.5);
    }

    #[test]
    fn load_yaml_report() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "- TestResults:\n    - TestName: TestX\n      Package: pkg\n      Passed: false\n"
        )
        .unwrap();
        let store = load_store(file.path()).unwrap();
        let case = store.case(0, 0).unwrap();
        assert_eq!(case.name, "TestX");
        assert!(!case.passed);
        assert!(case.output_lines.is_empty());
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = load_store(file.path()).unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_store(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
