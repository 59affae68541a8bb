//! Diagram source text.
//!
//! - [`SourceBuffer`]: the rope-backed text being edited
//! - [`Preset`]: the built-in example diagrams
//! - [`diagram_kind`]: diagram type keyword for the status bar

mod buffer;
mod presets;

pub use buffer::{Cursor, Direction, SourceBuffer};
pub use presets::{DEFAULT_SOURCE, Preset, SYNTAX_GUIDE};

use std::sync::LazyLock;

use regex::Regex;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9-]*)").expect("valid diagram header pattern")
});

/// Diagram type keyword from the first meaningful line (`graph`,
/// `sequenceDiagram`, ...). Skips blank lines, `%%` comments and YAML
/// front matter.
pub fn diagram_kind(source: &str) -> Option<&str> {
    let mut in_front_matter = false;
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed == "---" {
            in_front_matter = !in_front_matter;
            continue;
        }
        if in_front_matter || trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }
        return HEADER.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str());
    }
    None
}
