use crate::domain::models::{Metadata, MetadataField};
use regex::Regex;
use std::sync::OnceLock;

/// Field table: each field matches `# <Label>:` at line start, optional
/// whitespace, then captures the rest of the line.
fn matchers() -> &'static [(MetadataField, Regex)] {
    static TABLE: OnceLock<Vec<(MetadataField, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        MetadataField::ALL
            .iter()
            .map(|f| {
                let pattern = format!(r"^# {}:\s*(.+)", regex::escape(f.label()));
                let re = Regex::new(&pattern).expect("static metadata pattern compiles");
                (*f, re)
            })
            .collect()
    })
}

/// Scans script text line by line. The first matching line per field wins.
pub fn extract(contents: &str) -> Metadata {
    let mut out = Metadata::default();
    for line in contents.lines() {
        if out.len() == MetadataField::ALL.len() {
            break;
        }
        for (field, re) in matchers() {
            if out.contains(*field) {
                continue;
            }
            if let Some(value) = re.captures(line).and_then(|c| c.get(1)) {
                out.insert_first(*field, value.as_str());
            }
        }
    }
    out
}
