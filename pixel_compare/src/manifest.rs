//! Plain-text batch manifests.
//!
//! One pair per line as `row,image1,image2`. A line containing a tab is split on
//! tabs instead, so paths with commas can still be listed. Blank lines and lines
//! starting with `#` are ignored. Relative paths resolve against the manifest's
//! directory.

use std::path::{Path, PathBuf};

use crate::error::{CompareError, Result};
use crate::pipeline::ComparisonItem;

/// Reads and parses the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Vec<ComparisonItem>> {
    let text = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_manifest(&text, base_dir)
}

pub fn parse_manifest(text: &str, base_dir: &Path) -> Result<Vec<ComparisonItem>> {
    let mut items = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let separator = if line.contains('\t') { '\t' } else { ',' };
        let fields: Vec<&str> = line.splitn(3, separator).map(str::trim).collect();
        let [row, first, second] = fields[..] else {
            return Err(CompareError::Manifest {
                line: line_number,
                reason: format!("expected 3 fields, found {}", fields.len()),
            });
        };

        let row_index = row.parse::<u32>().map_err(|_| CompareError::Manifest {
            line: line_number,
            reason: format!("row `{row}` is not a non-negative integer"),
        })?;
        if first.is_empty() || second.is_empty() {
            return Err(CompareError::Manifest {
                line: line_number,
                reason: "empty image path".to_string(),
            });
        }

        items.push(ComparisonItem::new(
            row_index,
            resolve(base_dir, first),
            resolve(base_dir, second),
        ));
    }

    Ok(items)
}

fn resolve(base_dir: &Path, field: &str) -> PathBuf {
    let path = Path::new(field);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_tab_lines() {
        let text = "# row,a,b\n1,a.png,b.png\n\n2\tx, 1.png\ty.png\n";
        let items = parse_manifest(text, Path::new("/data")).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], ComparisonItem::new(1, "/data/a.png", "/data/b.png"));
        assert_eq!(items[1].row_index, 2);
        assert_eq!(items[1].image1_path, PathBuf::from("/data/x, 1.png"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let items = parse_manifest("3, /abs/a.png , rel/b.png", Path::new("/base")).unwrap();
        assert_eq!(items[0].image1_path, PathBuf::from("/abs/a.png"));
        assert_eq!(items[0].image2_path, PathBuf::from("/base/rel/b.png"));
    }

    #[test]
    fn missing_field_reports_line_number() {
        let error = parse_manifest("1,a.png,b.png\n\n7,only_one.png", Path::new(".")).unwrap_err();
        match error {
            CompareError::Manifest { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_row_is_rejected() {
        let error = parse_manifest("-1,a.png,b.png", Path::new(".")).unwrap_err();
        assert!(error.to_string().contains("manifest line 1"));
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(parse_manifest("1,,b.png", Path::new(".")).is_err());
    }

    #[test]
    fn empty_manifest_is_empty_batch() {
        assert!(parse_manifest("\n# nothing\n", Path::new(".")).unwrap().is_empty());
    }
}
