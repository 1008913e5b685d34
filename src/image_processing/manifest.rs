use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Dataset split an image is assigned to.
///
/// The partition label in the manifest is the index into [`Split::ALL`], so
/// label 0 is train, 1 is validation and 2 is synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
    Synthesis,
}

impl Split {
    /// Processing order, also the label -> split mapping
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Synthesis];

    /// Name of the output directory for this split
    pub fn dir_name(&self) -> &'static str {
        match self {
            Split::Train => "train_data",
            Split::Val => "val_data",
            Split::Synthesis => "synthesis_data",
        }
    }

    /// Map a partition label to its split
    pub fn from_label(label: u8) -> Option<Split> {
        Split::ALL.get(label as usize).copied()
    }

    fn index(&self) -> usize {
        match self {
            Split::Train => 0,
            Split::Val => 1,
            Split::Synthesis => 2,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Filenames of the evaluation partition list, grouped by split.
///
/// Each group keeps the row order of the manifest file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Manifest {
    groups: [Vec<String>; 3],
}

impl Manifest {
    /// Read and parse a partition file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }

    /// Parse `<filename> <label>` rows separated by whitespace.
    /// Blank lines are ignored, anything else that does not fit is an error.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut manifest = Manifest::default();
        let mut seen = HashSet::new();

        for (line_idx, line) in contents.lines().enumerate() {
            let line_no = line_idx + 1;
            let columns: Vec<&str> = line.split_whitespace().collect();

            if columns.is_empty() {
                continue;
            }

            if columns.len() != 2 {
                return Err(anyhow::anyhow!(
                    "Line {}: expected 2 columns (filename, partition), found {}",
                    line_no,
                    columns.len()
                ));
            }

            let filename = columns[0];
            let label: u8 = columns[1].parse().map_err(|_| {
                anyhow::anyhow!(
                    "Line {}: invalid partition label '{}' for {}",
                    line_no,
                    columns[1],
                    filename
                )
            })?;

            let split = Split::from_label(label).ok_or_else(|| {
                anyhow::anyhow!(
                    "Line {}: partition label {} for {} is out of range (expected 0, 1 or 2)",
                    line_no,
                    label,
                    filename
                )
            })?;

            if !seen.insert(filename) {
                return Err(anyhow::anyhow!(
                    "Line {}: {} is listed more than once",
                    line_no,
                    filename
                ));
            }

            manifest.groups[split.index()].push(filename.to_string());
        }

        Ok(manifest)
    }

    /// Filenames assigned to a split, in manifest order
    pub fn filenames(&self, split: Split) -> &[String] {
        &self.groups[split.index()]
    }

    /// Iterate over the splits in processing order
    pub fn iter(&self) -> impl Iterator<Item = (Split, &[String])> {
        Split::ALL
            .into_iter()
            .map(move |split| (split, self.filenames(split)))
    }

    /// Total number of rows across all splits
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_label_mapping() {
        assert_eq!(Split::from_label(0), Some(Split::Train));
        assert_eq!(Split::from_label(1), Some(Split::Val));
        assert_eq!(Split::from_label(2), Some(Split::Synthesis));
        assert_eq!(Split::from_label(3), None);

        assert_eq!(Split::Train.dir_name(), "train_data");
        assert_eq!(Split::Val.dir_name(), "val_data");
        assert_eq!(Split::Synthesis.to_string(), "synthesis_data");
    }

    #[test]
    fn test_parse_groups_preserve_order() {
        let manifest = Manifest::parse(
            "000001.jpg 0\n000002.jpg 2\n000003.jpg 0\n000004.jpg 1\n000005.jpg 0\n",
        )
        .unwrap();

        assert_eq!(
            manifest.filenames(Split::Train),
            ["000001.jpg", "000003.jpg", "000005.jpg"]
        );
        assert_eq!(manifest.filenames(Split::Val), ["000004.jpg"]);
        assert_eq!(manifest.filenames(Split::Synthesis), ["000002.jpg"]);
        assert_eq!(manifest.len(), 5);
    }

    #[test]
    fn test_parse_tolerates_blank_lines_and_extra_spaces() {
        let manifest = Manifest::parse("\n000001.jpg   0\r\n\n\t000002.jpg\t1\n").unwrap();

        assert_eq!(manifest.filenames(Split::Train), ["000001.jpg"]);
        assert_eq!(manifest.filenames(Split::Val), ["000002.jpg"]);
        assert!(manifest.filenames(Split::Synthesis).is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_column_count() {
        let err = Manifest::parse("000001.jpg 0\n000002.jpg\n").unwrap_err();
        assert!(err.to_string().contains("Line 2"));

        assert!(Manifest::parse("000001.jpg 0 extra\n").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_labels() {
        assert!(Manifest::parse("000001.jpg train\n").is_err());
        assert!(Manifest::parse("000001.jpg -1\n").is_err());

        let err = Manifest::parse("000001.jpg 3\n").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_parse_rejects_duplicate_filenames() {
        let err = Manifest::parse("000001.jpg 0\n000001.jpg 1\n").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_iter_follows_processing_order() {
        let manifest = Manifest::parse("a.jpg 2\nb.jpg 1\nc.jpg 0\n").unwrap();
        let order: Vec<Split> = manifest.iter().map(|(split, _)| split).collect();
        assert_eq!(order, Split::ALL);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::parse("").unwrap();
        assert!(manifest.is_empty());
        assert_eq!(manifest.iter().count(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "000001.jpg 0").unwrap();
        writeln!(file, "000002.jpg 1").unwrap();

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }
}
