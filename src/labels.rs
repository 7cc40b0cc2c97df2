use std::path::Path;

use crate::error::ConfigError;

/// Class names in the order the model was trained with.
pub const DEFAULT_LABELS: [&str; 3] = ["chicken", "slon", "horse"];

/// Ordered, immutable label set. Index `i` names output `i` of the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet(Vec<String>);

impl Default for LabelSet {
    fn default() -> Self {
        Self(DEFAULT_LABELS.iter().map(|l| l.to_string()).collect())
    }
}

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    /// One label per line; blank lines and surrounding whitespace are skipped.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::LabelsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let labels = Self::parse(&text);
        if labels.is_empty() {
            return Err(ConfigError::NoLabels(path.to_path_buf()));
        }
        Ok(labels)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_order_matches_training() {
        let labels = LabelSet::default();
        assert_eq!(labels.get(0), Some("chicken"));
        assert_eq!(labels.get(1), Some("slon"));
        assert_eq!(labels.get(2), Some("horse"));
        assert_eq!(labels.get(3), None);
    }

    #[test]
    fn parse_skips_blank_lines() {
        let labels = LabelSet::parse("  cat \n\n dog\n\n");
        assert_eq!(labels.iter().collect::<Vec<_>>(), ["cat", "dog"]);
    }

    #[test]
    fn loads_labels_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zebra\ngiraffe").unwrap();
        let labels = LabelSet::from_file(file.path()).unwrap();
        assert_eq!(labels, LabelSet::new(["zebra", "giraffe"]));
    }

    #[test]
    fn empty_labels_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = LabelSet::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NoLabels(_)));
    }

    #[test]
    fn missing_labels_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabelSet::from_file(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::LabelsIo { .. }));
    }
}
