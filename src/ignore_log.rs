//! Append-only log of image pairs the user chose to ignore.
//!
//! Each accepted ignore adds one line `<pathA>:<pathB>` to a text file in the
//! working directory (`ignored_images.txt` by default). Batch drivers read the
//! file back to skip pairs that were already reviewed, in either order.
//!
//! There is no locking: a single writer is assumed.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_IGNORE_LOG: &str = "ignored_images.txt";

/// Handle to the ignore log file.
#[derive(Debug, Clone)]
pub struct IgnoreLog {
    path: PathBuf,
}

impl IgnoreLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `first:second` as a new line, creating the file if needed.
    pub fn append(&self, first: &Path, second: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}:{}", first.display(), second.display())?;
        log::info!(
            "ignored {} : {} (logged to {})",
            first.display(),
            second.display(),
            self.path.display()
        );
        Ok(())
    }

    /// Read every recorded pair. A missing file is an empty log.
    pub fn load(&self) -> io::Result<IgnoredPairs> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(IgnoredPairs::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(IgnoredPairs::default()),
            Err(e) => Err(e),
        }
    }
}

impl Default for IgnoreLog {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_LOG)
    }
}

/// Set of ignored pairs with order-insensitive lookup.
#[derive(Debug, Clone, Default)]
pub struct IgnoredPairs {
    pairs: HashSet<(String, String)>,
}

impl IgnoredPairs {
    /// Parse log content. Blank lines are skipped; lines without a `:` are
    /// skipped with a warning. The first `:` separates the two paths.
    pub fn parse(content: &str) -> Self {
        let mut pairs = HashSet::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((a, b)) => {
                    pairs.insert((a.to_string(), b.to_string()));
                }
                None => log::warn!("ignore log line {}: no ':' separator", lineno + 1),
            }
        }
        Self { pairs }
    }

    /// Whether `first`/`second` were ignored, in either order.
    pub fn contains(&self, first: &Path, second: &Path) -> bool {
        let a = first.display().to_string();
        let b = second.display().to_string();
        self.pairs.contains(&(a.clone(), b.clone())) || self.pairs.contains(&(b, a))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
