use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug)]
pub enum ScanError {
    Io { path: PathBuf, source: std::io::Error },
    Walk(walkdir::Error),
    InvalidPath(PathBuf),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ScanError::Walk(err) => write!(f, "failed to scan pages: {}", err),
            ScanError::InvalidPath(path) => write!(f, "invalid page path: {}", path.display()),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Io { source, .. } => Some(source),
            ScanError::Walk(err) => Some(err),
            ScanError::InvalidPath(_) => None,
        }
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        ScanError::Walk(err)
    }
}

/// One content file, read eagerly at scan time. `output_path` mirrors the
/// file's position under the pages root into the build root, so two
/// distinct sources can never write the same output.
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub content: Vec<u8>,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
}

pub struct PageScanner {
    pages_dir: PathBuf,
    build_dir: PathBuf,
}

impl PageScanner {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(pages_dir: P, build_dir: Q) -> Self {
        Self {
            pages_dir: pages_dir.as_ref().to_path_buf(),
            build_dir: build_dir.as_ref().to_path_buf(),
        }
    }

    /// Collect every `.md` file under the pages root, nested directories
    /// included. Entries are visited in file-name order so repeated runs
    /// see the same sequence regardless of what the filesystem returns.
    /// Anything that is not a markdown file is silently skipped; any read
    /// failure aborts the scan with the offending path.
    pub fn scan(&self) -> Result<Vec<Page>, ScanError> {
        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.pages_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().map(|ext| ext == "md").unwrap_or(false) {
                pages.push(self.scan_page(path)?);
            }
        }

        Ok(pages)
    }

    fn scan_page(&self, path: &Path) -> Result<Page, ScanError> {
        let content = fs::read(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let relative = path
            .strip_prefix(&self.pages_dir)
            .map_err(|_| ScanError::InvalidPath(path.to_path_buf()))?;
        let title = relative
            .file_stem()
            .ok_or_else(|| ScanError::InvalidPath(path.to_path_buf()))?
            .to_string_lossy()
            .to_string();

        Ok(Page {
            title,
            content,
            source_path: path.to_path_buf(),
            output_path: self.build_dir.join(relative).with_extension("html"),
        })
    }
}
