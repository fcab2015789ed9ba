use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// No file in `dir` matched the role's filename patterns.
    NotFound { dir: PathBuf, patterns: Vec<String> },
    /// The file exists but could not be read or decoded.
    Read { path: PathBuf, message: String },
    /// The requested sheet is not in the workbook.
    Sheet { path: PathBuf, sheet: String },
    /// An output file could not be created or written.
    Write { path: PathBuf, message: String },
    /// Extension we cannot read.
    Unsupported(PathBuf),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { dir, patterns } => write!(
                f,
                "no file in {} matches [{}]",
                dir.display(),
                patterns.join(", ")
            ),
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Sheet { path, sheet } => {
                write!(f, "{}: no sheet matching '{sheet}'", path.display())
            }
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
            Self::Unsupported(path) => write!(f, "unsupported file type: {}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}
