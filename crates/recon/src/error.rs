use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (missing section, bad segment layout, etc.).
    ConfigValidation(String),
    /// A mode section references a role that is not declared.
    UnknownRole(String),
    /// `mode` names a section that is absent from the job file.
    ModeMismatch { mode: String },
    /// Missing required column in input data.
    MissingColumn { role: String, column: String },
    /// No table was loaded for a role the mode needs.
    MissingInput(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownRole(role) => write!(f, "unknown role: {role}"),
            Self::ModeMismatch { mode } => {
                write!(f, "mode = \"{mode}\" requires a [{mode}] section")
            }
            Self::MissingColumn { role, column } => {
                write!(f, "role '{role}': missing column '{column}'")
            }
            Self::MissingInput(role) => write!(f, "role '{role}': no table loaded"),
        }
    }
}

impl std::error::Error for ReconError {}
