use std::fmt::{Debug, Display};
use std::path::PathBuf;

/// Errors caused by an invalid generator input.
///
/// They are always detected before any file is written.
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The search step is zero or not a multiple of the hardware alignment unit.
    StepNotAligned { step: u32, alignment: u32 },

    /// A tile-shape axis range is empty or starts at zero.
    InvalidRange {
        axis: &'static str,
        min: u32,
        max: u32,
    },

    /// The kernel type name has no template.
    UnknownKernelType(String),

    /// A string does not name any member of a tag enum.
    UnknownTag { kind: &'static str, value: String },

    /// A tiling-key field does not fit in its sub-field.
    TilingFieldOutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },

    /// The tag has no representation in the dispatch tables.
    UnsupportedDispatchType { kind: &'static str, value: String },

    /// A configuration file could not be parsed.
    InvalidFile { path: PathBuf, reason: String },
}

/// Errors that abort a generation run.
pub enum GenerateError {
    /// The generator input is invalid.
    InvalidConfig(ConfigError),

    /// More operations were retained than the downstream compiler can process.
    TooManyVariants { count: usize, max: usize },

    /// The output root is a symbolic link and will not be deleted through.
    OutputPathIsSymlink(PathBuf),

    /// Two distinct dispatch variants packed to the same tiling key.
    KeyCollision {
        key: String,
        existing: String,
        incoming: String,
    },

    /// A filesystem operation failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl GenerateError {
    /// Attaches the path that caused an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ConfigError> for GenerateError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::StepNotAligned { step, alignment } => write!(
                f,
                "Step {step} must be a positive multiple of the alignment unit {alignment}."
            ),
            ConfigError::InvalidRange { axis, min, max } => write!(
                f,
                "Range of axis {axis} is invalid: min={min}, max={max}. Expected 0 < min <= max."
            ),
            ConfigError::UnknownKernelType(name) => {
                write!(f, "Unknown kernel type: {name}.")
            }
            ConfigError::UnknownTag { kind, value } => {
                write!(f, "Unknown {kind}: {value}.")
            }
            ConfigError::TilingFieldOutOfRange { field, value, max } => write!(
                f,
                "Tiling key field {field} has value {value}, larger than the maximum {max}."
            ),
            ConfigError::UnsupportedDispatchType { kind, value } => {
                write!(f, "The {kind} {value} can't be used in dispatch tables.")
            }
            ConfigError::InvalidFile { path, reason } => write!(
                f,
                "The file {} doesn't have the right format: {reason}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::InvalidConfig(err) => {
                write!(f, "Unable to generate kernels because the config is invalid: {err:?}")
            }
            GenerateError::TooManyVariants { count, max } => write!(
                f,
                "Too many operations ({count}), the downstream compiler supports at most {max}. \
                 Narrow the search space or the kernel filter."
            ),
            GenerateError::OutputPathIsSymlink(path) => write!(
                f,
                "Refusing to delete the output directory {} because it is a symbolic link.",
                path.display()
            ),
            GenerateError::KeyCollision {
                key,
                existing,
                incoming,
            } => write!(
                f,
                "Tiling key {key} is shared by {existing} and {incoming}."
            ),
            GenerateError::Io { path, source } => {
                write!(f, "IO error on {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::InvalidConfig(err) => Some(err),
            GenerateError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
