use super::logger::{LogLevel, LoggerConfig};
use crate::ArchTag;

/// Settings of the kernel library generator.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LibraryConfig {
    /// Substrings a kernel name must contain to be generated. Empty keeps everything.
    #[serde(default = "kernels_default")]
    pub kernels: Vec<String>,

    /// Target architecture.
    #[serde(default)]
    pub arch: ArchTag,

    /// Logger receiving one line per generated kernel.
    #[serde(default)]
    pub logger: LoggerConfig<LibraryLogLevel>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            kernels: kernels_default(),
            arch: ArchTag::default(),
            logger: LoggerConfig::default(),
        }
    }
}

fn kernels_default() -> Vec<String> {
    vec!["basic_matmul".to_string()]
}

/// Verbosity of the library generation logger.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LibraryLogLevel {
    /// Nothing is logged.
    #[serde(rename = "disabled")]
    Disabled,

    /// One summary line per operation kind.
    #[default]
    #[serde(rename = "basic")]
    Basic,

    /// Every generated kernel is logged.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LibraryLogLevel {}
