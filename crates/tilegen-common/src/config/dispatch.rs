use super::logger::{BinaryLogLevel, LoggerConfig};

/// Settings of the dispatch table generator.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DispatchConfig {
    /// Scalar types to generate wrappers for, by name (`half`, `float`).
    #[serde(default = "dtypes_default")]
    pub dtypes: Vec<String>,

    /// Kernel families to generate wrappers for, by name (`common_matmul`, ...).
    #[serde(default = "families_default")]
    pub families: Vec<String>,

    /// Logger receiving one line per generated wrapper.
    #[serde(default)]
    pub logger: LoggerConfig<DispatchLogLevel>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dtypes: dtypes_default(),
            families: families_default(),
            logger: LoggerConfig::default(),
        }
    }
}

fn dtypes_default() -> Vec<String> {
    vec!["half".to_string()]
}

fn families_default() -> Vec<String> {
    ["common_matmul", "small_matmul", "padding_common_matmul"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Verbosity of the dispatch generation logger.
pub type DispatchLogLevel = BinaryLogLevel;
