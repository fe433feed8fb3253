use std::path::{Path, PathBuf};

use super::dispatch::{DispatchConfig, DispatchLogLevel};
use super::library::{LibraryConfig, LibraryLogLevel};
use crate::{ConfigError, GenerateError};

/// File names searched for, in order, in every directory.
const CONFIG_FILE_NAMES: [&str; 2] = ["tilegen.toml", "Tilegen.toml"];

/// Configuration of a generation run, combining the library and dispatch generator settings.
///
/// The configuration is an explicit value handed to the generators; nothing is read from
/// process-wide state after loading.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GeneratorConfig {
    /// Configuration of the kernel library generator.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Configuration of the dispatch table generator.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl GeneratorConfig {
    /// Loads the configuration from `tilegen.toml` or `Tilegen.toml` in `dir` or its parents.
    ///
    /// Returns the default configuration when no file is found. Environment overrides are
    /// applied afterwards by [override_from_env](GeneratorConfig::override_from_env).
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut dir = dir.to_path_buf();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    log::debug!("Loading configuration from {}", path.display());
                    return Self::from_file_path(&path);
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(Self::default())
    }

    /// Loads the configuration from a specific file.
    pub fn from_file_path(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|err| invalid(err.to_string()))?;

        toml::from_str(&content).map_err(|err| invalid(err.to_string()))
    }

    /// Saves the configuration as pretty TOML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GenerateError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|err| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        crate::fs::write_file(path, &content)
    }

    /// Overrides configuration fields based on environment variables.
    ///
    /// - `TILEGEN_DEBUG_LOG`: `stdout`, `stderr`, `1`/`true` (log to `/tmp/tilegen.log`),
    ///   `0`/`false` (disable) or a file path.
    /// - `TILEGEN_KERNELS`: comma separated kernel filter.
    /// - `TILEGEN_ARCH`: architecture tag.
    /// - `TILEGEN_DTYPES`: comma separated dispatch scalar types.
    pub fn override_from_env(self) -> Result<Self, ConfigError> {
        self.override_from(|key| std::env::var(key).ok())
    }

    /// Same as [override_from_env](GeneratorConfig::override_from_env) with a custom variable
    /// lookup.
    pub fn override_from<F: Fn(&str) -> Option<String>>(
        mut self,
        var: F,
    ) -> Result<Self, ConfigError> {
        if let Some(val) = var("TILEGEN_DEBUG_LOG") {
            self.library.logger.level = LibraryLogLevel::Full;
            self.dispatch.logger.level = DispatchLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.library.logger.stdout = true;
                    self.dispatch.logger.stdout = true;
                }
                "stderr" => {
                    self.library.logger.stderr = true;
                    self.dispatch.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = "/tmp/tilegen.log";
                    self.library.logger.file = Some(file_path.into());
                    self.dispatch.logger.file = Some(file_path.into());
                }
                "0" | "false" => {
                    self.library.logger.level = LibraryLogLevel::Disabled;
                    self.dispatch.logger.level = DispatchLogLevel::Disabled;
                }
                file_path => {
                    self.library.logger.file = Some(PathBuf::from(file_path));
                    self.dispatch.logger.file = Some(PathBuf::from(file_path));
                }
            }
        }

        if let Some(val) = var("TILEGEN_KERNELS") {
            self.library.kernels = split_list(&val);
        }

        if let Some(val) = var("TILEGEN_ARCH") {
            self.library.arch = val.parse()?;
        }

        if let Some(val) = var("TILEGEN_DTYPES") {
            self.dispatch.dtypes = split_list(&val);
        }

        Ok(self)
    }
}

/// Splits a comma separated list, dropping blank entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchTag;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_file() {
        let tmp = tempfile::tempdir().unwrap();

        let config = GeneratorConfig::from_dir(tmp.path()).unwrap();

        assert_eq!(config.library.kernels, vec!["basic_matmul".to_string()]);
        assert_eq!(config.library.arch, ArchTag::AtlasA2);
        assert_eq!(config.dispatch.dtypes, vec!["half".to_string()]);
    }

    #[test]
    fn file_is_found_in_parent_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("tilegen.toml"),
            "[library]\nkernels = [\"grouped_matmul\"]\n\n[library.logger]\nlevel = \"full\"\nstdout = true\n\n[dispatch]\ndtypes = [\"half\", \"float\"]\n",
        )
        .unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = GeneratorConfig::from_dir(&nested).unwrap();

        assert_eq!(config.library.kernels, vec!["grouped_matmul".to_string()]);
        assert_eq!(config.library.logger.level, LibraryLogLevel::Full);
        assert!(config.library.logger.stdout);
        assert_eq!(
            config.dispatch.dtypes,
            vec!["half".to_string(), "float".to_string()]
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Tilegen.toml"), "[library\n").unwrap();

        let err = GeneratorConfig::from_dir(tmp.path()).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidFile { .. }));
    }

    #[test]
    fn saved_config_loads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tilegen.toml");
        let mut config = GeneratorConfig::default();
        config.library.kernels = vec!["basic".to_string(), "grouped".to_string()];

        config.save(&path).unwrap();
        let loaded = GeneratorConfig::from_file_path(&path).unwrap();

        assert_eq!(loaded.library.kernels, config.library.kernels);
    }

    #[test]
    fn env_overrides() {
        let config = GeneratorConfig::default()
            .override_from(|key| match key {
                "TILEGEN_DEBUG_LOG" => Some("stderr".to_string()),
                "TILEGEN_KERNELS" => Some("basic_matmul, grouped_matmul,".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.library.logger.level, LibraryLogLevel::Full);
        assert!(config.library.logger.stderr);
        assert!(config.dispatch.logger.stderr);
        assert_eq!(
            config.library.kernels,
            vec!["basic_matmul".to_string(), "grouped_matmul".to_string()]
        );
    }

    #[test]
    fn debug_log_can_disable_everything() {
        let config = GeneratorConfig::default()
            .override_from(|key| (key == "TILEGEN_DEBUG_LOG").then(|| "0".to_string()))
            .unwrap();

        assert_eq!(config.library.logger.level, LibraryLogLevel::Disabled);
        assert_eq!(config.dispatch.logger.level, DispatchLogLevel::Disabled);
    }

    #[test]
    fn dispatch_dtypes_override() {
        let config = GeneratorConfig::default()
            .override_from(|key| (key == "TILEGEN_DTYPES").then(|| "half,float".to_string()))
            .unwrap();

        assert_eq!(
            config.dispatch.dtypes,
            vec!["half".to_string(), "float".to_string()]
        );
        assert_eq!(config.dispatch.families.len(), 3);
    }

    #[test]
    fn unknown_arch_override_is_rejected() {
        let err = GeneratorConfig::default()
            .override_from(|key| (key == "TILEGEN_ARCH").then(|| "AtlasZ9".to_string()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::UnknownTag { kind: "arch", .. }));
    }
}
