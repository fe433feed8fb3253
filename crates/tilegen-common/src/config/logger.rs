use super::GeneratorConfig;
use super::dispatch::DispatchLogLevel;
use super::library::LibraryLogLevel;
use crate::GenerateError;
use core::fmt::Display;
use hashbrown::HashMap;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
};

/// Configuration for logging in tilegen, parameterized by a log level type.
///
/// Note that you can use multiple loggers at the same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional `log` crate level to forward messages to.
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// The log level for this logger, determining verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: Some(LogCrateLevel::default()),
            level: L::default(),
        }
    }
}

/// Log levels using the `log` crate.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

fn append_default() -> bool {
    true
}

/// Trait for types that can be used as log levels in `LoggerConfig`.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Binary log level for enabling or disabling logging.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryLogLevel {
    /// Logging is disabled.
    #[serde(rename = "disabled")]
    Disabled,

    /// Logging is fully enabled.
    #[default]
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for BinaryLogLevel {}

/// Routes generation traces to the sinks of the configuration.
///
/// A sink shared by the library and the dispatch loggers is opened once.
#[derive(Debug)]
pub struct Logger {
    loggers: Vec<LoggerKind>,
    library_index: Vec<usize>,
    dispatch_index: Vec<usize>,
    library_level: LibraryLogLevel,
    dispatch_level: DispatchLogLevel,
}

#[derive(Hash, PartialEq, Eq)]
enum LoggerId {
    File(PathBuf),
    Stdout,
    Stderr,
    LogCrate(LogCrateLevel),
}

struct Registry {
    loggers: Vec<LoggerKind>,
    logger2index: HashMap<LoggerId, usize>,
}

impl Registry {
    fn register<L: LogLevel>(
        &mut self,
        config: &LoggerConfig<L>,
        setting_index: &mut Vec<usize>,
    ) -> Result<(), GenerateError> {
        if let Some(file) = &config.file {
            let append = config.append;
            self.insert(setting_index, LoggerId::File(file.clone()), || {
                FileLogger::new(file, append).map(LoggerKind::File)
            })?;
        }

        if config.stdout {
            self.insert(setting_index, LoggerId::Stdout, || Ok(LoggerKind::Stdout))?;
        }

        if config.stderr {
            self.insert(setting_index, LoggerId::Stderr, || Ok(LoggerKind::Stderr))?;
        }

        if let Some(level) = config.log {
            self.insert(setting_index, LoggerId::LogCrate(level), || {
                Ok(LoggerKind::Log(level))
            })?;
        }

        Ok(())
    }

    fn insert<F: FnOnce() -> Result<LoggerKind, GenerateError>>(
        &mut self,
        setting_index: &mut Vec<usize>,
        id: LoggerId,
        create: F,
    ) -> Result<(), GenerateError> {
        if let Some(index) = self.logger2index.get(&id) {
            setting_index.push(*index);
        } else {
            let index = self.loggers.len();
            self.loggers.push(create()?);
            self.logger2index.insert(id, index);
            setting_index.push(index);
        }

        Ok(())
    }
}

impl Logger {
    /// Creates a new `Logger` opening every sink enabled in the configuration.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let mut registry = Registry {
            loggers: Vec::new(),
            logger2index: HashMap::new(),
        };
        let mut library_index = Vec::new();
        let mut dispatch_index = Vec::new();

        if config.library.logger.level != LibraryLogLevel::Disabled {
            registry.register(&config.library.logger, &mut library_index)?;
        }

        if config.dispatch.logger.level != DispatchLogLevel::Disabled {
            registry.register(&config.dispatch.logger, &mut dispatch_index)?;
        }

        Ok(Self {
            loggers: registry.loggers,
            library_index,
            dispatch_index,
            library_level: config.library.logger.level,
            dispatch_level: config.dispatch.logger.level,
        })
    }

    /// A logger without any sink.
    pub fn disabled() -> Self {
        Self {
            loggers: Vec::new(),
            library_index: Vec::new(),
            dispatch_index: Vec::new(),
            library_level: LibraryLogLevel::Disabled,
            dispatch_level: DispatchLogLevel::Disabled,
        }
    }

    /// Logs a message to all library loggers.
    pub fn log_library<S: Display>(&mut self, msg: &S) {
        let msg = msg.to_string();
        for i in 0..self.library_index.len() {
            let index = self.library_index[i];
            self.loggers[index].log(&msg);
        }
    }

    /// Logs a message to all dispatch loggers.
    pub fn log_dispatch<S: Display>(&mut self, msg: &S) {
        let msg = msg.to_string();
        for i in 0..self.dispatch_index.len() {
            let index = self.dispatch_index[i];
            self.loggers[index].log(&msg);
        }
    }

    /// Returns the library log level.
    pub fn log_level_library(&self) -> LibraryLogLevel {
        self.library_level
    }

    /// Returns the dispatch log level.
    pub fn log_level_dispatch(&self) -> DispatchLogLevel {
        self.dispatch_level
    }
}

#[derive(Debug)]
enum LoggerKind {
    File(FileLogger),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log(&mut self, msg: &str) {
        match self {
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

#[derive(Debug)]
struct FileLogger {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileLogger {
    fn new(path: &PathBuf, append: bool) -> Result<Self, GenerateError> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path)
            .map_err(|err| GenerateError::io(path, err))?;

        Ok(Self {
            path: path.clone(),
            writer: BufWriter::new(file),
        })
    }

    // A failed trace write must not abort generation.
    fn log(&mut self, msg: &str) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());
        if let Err(err) = result {
            log::warn!("Unable to write to log file {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shared_file_sink_is_opened_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("trace.log");
        let mut config = GeneratorConfig::default();
        config.library.logger.file = Some(path.clone());
        config.library.logger.log = None;
        config.library.logger.level = LibraryLogLevel::Full;
        config.dispatch.logger.file = Some(path.clone());
        config.dispatch.logger.log = None;

        let mut logger = Logger::new(&config).unwrap();
        logger.log_library(&"generating kernel: a");
        logger.log_dispatch(&"generating wrapper: b");

        assert_eq!(logger.loggers.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "generating kernel: a\ngenerating wrapper: b\n"
        );
    }

    #[test]
    fn disabled_area_has_no_sink() {
        let mut config = GeneratorConfig::default();
        config.library.logger.level = LibraryLogLevel::Disabled;
        config.library.logger.stdout = true;

        let logger = Logger::new(&config).unwrap();

        assert!(logger.library_index.is_empty());
        assert_eq!(logger.dispatch_index.len(), 1);
        assert_eq!(logger.log_level_library(), LibraryLogLevel::Disabled);
    }
}
