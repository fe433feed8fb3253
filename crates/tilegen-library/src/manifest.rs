use std::path::Path;

use hashbrown::HashMap;
use tilegen_common::{
    ArchTag, GenerateError,
    config::{Logger, library::LibraryConfig},
};
use tilegen_gemm::OperationKind;

use crate::{EmissionReport, Operation, OperationRegistry, emit::LibraryEmitter};

/// Maximum number of operations the downstream compiler is guaranteed to process.
pub const MAX_OPERATIONS: usize = 10_000;

/// Options of a generation run.
#[derive(new, Debug, Clone, Default)]
pub struct ManifestOptions {
    /// Substrings an operation name must contain to be retained. Empty retains everything.
    pub kernel_filter: Vec<String>,
    /// Target architecture.
    pub arch: ArchTag,
}

impl ManifestOptions {
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self::new(config.kernels.clone(), config.arch)
    }

    fn keeps(&self, name: &str) -> bool {
        self.kernel_filter.is_empty()
            || self
                .kernel_filter
                .iter()
                .any(|pattern| name.contains(pattern.as_str()))
    }
}

/// Catalog of the operations of one generation run.
///
/// Operations are identified by kind and name. Appending an operation already present
/// replaces it while keeping its original position, so emission order is the order of first
/// registration. The manifest is consumed by [emit](Manifest::emit).
#[derive(Debug)]
pub struct Manifest {
    options: ManifestOptions,
    operations: Vec<Box<dyn Operation>>,
    index: HashMap<(OperationKind, String), usize>,
    filtered_out: usize,
    skipped: Vec<String>,
}

impl Manifest {
    pub fn new(options: ManifestOptions) -> Self {
        Self {
            options,
            operations: Vec::new(),
            index: HashMap::new(),
            filtered_out: 0,
            skipped: Vec::new(),
        }
    }

    pub fn arch(&self) -> ArchTag {
        self.options.arch
    }

    /// Adds an operation, returning whether it passed the kernel filter.
    pub fn append<O: Operation + 'static>(&mut self, operation: O) -> bool {
        if !self.options.keeps(operation.name()) {
            self.filtered_out += 1;
            return false;
        }

        let key = (operation.kind(), operation.name().to_string());
        match self.index.get(&key) {
            Some(position) => self.operations[*position] = Box::new(operation),
            None => {
                self.index.insert(key, self.operations.len());
                self.operations.push(Box::new(operation));
            }
        }

        true
    }

    /// Runs the registration callbacks, high priority ones first.
    pub fn run(&mut self, registry: &OperationRegistry) -> Result<(), GenerateError> {
        let resolved = registry.resolve();

        for name in resolved.skipped {
            log::warn!(
                "Skipping default registration of {name} due to a high priority registration"
            );
            self.skipped.push(name.to_string());
        }

        for (name, func) in resolved.callbacks {
            let before = self.operations.len();
            func(self)?;
            log::debug!(
                "Registration {name} added {} operations",
                self.operations.len() - before
            );
        }

        log::info!("Operations that will be generated in total: {}", self.len());

        self.check_ceiling()
    }

    /// Fails when more than [MAX_OPERATIONS] operations are retained.
    pub fn check_ceiling(&self) -> Result<(), GenerateError> {
        if self.len() > MAX_OPERATIONS {
            return Err(GenerateError::TooManyVariants {
                count: self.len(),
                max: MAX_OPERATIONS,
            });
        }

        Ok(())
    }

    /// Number of distinct operations retained.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Retained operations in emission order.
    pub fn operations(&self) -> impl Iterator<Item = &dyn Operation> {
        self.operations.iter().map(|op| op.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.operations().map(|op| op.name()).collect()
    }

    /// Operation kinds present, in order of first appearance.
    pub fn kinds(&self) -> Vec<OperationKind> {
        let mut kinds = Vec::new();
        for op in self.operations.iter() {
            if !kinds.contains(&op.kind()) {
                kinds.push(op.kind());
            }
        }
        kinds
    }

    /// Operations dropped by the kernel filter.
    pub fn filtered_out(&self) -> usize {
        self.filtered_out
    }

    /// Default registrations that were overridden.
    pub fn skipped_registrations(&self) -> &[String] {
        &self.skipped
    }

    /// Writes the kernel library under `root`, which is removed and recreated.
    ///
    /// Every source is rendered before the output root is touched.
    pub fn emit(self, root: &Path, logger: &mut Logger) -> Result<EmissionReport, GenerateError> {
        self.check_ceiling()?;

        let emitter = LibraryEmitter::render(&self, logger);
        emitter.write(root)
    }
}
