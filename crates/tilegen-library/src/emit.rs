use core::fmt::{Display, Write};
use std::path::{Path, PathBuf};

use tilegen_common::{
    GenerateError,
    config::{Logger, library::LibraryLogLevel},
    fs::{ensure_dir, prepare_output_root, write_file},
};
use tilegen_gemm::{OperationKind, RenderedOperation};

use crate::Manifest;

/// Maximum number of translation units generated per operation kind.
pub const GROUP_FILE_NUM: usize = 64;

/// Name of the top-level registration unit.
pub const REGISTER_ALL_FILE: &str = "register_all_kernels_generated.cpp";

const LIBRARY_HEADERS: &str =
    "#include \"catlass/library/operation.h\"\n#include \"catlass/library/manifest.h\"\n";

/// One translation unit accumulating the bodies of several operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelGroupFile {
    file_name: String,
    operation_headers: Vec<&'static [&'static str]>,
    kernel_headers: Vec<String>,
    common_decls: Vec<String>,
    bodies: Vec<String>,
}

impl KernelGroupFile {
    pub fn new(file_name: String) -> Self {
        Self {
            file_name,
            operation_headers: Vec::new(),
            kernel_headers: Vec::new(),
            common_decls: Vec::new(),
            bodies: Vec::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    pub fn add_headers(&mut self, headers: &'static [&'static str]) {
        if !self.operation_headers.contains(&headers) {
            self.operation_headers.push(headers);
        }
    }

    pub fn add_instance(&mut self, rendered: RenderedOperation) {
        self.add_headers(rendered.operation_headers);
        push_unique(&mut self.kernel_headers, rendered.kernel_header);
        push_unique(&mut self.common_decls, rendered.common_decls);
        self.bodies.push(rendered.body);
    }
}

impl Display for KernelGroupFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for block in self.operation_headers.iter() {
            for line in block.iter() {
                writeln!(f, "{line}")?;
            }
            f.write_char('\n')?;
        }

        for header in self.kernel_headers.iter() {
            writeln!(f, "{header}")?;
        }
        if !self.kernel_headers.is_empty() {
            f.write_char('\n')?;
        }

        f.write_str("namespace Catlass {\n")?;
        f.write_str("namespace Library {\n")?;
        f.write_str("using namespace Catlass;\n\n")?;

        let decls = self.common_decls.iter().filter(|decl| !decl.is_empty());
        let mut any_decl = false;
        for decl in decls {
            writeln!(f, "{decl}")?;
            any_decl = true;
        }
        if any_decl {
            f.write_char('\n')?;
        }

        for body in self.bodies.iter() {
            f.write_str(body)?;
            f.write_char('\n')?;
        }

        f.write_str("}\n}\n")
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Assigns operations of one kind to at most [GROUP_FILE_NUM] translation units.
///
/// Files are created in round-robin order until the limit is reached, then reused in the same
/// round-robin order.
#[derive(Debug)]
pub struct TranslationUnitBucketer {
    kind: OperationKind,
    files: Vec<KernelGroupFile>,
    curr_file_id: usize,
}

impl TranslationUnitBucketer {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            files: Vec::new(),
            curr_file_id: 0,
        }
    }

    pub fn add(&mut self, rendered: RenderedOperation) {
        self.next_file().add_instance(rendered);
    }

    pub fn files(&self) -> &[KernelGroupFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<KernelGroupFile> {
        self.files
    }

    fn next_file(&mut self) -> &mut KernelGroupFile {
        let index = if self.files.len() < GROUP_FILE_NUM {
            let mut file = KernelGroupFile::new(format!(
                "catlass_{}_kernel_group_{}.cpp",
                self.kind, self.curr_file_id
            ));
            file.add_headers(self.kind.headers());
            self.files.push(file);
            self.files.len() - 1
        } else {
            self.curr_file_id
        };

        self.curr_file_id = (self.curr_file_id + 1) % GROUP_FILE_NUM;
        &mut self.files[index]
    }
}

/// Registration glue of one operation kind: declares and calls every `Register_` function.
#[derive(new, Debug)]
pub struct OperationRegistration<'a> {
    kind: OperationKind,
    names: Vec<&'a str>,
}

impl OperationRegistration<'_> {
    pub fn file_name(&self) -> String {
        format!("register_all_{}_operations.cpp", self.kind)
    }

    pub fn function_name(&self) -> String {
        format!("RegisterCatlass{}Operations", self.kind)
    }
}

impl Display for OperationRegistration<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(LIBRARY_HEADERS)?;
        f.write_str("\nnamespace Catlass {\nnamespace Library {\n\n")?;

        for name in self.names.iter() {
            writeln!(f, "void Register_{name}(Manifest &manifest);")?;
        }

        writeln!(f, "\nvoid {}(Manifest &manifest)", self.function_name())?;
        f.write_str("{\n")?;
        for name in self.names.iter() {
            writeln!(f, "    Register_{name}(manifest);")?;
        }
        f.write_str("}\n\n}\n}\n")
    }
}

/// Top-level unit calling the registration function of every operation kind.
#[derive(new, Debug)]
pub struct AllKernelsRegistration {
    functions: Vec<String>,
}

impl Display for AllKernelsRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(LIBRARY_HEADERS)?;
        f.write_str("\nnamespace Catlass {\nnamespace Library {\n\n")?;

        for function in self.functions.iter() {
            writeln!(f, "void {function}(Manifest &manifest);")?;
        }

        f.write_str("\nvoid RegisterAllKernels(Manifest &manifest)\n{\n")?;
        for function in self.functions.iter() {
            writeln!(f, "    {function}(manifest);")?;
        }
        f.write_str("}\n\n}\n}\n")
    }
}

/// Files written for one operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: OperationKind,
    pub operations: usize,
    /// Translation units, in creation order.
    pub group_files: Vec<PathBuf>,
    pub registration_file: PathBuf,
}

/// Summary of an emitted kernel library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionReport {
    pub root: PathBuf,
    pub kinds: Vec<KindReport>,
    pub register_all_file: PathBuf,
}

impl EmissionReport {
    /// Every file written, in write order.
    pub fn files(&self) -> Vec<&Path> {
        let mut files = Vec::new();
        for kind in self.kinds.iter() {
            files.extend(kind.group_files.iter().map(PathBuf::as_path));
            files.push(kind.registration_file.as_path());
        }
        files.push(self.register_all_file.as_path());
        files
    }
}

struct RenderedKind {
    kind: OperationKind,
    operations: usize,
    group_files: Vec<KernelGroupFile>,
    registration: (String, String),
}

/// Fully rendered library, written in a single pass.
pub(crate) struct LibraryEmitter {
    kinds: Vec<RenderedKind>,
    register_all: String,
}

impl LibraryEmitter {
    pub(crate) fn render(manifest: &Manifest, logger: &mut Logger) -> Self {
        let mut kinds = Vec::new();
        let mut functions = Vec::new();

        for kind in manifest.kinds() {
            let mut bucketer = TranslationUnitBucketer::new(kind);
            let mut names = Vec::new();

            for op in manifest.operations().filter(|op| op.kind() == kind) {
                if let LibraryLogLevel::Full = logger.log_level_library() {
                    logger.log_library(&format_args!("generating kernel: {}", op.name()));
                }
                names.push(op.name());
                bucketer.add(op.render());
            }

            let registration = OperationRegistration::new(kind, names);
            functions.push(registration.function_name());
            let group_files = bucketer.into_files();

            if let LibraryLogLevel::Basic | LibraryLogLevel::Full = logger.log_level_library() {
                logger.log_library(&format_args!(
                    "{kind}: {} operations in {} translation units",
                    registration.names.len(),
                    group_files.len()
                ));
            }

            kinds.push(RenderedKind {
                kind,
                operations: registration.names.len(),
                group_files,
                registration: (registration.file_name(), registration.to_string()),
            });
        }

        Self {
            kinds,
            register_all: AllKernelsRegistration::new(functions).to_string(),
        }
    }

    pub(crate) fn write(self, root: &Path) -> Result<EmissionReport, GenerateError> {
        prepare_output_root(root)?;
        let mut reports = Vec::new();

        for rendered in self.kinds {
            let dir = root.join(rendered.kind.name());
            ensure_dir(&dir)?;

            let mut group_files = Vec::new();
            for file in rendered.group_files {
                let path = dir.join(file.file_name());
                write_file(&path, &file.to_string())?;
                group_files.push(path);
            }

            let (file_name, content) = rendered.registration;
            let registration_file = dir.join(file_name);
            write_file(&registration_file, &content)?;

            reports.push(KindReport {
                kind: rendered.kind,
                operations: rendered.operations,
                group_files,
                registration_file,
            });
        }

        let register_all_file = root.join(REGISTER_ALL_FILE);
        write_file(&register_all_file, &self.register_all)?;

        Ok(EmissionReport {
            root: root.to_path_buf(),
            kinds: reports,
            register_all_file,
        })
    }
}
