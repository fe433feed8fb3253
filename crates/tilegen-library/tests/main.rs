use common::*;
use pretty_assertions::assert_eq;
use tilegen_common::{GenerateError, config::Logger};
use tilegen_gemm::{AxisRange, ElementSizes, KernelType, TileShapePruning, TileShapeRange};
use tilegen_library::{GROUP_FILE_NUM, MAX_OPERATIONS, REGISTER_ALL_FILE};

mod common;

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
pub fn narrow_library_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("generated");
    let mut manifest = unfiltered();
    narrow_basic_matmul().register(&mut manifest).unwrap();

    let report = manifest.emit(&root, &mut Logger::disabled()).unwrap();

    assert_eq!(report.kinds.len(), 1);
    assert_eq!(report.kinds[0].operations, 2);
    assert_eq!(
        read(&root.join("gemm/catlass_gemm_kernel_group_0.cpp")).trim_end(),
        load_source_string!("catlass_gemm_kernel_group_0.cpp")
    );
    assert_eq!(
        read(&root.join("gemm/register_all_gemm_operations.cpp")).trim_end(),
        load_source_string!("register_all_gemm_operations.cpp")
    );
    assert_eq!(
        read(&root.join(REGISTER_ALL_FILE)).trim_end(),
        load_source_string!("register_all_kernels_generated.cpp")
    );
    assert_eq!(report.files().len(), 4);
}

#[test]
pub fn output_is_reproducible() {
    let emit = || {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("generated");
        let mut manifest = unfiltered();
        manifest.run(&registry_with(150)).unwrap();
        let report = manifest.emit(&root, &mut Logger::disabled()).unwrap();

        report
            .files()
            .into_iter()
            .map(|path| {
                (
                    path.strip_prefix(&root).unwrap().to_path_buf(),
                    read(path),
                )
            })
            .collect::<Vec<_>>()
    };

    let first = emit();
    let second = emit();

    assert_eq!(first.len(), GROUP_FILE_NUM + 2);
    assert!(first == second);
}

#[test]
pub fn bucket_count_on_disk_is_bounded() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("generated");
    let mut manifest = unfiltered();
    manifest.run(&registry_with(200)).unwrap();

    manifest.emit(&root, &mut Logger::disabled()).unwrap();

    let group_files = std::fs::read_dir(root.join("gemm"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("catlass_gemm_kernel_group_")
        })
        .count();
    assert_eq!(group_files, GROUP_FILE_NUM);
}

#[test]
pub fn previous_output_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("generated");
    std::fs::create_dir_all(root.join("gemm")).unwrap();
    std::fs::write(root.join("gemm/catlass_gemm_kernel_group_7.cpp"), "stale").unwrap();
    let mut manifest = unfiltered();
    narrow_basic_matmul().register(&mut manifest).unwrap();

    manifest.emit(&root, &mut Logger::disabled()).unwrap();

    assert!(!root.join("gemm/catlass_gemm_kernel_group_7.cpp").exists());
    assert!(root.join("gemm/catlass_gemm_kernel_group_1.cpp").exists());
}

#[test]
pub fn too_many_variants_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("generated");
    let mut manifest = unfiltered();
    let result = manifest.run(&registry_with(MAX_OPERATIONS as u32 + 1));

    assert!(matches!(
        result,
        Err(GenerateError::TooManyVariants { count: 10_001, .. })
    ));

    let err = manifest.emit(&root, &mut Logger::disabled()).unwrap_err();

    assert!(matches!(err, GenerateError::TooManyVariants { .. }));
    assert!(!root.exists());
}

#[cfg(unix)]
#[test]
pub fn symlinked_output_root_is_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("elsewhere");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("keep.cpp"), "keep").unwrap();
    let root = tmp.path().join("generated");
    std::os::unix::fs::symlink(&target, &root).unwrap();
    let mut manifest = unfiltered();
    narrow_basic_matmul().register(&mut manifest).unwrap();

    let err = manifest.emit(&root, &mut Logger::disabled()).unwrap_err();

    assert!(matches!(err, GenerateError::OutputPathIsSymlink(_)));
    assert_eq!(read(&target.join("keep.cpp")), "keep");
}

#[test]
pub fn empty_family_emits_empty_registration() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("generated");
    let mut manifest = unfiltered();
    let impossible = narrow_basic_matmul()
        .with_range(TileShapeRange::with_default_l0(
            AxisRange::fixed(512),
            AxisRange::fixed(512),
            AxisRange::fixed(512),
        ))
        .with_element_sizes(ElementSizes::new(4, 4, 4))
        .with_pruning(TileShapePruning::Pingpong { stages: 8 });

    let retained = impossible.register(&mut manifest).unwrap();
    let report = manifest.emit(&root, &mut Logger::disabled()).unwrap();

    assert_eq!(retained, 0);
    assert!(report.kinds.is_empty());
    assert!(read(&root.join(REGISTER_ALL_FILE)).contains("void RegisterAllKernels(Manifest &manifest)"));
}

#[test]
pub fn stock_registry_generates_both_kernels() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("generated");
    let mut manifest = unfiltered();
    manifest
        .run(&tilegen_library::OperationRegistry::with_defaults())
        .unwrap();
    let names = manifest.names().iter().map(|n| n.to_string()).collect::<Vec<_>>();

    let report = manifest.emit(&root, &mut Logger::disabled()).unwrap();

    assert!(names.iter().any(|n| n.contains(KernelType::BasicMatmul.name())));
    assert!(names.iter().any(|n| n.contains(KernelType::GroupedMatmul.name())));
    assert_eq!(report.kinds[0].group_files.len(), GROUP_FILE_NUM);
}
