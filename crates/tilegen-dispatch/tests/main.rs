use common::*;
use pretty_assertions::assert_eq;
use tilegen_common::{ArchTag, ElementType, LayoutTag, PaddingTag, config::Logger};
use tilegen_dispatch::{
    KernelFamily, LAUNCH_MAP_FILE, PaddingTuple, TilingKey, TilingKeyFields, WrapperVariant,
};

mod common;

#[test]
pub fn common_matmul_wrapper_source() {
    let variant = WrapperVariant::new(
        KernelFamily::CommonMatmul,
        ArchTag::AtlasA2,
        ElementType::Fp16,
        LayoutTag::RowMajor,
        LayoutTag::RowMajor,
        None,
    )
    .unwrap();
    let expected = load_source_string!("common_matmul_kernel_half_layout00.cpp");

    assert_eq!(variant.file_name(), "common_matmul_kernel_half_layout00.cpp");
    assert_eq!(variant.source().trim_end(), expected);
}

#[test]
pub fn padded_wrapper_source() {
    let variant = WrapperVariant::new(
        KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul,
        ArchTag::AtlasA2,
        ElementType::Fp16,
        LayoutTag::RowMajor,
        LayoutTag::ColumnMajor,
        Some(PaddingTuple {
            a: PaddingTag::PaddingNz,
            b: PaddingTag::NoPadding,
            c: Some(PaddingTag::PaddingNd),
        }),
    )
    .unwrap();
    let expected = load_source_string!(
        "padding_single_core_splitk_k_loop_outer_matmul_kernel_half_layout01_padding301.cpp"
    );

    assert_eq!(
        variant.tiling_key(),
        TilingKey::encode(TilingKeyFields::new(4, 0, 0, 1, 0, 3, 0, 1)).unwrap()
    );
    assert_eq!(variant.source().trim_end(), expected);
}

#[test]
pub fn generates_wrappers_and_launch_map() {
    let tmp = tempfile::tempdir().unwrap();
    let wrapper_dir = tmp.path().join("impl/wrapper");
    let include_dir = tmp.path().join("include");
    let generator = half_generator(&[KernelFamily::CommonMatmul]);

    let report = generator
        .generate(&wrapper_dir, &include_dir, &mut Logger::disabled())
        .unwrap();

    let names: Vec<_> = report
        .wrapper_files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "common_matmul_kernel_half_layout00.cpp",
            "common_matmul_kernel_half_layout01.cpp",
            "common_matmul_kernel_half_layout10.cpp",
            "common_matmul_kernel_half_layout11.cpp",
        ]
    );
    assert_eq!(report.launch_map_file, include_dir.join(LAUNCH_MAP_FILE));
    assert_eq!(
        read(&report.launch_map_file).trim_end(),
        load_source_string!("launch_map_common_matmul.h")
    );
    assert_eq!(
        read(&wrapper_dir.join("common_matmul_kernel_half_layout00.cpp")).trim_end(),
        load_source_string!("common_matmul_kernel_half_layout00.cpp")
    );
}

#[test]
pub fn generation_is_reproducible() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = half_generator(&[
        KernelFamily::CommonMatmul,
        KernelFamily::SmallMatmul,
        KernelFamily::PaddingCommonMatmul,
    ]);
    let run = |name: &str| {
        let wrapper_dir = tmp.path().join(name).join("wrapper");
        let include_dir = tmp.path().join(name).join("include");
        let report = generator
            .generate(&wrapper_dir, &include_dir, &mut Logger::disabled())
            .unwrap();
        let mut contents: Vec<_> = report.wrapper_files.iter().map(|path| read(path)).collect();
        contents.push(read(&report.launch_map_file));
        contents
    };

    let first = run("first");
    let second = run("second");

    assert_eq!(first.len(), 136 + 1);
    assert_eq!(first, second);
}

#[test]
pub fn stale_launch_map_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let include_dir = tmp.path().join("include");
    std::fs::create_dir_all(&include_dir).unwrap();
    std::fs::write(
        include_dir.join(LAUNCH_MAP_FILE),
        "// stale header with a much longer content than the one generated below".repeat(200),
    )
    .unwrap();
    let generator = half_generator(&[KernelFamily::CommonMatmul]);

    generator
        .generate(&tmp.path().join("wrapper"), &include_dir, &mut Logger::disabled())
        .unwrap();

    assert_eq!(
        read(&include_dir.join(LAUNCH_MAP_FILE)).trim_end(),
        load_source_string!("launch_map_common_matmul.h")
    );
}
