use tilegen_common::{ArchTag, ElementType};
use tilegen_dispatch::{DispatchGenerator, KernelFamily};

#[macro_export]
macro_rules! load_source_string {
    ($file:expr) => {
        include_str!($file)
            .replace("\r\n", "\n")
            .trim_end()
            .to_string()
    };
}

pub fn half_generator(families: &[KernelFamily]) -> DispatchGenerator {
    DispatchGenerator::new(
        ArchTag::AtlasA2,
        vec![ElementType::Fp16],
        families.to_vec(),
    )
}

pub fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
