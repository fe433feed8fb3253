use core::fmt::Display;
use core::str::FromStr;

use strum::{EnumIter, IntoEnumIterator};
use tilegen_common::{ConfigError, PaddingTag, format::camel_to_snake};

use tilegen_common::PaddingTag::{NoPadding, PaddingBlockNd, PaddingNd, PaddingNz};

/// Kernel families reachable through the dispatch tables.
///
/// The serial is the most significant byte of every tiling key of the family and must never
/// change once released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum KernelFamily {
    CommonMatmul,
    SmallMatmul,
    PaddingCommonMatmul,
    PaddingMultiCoreSplitkMatmul,
    PaddingSingleCoreSplitkKLoopOuterMatmul,
}

/// Padding tags a family is instantiated with, per operand.
///
/// `c` is `None` when the kernel has no padding template argument for C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingSets {
    pub a: &'static [PaddingTag],
    pub b: &'static [PaddingTag],
    pub c: Option<&'static [PaddingTag]>,
}

/// Padding tags of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaddingTuple {
    pub a: PaddingTag,
    pub b: PaddingTag,
    pub c: Option<PaddingTag>,
}

impl PaddingTuple {
    /// Tags in template argument order.
    pub fn tags(&self) -> Vec<PaddingTag> {
        let mut tags = vec![self.a, self.b];
        tags.extend(self.c);
        tags
    }
}

const ALL_PADDINGS: &[PaddingTag] = &[NoPadding, PaddingNd, PaddingBlockNd, PaddingNz];
const NZ_PADDINGS: &[PaddingTag] = &[NoPadding, PaddingNz];
const ND_PADDINGS: &[PaddingTag] = &[NoPadding, PaddingNd];

impl KernelFamily {
    pub fn serial(&self) -> u8 {
        match self {
            KernelFamily::CommonMatmul => 0,
            KernelFamily::SmallMatmul => 1,
            KernelFamily::PaddingCommonMatmul => 2,
            KernelFamily::PaddingMultiCoreSplitkMatmul => 3,
            KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul => 4,
        }
    }

    /// Name of the kernel function template, e.g. `CommonMatmulKernel`.
    pub fn kernel_name(&self) -> &'static str {
        match self {
            KernelFamily::CommonMatmul => "CommonMatmulKernel",
            KernelFamily::SmallMatmul => "SmallMatmulKernel",
            KernelFamily::PaddingCommonMatmul => "PaddingCommonMatmulKernel",
            KernelFamily::PaddingMultiCoreSplitkMatmul => "PaddingMultiCoreSplitkMatmulKernel",
            KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul => {
                "PaddingSingleCoreSplitkKLoopOuterMatmulKernel"
            }
        }
    }

    /// Name used in configuration files and on the command line.
    pub fn name(&self) -> String {
        camel_to_snake(self.kernel_name().trim_end_matches("Kernel"))
    }

    /// Header declaring the launch and workspace templates.
    pub fn header(&self) -> String {
        format!("kernel/{}.h", camel_to_snake(self.kernel_name()))
    }

    /// Whether the kernel templates take the architecture tag as first argument.
    pub fn takes_arch_tag(&self) -> bool {
        match self {
            KernelFamily::CommonMatmul
            | KernelFamily::PaddingMultiCoreSplitkMatmul
            | KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul => true,
            KernelFamily::SmallMatmul | KernelFamily::PaddingCommonMatmul => false,
        }
    }

    /// Whether the launch forwards the workspace pointer.
    pub fn uses_workspace(&self) -> bool {
        self.padding_sets().is_some()
    }

    pub fn padding_sets(&self) -> Option<PaddingSets> {
        match self {
            KernelFamily::CommonMatmul | KernelFamily::SmallMatmul => None,
            KernelFamily::PaddingCommonMatmul => Some(PaddingSets {
                a: ALL_PADDINGS,
                b: ALL_PADDINGS,
                c: Some(ND_PADDINGS),
            }),
            KernelFamily::PaddingMultiCoreSplitkMatmul => Some(PaddingSets {
                a: NZ_PADDINGS,
                b: NZ_PADDINGS,
                c: None,
            }),
            KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul => Some(PaddingSets {
                a: NZ_PADDINGS,
                b: NZ_PADDINGS,
                c: Some(ND_PADDINGS),
            }),
        }
    }

    /// Padding tuples in generation order, `[None]` for families without padding.
    pub fn padding_tuples(&self) -> Vec<Option<PaddingTuple>> {
        let Some(sets) = self.padding_sets() else {
            return vec![None];
        };

        let c_tags: Vec<Option<PaddingTag>> = match sets.c {
            Some(tags) => tags.iter().copied().map(Some).collect(),
            None => vec![None],
        };

        let mut tuples = Vec::new();
        for a in sets.a {
            for b in sets.b {
                for c in c_tags.iter() {
                    tuples.push(Some(PaddingTuple {
                        a: *a,
                        b: *b,
                        c: *c,
                    }));
                }
            }
        }
        tuples
    }
}

impl Display for KernelFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.kernel_name())
    }
}

impl FromStr for KernelFamily {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        KernelFamily::iter()
            .find(|family| family.name() == value || family.kernel_name() == value)
            .ok_or_else(|| ConfigError::UnknownTag {
                kind: "kernel family",
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn serials_are_unique() {
        let mut serials: Vec<_> = KernelFamily::iter().map(|f| f.serial()).collect();
        serials.sort();
        serials.dedup();

        assert_eq!(serials, vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    #[case(KernelFamily::CommonMatmul, "common_matmul", "kernel/common_matmul_kernel.h")]
    #[case(
        KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul,
        "padding_single_core_splitk_k_loop_outer_matmul",
        "kernel/padding_single_core_splitk_k_loop_outer_matmul_kernel.h"
    )]
    fn names_and_headers(
        #[case] family: KernelFamily,
        #[case] name: &str,
        #[case] header: &str,
    ) {
        assert_eq!(family.name(), name);
        assert_eq!(family.header(), header);
        assert_eq!(name.parse::<KernelFamily>().unwrap(), family);
    }

    #[rstest]
    #[case(KernelFamily::CommonMatmul, 1)]
    #[case(KernelFamily::SmallMatmul, 1)]
    #[case(KernelFamily::PaddingCommonMatmul, 32)]
    #[case(KernelFamily::PaddingMultiCoreSplitkMatmul, 4)]
    #[case(KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul, 8)]
    fn padding_tuple_counts(#[case] family: KernelFamily, #[case] count: usize) {
        assert_eq!(family.padding_tuples().len(), count);
    }

    #[test]
    fn padding_tuples_vary_c_fastest() {
        let tuples = KernelFamily::PaddingSingleCoreSplitkKLoopOuterMatmul.padding_tuples();

        assert_eq!(
            tuples[..2].to_vec(),
            vec![
                Some(PaddingTuple {
                    a: NoPadding,
                    b: NoPadding,
                    c: Some(NoPadding)
                }),
                Some(PaddingTuple {
                    a: NoPadding,
                    b: NoPadding,
                    c: Some(PaddingNd)
                }),
            ]
        );
    }

    #[test]
    fn unknown_family_is_rejected() {
        let err = "batched_matmul".parse::<KernelFamily>().unwrap_err();

        assert!(matches!(err, ConfigError::UnknownTag { kind: "kernel family", .. }));
    }
}
