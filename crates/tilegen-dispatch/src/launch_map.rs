use core::fmt::Display;

use hashbrown::{HashMap, HashSet};
use tilegen_common::GenerateError;

use crate::tiling_key::TilingKey;

/// File name of the rendered dispatch header.
pub const LAUNCH_MAP_FILE: &str = "launch_map.h";

/// Tiling key to generated function name, in insertion order.
///
/// Renders the forward declarations and the three parallel lookup tables consumed by the
/// runtime dispatcher: launch function, workspace-size function and display name.
#[derive(Debug, Default, Clone)]
pub struct LaunchMap {
    entries: Vec<(TilingKey, String)>,
    index: HashMap<TilingKey, usize>,
}

impl LaunchMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    ///
    /// Inserting the same pair twice is a no-op, a key already bound to another function is a
    /// [collision](GenerateError::KeyCollision).
    pub fn insert(&mut self, key: TilingKey, name: &str) -> Result<(), GenerateError> {
        match self.index.get(&key) {
            Some(position) => {
                let existing = &self.entries[*position].1;
                if existing != name {
                    return Err(GenerateError::KeyCollision {
                        key: key.to_hex(),
                        existing: existing.clone(),
                        incoming: name.to_string(),
                    });
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, name.to_string()));
            }
        }

        Ok(())
    }

    pub fn get(&self, key: &TilingKey) -> Option<&str> {
        self.index
            .get(key)
            .map(|position| self.entries[*position].1.as_str())
    }

    pub fn contains(&self, key: &TilingKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (TilingKey, &str)> {
        self.entries.iter().map(|(key, name)| (*key, name.as_str()))
    }

    /// Function names in first-insertion order, each listed once.
    pub fn function_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();

        self.entries
            .iter()
            .map(|(_, name)| name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    fn join<F: Fn(&TilingKey, &str) -> String>(&self, separator: &str, entry: F) -> String {
        self.entries
            .iter()
            .map(|(key, name)| entry(key, name))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl Display for LaunchMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let declarations = self
            .function_names()
            .iter()
            .map(|name| format!("DECLARE_KERNEL_FUNC({name})"))
            .collect::<Vec<_>>()
            .join("\n");
        let launch = self.join(",\n", |key, name| format!("{{ {key}, Launch{name} }}"));
        let workspace = self.join(",\n", |key, name| {
            format!("{{ {key}, {name}GetWorkspaceSize }}")
        });
        let names = self.join(",\n", |key, name| format!("{{ {key}, \"{name}\" }}"));

        write!(
            f,
            r#"#ifndef LAUNCH_MAP_H
#define LAUNCH_MAP_H

#include <unordered_map>
#include <string>

#include "acl/acl.h"
#include "tiling_params.h"

#define DECLARE_KERNEL_FUNC(kernelName) \
    void Launch##kernelName(aclrtStream&, uint64_t, uint8_t*, uint8_t*, uint8_t*, uint8_t*, uint8_t*, TilingParams&); \
    size_t kernelName##GetWorkspaceSize(TilingParams&);

{declarations}

std::unordered_map<uint64_t, void(*)(aclrtStream&, uint64_t,
    uint8_t*, uint8_t*, uint8_t*, uint8_t*, uint8_t*, TilingParams&)> launchKernelFuncMap = {{
{launch}
}};

using GetWorkspaceFunc = size_t(*)(TilingParams& tilingParams);
std::unordered_map<uint64_t, GetWorkspaceFunc> getWorkspaceFuncMap = {{
{workspace}
}};

// only for print kernel Info
std::unordered_map<uint64_t, std::string> funcNameMap = {{
{names}
}};

#endif // LAUNCH_MAP_H
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling_key::TilingKeyFields;
    use pretty_assertions::assert_eq;

    fn key(serial: u8, layout_b: u8) -> TilingKey {
        TilingKey::encode(TilingKeyFields {
            serial,
            layout_b,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn collision_is_fatal() {
        let mut map = LaunchMap::new();
        map.insert(key(0, 1), "CommonMatmulKernelHalfLayout01").unwrap();

        let err = map
            .insert(key(0, 1), "SmallMatmulKernelHalfLayout01")
            .unwrap_err();

        match err {
            GenerateError::KeyCollision {
                key,
                existing,
                incoming,
            } => {
                assert_eq!(key, "0x0000000000000010");
                assert_eq!(existing, "CommonMatmulKernelHalfLayout01");
                assert_eq!(incoming, "SmallMatmulKernelHalfLayout01");
            }
            err => panic!("unexpected error {err}"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn reinsertion_of_the_same_entry_is_ignored() {
        let mut map = LaunchMap::new();
        map.insert(key(1, 0), "SmallMatmulKernelHalfLayout00").unwrap();
        map.insert(key(1, 0), "SmallMatmulKernelHalfLayout00").unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&key(1, 0)), Some("SmallMatmulKernelHalfLayout00"));
    }

    #[test]
    fn tables_are_parallel() {
        let mut map = LaunchMap::new();
        map.insert(key(0, 0), "CommonMatmulKernelHalfLayout00").unwrap();
        map.insert(key(0, 1), "CommonMatmulKernelHalfLayout01").unwrap();

        let header = map.to_string();

        assert!(header.contains(
            "DECLARE_KERNEL_FUNC(CommonMatmulKernelHalfLayout00)\nDECLARE_KERNEL_FUNC(CommonMatmulKernelHalfLayout01)\n"
        ));
        assert!(header.contains(
            "{ 0x0000000000000000, LaunchCommonMatmulKernelHalfLayout00 },\n{ 0x0000000000000010, LaunchCommonMatmulKernelHalfLayout01 }\n"
        ));
        assert!(header.contains(
            "{ 0x0000000000000010, CommonMatmulKernelHalfLayout01GetWorkspaceSize }\n"
        ));
        assert!(header.contains("{ 0x0000000000000000, \"CommonMatmulKernelHalfLayout00\" },\n"));
    }

    #[test]
    fn shared_function_is_declared_once() {
        let mut map = LaunchMap::new();
        map.insert(key(0, 0), "CommonMatmulKernelHalfLayout00").unwrap();
        map.insert(key(0, 1), "CommonMatmulKernelHalfLayout00").unwrap();
        map.insert(key(1, 0), "SmallMatmulKernelHalfLayout00").unwrap();

        let header = map.to_string();

        assert_eq!(map.len(), 3);
        assert_eq!(
            map.function_names(),
            vec![
                "CommonMatmulKernelHalfLayout00",
                "SmallMatmulKernelHalfLayout00"
            ]
        );
        assert_eq!(
            header
                .matches("DECLARE_KERNEL_FUNC(CommonMatmulKernelHalfLayout00)")
                .count(),
            1
        );
        assert_eq!(
            header
                .matches("LaunchCommonMatmulKernelHalfLayout00 }")
                .count(),
            2
        );
    }
}
