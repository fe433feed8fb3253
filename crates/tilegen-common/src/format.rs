/// Converts a `CamelCase` identifier to `snake_case`.
///
/// Digits stay attached to the preceding word.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 8);

    for (i, c) in name.char_indices() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Joins the values with `x`, as used by tile shapes in kernel names.
pub fn join_x<I: IntoIterator<Item = u32>>(values: I) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("CommonMatmulKernelHalfLayout00", "common_matmul_kernel_half_layout00")]
    #[case(
        "PaddingCommonMatmulKernelFloatLayout10Padding301",
        "padding_common_matmul_kernel_float_layout10_padding301"
    )]
    #[case("already_snake", "already_snake")]
    fn snake_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(camel_to_snake(input), expected);
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("half"), "Half");
        assert_eq!(capitalize("FLOAT"), "Float");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn joined_shape() {
        assert_eq!(join_x([128, 256, 64]), "128x256x64");
    }
}
