use core::fmt::Display;
use core::str::FromStr;

use tilegen_common::ConfigError;

/// Largest value of a 4-bit sub-field.
pub const NIBBLE_MAX: u8 = 0x0f;

/// Discrete parameters of a kernel variant, as packed in a [TilingKey].
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TilingKeyFields {
    pub serial: u8,
    pub dtype: u8,
    pub layout_a: u8,
    pub layout_b: u8,
    pub layout_c: u8,
    pub padding_a: u8,
    pub padding_b: u8,
    pub padding_c: u8,
}

/// Packed identifier of one specialized kernel variant.
///
/// Bytes, most significant first:
///
/// | byte | content                       |
/// |------|-------------------------------|
/// | 7    | kernel family serial          |
/// | 6    | `dtype << 4`                  |
/// | 5..3 | reserved, zero                |
/// | 2    | `padding_a << 4 \| padding_b` |
/// | 1    | `padding_c << 4 \| layout_a`  |
/// | 0    | `layout_b << 4 \| layout_c`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilingKey(u64);

impl TilingKey {
    /// Packs the fields, rejecting any 4-bit field that doesn't fit.
    pub fn encode(fields: TilingKeyFields) -> Result<Self, ConfigError> {
        let nibble = |field: &'static str, value: u8| {
            if value > NIBBLE_MAX {
                Err(ConfigError::TilingFieldOutOfRange {
                    field,
                    value,
                    max: NIBBLE_MAX,
                })
            } else {
                Ok(value as u64)
            }
        };

        let dtype = nibble("dtype", fields.dtype)?;
        let layout_a = nibble("layout_a", fields.layout_a)?;
        let layout_b = nibble("layout_b", fields.layout_b)?;
        let layout_c = nibble("layout_c", fields.layout_c)?;
        let padding_a = nibble("padding_a", fields.padding_a)?;
        let padding_b = nibble("padding_b", fields.padding_b)?;
        let padding_c = nibble("padding_c", fields.padding_c)?;

        let bytes = [
            fields.serial as u64,
            dtype << 4,
            0,
            0,
            0,
            (padding_a << 4) | padding_b,
            (padding_c << 4) | layout_a,
            (layout_b << 4) | layout_c,
        ];

        Ok(Self(bytes.iter().fold(0, |key, byte| (key << 8) | byte)))
    }

    pub fn decode(&self) -> TilingKeyFields {
        let byte = |index: u32| (self.0 >> (index * 8)) as u8;
        let high = |index: u32| byte(index) >> 4;
        let low = |index: u32| byte(index) & NIBBLE_MAX;

        TilingKeyFields {
            serial: byte(7),
            dtype: high(6),
            padding_a: high(2),
            padding_b: low(2),
            padding_c: high(1),
            layout_a: low(1),
            layout_b: high(0),
            layout_c: low(0),
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// `0x` followed by 16 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("{:#018x}", self.0)
    }
}

impl From<TilingKey> for u64 {
    fn from(key: TilingKey) -> Self {
        key.0
    }
}

impl Display for TilingKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl FromStr for TilingKey {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::UnknownTag {
            kind: "tiling key",
            value: value.to_string(),
        };

        let digits = value.strip_prefix("0x").ok_or_else(invalid)?;
        if digits.len() != 16 {
            return Err(invalid());
        }

        u64::from_str_radix(digits, 16)
            .map(TilingKey)
            .map_err(|_| invalid())
    }
}
