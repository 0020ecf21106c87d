//! Decoding of metric values by their `ldms_ls` type tag.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::DecodeError;

/// Element type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Char,
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    F32,
    D64,
}

impl BaseType {
    pub const ALL: [BaseType; 11] = [
        BaseType::Char,
        BaseType::U8,
        BaseType::S8,
        BaseType::U16,
        BaseType::S16,
        BaseType::U32,
        BaseType::S32,
        BaseType::U64,
        BaseType::S64,
        BaseType::F32,
        BaseType::D64,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Char => "char",
            BaseType::U8 => "u8",
            BaseType::S8 => "s8",
            BaseType::U16 => "u16",
            BaseType::S16 => "s16",
            BaseType::U32 => "u32",
            BaseType::S32 => "s32",
            BaseType::U64 => "u64",
            BaseType::S64 => "s64",
            BaseType::F32 => "f32",
            BaseType::D64 => "d64",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|base| base.as_str() == name)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, BaseType::F32 | BaseType::D64)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, BaseType::S8 | BaseType::S16 | BaseType::S32 | BaseType::S64)
    }

    /// Inclusive value range of an integer type.
    fn int_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            BaseType::U8 => (0, u8::MAX as i128),
            BaseType::S8 => (i8::MIN as i128, i8::MAX as i128),
            BaseType::U16 => (0, u16::MAX as i128),
            BaseType::S16 => (i16::MIN as i128, i16::MAX as i128),
            BaseType::U32 => (0, u32::MAX as i128),
            BaseType::S32 => (i32::MIN as i128, i32::MAX as i128),
            BaseType::U64 => (0, u64::MAX as i128),
            BaseType::S64 => (i64::MIN as i128, i64::MAX as i128),
            BaseType::Char | BaseType::F32 | BaseType::D64 => return None,
        };
        Some(range)
    }
}

/// A metric type tag such as `u64`, `d64[]` or `char[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub base: BaseType,
    pub array: bool,
}

impl TypeTag {
    pub const fn scalar(base: BaseType) -> Self {
        Self { base, array: false }
    }

    pub const fn array(base: BaseType) -> Self {
        Self { base, array: true }
    }

    /// `char[]` values are strings that may contain spaces, so the
    /// listing's trailing unit column is not split off them.
    pub fn keeps_unit(&self) -> bool {
        self.base == BaseType::Char && self.array
    }

    /// Decode the value column of a metric row.
    pub fn decode(&self, raw: &str) -> Result<MetricValue, DecodeError> {
        match (self.base, self.array) {
            (BaseType::Char, false) => Ok(MetricValue::Text(raw.trim_matches('\'').to_string())),
            (BaseType::Char, true) => Ok(MetricValue::Text(raw.trim_matches('"').to_string())),
            (base, false) => decode_scalar(*self, base, raw),
            (base, true) => raw
                .trim_matches('"')
                .split(',')
                .map(|item| decode_scalar(*self, base, item.trim()))
                .collect::<Result<Vec<_>, _>>()
                .map(MetricValue::Array),
        }
    }
}

impl FromStr for TypeTag {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, array) = match s.strip_suffix("[]") {
            Some(name) => (name, true),
            None => (s, false),
        };
        BaseType::from_name(name)
            .map(|base| TypeTag { base, array })
            .ok_or_else(|| DecodeError::UnsupportedType { tag: s.to_string() })
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())?;
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A decoded metric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Array(Vec<MetricValue>),
}

impl MetricValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Int(i) => Some(*i),
            MetricValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MetricValue::UInt(u) => Some(*u),
            MetricValue::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Any numeric value widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Float(x) => Some(*x),
            MetricValue::Int(i) => Some(*i as f64),
            MetricValue::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetricValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[MetricValue]> {
        match self {
            MetricValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Decode `raw` as a value of type `tag`.
pub fn decode(tag: &str, raw: &str) -> Result<MetricValue, DecodeError> {
    tag.parse::<TypeTag>()?.decode(raw)
}

/// Parse an integer literal, inferring the base from its prefix:
/// `0x` hex, `0o` octal, `0b` binary, decimal otherwise.
pub fn parse_int(text: &str) -> Option<i128> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let lower = unsigned.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &unsigned[2..]),
        Some("0o") => (8, &unsigned[2..]),
        Some("0b") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn decode_scalar(tag: TypeTag, base: BaseType, raw: &str) -> Result<MetricValue, DecodeError> {
    let bad_value = || DecodeError::BadValue {
        tag: tag.to_string(),
        value: raw.to_string(),
    };

    if base.is_float() {
        return raw.parse::<f64>().map(MetricValue::Float).map_err(|_| bad_value());
    }

    let (min, max) = base.int_range().ok_or_else(bad_value)?;
    let value = parse_int(raw).filter(|v| (min..=max).contains(v)).ok_or_else(bad_value)?;
    if base.is_signed() {
        i64::try_from(value).map(MetricValue::Int).map_err(|_| bad_value())
    } else {
        u64::try_from(value).map(MetricValue::UInt).map_err(|_| bad_value())
    }
}
