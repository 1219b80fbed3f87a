//! Integer widths used to express array lengths, and width-tagged integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width and signedness of an integer used as an array length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthWidth {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl LengthWidth {
    pub const ALL: [LengthWidth; 8] = [
        LengthWidth::I8,
        LengthWidth::U8,
        LengthWidth::I16,
        LengthWidth::U16,
        LengthWidth::I32,
        LengthWidth::U32,
        LengthWidth::I64,
        LengthWidth::U64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LengthWidth::I8 => "i8",
            LengthWidth::U8 => "u8",
            LengthWidth::I16 => "i16",
            LengthWidth::U16 => "u16",
            LengthWidth::I32 => "i32",
            LengthWidth::U32 => "u32",
            LengthWidth::I64 => "i64",
            LengthWidth::U64 => "u64",
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            LengthWidth::I8 | LengthWidth::U8 => 8,
            LengthWidth::I16 | LengthWidth::U16 => 16,
            LengthWidth::I32 | LengthWidth::U32 => 32,
            LengthWidth::I64 | LengthWidth::U64 => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            LengthWidth::I8 | LengthWidth::I16 | LengthWidth::I32 | LengthWidth::I64
        )
    }

    /// Stable position of this width in [`LengthWidth::ALL`].
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<LengthWidth> {
        LengthWidth::ALL.get(index as usize).copied()
    }

    pub fn min_value(self) -> IntValue {
        match self {
            LengthWidth::I8 => IntValue::I8(i8::MIN),
            LengthWidth::U8 => IntValue::U8(u8::MIN),
            LengthWidth::I16 => IntValue::I16(i16::MIN),
            LengthWidth::U16 => IntValue::U16(u16::MIN),
            LengthWidth::I32 => IntValue::I32(i32::MIN),
            LengthWidth::U32 => IntValue::U32(u32::MIN),
            LengthWidth::I64 => IntValue::I64(i64::MIN),
            LengthWidth::U64 => IntValue::U64(u64::MIN),
        }
    }

    pub fn max_value(self) -> IntValue {
        match self {
            LengthWidth::I8 => IntValue::I8(i8::MAX),
            LengthWidth::U8 => IntValue::U8(u8::MAX),
            LengthWidth::I16 => IntValue::I16(i16::MAX),
            LengthWidth::U16 => IntValue::U16(u16::MAX),
            LengthWidth::I32 => IntValue::I32(i32::MAX),
            LengthWidth::U32 => IntValue::U32(u32::MAX),
            LengthWidth::I64 => IntValue::I64(i64::MAX),
            LengthWidth::U64 => IntValue::U64(u64::MAX),
        }
    }

    /// Truncate `value` to this width, two's-complement style.
    pub fn wrap(self, value: i128) -> IntValue {
        match self {
            LengthWidth::I8 => IntValue::I8(value as i8),
            LengthWidth::U8 => IntValue::U8(value as u8),
            LengthWidth::I16 => IntValue::I16(value as i16),
            LengthWidth::U16 => IntValue::U16(value as u16),
            LengthWidth::I32 => IntValue::I32(value as i32),
            LengthWidth::U32 => IntValue::U32(value as u32),
            LengthWidth::I64 => IntValue::I64(value as i64),
            LengthWidth::U64 => IntValue::U64(value as u64),
        }
    }

    /// Convert `value` to this width, or `None` if it is out of range.
    pub fn checked(self, value: i128) -> Option<IntValue> {
        let converted = match self {
            LengthWidth::I8 => IntValue::I8(i8::try_from(value).ok()?),
            LengthWidth::U8 => IntValue::U8(u8::try_from(value).ok()?),
            LengthWidth::I16 => IntValue::I16(i16::try_from(value).ok()?),
            LengthWidth::U16 => IntValue::U16(u16::try_from(value).ok()?),
            LengthWidth::I32 => IntValue::I32(i32::try_from(value).ok()?),
            LengthWidth::U32 => IntValue::U32(u32::try_from(value).ok()?),
            LengthWidth::I64 => IntValue::I64(i64::try_from(value).ok()?),
            LengthWidth::U64 => IntValue::U64(u64::try_from(value).ok()?),
        };
        Some(converted)
    }

    /// Parse a literal of this width. Accepts decimal digits, `min` and `max`.
    pub fn parse_value(self, text: &str) -> Result<IntValue, ParseWidthError> {
        let trimmed = text.trim();
        match trimmed {
            "min" => return Ok(self.min_value()),
            "max" => return Ok(self.max_value()),
            _ => {}
        }
        let wide: i128 = trimmed
            .parse()
            .map_err(|_| ParseWidthError::InvalidLiteral {
                text: text.to_string(),
                width: self,
            })?;
        self.checked(wide).ok_or(ParseWidthError::OutOfRange {
            text: text.to_string(),
            width: self,
        })
    }
}

impl fmt::Display for LengthWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWidthError {
    #[error("unknown length width '{0}' (expected one of i8, u8, i16, u16, i32, u32, i64, u64)")]
    UnknownWidth(String),
    #[error("'{text}' is not an integer literal for {width}")]
    InvalidLiteral { text: String, width: LengthWidth },
    #[error("'{text}' is out of range for {width}")]
    OutOfRange { text: String, width: LengthWidth },
}

impl FromStr for LengthWidth {
    type Err = ParseWidthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let width = match s.trim().to_ascii_lowercase().as_str() {
            "i8" | "int8" | "sbyte" => LengthWidth::I8,
            "u8" | "uint8" | "byte" => LengthWidth::U8,
            "i16" | "int16" | "short" => LengthWidth::I16,
            "u16" | "uint16" | "ushort" => LengthWidth::U16,
            "i32" | "int32" | "int" => LengthWidth::I32,
            "u32" | "uint32" | "uint" => LengthWidth::U32,
            "i64" | "int64" | "long" => LengthWidth::I64,
            "u64" | "uint64" | "ulong" => LengthWidth::U64,
            _ => return Err(ParseWidthError::UnknownWidth(s.to_string())),
        };
        Ok(width)
    }
}

/// An integer that remembers the width it was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "width", content = "value", rename_all = "lowercase")]
pub enum IntValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
}

impl IntValue {
    pub fn width(self) -> LengthWidth {
        match self {
            IntValue::I8(_) => LengthWidth::I8,
            IntValue::U8(_) => LengthWidth::U8,
            IntValue::I16(_) => LengthWidth::I16,
            IntValue::U16(_) => LengthWidth::U16,
            IntValue::I32(_) => LengthWidth::I32,
            IntValue::U32(_) => LengthWidth::U32,
            IntValue::I64(_) => LengthWidth::I64,
            IntValue::U64(_) => LengthWidth::U64,
        }
    }

    /// The exact mathematical value. Every width fits in an `i128`.
    pub fn as_i128(self) -> i128 {
        match self {
            IntValue::I8(v) => v as i128,
            IntValue::U8(v) => v as i128,
            IntValue::I16(v) => v as i128,
            IntValue::U16(v) => v as i128,
            IntValue::I32(v) => v as i128,
            IntValue::U32(v) => v as i128,
            IntValue::I64(v) => v as i128,
            IntValue::U64(v) => v as i128,
        }
    }

    /// Plain `as i64` cast. For `u64` values above `i64::MAX` this
    /// reinterprets the bit pattern as a negative number.
    pub fn widen_to_i64(self) -> i64 {
        match self {
            IntValue::I8(v) => v as i64,
            IntValue::U8(v) => v as i64,
            IntValue::I16(v) => v as i64,
            IntValue::U16(v) => v as i64,
            IntValue::I32(v) => v as i64,
            IntValue::U32(v) => v as i64,
            IntValue::I64(v) => v,
            IntValue::U64(v) => v as i64,
        }
    }

    pub fn is_negative(self) -> bool {
        self.as_i128() < 0
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.as_i128(), self.width())
    }
}
