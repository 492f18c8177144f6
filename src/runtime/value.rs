//! WebAssembly value representation and storage-width tags

use fhex::ToHex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// WebAssembly value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    // Number types
    I32,
    I64,
    F32,
    F64,
    // Vector types
    V128,
    // Reference types
    FuncRef,
    ExternRef,
}

impl ValueType {
    /// Whether this is one of the reference types
    pub fn is_ref(self) -> bool {
        matches!(self, ValueType::FuncRef | ValueType::ExternRef)
    }

    fn name(self) -> &'static str {
        match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::V128 => "v128",
            ValueType::FuncRef => "funcref",
            ValueType::ExternRef => "externref",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime representation of WebAssembly values
///
/// Reference values carry an optional address; `None` is the null reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawValue", try_from = "RawValue")]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    V128(u128),
    FuncRef(Option<u32>),
    ExternRef(Option<u32>),
}

impl Value {
    /// Get the WebAssembly type of this value
    pub fn typ(&self) -> ValueType {
        match self {
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::V128(_) => ValueType::V128,
            Value::FuncRef(_) => ValueType::FuncRef,
            Value::ExternRef(_) => ValueType::ExternRef,
        }
    }

    /// The zero value of a number or vector type, or the null reference
    pub fn default_for(typ: ValueType) -> Self {
        match typ {
            ValueType::I32 => Value::I32(0),
            ValueType::I64 => Value::I64(0),
            ValueType::F32 => Value::F32(0.0),
            ValueType::F64 => Value::F64(0.0),
            ValueType::V128 => Value::V128(0),
            ValueType::FuncRef => Value::FuncRef(None),
            ValueType::ExternRef => Value::ExternRef(None),
        }
    }

    /// The null reference of a reference type, `None` for other types
    pub fn null_ref(typ: ValueType) -> Option<Self> {
        match typ {
            ValueType::FuncRef => Some(Value::FuncRef(None)),
            ValueType::ExternRef => Some(Value::ExternRef(None)),
            _ => None,
        }
    }

    pub fn is_null_ref(&self) -> bool {
        matches!(self, Value::FuncRef(None) | Value::ExternRef(None))
    }

    /// Convert to i32, returning None if wrong type
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to i64, returning None if wrong type
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to f32, returning None if wrong type
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to f64, returning None if wrong type
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_v128(&self) -> Option<u128> {
        match self {
            Value::V128(v) => Some(*v),
            _ => None,
        }
    }

    /// Create from a type string and value string
    ///
    /// Integers are read as unsigned decimal, floats as their bit pattern
    /// (decimal or `0x` hex) with a fallback to a float literal, references
    /// as `null` or a decimal address.
    pub fn from_strings(typ: &str, value: &str) -> Result<Self, String> {
        match typ {
            "i32" => value
                .parse::<u32>()
                .map(|v| Value::I32(v as i32))
                .map_err(|e| format!("Failed to parse i32: {e}")),
            "i64" => value
                .parse::<u64>()
                .map(|v| Value::I64(v as i64))
                .map_err(|e| format!("Failed to parse i64: {e}")),
            "f32" => {
                if let Some(hex) = value.strip_prefix("0x") {
                    u32::from_str_radix(hex, 16)
                        .map(|bits| Value::F32(f32::from_bits(bits)))
                        .map_err(|e| format!("Failed to parse f32 hex: {e}"))
                } else {
                    value
                        .parse::<u32>()
                        .map(|bits| Value::F32(f32::from_bits(bits)))
                        .or_else(|_| value.parse::<f32>().map(Value::F32))
                        .map_err(|e| format!("Failed to parse f32: {e}"))
                }
            }
            "f64" => {
                if let Some(hex) = value.strip_prefix("0x") {
                    u64::from_str_radix(hex, 16)
                        .map(|bits| Value::F64(f64::from_bits(bits)))
                        .map_err(|e| format!("Failed to parse f64 hex: {e}"))
                } else {
                    value
                        .parse::<u64>()
                        .map(|bits| Value::F64(f64::from_bits(bits)))
                        .or_else(|_| value.parse::<f64>().map(Value::F64))
                        .map_err(|e| format!("Failed to parse f64: {e}"))
                }
            }
            "v128" => value
                .parse::<u128>()
                .map(Value::V128)
                .map_err(|e| format!("Failed to parse v128: {e}")),
            "funcref" => parse_ref(value).map(Value::FuncRef),
            "externref" => parse_ref(value).map(Value::ExternRef),
            t => Err(format!("Unknown value type: {t}")),
        }
    }

    /// Convert to type and value strings, preserving float bit patterns
    pub fn to_strings(&self) -> (String, String) {
        let value = match self {
            Value::I32(v) => (*v as u32).to_string(),
            Value::I64(v) => (*v as u64).to_string(),
            Value::F32(v) => v.to_bits().to_string(),
            Value::F64(v) => v.to_bits().to_string(),
            Value::V128(v) => v.to_string(),
            Value::FuncRef(r) | Value::ExternRef(r) => match r {
                Some(addr) => addr.to_string(),
                None => "null".to_string(),
            },
        };
        (self.typ().name().to_string(), value)
    }
}

fn parse_ref(value: &str) -> Result<Option<u32>, String> {
    if value == "null" {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|e| format!("Failed to parse reference: {e}"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "i32:{v}"),
            Value::I64(v) => write!(f, "i64:{v}"),
            Value::F32(v) => write!(f, "f32:{}", v.to_hex()),
            Value::F64(v) => write!(f, "f64:{}", v.to_hex()),
            Value::V128(v) => write!(f, "v128:0x{}", hex::encode(v.to_be_bytes())),
            Value::FuncRef(Some(addr)) => write!(f, "funcref:{addr}"),
            Value::ExternRef(Some(addr)) => write!(f, "externref:{addr}"),
            Value::FuncRef(None) => write!(f, "funcref:null"),
            Value::ExternRef(None) => write!(f, "externref:null"),
        }
    }
}

/// Serialized form of a [`Value`], the `{"type", "value"}` shape wast2json emits
#[derive(Serialize, Deserialize)]
struct RawValue {
    #[serde(rename = "type")]
    typ: String,
    value: String,
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        let (typ, value) = value.to_strings();
        RawValue { typ, value }
    }
}

impl TryFrom<RawValue> for Value {
    type Error = String;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        Value::from_strings(&raw.typ, &raw.value)
    }
}

/// Storage width of an operand slot
///
/// Only the width is tracked, not the full value type. Vectors and
/// references share [`TypeTag::Other`] but never alias the two scalar widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// i32 and f32
    Bits32,
    /// i64 and f64
    Bits64,
    /// v128, funcref and externref
    Other,
}

impl TypeTag {
    /// Classify a value by its storage width
    pub fn of(value: &Value) -> Self {
        Self::of_type(value.typ())
    }

    pub fn of_type(typ: ValueType) -> Self {
        match typ {
            ValueType::I32 | ValueType::F32 => TypeTag::Bits32,
            ValueType::I64 | ValueType::F64 => TypeTag::Bits64,
            ValueType::V128 | ValueType::FuncRef | ValueType::ExternRef => TypeTag::Other,
        }
    }

    /// Compact single-byte encoding: 0, 1 or 2
    pub fn byte(self) -> u8 {
        match self {
            TypeTag::Bits32 => 0,
            TypeTag::Bits64 => 1,
            TypeTag::Other => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TypeTag::Bits32),
            1 => Some(TypeTag::Bits64),
            2 => Some(TypeTag::Other),
            _ => None,
        }
    }

    /// Whether the slot holds a fixed-width scalar
    pub fn is_scalar(self) -> bool {
        self != TypeTag::Other
    }
}

impl From<&Value> for TypeTag {
    fn from(value: &Value) -> Self {
        TypeTag::of(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type() {
        assert_eq!(Value::I32(42).typ(), ValueType::I32);
        assert_eq!(Value::I64(42).typ(), ValueType::I64);
        assert_eq!(Value::F32(42.0).typ(), ValueType::F32);
        assert_eq!(Value::F64(42.0).typ(), ValueType::F64);
        assert_eq!(Value::V128(1).typ(), ValueType::V128);
        assert_eq!(Value::FuncRef(None).typ(), ValueType::FuncRef);
        assert_eq!(Value::ExternRef(Some(3)).typ(), ValueType::ExternRef);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::I32(42).as_i32(), Some(42));
        assert_eq!(Value::I32(42).as_i64(), None);
        assert_eq!(Value::I64(42).as_i64(), Some(42));
        assert_eq!(Value::F32(42.0).as_f32(), Some(42.0));
        assert_eq!(Value::F64(42.0).as_f64(), Some(42.0));
        assert_eq!(Value::V128(7).as_v128(), Some(7));
        assert_eq!(Value::FuncRef(None).as_v128(), None);
    }

    #[test]
    fn test_type_tag_widths() {
        assert_eq!(TypeTag::of(&Value::I32(1)), TypeTag::Bits32);
        assert_eq!(TypeTag::of(&Value::F32(1.0)), TypeTag::Bits32);
        assert_eq!(TypeTag::of(&Value::I64(1)), TypeTag::Bits64);
        assert_eq!(TypeTag::of(&Value::F64(1.0)), TypeTag::Bits64);
        assert_eq!(TypeTag::of(&Value::V128(1)), TypeTag::Other);
        assert_eq!(TypeTag::of(&Value::FuncRef(Some(0))), TypeTag::Other);
        assert_eq!(TypeTag::of(&Value::ExternRef(None)), TypeTag::Other);
        assert!(TypeTag::Bits32.is_scalar());
        assert!(!TypeTag::Other.is_scalar());
    }

    #[test]
    fn test_type_tag_bytes() {
        for tag in [TypeTag::Bits32, TypeTag::Bits64, TypeTag::Other] {
            assert_eq!(TypeTag::from_byte(tag.byte()), Some(tag));
        }
        assert_eq!(TypeTag::Bits32.byte(), 0);
        assert_eq!(TypeTag::Bits64.byte(), 1);
        assert_eq!(TypeTag::Other.byte(), 2);
        assert_eq!(TypeTag::from_byte(3), None);
    }

    #[test]
    fn test_defaults_and_nulls() {
        assert_eq!(Value::default_for(ValueType::I64), Value::I64(0));
        assert_eq!(Value::default_for(ValueType::V128), Value::V128(0));
        assert!(Value::default_for(ValueType::FuncRef).is_null_ref());
        assert_eq!(Value::null_ref(ValueType::ExternRef), Some(Value::ExternRef(None)));
        assert_eq!(Value::null_ref(ValueType::I32), None);
        assert!(!Value::FuncRef(Some(1)).is_null_ref());
    }

    #[test]
    fn test_from_strings() {
        assert_eq!(Value::from_strings("i32", "42").unwrap(), Value::I32(42));
        assert_eq!(Value::from_strings("i32", "4294967295").unwrap(), Value::I32(-1));
        assert_eq!(Value::from_strings("i64", "42").unwrap(), Value::I64(42));

        // Floats are read as bits first
        assert_eq!(
            Value::from_strings("f32", "1109917696").unwrap(),
            Value::F32(f32::from_bits(1109917696))
        );
        assert_eq!(
            Value::from_strings("f32", "0x42280000").unwrap(),
            Value::F32(f32::from_bits(0x42280000))
        );

        assert_eq!(Value::from_strings("v128", "255").unwrap(), Value::V128(255));
        assert_eq!(Value::from_strings("funcref", "null").unwrap(), Value::FuncRef(None));
        assert_eq!(Value::from_strings("externref", "9").unwrap(), Value::ExternRef(Some(9)));

        assert!(Value::from_strings("invalid", "42").is_err());
        assert!(Value::from_strings("funcref", "nope").is_err());
    }

    #[test]
    fn test_to_strings() {
        assert_eq!(Value::I32(-1).to_strings(), ("i32".to_string(), "4294967295".to_string()));
        assert_eq!(Value::I64(42).to_strings(), ("i64".to_string(), "42".to_string()));
        assert_eq!(Value::F32(42.0).to_strings(), ("f32".to_string(), "1109917696".to_string()));
        assert_eq!(Value::FuncRef(None).to_strings(), ("funcref".to_string(), "null".to_string()));
    }

    #[test]
    fn test_serde_keeps_nan_payload() {
        let nan = Value::F32(f32::from_bits(0x7fc0_0001));
        let json = serde_json::to_string(&nan).unwrap();
        assert_eq!(json, r#"{"type":"f32","value":"2143289345"}"#);

        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_f32().map(f32::to_bits), Some(0x7fc0_0001));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::I32(42)), "i32:42");
        assert_eq!(format!("{}", Value::I64(42)), "i64:42");
        assert!(format!("{}", Value::F32(42.0)).starts_with("f32:"));
        assert!(format!("{}", Value::F64(42.0)).starts_with("f64:"));
        assert_eq!(
            format!("{}", Value::V128(1)),
            "v128:0x00000000000000000000000000000001"
        );
        assert_eq!(format!("{}", Value::ExternRef(None)), "externref:null");
    }
}
