//! Value and column-metadata types returned through the driver seam.

use std::fmt;

/// A single cell value in a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Signed integer types (TINYINT through BIGINT).
    Int(i64),
    /// Unsigned integer types.
    UInt(u64),
    /// FLOAT, DOUBLE, and DECIMAL rendered as floating point.
    Float(f64),
    /// Character data (CHAR, VARCHAR, TEXT, ENUM, SET, JSON).
    Text(String),
    /// Binary data (BINARY, VARBINARY, BLOB).
    Bytes(Vec<u8>),
}

impl Value {
    /// The contained text, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The contained value as a signed integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// MySQL protocol column type identifiers.
///
/// Discriminants are the type byte the server sends in column definition
/// packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)] // Variant names are the protocol names.
pub enum ColumnType {
    Decimal = 0,
    Tiny = 1,
    Short = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    Null = 6,
    Timestamp = 7,
    LongLong = 8,
    Int24 = 9,
    Date = 10,
    Time = 11,
    Datetime = 12,
    Year = 13,
    NewDate = 14,
    Varchar = 15,
    Bit = 16,
    Json = 245,
    NewDecimal = 246,
    Enum = 247,
    Set = 248,
    TinyBlob = 249,
    MediumBlob = 250,
    LongBlob = 251,
    Blob = 252,
    VarString = 253,
    String = 254,
    Geometry = 255,
}

impl ColumnType {
    /// Decode a protocol type byte. Unknown values map to `None`.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        let t = match id {
            0 => Self::Decimal,
            1 => Self::Tiny,
            2 => Self::Short,
            3 => Self::Long,
            4 => Self::Float,
            5 => Self::Double,
            6 => Self::Null,
            7 => Self::Timestamp,
            8 => Self::LongLong,
            9 => Self::Int24,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::Datetime,
            13 => Self::Year,
            14 => Self::NewDate,
            15 => Self::Varchar,
            16 => Self::Bit,
            245 => Self::Json,
            246 => Self::NewDecimal,
            247 => Self::Enum,
            248 => Self::Set,
            249 => Self::TinyBlob,
            250 => Self::MediumBlob,
            251 => Self::LongBlob,
            252 => Self::Blob,
            253 => Self::VarString,
            254 => Self::String,
            255 => Self::Geometry,
            _ => return None,
        };
        Some(t)
    }
}

/// Immutable column descriptor snapshotted at statement-execution time.
///
/// Kept independent of the live cursor so metadata can still be read after
/// the cursor and its connection have been torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name or expression alias, exactly as the server reported it.
    pub name: String,
    /// Protocol-level column type.
    pub column_type: ColumnType,
}

impl Column {
    /// Create a new column descriptor.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_roundtrip() {
        for id in [0u8, 3, 8, 15, 16, 245, 253, 254, 255] {
            let t = ColumnType::from_id(id);
            assert!(t.is_some(), "id {id} should decode");
            assert_eq!(t.map(|t| t as u8), Some(id));
        }
        assert_eq!(ColumnType::from_id(200), None);
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Text("abc".into()).as_str(), Some("abc"));
        assert_eq!(Value::Int(1).as_str(), None);
        assert_eq!(Value::UInt(7).as_int(), Some(7));
        assert_eq!(Value::Null.as_int(), None);
    }
}
