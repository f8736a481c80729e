//! Short type-display codes for result columns and catalog entries.

use sequin_driver::ColumnType;

/// Shorthand display code for a protocol-level column type, shown next to
/// column names in result headers.
#[must_use]
pub fn short_type(column_type: ColumnType) -> &'static str {
    use ColumnType as T;
    match column_type {
        T::Bit => "010",
        T::Blob => "0b",
        T::Date | T::NewDate => "d",
        T::Datetime => "dt",
        T::Decimal | T::NewDecimal | T::Double | T::Float => "#.#",
        T::Enum => "enum",
        T::Geometry => "▽□",
        T::Int24 => "###",
        T::Json => "{}",
        T::Long | T::LongLong => "##",
        T::LongBlob | T::MediumBlob => "00b",
        T::Null => "∅",
        T::Set => "set",
        T::Short | T::Tiny => "#",
        T::String | T::Varchar | T::VarString => "s",
        T::Time => "t",
        T::Timestamp => "#ts",
        T::TinyBlob => "b",
        T::Year => "y",
    }
}

/// Shorthand display code for an `information_schema` `data_type` name,
/// used for catalog column entries.
#[must_use]
pub fn short_column_type(data_type: &str) -> &'static str {
    match data_type {
        "bigint" => "###",
        "binary" | "varbinary" => "010",
        "blob" => "0b",
        "char" => "c",
        "datetime" => "dt",
        "decimal" | "double" | "float" => "#.#",
        "enum" => "enum",
        "int" => "##",
        "json" => "{}",
        "longblob" | "mediumblob" => "00b",
        "longtext" => "ss",
        "mediumint" => "##",
        "mediumtext" | "text" => "s",
        "set" => "set",
        "smallint" | "tinyint" => "#",
        "time" => "t",
        "timestamp" => "ts",
        "varchar" => "s",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_shorthand() {
        assert_eq!(short_type(ColumnType::LongLong), "##");
        assert_eq!(short_type(ColumnType::VarString), "s");
        assert_eq!(short_type(ColumnType::NewDecimal), "#.#");
        assert_eq!(short_type(ColumnType::Timestamp), "#ts");
        assert_eq!(short_type(ColumnType::Geometry), "▽□");
    }

    #[test]
    fn information_schema_shorthand() {
        assert_eq!(short_column_type("int"), "##");
        assert_eq!(short_column_type("varchar"), "s");
        assert_eq!(short_column_type("longtext"), "ss");
        assert_eq!(short_column_type("geometry"), "?");
    }
}
