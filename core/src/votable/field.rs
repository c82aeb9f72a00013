//! FIELD metadata for VOTable columns

use serde::{Deserialize, Serialize};

/// Primitive datatype of a VOTable FIELD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Boolean,
    Bit,
    UnsignedByte,
    Short,
    Int,
    Long,
    Char,
    UnicodeChar,
    Float,
    Double,
    FloatComplex,
    DoubleComplex,
}

impl DataType {
    /// Parse the `datatype` attribute value. Unknown names map to `Char` so
    /// that cells survive as raw text instead of failing the whole document.
    pub fn from_name(name: &str) -> Self {
        match name {
            "boolean" => DataType::Boolean,
            "bit" => DataType::Bit,
            "unsignedByte" => DataType::UnsignedByte,
            "short" => DataType::Short,
            "int" => DataType::Int,
            "long" => DataType::Long,
            "char" => DataType::Char,
            "unicodeChar" => DataType::UnicodeChar,
            "float" => DataType::Float,
            "double" => DataType::Double,
            "floatComplex" => DataType::FloatComplex,
            "doubleComplex" => DataType::DoubleComplex,
            _ => DataType::Char,
        }
    }

    /// Canonical attribute spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Bit => "bit",
            DataType::UnsignedByte => "unsignedByte",
            DataType::Short => "short",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Char => "char",
            DataType::UnicodeChar => "unicodeChar",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::FloatComplex => "floatComplex",
            DataType::DoubleComplex => "doubleComplex",
        }
    }

    /// True for the integer family
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Bit | DataType::UnsignedByte | DataType::Short | DataType::Int | DataType::Long
        )
    }

    /// True for the floating-point family
    pub fn is_floating(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// True for character data (string-valued cells)
    pub fn is_char(&self) -> bool {
        matches!(self, DataType::Char | DataType::UnicodeChar)
    }
}

/// Column metadata carried by a VOTable FIELD element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Column name (the `name` attribute)
    pub name: String,

    /// Optional XML id
    pub id: Option<String>,

    /// Cell datatype
    pub datatype: DataType,

    /// Raw `arraysize` attribute, e.g. `"*"`, `"8"`, `"8x*"`
    pub arraysize: Option<String>,

    /// Unified Content Descriptor
    pub ucd: Option<String>,

    /// Data-model utype
    pub utype: Option<String>,

    /// Physical unit
    pub unit: Option<String>,

    /// DESCRIPTION child element, if present
    pub description: Option<String>,
}

impl Field {
    /// Create a field with just a name and datatype
    pub fn new<S: Into<String>>(name: S, datatype: DataType) -> Self {
        Self {
            name: name.into(),
            id: None,
            datatype,
            arraysize: None,
            ucd: None,
            utype: None,
            unit: None,
            description: None,
        }
    }

    /// Whether cells hold an array of the primitive type.
    ///
    /// For char data an arraysize is just the string length, so char fields
    /// are never arrays here.
    pub fn is_array(&self) -> bool {
        if self.datatype.is_char() {
            return false;
        }
        matches!(&self.arraysize, Some(size) if size != "1")
    }
}
