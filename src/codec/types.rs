use super::encoding::EncodingStrategy;

/// Element type of a fixed-width byte array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 8-bit integer
    Uint8,
    /// Unsigned 16-bit integer
    Uint16,
    /// Unsigned 32-bit integer
    Uint32,
    /// 32-bit IEEE float
    Float32,
    /// 64-bit IEEE float
    Float64,
}

impl DataType {
    /// Resolve a wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(DataType::Int8),
            2 => Some(DataType::Int16),
            3 => Some(DataType::Int32),
            4 => Some(DataType::Uint8),
            5 => Some(DataType::Uint16),
            6 => Some(DataType::Uint32),
            32 => Some(DataType::Float32),
            33 => Some(DataType::Float64),
            _ => None,
        }
    }

    /// Wire tag for this type
    pub fn tag(self) -> u8 {
        match self {
            DataType::Int8 => 1,
            DataType::Int16 => 2,
            DataType::Int32 => 3,
            DataType::Uint8 => 4,
            DataType::Uint16 => 5,
            DataType::Uint32 => 6,
            DataType::Float32 => 32,
            DataType::Float64 => 33,
        }
    }

    /// Get the byte size per value
    pub fn byte_size(self) -> usize {
        match self {
            DataType::Int8 | DataType::Uint8 => 1,
            DataType::Int16 | DataType::Uint16 => 2,
            DataType::Int32 | DataType::Uint32 | DataType::Float32 => 4,
            DataType::Float64 => 8,
        }
    }

    /// True for the integer types
    pub fn is_integer(self) -> bool {
        !matches!(self, DataType::Float32 | DataType::Float64)
    }

    /// Narrowest integer type that holds every value losslessly
    pub fn narrowest_for(values: &[i32]) -> Self {
        let (min, max) = values
            .iter()
            .fold((0i32, 0i32), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        if min >= 0 {
            if max <= u8::MAX as i32 {
                DataType::Uint8
            } else if max <= u16::MAX as i32 {
                DataType::Uint16
            } else {
                DataType::Int32
            }
        } else if min >= i8::MIN as i32 && max <= i8::MAX as i32 {
            DataType::Int8
        } else if min >= i16::MIN as i32 && max <= i16::MAX as i32 {
            DataType::Int16
        } else {
            DataType::Int32
        }
    }
}

/// Declared element kind of a column, used by category schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 32-bit integers
    Int32,
    /// 32-bit floats
    Float32,
    /// 64-bit floats
    Float64,
    /// UTF-8 strings
    Str,
}

/// Column values, one variant per supported element kind
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// 32-bit integers (narrower stored integer types widen to this)
    Int32(Vec<i32>),
    /// 32-bit floats
    Float32(Vec<f32>),
    /// 64-bit floats
    Float64(Vec<f64>),
    /// UTF-8 strings
    Strings(Vec<String>),
}

impl ColumnData {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int32(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Strings(v) => v.len(),
        }
    }

    /// True when the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element kind of this column
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Int32(_) => ColumnKind::Int32,
            ColumnData::Float32(_) => ColumnKind::Float32,
            ColumnData::Float64(_) => ColumnKind::Float64,
            ColumnData::Strings(_) => ColumnKind::Str,
        }
    }

    /// Borrow integer values
    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            ColumnData::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow string values
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ColumnData::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric value at `row` widened to f64
    pub fn f64_at(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Int32(v) => v.get(row).map(|&x| x as f64),
            ColumnData::Float32(v) => v.get(row).map(|&x| x as f64),
            ColumnData::Float64(v) => v.get(row).copied(),
            ColumnData::Strings(_) => None,
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column values
    pub data: ColumnData,
    /// Encoding chain selection used when writing
    pub strategy: EncodingStrategy,
}

impl Column {
    /// Create a column with automatic encoding selection
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
            strategy: EncodingStrategy::Auto,
        }
    }

    /// Override the write-side encoding strategy
    pub fn with_strategy(mut self, strategy: EncodingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the column has no rows
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A named group of columns sharing one row count
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Category name
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<Column>,
}

impl Category {
    /// Create an empty category
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Builder-style column append
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a column
    pub fn push(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Row count, taken from the first column
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First value of an integer column
    pub fn i32_scalar(&self, name: &str) -> Option<i32> {
        self.column(name)?.data.as_i32()?.first().copied()
    }

    /// First value of a numeric column widened to f64
    pub fn f64_scalar(&self, name: &str) -> Option<f64> {
        self.column(name)?.data.f64_at(0)
    }

    /// First value of a string column
    pub fn str_scalar(&self, name: &str) -> Option<&str> {
        self.column(name)?
            .data
            .as_strings()?
            .first()
            .map(String::as_str)
    }
}

/// A named table group; a file is a sequence of these
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    /// Block header
    pub header: String,
    /// Categories in declaration order
    pub categories: Vec<Category>,
}

impl DataBlock {
    /// Create an empty block
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            categories: Vec::new(),
        }
    }

    /// Builder-style category append
    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Find a category by name
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}
