use std::fmt;

/// Position inside a column block file, used to name the offending element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Data block header, if known
    pub block: Option<String>,
    /// Category name, if known
    pub category: Option<String>,
    /// Column name, if known
    pub column: Option<String>,
}

impl Location {
    /// Location of the file header
    pub fn file() -> Self {
        Self::default()
    }

    /// Location of a data block
    pub fn block(header: impl Into<String>) -> Self {
        Self {
            block: Some(header.into()),
            ..Self::default()
        }
    }

    /// Narrow this location to a category
    pub fn with_category(&self, name: impl Into<String>) -> Self {
        Self {
            block: self.block.clone(),
            category: Some(name.into()),
            column: None,
        }
    }

    /// Narrow this location to a column
    pub fn with_column(&self, name: impl Into<String>) -> Self {
        Self {
            block: self.block.clone(),
            category: self.category.clone(),
            column: Some(name.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(block) = &self.block else {
            return write!(f, "file header");
        };
        write!(f, "block '{}'", block)?;
        if let Some(category) = &self.category {
            write!(f, ", category '{}'", category)?;
        }
        if let Some(column) = &self.column {
            write!(f, ", column '{}'", column)?;
        }
        Ok(())
    }
}

/// Errors raised while encoding or decoding column block files
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The buffer does not start with the column block magic
    #[error("Not a column block file (bad magic)")]
    BadMagic,

    /// The file declares a format version this build cannot read
    #[error("Unsupported column block format version {0}")]
    UnsupportedVersion(u16),

    /// The buffer ended before a complete element could be read
    #[error("Truncated buffer while reading {what} in {location}")]
    Truncated {
        /// Where the truncation happened
        location: Location,
        /// What was being read
        what: &'static str,
    },

    /// A column names an encoding tag this build does not know
    #[error("Unknown encoding tag {tag} in {location}")]
    UnknownEncoding {
        /// Offending column
        location: Location,
        /// Raw tag byte
        tag: u8,
    },

    /// A column names a data type tag this build does not know
    #[error("Unknown data type tag {tag} in {location}")]
    UnknownDataType {
        /// Offending column
        location: Location,
        /// Raw tag byte
        tag: u8,
    },

    /// The encoding chain cannot be applied to the stored data
    #[error("Invalid encoding chain in {location}: {reason}")]
    InvalidChain {
        /// Offending column
        location: Location,
        /// Human-readable reason
        reason: String,
    },

    /// Column length disagrees with the category row count
    #[error("Row count mismatch in {location}: expected {expected}, got {actual}")]
    RowCountMismatch {
        /// Offending column
        location: Location,
        /// Row count declared by the category
        expected: usize,
        /// Number of values the column holds
        actual: usize,
    },

    /// A string value is not valid UTF-8
    #[error("Invalid UTF-8 string in {location}")]
    InvalidUtf8 {
        /// Offending element
        location: Location,
    },

    /// Bytes remain after the last declared block
    #[error("{0} trailing bytes after the last data block")]
    TrailingBytes(usize),

    /// A length does not fit the 32-bit wire representation
    #[error("{what} too large to encode in {location}: {len}")]
    TooLarge {
        /// Offending element
        location: Location,
        /// What was being written
        what: &'static str,
        /// The length that overflowed
        len: usize,
    },
}
