//! # Binary Column Codec
//!
//! Reads and writes the compact columnar container used for volume and
//! segmentation data: a file is a sequence of named data blocks, each holding
//! named categories of equal-length typed columns.
//!
//! ## Layout
//!
//! ```text
//! file
//! ├── magic "SGCB", version, block count
//! └── block* (header)
//!     └── category* (name, row count)
//!         └── column* (name, encoding chain, data)
//! ```
//!
//! Each column stores the encoding chain that produced its bytes, so readers
//! need no out-of-band schema. See [`EncodingStrategy`] for how writers pick
//! a chain.
//!
//! ## Usage
//!
//! ```rust
//! use segmesh::codec::{self, Category, Column, ColumnData, DataBlock};
//!
//! let block = DataBlock::new("EXAMPLE").with_category(
//!     Category::new("values").with_column(Column::new("v", ColumnData::Int32(vec![1, 2, 3]))),
//! );
//! let bytes = codec::encode(&[block.clone()]).unwrap();
//! assert_eq!(codec::decode(&bytes).unwrap(), vec![block]);
//! ```
//!
//! Decoding is all-or-nothing: any malformed element fails the whole call
//! with a [`FormatError`] naming its location.

mod encoding;
mod error;
mod types;
mod wire;

#[cfg(test)]
mod tests;

pub use encoding::{choose_chain, Encoding, EncodingStrategy};
pub use error::{FormatError, Location};
pub use types::{Category, Column, ColumnData, ColumnKind, DataBlock, DataType};

use encoding::ChainError;
use wire::{WireReader, WireWriter};

/// File magic
pub const MAGIC: &[u8; 4] = b"SGCB";

/// Format version written by this build
pub const FORMAT_VERSION: u16 = 1;

/// Decode every data block in `bytes`
pub fn decode(bytes: &[u8]) -> Result<Vec<DataBlock>, FormatError> {
    let mut reader = WireReader::new(bytes);
    let file = Location::file();

    let magic = reader
        .bytes(MAGIC.len(), &file, "magic")
        .map_err(|_| FormatError::BadMagic)?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic);
    }

    let version = reader.u16(&file, "format version")?;
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let block_count = reader.u32(&file, "block count")?;
    let mut blocks = Vec::new();
    for _ in 0..block_count {
        blocks.push(read_block(&mut reader)?);
    }

    if reader.remaining() > 0 {
        return Err(FormatError::TrailingBytes(reader.remaining()));
    }

    log::debug!("Decoded {} data blocks from {} bytes", blocks.len(), bytes.len());
    Ok(blocks)
}

/// Encode data blocks into a byte buffer
pub fn encode(blocks: &[DataBlock]) -> Result<Vec<u8>, FormatError> {
    let mut writer = WireWriter::new();
    let file = Location::file();

    writer.raw(MAGIC);
    writer.u16(FORMAT_VERSION);
    writer.length(blocks.len(), &file, "block count")?;

    for block in blocks {
        write_block(&mut writer, block)?;
    }

    Ok(writer.into_inner())
}

/// Find a block by header
pub fn find_block<'a>(blocks: &'a [DataBlock], header: &str) -> Option<&'a DataBlock> {
    blocks.iter().find(|b| b.header == header)
}

fn read_block(reader: &mut WireReader<'_>) -> Result<DataBlock, FormatError> {
    let header = reader.string(&Location::file(), "block header")?;
    let location = Location::block(header.as_str());

    let category_count = reader.u32(&location, "category count")?;
    let mut block = DataBlock::new(header);
    for _ in 0..category_count {
        let category = read_category(reader, &location)?;
        block.categories.push(category);
    }
    Ok(block)
}

fn read_category(reader: &mut WireReader<'_>, block: &Location) -> Result<Category, FormatError> {
    let name = reader.string(block, "category name")?;
    let location = block.with_category(name.as_str());

    let row_count = reader.u32(&location, "row count")? as usize;
    let column_count = reader.u32(&location, "column count")?;

    let mut category = Category::new(name);
    for _ in 0..column_count {
        let column = read_column(reader, &location, row_count)?;
        category.push(column);
    }
    Ok(category)
}

fn read_column(
    reader: &mut WireReader<'_>,
    category: &Location,
    row_count: usize,
) -> Result<Column, FormatError> {
    let name = reader.string(category, "column name")?;
    let location = category.with_column(name.as_str());

    let encoding_count = reader.u8(&location, "encoding count")?;
    let mut encodings = Vec::with_capacity(encoding_count as usize);
    for _ in 0..encoding_count {
        encodings.push(read_encoding(reader, &location)?);
    }

    let data_len = reader.u32(&location, "data length")? as usize;
    let data = reader.bytes(data_len, &location, "column data")?.to_vec();

    let values =
        encoding::decode_chain(&encodings, data, row_count).map_err(|e| chain_error(e, &location))?;
    if values.len() != row_count {
        return Err(FormatError::RowCountMismatch {
            location,
            expected: row_count,
            actual: values.len(),
        });
    }

    Ok(Column::new(name, values))
}

fn read_encoding(reader: &mut WireReader<'_>, location: &Location) -> Result<Encoding, FormatError> {
    let tag = reader.u8(location, "encoding tag")?;
    let encoding = match tag {
        1 => Encoding::ByteArray {
            data_type: read_data_type(reader, location)?,
        },
        2 => {
            let origin = reader.i32(location, "delta origin")?;
            Encoding::Delta {
                origin,
                src_type: read_data_type(reader, location)?,
            }
        }
        3 => {
            let src_type = read_data_type(reader, location)?;
            Encoding::RunLength {
                src_type,
                src_size: reader.u32(location, "run-length size")?,
            }
        }
        4 => Encoding::StringArray,
        tag => {
            return Err(FormatError::UnknownEncoding {
                location: location.clone(),
                tag,
            })
        }
    };
    Ok(encoding)
}

fn read_data_type(reader: &mut WireReader<'_>, location: &Location) -> Result<DataType, FormatError> {
    let tag = reader.u8(location, "data type")?;
    DataType::from_tag(tag).ok_or_else(|| FormatError::UnknownDataType {
        location: location.clone(),
        tag,
    })
}

fn write_block(writer: &mut WireWriter, block: &DataBlock) -> Result<(), FormatError> {
    let location = Location::block(block.header.as_str());
    writer.string(&block.header, &Location::file(), "block header")?;
    writer.length(block.categories.len(), &location, "category count")?;

    for category in &block.categories {
        let location = location.with_category(category.name.as_str());
        let row_count = category.row_count();

        writer.string(&category.name, &location, "category name")?;
        writer.length(row_count, &location, "row count")?;
        writer.length(category.columns.len(), &location, "column count")?;

        for column in &category.columns {
            let location = location.with_column(column.name.as_str());
            if column.len() != row_count {
                return Err(FormatError::RowCountMismatch {
                    location,
                    expected: row_count,
                    actual: column.len(),
                });
            }
            write_column(writer, column, &location)?;
        }
    }
    Ok(())
}

fn write_column(writer: &mut WireWriter, column: &Column, location: &Location) -> Result<(), FormatError> {
    let (encodings, data) =
        encoding::encode_column(&column.data, column.strategy).map_err(|e| chain_error(e, location))?;

    writer.string(&column.name, location, "column name")?;
    writer.u8(encodings.len() as u8);
    for encoding in &encodings {
        writer.u8(encoding.tag());
        match *encoding {
            Encoding::ByteArray { data_type } => writer.u8(data_type.tag()),
            Encoding::Delta { origin, src_type } => {
                writer.i32(origin);
                writer.u8(src_type.tag());
            }
            Encoding::RunLength { src_type, src_size } => {
                writer.u8(src_type.tag());
                writer.u32(src_size);
            }
            Encoding::StringArray => {}
        }
    }
    writer.length(data.len(), location, "column data")?;
    writer.raw(&data);
    Ok(())
}

fn chain_error(err: ChainError, location: &Location) -> FormatError {
    match err {
        ChainError::Invalid(reason) => FormatError::InvalidChain {
            location: location.clone(),
            reason,
        },
        ChainError::Utf8 => FormatError::InvalidUtf8 {
            location: location.clone(),
        },
    }
}
