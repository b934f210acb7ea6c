//! Encoding chains for column data
//!
//! A column is stored as raw bytes plus the list of encodings that produced
//! them, in application order. Decoding walks the list backwards:
//!
//! 1. `ByteArray` turns bytes into typed values
//! 2. `RunLength` expands `(value, count)` pairs
//! 3. `Delta` integrates differences from an origin
//!
//! `StringArray` is terminal and only used for string columns.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::types::{ColumnData, DataType};

/// Upper bound on values a run-length step may expand to
const MAX_EXPANDED_VALUES: usize = 1 << 28;

/// One step of an encoding chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Fixed-width typed values packed little-endian
    ByteArray {
        /// Element type of the packed values
        data_type: DataType,
    },
    /// Differences from the previous value, starting at `origin`
    Delta {
        /// Value the first difference is relative to
        origin: i32,
        /// Type of the values before encoding
        src_type: DataType,
    },
    /// `(value, count)` pairs
    RunLength {
        /// Type of the values before encoding
        src_type: DataType,
        /// Number of values after expansion
        src_size: u32,
    },
    /// Length-prefixed UTF-8 strings
    StringArray,
}

impl Encoding {
    /// Wire tag for this encoding
    pub fn tag(&self) -> u8 {
        match self {
            Encoding::ByteArray { .. } => 1,
            Encoding::Delta { .. } => 2,
            Encoding::RunLength { .. } => 3,
            Encoding::StringArray => 4,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Encoding::ByteArray { .. } => "ByteArray",
            Encoding::Delta { .. } => "Delta",
            Encoding::RunLength { .. } => "RunLength",
            Encoding::StringArray => "StringArray",
        }
    }
}

/// Write-side encoding selection for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingStrategy {
    /// Pick from the value distribution (see [`choose_chain`])
    #[default]
    Auto,
    /// Byte array of the column's natural width (int32/float32/float64)
    FixedWidth,
    /// Byte array of the narrowest lossless width
    ByteArray,
    /// Delta followed by run-length, packed as int32
    DeltaRunLength,
}

/// Chain construction or application failure, located by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChainError {
    Invalid(String),
    Utf8,
}

/// Intermediate representation between chain steps
enum Stage {
    Bytes(Vec<u8>),
    Ints(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Strings(Vec<String>),
}

impl Stage {
    fn describe(&self) -> &'static str {
        match self {
            Stage::Bytes(_) => "bytes",
            Stage::Ints(_) => "integers",
            Stage::F32(_) => "float32 values",
            Stage::F64(_) => "float64 values",
            Stage::Strings(_) => "strings",
        }
    }
}

/// Resolve an `Auto` strategy to a concrete one. Pure function of the values:
/// delta+run-length wins only when it is strictly smaller than the narrowest
/// byte array.
pub fn choose_chain(data: &ColumnData, strategy: EncodingStrategy) -> EncodingStrategy {
    match (strategy, data) {
        (EncodingStrategy::Auto, ColumnData::Int32(values)) => {
            let narrow = values.len() * DataType::narrowest_for(values).byte_size();
            let runs = run_length_encode(&delta_encode(values)).len();
            if runs * DataType::Int32.byte_size() < narrow {
                EncodingStrategy::DeltaRunLength
            } else {
                EncodingStrategy::ByteArray
            }
        }
        (EncodingStrategy::Auto, _) => EncodingStrategy::FixedWidth,
        (other, _) => other,
    }
}

/// Encode column values with the given strategy, returning the chain and bytes
pub(crate) fn encode_column(
    data: &ColumnData,
    strategy: EncodingStrategy,
) -> Result<(Vec<Encoding>, Vec<u8>), ChainError> {
    let strategy = choose_chain(data, strategy);

    match data {
        ColumnData::Strings(values) => Ok((vec![Encoding::StringArray], pack_strings(values))),
        ColumnData::Float32(values) => match strategy {
            EncodingStrategy::DeltaRunLength => Err(ChainError::Invalid(
                "delta encoding requires an integer column".to_string(),
            )),
            _ => {
                let mut out = Vec::with_capacity(values.len() * 4);
                for &v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
                Ok((
                    vec![Encoding::ByteArray {
                        data_type: DataType::Float32,
                    }],
                    out,
                ))
            }
        },
        ColumnData::Float64(values) => match strategy {
            EncodingStrategy::DeltaRunLength => Err(ChainError::Invalid(
                "delta encoding requires an integer column".to_string(),
            )),
            _ => {
                let mut out = Vec::with_capacity(values.len() * 8);
                for &v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
                Ok((
                    vec![Encoding::ByteArray {
                        data_type: DataType::Float64,
                    }],
                    out,
                ))
            }
        },
        ColumnData::Int32(values) => match strategy {
            EncodingStrategy::DeltaRunLength => {
                let src_size = u32::try_from(values.len()).map_err(|_| {
                    ChainError::Invalid(format!("{} values exceed u32 range", values.len()))
                })?;
                let origin = values.first().copied().unwrap_or(0);
                let pairs = run_length_encode(&delta_encode(values));
                let bytes = pack_ints(&pairs, DataType::Int32)?;
                Ok((
                    vec![
                        Encoding::Delta {
                            origin,
                            src_type: DataType::Int32,
                        },
                        Encoding::RunLength {
                            src_type: DataType::Int32,
                            src_size,
                        },
                        Encoding::ByteArray {
                            data_type: DataType::Int32,
                        },
                    ],
                    bytes,
                ))
            }
            EncodingStrategy::FixedWidth => Ok((
                vec![Encoding::ByteArray {
                    data_type: DataType::Int32,
                }],
                pack_ints(values, DataType::Int32)?,
            )),
            _ => {
                let data_type = DataType::narrowest_for(values);
                Ok((
                    vec![Encoding::ByteArray { data_type }],
                    pack_ints(values, data_type)?,
                ))
            }
        },
    }
}

/// Apply an encoding chain in reverse to recover `row_count` column values
pub(crate) fn decode_chain(
    encodings: &[Encoding],
    data: Vec<u8>,
    row_count: usize,
) -> Result<ColumnData, ChainError> {
    let mut stage = Stage::Bytes(data);

    for encoding in encodings.iter().rev() {
        stage = match (encoding, stage) {
            (Encoding::ByteArray { data_type }, Stage::Bytes(bytes)) => unpack(&bytes, *data_type)?,
            (Encoding::StringArray, Stage::Bytes(bytes)) => Stage::Strings(unpack_strings(&bytes)?),
            (Encoding::RunLength { src_type, src_size }, Stage::Ints(pairs)) => {
                require_integer(*src_type, "RunLength")?;
                let src_size = *src_size as usize;
                if src_size != row_count {
                    return Err(ChainError::Invalid(format!(
                        "run-length size {} does not match row count {}",
                        src_size, row_count
                    )));
                }
                Stage::Ints(run_length_decode(&pairs, src_size)?)
            }
            (Encoding::Delta { origin, src_type }, Stage::Ints(deltas)) => {
                require_integer(*src_type, "Delta")?;
                Stage::Ints(delta_decode(*origin, &deltas))
            }
            (encoding, stage) => {
                return Err(ChainError::Invalid(format!(
                    "{} cannot be applied to {}",
                    encoding.kind(),
                    stage.describe()
                )))
            }
        };
    }

    match stage {
        Stage::Ints(v) => Ok(ColumnData::Int32(v)),
        Stage::F32(v) => Ok(ColumnData::Float32(v)),
        Stage::F64(v) => Ok(ColumnData::Float64(v)),
        Stage::Strings(v) => Ok(ColumnData::Strings(v)),
        Stage::Bytes(_) => Err(ChainError::Invalid(
            "chain does not produce typed values".to_string(),
        )),
    }
}

fn require_integer(data_type: DataType, encoding: &str) -> Result<(), ChainError> {
    if data_type.is_integer() {
        Ok(())
    } else {
        Err(ChainError::Invalid(format!(
            "{} source type {:?} is not an integer type",
            encoding, data_type
        )))
    }
}

fn delta_encode(values: &[i32]) -> Vec<i32> {
    let mut prev = values.first().copied().unwrap_or(0);
    values
        .iter()
        .map(|&v| {
            let d = v.wrapping_sub(prev);
            prev = v;
            d
        })
        .collect()
}

fn delta_decode(origin: i32, deltas: &[i32]) -> Vec<i32> {
    let mut acc = origin;
    deltas
        .iter()
        .map(|&d| {
            acc = acc.wrapping_add(d);
            acc
        })
        .collect()
}

fn run_length_encode(values: &[i32]) -> Vec<i32> {
    let mut pairs = Vec::new();
    let mut iter = values.iter().copied();
    let Some(mut current) = iter.next() else {
        return pairs;
    };
    let mut count: i32 = 1;

    for v in iter {
        if v == current && count < i32::MAX {
            count += 1;
        } else {
            pairs.push(current);
            pairs.push(count);
            current = v;
            count = 1;
        }
    }
    pairs.push(current);
    pairs.push(count);
    pairs
}

fn run_length_decode(pairs: &[i32], src_size: usize) -> Result<Vec<i32>, ChainError> {
    if src_size > MAX_EXPANDED_VALUES {
        return Err(ChainError::Invalid(format!(
            "run-length size {} exceeds the limit of {} values",
            src_size, MAX_EXPANDED_VALUES
        )));
    }
    if pairs.len() % 2 != 0 {
        return Err(ChainError::Invalid(format!(
            "run-length data has odd length {}",
            pairs.len()
        )));
    }

    let mut total: u64 = 0;
    for pair in pairs.chunks_exact(2) {
        if pair[1] < 0 {
            return Err(ChainError::Invalid(format!("negative run length {}", pair[1])));
        }
        total += pair[1] as u64;
    }
    if total != src_size as u64 {
        return Err(ChainError::Invalid(format!(
            "run-length expands to {} values, header declares {}",
            total, src_size
        )));
    }

    let mut out = Vec::with_capacity(src_size);
    for pair in pairs.chunks_exact(2) {
        out.extend(std::iter::repeat(pair[0]).take(pair[1] as usize));
    }
    Ok(out)
}

fn pack_ints(values: &[i32], data_type: DataType) -> Result<Vec<u8>, ChainError> {
    let mut out = Vec::with_capacity(values.len() * data_type.byte_size());
    let out_of_range = |v: i32| ChainError::Invalid(format!("value {} does not fit {:?}", v, data_type));

    for &v in values {
        match data_type {
            DataType::Int8 => out.push(i8::try_from(v).map_err(|_| out_of_range(v))? as u8),
            DataType::Uint8 => out.push(u8::try_from(v).map_err(|_| out_of_range(v))?),
            DataType::Int16 => out.extend_from_slice(
                &i16::try_from(v).map_err(|_| out_of_range(v))?.to_le_bytes(),
            ),
            DataType::Uint16 => out.extend_from_slice(
                &u16::try_from(v).map_err(|_| out_of_range(v))?.to_le_bytes(),
            ),
            DataType::Int32 => out.extend_from_slice(&v.to_le_bytes()),
            DataType::Uint32 => out.extend_from_slice(
                &u32::try_from(v).map_err(|_| out_of_range(v))?.to_le_bytes(),
            ),
            DataType::Float32 | DataType::Float64 => {
                return Err(ChainError::Invalid(format!(
                    "cannot pack integers as {:?}",
                    data_type
                )))
            }
        }
    }
    Ok(out)
}

fn unpack(bytes: &[u8], data_type: DataType) -> Result<Stage, ChainError> {
    let size = data_type.byte_size();
    if bytes.len() % size != 0 {
        return Err(ChainError::Invalid(format!(
            "{} bytes is not a multiple of the {:?} width {}",
            bytes.len(),
            data_type,
            size
        )));
    }

    let count = bytes.len() / size;
    let mut cursor = Cursor::new(bytes);
    // Length was checked above, so reads from the cursor cannot run short.
    let eof = |_: std::io::Error| ChainError::Invalid("unexpected end of byte array".to_string());

    let stage = match data_type {
        DataType::Float32 => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(cursor.read_f32::<LittleEndian>().map_err(eof)?);
            }
            Stage::F32(values)
        }
        DataType::Float64 => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(cursor.read_f64::<LittleEndian>().map_err(eof)?);
            }
            Stage::F64(values)
        }
        integer => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                let v = match integer {
                    DataType::Int8 => cursor.read_i8().map_err(eof)? as i32,
                    DataType::Uint8 => cursor.read_u8().map_err(eof)? as i32,
                    DataType::Int16 => cursor.read_i16::<LittleEndian>().map_err(eof)? as i32,
                    DataType::Uint16 => cursor.read_u16::<LittleEndian>().map_err(eof)? as i32,
                    DataType::Int32 => cursor.read_i32::<LittleEndian>().map_err(eof)?,
                    _ => {
                        let raw = cursor.read_u32::<LittleEndian>().map_err(eof)?;
                        i32::try_from(raw).map_err(|_| {
                            ChainError::Invalid(format!("uint32 value {} exceeds int32 range", raw))
                        })?
                    }
                };
                values.push(v);
            }
            Stage::Ints(values)
        }
    };
    Ok(stage)
}

fn pack_strings(values: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for s in values {
        out.extend_from_slice(&(s.len() as u32).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
    }
    out
}

fn unpack_strings(bytes: &[u8]) -> Result<Vec<String>, ChainError> {
    let mut values = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        if rest.len() < 4 {
            return Err(ChainError::Invalid("truncated string length".to_string()));
        }
        let len = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        rest = &rest[4..];
        if rest.len() < len {
            return Err(ChainError::Invalid(format!(
                "string of length {} overruns column data",
                len
            )));
        }
        let s = std::str::from_utf8(&rest[..len]).map_err(|_| ChainError::Utf8)?;
        values.push(s.to_string());
        rest = &rest[len..];
    }
    Ok(values)
}
