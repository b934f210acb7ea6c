use super::*;

fn single_column_block(column: Column) -> DataBlock {
    DataBlock::new("TEST").with_category(Category::new("table").with_column(column))
}

fn round_trip(column: Column) -> ColumnData {
    let bytes = encode(&[single_column_block(column)]).unwrap();
    let blocks = decode(&bytes).unwrap();
    blocks[0].categories[0].columns[0].data.clone()
}

/// Hand-built header for a file with one block, one category and one column
fn column_prelude(rows: u32) -> WireWriter {
    let loc = Location::file();
    let mut w = WireWriter::new();
    w.raw(MAGIC);
    w.u16(FORMAT_VERSION);
    w.u32(1);
    w.string("BLOCK", &loc, "header").unwrap();
    w.u32(1);
    w.string("cat", &loc, "category").unwrap();
    w.u32(rows);
    w.u32(1);
    w.string("col", &loc, "column").unwrap();
    w
}

#[test]
fn test_fixed_width_round_trip() {
    let ints = ColumnData::Int32(vec![-7, 0, 1 << 20, i32::MAX, i32::MIN]);
    let floats = ColumnData::Float32(vec![0.0, -1.5, 3.25e-3, f32::MAX]);
    let doubles = ColumnData::Float64(vec![1.0e-300, -2.5, std::f64::consts::PI]);

    for data in [ints, floats, doubles] {
        let column = Column::new("values", data.clone()).with_strategy(EncodingStrategy::FixedWidth);
        assert_eq!(round_trip(column), data);
    }
}

#[test]
fn test_delta_run_length_round_trip() {
    let ids: Vec<i32> = [1, 1, 1, 2, 3, 4, 4, 4, 4, 10, 9, 8]
        .into_iter()
        .chain(1000..1100)
        .collect();
    let data = ColumnData::Int32(ids);
    let column = Column::new("segment_id", data.clone()).with_strategy(EncodingStrategy::DeltaRunLength);
    assert_eq!(round_trip(column), data);
}

#[test]
fn test_byte_array_narrows_width() {
    let data = ColumnData::Int32(vec![0, 200, 3, 255, 17, 42, 9, 1]);

    let narrow = encode(&[single_column_block(
        Column::new("v", data.clone()).with_strategy(EncodingStrategy::ByteArray),
    )])
    .unwrap();
    let wide = encode(&[single_column_block(
        Column::new("v", data.clone()).with_strategy(EncodingStrategy::FixedWidth),
    )])
    .unwrap();

    // 8 values at 1 byte instead of 4
    assert_eq!(wide.len() - narrow.len(), 24);
    assert_eq!(decode(&narrow).unwrap()[0].categories[0].columns[0].data, data);
}

#[test]
fn test_negative_values_narrow_to_signed() {
    let data = ColumnData::Int32(vec![-3, 100, -128, 127]);
    let column = Column::new("v", data.clone()).with_strategy(EncodingStrategy::ByteArray);
    assert_eq!(round_trip(column), data);
    assert_eq!(DataType::narrowest_for(&[-3, 100, -128, 127]), DataType::Int8);
    assert_eq!(DataType::narrowest_for(&[-3, 300]), DataType::Int16);
    assert_eq!(DataType::narrowest_for(&[70_000]), DataType::Int32);
}

#[test]
fn test_string_round_trip() {
    let data = ColumnData::Strings(vec![
        "segmentation".to_string(),
        String::new(),
        "ångström".to_string(),
    ]);
    assert_eq!(round_trip(Column::new("name", data.clone())), data);
}

#[test]
fn test_zero_length_columns() {
    let cases = [
        (ColumnData::Int32(vec![]), EncodingStrategy::FixedWidth),
        (ColumnData::Int32(vec![]), EncodingStrategy::ByteArray),
        (ColumnData::Int32(vec![]), EncodingStrategy::DeltaRunLength),
        (ColumnData::Float32(vec![]), EncodingStrategy::Auto),
        (ColumnData::Float64(vec![]), EncodingStrategy::Auto),
        (ColumnData::Strings(vec![]), EncodingStrategy::Auto),
    ];
    for (data, strategy) in cases {
        assert_eq!(round_trip(Column::new("empty", data.clone()).with_strategy(strategy)), data);
    }
}

#[test]
fn test_single_row_columns() {
    let cases = [
        (ColumnData::Int32(vec![-42]), EncodingStrategy::DeltaRunLength),
        (ColumnData::Int32(vec![42]), EncodingStrategy::ByteArray),
        (ColumnData::Float64(vec![0.125]), EncodingStrategy::FixedWidth),
        (ColumnData::Strings(vec!["only".to_string()]), EncodingStrategy::Auto),
    ];
    for (data, strategy) in cases {
        assert_eq!(round_trip(Column::new("one", data.clone()).with_strategy(strategy)), data);
    }
}

#[test]
fn test_multiple_blocks_and_lookup() {
    let volume = DataBlock::new("VOLUME_DATA").with_category(
        Category::new("volume_data_3d")
            .with_column(Column::new("values", ColumnData::Float32(vec![0.0, 0.5, 1.0]))),
    );
    let segmentation = DataBlock::new("SEGMENTATION_DATA").with_category(
        Category::new("segmentation_data_3d")
            .with_column(Column::new("values", ColumnData::Int32(vec![0, 0, 7]))),
    );

    let bytes = encode(&[volume.clone(), segmentation.clone()]).unwrap();
    let blocks = decode(&bytes).unwrap();

    assert_eq!(blocks.len(), 2);
    assert_eq!(find_block(&blocks, "SEGMENTATION_DATA"), Some(&segmentation));
    assert_eq!(find_block(&blocks, "VOLUME_DATA"), Some(&volume));
    assert!(find_block(&blocks, "MISSING").is_none());
}

#[test]
fn test_bad_magic() {
    assert!(matches!(decode(b"NOPE\x01\x00\x00\x00\x00\x00"), Err(FormatError::BadMagic)));
    assert!(matches!(decode(b"SG"), Err(FormatError::BadMagic)));
}

#[test]
fn test_unsupported_version() {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&7u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    assert!(matches!(decode(&bytes), Err(FormatError::UnsupportedVersion(7))));
}

#[test]
fn test_unknown_encoding_names_column() {
    let mut w = column_prelude(1);
    w.u8(1);
    w.u8(9);
    let err = decode(&w.into_inner()).unwrap_err();

    match &err {
        FormatError::UnknownEncoding { location, tag } => {
            assert_eq!(*tag, 9);
            assert_eq!(location.block.as_deref(), Some("BLOCK"));
            assert_eq!(location.category.as_deref(), Some("cat"));
            assert_eq!(location.column.as_deref(), Some("col"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("column 'col'"));
}

#[test]
fn test_unknown_data_type() {
    let mut w = column_prelude(1);
    w.u8(1);
    w.u8(1);
    w.u8(77);
    assert!(matches!(
        decode(&w.into_inner()),
        Err(FormatError::UnknownDataType { tag: 77, .. })
    ));
}

#[test]
fn test_row_count_mismatch_on_decode() {
    let mut w = column_prelude(2);
    w.u8(1);
    w.u8(1);
    w.u8(DataType::Int32.tag());
    w.u32(4);
    w.i32(5);
    assert!(matches!(
        decode(&w.into_inner()),
        Err(FormatError::RowCountMismatch {
            expected: 2,
            actual: 1,
            ..
        })
    ));
}

#[test]
fn test_row_count_mismatch_on_encode() {
    let block = DataBlock::new("B").with_category(
        Category::new("c")
            .with_column(Column::new("a", ColumnData::Int32(vec![1, 2])))
            .with_column(Column::new("b", ColumnData::Int32(vec![1, 2, 3]))),
    );
    match encode(&[block]) {
        Err(FormatError::RowCountMismatch { location, .. }) => {
            assert_eq!(location.column.as_deref(), Some("b"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_truncated_input() {
    let block = single_column_block(Column::new("v", ColumnData::Int32((0..50).collect())));
    let bytes = encode(&[block]).unwrap();

    for cut in [5, 12, bytes.len() / 2, bytes.len() - 1] {
        let result = decode(&bytes[..cut]);
        assert!(
            matches!(result, Err(FormatError::Truncated { .. })),
            "cut at {cut}: {result:?}"
        );
    }
}

#[test]
fn test_trailing_bytes() {
    let mut bytes = encode(&[DataBlock::new("EMPTY")]).unwrap();
    bytes.push(0);
    assert!(matches!(decode(&bytes), Err(FormatError::TrailingBytes(1))));
}

#[test]
fn test_invalid_utf8_string_column() {
    let mut w = column_prelude(1);
    w.u8(1);
    w.u8(4);
    w.u32(6);
    w.u32(2);
    w.raw(&[0xff, 0xfe]);
    assert!(matches!(
        decode(&w.into_inner()),
        Err(FormatError::InvalidUtf8 { .. })
    ));
}

#[test]
fn test_delta_on_floats_is_rejected() {
    let block = single_column_block(
        Column::new("f", ColumnData::Float32(vec![1.0])).with_strategy(EncodingStrategy::DeltaRunLength),
    );
    assert!(matches!(encode(&[block]), Err(FormatError::InvalidChain { .. })));
}

#[test]
fn test_scalar_accessors() {
    let category = Category::new("info")
        .with_column(Column::new("name", ColumnData::Strings(vec!["grid".to_string()])))
        .with_column(Column::new("sample_rate", ColumnData::Int32(vec![2])))
        .with_column(Column::new("mean", ColumnData::Float64(vec![0.25])));

    assert_eq!(category.str_scalar("name"), Some("grid"));
    assert_eq!(category.i32_scalar("sample_rate"), Some(2));
    assert_eq!(category.f64_scalar("mean"), Some(0.25));
    assert_eq!(category.f64_scalar("sample_rate"), Some(2.0));
    assert_eq!(category.i32_scalar("mean"), None);
    assert_eq!(category.row_count(), 1);
}
