use anyhow::{Context, Result};
use std::path::PathBuf;

use segmesh::codec;
use segmesh::volume::SegmentationVolumeModel;

/// Dump the structure of a column block file
pub fn run(file: PathBuf) -> Result<()> {
    let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    let blocks = codec::decode(&bytes).context("Failed to decode column blocks")?;

    println!("Column Block File");
    println!("=================");
    println!("File: {}", file.display());
    println!("Blocks: {}", blocks.len());

    for block in &blocks {
        println!();
        println!("{}", block.header);
        for category in &block.categories {
            println!("  {} ({} rows)", category.name, category.row_count());
            for column in &category.columns {
                println!("    {:<32} {:?}", column.name, column.data.kind());
            }
        }
    }

    if let Ok(model) = SegmentationVolumeModel::from_bytes(&bytes) {
        let segments: Vec<String> = model.distinct_labels().iter().map(|s| s.to_string()).collect();
        println!();
        println!("Segmentation:");
        println!("  Grid: {:?}", model.dims());
        println!("  Voxel size: {:?}", model.grid().voxel_size());
        println!("  Timeframe: {}, channel: {}", model.timeframe(), model.channel_id());
        println!("  Segments ({}): {}", segments.len(), segments.join(", "));
    }

    Ok(())
}
