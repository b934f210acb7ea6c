use anyhow::{Context, Result};
use std::path::PathBuf;

use segmesh::archive::CvsxArchive;

/// Display the index and annotation summary of an archive
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mut archive = CvsxArchive::open(&file).context("Failed to open archive")?;
    let document = archive
        .annotations_document()
        .context("Failed to read annotations")?;
    let index = archive.index().clone();

    println!("Segmentation Archive Information");
    println!("================================");
    println!("File: {}", file.display());
    if let Some(name) = &document.name {
        println!("Entry: {}", name);
    }
    println!();

    println!("Volumes:");
    for (path, entry) in &index.volumes {
        println!("  {} (channel {}, timeframe {})", path, entry.channel_id, entry.timeframe_index);
    }
    println!();

    println!("Lattice segmentations:");
    for (path, entry) in index.lattice_entries() {
        println!(
            "  {} (segmentation {}, timeframe {})",
            path, entry.segmentation_id, entry.timeframe_index
        );
    }
    println!();

    println!("Annotations:");
    println!("  Segment annotations: {}", document.segment_annotations.len());
    println!("  Descriptions: {}", document.descriptions.len());
    println!(
        "  Channel annotations: {}",
        document.volume_channels_annotations.as_ref().map_or(0, Vec::len)
    );

    Ok(())
}
