#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding either succeeds or returns an error; it must never panic
    if let Ok(blocks) = segmesh::codec::decode(data) {
        // Anything that decodes must re-encode
        let _ = segmesh::codec::encode(&blocks);
    }

    // Same for the volume layer on top of the codec
    let _ = segmesh::volume::SegmentationVolumeModel::from_bytes(data);
});
