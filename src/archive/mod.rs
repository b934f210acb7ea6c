//! # Archive I/O
//!
//! Reads segmentation archives (a zip container with an `index.json`, an
//! annotations document, a metadata document and one column block file per
//! volume or segmentation) and writes the meshed output archive.
//!
//! ## Input Layout
//!
//! ```text
//! entry.cvsx
//! ├── index.json          # paths of everything below
//! ├── annotations.json
//! ├── metadata.json
//! ├── volume_0_0.bcif     # one per (channel, timeframe)
//! └── lattice_0_0.bcif    # one per (segmentation, timeframe)
//! ```
//!
//! ## Output Layout
//!
//! ```text
//! output.zip
//! ├── volumes/<file>
//! ├── segmentations/<file>
//! └── scene.json          # volumes + mesh primitives
//! ```

mod error;
mod index;
mod reader;
mod writer;


pub use error::ArchiveError;
pub use index::{validate_path, ArchiveIndex, LatticeEntry, VolumeEntry};
pub use reader::{CvsxArchive, INDEX_PATH};
pub use writer::{GeneratorInfo, SceneDocument, SceneMesh, SceneVolume, SceneWriter, SCENE_PATH};
