use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of segmentation a segment annotation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Voxel label segmentation
    Lattice,
    /// Mesh segmentation
    Mesh,
    /// Parametric shape segmentation
    Primitive,
}

/// Kind of object a description targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A lattice segment
    Lattice,
    /// A mesh segment
    Mesh,
    /// A primitive segment
    Primitive,
    /// The whole entry
    Entry,
}

/// One timeframe or an inclusive `[start, end]` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeEntry {
    /// Single timeframe
    Frame(i32),
    /// Inclusive range
    Range([i32; 2]),
}

/// Timeframes an annotation applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSpec {
    /// Single timeframe
    Frame(i32),
    /// Several frames and ranges
    List(Vec<TimeEntry>),
}

impl TimeSpec {
    /// True when `timeframe` is covered
    pub fn contains(&self, timeframe: i32) -> bool {
        match self {
            TimeSpec::Frame(t) => *t == timeframe,
            TimeSpec::List(entries) => entries.iter().any(|entry| match *entry {
                TimeEntry::Frame(t) => t == timeframe,
                TimeEntry::Range([start, end]) => (start..=end).contains(&timeframe),
            }),
        }
    }
}

/// Source database of an entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryId {
    /// Identifier in the source database
    #[serde(default)]
    pub source_db_id: Option<String>,
    /// Source database name
    #[serde(default)]
    pub source_db_name: Option<String>,
}

/// Color and timing of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnnotation {
    /// Identifier of this record
    #[serde(default)]
    pub id: Option<String>,
    /// Segmentation kind
    pub segment_kind: SegmentKind,
    /// Segment label
    pub segment_id: i32,
    /// Segmentation identifier
    pub segmentation_id: String,
    /// RGBA, components in `[0, 1]`; alpha is the opacity
    #[serde(default)]
    pub color: Option<[f64; 4]>,
    /// Timeframes covered; absent means all
    #[serde(default)]
    pub time: Option<TimeSpec>,
}

/// Reference into an external resource such as an ontology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalReference {
    /// Identifier of this record
    #[serde(default)]
    pub id: Option<String>,
    /// Resource name, e.g. an ontology
    #[serde(default)]
    pub resource: Option<String>,
    /// Accession within the resource
    #[serde(default)]
    pub accession: Option<String>,
    /// Human-readable label
    #[serde(default)]
    pub label: Option<String>,
    /// Longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the referenced record
    #[serde(default)]
    pub url: Option<String>,
}

/// Segment a description is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetId {
    /// Segmentation identifier
    pub segmentation_id: String,
    /// Segment label
    pub segment_id: i32,
}

/// Free-text details of a description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsText {
    /// `text` or `markdown`
    pub format: String,
    /// Body text
    pub text: String,
}

/// Descriptive entry for a segment or the whole entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Identifier of this record
    #[serde(default)]
    pub id: Option<String>,
    /// Kind of the described object
    pub target_kind: TargetKind,
    /// Described segment, absent for entry-level descriptions
    #[serde(default)]
    pub target_id: Option<TargetId>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// External references
    #[serde(default)]
    pub external_references: Option<Vec<ExternalReference>>,
    /// Hidden from listings
    #[serde(default)]
    pub is_hidden: Option<bool>,
    /// Timeframes covered; absent means all
    #[serde(default)]
    pub time: Option<TimeSpec>,
    /// Free-text details
    #[serde(default)]
    pub details: Option<DetailsText>,
    /// Arbitrary extra metadata
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Display color of a volume channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAnnotation {
    /// Channel identifier
    pub channel_id: String,
    /// RGBA, components in `[0, 1]`
    pub color: [f64; 4],
    /// Human-readable label
    #[serde(default)]
    pub label: Option<String>,
}

/// The archive's annotations document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationsDocument {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Source database entry
    #[serde(default)]
    pub entry_id: EntryId,
    /// Descriptions keyed by id, in document order
    #[serde(
        default,
        deserialize_with = "ordered_descriptions",
        serialize_with = "descriptions_as_map"
    )]
    pub descriptions: Vec<(String, Description)>,
    /// Segment colors
    #[serde(default)]
    pub segment_annotations: Vec<SegmentAnnotation>,
    /// Entry-level details
    #[serde(default)]
    pub details: Option<String>,
    /// Volume channel colors
    #[serde(default)]
    pub volume_channels_annotations: Option<Vec<ChannelAnnotation>>,
}

impl AnnotationsDocument {
    /// Parse from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

fn ordered_descriptions<'de, D>(deserializer: D) -> Result<Vec<(String, Description)>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(key, value)| {
            serde_json::from_value(value)
                .map(|description| (key.clone(), description))
                .map_err(|e| D::Error::custom(format!("description '{}': {}", key, e)))
        })
        .collect()
}

fn descriptions_as_map<S>(descriptions: &[(String, Description)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(descriptions.iter().map(|(k, v)| (k, v)))
}
