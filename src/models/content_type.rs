//! Content types and their capability descriptors
//!
//! Every content type managed by the admin tool is described statically by a
//! [`ContentTypeDescriptor`]: which listing endpoints exist for it, whether it
//! can be staged as a draft and published, and how it refers to its parent.

use serde::{Deserialize, Serialize};

/// The eight content types managed by the admin tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Manufacturer,
    Model,
    Image,
    Stage,
    Timing,
    Video,
    VideoSeries,
    VideoSeriesVideoLink,
}

/// Content types shown on the dashboard, in rendering order
pub const DASHBOARD_TYPES: [ContentType; 6] = [
    ContentType::Manufacturer,
    ContentType::Model,
    ContentType::VideoSeries,
    ContentType::Image,
    ContentType::Stage,
    ContentType::Timing,
];

/// A field on an item that refers to the owning parent entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentField {
    /// Field name in the upstream record
    pub field: &'static str,
    /// Content type the field points at
    pub kind: ContentType,
}

/// Static capabilities of a content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTypeDescriptor {
    pub kind: ContentType,
    /// Collection segment of the upstream API
    pub collection: &'static str,
    /// Plural display title
    pub title: &'static str,
    /// Singular display name
    pub singular: &'static str,
    pub indexable: bool,
    pub draftable: bool,
    pub publishable: bool,
    /// Candidate parent references; the first one present on an item wins
    pub parents: &'static [ParentField],
    /// Whether the entity has a page of its own
    pub has_detail_page: bool,
}

impl ContentTypeDescriptor {
    /// Nested types are owned by another entity and have no top-level routes
    pub fn is_nested(&self) -> bool {
        !self.parents.is_empty()
    }
}

static MANUFACTURER: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::Manufacturer,
    collection: "manufacturers",
    title: "Manufacturers",
    singular: "Manufacturer",
    indexable: true,
    draftable: true,
    publishable: true,
    parents: &[],
    has_detail_page: true,
};

static MODEL: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::Model,
    collection: "models",
    title: "Models",
    singular: "Model",
    indexable: true,
    draftable: true,
    publishable: true,
    // manufacturerID is a plain reference, models have their own routes
    parents: &[],
    has_detail_page: true,
};

static IMAGE: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::Image,
    collection: "images",
    title: "Images",
    singular: "Image",
    indexable: true,
    draftable: true,
    publishable: true,
    parents: &[ParentField {
        field: "carModelID",
        kind: ContentType::Model,
    }],
    has_detail_page: false,
};

static STAGE: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::Stage,
    collection: "stages",
    title: "Stages",
    singular: "Stage",
    indexable: true,
    draftable: true,
    publishable: true,
    parents: &[ParentField {
        field: "carModelID",
        kind: ContentType::Model,
    }],
    has_detail_page: true,
};

static TIMING: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::Timing,
    collection: "timings",
    title: "Timings",
    singular: "Timing",
    indexable: true,
    draftable: true,
    publishable: true,
    parents: &[ParentField {
        field: "stageID",
        kind: ContentType::Stage,
    }],
    has_detail_page: false,
};

static VIDEO: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::Video,
    collection: "videos",
    title: "Videos",
    singular: "Video",
    indexable: true,
    draftable: false,
    publishable: false,
    parents: &[],
    has_detail_page: false,
};

static VIDEO_SERIES: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::VideoSeries,
    collection: "videoSeries",
    title: "Video Series",
    singular: "Video Series",
    indexable: true,
    draftable: true,
    publishable: true,
    parents: &[],
    has_detail_page: true,
};

static VIDEO_SERIES_VIDEO_LINK: ContentTypeDescriptor = ContentTypeDescriptor {
    kind: ContentType::VideoSeriesVideoLink,
    collection: "videoSeriesVideos",
    title: "Video Links",
    singular: "Video Link",
    indexable: true,
    draftable: true,
    publishable: true,
    parents: &[
        ParentField {
            field: "videoSerieID",
            kind: ContentType::VideoSeries,
        },
        ParentField {
            field: "stageID",
            kind: ContentType::Stage,
        },
    ],
    has_detail_page: false,
};

impl ContentType {
    /// All content types
    pub const ALL: [ContentType; 8] = [
        ContentType::Manufacturer,
        ContentType::Model,
        ContentType::Image,
        ContentType::Stage,
        ContentType::Timing,
        ContentType::Video,
        ContentType::VideoSeries,
        ContentType::VideoSeriesVideoLink,
    ];

    /// Static descriptor for this content type
    pub fn descriptor(self) -> &'static ContentTypeDescriptor {
        match self {
            ContentType::Manufacturer => &MANUFACTURER,
            ContentType::Model => &MODEL,
            ContentType::Image => &IMAGE,
            ContentType::Stage => &STAGE,
            ContentType::Timing => &TIMING,
            ContentType::Video => &VIDEO,
            ContentType::VideoSeries => &VIDEO_SERIES,
            ContentType::VideoSeriesVideoLink => &VIDEO_SERIES_VIDEO_LINK,
        }
    }

    /// Upstream collection segment
    pub fn collection(self) -> &'static str {
        self.descriptor().collection
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.descriptor().singular)
    }
}
