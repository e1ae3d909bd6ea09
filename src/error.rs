use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Candidate box {id:?} has zero area")]
    DegenerateCandidate { id: Option<u64> },

    #[error("Containment threshold must be a finite number, got {value}")]
    InvalidThreshold { value: f64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout classification needs exactly 2 text boxes, got {found}")]
    TextCount { found: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("Malformed RLE counts at byte {position}")]
    MalformedCounts { position: usize },

    #[error("Unsupported segmentation format: {kind}")]
    UnsupportedSegmentation { kind: &'static str },
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read annotation file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse annotation file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse annotation JSON")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("Annotation {annotation_id} has a bbox with {len} values, expected 4")]
    InvalidBbox { annotation_id: u64, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Containment test failed")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Layout classification failed")]
    Layout {
        #[from]
        source: LayoutError,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV report {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
