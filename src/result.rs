use std::fmt;

use geo::{coord, Rect};

use crate::mask::Segmentation;

pub trait Bounded {
    fn rect(&self) -> Rect<f64>;

    /// Opaque identifier carried through for diagnostics.
    fn box_id(&self) -> Option<u64> {
        None
    }
}

impl Bounded for Rect<f64> {
    fn rect(&self) -> Rect<f64> {
        *self
    }
}

impl<T: Bounded + ?Sized> Bounded for &T {
    fn rect(&self) -> Rect<f64> {
        (**self).rect()
    }

    fn box_id(&self) -> Option<u64> {
        (**self).box_id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Frame,
    Text,
    Face,
    Body,
    Onomatopoeia,
    Other(String),
}

impl ObjectKind {
    /// Balloon and speech categories count as text, matching how the
    /// segmentation export names its text regions.
    pub fn from_category_name(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            "frame" => Self::Frame,
            "text" => Self::Text,
            "face" => Self::Face,
            "body" => Self::Body,
            "onomatopoeia" => Self::Onomatopoeia,
            _ if lower.contains("balloon") || lower.contains("speech") => Self::Text,
            _ => Self::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Frame => "frame",
            Self::Text => "text",
            Self::Face => "face",
            Self::Body => "body",
            Self::Onomatopoeia => "onomatopoeia",
            Self::Other(name) => name,
        }
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Self::Frame)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBox {
    pub id: u64,
    pub kind: ObjectKind,
    pub rect: Rect<f64>,
    pub segmentation: Option<Segmentation>,
}

impl AnnotatedBox {
    /// Builds a box from corner coordinates. Swapped corners are normalized.
    pub fn new(id: u64, kind: ObjectKind, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            id,
            kind,
            rect: Rect::new(coord! { x: xmin, y: ymin }, coord! { x: xmax, y: ymax }),
            segmentation: None,
        }
    }

    pub fn from_xywh(id: u64, kind: ObjectKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(id, kind, x, y, x + width, y + height)
    }

    pub fn with_segmentation(mut self, segmentation: Option<Segmentation>) -> Self {
        self.segmentation = segmentation;
        self
    }

    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

impl Bounded for AnnotatedBox {
    fn rect(&self) -> Rect<f64> {
        self.rect
    }

    fn box_id(&self) -> Option<u64> {
        Some(self.id)
    }
}
