use std::fmt;

use crate::{error::LayoutError, util::center_x, Bounded};

/// Labels read left to right across the panel, `t` for text and `c` for the
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layout {
    Flanked,
    TextsLeft,
    TextsRight,
    /// Both balloon centers coincide with the face center.
    Unknown,
}

impl Layout {
    pub const ALL: [Layout; 4] = [
        Layout::Flanked,
        Layout::TextsLeft,
        Layout::TextsRight,
        Layout::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Flanked => "tct",
            Layout::TextsLeft => "ttc",
            Layout::TextsRight => "ctt",
            Layout::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only horizontal centers are compared.
pub fn classify_layout<F: Bounded, T: Bounded>(
    face: &F,
    texts: &[T],
) -> Result<Layout, LayoutError> {
    let [first, second] = texts else {
        return Err(LayoutError::TextCount { found: texts.len() });
    };

    let face_center = center_x(&face.rect());
    let first_center = center_x(&first.rect());
    let second_center = center_x(&second.rect());

    let text_left = first_center.min(second_center) < face_center;
    let text_right = first_center.max(second_center) > face_center;

    Ok(match (text_left, text_right) {
        (true, true) => Layout::Flanked,
        (true, false) => Layout::TextsLeft,
        (false, true) => Layout::TextsRight,
        (false, false) => Layout::Unknown,
    })
}
