use serde::Deserialize;

use crate::error::MaskError;

/// Uncompressed RLE: alternating background/foreground run lengths over the
/// column-major pixel order, starting with background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rle {
    pub height: u32,
    pub width: u32,
    pub counts: Vec<u32>,
}

impl Rle {
    /// Each run is packed in 5-bit groups offset by 48, with `0x20` marking a
    /// continuation and `0x10` of the last group acting as the sign bit. From
    /// the fourth run on, values are deltas against the run two places back.
    pub fn from_compressed(counts: &str, height: u32, width: u32) -> Result<Self, MaskError> {
        let bytes = counts.as_bytes();
        let mut runs: Vec<u32> = Vec::new();
        let mut position = 0;

        while position < bytes.len() {
            let start = position;
            let mut value: i64 = 0;
            let mut shift = 0;
            loop {
                let Some(&byte) = bytes.get(position) else {
                    return Err(MaskError::MalformedCounts { position: start });
                };
                let group = byte
                    .checked_sub(48)
                    .ok_or(MaskError::MalformedCounts { position })?
                    as i64;
                if shift >= 60 {
                    return Err(MaskError::MalformedCounts { position });
                }
                value |= (group & 0x1f) << shift;
                shift += 5;
                position += 1;
                if group & 0x20 == 0 {
                    if group & 0x10 != 0 {
                        value |= -1i64 << shift;
                    }
                    break;
                }
            }

            if runs.len() > 2 {
                value += runs[runs.len() - 2] as i64;
            }
            let run =
                u32::try_from(value).map_err(|_| MaskError::MalformedCounts { position: start })?;
            runs.push(run);
        }

        Ok(Self {
            height,
            width,
            counts: runs,
        })
    }

    pub fn to_compressed(&self) -> String {
        let mut encoded = String::new();
        for (index, &run) in self.counts.iter().enumerate() {
            let mut value = run as i64;
            if index > 2 {
                value -= self.counts[index - 2] as i64;
            }
            loop {
                let mut group = (value & 0x1f) as u8;
                value >>= 5;
                let more = if group & 0x10 != 0 {
                    value != -1
                } else {
                    value != 0
                };
                if more {
                    group |= 0x20;
                }
                encoded.push((group + 48) as char);
                if !more {
                    break;
                }
            }
        }
        encoded
    }

    pub fn area(&self) -> u64 {
        self.counts
            .iter()
            .skip(1)
            .step_by(2)
            .map(|&run| run as u64)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RleCounts {
    Compressed(String),
    Raw(Vec<u32>),
}

/// RLE object as stored in annotation JSON, `size` is `[height, width]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RleObject {
    pub size: [u32; 2],
    pub counts: RleCounts,
}

impl RleObject {
    pub fn to_rle(&self) -> Result<Rle, MaskError> {
        let [height, width] = self.size;
        match &self.counts {
            RleCounts::Compressed(counts) => Rle::from_compressed(counts, height, width),
            RleCounts::Raw(counts) => Ok(Rle {
                height,
                width,
                counts: counts.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    Rle(RleObject),
    Polygons(Vec<Vec<f64>>),
    Other(serde_json::Value),
}

impl Segmentation {
    pub fn to_rle(&self) -> Result<Rle, MaskError> {
        match self {
            Segmentation::Rle(rle) => rle.to_rle(),
            Segmentation::Polygons(_) => {
                Err(MaskError::UnsupportedSegmentation { kind: "polygon" })
            }
            Segmentation::Other(_) => Err(MaskError::UnsupportedSegmentation { kind: "unknown" }),
        }
    }

    pub fn area(&self) -> Result<u64, MaskError> {
        Ok(self.to_rle()?.area())
    }
}
