use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::instrument;

use crate::{error::DatasetError, mask::Segmentation, util::manga_title, AnnotatedBox, ObjectKind};

#[derive(Debug, Deserialize)]
struct CocoFile {
    images: Vec<ImageInfo>,
    annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    categories: Vec<CocoCategory>,
}

#[derive(Debug, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CocoAnnotation {
    id: u64,
    image_id: u64,
    category_id: u64,
    bbox: Vec<f64>,
    #[serde(default)]
    segmentation: Option<Segmentation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageInfo {
    pub id: u64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn manga_title(&self) -> &str {
        manga_title(&self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub image: ImageInfo,
    pub boxes: Vec<AnnotatedBox>,
}

impl Page {
    pub fn boxes_of<'a>(&'a self, kind: &'a ObjectKind) -> impl Iterator<Item = &'a AnnotatedBox> {
        self.boxes.iter().filter(move |it| &it.kind == kind)
    }

    pub fn frames(&self) -> impl Iterator<Item = &AnnotatedBox> {
        self.boxes.iter().filter(|it| it.kind.is_frame())
    }

    pub fn non_frames(&self) -> impl Iterator<Item = &AnnotatedBox> {
        self.boxes.iter().filter(|it| !it.kind.is_frame())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub pages: Vec<Page>,
}

impl Dataset {
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let file: CocoFile = serde_json::from_str(json)?;
        Ok(Self {
            pages: build_pages(file)?,
        })
    }

    #[instrument(level = "debug")]
    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        let json = fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CocoFile =
            serde_json::from_str(&json).map_err(|source| DatasetError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let pages = build_pages(file)?;
        log::debug!("Loaded {} pages from {path:?}", pages.len());
        Ok(Self { pages })
    }

    #[instrument(skip_all, fields(files = paths.len()))]
    pub fn open_all(paths: &[PathBuf]) -> Result<Self, DatasetError> {
        let mut dataset = Self::default();
        for path in paths {
            dataset.pages.extend(Self::open(path)?.pages);
        }
        Ok(dataset)
    }
}

/// Expands the inputs into annotation files: directories contribute their
/// `*.json` entries, plain files are taken as they are. Sorted by path.
pub fn collect_annotation_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DatasetError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let entries = fs::read_dir(input).map_err(|source| DatasetError::Read {
            path: input.clone(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| DatasetError::Read {
                    path: input.clone(),
                    source,
                })?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn build_pages(file: CocoFile) -> Result<Vec<Page>, DatasetError> {
    let kinds: HashMap<u64, ObjectKind> = file
        .categories
        .iter()
        .map(|cat| (cat.id, ObjectKind::from_category_name(&cat.name)))
        .collect();

    let mut pages: Vec<Page> = file
        .images
        .into_iter()
        .map(|image| Page {
            image,
            boxes: Vec::new(),
        })
        .collect();
    let page_index: HashMap<u64, usize> = pages
        .iter()
        .enumerate()
        .map(|(index, page)| (page.image.id, index))
        .collect();

    for annotation in file.annotations {
        let Some(&index) = page_index.get(&annotation.image_id) else {
            log::warn!(
                "Annotation {} references unknown image {}, skipping",
                annotation.id,
                annotation.image_id
            );
            continue;
        };
        let &[x, y, width, height] = annotation.bbox.as_slice() else {
            return Err(DatasetError::InvalidBbox {
                annotation_id: annotation.id,
                len: annotation.bbox.len(),
            });
        };
        let kind = kinds
            .get(&annotation.category_id)
            .cloned()
            .unwrap_or_else(|| ObjectKind::Other(format!("category_{}", annotation.category_id)));

        pages[index].boxes.push(
            AnnotatedBox::from_xywh(annotation.id, kind, x, y, width, height)
                .with_segmentation(annotation.segmentation),
        );
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "images": [
            {"id": 1, "file_name": "ARMS/000.jpg", "width": 100, "height": 200},
            {"id": 2, "file_name": "ARMS/001.jpg", "width": 100, "height": 200}
        ],
        "categories": [
            {"id": 1, "name": "frame"},
            {"id": 2, "name": "balloon"},
            {"id": 7, "name": "face"}
        ],
        "annotations": [
            {"id": 10, "image_id": 1, "category_id": 1, "bbox": [0, 0, 100, 100]},
            {"id": 11, "image_id": 1, "category_id": 2, "bbox": [10, 10, 20, 20],
             "segmentation": {"size": [200, 100], "counts": "53l2"}},
            {"id": 12, "image_id": 2, "category_id": 7, "bbox": [5, 5, 10, 10]},
            {"id": 13, "image_id": 9, "category_id": 7, "bbox": [5, 5, 10, 10]},
            {"id": 14, "image_id": 2, "category_id": 3, "bbox": [0, 0, 1, 1]}
        ]
    }"#;

    #[test]
    fn annotations_are_grouped_by_image() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.pages.len(), 2);

        let first = &dataset.pages[0];
        assert_eq!(first.image.manga_title(), "ARMS");
        assert_eq!(first.frames().count(), 1);
        assert_eq!(first.boxes_of(&ObjectKind::Text).count(), 1);
        assert!(first.boxes[1].segmentation.is_some());
        assert_eq!(first.boxes[1].rect.max().x, 30.0);

        let second = &dataset.pages[1];
        assert_eq!(second.boxes.len(), 2);
        assert_eq!(second.boxes[0].kind, ObjectKind::Face);
        assert_eq!(second.boxes[1].kind, ObjectKind::Other("category_3".to_string()));
        assert_eq!(second.non_frames().count(), 2);
    }

    #[test]
    fn short_bbox_is_rejected() {
        let json = r#"{
            "images": [{"id": 1, "file_name": "a.jpg", "width": 1, "height": 1}],
            "annotations": [{"id": 5, "image_id": 1, "category_id": 1, "bbox": [0, 0, 1]}]
        }"#;
        assert!(matches!(
            Dataset::from_json_str(json),
            Err(DatasetError::InvalidBbox {
                annotation_id: 5,
                len: 3
            })
        ));
    }
}
