use std::collections::BTreeMap;

use serde::Serialize;
use tracing::instrument;

use crate::{
    containment::boxes_inside_frame,
    dataset::Page,
    error::AnalysisError,
    layout::{classify_layout, Layout},
    stats::{histogram, Summary},
    AnnotatedBox, ObjectKind, PanelOptions,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub image_id: u64,
    pub file_name: String,
    pub frame_id: u64,
    pub text_count: usize,
    pub face_count: usize,
    pub object_count: usize,
    /// Set only for frames holding exactly two texts and one face.
    pub layout: Option<Layout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelReport {
    pub frames: Vec<FrameRecord>,
    pub two_text_one_face: usize,
    pub layouts: BTreeMap<Layout, usize>,
    pub text_histogram: BTreeMap<usize, usize>,
    pub object_histogram: BTreeMap<usize, usize>,
    pub text_per_frame: Option<Summary>,
    pub objects_per_frame: Option<Summary>,
}

impl PanelReport {
    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn two_text_one_face_percent(&self) -> Option<f64> {
        let total = self.total_frames();
        (total > 0).then(|| self.two_text_one_face as f64 / total as f64 * 100.0)
    }
}

#[instrument(skip_all, fields(pages = pages.len()))]
pub fn analyze_panels(
    pages: &[Page],
    options: &PanelOptions,
) -> Result<PanelReport, AnalysisError> {
    let mut frames = Vec::new();
    let mut layouts = BTreeMap::new();
    let mut two_text_one_face = 0;

    for page in pages {
        let texts: Vec<&AnnotatedBox> = page.boxes_of(&ObjectKind::Text).collect();
        let faces: Vec<&AnnotatedBox> = page.boxes_of(&ObjectKind::Face).collect();
        let objects: Vec<&AnnotatedBox> = page.non_frames().collect();

        for frame in page.frames() {
            let texts_inside = boxes_inside_frame(frame, &texts, &options.containment)?;
            let faces_inside = boxes_inside_frame(frame, &faces, &options.containment)?;
            let objects_inside = boxes_inside_frame(frame, &objects, &options.containment)?;

            if objects_inside.len() >= options.crowded_frame_threshold {
                log::warn!(
                    "Frame {} on {} holds {} objects",
                    frame.id,
                    page.image.file_name,
                    objects_inside.len()
                );
            }

            let layout = match (texts_inside.as_slice(), faces_inside.as_slice()) {
                ([_, _], [face]) => {
                    two_text_one_face += 1;
                    let layout = classify_layout(face, &texts_inside)?;
                    *layouts.entry(layout).or_insert(0) += 1;
                    Some(layout)
                }
                _ => None,
            };

            frames.push(FrameRecord {
                image_id: page.image.id,
                file_name: page.image.file_name.clone(),
                frame_id: frame.id,
                text_count: texts_inside.len(),
                face_count: faces_inside.len(),
                object_count: objects_inside.len(),
                layout,
            });
        }
    }

    let text_counts: Vec<usize> = frames.iter().map(|it| it.text_count).collect();
    let object_counts: Vec<usize> = frames.iter().map(|it| it.object_count).collect();
    log::debug!(
        "{} frames, {two_text_one_face} with two texts and one face",
        frames.len()
    );

    Ok(PanelReport {
        text_histogram: histogram(text_counts.iter().copied()),
        object_histogram: histogram(object_counts.iter().copied()),
        text_per_frame: Summary::from_counts(&text_counts),
        objects_per_frame: Summary::from_counts(&object_counts),
        frames,
        two_text_one_face,
        layouts,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageCountRow {
    pub image_id: u64,
    pub file_name: String,
    pub manga_title: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleCount {
    pub manga_title: String,
    pub images: usize,
    pub mean_count: f64,
}

const TOP_TITLES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectReport {
    pub kind: ObjectKind,
    pub total_annotations: usize,
    pub total_images: usize,
    pub images_with_objects: usize,
    /// Over images holding at least one annotation of this kind.
    pub count_per_image: Option<Summary>,
    pub count_histogram: BTreeMap<usize, usize>,
    /// Titles with the most images holding this kind, at most ten.
    pub top_titles: Vec<TitleCount>,
    pub segmentation_ratio: Option<Summary>,
    pub segmentation_area: Option<Summary>,
    pub segmentation_failures: usize,
    pub bbox_ratio: Option<Summary>,
    pub width_ratio: Option<Summary>,
    pub height_ratio: Option<Summary>,
    pub bbox_area: Option<Summary>,
    pub rows: Vec<ImageCountRow>,
}

impl ObjectReport {
    pub fn images_without_objects(&self) -> usize {
        self.total_images - self.images_with_objects
    }
}

#[instrument(skip(pages), fields(pages = pages.len()))]
pub fn analyze_objects(pages: &[Page], kind: &ObjectKind) -> ObjectReport {
    let mut rows = Vec::with_capacity(pages.len());
    let mut segmentation_ratios = Vec::new();
    let mut segmentation_areas = Vec::new();
    let mut segmentation_failures = 0;
    let mut bbox_ratios = Vec::new();
    let mut width_ratios = Vec::new();
    let mut height_ratios = Vec::new();
    let mut bbox_areas = Vec::new();

    for page in pages {
        let image = &page.image;
        let image_area = image.area();
        let mut count = 0;

        for object in page.boxes_of(kind) {
            count += 1;
            bbox_areas.push(object.area());

            if image_area <= 0.0 {
                log::warn!("Image {} has zero area, skipping ratios", image.file_name);
                continue;
            }
            bbox_ratios.push(object.area() / image_area);
            width_ratios.push(object.width() / image.width as f64);
            height_ratios.push(object.height() / image.height as f64);

            if let Some(segmentation) = &object.segmentation {
                match segmentation.area() {
                    Ok(area) => {
                        segmentation_areas.push(area as f64);
                        segmentation_ratios.push(area as f64 / image_area);
                    }
                    Err(err) => {
                        segmentation_failures += 1;
                        log::warn!(
                            "Failed to decode segmentation of annotation {} on {}: {err}",
                            object.id,
                            image.file_name
                        );
                    }
                }
            }
        }

        rows.push(ImageCountRow {
            image_id: image.id,
            file_name: image.file_name.clone(),
            manga_title: image.manga_title().to_string(),
            count,
        });
    }

    rows.sort_by(|a, b| {
        (a.manga_title.as_str(), a.file_name.as_str())
            .cmp(&(b.manga_title.as_str(), b.file_name.as_str()))
    });

    let counts: Vec<usize> = rows
        .iter()
        .map(|row| row.count)
        .filter(|&count| count > 0)
        .collect();
    log::debug!(
        "{kind}: {} annotations on {} of {} images",
        counts.iter().sum::<usize>(),
        counts.len(),
        rows.len()
    );

    ObjectReport {
        kind: kind.clone(),
        total_annotations: counts.iter().sum(),
        total_images: rows.len(),
        images_with_objects: counts.len(),
        count_per_image: Summary::from_counts(&counts),
        count_histogram: histogram(counts.iter().copied()),
        top_titles: rank_titles(&rows, TOP_TITLES),
        segmentation_ratio: Summary::from_values(&segmentation_ratios),
        segmentation_area: Summary::from_values(&segmentation_areas),
        segmentation_failures,
        bbox_ratio: Summary::from_values(&bbox_ratios),
        width_ratio: Summary::from_values(&width_ratios),
        height_ratio: Summary::from_values(&height_ratios),
        bbox_area: Summary::from_values(&bbox_areas),
        rows,
    }
}

/// Orders titles by how many of their images hold at least one object,
/// ties broken by title.
fn rank_titles(rows: &[ImageCountRow], limit: usize) -> Vec<TitleCount> {
    let mut per_title: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.count > 0) {
        let (images, objects) = per_title.entry(row.manga_title.as_str()).or_default();
        *images += 1;
        *objects += row.count;
    }

    let mut titles: Vec<TitleCount> = per_title
        .into_iter()
        .map(|(title, (images, objects))| TitleCount {
            manga_title: title.to_string(),
            images,
            mean_count: objects as f64 / images as f64,
        })
        .collect();
    titles.sort_by(|a, b| b.images.cmp(&a.images));
    titles.truncate(limit);
    titles
}
