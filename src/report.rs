use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::instrument;

use crate::{
    analysis::{ObjectReport, PanelReport},
    error::ReportError,
    layout::Layout,
    stats::Summary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Counts,
    /// Counts with the n - 1 deviation and the variance.
    SampleCounts,
    Ratios,
    Pixels,
}

fn sample_value(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |value| format!("{value:.6}"))
}

fn write_summary(
    out: &mut impl Write,
    heading: &str,
    summary: &Summary,
    precision: Precision,
) -> std::io::Result<()> {
    writeln!(out, "{heading}:")?;
    match precision {
        Precision::Counts => {
            writeln!(out, "Mean: {:.6}", summary.mean)?;
            writeln!(out, "Median: {:.6}", summary.median)?;
            writeln!(out, "Standard deviation: {:.6}", summary.std_dev)?;
            writeln!(out, "Mode: {}", summary.mode)?;
            writeln!(out, "Min: {}", summary.min)?;
            writeln!(out, "Max: {}", summary.max)?;
            writeln!(out, "25th percentile: {:.2}", summary.p25)?;
            writeln!(out, "75th percentile: {:.2}", summary.p75)?;
        }
        Precision::SampleCounts => {
            writeln!(out, "Mean: {:.6}", summary.mean)?;
            writeln!(out, "Median: {:.6}", summary.median)?;
            writeln!(
                out,
                "Standard deviation: {}",
                sample_value(summary.sample_std_dev)
            )?;
            writeln!(out, "Variance: {}", sample_value(summary.variance))?;
            writeln!(out, "Mode: {}", summary.mode)?;
            writeln!(out, "Min: {}", summary.min)?;
            writeln!(out, "Max: {}", summary.max)?;
            writeln!(out, "25th percentile: {:.2}", summary.p25)?;
            writeln!(out, "75th percentile: {:.2}", summary.p75)?;
        }
        Precision::Ratios => {
            writeln!(out, "Mean: {:.6}", summary.mean)?;
            writeln!(out, "Median: {:.6}", summary.median)?;
            writeln!(out, "Standard deviation: {:.6}", summary.std_dev)?;
            writeln!(out, "Min: {:.6}", summary.min)?;
            writeln!(out, "Max: {:.6}", summary.max)?;
            writeln!(out, "25th percentile: {:.6}", summary.p25)?;
            writeln!(out, "75th percentile: {:.6}", summary.p75)?;
        }
        Precision::Pixels => {
            writeln!(out, "Mean: {:.2}", summary.mean)?;
            writeln!(out, "Median: {:.2}", summary.median)?;
            writeln!(out, "Standard deviation: {:.2}", summary.std_dev)?;
            writeln!(out, "Min: {:.2}", summary.min)?;
            writeln!(out, "Max: {:.2}", summary.max)?;
        }
    }
    writeln!(out)
}

fn write_optional(
    out: &mut impl Write,
    heading: &str,
    summary: &Option<Summary>,
    precision: Precision,
) -> std::io::Result<()> {
    match summary {
        Some(summary) => write_summary(out, heading, summary, precision),
        None => Ok(()),
    }
}

pub fn render_object_report(out: &mut impl Write, report: &ObjectReport) -> std::io::Result<()> {
    let title = report.kind.as_str();
    writeln!(out, "{} Statistics", capitalize(title))?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "Total {title} annotations: {}", report.total_annotations)?;
    writeln!(out, "Total images analyzed: {}", report.total_images)?;
    writeln!(out, "Images with {title}: {}", report.images_with_objects)?;
    writeln!(
        out,
        "Images without {title}: {}",
        report.images_without_objects()
    )?;
    if report.segmentation_failures > 0 {
        writeln!(
            out,
            "Undecodable segmentations: {}",
            report.segmentation_failures
        )?;
    }
    writeln!(out)?;

    write_optional(
        out,
        &format!("Count per Image Statistics (Images with {title} Only)"),
        &report.count_per_image,
        Precision::Counts,
    )?;
    write_count_distribution(out, report)?;
    write_top_titles(out, report)?;
    write_optional(
        out,
        "Size Ratio Statistics (Segmentation-based)",
        &report.segmentation_ratio,
        Precision::Ratios,
    )?;
    write_optional(
        out,
        "Bounding Box Size Ratio Statistics",
        &report.bbox_ratio,
        Precision::Ratios,
    )?;
    write_optional(
        out,
        "Bounding Box Width Ratio Statistics",
        &report.width_ratio,
        Precision::Ratios,
    )?;
    write_optional(
        out,
        "Bounding Box Height Ratio Statistics",
        &report.height_ratio,
        Precision::Ratios,
    )?;
    write_optional(
        out,
        "Area Statistics (pixels)",
        &report.segmentation_area,
        Precision::Pixels,
    )?;
    write_optional(
        out,
        "Bounding Box Area Statistics (pixels)",
        &report.bbox_area,
        Precision::Pixels,
    )
}

fn write_count_distribution(out: &mut impl Write, report: &ObjectReport) -> std::io::Result<()> {
    if report.count_histogram.is_empty() {
        return Ok(());
    }
    let title = report.kind.as_str();
    writeln!(out, "Distribution by {} Count:", capitalize(title))?;
    for (count, images) in &report.count_histogram {
        let percent = *images as f64 / report.images_with_objects as f64 * 100.0;
        writeln!(out, "{count}: {images} images ({percent:.1}%)")?;
    }
    writeln!(out)
}

fn write_top_titles(out: &mut impl Write, report: &ObjectReport) -> std::io::Result<()> {
    if report.top_titles.is_empty() {
        return Ok(());
    }
    writeln!(out, "Top 10 Manga Titles by Image Count:")?;
    for (rank, title) in report.top_titles.iter().enumerate() {
        writeln!(
            out,
            "{:2}. {}: {} images, avg {:.2} {}",
            rank + 1,
            title.manga_title,
            title.images,
            title.mean_count,
            report.kind
        )?;
    }
    writeln!(out)
}

pub fn render_panel_report(out: &mut impl Write, report: &PanelReport) -> std::io::Result<()> {
    writeln!(out, "Panel Statistics")?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "Total frames: {}", report.total_frames())?;
    writeln!(
        out,
        "Frames with two texts and one face: {}",
        report.two_text_one_face
    )?;
    if let Some(percent) = report.two_text_one_face_percent() {
        writeln!(out, "Share of all frames: {percent:.2}%")?;
    }
    writeln!(out)?;

    writeln!(out, "Face/Text Layout (t=text, c=character):")?;
    for layout in Layout::ALL {
        let count = report.layouts.get(&layout).copied().unwrap_or(0);
        writeln!(out, "{layout}: {count}")?;
    }
    writeln!(out)?;

    write_optional(
        out,
        "Texts per Frame Statistics",
        &report.text_per_frame,
        Precision::SampleCounts,
    )?;
    writeln!(out, "Texts per Frame Distribution:")?;
    for (texts, frames) in &report.text_histogram {
        writeln!(out, "{texts}: {frames}")?;
    }
    writeln!(out)?;

    write_optional(
        out,
        "Objects per Frame Statistics",
        &report.objects_per_frame,
        Precision::SampleCounts,
    )?;
    writeln!(out, "Objects per Frame Distribution:")?;
    for (objects, frames) in &report.object_histogram {
        writeln!(out, "{objects}: {frames}")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct FrameRow<'a> {
    image_id: u64,
    file_name: &'a str,
    frame_id: u64,
    text_count: usize,
    face_count: usize,
    object_count: usize,
    layout: &'a str,
}

#[instrument(skip(report), fields(kind = %report.kind))]
pub fn write_object_report(dir: &Path, report: &ObjectReport) -> Result<PathBuf, ReportError> {
    let path = dir.join(format!("{}_statistics.txt", file_stem(report.kind.as_str())));
    write_text(&path, |out| render_object_report(out, report))?;
    Ok(path)
}

#[instrument(skip(report), fields(kind = %report.kind))]
pub fn write_object_csv(dir: &Path, report: &ObjectReport) -> Result<PathBuf, ReportError> {
    let path = dir.join(format!(
        "{}_count_per_image.csv",
        file_stem(report.kind.as_str())
    ));
    let csv_error = |source| ReportError::Csv {
        path: path.clone(),
        source,
    };
    let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;
    for row in &report.rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    log::debug!("Wrote {} rows to {path:?}", report.rows.len());
    Ok(path)
}

#[instrument(skip(report))]
pub fn write_panel_report(
    dir: &Path,
    report: &PanelReport,
) -> Result<Vec<PathBuf>, ReportError> {
    let text_path = dir.join("panel_statistics.txt");
    write_text(&text_path, |out| render_panel_report(out, report))?;

    let csv_path = dir.join("panel_frames.csv");
    let csv_error = |source| ReportError::Csv {
        path: csv_path.clone(),
        source,
    };
    let mut writer = csv::Writer::from_path(&csv_path).map_err(csv_error)?;
    for frame in &report.frames {
        writer
            .serialize(FrameRow {
                image_id: frame.image_id,
                file_name: &frame.file_name,
                frame_id: frame.frame_id,
                text_count: frame.text_count,
                face_count: frame.face_count,
                object_count: frame.object_count,
                layout: frame.layout.map(|it| it.as_str()).unwrap_or(""),
            })
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: csv_path.clone(),
        source,
    })?;

    Ok(vec![text_path, csv_path])
}

fn write_text(
    path: &Path,
    render: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), ReportError> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_error)?);
    render(&mut out).map_err(io_error)?;
    out.flush().map_err(io_error)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Category names can be arbitrary, keep file names tame.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
