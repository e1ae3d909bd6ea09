use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use panelstat::{
    dataset::collect_annotation_files, AnalyzerBuilder, Dataset, DegeneratePolicy, ObjectKind,
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Panel layout statistics over manga page annotations")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count texts, faces and objects inside every frame and classify face/text layouts
    Panels {
        /// Annotation JSON files or directories holding them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Minimum fraction of an object's area inside a frame
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,

        /// Handling of zero-area objects
        #[arg(long, value_enum, default_value_t = DegenerateArg::ByPosition)]
        degenerate: DegenerateArg,

        /// Log frames holding at least this many objects
        #[arg(long, default_value_t = 10)]
        crowded: usize,

        /// Directory the reports are written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Count and size statistics for one annotation category
    Objects {
        /// Annotation JSON files or directories holding them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long, value_enum)]
        kind: KindArg,

        /// Directory the reports are written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DegenerateArg {
    ByPosition,
    Reject,
}

impl From<DegenerateArg> for DegeneratePolicy {
    fn from(arg: DegenerateArg) -> Self {
        match arg {
            DegenerateArg::ByPosition => DegeneratePolicy::ByPosition,
            DegenerateArg::Reject => DegeneratePolicy::Reject,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Frame,
    Text,
    Face,
    Body,
    Onomatopoeia,
}

impl From<KindArg> for ObjectKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Frame => ObjectKind::Frame,
            KindArg::Text => ObjectKind::Text,
            KindArg::Face => ObjectKind::Face,
            KindArg::Body => ObjectKind::Body,
            KindArg::Onomatopoeia => ObjectKind::Onomatopoeia,
        }
    }
}

fn load(inputs: &[PathBuf]) -> anyhow::Result<Dataset> {
    let files = collect_annotation_files(inputs).context("Failed to list annotation files")?;
    if files.is_empty() {
        anyhow::bail!("No annotation JSON files found in {inputs:?}");
    }
    println!("Found {} annotation files", files.len());
    Dataset::open_all(&files).context("Failed to load annotations")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let start = Instant::now();

    match args.command {
        Command::Panels {
            inputs,
            threshold,
            degenerate,
            crowded,
            output,
        } => {
            let analyzer = AnalyzerBuilder::new()
                .threshold(threshold)
                .degenerate_policy(degenerate.into())
                .crowded_frame_threshold(crowded)
                .output_dir(output)
                .build()
                .context("Invalid analyzer configuration")?;
            let dataset = load(&inputs)?;
            let report = analyzer
                .panels(&dataset)
                .context("Panel analysis failed")?;

            println!("Frames analyzed: {}", report.total_frames());
            if let Some(percent) = report.two_text_one_face_percent() {
                println!("Frames with two texts and one face: {percent:.2}%");
            }
            for (layout, count) in &report.layouts {
                println!("  {layout}: {count}");
            }
            for path in analyzer.write_panels(&report)? {
                println!("Wrote {}", path.display());
            }
        }
        Command::Objects {
            inputs,
            kind,
            output,
        } => {
            let analyzer = AnalyzerBuilder::new()
                .output_dir(output)
                .build()
                .context("Invalid analyzer configuration")?;
            let dataset = load(&inputs)?;
            let kind = ObjectKind::from(kind);
            let report = analyzer.objects(&dataset, &kind);

            println!("Total {kind} annotations: {}", report.total_annotations);
            println!(
                "Images with {kind}: {} of {}",
                report.images_with_objects, report.total_images
            );
            for path in analyzer.write_objects(&report)? {
                println!("Wrote {}", path.display());
            }
        }
    }

    log::debug!("{:?}", start.elapsed());
    Ok(())
}
