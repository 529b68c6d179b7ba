//! CLI tool for predicting and fixing slide element style and layout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slides_core::{
    extract_records, fix_position, predict_bold, predict_font_size, predict_font_size_runs,
    predict_italic, predict_left, predict_top, predict_underline, AttrValue, Attribute,
    AttributeRecord, Granularity, Presentation, SelectionContext,
};
use slides_pptx::{looks_like_pptx, PptxParser};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Predict missing style and layout attributes for a slide element from
/// the precedent set by the earlier slides of the same presentation.
#[derive(Parser, Debug)]
#[command(name = "slide-predict")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// 1-based slide number holding the selection
    #[arg(short, long)]
    slide: usize,

    /// 1-based element number within the slide
    #[arg(short, long, default_value = "1")]
    element: usize,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict whether the selection should be bold
    Bold,
    /// Predict whether the selection should be italic
    Italic,
    /// Predict whether the selection should be underlined
    Underline,
    /// Predict the selection's font size
    FontSize,
    /// Predict the selection's font size from per-run training records
    FontSizeRuns,
    /// Predict the selection's distance from the top of the slide
    Top,
    /// Predict the selection's distance from the left edge of the slide
    Left,
    /// Predict top/left and move the element to the predicted left edge
    FixPosition,
    /// Dump the training records extracted from the preceding slides
    Records {
        /// Emit one record per text run instead of one per element
        #[arg(long)]
        runs: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let mut presentation = load_presentation(&args.input)?;

    let slide_index = args
        .slide
        .checked_sub(1)
        .context("--slide is 1-based and must be at least 1")?;
    let element_index = args
        .element
        .checked_sub(1)
        .context("--element is 1-based and must be at least 1")?;

    if let Command::Records { runs } = args.command {
        return dump_records(&presentation, slide_index, runs, args.json);
    }

    let selection = SelectionContext::from_presentation(&presentation, slide_index, element_index)?;

    if let Command::FixPosition = args.command {
        let status = fix_position(&mut presentation, &selection)?;
        if args.json {
            println!("{}", serde_json::json!({ "status": status }));
        } else {
            println!("{}", status);
        }
        return Ok(());
    }

    let (target, prediction) = match args.command {
        Command::Bold => (Attribute::Bold, predict_bold(&presentation, &selection)?),
        Command::Italic => (Attribute::Italic, predict_italic(&presentation, &selection)?),
        Command::Underline => (
            Attribute::Underline,
            predict_underline(&presentation, &selection)?,
        ),
        Command::FontSize => (
            Attribute::FontSize,
            predict_font_size(&presentation, &selection)?,
        ),
        Command::FontSizeRuns => (
            Attribute::FontSize,
            predict_font_size_runs(&presentation, &selection)?,
        ),
        Command::Top => (Attribute::Top, predict_top(&presentation, &selection)?),
        Command::Left => (Attribute::Left, predict_left(&presentation, &selection)?),
        Command::FixPosition | Command::Records { .. } => unreachable!("handled above"),
    };

    print_prediction(target, &prediction, args.json);
    Ok(())
}

/// Open, sniff, and parse a presentation file.
fn load_presentation(input_path: &Path) -> Result<Presentation> {
    let mut file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    // Read magic bytes to detect format
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .with_context(|| "Failed to read file header")?;
    if !looks_like_pptx(&magic) {
        anyhow::bail!(
            "{} does not look like a PPTX file (bad magic bytes)",
            input_path.display()
        );
    }

    // Re-open for parsing
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let parser = PptxParser::new();
    let presentation = parser
        .parse(reader, filename)
        .with_context(|| format!("Failed to parse {}", input_path.display()))?;

    log::debug!(
        "parsed {} with {} slides",
        presentation.filename,
        presentation.slides.len()
    );
    Ok(presentation)
}

fn print_prediction(target: Attribute, prediction: &AttrValue, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "target": target.name(),
                "prediction": prediction,
            })
        );
    } else {
        println!("{}", prediction);
    }
}

fn dump_records(
    presentation: &Presentation,
    before_slide: usize,
    runs: bool,
    json: bool,
) -> Result<()> {
    let granularity = if runs {
        Granularity::Run
    } else {
        Granularity::Element
    };
    let records = extract_records(presentation, before_slide, granularity, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", format_record(record));
        }
        eprintln!("{} records", records.len());
    }
    Ok(())
}

fn format_record(record: &AttributeRecord) -> String {
    Attribute::ALL
        .iter()
        .map(|attr| format!("{}={}", attr, record.get(*attr)))
        .collect::<Vec<_>>()
        .join(" ")
}
