use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use image::DynamicImage;
use ocr_table::{
    ANNOTATED_IMAGE_NAME, ArtifactSink, DEFAULT_MAX_VERTICAL_VARIANCE, Detection, DirectorySink,
    MatchMode, OcrOptions, ScreenOffset, TableConfiguration, TableExtraction, TableReader,
    TesseractCli, TextMatch, WordBox, annotate_table, calibrate_rows, combine_phrases,
    crop_columns, extract_table_from_detections, filter_words, find_matching, parse_tsv,
    write_csv, write_json, write_json_to_string,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ocr-table",
    version,
    about = "Read tables and locate text in screenshots through OCR"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the configured table and write JSON (and optionally CSV).
    Extract(ExtractArgs),
    /// Print the click point of every text matching the search.
    Find(FindArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Screenshot to run OCR on.
    #[arg(long, required_unless_present = "tsv")]
    image: Option<PathBuf>,

    /// Precomputed Tesseract TSV output for the processed image; skips OCR.
    #[arg(long)]
    tsv: Option<PathBuf>,

    /// Tesseract executable.
    #[arg(long, default_value = "tesseract")]
    tesseract: String,

    /// Override the minimum word confidence.
    #[arg(long)]
    confidence: Option<f32>,

    /// Override the zoom factor used for preprocessing.
    #[arg(long)]
    zoom: Option<u32>,

    /// Screen position of the image's top-left corner, as x,y.
    #[arg(long)]
    offset: Option<ScreenOffset>,

    /// Directory for diagnostic images.
    #[arg(long)]
    artifacts: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Table configuration JSON.
    #[arg(short, long)]
    config: PathBuf,

    #[command(flatten)]
    input: InputArgs,

    /// Output JSON path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Additional CSV output path.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Print every warning, not just the count.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct FindArgs {
    /// Text to search for.
    #[arg(short, long)]
    text: String,

    /// OCR options JSON (a table configuration file works too).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    input: InputArgs,

    /// Match records containing the text instead of equal to it.
    #[arg(long)]
    contains: bool,

    /// Compare case-insensitively.
    #[arg(long)]
    ignore_case: bool,

    /// Combine neighbouring words closer than this many pixels into phrases.
    #[arg(long)]
    combine: Option<f32>,
}

fn apply_overrides(mut options: OcrOptions, input: &InputArgs) -> OcrOptions {
    if let Some(confidence) = input.confidence {
        options = options.with_confidence_level(confidence);
    }
    if let Some(zoom) = input.zoom {
        options = options.with_zoom_factor(zoom);
    }
    options
}

fn load_tsv(path: &Path) -> Result<Vec<Detection>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let data = parse_tsv(&text).with_context(|| format!("failed to parse '{}'", path.display()))?;
    Ok(data.detections()?)
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("failed to open '{}'", path.display()))
}

fn open_sink(input: &InputArgs) -> Result<Option<DirectorySink>> {
    input
        .artifacts
        .as_deref()
        .map(|dir| {
            DirectorySink::new(dir)
                .with_context(|| format!("failed to create '{}'", dir.display()))
        })
        .transpose()
}

fn extract_from_tsv(
    tsv: &Path,
    config: &TableConfiguration,
    input: &InputArgs,
    sink: Option<&DirectorySink>,
) -> Result<TableExtraction> {
    let detections = load_tsv(tsv)?;
    let image = input.image.as_deref().map(load_image).transpose()?;
    let image_height = image
        .as_ref()
        .map(|image| i32::try_from(image.height()))
        .transpose()
        .context("image is too tall")?;

    let extraction = extract_table_from_detections(&detections, config, image_height)?;
    if let (Some(sink), Some(image)) = (sink, image.as_ref()) {
        let annotated = annotate_table(image, &extraction, config);
        sink.save_image(ANNOTATED_IMAGE_NAME, &annotated)?;
        for (name, crop) in crop_columns(image, &extraction.columns, config, extraction.table_top) {
            sink.save_image(&name, &crop)?;
        }
    }
    Ok(extraction)
}

fn log_report(extraction: &TableExtraction, verbose: bool) {
    if extraction.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", extraction.warnings.len());
    if verbose {
        for warning in &extraction.warnings {
            eprintln!(
                "  - {:?} row_top={:?} text={:?} count={:?}: {}",
                warning.code, warning.row_top, warning.text, warning.count, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<TableExtraction> {
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let config = TableConfiguration::from_json_file(&args.config)
        .with_context(|| format!("failed to load config '{}'", args.config.display()))?;
    let ocr = apply_overrides(config.ocr.clone(), &args.input);
    let config = config.with_ocr(ocr);
    let sink = open_sink(&args.input)?;

    let mut extraction = if let Some(tsv) = &args.input.tsv {
        extract_from_tsv(tsv, &config, &args.input, sink.as_ref())?
    } else {
        let image = args
            .input
            .image
            .clone()
            .ok_or_else(|| anyhow!("either --image or --tsv is required"))?;
        let engine = TesseractCli::with_program(&args.input.tesseract);
        let mut reader = TableReader::new(&engine);
        if let Some(sink) = &sink {
            reader = reader.with_artifacts(sink);
        }
        reader
            .read_table(image.clone(), &config)
            .with_context(|| format!("failed to read table from '{}'", image.display()))?
    };

    if let Some(offset) = args.input.offset {
        extraction.rows = calibrate_rows(&extraction.rows, offset);
    }

    match &args.output {
        Some(path) => write_json(path, &extraction.rows)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => println!("{}", write_json_to_string(&extraction.rows)?),
    }
    if let Some(path) = &args.csv {
        write_csv(path, &extraction.rows, &extraction.column_names(), args.delimiter as u8)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }
    Ok(extraction)
}

fn texts_from_tsv(tsv: &Path, options: &OcrOptions, combine: Option<f32>) -> Result<Vec<WordBox>> {
    let words = filter_words(&load_tsv(tsv)?, options.confidence_level);
    Ok(match combine {
        Some(distance) => combine_phrases(
            &words,
            distance,
            DEFAULT_MAX_VERTICAL_VARIANCE,
            options.zoom_factor,
        ),
        None => words
            .iter()
            .map(|word| word.scaled_down(options.zoom_factor))
            .collect(),
    })
}

fn run_find(args: &FindArgs) -> Result<Vec<TextMatch>> {
    let options = match &args.config {
        Some(path) => TableConfiguration::from_json_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?
            .ocr,
        None => OcrOptions::default(),
    };
    let options = apply_overrides(options, &args.input);

    let texts = if let Some(tsv) = &args.input.tsv {
        texts_from_tsv(tsv, &options, args.combine)?
    } else {
        let image = args
            .input
            .image
            .clone()
            .ok_or_else(|| anyhow!("either --image or --tsv is required"))?;
        let sink = open_sink(&args.input)?;
        let engine = TesseractCli::with_program(&args.input.tesseract);
        let mut reader = TableReader::new(&engine);
        if let Some(sink) = &sink {
            reader = reader.with_artifacts(sink);
        }
        reader
            .find_texts(image.clone(), &options, args.combine)
            .with_context(|| format!("failed to read text from '{}'", image.display()))?
            .0
    };

    let mode = if args.contains {
        MatchMode::Substring
    } else {
        MatchMode::Exact
    };
    Ok(find_matching(
        &texts,
        &args.text,
        mode,
        !args.ignore_case,
        args.input.offset.unwrap_or_default(),
    ))
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ocr_table=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(extraction) => {
                log_report(&extraction, args.verbose);
                if extraction.rows.is_empty() {
                    ExitCode::from(2)
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Find(args) => match run_find(&args) {
            Ok(matches) if matches.is_empty() => {
                eprintln!("no text matching '{}'", args.text);
                ExitCode::from(2)
            }
            Ok(matches) => {
                for found in &matches {
                    println!("{}\t{}", found.point, found.text);
                }
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
