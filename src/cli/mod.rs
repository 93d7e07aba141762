//! # CLI Module
//!
//! Command-line interface for the censoring pipeline.
//!
//! ## Usage
//! ```bash
//! # Censor a folder into ../CENSORED
//! photo-censor run ~/Shoots/beach --detector-cmd nudenet-detect
//!
//! # Censor, then brand every result into ../WATERMARK_DEMO
//! photo-censor run ~/Shoots/beach --detector-cmd nudenet-detect --watermark MIDNIGHT
//!
//! # Work on every third photo only
//! photo-censor run ~/Shoots/beach --detector-cmd nudenet-detect --sample-every 3
//!
//! # JSON output
//! photo-censor run ~/Shoots/beach --detector-cmd nudenet-detect --output json
//!
//! # List configured brands
//! photo-censor brands
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_censor::core::batch::{default_workers, BatchSummary};
use photo_censor::core::censor::{DEFAULT_CIRCLE_SCALE, DEFAULT_KERNEL_SIZE, DEFAULT_PADDING};
use photo_censor::core::detector::{CommandDetector, Detector, DEFAULT_LABELS};
use photo_censor::core::optimize::{DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY};
use photo_censor::core::pipeline::{Pipeline, PipelineResult, SamplingConfig, DEFAULT_SAMPLE_DIR};
use photo_censor::core::watermark::{parse_brand, BrandRegistry, DEFAULT_OPACITY};
use photo_censor::error::Result;
use photo_censor::events::{BatchEvent, Event, EventChannel, PipelineEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Censor - blur sensitive regions across whole folders
#[derive(Parser, Debug)]
#[command(name = "photo-censor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Censor a folder, optionally watermarking the results
    Run(RunArgs),

    /// List the watermark brands that are configured
    Brands {
        /// Brand file (defaults to the per-user brands.json)
        #[arg(long)]
        brands: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Folder of photos to process
    input: PathBuf,

    /// Detector labels to censor (repeatable; defaults to the exposed-body labels)
    #[arg(short, long = "label")]
    labels: Vec<String>,

    /// Blur kernel size in pixels (even values are rounded up)
    #[arg(long, default_value_t = DEFAULT_KERNEL_SIZE)]
    kernel: u32,

    /// Padding around each detection in pixels
    #[arg(long, default_value_t = DEFAULT_PADDING)]
    padding: u32,

    /// Blur circle radius multiplier
    #[arg(long, default_value_t = DEFAULT_CIRCLE_SCALE)]
    circle_scale: f32,

    /// Watermark brand ("none" to skip the watermark stage)
    #[arg(short, long)]
    watermark: Option<String>,

    /// Brand file (defaults to the per-user brands.json)
    #[arg(long)]
    brands: Option<PathBuf>,

    /// Maximum width of watermarked output
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH)]
    max_width: u32,

    /// Maximum height of watermarked output
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT)]
    max_height: u32,

    /// JPEG quality of watermarked output (1-100)
    #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,

    /// Watermark opacity (0.0-1.0)
    #[arg(long, default_value_t = DEFAULT_OPACITY)]
    opacity: f32,

    /// Files processed at once (defaults to the number of CPUs)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Only process every Nth photo, copied into a sibling folder first
    #[arg(long)]
    sample_every: Option<usize>,

    /// Name of the sample folder
    #[arg(long, default_value = DEFAULT_SAMPLE_DIR)]
    sample_dest: String,

    /// Detection program; receives the image path as its last argument and
    /// prints a JSON array of detections
    #[arg(long)]
    detector_cmd: Option<PathBuf>,

    /// Extra argument for the detection program (repeatable)
    #[arg(long = "detector-arg", allow_hyphen_values = true)]
    detector_args: Vec<String>,

    /// Copy photos with nothing to censor instead of re-encoding them
    #[arg(long)]
    copy_unchanged: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (output folders only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            photo_censor::init_tracing(args.verbose);
            run_pipeline(args)
        }
        Commands::Brands { brands, output } => {
            photo_censor::init_tracing(false);
            list_brands(brands.as_deref(), output)
        }
    }
}

fn load_brands(path: Option<&Path>) -> Result<BrandRegistry> {
    let registry = match path {
        Some(path) => BrandRegistry::load(path)?,
        None => BrandRegistry::load_default()?,
    };
    Ok(registry)
}

fn run_pipeline(args: RunArgs) -> Result<()> {
    let term = Term::stderr();
    let output = args.output;

    // Print header
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Censor").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let brand = args.watermark.as_deref().and_then(parse_brand);
    // The brand file only matters when a brand is requested
    let brands = if brand.is_some() {
        load_brands(args.brands.as_deref())?
    } else {
        BrandRegistry::new()
    };

    let labels: Vec<String> = if args.labels.is_empty() {
        DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
    } else {
        args.labels
    };

    let mut builder = Pipeline::builder()
        .input(&args.input)
        .labels(labels)
        .kernel_size(args.kernel)
        .padding(args.padding)
        .circle_scale(args.circle_scale)
        .watermark_brand(brand)
        .brands(brands)
        .max_size(args.max_width, args.max_height)
        .quality(args.quality)
        .opacity(args.opacity)
        .workers(args.workers.unwrap_or_else(default_workers))
        .copy_unchanged(args.copy_unchanged)
        .sampling(args.sample_every.map(|interval| SamplingConfig {
            interval,
            dest_name: args.sample_dest.clone(),
        }));

    if let Some(program) = args.detector_cmd {
        let detector_args = args.detector_args;
        builder = builder.detector_factory(move || {
            let detector = CommandDetector::new(program.clone()).with_args(detector_args.clone());
            Ok(Box::new(detector) as Box<dyn Detector>)
        });
    }

    let pipeline = builder.build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg:<14} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = args.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::StageChanged { stage }) => {
                    pb.set_message(stage.to_string());
                }
                Event::Batch(BatchEvent::Started { total, .. }) => {
                    pb.set_length(total as u64);
                    pb.set_position(0);
                }
                Event::Batch(BatchEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Batch(BatchEvent::ItemFailed { message, .. }) => {
                    if verbose {
                        pb.println(format!("  {} {}", style("!").yellow(), message));
                    }
                }
                Event::Pipeline(
                    PipelineEvent::Completed { .. }
                    | PipelineEvent::Cancelled
                    | PipelineEvent::Error { .. },
                ) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    // Output results
    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, args.verbose),
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &PipelineResult, verbose: bool) {
    term.write_line("").ok();
    if result.cancelled {
        term.write_line(&format!("{} Run Cancelled", style("✗").yellow().bold()))
            .ok();
    } else {
        term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
            .ok();
    }
    term.write_line("").ok();

    if let Some(sampled) = &result.sampled_dir {
        term.write_line(&format!(
            "  Sampled into {}",
            style(display_path(sampled)).dim()
        ))
        .ok();
    }

    print_stage(term, "censored", &result.censor, verbose);
    if let Some(watermark) = &result.watermark {
        print_stage(term, "watermarked", watermark, verbose);
    }

    term.write_line(&format!(
        "  Finished in {:.1}s",
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line("").ok();

    // Footer
    term.write_line(&format!(
        "{}",
        style("Originals were not modified.").dim()
    ))
    .ok();
}

fn print_stage(term: &Term, verb: &str, summary: &BatchSummary, verbose: bool) {
    term.write_line(&format!(
        "  {} of {} photos {} into {}",
        style(summary.succeeded).cyan(),
        summary.total,
        verb,
        style(display_path(&summary.output_dir)).dim()
    ))
    .ok();

    if summary.failed > 0 {
        term.write_line(&format!(
            "  {} failed ({} unreadable)",
            style(summary.failed).red(),
            summary.skipped
        ))
        .ok();
    }
    if summary.cancelled > 0 {
        term.write_line(&format!(
            "  {} not started (cancelled)",
            style(summary.cancelled).yellow()
        ))
        .ok();
    }

    if verbose {
        for failure in &summary.failures {
            term.write_line(&format!("    {} {}", style("○").dim(), failure))
                .ok();
        }
    }
}

fn print_json_results(result: &PipelineResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize results: {}", e),
    }
}

fn print_minimal_results(result: &PipelineResult) {
    println!("{}", result.censored_dir.display());
    if let Some(dir) = &result.watermarked_dir {
        println!("{}", dir.display());
    }
}

fn list_brands(path: Option<&Path>, output: OutputFormat) -> Result<()> {
    let registry = load_brands(path)?;

    match output {
        OutputFormat::Json => {
            let names: Vec<&str> = registry.names().collect();
            println!("{}", serde_json::json!({ "brands": names }));
        }
        OutputFormat::Minimal => {
            for name in registry.names() {
                println!("{}", name);
            }
        }
        OutputFormat::Pretty => {
            let term = Term::stdout();
            if registry.is_empty() {
                let location = path
                    .map(Path::to_path_buf)
                    .or_else(BrandRegistry::default_path)
                    .map(|p| display_path(&p))
                    .unwrap_or_default();
                term.write_line(&format!(
                    "No brands configured. Add them to {}",
                    style(location).cyan()
                ))
                .ok();
            } else {
                term.write_line(&format!("{}", style("Brands:").bold().underlined()))
                    .ok();
                for name in registry.names() {
                    term.write_line(&format!("  {}", name)).ok();
                }
            }
        }
    }

    Ok(())
}

fn display_path(path: &Path) -> String {
    let home = dirs::home_dir().unwrap_or_default();
    match path.strip_prefix(&home) {
        Ok(rest) if !home.as_os_str().is_empty() => format!("~/{}", rest.display()),
        _ => path.display().to_string(),
    }
}
