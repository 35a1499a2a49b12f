//! # CLI Module
//!
//! Command-line front end for the dedup engine.
//!
//! ## Usage
//! ```bash
//! # Find duplicates in a request file ({"photos": [{"src": ..., "name": ...}]})
//! photo-dedup dedup request.json
//!
//! # Read the request from stdin and print the wire response
//! cat request.json | photo-dedup dedup - --output json
//!
//! # Stricter matching
//! photo-dedup dedup request.json --threshold 8
//!
//! # Print fingerprints for local files
//! photo-dedup hash a.jpg b.png
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_dedup_engine::config::PipelineConfig;
use photo_dedup_engine::core::hasher::{FastDecoder, HashAlgorithmKind, HasherConfig};
use photo_dedup_engine::core::pipeline::{CancellationToken, Pipeline};
use photo_dedup_engine::core::reporter::{DedupResponse, DedupRun, PhotoEntry, ResponseKind};
use photo_dedup_engine::core::source::BatchRequest;
use photo_dedup_engine::error::DedupError;
use photo_dedup_engine::events::{Event, EventChannel, HashEvent, PipelineEvent};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

/// Photo Dedup - find near-duplicate photos in a batch
#[derive(Parser, Debug)]
#[command(name = "photo-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group near-duplicate photos from a JSON request
    Dedup {
        /// Request file, or `-` for stdin
        request: PathBuf,

        /// Comparison threshold (lower = stricter, 0-64)
        #[arg(short, long)]
        threshold: Option<u32>,

        /// Hash algorithm to use
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Config file (defaults to the platform config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stage photo bytes in a scratch directory while processing
        #[arg(long)]
        stage_to_disk: bool,

        /// Worker threads for hashing
        #[arg(short, long)]
        workers: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the fingerprint of local image files
    Hash {
        /// Image files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "perceptual")]
        algorithm: Algorithm,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Perceptual Hash - DCT based, robust to edits (default)
    Perceptual,
    /// Difference Hash - Gradient based, fastest
    Difference,
}

impl From<Algorithm> for HashAlgorithmKind {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Perceptual => HashAlgorithmKind::Perceptual,
            Algorithm::Difference => HashAlgorithmKind::Difference,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// The JSON response body
    Json,
}

struct DedupArgs {
    request: PathBuf,
    threshold: Option<u32>,
    algorithm: Option<Algorithm>,
    output: OutputFormat,
    config: Option<PathBuf>,
    stage_to_disk: bool,
    workers: Option<usize>,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dedup {
            request,
            threshold,
            algorithm,
            output,
            config,
            stage_to_disk,
            workers,
            verbose,
        } => run_dedup(DedupArgs {
            request,
            threshold,
            algorithm,
            output,
            config,
            stage_to_disk,
            workers,
            verbose,
        }),
        Commands::Hash { paths, algorithm } => run_hash(&paths, algorithm.into()),
    }
}

fn load_config(args: &DedupArgs) -> Result<PipelineConfig, DedupError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::load_default(),
    };

    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm.into();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.stage_to_disk {
        config.stage_to_disk = true;
    }

    Ok(config)
}

fn read_request(path: &Path) -> Result<BatchRequest, DedupError> {
    let body = if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        body
    } else {
        std::fs::read_to_string(path)?
    };

    BatchRequest::from_json(&body).map_err(DedupError::from)
}

fn run_dedup(args: DedupArgs) -> ExitCode {
    let term = Term::stderr();

    let pipeline = match load_config(&args).and_then(|config| Pipeline::builder().config(config).build())
    {
        Ok(pipeline) => pipeline,
        Err(e) => return report_failure(&term, &e),
    };

    let request = match read_request(&args.request) {
        Ok(request) => request,
        Err(e) => {
            let response = DedupResponse::from_error(&e);
            return finish(&term, args.output, &Err(e), &response, args.verbose);
        }
    };

    if matches!(args.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Dedup").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        if args.verbose {
            term.write_line(&style(settings_line(pipeline.config())).dim().to_string())
                .ok();
        }
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(args.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(bar_style);
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
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Hash(HashEvent::Started { total_photos }) => {
                    pb.set_length(total_photos as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Hash(HashEvent::Error { name, message, .. }) if verbose => {
                    pb.println(format!("{} {}: {}", style("!").yellow(), name, message));
                }
                Event::Pipeline(
                    PipelineEvent::Completed { .. } | PipelineEvent::Cancelled | PipelineEvent::Error { .. },
                ) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(request, &sender, &CancellationToken::new());

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let response = DedupResponse::from_result(&result);
    finish(&term, args.output, &result, &response, args.verbose)
}

fn finish(
    term: &Term,
    output: OutputFormat,
    result: &Result<DedupRun, DedupError>,
    response: &DedupResponse,
    verbose: bool,
) -> ExitCode {
    match output {
        OutputFormat::Json => match response.to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                term.write_line(&format!("{} {}", style("error:").red().bold(), e))
                    .ok();
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Pretty => match result {
            Ok(run) => print_pretty_results(term, run, verbose),
            Err(e) => {
                term.write_line(&format!("{} {}", style("error:").red().bold(), e))
                    .ok();
            }
        },
    }

    exit_code(response.kind())
}

fn exit_code(kind: ResponseKind) -> ExitCode {
    ExitCode::from(exit_status(kind))
}

/// 200 and 404 both mean the batch was processed
fn exit_status(kind: ResponseKind) -> u8 {
    match kind {
        ResponseKind::Duplicates | ResponseKind::NoDuplicates => 0,
        ResponseKind::InvalidInput => 2,
        ResponseKind::InternalError => 1,
    }
}

fn report_failure(term: &Term, error: &DedupError) -> ExitCode {
    term.write_line(&format!("{} {}", style("error:").red().bold(), error))
        .ok();
    exit_code(DedupResponse::from_error(error).kind())
}

fn print_pretty_results(term: &Term, run: &DedupRun, verbose: bool) {
    let groups = run.outcome.groups();
    let others = run.outcome.others();

    term.write_line(&format!(
        "{} Processed {} photos ({} hashed, {} failed) in {} ms",
        style("✓").green().bold(),
        style(run.summary.total).cyan(),
        style(run.summary.hashed).cyan(),
        style(run.summary.failures.len()).yellow(),
        run.summary.duration_ms
    ))
    .ok();

    if groups.is_empty() {
        term.write_line(&format!(
            "\n{} No similar photos found",
            style("🎉").green()
        ))
        .ok();
    } else {
        term.write_line(&format!("\n{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        for (i, group) in groups.iter().enumerate() {
            term.write_line(&format!(
                "\n  {} {} photos",
                style(format!("Group {}:", i + 1)).bold(),
                group.photos.len()
            ))
            .ok();
            for photo in &group.photos {
                term.write_line(&format!("    {} {}", style("○").dim(), describe(photo)))
                    .ok();
            }
        }
    }

    if verbose && !others.is_empty() {
        term.write_line(&format!("\n{}", style("Unmatched:").bold())).ok();
        for photo in others {
            term.write_line(&format!("    {}", describe(photo))).ok();
        }
    }

    if !run.summary.failures.is_empty() {
        term.write_line(&format!("\n{}", style("Skipped:").bold().yellow()))
            .ok();
        for failure in &run.summary.failures {
            term.write_line(&format!(
                "    {} {}",
                failure.name,
                style(&failure.reason).dim()
            ))
            .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("No photos were modified. Review the groups before deleting anything.").dim()
    ))
    .ok();
}

/// One-line summary of the hashing settings a run will use
fn settings_line(config: &PipelineConfig) -> String {
    format!(
        "{}, threshold {} bits, {} workers",
        config.algorithm.description(),
        config.threshold,
        config.workers
    )
}

fn describe(photo: &PhotoEntry) -> String {
    format!("{} {}", photo.name, style(format_bytes(photo.size)).dim())
}

fn run_hash(paths: &[PathBuf], algorithm: HashAlgorithmKind) -> ExitCode {
    let hasher = HasherConfig::new().algorithm(algorithm).build();
    let term = Term::stderr();
    let mut failed = false;

    for path in paths {
        let fingerprint = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| FastDecoder::decode_bytes(&bytes).map_err(|e| e.to_string()))
            .and_then(|image| hasher.hash_image(&image).map_err(|e| e.to_string()));

        match fingerprint {
            Ok(fingerprint) => println!("{}  {}", fingerprint, path.display()),
            Err(reason) => {
                failed = true;
                term.write_line(&format!(
                    "{} {}: {}",
                    style("error:").red().bold(),
                    path.display(),
                    reason
                ))
                .ok();
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_dedup_engine::error::InputError;

    #[test]
    fn exit_codes_follow_response_class() {
        assert_eq!(exit_status(ResponseKind::Duplicates), 0);
        assert_eq!(exit_status(ResponseKind::NoDuplicates), 0);
        assert_eq!(exit_status(ResponseKind::InvalidInput), 2);
        assert_eq!(exit_status(ResponseKind::InternalError), 1);
    }

    #[test]
    fn settings_line_names_algorithm_and_threshold() {
        let config = PipelineConfig {
            algorithm: HashAlgorithmKind::Difference,
            threshold: 9,
            workers: 3,
            ..PipelineConfig::default()
        };

        let line = settings_line(&config);

        assert!(line.starts_with("Difference Hash (dHash)"));
        assert!(line.contains("threshold 9 bits"));
        assert!(line.contains("3 workers"));
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn malformed_request_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            read_request(&path),
            Err(DedupError::Input(InputError::Malformed(_)))
        ));
    }
}
