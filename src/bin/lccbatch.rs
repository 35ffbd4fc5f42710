use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use lccscan::{FieldSummary, ScanConfig, ScanPipeline, ScanReport, ScanRequest, ScanResult};
use log::LevelFilter;
use rustc_hash::FxHashMap;
use simple_logger::SimpleLogger;
use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

const CHANNEL_SIZE: usize = 100;
const REPORT_EXTENSION: &str = "report.json";

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Process a directory of field scans.
///
/// Every scan request (*.json) found under the directory is processed and its report written
/// next to it as *.report.json. When all scans are done a summary of each field is logged.
///
#[derive(Debug, Parser)]
#[clap(name = "lccbatch")]
#[clap(author, version, about)]
struct LccBatchOptions {
    /// The directory to search for scan requests.
    data_dir: PathBuf,

    /// A JSON configuration file, sections that are left out take their default values.
    ///
    /// If this is not specified, then the program will check for it in the "LCCSCAN_CONFIG"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "LCCSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Process the scans but don't write any reports.
    #[clap(short = 'n', long)]
    dry_run: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

/// What the writer thread collected.
#[derive(Debug, Default)]
struct BatchTotals {
    reports_by_field: FxHashMap<String, Vec<ScanReport>>,
    lowest_yield: Option<ScanReport>,
    num_processed: usize,
    num_rejected: usize,
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> Result<(), Box<dyn Error>> {
    let opts = LccBatchOptions::parse();

    let module_level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_module_level("lccscan", module_level)
        .with_module_level("lccbatch", module_level)
        .init()?;

    let config = match &opts.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };
    let config = Arc::new(config);

    let (to_analysis, from_path_gen) = bounded(CHANNEL_SIZE);
    let (to_writer, from_analysis) = bounded(CHANNEL_SIZE);

    let path_gen = start_path_generation_thread(opts.data_dir.clone(), to_analysis)?;
    let analysis = start_analysis_threads(config, from_path_gen, to_writer)?;
    let writer = start_writer_thread(from_analysis, opts.dry_run)?;

    path_gen.join().map_err(|_| "path generation thread panicked")?;
    for jh in analysis {
        jh.join().map_err(|_| "analysis thread panicked")?;
    }
    let totals = writer.join().map_err(|_| "writer thread panicked")?;

    log::info!(
        "processed {} scans, {} rejected",
        totals.num_processed,
        totals.num_rejected
    );

    let mut fields: Vec<_> = totals.reports_by_field.into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    for (field_id, reports) in fields {
        if let Some(summary) = FieldSummary::from_reports(&reports) {
            log_summary(&field_id, &summary);
        }
    }

    if let Some(ScanReport {
        field_id,
        scanned_at,
        planting_type,
        growth_stage,
        yield_estimate,
        urea_required,
        clusters,
        ..
    }) = totals.lowest_yield
    {
        log::info!("");
        log::info!("Lowest yield scan:");
        log::info!(
            "         field - {:>19}",
            field_id.as_deref().unwrap_or("unnamed")
        );
        log::info!(
            "       scanned - {:>19}",
            scanned_at.format("%Y-%m-%d %H:%M").to_string()
        );
        log::info!(
            "      planting - {:>19}",
            Into::<&'static str>::into(planting_type)
        );
        log::info!(
            "         stage - {:>19}",
            Into::<&'static str>::into(growth_stage)
        );
        log::info!("     yield (t) - {:>19.2}", yield_estimate);
        log::info!("     urea (kg) - {:>19.1}", urea_required);
        log::info!("      clusters - {:>19}", clusters.len());
        log::info!("");
    } else {
        log::warn!("");
        log::warn!("No scans were processed!");
        log::warn!("");
    }

    Ok(())
}

fn log_summary(field_id: &str, summary: &FieldSummary) {
    log::info!(
        "{}: {} scans, latest yield {:.2} t, urea {:.1} kg ({:.1} sacks), change {}",
        field_id,
        summary.num_scans(),
        summary.latest.yield_estimate,
        summary.latest.urea_required,
        summary.latest.fertilizer_sacks,
        summary
            .yield_change()
            .map(|chg| format!("{:+.2} t", chg))
            .unwrap_or_else(|| "n/a".to_owned())
    );
}

fn is_scan_request(path: &Path) -> bool {
    let fname = match path.file_name() {
        Some(fname) => fname.to_string_lossy(),
        None => return false,
    };

    fname.ends_with(".json") && !fname.ends_with(REPORT_EXTENSION)
}

fn start_path_generation_thread(
    data_dir: PathBuf,
    to_analysis: Sender<PathBuf>,
) -> Result<JoinHandle<()>, Box<dyn Error>> {
    let jh = thread::Builder::new()
        .name("lccbatch-path_gen".to_owned())
        .spawn(move || {
            for entry in walkdir::WalkDir::new(data_dir)
                .into_iter()
                .filter_map(|res| res.ok())
                // Ignore directories, WalkDir will take care of recursing into them.
                .filter(|entry| entry.path().is_file())
                .filter(|entry| is_scan_request(entry.path()))
            {
                log::debug!("Queueing {}", entry.path().display());
                if to_analysis.send(entry.into_path()).is_err() {
                    break;
                }
            }
        })?;

    Ok(jh)
}

fn start_analysis_threads(
    config: Arc<ScanConfig>,
    from_path_gen: Receiver<PathBuf>,
    to_writer: Sender<(PathBuf, ScanResult<ScanReport>)>,
) -> Result<Vec<JoinHandle<()>>, Box<dyn Error>> {
    let mut handles = Vec::with_capacity(num_cpus::get());

    for _ in 0..num_cpus::get() {
        let config = Arc::clone(&config);
        let from_path_gen = from_path_gen.clone();
        let to_writer = to_writer.clone();

        let jh = thread::Builder::new()
            .name("lccbatch-analysis".to_owned())
            .spawn(move || {
                let pipeline = ScanPipeline::new(&config);

                for path in from_path_gen {
                    let result =
                        ScanRequest::from_json_file(&path).and_then(|req| pipeline.run(&req));

                    if to_writer.send((path, result)).is_err() {
                        break;
                    }
                }
            })?;

        handles.push(jh);
    }

    Ok(handles)
}

fn start_writer_thread(
    from_analysis: Receiver<(PathBuf, ScanResult<ScanReport>)>,
    dry_run: bool,
) -> Result<JoinHandle<BatchTotals>, Box<dyn Error>> {
    let jh = thread::Builder::new()
        .name("lccbatch-writer".to_owned())
        .spawn(move || {
            let mut totals = BatchTotals::default();

            for (path, result) in from_analysis {
                let report = match result {
                    Ok(report) => report,
                    Err(err) => {
                        totals.num_rejected += 1;
                        if err.is_user_error() {
                            log::warn!(
                                "{} rejected: {} ({})",
                                path.display(),
                                err,
                                err.user_message()
                            );
                        } else {
                            log::error!("{} failed: {}", path.display(), err);
                        }
                        continue;
                    }
                };

                totals.num_processed += 1;

                if !dry_run {
                    let out_path = path.with_extension(REPORT_EXTENSION);
                    match serde_json::to_string_pretty(&report)
                        .map_err(Box::<dyn Error>::from)
                        .and_then(|json| std::fs::write(&out_path, json).map_err(Into::into))
                    {
                        Ok(()) => log::debug!("wrote {}", out_path.display()),
                        Err(err) => log::error!("unable to write {}: {}", out_path.display(), err),
                    }
                }

                let is_lowest = totals
                    .lowest_yield
                    .as_ref()
                    .map(|low| report.yield_estimate < low.yield_estimate)
                    .unwrap_or(true);
                if is_lowest {
                    totals.lowest_yield = Some(report.clone());
                }

                let field_id = report
                    .field_id
                    .clone()
                    .unwrap_or_else(|| path.display().to_string());
                totals
                    .reports_by_field
                    .entry(field_id)
                    .or_default()
                    .push(report);
            }

            totals
        })?;

    Ok(jh)
}
