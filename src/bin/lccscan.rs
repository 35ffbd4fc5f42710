use clap::Parser;
use lccscan::{ScanConfig, ScanError, ScanPipeline, ScanRequest};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Process a single field scan.
///
/// This program reads a scan request (planting details, field boundary and geotagged leaf
/// readings) from a JSON file, clusters the readings, estimates the nitrogen requirement and
/// yield, and prints the report as JSON.
///
#[derive(Debug, Parser)]
#[clap(name = "lccscan")]
#[clap(author, version, about)]
struct LccScanOptionsInit {
    /// The path to the scan request.
    scan_file: Option<PathBuf>,

    /// A JSON configuration file, sections that are left out take their default values.
    ///
    /// If this is not specified, then the program will check for it in the "LCCSCAN_CONFIG"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "LCCSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Write the report here instead of standard output.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Override the clustering radius in meters.
    #[clap(long)]
    epsilon: Option<f64>,

    /// Override the buffer distance in meters.
    #[clap(long)]
    buffer: Option<f64>,

    /// Override the alpha parameter of the concave hull.
    #[clap(long)]
    alpha: Option<f64>,

    /// Print the effective configuration as JSON and exit.
    #[clap(long)]
    print_config: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct LccScanOptionsChecked {
    /// The path to the scan request, `None` if only printing the configuration.
    scan_file: Option<PathBuf>,

    /// Where to write the report.
    output: Option<PathBuf>,

    /// The configuration with any command line overrides applied.
    config: ScanConfig,

    /// Print the configuration and exit.
    print_config: bool,

    /// Verbose output
    verbose: bool,
}

impl Display for LccScanOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let cluster = &self.config.cluster;

        writeln!(f, "\n")?; // yes, two blank lines.
        if let Some(scan_file) = &self.scan_file {
            writeln!(f, "   Scan file: {}", scan_file.display())?;
        }
        if let Some(output) = &self.output {
            writeln!(f, "      Output: {}", output.display())?;
        }
        writeln!(f, "     Epsilon: {} m", cluster.epsilon_meters)?;
        writeln!(f, "      Buffer: {} m", cluster.buffer_meters)?;
        writeln!(f, "       Alpha: {}", cluster.alpha)?;
        writeln!(f, "  Projection: {:?}", cluster.projection)?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Get the command line arguments and check them.
fn parse_args() -> Result<LccScanOptionsChecked, Box<dyn Error>> {
    let LccScanOptionsInit {
        scan_file,
        config,
        output,
        epsilon,
        buffer,
        alpha,
        print_config,
        verbose,
    } = LccScanOptionsInit::parse();

    if scan_file.is_none() && !print_config {
        return Err("a scan file is required unless --print-config is given".into());
    }

    let mut config = match config {
        Some(path) => ScanConfig::from_json_file(&path)
            .map_err(|err| format!("unable to load {}: {}", path.display(), err))?,
        None => ScanConfig::default(),
    };

    if let Some(epsilon) = epsilon {
        config.cluster.epsilon_meters = epsilon;
    }
    if let Some(buffer) = buffer {
        config.cluster.buffer_meters = buffer;
    }
    if let Some(alpha) = alpha {
        config.cluster.alpha = alpha;
    }
    config.validate()?;

    let checked = LccScanOptionsChecked {
        scan_file,
        output,
        config,
        print_config,
        verbose,
    };

    Ok(checked)
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> Result<(), Box<dyn Error>> {
    let opts = parse_args()?;

    let module_level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_module_level("lccscan", module_level)
        .init()?;

    if opts.print_config {
        println!("{}", opts.config.to_json_pretty()?);
        return Ok(());
    }

    if opts.verbose {
        log::debug!("{}", opts);
    }

    let scan_file = match &opts.scan_file {
        Some(path) => path,
        None => return Ok(()),
    };

    let request = ScanRequest::from_json_file(scan_file)?;
    let pipeline = ScanPipeline::new(&opts.config);

    let report = match pipeline.run(&request) {
        Ok(report) => report,
        Err(err) => {
            report_rejection(&err);
            return Err(err.into());
        }
    };

    let json = serde_json::to_string_pretty(&report)?;
    match &opts.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{}", json),
    }

    Ok(())
}

fn report_rejection(err: &ScanError) {
    if err.is_user_error() {
        log::warn!("scan rejected: {}", err);
        log::warn!("    message - {}", err.user_message());
    } else {
        log::error!("scan failed: {}", err);
    }
}
