use anonymri::audit::Delimiter;
use anonymri::config::{Config, ConfigBuilder};
use anonymri::discovery::DiscoveryMode;
use anonymri::pipeline::{Pipeline, RunReport};
use anonymri::resolver::{Fixed, NonInteractive, PatientNumberResolver, Prompt};
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::PathBuf;

/// Remove identifying data from DICOM series and re-key them with pseudonymous identifiers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory with the source DICOM series (default: current directory)
    #[arg(short, long, value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Directory for the anonymized data and the log (default: current directory)
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Patient number for every series; asked for per series if not given
    #[arg(short, long, env = "ANONYMRI_PATIENT_NUMBER")]
    patient_number: Option<u32>,

    /// Do not zip the result (faster)
    #[arg(long)]
    no_archive: bool,

    /// Log column delimiter: 'tab', ';' or ','
    #[arg(short, long, value_parser = clap::value_parser!(Delimiter))]
    delimiter: Option<Delimiter>,

    /// Name of the log file written to the output directory
    #[arg(short, long, value_name = "FILE_NAME")]
    logfile: Option<String>,

    /// Group series directories by study and process each study as one patient
    #[arg(short, long)]
    group: bool,

    /// In group mode, probe every file instead of only the first one of each directory
    #[arg(long)]
    no_fast_check: bool,

    /// Fail instead of asking when no patient number is given
    #[arg(long)]
    non_interactive: bool,

    /// JSON file with run settings; command line options take precedence
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Show more verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(args: &Args) -> Result<Config> {
    let mut builder = match &args.config {
        Some(path) => ConfigBuilder::from_config(Config::from_json_file(path)?),
        None => ConfigBuilder::new(),
    };

    if let Some(input) = &args.input {
        builder = builder.input(input);
    }
    if let Some(output) = &args.output {
        builder = builder.output(output);
    }
    if let Some(delimiter) = &args.delimiter {
        builder = builder.delimiter(delimiter.clone());
    }
    if let Some(logfile) = &args.logfile {
        builder = builder.log_file_name(logfile);
    }
    if args.no_archive {
        builder = builder.archive(false);
    }
    if args.group {
        builder = builder.mode(DiscoveryMode::Grouped);
    }
    if args.no_fast_check {
        builder = builder.fast_check(false);
    }

    let config = builder.build();
    config.check()?;
    Ok(config)
}

fn run<R: PatientNumberResolver>(config: Config, resolver: R) -> Result<RunReport> {
    let mut pipeline = Pipeline::new(config, resolver);
    let report = pipeline.run().with_context(|| {
        format!(
            "failed to anonymize {}",
            pipeline.config().input().display()
        )
    })?;

    let config = pipeline.config();
    print!("{}", report.log.render(config.delimiter()));

    let log_path = config.log_path();
    report
        .write_log(&log_path, config.delimiter())
        .with_context(|| format!("failed to write {}", log_path.display()))?;
    println!("\nLog saved to {}", log_path.display());

    Ok(report)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    let mut builder = Builder::from_default_env();
    builder
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "Error",
                Level::Warn => "Warning",
                Level::Info => "Info",
                Level::Debug => "Debug",
                Level::Trace => "Trace",
            };
            writeln!(buf, "{}: {}", level, record.args())
        })
        .filter(None, log_level);
    builder.init();

    let config = build_config(&args)?;

    match (args.patient_number, args.non_interactive) {
        (Some(patient_number), _) => run(config, Fixed(patient_number))?,
        (None, true) => run(config, NonInteractive)?,
        (None, false) => run(config, Prompt::stdio())?,
    };

    Ok(())
}
