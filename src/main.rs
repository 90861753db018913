use anyhow::Result;
use clap::{ArgAction, Parser};
use fueatest::exact_test::AllelicExactTest;
use fueatest::log_factorial::{LogFactorialTable, DEFAULT_CAPACITY};
use fueatest::output::ResultWriter;
use fueatest::table_reader;
use fueatest::types::Method;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::Level;

const LONG_ABOUT: &str = "\
A fast, unbiased and exact allelic test for case-control association studies.

Tests allelic association on a 2x3 genotype table:

                     aa aA AA
  [case (diseased)]  d0 d1 d2
  [control (healthy)] h0 h1 h2

Give the six counts on the command line, or a file with one table per line,
the six counts separated by semicolons:

  226;57;5;249;63;4
  1;109;191;0;110;221
  7;110;174;6;132;191

Each table is printed with its p-value in scientific notation, tab separated.";

#[derive(Parser)]
#[command(name = "fueatest")]
#[command(version)]
#[command(about = "Fast, unbiased and exact allelic test on 2x3 genotype tables", long_about = LONG_ABOUT)]
struct Args {
    /// Six counts `d0 d1 d2 h0 h1 h2`, or one input file ("-" for stdin)
    #[arg(required = true, num_args = 1..=6, value_name = "FILE | COUNTS")]
    input: Vec<String>,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Summation method: "fast" or "direct"
    #[arg(long, default_value = "fast")]
    method: Method,

    /// Largest supported sample size + 1 (size of the log-factorial table)
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    max_sample_size: usize,

    /// Suppress progress output and warnings
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

macro_rules! progress {
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn make_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner} [{elapsed_precise}] {pos} {msg}")
            .unwrap(),
    );
    pb
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    // Only build a private table when the capacity differs from the shared one
    let owned;
    let log_factorials = if args.max_sample_size == DEFAULT_CAPACITY {
        LogFactorialTable::global()
    } else {
        owned = LogFactorialTable::with_capacity(args.max_sample_size);
        &owned
    };
    let engine = AllelicExactTest::new(log_factorials);

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = ResultWriter::new(sink);

    match args.input.len() {
        6 => {
            let table = table_reader::parse_counts(&args.input)?;
            let result = engine.test(table, args.method);
            if let Err(e) = &result.p_value {
                tracing::warn!(%table, "{} with --max-sample-size", e);
            }
            writer.write(&result)?;
        }
        1 => {
            let path = Path::new(&args.input[0]);
            if path != Path::new("-") && !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            let rows = table_reader::read_tables_path(path)?;

            let pb = make_spinner(args.quiet || args.output.is_none());
            pb.set_message("tables tested");
            let mut n_skipped = 0usize;
            let mut n_refused = 0usize;
            for row in rows {
                pb.inc(1);
                let table = match row.table {
                    Ok(table) => table,
                    Err(e) => {
                        tracing::warn!("skipping input {:#}", e);
                        n_skipped += 1;
                        continue;
                    }
                };
                let result = engine.test(table, args.method);
                if let Err(e) = &result.p_value {
                    tracing::warn!(line = row.line, %table, "{} with --max-sample-size", e);
                    n_refused += 1;
                }
                writer.write(&result)?;
            }
            pb.finish_and_clear();

            if n_skipped > 0 || n_refused > 0 {
                progress!(
                    args.quiet,
                    "{} row(s) unreadable, {} table(s) over capacity {}",
                    n_skipped,
                    n_refused,
                    log_factorials.capacity()
                );
            }
        }
        n => {
            anyhow::bail!("Expected one input file or 6 counts, got {} argument(s)", n);
        }
    }

    writer.finish()?;
    if let Some(path) = &args.output {
        progress!(args.quiet, "Results written to: {}", path);
    }
    Ok(())
}
