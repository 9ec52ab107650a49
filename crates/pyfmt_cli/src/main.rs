use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use mimalloc::MiMalloc;
use pyfmt_service::{discover_files, format_files, FormatOptions, LineRange, Style};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(
    name = "pyfmt",
    version,
    about = "Reformats source files to a configurable style."
)]
struct Args {
    /// Files or directories to format.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Predefined style baseline to start from.
    #[arg(long, default_value = "default")]
    style: String,

    /// Style knob override as KNOB=VALUE; repeatable.
    #[arg(long = "set", value_name = "KNOB=VALUE")]
    overrides: Vec<String>,

    /// Rewrite changed files in place instead of printing to stdout.
    #[arg(short, long)]
    in_place: bool,

    /// Print unified diffs for files that would change.
    #[arg(short, long)]
    diff: bool,

    /// Emit the per-file reports as JSON instead of formatted text.
    #[arg(long)]
    json: bool,

    /// Only reformat these 1-based line ranges (START-END or LINE);
    /// repeatable.
    #[arg(long = "lines", value_name = "START-END")]
    lines: Vec<String>,

    /// Increase logging verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        _ => log::Level::Debug,
    };
    simple_logger::init_with_level(level).unwrap();

    match run(args) {
        Ok(code) => exit(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            exit(2);
        }
    }
}

fn run(args: Args) -> anyhow::Result<i32> {
    let mut style = Style::by_name(&args.style)?;
    for item in &args.overrides {
        let (knob, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected KNOB=VALUE, got {item:?}"))?;
        style.set_knob(knob, value)?;
    }

    let ranges = parse_ranges(&args.lines)?;
    let mut options = FormatOptions::new(style);
    options.in_place = args.in_place;
    options.print_diff = args.diff;
    options.ranges = ranges;

    let files = discover_files(args.inputs);
    if files.is_empty() {
        anyhow::bail!("no source files found");
    }

    let reports = format_files(files, &options, None);
    let mut any_failed = false;
    let mut any_changed = false;
    for report in &reports {
        if let Some(error) = &report.error {
            eprintln!("{error}");
            any_failed = true;
            continue;
        }
        any_changed |= report.changed;
        if args.json {
            continue;
        }
        if args.diff {
            if let Some(diff) = &report.diff {
                print!("{diff}");
            }
        } else if !args.in_place {
            if let Some(formatted) = &report.formatted {
                print!("{formatted}");
            }
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if any_failed {
        Ok(2)
    } else if args.diff && any_changed {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn parse_ranges(specs: &[String]) -> anyhow::Result<Option<Vec<LineRange>>> {
    if specs.is_empty() {
        return Ok(None);
    }
    let mut ranges = Vec::with_capacity(specs.len());
    for spec in specs {
        let range = match spec.split_once('-') {
            Some((start, end)) => (start.trim().parse()?, end.trim().parse()?),
            None => {
                let line: u32 = spec.trim().parse()?;
                (line, line)
            }
        };
        ranges.push(range);
    }
    Ok(Some(ranges))
}
