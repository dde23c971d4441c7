//! compander - expands envelope-modulated 8-bit audio and inspects its coded streams.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn, LevelFilter};

use envelope_compander::{
    decode_hybrid, encode_hybrid, expand_stereo, expanded_len, sign_extend, ByteHistogram,
    DeltaIntegrator, GainTable, Regime, ScaleTable, StereoInput, Tabulation, VolumeTables,
    DEFAULT_MASTER_VOLUME, DEFAULT_SCALE_FACTOR, DEFAULT_SHIFT_SEED,
};

#[derive(Parser, Debug)]
#[command(name = "compander", version, about = "Envelope-modulated 8-bit to 16-bit expander")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand two channels and their volume envelopes to 16-bit little-endian stereo
    Expand {
        #[arg(long)]
        left: PathBuf,
        #[arg(long)]
        left_volume: PathBuf,
        #[arg(long)]
        right: PathBuf,
        #[arg(long)]
        right_volume: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Number of samples per channel (default: length of the left channel)
        #[arg(short = 'n', long)]
        samples: Option<usize>,
    },
    /// Print the gain table
    GainTable {
        #[arg(long, default_value_t = DEFAULT_SHIFT_SEED)]
        seed: u8,
        /// Print one entry per line with its regime
        #[arg(long)]
        regimes: bool,
    },
    /// Check that integrated scaled deltas reproduce the scaled samples of a raw file
    ScaleCheck {
        input: PathBuf,
        #[arg(short, long, default_value_t = DEFAULT_SCALE_FACTOR)]
        factor: i16,
    },
    /// Convert a raw sample file to or from hybrid delta/linear coding
    Hybrid {
        #[arg(value_enum)]
        direction: Direction,
        input: PathBuf,
        output: PathBuf,
    },
    /// Tabulate the byte distribution of a raw sample file
    Histogram {
        input: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Mode::All)]
        mode: Mode,
    },
    /// Print one 8-bit to 16-bit volume level table
    VolumeTable {
        #[arg(short, long)]
        level: u8,
        #[arg(long, default_value_t = DEFAULT_MASTER_VOLUME)]
        master: u16,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Encode,
    Decode,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Linear,
    Delta,
    Hybrid,
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Expand { left, left_volume, right, right_volume, output, samples } => {
            let left = read(&left)?;
            let left_volume = read(&left_volume)?;
            let right = read(&right)?;
            let right_volume = read(&right_volume)?;
            let sample_count = samples.unwrap_or(left.len());
            let input = StereoInput {
                left: &left,
                left_volume: &left_volume,
                right: &right,
                right_volume: &right_volume,
            };
            let Some(out_len) = expanded_len(sample_count) else {
                bail!("sample count {} is too large", sample_count);
            };
            let mut out = vec![0u8; out_len];
            expand_stereo(&input, sample_count, &mut out)
                .context("expanding stereo samples")?;
            write(&output, &out)?;
            info!("wrote {} frames to {}", sample_count, output.display());
        },
        Command::GainTable { seed, regimes } => {
            let table = GainTable::with_seed(seed)?;
            if regimes {
                for (index, entry) in table.entries().iter().enumerate() {
                    match entry {
                        Regime::Reciprocal(value) => println!("{:2}: multiply {}", index, value),
                        Regime::Shift(amount) => println!("{:2}: shift    {}", index, amount),
                    }
                }
            } else {
                let raw = table.to_raw().map(|v| v.to_string());
                println!("{}", raw.join(","));
            }
        },
        Command::ScaleCheck { input, factor } => scale_check(&input, factor)?,
        Command::Hybrid { direction, input, output } => {
            let data = read(&input)?;
            let mut out = vec![0u8; data.len()];
            match direction {
                Direction::Encode => encode_hybrid(&data, &mut out)?,
                Direction::Decode => decode_hybrid(&data, &mut out)?,
            }
            write(&output, &out)?;
            info!("{:?}d {} samples to {}", direction, data.len(), output.display());
        },
        Command::Histogram { input, mode } => {
            let data = read(&input)?;
            println!("Read {} values, checking distribution", data.len());
            let modes = [
                (Mode::Linear, Tabulation::Linear, "Linear"),
                (Mode::Delta, Tabulation::Delta, "Delta"),
                (Mode::Hybrid, Tabulation::Hybrid, "Linear-1/Delta-15"),
            ];
            for (m, tabulation, title) in modes {
                if mode == m || mode == Mode::All {
                    println!("{}:", title);
                    print_histogram(&ByteHistogram::tabulate(&data, tabulation));
                }
            }
        },
        Command::VolumeTable { level, master } => {
            let tables = VolumeTables::new(master)?;
            let Some(table) = tables.table(level) else {
                bail!("volume level {} has no table (levels 1..=15)", level);
            };
            for (i, row) in table.chunks(8).enumerate() {
                let values: Vec<String> = row.iter().map(|v| format!("{:6}", v)).collect();
                println!("{:3}: {}", i * 8, values.join(" "));
            }
        },
    }
    Ok(())
}

fn scale_check(input: &Path, factor: i16) -> Result<()> {
    let data = read(input)?;
    let table = ScaleTable::new(factor)?;
    let mut integrator = DeltaIntegrator::new();
    for (i, byte) in data.iter().enumerate() {
        let sample = sign_extend(*byte);
        let expected = i32::from(table.scale(sample));
        let integrated = integrator.push(&table, sample);
        if integrated != expected {
            warn!("mismatch at sample {}", i);
            bail!("sample {} ({}): scaled {} but integrated {}", i, sample, expected, integrated);
        }
    }
    match integrator.delta_range() {
        Some((min, max)) => println!("Tested {} samples. Min/Max delta-8 {}/{}", data.len(), min, max),
        None => println!("Tested 0 samples."),
    }
    Ok(())
}

fn print_histogram(histogram: &ByteHistogram) {
    println!("+------+---------+-------+");
    println!("| Line |  Access | Hit % |");
    println!("+------+---------+-------+");
    for (row, count) in histogram.rows().iter().enumerate() {
        let percent = histogram.row_percent(row).unwrap_or(0.0);
        println!("| {:4} | {:7} | {:5.2} |", row, count, percent);
    }
    println!("+------+---------+-------+");
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn write(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}
