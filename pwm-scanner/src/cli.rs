use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pwm-scanner",
    about = "Scores nucleotide sequences against position weight matrices and reports motif hits",
    long_about = "A tool for locating motif occurrences in nucleotide sequences. \
                  Every window of every sequence is scored against each PWM, normalized \
                  between the worst and best achievable products, and windows above the \
                  score threshold are written as BED records.",
    version,
    after_help = "Example usage:\n    \
                  pwm-scanner score -i utrs.fasta -m 'pwms/*.txt' -o results -s 0.5\n    \
                  pwm-scanner wig -b results/utrs_scored.bed --start-offset chr7:117120000\n    \
                  pwm-scanner genbank --gbk plasmid.gbk --fasta-out plasmid.fa --bed-out plasmid.bed",
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score PWMs along the sequences of FASTA files
    Score(ScoreArgs),
    /// Convert a scored BED file into one WIG track per PWM
    Wig(WigArgs),
    /// Split a GenBank file into a FASTA sequence and a BED file of its features
    Genbank(GenbankArgs),
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Path(s) to input FASTA files with the sequences to score
    #[arg(short = 'i', long = "fasta", value_name = "FASTA", num_args = 1.., required = true)]
    pub fasta: Vec<PathBuf>,

    /// Path(s) or glob patterns of PWM files to score over the sequences
    /// At least one must match an existing file
    #[arg(short = 'm', long = "pwms", value_name = "PWM", num_args = 1.., required = true)]
    pub pwms: Vec<String>,

    /// Directory to write results
    /// Will be created if it doesn't exist
    #[arg(short = 'o', long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Suffix added to the output BED file names
    #[arg(long = "suffix", value_name = "SUFFIX", default_value = "")]
    pub suffix: String,

    /// Lower limit of a PWM score to be recorded as a hit (exclusive)
    #[arg(short = 's', long = "score-threshold", value_name = "SCORE", default_value = "0.01")]
    pub score_threshold: f64,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short = 't', long = "threads", value_name = "THREADS")]
    pub threads: Option<usize>,
}

#[derive(Args, Debug)]
pub struct WigArgs {
    /// Path to the scored BED file
    #[arg(short = 'b', long = "bed", value_name = "BED")]
    pub bed: PathBuf,

    /// Directory to write the WIG files
    #[arg(short = 'o', long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Span written in the variableStep header
    #[arg(long = "span-length", value_name = "SPAN", default_value = "1")]
    pub span: u32,

    /// Genomic coordinate of the first sequence position (chrN:position)
    #[arg(long = "start-offset", value_name = "CHROM:POS")]
    pub start_offset: String,
}

#[derive(Args, Debug)]
pub struct GenbankArgs {
    /// Path to the input GenBank (.gbk) file
    #[arg(short = 'g', long = "gbk", value_name = "GBK")]
    pub gbk: PathBuf,

    /// Path to the output FASTA file
    #[arg(long = "fasta-out", value_name = "FASTA")]
    pub fasta_out: PathBuf,

    /// Path to the output BED file
    #[arg(long = "bed-out", value_name = "BED")]
    pub bed_out: PathBuf,
}

pub fn init_verbose(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}
