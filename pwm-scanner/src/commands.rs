use crate::cli::{GenbankArgs, ScoreArgs, WigArgs};
use crate::ScannerError;
use pwm_score::bed::write_hits;
use pwm_score::error::MotifError;
use pwm_score::fasta::{collection_name, read_fasta};
use pwm_score::matrix::read_pwm;
use pwm_score::scoring::score_symbols;
use pwm_score::types::{Hit, Pwm};
use pwm_score::{genbank, wig};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Expands matrix path patterns into existing files, in pattern order.
///
/// # Errors
/// * `MotifError::Configuration` - if a pattern is invalid or nothing matches
pub fn expand_pwm_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, MotifError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|e| {
            MotifError::Configuration(format!("invalid PWM pattern '{}': {}", pattern, e))
        })?;
        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => log::warn!("Cannot read {}: {}", e.path().display(), e.error()),
            }
        }
    }

    if paths.is_empty() {
        return Err(MotifError::Configuration(
            "No PWM files found matching the provided patterns".into(),
        ));
    }
    Ok(paths)
}

/// Output file for a sequence collection: `<out_dir>/<name><suffix>_scored.bed`.
pub fn output_path(out_dir: &Path, fasta_path: &Path, suffix: &str) -> PathBuf {
    let suffix = if suffix.is_empty() {
        String::new()
    } else {
        format!("_{}", suffix)
    };
    out_dir.join(format!(
        "{}{}_scored.bed",
        collection_name(fasta_path),
        suffix
    ))
}

/// Scores every sequence of one FASTA file against every PWM and writes the
/// hits grouped by sequence, then by PWM. Returns the number of hits written.
pub fn score_collection(
    fasta_path: &Path,
    pwms: &[Pwm],
    output: &Path,
    threshold: f64,
) -> Result<usize, ScannerError> {
    let sequences = read_fasta(fasta_path)?;
    log::info!(
        "{} sequences to scan in {}",
        sequences.len(),
        fasta_path.display()
    );

    let mut sink = BufWriter::new(File::create(output)?);
    let mut total = 0;
    for (idx, record) in sequences.iter().enumerate() {
        let symbols: Vec<char> = record.sequence.chars().collect();
        let per_pwm: Vec<Vec<Hit>> = pwms
            .par_iter()
            .map(|pwm| score_symbols(&symbols, pwm, threshold).collect::<Vec<Hit>>())
            .collect();

        for (pwm, hits) in pwms.iter().zip(per_pwm) {
            total += write_hits(&mut sink, &record.name, pwm.name(), hits)?;
        }

        if (idx + 1) % 5000 == 0 {
            log::info!("\t{} / {} sequences scanned", idx + 1, sequences.len());
        }
    }
    sink.flush()?;

    Ok(total)
}

pub fn run_score(args: ScoreArgs) -> Result<(), ScannerError> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let pwm_paths = expand_pwm_patterns(&args.pwms)?;
    let pwms = pwm_paths
        .iter()
        .map(read_pwm)
        .collect::<Result<Vec<Pwm>, MotifError>>()?;
    log::info!("Loaded {} PWMs", pwms.len());

    fs::create_dir_all(&args.out_dir)?;

    let mut failed = 0;
    for fasta_path in &args.fasta {
        let output = output_path(&args.out_dir, fasta_path, &args.suffix);
        match score_collection(fasta_path, &pwms, &output, args.score_threshold) {
            Ok(hits) => log::info!("Wrote {} hits to {}", hits, output.display()),
            Err(e) => {
                log::error!("Failed to score {}: {}", fasta_path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(ScannerError::FailedInputs {
            failed,
            total: args.fasta.len(),
        });
    }
    Ok(())
}

pub fn run_wig(args: WigArgs) -> Result<(), ScannerError> {
    let (chrom, offset) = wig::parse_start_offset(&args.start_offset)?;
    let written = wig::convert(&args.bed, &args.out_dir, &chrom, offset, args.span)?;
    log::info!(
        "Wrote {} WIG files to {}",
        written.len(),
        args.out_dir.display()
    );
    Ok(())
}

pub fn run_genbank(args: GenbankArgs) -> Result<(), ScannerError> {
    let intervals = genbank::split(&args.gbk, &args.fasta_out, &args.bed_out)?;
    log::info!("FASTA file written to: {}", args.fasta_out.display());
    log::info!(
        "BED file written to: {} ({} intervals)",
        args.bed_out.display(),
        intervals
    );
    Ok(())
}
