//! Conversion of scored BED output into per-matrix WIG tracks.

use crate::bed::{format_score, read_scored_bed};
use crate::error::{MotifError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Parses a start offset given as `chrom:position`.
///
/// # Errors
/// * `MotifError::InvalidParameter` - if the separator is missing or the
///   position is not an integer
pub fn parse_start_offset(text: &str) -> Result<(String, i64)> {
    let (chrom, position) = text.split_once(':').ok_or_else(|| {
        MotifError::invalid_parameter("start_offset", text, "expected chrom:position")
    })?;
    if chrom.is_empty() {
        return Err(MotifError::invalid_parameter(
            "start_offset",
            text,
            "chromosome name is empty",
        ));
    }
    let offset = position.trim().parse::<i64>().map_err(|e| {
        MotifError::invalid_parameter("start_offset", text, e.to_string())
    })?;
    Ok((chrom.to_string(), offset))
}

/// Splits scored BED rows by PWM name, in order of first appearance.
pub fn split_by_matrix(df: &DataFrame) -> Result<Vec<(String, DataFrame)>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    df.partition_by_stable(["name"], true)?
        .into_iter()
        .map(|part| -> Result<(String, DataFrame)> {
            let name = part
                .column("name")?
                .str()?
                .get(0)
                .map(str::to_string)
                .ok_or_else(|| MotifError::DataError("empty matrix partition".into()))?;
            Ok((name, part))
        })
        .collect()
}

/// Writes one variableStep WIG track.
///
/// `scores` must hold an i64 "start" column and an f64 "score" column; each
/// row becomes `offset + start \t score`, the score formatted as in the
/// scored BED file.
pub fn write_wig<W: Write>(
    sink: &mut W,
    track_name: &str,
    scores: &DataFrame,
    chrom: &str,
    offset: i64,
    span: u32,
) -> Result<()> {
    writeln!(sink, "track type=wiggle_0 name=\"{}\"", track_name)?;
    writeln!(sink, "variableStep chrom={} span={}", chrom, span)?;

    let starts = scores.column("start")?.i64()?;
    let values = scores.column("score")?.f64()?;
    for (start, score) in starts.into_iter().zip(values.into_iter()) {
        if let (Some(start), Some(score)) = (start, score) {
            writeln!(sink, "{}\t{}", offset + start, format_score(score))?;
        }
    }

    Ok(())
}

/// Converts a scored BED file into one `<name>.wig` file per PWM in `out_dir`.
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - The WIG files written, in order of first
///   appearance of their PWM in the BED file
pub fn convert(
    bed_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    chrom: &str,
    offset: i64,
    span: u32,
) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let file = File::open(bed_path.as_ref())?;
    let df = read_scored_bed(BufReader::new(file))?;
    log::debug!(
        "Read {} scored windows from {}",
        df.height(),
        bed_path.as_ref().display()
    );

    let mut written = Vec::new();
    for (name, scores) in split_by_matrix(&df)? {
        let path = out_dir.join(format!("{}.wig", name));
        let mut sink = BufWriter::new(File::create(&path)?);
        write_wig(&mut sink, &name, &scores, chrom, offset, span)?;
        sink.flush()?;
        log::info!("Wrote {} ({} positions)", path.display(), scores.height());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scored_bed() -> DataFrame {
        let text = "s\t0\t6\tm2\t0.5\t.\ns\t1\t7\tm1\t0.25\t.\ns\t4\t10\tm2\t0.75\t.\n";
        read_scored_bed(Cursor::new(text)).unwrap()
    }

    #[test]
    fn test_parse_start_offset() {
        assert_eq!(
            parse_start_offset("chr7:1000").unwrap(),
            ("chr7".to_string(), 1000)
        );
        assert!(parse_start_offset("chr7").is_err());
        assert!(parse_start_offset("chr7:abc").is_err());
        assert!(parse_start_offset(":10").is_err());
    }

    #[test]
    fn test_split_by_matrix_keeps_first_appearance_order() {
        let parts = split_by_matrix(&scored_bed()).unwrap();
        let names: Vec<&str> = parts.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["m2", "m1"]);
        assert_eq!(parts[0].1.height(), 2);
        assert_eq!(parts[1].1.height(), 1);
    }

    #[test]
    fn test_write_wig() {
        let parts = split_by_matrix(&scored_bed()).unwrap();
        let (name, scores) = &parts[0];

        let mut out = Vec::new();
        write_wig(&mut out, name, scores, "chr7", 1000, 1).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "track type=wiggle_0 name=\"m2\"\nvariableStep chrom=chr7 span=1\n1000\t0.5\n1004\t0.75\n"
        );
    }

    #[test]
    fn test_write_wig_keeps_score_format() {
        let text = "s\t2\t8\tm1\t1.0\t.\ns\t3\t9\tm1\t2.5e-05\t.\n";
        let df = read_scored_bed(Cursor::new(text)).unwrap();

        let mut out = Vec::new();
        write_wig(&mut out, "m1", &df, "chr1", 10, 6).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "track type=wiggle_0 name=\"m1\"\nvariableStep chrom=chr1 span=6\n12\t1.0\n13\t2.5e-05\n"
        );
    }

    #[test]
    fn test_split_empty() {
        let df = read_scored_bed(Cursor::new("")).unwrap();
        assert!(split_by_matrix(&df).unwrap().is_empty());
    }
}
