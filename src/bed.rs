use crate::error::{MotifError, Result};
use crate::types::Hit;
use polars::prelude::*;
use std::io::{BufRead, Write};

/// Placeholder written in the strand column of scored hits.
pub const NO_STRAND: &str = ".";

/// A generic 6-column BED interval
#[derive(Debug, Clone, PartialEq)]
pub struct BedRecord {
    pub chrom: String,
    pub start: usize,
    pub end: usize,
    pub name: String,
    pub score: f64,
    pub strand: char,
}

/// Formats a score as the shortest decimal that reads back to the same value.
///
/// Plain notation always carries a fractional part (`1.0` rather than `1`).
/// Magnitudes below `1e-4` or from `1e16` up switch to exponent notation with
/// a signed, two-digit exponent (`2.5e-05`).
pub fn format_score(score: f64) -> String {
    let magnitude = score.abs();
    if score.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{:e}", score);
        if let Some((mantissa, exponent)) = text.split_once('e') {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            return format!("{}e{}{:0>2}", mantissa, sign, digits);
        }
    }

    let text = score.to_string();
    if score.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Writes scored hits of one sequence against one PWM as BED lines.
///
/// Each hit becomes `sequence_name, start, end, pwm_name, score, "."`,
/// tab-separated. Returns the number of lines written.
///
/// # Errors
/// * Returns `MotifError::Io` for writing issues
pub fn write_hits<W, I>(sink: &mut W, sequence_name: &str, pwm_name: &str, hits: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Hit>,
{
    let mut written = 0;
    for hit in hits {
        writeln!(
            sink,
            "{}\t{}\t{}\t{}\t{}\t{}",
            sequence_name,
            hit.start,
            hit.end,
            pwm_name,
            format_score(hit.score),
            NO_STRAND
        )?;
        written += 1;
    }
    Ok(written)
}

/// Writes a single BED interval.
pub fn write_interval<W: Write>(sink: &mut W, record: &BedRecord) -> Result<()> {
    writeln!(
        sink,
        "{}\t{}\t{}\t{}\t{}\t{}",
        record.chrom, record.start, record.end, record.name, record.score, record.strand
    )?;
    Ok(())
}

/// Reads a scored BED stream into a DataFrame.
///
/// # Returns
/// * `Result<DataFrame>` - A DataFrame with columns:
///   - "chrom": sequence name
///   - "start", "end": window coordinates (i64)
///   - "name": PWM name
///   - "score": match score (f64)
///
/// Blank lines and lines with fewer than six fields are skipped. When a line
/// has more than six fields, the leading extra fields belong to the sequence
/// name and are joined back with tabs.
///
/// # Errors
/// * Returns `MotifError::InvalidFileFormat` for non-numeric coordinates and scores
/// * Returns `MotifError::DataError` if DataFrame creation fails
pub fn read_scored_bed<R: BufRead>(reader: R) -> Result<DataFrame> {
    let mut chroms: Vec<String> = Vec::new();
    let mut starts: Vec<i64> = Vec::new();
    let mut ends: Vec<i64> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut scores: Vec<f64> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }
        // a sequence name rewritten from `chr:start-end` spans several fields
        let (chrom, fields) = fields.split_at(fields.len() - 5);

        let parse_coord = |field: &str| {
            field.parse::<i64>().map_err(|e| {
                MotifError::format_at(line_no, format!("invalid coordinate '{}': {}", field, e))
            })
        };
        starts.push(parse_coord(fields[0])?);
        ends.push(parse_coord(fields[1])?);
        scores.push(fields[3].parse::<f64>().map_err(|e| {
            MotifError::format_at(line_no, format!("invalid score '{}': {}", fields[3], e))
        })?);
        chroms.push(chrom.join("\t"));
        names.push(fields[2].to_string());
    }

    let df = DataFrame::new(vec![
        Column::new("chrom".into(), chroms),
        Column::new("start".into(), starts),
        Column::new("end".into(), ends),
        Column::new("name".into(), names),
        Column::new("score".into(), scores),
    ])?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_write_hits() {
        let hits = vec![
            Hit {
                start: 0,
                end: 2,
                score: 0.125,
            },
            Hit {
                start: 2,
                end: 4,
                score: 1.0,
            },
        ];
        let mut out = Vec::new();
        let written = write_hits(&mut out, "chr1\t100\t200", "HNRNPA1", hits).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "chr1\t100\t200\t0\t2\tHNRNPA1\t0.125\t.\nchr1\t100\t200\t2\t4\tHNRNPA1\t1.0\t.\n"
        );
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.125), "0.125");
        assert_eq!(format_score(1.0), "1.0");
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(0.0001), "0.0001");
    }

    #[test]
    fn test_format_score_exponent() {
        assert_eq!(format_score(2.6903532309117222e-05), "2.6903532309117222e-05");
        assert_eq!(format_score(1e-5), "1e-05");
        assert_eq!(format_score(3.5e-123), "3.5e-123");
        assert_eq!(format_score(-7.25e-6), "-7.25e-06");
        assert_eq!(format_score(1e16), "1e+16");
        assert_eq!(format_score(9999999999999998.0), "9999999999999998.0");
    }

    #[test]
    fn test_write_interval() {
        let record = BedRecord {
            chrom: "NC_001".into(),
            start: 9,
            end: 30,
            name: "lacZ".into(),
            score: 0.0,
            strand: '-',
        };
        let mut out = Vec::new();
        write_interval(&mut out, &record).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "NC_001\t9\t30\tlacZ\t0\t-\n");
    }

    #[test]
    fn test_read_scored_bed() {
        let text = "seq1\t0\t6\tm1\t0.5\t.\n\nshort\tline\nseq1\t3\t9\tm2\t0.25\t.\n";
        let df = read_scored_bed(Cursor::new(text)).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 5);
        let scores = df.column("score").unwrap().f64().unwrap();
        assert_eq!(scores.get(1), Some(0.25));
        let names = df.column("name").unwrap().str().unwrap();
        assert_eq!(names.get(0), Some("m1"));
    }

    #[test]
    fn test_read_scored_bed_region_names() {
        let text = "chr1\t100\t200\t0\t6\tm1\t0.5\t.\n";
        let df = read_scored_bed(Cursor::new(text)).unwrap();
        let chroms = df.column("chrom").unwrap().str().unwrap();
        assert_eq!(chroms.get(0), Some("chr1\t100\t200"));
        let starts = df.column("start").unwrap().i64().unwrap();
        assert_eq!(starts.get(0), Some(0));
    }

    #[test]
    fn test_read_scored_bed_rejects_bad_lines() {
        let bad_score = "seq1\t0\t6\tm1\thigh\t.\n";
        assert!(matches!(
            read_scored_bed(Cursor::new(bad_score)),
            Err(MotifError::InvalidFileFormat(_))
        ));
    }
}
