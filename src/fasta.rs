use crate::error::{MotifError, Result};
use crate::types::{SequenceCollection, SequenceRecord};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Name of a sequence collection, used to name its output files: the basename
/// with `.fasta` and then `.fa` removed.
pub fn collection_name(path: &Path) -> String {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .replace(".fasta", "")
                .replace(".fa", "")
        })
        .unwrap_or_default()
}

/// Rewrites a FASTA header so that an embedded region such as `chr1:100-200`
/// becomes tab-separated fields (`chr1\t100\t200`).
pub fn header_to_name(header: &str) -> String {
    header.replace([':', '-'], "\t")
}

/// Reads sequences from a FASTA format file.
///
/// # Arguments
/// * `path` - Path to the FASTA file to read
///
/// # Returns
/// * `Result<SequenceCollection>` - Sequences keyed by their rewritten header
///   (see [`header_to_name`]), with every `T` replaced by `U`
///
/// # Errors
/// * Returns `MotifError::InvalidFileFormat` if sequence data precedes the first header
/// * Returns `MotifError::Io` for file reading issues
pub fn read_fasta(path: impl AsRef<Path>) -> Result<SequenceCollection> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let sequences = parse_fasta(BufReader::new(file))?;
    log::debug!(
        "Read {} sequences from {}",
        sequences.len(),
        path.display()
    );
    Ok(sequences)
}

/// Parses FASTA records from any buffered reader. See [`read_fasta`].
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<SequenceCollection> {
    let mut sequences = SequenceCollection::new();

    let mut current_header: Option<String> = None;
    let mut current_sequence = String::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if let Some(header) = line.strip_prefix('>') {
            if let Some(name) = current_header.take() {
                push_record(&mut sequences, name, &current_sequence);
                current_sequence.clear();
            }
            current_header = Some(header_to_name(header));
        } else if !line.is_empty() {
            if current_header.is_none() {
                return Err(MotifError::format_at(
                    idx + 1,
                    "sequence data before the first '>' header",
                ));
            }
            current_sequence.push_str(line);
        }
    }

    if let Some(name) = current_header {
        push_record(&mut sequences, name, &current_sequence);
    }

    Ok(sequences)
}

fn push_record(sequences: &mut SequenceCollection, name: String, sequence: &str) {
    if name.is_empty() {
        log::warn!("Skipping FASTA record with an empty header");
        return;
    }
    let record = SequenceRecord::new(name, sequence.replace('T', "U"));
    if sequences.insert(record).is_some() {
        log::warn!("Duplicate FASTA header, keeping the last sequence");
    }
}

/// Writes sequences in FASTA format, wrapping sequence lines at `width`
/// characters (`0` disables wrapping).
///
/// # Errors
/// * Returns `MotifError::Io` for writing issues
pub fn write_fasta<'a, W, I>(sink: &mut W, records: I, width: usize) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    for record in records {
        writeln!(sink, ">{}", record.name)?;
        if width == 0 || record.sequence.is_empty() {
            writeln!(sink, "{}", record.sequence)?;
            continue;
        }
        for chunk in record.sequence.as_bytes().chunks(width) {
            sink.write_all(chunk)?;
            sink.write_all(b"\n")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_fasta() {
        let text = ">seq1\nACGT\nTTAA\n\n>chr1:100-200\nggTT\n";
        let seqs = parse_fasta(Cursor::new(text)).unwrap();

        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs.get("seq1"), Some("ACGUUUAA"));
        // no case folding, only upper-case T is rewritten
        assert_eq!(seqs.get("chr1\t100\t200"), Some("ggUU"));
    }

    #[test]
    fn test_record_order_is_preserved() {
        let text = ">b\nA\n>a\nC\n>c\nG\n";
        let seqs = parse_fasta(Cursor::new(text)).unwrap();
        let names: Vec<&str> = seqs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_data_before_header() {
        let err = parse_fasta(Cursor::new("ACGT\n>seq\nACGT\n")).unwrap_err();
        assert!(matches!(err, MotifError::InvalidFileFormat(_)));
    }

    #[test]
    fn test_empty_records() {
        let seqs = parse_fasta(Cursor::new(">empty\n>\nACGU\n")).unwrap();
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs.get("empty"), Some(""));

        assert!(parse_fasta(Cursor::new("")).unwrap().is_empty());
    }

    #[test]
    fn test_write_fasta_wraps_lines() {
        let records = vec![
            SequenceRecord::new("one", "ACGUACGUAC"),
            SequenceRecord::new("two", "GG"),
        ];
        let mut out = Vec::new();
        write_fasta(&mut out, &records, 4).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ">one\nACGU\nACGU\nAC\n>two\nGG\n"
        );
    }

    #[test]
    fn test_collection_name() {
        assert_eq!(collection_name(Path::new("data/utr.fasta")), "utr");
        assert_eq!(collection_name(Path::new("utr.fa")), "utr");
        assert_eq!(collection_name(Path::new("utr.fa.gz")), "utr.gz");
    }
}
