//! Splitting of a GenBank record into a FASTA sequence and a BED file of its
//! annotated features.

use crate::bed::{write_interval, BedRecord};
use crate::error::{MotifError, Result};
use crate::fasta::write_fasta;
use crate::types::SequenceRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Column at which feature locations and qualifiers start.
const FEATURE_TEXT_COLUMN: usize = 21;
/// Line width of the FASTA sequence written by [`split`].
pub const FASTA_LINE_WIDTH: usize = 60;
/// Qualifiers consulted, in order, to name a feature.
const NAME_QUALIFIERS: [&str; 3] = ["label", "gene", "locus_tag"];
/// Feature types written once per location segment.
const SEGMENTED_FEATURES: [&str; 2] = ["mRNA", "CDS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
    Mixed,
}

impl Strand {
    fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            Strand::Mixed => Strand::Mixed,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Mixed => '.',
        }
    }
}

/// A feature location as 0-based, half-open segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub segments: Vec<(usize, usize)>,
    pub strand: Strand,
}

impl Location {
    /// Smallest start and largest end over all segments.
    pub fn span(&self) -> (usize, usize) {
        let start = self.segments.iter().map(|s| s.0).min().unwrap_or(0);
        let end = self.segments.iter().map(|s| s.1).max().unwrap_or(0);
        (start, end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub kind: String,
    pub location: String,
    pub qualifiers: Vec<(String, String)>,
}

impl Feature {
    /// First value of qualifier `key`.
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The feature's label, gene or locus tag, whichever comes first.
    pub fn display_name(&self) -> &str {
        NAME_QUALIFIERS
            .iter()
            .find_map(|key| self.qualifier(key))
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenBankRecord {
    pub locus: String,
    pub id: String,
    pub definition: String,
    pub features: Vec<Feature>,
    pub sequence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Definition,
    Features,
    Origin,
    Other,
}

/// Parses the first record of a GenBank flat file.
///
/// The record id is the `VERSION` accession, falling back to `ACCESSION` and
/// then to the `LOCUS` name. The sequence is upper-cased.
///
/// # Errors
/// * `MotifError::InvalidFileFormat` - if there is no `LOCUS` line or a
///   feature table line is malformed
pub fn parse_genbank<R: BufRead>(reader: R) -> Result<GenBankRecord> {
    let mut record = GenBankRecord::default();
    let mut accession = String::new();
    let mut version = String::new();
    let mut section = Section::Header;
    let mut seen_locus = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        let line_no = idx + 1;

        if line.starts_with("//") {
            if seen_locus {
                break;
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }

        if !line.starts_with(' ') {
            let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            section = match keyword {
                "LOCUS" => {
                    seen_locus = true;
                    record.locus = rest.split_whitespace().next().unwrap_or("").to_string();
                    Section::Header
                }
                "DEFINITION" => {
                    record.definition = rest.to_string();
                    Section::Definition
                }
                "ACCESSION" => {
                    accession = rest.split_whitespace().next().unwrap_or("").to_string();
                    Section::Other
                }
                "VERSION" => {
                    version = rest.split_whitespace().next().unwrap_or("").to_string();
                    Section::Other
                }
                "FEATURES" => Section::Features,
                "ORIGIN" => Section::Origin,
                _ => Section::Other,
            };
            if !seen_locus {
                return Err(MotifError::format_at(line_no, "expected a LOCUS line"));
            }
            continue;
        }

        match section {
            Section::Definition => {
                record.definition.push(' ');
                record.definition.push_str(line.trim());
            }
            Section::Features => parse_feature_line(&mut record.features, line, line_no)?,
            Section::Origin => record.sequence.extend(
                line.chars()
                    .filter(|c| c.is_ascii_alphabetic())
                    .map(|c| c.to_ascii_uppercase()),
            ),
            Section::Header | Section::Other => {}
        }
    }

    if !seen_locus {
        return Err(MotifError::InvalidFileFormat(
            "No GenBank record found".into(),
        ));
    }

    if let Some(stripped) = record.definition.strip_suffix('.') {
        record.definition = stripped.to_string();
    }
    record.id = [version, accession, record.locus.clone()]
        .into_iter()
        .find(|id| !id.is_empty())
        .unwrap_or_default();

    for feature in &mut record.features {
        for (_, value) in &mut feature.qualifiers {
            *value = unquote(value);
        }
    }

    Ok(record)
}

fn parse_feature_line(features: &mut Vec<Feature>, line: &str, line_no: usize) -> Result<()> {
    let indent = line.len() - line.trim_start().len();

    // new feature: key at column 5, location at column 21
    if indent < FEATURE_TEXT_COLUMN {
        let mut parts = line.split_whitespace();
        let kind = parts.next().unwrap_or_default();
        let location: String = parts.collect();
        features.push(Feature {
            kind: kind.to_string(),
            location,
            qualifiers: Vec::new(),
        });
        return Ok(());
    }

    let feature = features
        .last_mut()
        .ok_or_else(|| MotifError::format_at(line_no, "qualifier outside of a feature"))?;
    let text = line.trim();

    if let Some((key, raw)) = feature.qualifiers.last_mut() {
        if is_open_quote(raw) {
            if key.as_str() != "translation" {
                raw.push(' ');
            }
            raw.push_str(text);
            return Ok(());
        }
    }

    if let Some(qualifier) = text.strip_prefix('/') {
        let (key, value) = qualifier.split_once('=').unwrap_or((qualifier, ""));
        feature
            .qualifiers
            .push((key.to_string(), value.to_string()));
    } else if feature.qualifiers.is_empty() {
        feature.location.push_str(&text.replace(' ', ""));
    } else if let Some((_, raw)) = feature.qualifiers.last_mut() {
        raw.push(' ');
        raw.push_str(text);
    }

    Ok(())
}

fn is_open_quote(raw: &str) -> bool {
    raw.starts_with('"') && (raw.len() == 1 || !raw.ends_with('"'))
}

fn unquote(raw: &str) -> String {
    raw.strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw)
        .replace("\"\"", "\"")
}

/// Parses a GenBank location string into 0-based, half-open segments.
///
/// Supports `a..b` (with `<` and `>` partial ends), single bases, `a^b`
/// sites, and nested `complement(..)`, `join(..)` and `order(..)`.
///
/// # Example
/// ```
/// use pwm_score::genbank::{parse_location, Strand};
///
/// let loc = parse_location("complement(join(10..20,30..>40))").unwrap();
/// assert_eq!(loc.segments, vec![(29, 40), (9, 20)]);
/// assert_eq!(loc.strand, Strand::Reverse);
/// ```
pub fn parse_location(text: &str) -> Result<Location> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    parse_location_expr(&compact).ok_or_else(|| {
        MotifError::InvalidFileFormat(format!("unsupported feature location '{}'", text))
    })
}

fn parse_location_expr(text: &str) -> Option<Location> {
    if let Some(inner) = strip_call(text, "complement") {
        let mut location = parse_location_expr(inner)?;
        location.segments.reverse();
        location.strand = location.strand.flip();
        return Some(location);
    }

    if let Some(inner) = strip_call(text, "join").or_else(|| strip_call(text, "order")) {
        let parts = split_top_level(inner)
            .into_iter()
            .map(parse_location_expr)
            .collect::<Option<Vec<Location>>>()?;
        let first = parts.first()?.strand;
        let strand = if parts.iter().all(|p| p.strand == first) {
            first
        } else {
            Strand::Mixed
        };
        return Some(Location {
            segments: parts.into_iter().flat_map(|p| p.segments).collect(),
            strand,
        });
    }

    parse_range(text).map(|segment| Location {
        segments: vec![segment],
        strand: Strand::Forward,
    })
}

fn strip_call<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    text.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[last..idx]);
                last = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[last..]);
    parts
}

fn parse_position(text: &str) -> Option<usize> {
    text.trim_start_matches(['<', '>']).parse::<usize>().ok()
}

fn parse_range(text: &str) -> Option<(usize, usize)> {
    if let Some((start, end)) = text.split_once("..") {
        let start = parse_position(start)?;
        let end = parse_position(end)?;
        if start == 0 || end < start {
            return None;
        }
        return Some((start - 1, end));
    }
    if let Some((before, after)) = text.split_once('^') {
        // a site between two bases has no extent
        let before = parse_position(before)?;
        parse_position(after)?;
        return Some((before, before));
    }
    let position = parse_position(text)?;
    if position == 0 {
        return None;
    }
    Some((position - 1, position))
}

/// BED intervals for every feature of `record`.
///
/// `mRNA` and `CDS` features give one interval per location segment; every
/// other feature gives its overall span. Features with an unsupported location
/// are skipped with a warning.
pub fn feature_intervals(record: &GenBankRecord) -> Vec<BedRecord> {
    let mut intervals = Vec::new();
    for feature in &record.features {
        let location = match parse_location(&feature.location) {
            Ok(location) => location,
            Err(e) => {
                log::warn!("Skipping feature {}: {}", feature.display_name(), e);
                continue;
            }
        };

        let interval = |(start, end): (usize, usize)| BedRecord {
            chrom: record.id.clone(),
            start,
            end,
            name: feature.display_name().to_string(),
            score: 0.0,
            strand: location.strand.symbol(),
        };

        if SEGMENTED_FEATURES.contains(&feature.kind.as_str()) {
            intervals.extend(location.segments.iter().copied().map(interval));
        } else {
            intervals.push(interval(location.span()));
        }
    }
    intervals
}

/// Writes the sequence of the GenBank record in `gbk_path` to `fasta_out` and
/// its features to `bed_out`.
///
/// # Returns
/// * `Result<usize>` - The number of BED intervals written
pub fn split(
    gbk_path: impl AsRef<Path>,
    fasta_out: impl AsRef<Path>,
    bed_out: impl AsRef<Path>,
) -> Result<usize> {
    let record = parse_genbank(BufReader::new(File::open(gbk_path.as_ref())?))?;
    log::debug!(
        "Parsed GenBank record {} ({} bp, {} features)",
        record.id,
        record.sequence.len(),
        record.features.len()
    );

    let header = if record.definition.is_empty() {
        record.id.clone()
    } else {
        format!("{} {}", record.id, record.definition)
    };
    let mut fasta = BufWriter::new(File::create(fasta_out.as_ref())?);
    write_fasta(
        &mut fasta,
        [&SequenceRecord::new(header, record.sequence.as_str())],
        FASTA_LINE_WIDTH,
    )?;
    fasta.flush()?;

    let intervals = feature_intervals(&record);
    let mut bed = BufWriter::new(File::create(bed_out.as_ref())?);
    for interval in &intervals {
        write_interval(&mut bed, interval)?;
    }
    bed.flush()?;

    Ok(intervals.len())
}
