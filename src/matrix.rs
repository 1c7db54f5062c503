use crate::error::{MotifError, Result};
use crate::types::{Alphabet, Pwm};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Name under which a matrix file is reported: its basename without `.txt`.
pub fn pwm_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().replace(".txt", ""))
        .unwrap_or_default()
}

/// Reads a Position Weight Matrix (PWM) from a tab-delimited file
///
/// The first row holds the alphabet symbols and every following row holds the
/// weights of one motif position. The first column of every row is a label and
/// is ignored.
///
/// ```text
/// pos	A	C	G	U
/// 1	0.7	0.1	0.1	0.1
/// 2	0.1	0.1	0.1	0.7
/// ```
///
/// # Arguments
/// * `path` - Path to the matrix file; its basename (minus `.txt`) names the PWM
///
/// # Errors
/// * `MotifError::Io` - If the file cannot be opened or read
/// * `MotifError::InvalidFileFormat` - If the file is empty, a cell is not a number,
///   or a row does not have as many cells as the header
/// * `MotifError::InvalidPwm` - If the alphabet or a weight is invalid
pub fn read_pwm(path: impl AsRef<Path>) -> Result<Pwm> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let name = pwm_name(path);
    log::debug!("Reading PWM {} from {}", name, path.display());
    parse_pwm(BufReader::new(file), name)
}

/// Parses a PWM from any buffered reader. See [`read_pwm`] for the format.
pub fn parse_pwm<R: BufRead>(reader: R, name: impl Into<String>) -> Result<Pwm> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(idx, line)| line.map(|l| (idx + 1, l)))
        .filter(|line| !matches!(line, Ok((_, l)) if l.trim().is_empty()));

    let (header_no, header) = lines
        .next()
        .transpose()?
        .ok_or_else(|| MotifError::InvalidFileFormat("Empty PWM file".into()))?;

    let alphabet = parse_header(header_no, &header)?;

    let mut weights: Vec<f64> = Vec::new();
    let mut positions = 0;
    for line in lines {
        let (line_no, line) = line?;
        let cells: Vec<&str> = line.trim_end().split('\t').skip(1).collect();
        if cells.len() != alphabet.len() {
            return Err(MotifError::format_at(
                line_no,
                format!(
                    "expected {} weights, found {}",
                    alphabet.len(),
                    cells.len()
                ),
            ));
        }
        for cell in cells {
            let value = cell.trim().parse::<f64>().map_err(|e| {
                MotifError::format_at(line_no, format!("invalid PWM value '{}': {}", cell, e))
            })?;
            weights.push(value);
        }
        positions += 1;
    }

    if positions == 0 {
        return Err(MotifError::InvalidFileFormat(
            "PWM file has no weight rows".into(),
        ));
    }

    let matrix = Array2::from_shape_vec((positions, alphabet.len()), weights)
        .map_err(|e| MotifError::DataError(e.to_string()))?;

    Pwm::new(name, alphabet, matrix)
}

fn parse_header(line_no: usize, header: &str) -> Result<Alphabet> {
    let cells: Vec<&str> = header.trim_end().split('\t').skip(1).map(str::trim).collect();
    if cells.is_empty() {
        return Err(MotifError::format_at(line_no, "header has no alphabet symbols"));
    }

    let symbols = cells
        .iter()
        .map(|cell| {
            let mut chars = cell.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) => Ok(symbol),
                _ => Err(MotifError::invalid_pwm(format!(
                    "alphabet symbol '{}' is not a single character",
                    cell
                ))),
            }
        })
        .collect::<Result<Vec<char>>>()?;

    Alphabet::new(symbols)
}
