use crate::error::{MotifError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use std::collections::HashMap;

/// Ordered set of single-character symbols naming the columns of a PWM.
///
/// Resolves a symbol to its column index through a lookup table built once
/// at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Alphabet {
    symbols: Vec<char>,
    columns: HashMap<char, usize>,
}

impl Alphabet {
    /// Builds an alphabet from its symbols in column order.
    ///
    /// # Errors
    /// * `MotifError::InvalidPwm` - if the alphabet is empty or a symbol repeats
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self> {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(MotifError::invalid_pwm("alphabet has no symbols"));
        }

        let mut columns = HashMap::with_capacity(symbols.len());
        for (idx, &symbol) in symbols.iter().enumerate() {
            if columns.insert(symbol, idx).is_some() {
                return Err(MotifError::invalid_pwm(format!(
                    "duplicate alphabet symbol '{}'",
                    symbol
                )));
            }
        }

        Ok(Alphabet { symbols, columns })
    }

    /// Column index of `symbol`, or `None` when the symbol is not part of the alphabet.
    #[inline]
    pub fn column(&self, symbol: char) -> Option<usize> {
        self.columns.get(&symbol).copied()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Represents a Position Weight Matrix (PWM)
///
/// Rows are motif positions, columns follow the order of the attached
/// [`Alphabet`]. Weights are non-negative and need not sum to one.
#[derive(Debug, Clone)]
pub struct Pwm {
    name: String,
    alphabet: Alphabet,
    matrix: Array2<f64>,
    row_min: Vec<f64>,
    row_max: Vec<f64>,
}

impl Pwm {
    /// Creates a PWM from a weight matrix and its column alphabet.
    ///
    /// # Errors
    /// * `MotifError::InvalidInput` - if the matrix has no rows or its column
    ///   count differs from the alphabet length
    /// * `MotifError::InvalidPwm` - if any weight is negative or NaN
    pub fn new(name: impl Into<String>, alphabet: Alphabet, matrix: Array2<f64>) -> Result<Self> {
        if matrix.nrows() == 0 {
            return Err(MotifError::InvalidInput("PWM has no positions".into()));
        }
        if matrix.ncols() != alphabet.len() {
            return Err(MotifError::InvalidInput(format!(
                "PWM has {} columns but the alphabet has {} symbols",
                matrix.ncols(),
                alphabet.len()
            )));
        }
        if let Some(((row, col), value)) = matrix
            .indexed_iter()
            .find(|(_, v)| v.is_nan() || **v < 0.0)
        {
            return Err(MotifError::invalid_pwm(format!(
                "weight {} at position {}, symbol '{}' is not a non-negative number",
                value,
                row,
                alphabet.symbols()[col]
            )));
        }

        let row_min = matrix
            .axis_iter(Axis(0))
            .map(|row| row.fold(f64::INFINITY, |acc, &v| acc.min(v)))
            .collect();
        let row_max = matrix
            .axis_iter(Axis(0))
            .map(|row| row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)))
            .collect();

        Ok(Pwm {
            name: name.into(),
            alphabet,
            matrix,
            row_min,
            row_max,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Motif length, i.e. the number of positions.
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    pub fn row(&self, position: usize) -> ArrayView1<'_, f64> {
        self.matrix.row(position)
    }

    /// Smallest weight of each position.
    pub fn row_min(&self) -> &[f64] {
        &self.row_min
    }

    /// Largest weight of each position.
    pub fn row_max(&self) -> &[f64] {
        &self.row_max
    }
}

/// A named sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        SequenceRecord {
            name: name.into(),
            sequence: sequence.into(),
        }
    }
}

/// Collection of sequences in order of first appearance of their names.
///
/// Inserting a name that is already present replaces its sequence but keeps
/// the original position.
#[derive(Debug, Clone, Default)]
pub struct SequenceCollection {
    records: Vec<SequenceRecord>,
    index: HashMap<String, usize>,
}

impl SequenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, returning the sequence it replaced, if any.
    pub fn insert(&mut self, record: SequenceRecord) -> Option<String> {
        match self.index.get(&record.name).copied() {
            Some(idx) => Some(std::mem::replace(
                &mut self.records[idx].sequence,
                record.sequence,
            )),
            None => {
                self.index.insert(record.name.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&idx| self.records[idx].sequence.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a SequenceCollection {
    type Item = &'a SequenceRecord;
    type IntoIter = std::slice::Iter<'a, SequenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A scored motif window `[start, end)` on a sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub start: usize,
    pub end: usize,
    pub score: f64,
}
