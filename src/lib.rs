//! Sliding-window PWM motif scoring of nucleotide sequences, with FASTA, BED,
//! WIG and GenBank helpers

pub mod bed;
pub mod error;
pub mod fasta;
pub mod genbank;
pub mod matrix;
pub mod scoring;
pub mod types;
pub mod wig;
