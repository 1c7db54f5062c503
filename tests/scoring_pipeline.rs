use approx::assert_relative_eq;
use pwm_score::bed::{read_scored_bed, write_hits};
use pwm_score::error::MotifError;
use pwm_score::{fasta, genbank, matrix, scoring, wig};
use std::fs::{self, File};
use std::io::BufReader;
use tempfile::tempdir;

fn score_fixture() -> String {
    let sequences = fasta::read_fasta("tests/data/utrs.fasta").unwrap();
    let pwms = vec![
        matrix::read_pwm("tests/data/AU_dimer.txt").unwrap(),
        matrix::read_pwm("tests/data/GG_spaced.txt").unwrap(),
    ];

    let mut out = Vec::new();
    for record in &sequences {
        for pwm in &pwms {
            let hits = scoring::score(&record.sequence, pwm, 0.01);
            write_hits(&mut out, &record.name, pwm.name(), hits).unwrap();
        }
    }
    String::from_utf8(out).unwrap()
}

#[test]
fn test_read_fixtures() {
    let sequences = fasta::read_fasta("tests/data/utrs.fasta").unwrap();
    assert_eq!(sequences.len(), 3);
    assert_eq!(sequences.get("chr7\t100\t110"), Some("ACGUAGGAUU"));

    let pwm = matrix::read_pwm("tests/data/GG_spaced.txt").unwrap();
    assert_eq!(pwm.name(), "GG_spaced");
    assert_eq!(pwm.len(), 3);

    // test file does not exist
    assert!(matches!(
        fasta::read_fasta("tests/data/nonexistent.fasta"),
        Err(MotifError::Io(_))
    ));
}

#[test]
fn test_score_fixtures() {
    let text = score_fixture();
    let rows: Vec<Vec<&str>> = text.lines().map(|l| l.split('\t').collect()).collect();

    // grouped by sequence, then by matrix, in increasing window order
    let windows: Vec<(&str, &str, &str)> = rows.iter().map(|r| (r[5], r[3], r[4])).collect();
    assert_eq!(
        windows,
        vec![
            ("AU_dimer", "0", "2"),
            ("AU_dimer", "2", "4"),
            ("AU_dimer", "4", "6"),
            ("AU_dimer", "7", "9"),
            ("AU_dimer", "8", "10"),
            ("GG_spaced", "1", "4"),
            ("GG_spaced", "2", "5"),
            ("GG_spaced", "4", "7"),
            ("GG_spaced", "5", "8"),
            ("GG_spaced", "6", "9"),
        ]
    );

    for row in &rows {
        assert_eq!(row.len(), 8);
        assert_eq!(&row[..3], &["chr7", "100", "110"]);
        assert_eq!(row[7], ".");
        let score: f64 = row[6].parse().unwrap();
        assert!(score > 0.01 && score <= 1.0);
    }

    let consensus: f64 = rows[3][6].parse().unwrap();
    assert_relative_eq!(consensus, 1.0, epsilon = 1e-12);
    let partial: f64 = rows[5][6].parse().unwrap();
    assert_relative_eq!(partial, 0.125, epsilon = 1e-12);
}

#[test]
fn test_scored_bed_to_wig() {
    let dir = tempdir().unwrap();
    let bed_path = dir.path().join("utrs_scored.bed");
    fs::write(&bed_path, score_fixture()).unwrap();

    let df = read_scored_bed(BufReader::new(File::open(&bed_path).unwrap())).unwrap();
    assert_eq!(df.height(), 10);

    let out_dir = dir.path().join("wig");
    let written = wig::convert(&bed_path, &out_dir, "chr7", 100, 1).unwrap();
    assert_eq!(
        written,
        vec![out_dir.join("AU_dimer.wig"), out_dir.join("GG_spaced.wig")]
    );

    let track = fs::read_to_string(out_dir.join("AU_dimer.wig")).unwrap();
    let lines: Vec<&str> = track.lines().collect();
    assert_eq!(lines[0], "track type=wiggle_0 name=\"AU_dimer\"");
    assert_eq!(lines[1], "variableStep chrom=chr7 span=1");
    let positions: Vec<&str> = lines[2..]
        .iter()
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(positions, vec!["100", "102", "104", "107", "108"]);
}

#[test]
fn test_genbank_split() {
    let dir = tempdir().unwrap();
    let gbk = dir.path().join("tiny.gbk");
    fs::write(
        &gbk,
        "LOCUS       tiny                      12 bp    DNA     linear   SYN\n\
         DEFINITION  Tiny record.\n\
         VERSION     TINY.2\n\
         FEATURES             Location/Qualifiers\n\
         \x20    gene            2..11\n\
         \x20                    /gene=\"tnyA\"\n\
         \x20    CDS             join(2..4,8..11)\n\
         \x20                    /gene=\"tnyA\"\n\
         ORIGIN\n\
         \x20       1 atgaaatttg gg\n\
         //\n",
    )
    .unwrap();

    let fasta_out = dir.path().join("tiny.fa");
    let bed_out = dir.path().join("tiny.bed");
    let intervals = genbank::split(&gbk, &fasta_out, &bed_out).unwrap();
    assert_eq!(intervals, 3);

    assert_eq!(
        fs::read_to_string(&fasta_out).unwrap(),
        ">TINY.2 Tiny record\nATGAAATTTGGG\n"
    );
    assert_eq!(
        fs::read_to_string(&bed_out).unwrap(),
        "TINY.2\t1\t11\ttnyA\t0\t+\nTINY.2\t1\t4\ttnyA\t0\t+\nTINY.2\t7\t11\ttnyA\t0\t+\n"
    );

    // the written FASTA feeds straight back into scoring
    let sequences = fasta::read_fasta(&fasta_out).unwrap();
    assert_eq!(sequences.get("TINY.2 Tiny record"), Some("AUGAAAUUUGGG"));
}
