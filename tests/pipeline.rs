use std::fs;
use std::io::Write;

use breakdancer_rust::config::Config;
use breakdancer_rust::io::OutputColumns;
use breakdancer_rust::sv::{call_svs, call_svs_from, RunParams};
use breakdancer_rust::Error;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CONFIG: &str = r#"
[options]
min_reads_per_lib = 3

[[library]]
name = "L1"
mean_insert_size = 300.0
std_insert_size = 30.0
read_length = 100
covered_reference_length = 1000000
total_reads = 20000
[library.flag_counts]
ARP_FR_big_insert = 10
"#;

fn line(name: &str, chrom: &str, pos: i32, strand: char, flag: &str) -> String {
    format!("{}\tL1\t{}\t{}\t{}\t60\t{}\t4900\t100\n", name, chrom, pos, strand, flag)
}

/// four deletion pairs on chr1 plus a normal read, then a lone pair on chr2
fn reads_tsv() -> String {
    let mut s = String::from("# query_name\tlibrary\tchrom\tpos\tstrand\tmapq\tflag\tisize\tquery_len\n");
    for (i, pos) in [100, 106, 113, 120].iter().enumerate() {
        s += &line(&format!("r{}", i), "chr1", *pos, '+', "ARP_FR_big_insert");
    }
    s += &line("n1", "chr1", 121, '+', "NORMAL_FR");
    for (i, pos) in [5000, 5006, 5013, 5020].iter().enumerate() {
        s += &line(&format!("r{}", i), "chr1", *pos, '-', "ARP_FR_big_insert");
    }
    s += &line("q0", "chr2", 10, '+', "ARP_RF");
    s += &line("q0", "chr2", 30, '-', "ARP_RF");
    s
}

fn setup(reads: &str) -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let mut f = fs::File::create(dir.path().join("reads.tsv")).unwrap();
    f.write_all(reads.as_bytes()).unwrap();
    let cfg_path = dir.path().join("breakdancer.toml");
    fs::write(&cfg_path, CONFIG).unwrap();
    let cfg = Config::from_path(&cfg_path).unwrap();
    (dir, cfg)
}

fn data_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.starts_with('#')).collect()
}

#[test]
fn calls_deletion_end_to_end() {
    let (dir, cfg) = setup(&reads_tsv());
    let out = dir.path().join("calls.tsv");
    let dump = dir.path().join("reads.dump");
    let params = RunParams {
        window: Some(500),
        columns: OutputColumns { allele_frequency: true, copy_number: false },
        dump_reads: Some(dump.clone()),
        command_line: "breakdancer-rust call".into(),
    };

    let summary = call_svs(&cfg, &dir.path().join("reads.tsv"), Some(out.as_path()), &params).unwrap();
    assert_eq!(summary.calls, 1);
    assert_eq!(summary.contigs, 2);
    assert_eq!(summary.window, 500);
    assert_eq!(summary.stats.reads_seen, 11);

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("#Software: breakdancer-rust"));
    let rows = data_lines(&text);
    assert_eq!(rows.len(), 1);
    let cols: Vec<&str> = rows[0].split('\t').collect();
    assert_eq!(&cols[..7], &["chr1", "100", "4+0-", "chr1", "5020", "0+4-", "DEL"]);
    assert_eq!(cols[7], "4600");
    assert_eq!(cols[8], "99");
    assert_eq!(&cols[9..11], &["4", "L1|4"]);
    assert_eq!(cols[11], "0.80");

    let dumped = fs::read_to_string(&dump).unwrap();
    assert_eq!(dumped.lines().count(), 8);
    assert!(dumped.lines().all(|l| l.starts_with("1\tr")));
}

#[test]
fn default_window_comes_from_libraries() {
    let (_dir, cfg) = setup("");
    let mut out = Vec::new();
    let summary = call_svs_from(&cfg, "".as_bytes(), &mut out, None, &RunParams::default()).unwrap();
    // ceil(300 + 3 * 30)
    assert_eq!(summary.window, 390);
    assert_eq!(summary.calls, 0);
    assert_eq!(data_lines(&String::from_utf8(out).unwrap()).len(), 0);
}

#[test]
fn min_read_pair_suppresses_call() {
    let (_dir, mut cfg) = setup("");
    cfg.options.min_read_pair = 5;
    let mut out = Vec::new();
    let params = RunParams { window: Some(500), ..RunParams::default() };
    let summary = call_svs_from(&cfg, reads_tsv().as_bytes(), &mut out, None, &params).unwrap();
    assert_eq!(summary.calls, 0);
    assert_eq!(summary.stats.regions_stored, 3);
}

#[test]
fn unknown_library_is_an_error() {
    let (_dir, cfg) = setup("");
    let input = "r1\tLX\tchr1\t100\t+\t60\tARP_FF\t0\t100\n";
    let err = call_svs_from(&cfg, input.as_bytes(), Vec::new(), None, &RunParams::default()).unwrap_err();
    match err {
        Error::UnknownLibrary { read, library } => assert_eq!((read.as_str(), library.as_str()), ("r1", "LX")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn unsorted_input_is_an_error() {
    let (_dir, cfg) = setup("");
    let input = format!(
        "{}{}",
        line("a", "chr1", 500, '+', "ARP_RF"),
        line("b", "chr1", 400, '+', "ARP_RF")
    );
    let err = call_svs_from(&cfg, input.as_bytes(), Vec::new(), None, &RunParams::default()).unwrap_err();
    assert!(matches!(err, Error::Unsorted(_)));
}

#[test]
fn missing_reads_file_reports_path() {
    let (dir, cfg) = setup("");
    let missing = dir.path().join("nope.tsv");
    let err = call_svs(&cfg, &missing, Some(dir.path().join("o.tsv").as_path()), &RunParams::default()).unwrap_err();
    match err {
        Error::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error {:?}", other),
    }
}
