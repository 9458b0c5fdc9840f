use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use breakdancer_rust::config::Config;
use breakdancer_rust::io::OutputColumns;
use breakdancer_rust::sv::{self, RunParams};

// jemalloc：替换默认 allocator，仅在非 Windows 平台启用
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "breakdancer-rust",
    author,
    version,
    about = "Structural variant caller inspired by BreakDancer",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Call structural variants from classified, coordinate-sorted read pairs
    Call {
        /// TOML config with [options] and [[library]] tables
        #[arg(short, long)]
        config: PathBuf,
        /// Classified reads (TSV)
        #[arg(short, long)]
        reads: PathBuf,
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Region window size; defaults to the largest library uppercutoff
        #[arg(short, long)]
        window: Option<i32>,
        #[arg(long = "min-map-qual")]
        min_map_qual: Option<u8>,
        #[arg(long = "min-read-pair")]
        min_read_pair: Option<u32>,
        #[arg(long = "min-reads-per-lib")]
        min_reads_per_lib: Option<u32>,
        #[arg(long = "score-threshold")]
        score_threshold: Option<i32>,
        #[arg(long = "buffer-size")]
        buffer_size: Option<usize>,
        /// Only detect transchromosomal rearrangements
        #[arg(long)]
        transchr: bool,
        /// Add an Allele_frequency column
        #[arg(long = "print-af")]
        print_af: bool,
        /// Add a copy_number_lib column
        #[arg(long = "copy-number")]
        copy_number: bool,
        /// Write supporting reads of every call to this file
        #[arg(long = "dump-reads")]
        dump_reads: Option<PathBuf>,
    },
    /// Print the validated library table and the derived window size
    Libraries {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Call {
            config,
            reads,
            out,
            window,
            min_map_qual,
            min_read_pair,
            min_reads_per_lib,
            score_threshold,
            buffer_size,
            transchr,
            print_af,
            copy_number,
            dump_reads,
        } => {
            let mut cfg = load_config(&config)?;
            let o = &mut cfg.options;
            if let Some(v) = min_map_qual {
                o.min_map_qual = v;
            }
            if let Some(v) = min_read_pair {
                o.min_read_pair = v;
            }
            if let Some(v) = min_reads_per_lib {
                o.min_reads_per_lib = v;
            }
            if let Some(v) = score_threshold {
                o.score_threshold = v;
            }
            if let Some(v) = buffer_size {
                o.buffer_size = v;
            }
            o.transchr_rearrange |= transchr;

            let params = RunParams {
                window,
                columns: OutputColumns { allele_frequency: print_af, copy_number },
                dump_reads,
                command_line: std::env::args().collect::<Vec<_>>().join(" "),
            };
            let summary = sv::call_svs(&cfg, &reads, out.as_deref(), &params)
                .with_context(|| format!("SV calling failed on '{}'", reads.display()))?;
            log::info!(
                "{} calls on {} chromosomes (window {})",
                summary.calls,
                summary.contigs,
                summary.window
            );
            Ok(())
        }
        Commands::Libraries { config } => run_libraries(&config),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::from_path(path).with_context(|| format!("cannot load config '{}'", path.display()))
}

fn run_libraries(path: &Path) -> Result<()> {
    let cfg = load_config(path)?;
    let libs = cfg.library_table().context("invalid library table")?;

    println!("#name\tmean\tstd\tuppercutoff\treadlen\tmin_mapq\tcovered_ref\tread_density");
    for lib in libs.iter() {
        println!(
            "{}\t{:.2}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{:.6}",
            lib.name,
            lib.mean_insert_size,
            lib.std_insert_size,
            lib.uppercutoff(),
            lib.read_length,
            lib.min_mapping_quality.unwrap_or(cfg.options.min_map_qual),
            lib.covered_reference_length,
            lib.read_density()
        );
    }
    println!("window_size: {}", cfg.default_window_size(&libs));
    Ok(())
}
