//! 结构变异检测引擎及其文件级驱动。

pub mod builder;
pub mod call;
pub mod engine;
pub mod links;
pub mod score;
pub mod store;

pub use builder::{BuiltSv, SvBuilder};
pub use call::{Breakpoint, SvCall, SvType};
pub use engine::{BreakDancer, EngineStats};
pub use links::{ConnectionGraph, ReadRegionMap};
pub use store::{RegionId, RegionStore};

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{Config, LibraryTable};
use crate::error::{Error, Result};
use crate::io::{OutputColumns, ReadDumpWriter, ReadsReader, SvWriter};
use crate::model::ContigTable;

/// 一次运行中不属于 `[options]` 的参数
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    /// 覆盖由文库推导出的窗口大小
    pub window: Option<i32>,
    pub columns: OutputColumns,
    pub dump_reads: Option<PathBuf>,
    /// 写入 `#Command` 头部行
    pub command_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub window: i32,
    pub calls: usize,
    pub contigs: usize,
    pub stats: EngineStats,
}

pub fn call_svs(config: &Config, reads_path: &Path, out_path: Option<&Path>, params: &RunParams) -> Result<RunSummary> {
    let fh = File::open(reads_path).map_err(|e| Error::io(e, reads_path))?;
    let input = BufReader::new(fh);

    let output: Box<dyn Write> = match out_path {
        Some(p) => Box::new(BufWriter::new(File::create(p).map_err(|e| Error::io(e, p))?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let dump: Option<Box<dyn Write>> = match &params.dump_reads {
        Some(p) => Some(Box::new(BufWriter::new(File::create(p).map_err(|e| Error::io(e, p))?))),
        None => None,
    };

    call_svs_from(config, input, output, dump, params)
}

/// 与 [`call_svs`] 相同，但读写任意流
pub fn call_svs_from<R: BufRead, W: Write>(
    config: &Config,
    input: R,
    output: W,
    dump: Option<Box<dyn Write>>,
    params: &RunParams,
) -> Result<RunSummary> {
    let libs = config.library_table()?;
    let window = params.window.unwrap_or_else(|| config.default_window_size(&libs));
    info!(
        "{} libraries, window size {}, min read pairs {}{}",
        libs.len(),
        window,
        config.options.min_read_pair,
        if config.options.transchr_rearrange { ", transchromosomal mode" } else { "" }
    );

    let mut reader = ReadsReader::new(input);
    let mut writer = SvWriter::new(output, params.columns);
    writer.write_header(&params.command_line, &libs)?;
    let mut dump = dump.map(ReadDumpWriter::new);

    let mut engine = BreakDancer::new(&config.options, &libs, window);
    while let Some(read) = reader.next_record()? {
        check_library(&libs, &read.query_name, &read.library)?;
        engine.push_read(read);
        drain_calls(&mut engine, &mut writer, dump.as_mut(), reader.contigs())?;
    }
    engine.process_final_region();
    drain_calls(&mut engine, &mut writer, dump.as_mut(), reader.contigs())?;

    writer.flush()?;
    if let Some(d) = dump.as_mut() {
        d.flush()?;
    }

    let stats = engine.stats().clone();
    info!(
        "done: {} reads ({} counted), {} regions stored, {} discarded, {} calls",
        stats.reads_seen,
        stats.reads_counted,
        stats.regions_stored,
        stats.regions_discarded,
        writer.calls_written()
    );
    Ok(RunSummary { window, calls: writer.calls_written(), contigs: reader.contigs().len(), stats })
}

fn check_library(libs: &LibraryTable, read: &str, library: &str) -> Result<()> {
    if libs.contains(library) {
        Ok(())
    } else {
        Err(Error::UnknownLibrary { read: read.to_string(), library: library.to_string() })
    }
}

fn drain_calls<W: Write>(
    engine: &mut BreakDancer<'_>,
    writer: &mut SvWriter<W>,
    mut dump: Option<&mut ReadDumpWriter<Box<dyn Write>>>,
    contigs: &ContigTable,
) -> Result<()> {
    for call in engine.take_calls() {
        writer.write_call(&call, contigs)?;
        if let Some(d) = dump.as_deref_mut() {
            d.write_reads(writer.calls_written(), &call.supporting_reads, contigs)?;
        }
    }
    Ok(())
}
