use std::io::Write;

use chrono::{SecondsFormat, Utc};

use crate::config::LibraryTable;
use crate::error::Result;
use crate::model::{ContigTable, Read, ReadCountsByLib};
use crate::sv::SvCall;

/// 输出表的可选列
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputColumns {
    pub allele_frequency: bool,
    pub copy_number: bool,
}

/// BreakDancer 风格的制表符分隔调用表
pub struct SvWriter<W: Write> {
    out: W,
    columns: OutputColumns,
    written: usize,
}

impl<W: Write> SvWriter<W> {
    pub fn new(out: W, columns: OutputColumns) -> Self {
        Self { out, columns, written: 0 }
    }

    pub fn write_header(&mut self, command: &str, libs: &LibraryTable) -> Result<()> {
        writeln!(self.out, "#Software: {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
        writeln!(self.out, "#Command: {}", command)?;
        writeln!(self.out, "#Run: {}", Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))?;
        for lib in libs.iter() {
            writeln!(
                self.out,
                "#Library Statistics:\t{}\tmean:{:.2}\tstd:{:.2}\tuppercutoff:{:.2}\treadlen:{}\tcovered_ref:{}",
                lib.name,
                lib.mean_insert_size,
                lib.std_insert_size,
                lib.uppercutoff(),
                lib.read_length,
                lib.covered_reference_length
            )?;
        }
        write!(
            self.out,
            "#Chr1\tPos1\tOrientation1\tChr2\tPos2\tOrientation2\tType\tSize\tScore\tnum_Reads\tnum_Reads_lib"
        )?;
        if self.columns.allele_frequency {
            write!(self.out, "\tAllele_frequency")?;
        }
        if self.columns.copy_number {
            write!(self.out, "\tcopy_number_lib")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub fn write_call(&mut self, call: &SvCall, contigs: &ContigTable) -> Result<()> {
        write!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            contig_label(contigs, call.chr1()),
            call.pos1,
            call.left.orientation(),
            contig_label(contigs, call.chr2()),
            call.pos2,
            call.right.orientation(),
            call.sv_type,
            call.size,
            call.score,
            call.num_reads,
            format_lib_counts(&call.reads_by_lib)
        )?;
        if self.columns.allele_frequency {
            write!(self.out, "\t{:.2}", call.allele_frequency)?;
        }
        if self.columns.copy_number {
            let cn: Vec<String> = call
                .copy_number_by_lib
                .iter()
                .map(|(lib, cn)| match cn {
                    Some(v) => format!("{}|{:.2}", lib, v),
                    None => format!("{}|NA", lib),
                })
                .collect();
            write!(self.out, "\t{}", cn.join(":"))?;
        }
        writeln!(self.out)?;
        self.written += 1;
        Ok(())
    }

    pub fn calls_written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// `lib|n` 列表，以 `:` 连接
pub fn format_lib_counts(counts: &ReadCountsByLib) -> String {
    counts
        .iter()
        .map(|(lib, n)| format!("{}|{}", lib, n))
        .collect::<Vec<_>>()
        .join(":")
}

fn contig_label(contigs: &ContigTable, tid: i32) -> String {
    contigs.name(tid).map_or_else(|| tid.to_string(), str::to_string)
}

/// 支持读段的转储：每条读段一行，前缀为调用的序号（从 1 开始）
pub struct ReadDumpWriter<W: Write> {
    out: W,
}

impl<W: Write> ReadDumpWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_reads(&mut self, call_no: usize, reads: &[Read], contigs: &ContigTable) -> Result<()> {
        for r in reads {
            writeln!(
                self.out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                call_no,
                r.query_name,
                r.library,
                contig_label(contigs, r.tid),
                r.pos,
                r.strand.symbol(),
                r.mapq,
                r.flag,
                r.isize,
                r.query_len
            )?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
