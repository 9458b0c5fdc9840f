use std::io::BufRead;

use crate::error::{Error, Result};
use crate::model::{ContigTable, Read, ReadFlag, Strand};

const NUM_COLUMNS: usize = 9;

/// 已分类比对记录（TSV）的流式读取器。
///
/// 列依次为 `query_name library chrom pos strand mapq flag isize query_len`；
/// 空行与 `#` 开头的行被跳过。染色体按首次出现的顺序编号，
/// 同时检查输入是否按坐标排序。
pub struct ReadsReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
    contigs: ContigTable,
    last: Option<(i32, i32)>,
}

impl<R: BufRead> ReadsReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), line_no: 0, contigs: ContigTable::new(), last: None }
    }

    pub fn contigs(&self) -> &ContigTable {
        &self.contigs
    }

    pub fn next_record(&mut self) -> Result<Option<Read>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = self.buf.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.to_string();
            let read = self.parse_line(&line)?;
            self.check_order(&read)?;
            return Ok(Some(read));
        }
    }

    fn bad(&self, msg: impl Into<String>) -> Error {
        Error::ReadRecord { line: self.line_no, msg: msg.into() }
    }

    fn parse_line(&mut self, line: &str) -> Result<Read> {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != NUM_COLUMNS {
            return Err(self.bad(format!("expected {} columns, found {}", NUM_COLUMNS, cols.len())));
        }

        let pos: i32 = self.field(cols[3], "pos")?;
        if pos < 0 {
            return Err(self.bad(format!("negative position {}", pos)));
        }
        let strand: Strand = cols[4].parse().map_err(|e: String| self.bad(e))?;
        let mapq: u8 = self.field(cols[5], "mapq")?;
        let flag: ReadFlag = cols[6].parse().map_err(|e: String| self.bad(e))?;
        let isize: i32 = self.field(cols[7], "isize")?;
        let query_len: i32 = self.field(cols[8], "query_len")?;

        if cols[0].is_empty() || cols[1].is_empty() || cols[2].is_empty() {
            return Err(self.bad("empty name, library or chromosome"));
        }
        let tid = self.contigs.intern(cols[2]);

        Ok(Read {
            query_name: cols[0].to_string(),
            library: cols[1].to_string(),
            tid,
            pos,
            strand,
            mapq,
            flag,
            isize,
            query_len,
        })
    }

    fn field<T: std::str::FromStr>(&self, s: &str, what: &str) -> Result<T> {
        s.trim().parse().map_err(|_| self.bad(format!("invalid {} '{}'", what, s)))
    }

    fn check_order(&mut self, read: &Read) -> Result<()> {
        if let Some((tid, pos)) = self.last {
            if read.tid == tid && read.pos < pos {
                return Err(Error::Unsorted(format!(
                    "line {}: {} at {}:{} after position {}",
                    self.line_no,
                    read.query_name,
                    self.contig_name(tid),
                    read.pos,
                    pos
                )));
            }
            // a chromosome that already ended cannot come back
            if read.tid < tid {
                return Err(Error::Unsorted(format!(
                    "line {}: chromosome {} reappears after {}",
                    self.line_no,
                    self.contig_name(read.tid),
                    self.contig_name(tid)
                )));
            }
        }
        self.last = Some((read.tid, read.pos));
        Ok(())
    }

    fn contig_name(&self, tid: i32) -> &str {
        self.contigs.name(tid).unwrap_or("?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn reader(text: &str) -> ReadsReader<&[u8]> {
        ReadsReader::new(text.as_bytes())
    }

    #[test]
    fn parses_records_and_skips_comments() {
        let mut r = reader(
            "# comment\n\nr1\tL1\tchr1\t100\t+\t60\tARP_FR_big_insert\t4900\t100\n\
             r2\tL1\tchr2\t50\t-\t20\t18\t-300\t100\r\n",
        );
        let a = r.next_record().unwrap().unwrap();
        assert_eq!(a.query_name, "r1");
        assert_eq!((a.tid, a.pos, a.strand), (0, 100, Strand::Forward));
        assert_eq!(a.flag, ReadFlag::ArpFrBigInsert);

        let b = r.next_record().unwrap().unwrap();
        assert_eq!((b.tid, b.flag, b.isize), (1, ReadFlag::NormalFr, -300));
        assert_eq!(b.abs_isize(), 300);
        assert!(r.next_record().unwrap().is_none());
        assert_eq!(r.contigs().name(1), Some("chr2"));
    }

    #[rstest]
    #[case("r1\tL1\tchr1\t100\t+\t60\n", "columns")]
    #[case("r1\tL1\tchr1\tx\t+\t60\t18\t0\t100\n", "pos")]
    #[case("r1\tL1\tchr1\t100\t*\t60\t18\t0\t100\n", "strand")]
    #[case("r1\tL1\tchr1\t100\t+\t600\t18\t0\t100\n", "mapq")]
    #[case("r1\tL1\tchr1\t100\t+\t60\tARP_XX\t0\t100\n", "flag")]
    fn malformed_lines(#[case] text: &str, #[case] needle: &str) {
        let err = reader(&format!("# header\n{}", text)).next_record().unwrap_err();
        match err {
            Error::ReadRecord { line, msg } => {
                assert_eq!(line, 2);
                assert!(msg.contains(needle), "{}", msg);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_decreasing_position() {
        let mut r = reader(
            "a\tL1\tchr1\t100\t+\t60\t18\t0\t100\nb\tL1\tchr1\t90\t+\t60\t18\t0\t100\n",
        );
        r.next_record().unwrap();
        assert!(matches!(r.next_record(), Err(Error::Unsorted(_))));
    }

    #[test]
    fn rejects_returning_chromosome() {
        let mut r = reader(
            "a\tL1\tchr1\t100\t+\t60\t18\t0\t100\n\
             b\tL1\tchr2\t10\t+\t60\t18\t0\t100\n\
             c\tL1\tchr1\t200\t+\t60\t18\t0\t100\n",
        );
        r.next_record().unwrap();
        r.next_record().unwrap();
        assert!(matches!(r.next_record(), Err(Error::Unsorted(_))));
    }
}
