use std::collections::BTreeMap;
use std::fmt;

use crate::model::{Read, ReadCountsByLib};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SvType {
    Deletion,
    Insertion,
    Inversion,
    IntraTranslocation,
    InterTranslocation,
}

impl SvType {
    pub fn abbrev(self) -> &'static str {
        match self {
            SvType::Deletion => "DEL",
            SvType::Insertion => "INS",
            SvType::Inversion => "INV",
            SvType::IntraTranslocation => "ITX",
            SvType::InterTranslocation => "CTX",
        }
    }
}

impl fmt::Display for SvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// 断点一侧：所在区域的坐标以及支持读段的链方向计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub tid: i32,
    pub start: i32,
    pub end: i32,
    pub fwd_reads: u32,
    pub rev_reads: u32,
}

impl Breakpoint {
    /// BreakDancer 风格的方向串，例如 `4+0-`
    pub fn orientation(&self) -> String {
        format!("{}+{}-", self.fwd_reads, self.rev_reads)
    }
}

/// 一次结构变异调用
#[derive(Debug, Clone, PartialEq)]
pub struct SvCall {
    pub sv_type: SvType,
    /// 左、右两个断点（按基因组坐标排序）
    pub left: Breakpoint,
    pub right: Breakpoint,
    pub pos1: i32,
    pub pos2: i32,
    pub size: i32,
    /// Phred 标度的 Poisson 尾概率得分，上限 99
    pub score: i32,
    pub num_reads: u32,
    pub reads_by_lib: ReadCountsByLib,
    pub allele_frequency: f64,
    pub copy_number_by_lib: BTreeMap<String, Option<f64>>,
    pub supporting_reads: Vec<Read>,
}

impl SvCall {
    pub fn chr1(&self) -> i32 {
        self.left.tid
    }

    pub fn chr2(&self) -> i32 {
        self.right.tid
    }

    /// 两个断点位于同一染色体时的并集区间
    pub fn span(&self) -> Option<(i32, i32, i32)> {
        (self.left.tid == self.right.tid).then(|| {
            (
                self.left.tid,
                self.left.start.min(self.right.start),
                self.left.end.max(self.right.end),
            )
        })
    }
}
