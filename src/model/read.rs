use std::fmt;
use std::str::FromStr;

use crate::sv::call::SvType;

/// 读段对的方向/插入片段分类（由文库分析阶段预先给出）。
///
/// 数值编码与 BreakDancer 的 pair orientation flag 保持一致，便于直接读取既有流程的输出。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReadFlag {
    Na,
    ArpFf,
    ArpFrBigInsert,
    ArpFrSmallInsert,
    ArpRf,
    ArpRr,
    NormalFr,
    NormalRf,
    ArpCtx,
    MateUnmapped,
    Unmapped,
}

impl ReadFlag {
    pub const ALL: [ReadFlag; 11] = [
        ReadFlag::Na,
        ReadFlag::ArpFf,
        ReadFlag::ArpFrBigInsert,
        ReadFlag::ArpFrSmallInsert,
        ReadFlag::ArpRf,
        ReadFlag::ArpRr,
        ReadFlag::NormalFr,
        ReadFlag::NormalRf,
        ReadFlag::ArpCtx,
        ReadFlag::MateUnmapped,
        ReadFlag::Unmapped,
    ];

    pub fn code(self) -> u8 {
        match self {
            ReadFlag::Na => 0,
            ReadFlag::ArpFf => 1,
            ReadFlag::ArpFrBigInsert => 2,
            ReadFlag::ArpFrSmallInsert => 3,
            ReadFlag::ArpRf => 4,
            ReadFlag::ArpRr => 8,
            ReadFlag::NormalFr => 18,
            ReadFlag::NormalRf => 20,
            ReadFlag::ArpCtx => 32,
            ReadFlag::MateUnmapped => 64,
            ReadFlag::Unmapped => 192,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            ReadFlag::Na => "NA",
            ReadFlag::ArpFf => "ARP_FF",
            ReadFlag::ArpFrBigInsert => "ARP_FR_big_insert",
            ReadFlag::ArpFrSmallInsert => "ARP_FR_small_insert",
            ReadFlag::ArpRf => "ARP_RF",
            ReadFlag::ArpRr => "ARP_RR",
            ReadFlag::NormalFr => "NORMAL_FR",
            ReadFlag::NormalRf => "NORMAL_RF",
            ReadFlag::ArpCtx => "ARP_CTX",
            ReadFlag::MateUnmapped => "MATE_UNMAPPED",
            ReadFlag::Unmapped => "UNMAPPED",
        }
    }

    /// 异常读段对：可作为结构变异的支持证据
    pub fn is_sv_supporting(self) -> bool {
        matches!(
            self,
            ReadFlag::ArpFf
                | ReadFlag::ArpFrBigInsert
                | ReadFlag::ArpFrSmallInsert
                | ReadFlag::ArpRf
                | ReadFlag::ArpRr
                | ReadFlag::ArpCtx
        )
    }

    pub fn is_normal(self) -> bool {
        matches!(self, ReadFlag::NormalFr | ReadFlag::NormalRf)
    }

    /// 既不是异常也不是正常的读段（未比对、配对缺失等）完全不参与计数
    pub fn is_ignored(self) -> bool {
        !self.is_sv_supporting() && !self.is_normal()
    }

    pub fn sv_type(self) -> Option<SvType> {
        match self {
            ReadFlag::ArpFrBigInsert => Some(SvType::Deletion),
            ReadFlag::ArpFrSmallInsert => Some(SvType::Insertion),
            ReadFlag::ArpRf => Some(SvType::IntraTranslocation),
            ReadFlag::ArpFf | ReadFlag::ArpRr => Some(SvType::Inversion),
            ReadFlag::ArpCtx => Some(SvType::InterTranslocation),
            _ => None,
        }
    }
}

impl fmt::Display for ReadFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReadFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown read flag code {}", code));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown read flag '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(format!("strand must be '+' or '-', got '{}'", other)),
        }
    }
}

/// 已分类的比对记录，是引擎的唯一输入单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    /// 读段对标识（mate 共享同一个名字）
    pub query_name: String,
    pub library: String,
    /// 染色体编号，由 `ContigTable` 分配
    pub tid: i32,
    /// 0-based 最左端坐标
    pub pos: i32,
    pub strand: Strand,
    pub mapq: u8,
    pub flag: ReadFlag,
    /// 有符号插入片段长度（跨染色体时为 0）
    pub isize: i32,
    pub query_len: i32,
}

impl Read {
    pub fn abs_isize(&self) -> i32 {
        self.isize.saturating_abs()
    }
}
