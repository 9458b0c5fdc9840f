use super::read::{Read, Strand};

/// 封闭后的基因组区域：坐标不可变，只有读段列表可以被换出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicRegion {
    tid: i32,
    start: i32,
    end: i32,
    normal_read_count: u32,
    reads: Vec<Read>,
}

impl BasicRegion {
    pub fn new(tid: i32, start: i32, end: i32, normal_read_count: u32) -> Self {
        debug_assert!(start <= end, "region start {} after end {}", start, end);
        Self { tid, start, end, normal_read_count, reads: Vec::new() }
    }

    pub fn tid(&self) -> i32 {
        self.tid
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// 闭区间长度 end - start + 1
    pub fn size(&self) -> i32 {
        self.end - self.start + 1
    }

    pub fn normal_read_count(&self) -> u32 {
        self.normal_read_count
    }

    pub fn reads(&self) -> &[Read] {
        &self.reads
    }

    pub fn swap_reads(&mut self, reads: &mut Vec<Read>) {
        std::mem::swap(&mut self.reads, reads);
    }

    /// 统计名字满足 `pred` 的读段在正/反链上的数量
    pub fn strand_counts(&self, mut pred: impl FnMut(&Read) -> bool) -> (u32, u32) {
        self.reads.iter().filter(|r| pred(r)).fold((0, 0), |(f, r), read| match read.strand {
            Strand::Forward => (f + 1, r),
            Strand::Reverse => (f, r + 1),
        })
    }
}
