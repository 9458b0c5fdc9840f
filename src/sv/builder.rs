use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::call::{Breakpoint, SvCall, SvType};
use super::score;
use super::store::{RegionId, RegionStore};
use crate::config::{LibraryTable, Options};
use crate::model::{Read, ReadCountsByLib, ReadFlag};

/// 通过阈值检验的候选调用，`supporting_names` 为被计入的读段对
#[derive(Debug)]
pub struct BuiltSv {
    pub call: SvCall,
    pub members: Vec<RegionId>,
    pub supporting_names: BTreeSet<String>,
}

/// 对一组相互连接的区域汇总证据，决定是否发出调用
pub struct SvBuilder<'a> {
    opts: &'a Options,
    libs: &'a LibraryTable,
}

impl<'a> SvBuilder<'a> {
    pub fn new(opts: &'a Options, libs: &'a LibraryTable) -> Self {
        Self { opts, libs }
    }

    /// 证据不足时返回 `None`（正常的"无调用"结果）；所有成员必须存在
    pub fn build(&self, store: &RegionStore, snodes: &[RegionId]) -> Option<BuiltSv> {
        let mut members = snodes.to_vec();
        members.sort_by_key(|&id| {
            let r = store.get_region(id);
            (r.tid(), r.start(), id)
        });
        members.dedup();
        if members.len() < 2 {
            return None;
        }

        let mut acc = ReadCountsByLib::new();
        store.accumulate_reads_between_regions(&mut acc, &members);
        let region_size = store.sum_of_region_sizes(&members);

        // 名字 -> (成员序号, 读段)
        let mut by_name: BTreeMap<&str, Vec<(usize, &Read)>> = BTreeMap::new();
        for (mi, &id) in members.iter().enumerate() {
            for read in store.reads_in_region(id) {
                by_name.entry(read.query_name.as_str()).or_default().push((mi, read));
            }
        }

        let mut pairs_by_flag: BTreeMap<ReadFlag, Vec<(&str, &Read)>> = BTreeMap::new();
        for (&name, ends) in &by_name {
            let first = ends[0].0;
            if ends.iter().all(|&(mi, _)| mi == first) {
                continue;
            }
            let read = ends[0].1;
            pairs_by_flag.entry(read.flag).or_default().push((name, read));
        }

        let mut dominant: Option<(ReadFlag, &Vec<(&str, &Read)>)> = None;
        for (&flag, pairs) in &pairs_by_flag {
            if dominant.map_or(true, |(_, best)| pairs.len() > best.len()) {
                dominant = Some((flag, pairs));
            }
        }
        let (flag, pairs) = dominant?;
        let sv_type = flag.sv_type()?;

        let mut reads_by_lib = ReadCountsByLib::new();
        for (_, read) in pairs {
            reads_by_lib.increment(&read.library);
        }
        let min_per_lib = self.opts.min_reads_per_lib;
        reads_by_lib.retain(|_, n| n >= min_per_lib);
        let num_reads = reads_by_lib.total();
        if num_reads == 0 || num_reads < self.opts.min_read_pair {
            debug!(
                "cluster {:?}: {} {} pairs below threshold",
                members,
                num_reads,
                flag
            );
            return None;
        }

        let score = score::prob_score(
            region_size,
            reads_by_lib.iter().map(|(lib, n)| (n, self.libs.flag_density(lib, flag))),
        );
        if score < self.opts.score_threshold {
            debug!("cluster {:?}: score {} below threshold", members, score);
            return None;
        }

        let counted: Vec<&Read> = pairs
            .iter()
            .filter(|(_, r)| reads_by_lib.get(&r.library) > 0)
            .map(|&(_, r)| r)
            .collect();
        let supporting_names: BTreeSet<String> =
            counted.iter().map(|r| r.query_name.clone()).collect();

        let breakpoint = |id: RegionId| {
            let region = store.get_region(id);
            let (fwd_reads, rev_reads) =
                region.strand_counts(|r| supporting_names.contains(&r.query_name));
            Breakpoint { tid: region.tid(), start: region.start(), end: region.end(), fwd_reads, rev_reads }
        };
        let left = breakpoint(members[0]);
        let right = breakpoint(members[members.len() - 1]);
        let pos1 = left.start;
        let pos2 = right.end;

        let size = match sv_type {
            SvType::Deletion => self.mean_insert_shift(&counted, |isize, mean| isize - mean),
            SvType::Insertion => self.mean_insert_shift(&counted, |isize, mean| mean - isize),
            SvType::Inversion | SvType::IntraTranslocation => pos2 - pos1,
            SvType::InterTranslocation => 0,
        };

        let normal_reads: u32 = members.iter().map(|&id| store.get_region(id).normal_read_count()).sum();
        let allele_frequency = score::allele_frequency(num_reads, normal_reads);

        let copy_number_by_lib = reads_by_lib
            .libraries()
            .map(|lib| {
                let density = self.libs.get(lib).map_or(0.0, |l| l.read_density());
                (lib.to_string(), score::copy_number(acc.get(lib), region_size, density))
            })
            .collect();

        let call = SvCall {
            sv_type,
            left,
            right,
            pos1,
            pos2,
            size,
            score,
            num_reads,
            reads_by_lib,
            allele_frequency,
            copy_number_by_lib,
            supporting_reads: Vec::new(),
        };
        Some(BuiltSv { call, members, supporting_names })
    }

    fn mean_insert_shift(&self, reads: &[&Read], shift: impl Fn(f64, f64) -> f64) -> i32 {
        if reads.is_empty() {
            return 0;
        }
        let total: f64 = reads
            .iter()
            .map(|r| {
                let mean = self.libs.get(&r.library).map_or(0.0, |l| l.mean_insert_size);
                shift(r.abs_isize() as f64, mean)
            })
            .sum();
        (total / reads.len() as f64).round() as i32
    }
}
