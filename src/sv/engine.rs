use std::collections::BTreeSet;

use log::{debug, info, trace};

use super::builder::SvBuilder;
use super::call::SvCall;
use super::links::{ConnectionGraph, ReadRegionMap};
use super::store::{RegionId, RegionStore};
use crate::config::{LibraryTable, Options};
use crate::model::{BasicRegion, Read, ReadCountsByLib, ReadFlag};

/// 正在累积、尚未封闭的区域
#[derive(Debug)]
struct RegionAccumulator {
    tid: i32,
    start: i32,
    end: i32,
    reads: Vec<Read>,
    total_nucleotides: i64,
    max_readlen: i32,
    normal_reads: u32,
}

impl RegionAccumulator {
    fn open(tid: i32, pos: i32) -> Self {
        Self {
            tid,
            start: pos,
            end: pos,
            reads: Vec::new(),
            total_nucleotides: 0,
            max_readlen: 0,
            normal_reads: 0,
        }
    }

    fn seq_coverage(&self) -> f64 {
        let denom = (self.end - self.start + 1 + self.max_readlen) as f64;
        self.total_nucleotides as f64 / denom
    }
}

/// 引擎运行期间的累计统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineStats {
    pub reads_seen: u64,
    pub reads_counted: u64,
    pub regions_stored: u64,
    pub regions_discarded: u64,
    /// 发出调用的成员区域与染色体结束时回收的未连接区域之和
    pub regions_reclaimed: u64,
    pub linkage_passes: u64,
    pub calls: u64,
}

/// BreakDancer 引擎：流式读入按坐标排序的已分类读段，构建区域、发现区域间连接并发出结构变异调用。
///
/// 单线程使用；调用结果进入内部队列，由调用方通过 [`BreakDancer::take_calls`] 取走，
/// 引擎自身从不回调外部组件。
pub struct BreakDancer<'a> {
    opts: &'a Options,
    libs: &'a LibraryTable,
    max_read_window_size: i32,

    store: RegionStore,
    read_regions: ReadRegionMap,

    nread_roi: ReadCountsByLib,
    nread_fr: ReadCountsByLib,
    current: Option<RegionAccumulator>,
    last_pos: Option<(i32, i32)>,
    regions_since_flush: usize,

    calls: Vec<SvCall>,
    stats: EngineStats,
}

impl<'a> BreakDancer<'a> {
    pub fn new(opts: &'a Options, libs: &'a LibraryTable, max_read_window_size: i32) -> Self {
        Self {
            opts,
            libs,
            max_read_window_size,
            store: RegionStore::new(),
            read_regions: ReadRegionMap::new(),
            nread_roi: ReadCountsByLib::new(),
            nread_fr: ReadCountsByLib::new(),
            current: None,
            last_pos: None,
            regions_since_flush: 0,
            calls: Vec::new(),
            stats: EngineStats::default(),
        }
    }

    pub fn set_max_read_window_size(&mut self, val: i32) {
        self.max_read_window_size = val;
    }

    pub fn max_read_window_size(&self) -> i32 {
        self.max_read_window_size
    }

    pub fn store(&self) -> &RegionStore {
        &self.store
    }

    pub fn read_regions(&self) -> &ReadRegionMap {
        &self.read_regions
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// 取走目前为止产生的全部调用
    pub fn take_calls(&mut self) -> Vec<SvCall> {
        std::mem::take(&mut self.calls)
    }

    fn min_mapq(&self, lib: &str) -> u8 {
        self.libs
            .get(lib)
            .and_then(|l| l.min_mapping_quality)
            .unwrap_or(self.opts.min_map_qual)
    }

    fn accepts(&self, aln: &Read) -> bool {
        if aln.flag.is_ignored() || aln.mapq < self.min_mapq(&aln.library) {
            return false;
        }
        let is_ctx = aln.flag == ReadFlag::ArpCtx;
        if self.opts.transchr_rearrange {
            is_ctx
        } else {
            !is_ctx
        }
    }

    /// 读入一条比对记录。记录必须按染色体内坐标非递减的顺序到达。
    pub fn push_read(&mut self, aln: Read) {
        self.stats.reads_seen += 1;
        if !self.accepts(&aln) {
            trace!("skip {} ({}, mapq {})", aln.query_name, aln.flag, aln.mapq);
            return;
        }
        self.stats.reads_counted += 1;

        match self.last_pos {
            Some((tid, _)) if tid != aln.tid => {
                self.process_breakpoint();
                self.finish_chromosome();
            }
            Some((_, pos)) => {
                assert!(
                    aln.pos >= pos,
                    "read {} at {} arrived after position {}",
                    aln.query_name,
                    aln.pos,
                    pos
                );
            }
            None => {}
        }
        self.last_pos = Some((aln.tid, aln.pos));

        let beyond_window = self
            .current
            .as_ref()
            .map_or(false, |cur| aln.pos - cur.end > self.max_read_window_size);
        if beyond_window {
            self.process_breakpoint();
        }

        self.nread_fr.increment(&aln.library);
        if aln.flag.is_normal() {
            if let Some(cur) = self.current.as_mut() {
                cur.normal_reads += 1;
            }
            return;
        }

        let cur = self
            .current
            .get_or_insert_with(|| RegionAccumulator::open(aln.tid, aln.pos));
        cur.end = aln.pos;
        cur.total_nucleotides += i64::from(aln.query_len);
        cur.max_readlen = cur.max_readlen.max(aln.query_len);
        self.nread_roi.increment(&aln.library);
        cur.reads.push(aln);
    }

    /// 将当前计数快照写入最近存入的区域：ROI 为区域内异常读段，FR 为其余读段（含区域前的间隙）
    fn add_current_read_counts_to_last_region(&mut self) {
        let Some(id) = self.store.last_region() else {
            panic!("no stored region to receive read counts");
        };
        let roi = std::mem::take(&mut self.nread_roi);
        let fr = self.nread_fr.saturating_sub(&roi);
        self.nread_fr.clear();
        self.store.set_read_counts(id, roi, fr);
    }

    /// 封闭当前区域：满足长度与覆盖度条件则存入并登记读段，否则丢弃
    pub fn process_breakpoint(&mut self) {
        let Some(mut acc) = self.current.take() else {
            return;
        };

        let span = acc.end - acc.start;
        let coverage = acc.seq_coverage();
        if span <= self.opts.min_region_len || coverage >= self.opts.seq_coverage_lim {
            debug!(
                "discard region {}:{}-{} ({} reads, coverage {:.2})",
                acc.tid,
                acc.start,
                acc.end,
                acc.reads.len(),
                coverage
            );
            // the discarded reads stay in nread_fr as flank of the next region
            self.nread_roi.clear();
            self.stats.regions_discarded += 1;
            return;
        }

        let id = self
            .store
            .add_region(BasicRegion::new(acc.tid, acc.start, acc.end, acc.normal_reads));
        self.add_current_read_counts_to_last_region();
        for read in &acc.reads {
            self.read_regions.record(&read.query_name, id);
        }
        debug!(
            "store region {} at {}:{}-{} ({} reads)",
            id,
            acc.tid,
            acc.start,
            acc.end,
            acc.reads.len()
        );
        self.store.swap_reads_in_region(id, &mut acc.reads);
        self.stats.regions_stored += 1;

        self.regions_since_flush += 1;
        if self.regions_since_flush >= self.opts.buffer_size {
            self.build_connection();
        }
    }

    /// 批量扫描读段索引，构建区域连接图，对权重足够的边逐一评估并回收已发出调用的区域
    pub fn build_connection(&mut self) {
        self.regions_since_flush = 0;
        self.stats.linkage_passes += 1;

        let store = &self.store;
        let graph = ConnectionGraph::from_index(&self.read_regions, |id| store.region_exists(id));
        let edges = graph.traverse_edges();

        let mut free_nodes = BTreeSet::new();
        let calls_before = self.calls.len();
        for (tail, partner, nlinks) in edges {
            if nlinks < self.opts.min_read_pair {
                continue;
            }
            let mut snodes = vec![tail, partner];
            snodes.sort_unstable();
            self.process_sv(&snodes, &mut free_nodes);
        }

        let freed = free_nodes.len();
        self.store.release_ids(free_nodes);
        info!(
            "linkage pass: {} regions linked by {} edges, {} calls, {} regions freed, {} live",
            graph.num_nodes(),
            graph.num_edges(),
            self.calls.len() - calls_before,
            freed,
            self.store.live_regions()
        );
    }

    /// 评估一个候选节点集；先发出者优先，成员已被回收的集合直接跳过
    pub fn process_sv(&mut self, snodes: &[RegionId], free_nodes: &mut BTreeSet<RegionId>) {
        if snodes
            .iter()
            .any(|&id| free_nodes.contains(&id) || !self.store.region_exists(id))
        {
            debug!("skip cluster {:?}: member already reclaimed", snodes);
            return;
        }

        let built = SvBuilder::new(self.opts, self.libs).build(&self.store, snodes);
        let Some(built) = built else {
            return;
        };

        let mut call = built.call;
        for &id in &built.members {
            let mut reads = Vec::new();
            self.store.swap_reads_in_region(id, &mut reads);
            for read in reads {
                self.read_regions.forget(&read.query_name, id);
                if built.supporting_names.contains(&read.query_name) {
                    call.supporting_reads.push(read);
                }
            }
            self.store.clear_region(id);
            free_nodes.insert(id);
            self.stats.regions_reclaimed += 1;
        }

        info!(
            "{} {}:{} -> {}:{} size {} score {} reads {}",
            call.sv_type,
            call.chr1(),
            call.pos1,
            call.chr2(),
            call.pos2,
            call.size,
            call.score,
            call.num_reads
        );
        self.stats.calls += 1;
        self.calls.push(call);
    }

    /// 染色体结束：建立连接；非跨染色体模式下剩余区域不可能再被连接，全部回收
    fn finish_chromosome(&mut self) {
        if let Some((tid, _)) = self.last_pos {
            info!("finished chromosome {} with {} live regions", tid, self.store.live_regions());
        }
        self.build_connection();
        if !self.opts.transchr_rearrange {
            self.reclaim_all();
        }
        self.nread_fr.clear();
    }

    fn reclaim_all(&mut self) {
        let ids: Vec<RegionId> = self.store.live_ids().collect();
        for &id in &ids {
            if let Some(region) = self.store.clear_region(id) {
                for read in region.reads() {
                    self.read_regions.forget(&read.query_name, id);
                }
            }
        }
        self.stats.regions_reclaimed += ids.len() as u64;
        self.store.release_ids(ids);
    }

    /// 输入结束：封闭最后一个区域并处理所有待定的连接
    pub fn process_final_region(&mut self) {
        self.process_breakpoint();
        self.finish_chromosome();
        self.last_pos = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LibraryInfo;
    use crate::model::Strand;
    use crate::sv::call::SvType;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn libs() -> LibraryTable {
        LibraryTable::new(vec![LibraryInfo {
            name: "L1".into(),
            mean_insert_size: 300.0,
            std_insert_size: 30.0,
            read_length: 100,
            uppercutoff: None,
            min_mapping_quality: None,
            covered_reference_length: 1_000_000,
            total_reads: 100_000,
            flag_counts: [("ARP_FR_big_insert".to_string(), 10)].into_iter().collect(),
        }])
        .unwrap()
    }

    fn opts() -> Options {
        Options { min_reads_per_lib: 3, ..Options::default() }
    }

    fn read(name: &str, tid: i32, pos: i32, strand: Strand, flag: ReadFlag) -> Read {
        Read {
            query_name: name.into(),
            library: "L1".into(),
            tid,
            pos,
            strand,
            mapq: 60,
            flag,
            isize: 4900,
            query_len: 100,
        }
    }

    /// `n` deletion pairs spread over `left..=left+20` and `right..=right+20`, in stream order
    fn deletion_pairs(prefix: &str, tid: i32, left: i32, right: i32, n: usize) -> Vec<Read> {
        let offset = |i: usize| (20 * i as i32) / (n as i32 - 1);
        let mut out: Vec<Read> = (0..n)
            .map(|i| read(&format!("{}{}", prefix, i), tid, left + offset(i), Strand::Forward, ReadFlag::ArpFrBigInsert))
            .collect();
        out.extend((0..n).map(|i| {
            read(&format!("{}{}", prefix, i), tid, right + offset(i), Strand::Reverse, ReadFlag::ArpFrBigInsert)
        }));
        out
    }

    fn run(engine: &mut BreakDancer<'_>, reads: Vec<Read>) -> Vec<SvCall> {
        for r in reads {
            engine.push_read(r);
        }
        engine.process_final_region();
        engine.take_calls()
    }

    #[rstest]
    fn scenario_single_deletion(libs: LibraryTable) {
        let opts = opts();
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        let calls = run(&mut engine, deletion_pairs("r", 0, 100, 5000, 4));

        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.sv_type, SvType::Deletion);
        assert_eq!(call.span(), Some((0, 100, 5020)));
        assert_eq!(call.reads_by_lib.get("L1"), 4);
        assert_eq!(call.num_reads, 4);
        assert_eq!(call.supporting_reads.len(), 8);
        assert_eq!(engine.store().live_regions(), 0);
        assert!(engine.read_regions().is_empty());
        assert_eq!(engine.stats().regions_reclaimed, 2);
    }

    #[rstest]
    fn unrelated_normal_read_does_not_change_call(libs: LibraryTable) {
        let opts = opts();
        let mut reads = deletion_pairs("r", 0, 100, 5000, 4);
        let baseline = run(&mut BreakDancer::new(&opts, &libs, 500), reads.clone());

        let normal = read("n1", 0, 110, Strand::Forward, ReadFlag::NormalFr);
        let at = reads.iter().position(|r| r.pos > 110).unwrap();
        reads.insert(at, normal);
        let with_normal = run(&mut BreakDancer::new(&opts, &libs, 500), reads);

        assert_eq!(with_normal.len(), 1);
        let (a, b) = (&baseline[0], &with_normal[0]);
        assert_eq!(a.span(), b.span());
        assert_eq!(a.reads_by_lib, b.reads_by_lib);
        assert_eq!(a.sv_type, b.sv_type);
        assert_eq!(a.score, b.score);
        assert_eq!(a.supporting_reads, b.supporting_reads);
    }

    #[rstest]
    #[case(4, 1)]
    #[case(3, 0)]
    fn threshold_boundary(libs: LibraryTable, #[case] pairs: usize, #[case] expected: usize) {
        let opts = Options { min_reads_per_lib: 4, ..Options::default() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        assert_eq!(run(&mut engine, deletion_pairs("r", 0, 100, 5000, pairs)).len(), expected);
    }

    #[rstest]
    fn window_size_decides_region_boundaries(libs: LibraryTable) {
        let opts = opts();
        // one window covering both ends: every pair stays inside a single region
        let mut wide = BreakDancer::new(&opts, &libs, 10_000);
        assert!(run(&mut wide, deletion_pairs("r", 0, 100, 5000, 4)).is_empty());
        assert_eq!(wide.stats().regions_stored, 1);

        let mut first = BreakDancer::new(&opts, &libs, 500);
        let mut second = BreakDancer::new(&opts, &libs, 500);
        let a = run(&mut first, deletion_pairs("r", 0, 100, 5000, 4));
        let b = run(&mut second, deletion_pairs("r", 0, 100, 5000, 4));
        assert_eq!(a, b);
        assert_eq!(first.stats(), second.stats());
    }

    #[rstest]
    #[case(None, 1)]
    #[case(Some(50), 2)]
    fn window_change_mid_stream(libs: LibraryTable, #[case] narrowed: Option<i32>, #[case] stored: u64) {
        let opts = Options { buffer_size: 1000, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 10_000);
        engine.push_read(read("w0", 0, 100, Strand::Forward, ReadFlag::ArpRf));
        engine.push_read(read("w1", 0, 120, Strand::Forward, ReadFlag::ArpRf));
        if let Some(window) = narrowed {
            engine.set_max_read_window_size(window);
            assert_eq!(engine.max_read_window_size(), window);
        }
        engine.push_read(read("w2", 0, 300, Strand::Forward, ReadFlag::ArpRf));
        engine.push_read(read("w3", 0, 320, Strand::Forward, ReadFlag::ArpRf));
        engine.process_breakpoint();

        assert_eq!(engine.stats().regions_stored, stored);
        assert_eq!(engine.store().live_regions(), stored as usize);
        let last = engine.store().get_region(engine.store().last_region().unwrap());
        let expected_start = if narrowed.is_some() { 300 } else { 100 };
        assert_eq!((last.start(), last.end()), (expected_start, 320));
    }

    #[rstest]
    fn read_counts_are_conserved(libs: LibraryTable) {
        let opts = Options { buffer_size: 1000, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        let mut reads = deletion_pairs("r", 0, 100, 5000, 4);
        reads.insert(2, read("n1", 0, 110, Strand::Forward, ReadFlag::NormalFr));
        reads.insert(5, read("n2", 0, 2000, Strand::Forward, ReadFlag::NormalFr));
        // closes the second region by distance, then stays as trailing flank
        reads.push(read("n3", 0, 9000, Strand::Forward, ReadFlag::NormalFr));
        for r in reads {
            engine.push_read(r);
        }

        let store = engine.store();
        assert_eq!(store.live_regions(), 2);
        assert_eq!(store.region_lib_read_count(0, "L1"), 4);
        assert_eq!(store.flank_lib_read_count(0, "L1"), 1);
        assert_eq!(store.region_lib_read_count(1, "L1"), 4);
        assert_eq!(store.flank_lib_read_count(1, "L1"), 1);
        assert_eq!(store.get_region(0).normal_read_count(), 1);

        let mut acc = ReadCountsByLib::new();
        store.accumulate_reads_between_regions(&mut acc, &[0, 1]);
        // everything except the first region's flank
        assert_eq!(acc.get("L1"), 9);
        let total: u32 = (0..2)
            .map(|id| store.region_lib_read_count(id, "L1") + store.flank_lib_read_count(id, "L1"))
            .sum();
        assert_eq!(total as u64, engine.stats().reads_counted - 1);
    }

    #[rstest]
    fn discarded_region_folds_into_next_flank(libs: LibraryTable) {
        let opts = Options { buffer_size: 1000, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        // span 0 <= min_region_len
        engine.push_read(read("s0", 0, 50, Strand::Forward, ReadFlag::ArpRf));
        engine.push_read(read("s1", 0, 50, Strand::Forward, ReadFlag::ArpRf));
        for r in deletion_pairs("r", 0, 1000, 5000, 4).into_iter().take(4) {
            engine.push_read(r);
        }
        engine.push_read(read("n", 0, 9000, Strand::Forward, ReadFlag::NormalFr));

        assert_eq!(engine.stats().regions_discarded, 1);
        assert_eq!(engine.store().live_regions(), 1);
        assert_eq!(engine.store().region_lib_read_count(0, "L1"), 4);
        assert_eq!(engine.store().flank_lib_read_count(0, "L1"), 2);
        assert!(engine.read_regions().regions_of("s0").is_empty());
    }

    #[rstest]
    fn dense_region_is_discarded(libs: LibraryTable) {
        let opts = Options { seq_coverage_lim: 2.0, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        let calls = run(&mut engine, deletion_pairs("r", 0, 100, 5000, 4));
        assert!(calls.is_empty());
        assert_eq!(engine.stats().regions_discarded, 2);
    }

    #[rstest]
    fn first_cluster_wins(libs: LibraryTable) {
        let opts = opts();
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        let x = deletion_pairs("x", 0, 100, 5000, 3);
        let z = deletion_pairs("z", 0, 100, 9000, 3);
        // x and z share their left region
        let mut reads: Vec<Read> = x[..3].iter().chain(&z[..3]).cloned().collect();
        reads.sort_by_key(|r| r.pos);
        reads.extend(x[3..].iter().cloned());
        reads.extend(z[3..].iter().cloned());

        let calls = run(&mut engine, reads);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].pos2, 5020);
        assert!(calls[0].supporting_reads.iter().all(|r| r.query_name.starts_with('x')));
        assert_eq!(engine.store().live_regions(), 0);
    }

    #[rstest]
    fn freed_ids_are_reused_without_stale_links(libs: LibraryTable) {
        let opts = Options { buffer_size: 2, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        let mut reads = deletion_pairs("a", 0, 100, 5000, 4);
        reads.extend(deletion_pairs("b", 0, 20_000, 30_000, 4));
        let calls = run(&mut engine, reads);

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].span(), Some((0, 100, 5020)));
        assert_eq!(calls[1].span(), Some((0, 20_000, 30_020)));
        assert!(calls[1].supporting_reads.iter().all(|r| r.query_name.starts_with('b')));
        // both calls were built from slots 0 and 1
        assert_eq!(engine.store().num_regions(), 2);
        assert_eq!(engine.stats().regions_reclaimed, 4);
    }

    #[rstest]
    fn reused_id_does_not_inherit_links_of_reclaimed_region(libs: LibraryTable) {
        let opts = Options { buffer_size: 3, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);

        // region 0: a* left ends plus `s`, whose mate lands in region 2
        let a = deletion_pairs("a", 0, 100, 5000, 4);
        let mut first: Vec<Read> = a[..4].to_vec();
        first.insert(2, read("s", 0, 110, Strand::Forward, ReadFlag::ArpFrBigInsert));
        let c = deletion_pairs("c", 0, 9000, 20_000, 4);
        let mut stream = first;
        stream.extend(a[4..].iter().cloned());
        stream.push(read("s", 0, 9000, Strand::Reverse, ReadFlag::ArpFrBigInsert));
        stream.extend(c[..4].iter().cloned());
        for r in stream {
            engine.push_read(r);
        }
        assert_eq!(engine.read_regions().regions_of("s"), &[0]);

        // closes region 2 (linking `s` to 0 and 2); the third stored region triggers the linkage pass
        engine.push_read(c[4].clone());
        let calls = engine.take_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].span(), Some((0, 100, 5020)));
        assert!(!engine.store().region_exists(0));
        assert_eq!(engine.read_regions().regions_of("s"), &[2]);
        // `s` plus the four c* names
        assert_eq!(engine.read_regions().len(), 5);

        for r in c[5..].iter().cloned() {
            engine.push_read(r);
        }
        engine.push_read(read("n", 0, 40_000, Strand::Forward, ReadFlag::NormalFr));
        assert_eq!(engine.store().get_region(0).start(), 20_000);
        assert_eq!(engine.read_regions().regions_of("s"), &[2]);
        let store = engine.store();
        let graph = ConnectionGraph::from_index(engine.read_regions(), |id| store.region_exists(id));
        assert_eq!(graph.weight(0, 2), 4);

        engine.process_final_region();
        let calls = engine.take_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].span(), Some((0, 9000, 20_020)));
        assert_eq!(calls[0].num_reads, 4);
        assert!(calls[0].supporting_reads.iter().all(|r| r.query_name.starts_with('c')));
        assert!(engine.read_regions().regions_of("s").is_empty());
        assert_eq!(engine.stats().regions_reclaimed, 4);
    }

    #[rstest]
    fn chromosome_change_reclaims_unlinked_regions(libs: LibraryTable) {
        let opts = Options { buffer_size: 1000, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        for r in deletion_pairs("r", 0, 100, 5000, 2) {
            engine.push_read(r);
        }
        engine.push_read(read("solo", 0, 7000, Strand::Forward, ReadFlag::ArpRf));
        engine.push_read(read("solo2", 0, 7100, Strand::Forward, ReadFlag::ArpRf));
        engine.push_read(read("c2", 1, 10, Strand::Forward, ReadFlag::NormalFr));

        assert_eq!(engine.store().live_regions(), 0);
        assert!(engine.read_regions().is_empty());
        assert!(engine.stats().regions_reclaimed >= 1);
    }

    #[rstest]
    fn mapq_and_flag_filters(libs: LibraryTable) {
        let opts = opts();
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        let mut low = read("q", 0, 10, Strand::Forward, ReadFlag::ArpFrBigInsert);
        low.mapq = 34;
        engine.push_read(low);
        let mut at_min = read("q2", 0, 20, Strand::Forward, ReadFlag::ArpFrBigInsert);
        at_min.mapq = 35;
        engine.push_read(at_min);
        engine.push_read(read("u", 0, 30, Strand::Forward, ReadFlag::Unmapped));
        engine.push_read(read("c", 0, 40, Strand::Forward, ReadFlag::ArpCtx));
        assert_eq!(engine.stats().reads_seen, 4);
        assert_eq!(engine.stats().reads_counted, 1);
    }

    #[rstest]
    fn transchr_mode_links_across_chromosomes(libs: LibraryTable) {
        let opts = Options { transchr_rearrange: true, ..opts() };
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        let mut reads = Vec::new();
        for i in 0..4 {
            reads.push(read(&format!("t{}", i), 0, 100 + 5 * i, Strand::Forward, ReadFlag::ArpCtx));
        }
        reads.push(read("ignored", 0, 200, Strand::Forward, ReadFlag::ArpFrBigInsert));
        for i in 0..4 {
            reads.push(read(&format!("t{}", i), 1, 300 + 5 * i, Strand::Reverse, ReadFlag::ArpCtx));
        }
        let calls = run(&mut engine, reads);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].sv_type, SvType::InterTranslocation);
        assert_eq!((calls[0].chr1(), calls[0].chr2()), (0, 1));
        assert_eq!(calls[0].span(), None);
        assert_eq!(calls[0].size, 0);
    }

    #[rstest]
    #[should_panic(expected = "arrived after position")]
    fn unsorted_input_fails_fast(libs: LibraryTable) {
        let opts = opts();
        let mut engine = BreakDancer::new(&opts, &libs, 500);
        engine.push_read(read("a", 0, 500, Strand::Forward, ReadFlag::ArpRf));
        engine.push_read(read("b", 0, 400, Strand::Forward, ReadFlag::ArpRf));
    }
}
