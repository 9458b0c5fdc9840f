use std::collections::BTreeSet;

use crate::model::{BasicRegion, Read, ReadCountsByLib};

/// 区域在存储中的稳定编号（槽位下标）
pub type RegionId = usize;

#[derive(Debug)]
enum Slot {
    Occupied(BasicRegion),
    Vacant,
}

/// 区域存储：按槽位下标寻址的 arena。
///
/// - `clear_region` 释放区域并留下墓碑，其它结构中的编号保持有效；
/// - 被释放的编号只有经 `release_ids` 归还后才会被 `add_region` 复用；
/// - ROI / FR 两张计数表与槽位平行，按倍增扩容，缺失即为 0。
#[derive(Debug, Default)]
pub struct RegionStore {
    slots: Vec<Slot>,
    free_ids: BTreeSet<RegionId>,
    roi_counts: Vec<Option<ReadCountsByLib>>,
    fr_counts: Vec<Option<ReadCountsByLib>>,
    last: Option<RegionId>,
    live: usize,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 存入区域并返回编号；优先复用最小的空闲编号
    pub fn add_region(&mut self, region: BasicRegion) -> RegionId {
        let id = match self.free_ids.pop_first() {
            Some(id) => {
                debug_assert!(matches!(self.slots[id], Slot::Vacant));
                self.slots[id] = Slot::Occupied(region);
                id
            }
            None => {
                self.slots.push(Slot::Occupied(region));
                self.slots.len() - 1
            }
        };
        self.live += 1;
        self.last = Some(id);
        id
    }

    pub fn get_region(&self, id: RegionId) -> &BasicRegion {
        match self.slots.get(id) {
            Some(Slot::Occupied(region)) => region,
            _ => panic!("region {} does not exist", id),
        }
    }

    fn get_region_mut(&mut self, id: RegionId) -> &mut BasicRegion {
        match self.slots.get_mut(id) {
            Some(Slot::Occupied(region)) => region,
            _ => panic!("region {} does not exist", id),
        }
    }

    pub fn region_exists(&self, id: RegionId) -> bool {
        matches!(self.slots.get(id), Some(Slot::Occupied(_)))
    }

    /// 释放区域及其计数，留下墓碑；返回被移除的区域
    pub fn clear_region(&mut self, id: RegionId) -> Option<BasicRegion> {
        let slot = self.slots.get_mut(id)?;
        let Slot::Occupied(region) = std::mem::replace(slot, Slot::Vacant) else {
            return None;
        };
        self.live -= 1;
        if let Some(c) = self.roi_counts.get_mut(id) {
            *c = None;
        }
        if let Some(c) = self.fr_counts.get_mut(id) {
            *c = None;
        }
        if self.last == Some(id) {
            self.last = None;
        }
        Some(region)
    }

    /// 将已清空的编号归还到空闲池；仍然占用的编号会被忽略
    pub fn release_ids(&mut self, ids: impl IntoIterator<Item = RegionId>) {
        for id in ids {
            if id < self.slots.len() && !self.region_exists(id) {
                self.free_ids.insert(id);
            }
        }
    }

    pub fn swap_reads_in_region(&mut self, id: RegionId, reads: &mut Vec<Read>) {
        self.get_region_mut(id).swap_reads(reads);
    }

    pub fn reads_in_region(&self, id: RegionId) -> &[Read] {
        self.get_region(id).reads()
    }

    /// 槽位总数（含墓碑）
    pub fn num_regions(&self) -> usize {
        self.slots.len()
    }

    pub fn live_regions(&self) -> usize {
        self.live
    }

    pub fn live_ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| matches!(slot, Slot::Occupied(_)).then_some(id))
    }

    /// 最近一次 `add_region` 返回的编号（若其仍然存在）
    pub fn last_region(&self) -> Option<RegionId> {
        self.last
    }

    pub fn set_read_counts(&mut self, id: RegionId, roi: ReadCountsByLib, fr: ReadCountsByLib) {
        assert!(self.region_exists(id), "region {} does not exist", id);
        *grow_slot(&mut self.roi_counts, id) = Some(roi);
        *grow_slot(&mut self.fr_counts, id) = Some(fr);
    }

    pub fn region_lib_read_count(&self, id: RegionId, lib: &str) -> u32 {
        lib_count(&self.roi_counts, id, lib)
    }

    pub fn flank_lib_read_count(&self, id: RegionId, lib: &str) -> u32 {
        lib_count(&self.fr_counts, id, lib)
    }

    /// 汇总成员区域的计数：每个成员计 ROI，除第一个成员外再计 FR
    /// （第一个成员的侧翼位于事件之外）
    pub fn accumulate_reads_between_regions(&self, acc: &mut ReadCountsByLib, members: &[RegionId]) {
        for (i, &id) in members.iter().enumerate() {
            if let Some(Some(roi)) = self.roi_counts.get(id) {
                *acc += roi;
            }
            if i > 0 {
                if let Some(Some(fr)) = self.fr_counts.get(id) {
                    *acc += fr;
                }
            }
        }
    }

    pub fn sum_of_region_sizes(&self, members: &[RegionId]) -> i64 {
        members.iter().map(|&id| self.get_region(id).size() as i64).sum()
    }
}

fn grow_slot(table: &mut Vec<Option<ReadCountsByLib>>, id: RegionId) -> &mut Option<ReadCountsByLib> {
    if id >= table.len() {
        table.resize(2 * (id + 1), None);
    }
    &mut table[id]
}

fn lib_count(table: &[Option<ReadCountsByLib>], id: RegionId, lib: &str) -> u32 {
    match table.get(id) {
        Some(Some(counts)) => counts.get(lib),
        _ => 0,
    }
}
