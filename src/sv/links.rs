use std::collections::BTreeMap;

use fxhash::FxHashMap;

use super::store::RegionId;

/// 读段对名字 -> 该读段（或其 mate）贡献过证据的区域编号列表。
///
/// 这是区域之间唯一的持久关联；连接只在 `ConnectionGraph::from_index` 批量扫描时发现。
#[derive(Debug, Default)]
pub struct ReadRegionMap {
    map: FxHashMap<String, Vec<RegionId>>,
}

impl ReadRegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录读段落在 `id` 区域；同一区域连续记录只保留一次
    pub fn record(&mut self, name: &str, id: RegionId) {
        match self.map.get_mut(name) {
            Some(ids) => {
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
            None => {
                self.map.insert(name.to_string(), vec![id]);
            }
        }
    }

    pub fn regions_of(&self, name: &str) -> &[RegionId] {
        self.map.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 从读段的列表中移除 `id`，列表为空时删除该键
    pub fn forget(&mut self, name: &str, id: RegionId) {
        if let Some(ids) = self.map.get_mut(name) {
            ids.retain(|&r| r != id);
            if ids.is_empty() {
                self.map.remove(name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RegionId])> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// 区域连接图：对称边，边权为共享读段对的数量
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionGraph {
    edges: BTreeMap<RegionId, BTreeMap<RegionId, u32>>,
}

impl ConnectionGraph {
    /// 扫描索引，为每个关联到至少两个不同区域的读段添加边；
    /// `is_live` 过滤掉已被回收的区域
    pub fn from_index(index: &ReadRegionMap, is_live: impl Fn(RegionId) -> bool) -> Self {
        let mut graph = ConnectionGraph::default();
        let mut ids: Vec<RegionId> = Vec::new();
        for (_, regions) in index.iter() {
            if regions.len() < 2 {
                continue;
            }
            ids.clear();
            ids.extend(regions.iter().copied().filter(|&id| is_live(id)));
            ids.sort_unstable();
            ids.dedup();
            for (i, &a) in ids.iter().enumerate() {
                for &b in &ids[i + 1..] {
                    graph.add_link(a, b);
                }
            }
        }
        graph
    }

    pub fn add_link(&mut self, a: RegionId, b: RegionId) {
        debug_assert_ne!(a, b);
        *self.edges.entry(a).or_default().entry(b).or_insert(0) += 1;
        *self.edges.entry(b).or_default().entry(a).or_insert(0) += 1;
    }

    pub fn weight(&self, a: RegionId, b: RegionId) -> u32 {
        self.edges.get(&a).and_then(|m| m.get(&b)).copied().unwrap_or(0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.edges.keys().copied()
    }

    pub fn neighbors(&self, id: RegionId) -> impl Iterator<Item = (RegionId, u32)> + '_ {
        self.edges.get(&id).into_iter().flat_map(|m| m.iter().map(|(&k, &v)| (k, v)))
    }

    pub fn num_nodes(&self) -> usize {
        self.edges.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// 广度优先遍历每个连通分量，每条边只在其第一个端点展开时访问一次。
    /// 返回 (tail, partner, weight) 的访问序列。
    pub fn traverse_edges(&self) -> Vec<(RegionId, RegionId, u32)> {
        let mut expanded: std::collections::BTreeSet<RegionId> = Default::default();
        let mut queued: std::collections::BTreeSet<RegionId> = Default::default();
        let mut order = Vec::new();

        for seed in self.nodes() {
            if !queued.insert(seed) {
                continue;
            }
            let mut tails = vec![seed];
            while !tails.is_empty() {
                let mut next = Vec::new();
                for tail in tails {
                    for (partner, weight) in self.neighbors(tail) {
                        if expanded.contains(&partner) {
                            continue;
                        }
                        order.push((tail, partner, weight));
                        if queued.insert(partner) {
                            next.push(partner);
                        }
                    }
                    expanded.insert(tail);
                }
                tails = next;
            }
        }
        order
    }
}
