use std::collections::BTreeMap;
use std::ops::AddAssign;

/// 按文库统计的读段计数。
///
/// 缺失的文库即计数为 0；使用 `BTreeMap` 保证遍历（以及输出）顺序稳定。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadCountsByLib {
    counts: BTreeMap<String, u32>,
}

impl ReadCountsByLib {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, lib: &str) {
        self.add(lib, 1);
    }

    pub fn add(&mut self, lib: &str, n: u32) {
        if n == 0 {
            return;
        }
        match self.counts.get_mut(lib) {
            Some(c) => *c += n,
            None => {
                self.counts.insert(lib.to_string(), n);
            }
        }
    }

    pub fn get(&self, lib: &str) -> u32 {
        self.counts.get(lib).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn libraries(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// 逐文库相减，结果下限为 0；差为 0 的文库不保留
    pub fn saturating_sub(&self, other: &ReadCountsByLib) -> ReadCountsByLib {
        let counts = self
            .counts
            .iter()
            .filter_map(|(lib, &n)| {
                let left = n.saturating_sub(other.get(lib));
                (left > 0).then(|| (lib.clone(), left))
            })
            .collect();
        ReadCountsByLib { counts }
    }

    /// 只保留满足 `keep` 的文库
    pub fn retain(&mut self, mut keep: impl FnMut(&str, u32) -> bool) {
        self.counts.retain(|lib, n| keep(lib, *n));
    }
}

impl AddAssign<&ReadCountsByLib> for ReadCountsByLib {
    fn add_assign(&mut self, rhs: &ReadCountsByLib) {
        for (lib, n) in rhs.iter() {
            self.add(lib, n);
        }
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for ReadCountsByLib {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut out = ReadCountsByLib::new();
        for (lib, n) in iter {
            let lib = lib.into();
            out.add(&lib, n);
        }
        out
    }
}
