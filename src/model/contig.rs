use fxhash::FxHashMap;

/// 染色体名称与稠密编号（tid）之间的双向映射，按首次出现的顺序分配编号
#[derive(Debug, Clone, Default)]
pub struct ContigTable {
    names: Vec<String>,
    ids: FxHashMap<String, i32>,
}

impl ContigTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回 `name` 的 tid，不存在时分配新的编号
    pub fn intern(&mut self, name: &str) -> i32 {
        if let Some(&tid) = self.ids.get(name) {
            return tid;
        }
        let tid = self.names.len() as i32;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), tid);
        tid
    }

    pub fn tid(&self, name: &str) -> Option<i32> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, tid: i32) -> Option<&str> {
        usize::try_from(tid).ok().and_then(|i| self.names.get(i)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
