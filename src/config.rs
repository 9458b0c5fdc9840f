//! 运行配置：引擎阈值（`[options]`）与文库统计（`[[library]]`），TOML 格式。

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::ReadFlag;

/// 引擎阈值与开关
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// 读段的最低比对质量（含等于）
    pub min_map_qual: u8,
    /// 建立连接 / 发出调用所需的最少读段对数
    pub min_read_pair: u32,
    /// 单个文库计入调用所需的最少读段对数
    pub min_reads_per_lib: u32,
    /// 最低输出得分
    pub score_threshold: i32,
    /// 每存入多少个区域执行一次 `build_connection`
    pub buffer_size: usize,
    /// 保留区域的最小跨度（end - start 须严格大于该值）
    pub min_region_len: i32,
    /// 区域测序覆盖度上限，超过视为重复区域而丢弃
    pub seq_coverage_lim: f64,
    /// 只检测跨染色体重排
    pub transchr_rearrange: bool,
    /// 默认窗口大小的上限
    pub max_sv_size: i32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_map_qual: 35,
            min_read_pair: 2,
            min_reads_per_lib: 1,
            score_threshold: 30,
            buffer_size: 100,
            min_region_len: 7,
            seq_coverage_lim: 1000.0,
            transchr_rearrange: false,
            max_sv_size: 1_000_000_000,
        }
    }
}

/// 单个文库的统计信息（由文库分析阶段给出）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryInfo {
    pub name: String,
    pub mean_insert_size: f64,
    pub std_insert_size: f64,
    pub read_length: u32,
    #[serde(default)]
    pub uppercutoff: Option<f64>,
    #[serde(default)]
    pub min_mapping_quality: Option<u8>,
    pub covered_reference_length: u64,
    #[serde(default)]
    pub total_reads: u64,
    #[serde(default)]
    pub flag_counts: BTreeMap<String, u64>,
}

const CUT_SD: f64 = 3.0;

impl LibraryInfo {
    pub fn uppercutoff(&self) -> f64 {
        self.uppercutoff
            .unwrap_or(self.mean_insert_size + CUT_SD * self.std_insert_size)
    }

    /// 全部读段的密度（reads / bp），用于拷贝数估计
    pub fn read_density(&self) -> f64 {
        self.total_reads as f64 / self.covered_reference_length as f64
    }
}

/// 校验后的文库表，附带按 flag 预先计算的异常读段密度
#[derive(Debug, Clone, Default)]
pub struct LibraryTable {
    libs: BTreeMap<String, LibraryInfo>,
    flag_density: BTreeMap<(String, ReadFlag), f64>,
}

impl LibraryTable {
    pub fn new(libraries: Vec<LibraryInfo>) -> Result<Self> {
        if libraries.is_empty() {
            return Err(Error::Config("at least one [[library]] is required".into()));
        }
        let mut table = LibraryTable::default();
        for lib in libraries {
            if lib.std_insert_size <= 0.0 {
                return Err(Error::Config(format!(
                    "library '{}': std_insert_size must be positive",
                    lib.name
                )));
            }
            if lib.covered_reference_length == 0 {
                return Err(Error::Config(format!(
                    "library '{}': covered_reference_length must be positive",
                    lib.name
                )));
            }
            for (flag_name, &count) in &lib.flag_counts {
                let flag: ReadFlag = flag_name
                    .parse()
                    .map_err(|e| Error::Config(format!("library '{}': {}", lib.name, e)))?;
                let density = count as f64 / lib.covered_reference_length as f64;
                table.flag_density.insert((lib.name.clone(), flag), density);
            }
            if table.libs.contains_key(&lib.name) {
                return Err(Error::Config(format!("duplicate library '{}'", lib.name)));
            }
            table.libs.insert(lib.name.clone(), lib);
        }
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<&LibraryInfo> {
        self.libs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libs.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryInfo> {
        self.libs.values()
    }

    pub fn len(&self) -> usize {
        self.libs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libs.is_empty()
    }

    /// 某文库某类异常读段在全基因组上的密度；未配置时为 0
    pub fn flag_density(&self, lib: &str, flag: ReadFlag) -> f64 {
        self.flag_density
            .get(&(lib.to_string(), flag))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn max_uppercutoff(&self) -> f64 {
        self.libs.values().map(LibraryInfo::uppercutoff).fold(0.0, f64::max)
    }
}

/// 配置文件的完整内容
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub options: Options,
    #[serde(rename = "library", default)]
    pub libraries: Vec<LibraryInfo>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_toml_str(&text)
    }

    pub fn library_table(&self) -> Result<LibraryTable> {
        LibraryTable::new(self.libraries.clone())
    }

    /// 默认窗口：所有文库 uppercutoff 的最大值，不超过 `max_sv_size`
    pub fn default_window_size(&self, libs: &LibraryTable) -> i32 {
        let cutoff = libs.max_uppercutoff().ceil() as i64;
        cutoff.min(self.options.max_sv_size as i64) as i32
    }
}
