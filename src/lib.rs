//! # breakdancer-rust
//!
//! 受 [BreakDancer](https://github.com/genome/breakdancer) 启发的 Rust 版结构变异检测引擎。
//!
//! 输入为按坐标排序、已分类的双端比对记录，引擎在单次流式扫描中：
//!
//! - **区域构建**：把相邻的异常读段聚成候选区域，过滤过短或覆盖度过高的区域
//! - **读段计数**：按文库记录区域内（ROI）与区域间（FR）的读段数
//! - **区域连接**：通过共享读段对的名字把区域连成图，按边权重筛选候选
//! - **调用评估**：判定变异类型，计算 Poisson 得分、大小、等位基因频率与拷贝数
//! - **内存回收**：发出调用或离开染色体的区域及时释放
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use breakdancer_rust::config::Config;
//! use breakdancer_rust::sv::BreakDancer;
//! use breakdancer_rust::io::ReadsReader;
//!
//! # fn main() -> breakdancer_rust::Result<()> {
//! let config = Config::from_path("breakdancer.toml")?;
//! let libs = config.library_table()?;
//! let window = config.default_window_size(&libs);
//!
//! let file = std::fs::File::open("reads.tsv")?;
//! let mut reader = ReadsReader::new(std::io::BufReader::new(file));
//! let mut engine = BreakDancer::new(&config.options, &libs, window);
//! while let Some(read) = reader.next_record()? {
//!     engine.push_read(read);
//! }
//! engine.process_final_region();
//! for call in engine.take_calls() {
//!     println!("{} {}-{} score {}", call.sv_type, call.pos1, call.pos2, call.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 模块说明
//!
//! - [`config`] — TOML 配置：引擎阈值与文库统计
//! - [`model`] — 读段、区域、按文库计数等基础类型
//! - [`sv`] — 区域存储、连接图、调用评估与引擎本身
//! - [`io`] — 已分类比对记录的读取与调用表输出
//! - [`error`] — 统一的错误类型

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod sv;

pub use error::{Error, Result};
