//! 输入输出：已分类比对记录的读取与调用表的写出。

pub mod output;
pub mod reads;

pub use output::{format_lib_counts, OutputColumns, ReadDumpWriter, SvWriter};
pub use reads::ReadsReader;
