//! # contam-rust
//!
//! 短读段污染（adapter / primer / 克隆载体）检测库。
//!
//! 本 crate 提供：
//!
//! - **污染序列装载**：从 multi-FASTA 装载 flank（adapter）与 vector 污染序列，
//!   名称后缀 `@`/`&` 编码其作用的读段末端与方向
//! - **Flank 匹配**：按类型组织的 trie，支持按重叠长度比例容忍替换
//! - **Vector 包含检测**：每条 vector 一个后缀数组，种子 + 延伸
//! - **统计与报告**：线程安全的命中计数、CSV / JSON 报告
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use contam_rust::contam::{ContamLoader, ContamType};
//! use std::io::Cursor;
//!
//! let mut loader = ContamLoader::new();
//! loader.load_contaminants(Cursor::new(b">AdaptorA@12\nACGTACGTAC\n".to_vec()))?;
//! let idx = loader.finalize()?;
//!
//! let overlap = idx.match_contaminants(ContamType::FivePrimePe1, 0, 8, b"ACGTACGTACTTTTTTTTTT");
//! assert_eq!(overlap, 10);
//! # Ok::<(), contam_rust::contam::ContamError>(())
//! ```
//!
//! ## 模块说明
//!
//! - [`io`]：FASTA / FASTQ 文件解析
//! - [`index`]：flank trie 与后缀数组
//! - [`contam`]：污染序列装载、索引、匹配与统计
//! - [`screen`]：批量并行筛查 FASTQ
//! - [`report`]：CSV / JSON 报告
//! - [`util`]：DNA 编码 / 解码 / 反向互补等工具函数

pub mod contam;
pub mod index;
pub mod io;
pub mod report;
pub mod screen;
pub mod util;
