//! 污染序列（adapter/primer/vector）检测引擎。
//!
//! 使用流程：[`ContamLoader`] 装载 multi-FASTA，`finalize` 生成只读的
//! [`ContamIndex`]，之后可在多个线程中并发查询。

pub mod descriptor;
pub mod error;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod stats;
pub mod types;

pub use error::ContamError;
pub use index::{ContamIndex, TypeInfo, VectorIndex};
pub use loader::ContamLoader;
pub use matcher::{FlankHit, ReadHit, VectorHit};
pub use types::{ContamClass, ContamType};
