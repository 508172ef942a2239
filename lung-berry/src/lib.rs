#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供 3D 胸部 CT 扫描的肺部分割算法、分割结果评估以及可视化工具.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 流水线
//!
//! 分割分三个阶段, 全部实现位于 `lung-berry/src/pipeline`:
//!
//! 1. 粗分割 (`pipeline::coarse`). 逐矢状切片基于 HU 阈值, 移除扫描床与体外空气,
//!   保留体内所有空气样区域.
//! 2. 轮廓追踪 (`pipeline::contours`, `pipeline::track`). 从中心水平切片出发,
//!   分别向下、向上逐片比较候选轮廓与上一切片已接受的掩膜, 以此剔除气管、
//!   肠道气体等与肺不连续的区域. 追踪允许肺在相邻切片间分裂或合并.
//! 3. 后处理 (`pipeline::post`). 对每个 8-连通分量单独做矩形闭运算.
//!
//! # 数据约定
//!
//! 1. 所有 3D 数组按照 `(z, 高, 宽)` 访问. nifti 文件中的 `[W, H, z]` 在读取时转换.
//! 2. 掩膜以 `u8` 保存, 非零即前景. 最终输出的掩膜只含 0 和 1.
//! 3. 在非期望情况下 (如索引越界), 程序会直接 panic, 而不会导致内存错误.
//!
//! # 开发计划
//!
//! ### 粗分割 ✅
//!
//! ### 双向轮廓追踪 (含分裂/合并判定) ✅
//!
//! ### 分量闭运算后处理 ✅
//!
//! ### Jaccard / 敏感度 / FP / FN 评估 ✅
//!
//! 实现位于 `lung-berry/src/eval`.
//!
//! ### VESSEL12 数据加载器 ✅
//!
//! 实现位于 `lung-berry/src/dataset`.
//!
//! ### TP/FP/FN 对比图 ✅
//!
//! 实现位于 `lung-berry/src/vis`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D CT nii 文件基础数据结构.
mod data;

mod config;
mod error;

pub use config::{HuRange, SegConfig};
pub use data::{CtCase, CtScan, CtWindow, MaskSlice, NiftiHeaderAttr, LungMask, ScanSlice};
pub use error::{SegError, SegResult};

pub mod consts;
pub mod dataset;
pub mod eval;
pub mod imgproc;
pub mod pipeline;
pub mod prelude;
pub mod vis;

pub use pipeline::{segment_lung, Segmenter};

#[cfg(test)]
mod phantom;
