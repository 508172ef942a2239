//! 错误类型.

use thiserror::Error;

/// 本 crate 的通用返回类型.
pub type SegResult<T> = Result<T, SegError>;

/// 分割、评估与数据读写过程中可能出现的错误.
#[derive(Debug, Error)]
pub enum SegError {
    /// 两个本应同形的数组形状不一致 (如扫描与真值掩膜).
    #[error("形状不一致: {left:?} != {right:?}")]
    ShapeMismatch {
        /// 左操作数形状.
        left: Vec<usize>,
        /// 右操作数形状.
        right: Vec<usize>,
    },

    /// 水平切片太少, 无法确定追踪的种子切片.
    #[error("至少需要 {min} 个水平切片, 实际只有 {got} 个")]
    TooFewSlices {
        /// 实际切片数.
        got: usize,
        /// 最少切片数.
        min: usize,
    },

    /// 分割参数取值非法.
    #[error("分割参数非法: {field}")]
    InvalidConfig {
        /// 非法字段名.
        field: &'static str,
    },

    /// 体数据不含任何体素.
    #[error("体数据为空")]
    EmptyVolume,

    /// nifti 文件读取失败.
    #[error("nifti 读取失败: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// nifti 数据无法组织成 `(z, 高, 宽)` 数组.
    #[error("数组形状错误: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// npy 文件读取失败.
    #[error("npy 读取失败: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    /// npy 文件写入失败.
    #[error("npy 写入失败: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    /// 图像写入失败.
    #[error("图像写入失败: {0}")]
    Image(#[from] image::ImageError),
}

impl SegError {
    /// 由两个形状构造 [`SegError::ShapeMismatch`].
    pub(crate) fn shape_mismatch(left: &[usize], right: &[usize]) -> Self {
        Self::ShapeMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}
