//! 逐水平切片提取参与追踪的候选轮廓.

use crate::imgproc::{external_contours, median_filter, Contour};
use crate::{Idx2d, SegConfig};
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// 单个水平切片上参与追踪的候选轮廓, 按边界像素个数降序排列 (相等时保持发现次序).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SliceContours {
    shape: Idx2d,
    contours: Vec<Contour>,
}

impl SliceContours {
    /// 提取二值切片的外轮廓, 排序后至多保留 `limit` 个.
    pub fn from_binary(binary: ArrayView2<u8>, limit: usize) -> Self {
        let mut contours = external_contours(binary);
        contours.sort_by(|a, b| b.len().cmp(&a.len()));
        contours.truncate(limit);
        Self {
            shape: binary.dim(),
            contours,
        }
    }

    /// 切片形状.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.shape
    }

    /// 候选轮廓.
    #[inline]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// 候选轮廓个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// 是否没有任何候选轮廓?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// 每个候选轮廓实心填充后的候选掩膜, 顺序与 [`SliceContours::contours`] 一致.
    pub fn candidate_masks(&self) -> Vec<Array2<u8>> {
        self.contours.iter().map(|c| c.fill(self.shape)).collect()
    }
}

/// 值不大于 `max - 1` 的像素为前景, 即除截断上限平台 (组织) 以外的一切.
fn below_plateau(img: ArrayView2<i16>) -> Array2<u8> {
    let Some(&max) = img.iter().max() else {
        return Array2::zeros(img.raw_dim());
    };
    let threshold = max as i32 - 1;
    img.mapv(|v| (v as i32 <= threshold) as u8)
}

/// 单个水平切片: 截断, 中值滤波, 反向二值化, 提取外轮廓.
pub fn slice_contours(slice: ArrayView2<i16>, cfg: &SegConfig) -> SliceContours {
    let clipped = slice.mapv(|hu| cfg.hu_range.clip(hu));
    let denoised = median_filter(clipped.view(), cfg.median_kernel);
    SliceContours::from_binary(below_plateau(denoised.view()).view(), cfg.max_tracked_contours)
}

/// 对 (已限制在粗分割内的) 扫描的每个水平切片提取候选轮廓. 结果按切片索引排列.
pub fn axial_contours(restricted: ArrayView3<i16>, cfg: &SegConfig) -> Vec<SliceContours> {
    #[cfg(feature = "rayon")]
    let ans = restricted
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|s| slice_contours(s, cfg))
        .collect();

    #[cfg(not(feature = "rayon"))]
    let ans = restricted
        .axis_iter(Axis(0))
        .map(|s| slice_contours(s, cfg))
        .collect();

    ans
}
