//! 平坦矩形结构元素的二值形态学.
//!
//! 矩形结构元素可分离, 因此每个操作都拆成一次水平扫描和一次垂直扫描, 每次扫描用前缀和计数.
//! 图像外的像素不参与计算: 膨胀时视为背景, 腐蚀时视为前景.

use super::window_extent;
use crate::consts::gray::{is_foreground, MASK_BACKGROUND, MASK_LUNG};
use ndarray::{Array2, ArrayView2, Axis};

/// 矩形结构元素 (宽 × 高). 锚点位于中心, 偶数边长时偏向右下.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RectKernel {
    width: usize,
    height: usize,
}

impl RectKernel {
    /// 构建 `width × height` 结构元素. 边长为 0 时程序 panic.
    pub const fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "结构元素边长必须为正");
        Self { width, height }
    }

    /// 构建 `k × k` 正方形结构元素.
    #[inline]
    pub const fn square(k: usize) -> Self {
        Self::new(k, k)
    }

    /// 结构元素宽度.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// 结构元素高度.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }
}

#[derive(Copy, Clone)]
enum Op {
    Dilate,
    Erode,
}

/// 沿 `axis` 以长度 `k` 的窗口做一维膨胀或腐蚀.
fn sweep(img: ArrayView2<u8>, axis: Axis, k: usize, op: Op) -> Array2<u8> {
    let (before, after) = window_extent(k);
    let mut out = Array2::zeros(img.raw_dim());
    let mut prefix = Vec::with_capacity(img.len_of(axis) + 1);

    for (src, mut dst) in img.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = src.len();
        prefix.clear();
        prefix.push(0usize);
        for &p in src.iter() {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + is_foreground(p) as usize);
        }

        for (i, pix) in dst.iter_mut().enumerate() {
            let lo = i.saturating_sub(before);
            let hi = (i + after + 1).min(n);
            let fg = prefix[hi] - prefix[lo];
            let hit = match op {
                Op::Dilate => fg > 0,
                Op::Erode => fg == hi - lo,
            };
            *pix = if hit { MASK_LUNG } else { MASK_BACKGROUND };
        }
    }
    out
}

fn apply(img: ArrayView2<u8>, kernel: RectKernel, op: Op) -> Array2<u8> {
    let rows = sweep(img, Axis(1), kernel.width, op);
    sweep(rows.view(), Axis(0), kernel.height, op)
}

/// 二值膨胀. 输出只含 0 和 1.
#[inline]
pub fn dilate(img: ArrayView2<u8>, kernel: RectKernel) -> Array2<u8> {
    apply(img, kernel, Op::Dilate)
}

/// 二值腐蚀. 输出只含 0 和 1.
#[inline]
pub fn erode(img: ArrayView2<u8>, kernel: RectKernel) -> Array2<u8> {
    apply(img, kernel, Op::Erode)
}

/// 开运算: 先腐蚀后膨胀.
pub fn open(img: ArrayView2<u8>, kernel: RectKernel) -> Array2<u8> {
    dilate(erode(img, kernel).view(), kernel)
}

/// 闭运算: 先膨胀后腐蚀.
pub fn close(img: ArrayView2<u8>, kernel: RectKernel) -> Array2<u8> {
    erode(dilate(img, kernel).view(), kernel)
}
