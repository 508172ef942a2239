use super::window_extent;
use crate::consts::gray::is_foreground;
use ndarray::{Array2, ArrayView2};

/// 非归一化的 `k × k` 盒式求和: 统计每个像素窗口内的前景像素个数.
///
/// 窗口覆盖的相对偏移为 `-(k / 2)..=(k - 1 - k / 2)`, 图像外的像素计为 0.
/// 实现基于积分图, 与 `k` 无关.
pub fn box_count(img: ArrayView2<u8>, k: usize) -> Array2<u32> {
    let (h, w) = img.dim();
    let mut integral = Array2::<u32>::zeros((h + 1, w + 1));
    for ((y, x), &p) in img.indexed_iter() {
        integral[(y + 1, x + 1)] = is_foreground(p) as u32 + integral[(y, x + 1)]
            + integral[(y + 1, x)]
            - integral[(y, x)];
    }

    let (before, after) = window_extent(k);
    Array2::from_shape_fn((h, w), |(y, x)| {
        let (y0, y1) = (y.saturating_sub(before), (y + after + 1).min(h));
        let (x0, x1) = (x.saturating_sub(before), (x + after + 1).min(w));
        integral[(y1, x1)] + integral[(y0, x0)] - integral[(y0, x1)] - integral[(y1, x0)]
    })
}
