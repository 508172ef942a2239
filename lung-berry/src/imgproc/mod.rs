//! 二维图像基础算子: 中值滤波, 矩形形态学, 泛洪填充, 盒式求和, 外轮廓提取和连通分量标记.
//!
//! 所有算子以 `ndarray` 二维视图为输入, 按 `(高, 宽)` 索引. 二值图像以 `u8` 表示, 非零即前景.
//! 窗口锚点与 OpenCV 一致: 边长为 `k` 的窗口覆盖相对偏移 `-(k / 2)..=(k - 1 - k / 2)`.

mod box_filter;
mod contour;
mod flood;
mod label;
mod median;
mod morph;

pub use box_filter::box_count;
pub use contour::{external_contours, Contour};
pub use flood::flood_fill;
pub use label::{components, Component};
pub use median::median_filter;
pub use morph::{close, dilate, erode, open, RectKernel};

use crate::consts::gray::{is_foreground, MASK_BACKGROUND, WHITE};
use crate::Idx2d;
use image::{GrayImage, Luma};
use ndarray::ArrayView2;

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 边长为 `k` 的窗口在锚点之前和之后分别覆盖的像素个数.
#[inline]
pub(crate) const fn window_extent(k: usize) -> (usize, usize) {
    (k / 2, k - 1 - k / 2)
}

/// 将二值图像转换为 `image` 灰度图, 前景为白色. `pad` 为四周额外补充的背景像素宽度.
pub(crate) fn to_binary_image(img: ArrayView2<u8>, pad: usize) -> GrayImage {
    let (h, w) = img.dim();
    GrayImage::from_fn((w + 2 * pad) as u32, (h + 2 * pad) as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let inside = (pad..h + pad).contains(&y) && (pad..w + pad).contains(&x);
        if inside && is_foreground(img[(y - pad, x - pad)]) {
            Luma([WHITE])
        } else {
            Luma([MASK_BACKGROUND])
        }
    })
}
