use super::to_binary_image;
use crate::consts::gray::MASK_BACKGROUND;
use crate::Idx2d;
use image::Luma;
use imageproc::region_labelling::{connected_components, Connectivity};
use ndarray::ArrayView2;
use std::collections::BTreeMap;

/// 二值图像中的一个连通分量.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pixels: Vec<Idx2d>,
    top_left: Idx2d,
    bottom_right: Idx2d,
}

impl Component {
    fn new(first: Idx2d) -> Self {
        Self {
            pixels: vec![first],
            top_left: first,
            bottom_right: first,
        }
    }

    fn push(&mut self, (h, w): Idx2d) {
        self.pixels.push((h, w));
        self.top_left = (self.top_left.0.min(h), self.top_left.1.min(w));
        self.bottom_right = (self.bottom_right.0.max(h), self.bottom_right.1.max(w));
    }

    /// 行优先次序下的首像素.
    #[inline]
    fn top_left_pixel(&self) -> Idx2d {
        self.pixels[0]
    }

    /// 分量内所有像素, 行优先.
    #[inline]
    pub fn pixels(&self) -> &[Idx2d] {
        &self.pixels
    }

    /// 像素个数.
    #[inline]
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    /// 包围盒 `(左上, 右下)`, 均为闭区间端点.
    #[inline]
    pub fn bounding_box(&self) -> (Idx2d, Idx2d) {
        (self.top_left, self.bottom_right)
    }
}

/// 标记 `img` 中所有前景连通分量. 分量按首像素的行优先次序排列.
pub fn components(img: ArrayView2<u8>, conn: Connectivity) -> Vec<Component> {
    if img.is_empty() {
        return Vec::new();
    }
    let labels = connected_components(&to_binary_image(img, 0), conn, Luma([MASK_BACKGROUND]));

    let mut by_label: BTreeMap<u32, Component> = BTreeMap::new();
    // `enumerate_pixels` 按行优先遍历.
    for (x, y, &Luma([l])) in labels.enumerate_pixels() {
        if l == 0 {
            continue;
        }
        let pos = (y as usize, x as usize);
        by_label
            .entry(l)
            .and_modify(|c| c.push(pos))
            .or_insert_with(|| Component::new(pos));
    }
    let mut ans: Vec<Component> = by_label.into_values().collect();
    ans.sort_unstable_by_key(|c| c.top_left_pixel());
    ans
}
