use super::{neighbour4, to_binary_image};
use crate::consts::gray::{MASK_BACKGROUND, MASK_LUNG};
use crate::Idx2d;
use imageproc::contours::{find_contours, BorderType};
use ndarray::{Array2, ArrayView2};
use std::collections::VecDeque;

/// 闭合轮廓, 由有序的边界像素索引 `(高, 宽)` 组成.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Idx2d>,
}

impl Contour {
    /// 由边界像素直接构建.
    #[inline]
    pub fn new(points: Vec<Idx2d>) -> Self {
        Self { points }
    }

    /// 边界像素.
    #[inline]
    pub fn points(&self) -> &[Idx2d] {
        &self.points
    }

    /// 边界像素个数. 这也是追踪时对轮廓排序的依据.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 轮廓是否不含任何像素?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 在 `shape` 大小的画布上实心填充该轮廓 (含边界), 得到只含 0 和 1 的候选掩膜.
    ///
    /// 轮廓内部的孔洞也被填充. 画布外的边界像素被忽略.
    pub fn fill(&self, shape: Idx2d) -> Array2<u8> {
        let (h, w) = shape;
        let mut boundary = Array2::from_elem(shape, false);
        for &pos in self.points.iter() {
            if let Some(b) = boundary.get_mut(pos) {
                *b = true;
            }
        }

        // 从画布四边出发, 沿非边界像素 4-邻接扩散到的区域即轮廓外部.
        let mut outside = Array2::from_elem(shape, false);
        let mut bfs_q: VecDeque<Idx2d> = (0..h)
            .flat_map(|y| [(y, 0), (y, w.saturating_sub(1))])
            .chain((0..w).flat_map(|x| [(0, x), (h.saturating_sub(1), x)]))
            .filter(|&pos| !boundary[pos])
            .collect();
        for &pos in bfs_q.iter() {
            outside[pos] = true;
        }
        while let Some(cur) = bfs_q.pop_front() {
            for pos in neighbour4(cur) {
                if boundary.get(pos) == Some(&false) && !outside[pos] {
                    outside[pos] = true;
                    bfs_q.push_back(pos);
                }
            }
        }

        outside.mapv(|o| if o { MASK_BACKGROUND } else { MASK_LUNG })
    }
}

/// 提取二值图像中所有前景区域的外轮廓, 嵌套在孔洞中的区域及孔洞边界均被忽略.
///
/// 轮廓按被发现的次序 (首像素的行优先次序) 排列.
pub fn external_contours(binary: ArrayView2<u8>) -> Vec<Contour> {
    if binary.is_empty() {
        return Vec::new();
    }

    // 补一圈背景, 贴着图像左边缘的区域才能被识别为外边界.
    find_contours::<u32>(&to_binary_image(binary, 1))
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            let points = c
                .points
                .iter()
                .map(|p| (p.y as usize - 1, p.x as usize - 1))
                .collect();
            Contour::new(points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{external_contours, Contour};
    use ndarray::{s, Array2};

    #[test]
    fn test_external_contours_ignore_nested() {
        // 外环 + 环内孤岛 + 独立方块.
        let mut img = Array2::<u8>::zeros((12, 20));
        img.slice_mut(s![1..10, 1..10]).fill(1);
        img.slice_mut(s![3..8, 3..8]).fill(0);
        img.slice_mut(s![5..6, 5..6]).fill(1);
        img.slice_mut(s![2..5, 13..18]).fill(1);

        let contours = external_contours(img.view());
        assert_eq!(contours.len(), 2);
        // 9x9 外边界 32 个像素, 3x5 方块外边界 12 个像素.
        assert_eq!(contours[0].len(), 32);
        assert_eq!(contours[1].len(), 12);
        assert!(contours[0].points().contains(&(1, 1)));
        assert!(contours[1].points().contains(&(2, 13)));
    }

    #[test]
    fn test_external_contours_touch_edge() {
        let mut img = Array2::<u8>::zeros((6, 6));
        img.slice_mut(s![0..3, 0..3]).fill(1);
        let contours = external_contours(img.view());
        assert_eq!(contours.len(), 1);
        assert!(contours[0].points().contains(&(0, 0)));

        let filled = contours[0].fill((6, 6));
        assert_eq!(filled, img);
    }

    /// 填充得到的是包含孔洞的实心区域.
    #[test]
    fn test_fill_closes_holes() {
        let mut img = Array2::<u8>::zeros((12, 12));
        img.slice_mut(s![1..10, 1..10]).fill(1);
        img.slice_mut(s![3..8, 3..8]).fill(0);

        let contours = external_contours(img.view());
        assert_eq!(contours.len(), 1);
        let filled = contours[0].fill(img.dim());

        let mut expected = Array2::<u8>::zeros((12, 12));
        expected.slice_mut(s![1..10, 1..10]).fill(1);
        assert_eq!(filled, expected);
    }

    #[test]
    fn test_fill_single_point() {
        let c = Contour::new(vec![(2, 3)]);
        let filled = c.fill((5, 5));
        assert_eq!(filled.sum(), 1);
        assert_eq!(filled[(2, 3)], 1);
    }

    #[test]
    fn test_external_contours_empty() {
        assert!(external_contours(Array2::<u8>::zeros((4, 4)).view()).is_empty());
        assert!(external_contours(Array2::<u8>::zeros((0, 4)).view()).is_empty());
    }
}
