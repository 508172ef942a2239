//! 二维水平切片视图.

use crate::consts::gray::is_foreground;
use crate::Idx2d;
use ndarray::iter::{IndexedIter, Iter};
use ndarray::{ArrayView2, Ix2};
use std::ops::Index;

/// 不可变、借用的二维水平 CT 扫描切片.
#[derive(Debug, Clone, Copy)]
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::CtScan`].
    data: ArrayView2<'a, i16>,
}

/// 不可变、借用的二维水平肺掩膜切片.
#[derive(Debug, Clone, Copy)]
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::LungMask`].
    data: ArrayView2<'a, u8>,
}

/// 切片不可变方法集合.
macro_rules! impl_slice_immut {
    ($life: lifetime, $slice: ty, $elem: ty) => {
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: ArrayView2<$life, $elem>) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<$life, $elem> {
                self.data
            }

            /// 获取切片形状 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 获取切片高度.
            #[inline]
            pub fn height(&self) -> usize {
                self.data.nrows()
            }

            /// 获取切片宽度.
            #[inline]
            pub fn width(&self) -> usize {
                self.data.ncols()
            }

            /// 获取切片像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                self.data.len()
            }

            /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<&$elem> {
                self.data.get(pos)
            }

            /// 获取按行优先迭代像素的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, $elem, Ix2> {
                self.data.iter()
            }

            /// 获取按行优先迭代 `((高, 宽), 像素)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> IndexedIter<'_, $elem, Ix2> {
                self.data.indexed_iter()
            }
        }

        impl<$life> Index<Idx2d> for $slice {
            type Output = $elem;

            #[inline]
            fn index(&self, index: Idx2d) -> &Self::Output {
                &self.data[index]
            }
        }
    };
}

impl_slice_immut!('a, ScanSlice<'a>, i16);
impl_slice_immut!('a, MaskSlice<'a>, u8);

impl MaskSlice<'_> {
    /// 肺像素个数.
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&p| is_foreground(p)).count()
    }

    /// 切片是否全为背景?
    #[inline]
    pub fn is_all_background(&self) -> bool {
        !self.data.iter().any(|&p| is_foreground(p))
    }
}

#[cfg(test)]
mod tests {
    use crate::{CtScan, LungMask};
    use ndarray::Array3;

    #[test]
    fn test_slice_views() {
        let mut data = Array3::<u8>::zeros((2, 3, 4));
        data[(1, 2, 3)] = 1;
        data[(1, 0, 0)] = 1;
        let mask = LungMask::from_array(data);

        let first = mask.slice_at(0);
        assert_eq!(first.shape(), (3, 4));
        assert_eq!((first.height(), first.width(), first.size()), (3, 4, 12));
        assert!(first.is_all_background());

        let second = mask.slice_at(1);
        assert_eq!(second.count_foreground(), 2);
        assert_eq!(second[(2, 3)], 1);
        assert_eq!(second.get((3, 0)), None);

        let scan = CtScan::from_array(Array3::from_elem((2, 3, 4), -800));
        assert!(scan.slice_at(1).iter().all(|&hu| hu == -800));
    }
}
