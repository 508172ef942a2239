//! 后处理: 逐水平切片对每个 8-连通分量单独做闭运算, 再把结果叠加并二值化.
//!
//! 各分量互不影响: 两个分量之间的间隙不会被闭运算填上.

use super::for_each_lane;
use crate::consts::gray::binarize;
use crate::imgproc::{close, components, Component, RectKernel};
use crate::SegConfig;
use imageproc::region_labelling::Connectivity;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};

/// 对 `refined` 的每个水平切片调用 [`close_slice`]. 输出只含 0 和 1.
pub fn close_components(refined: ArrayView3<u8>, cfg: &SegConfig) -> Array3<u8> {
    let kernel = RectKernel::square(cfg.closing_kernel);
    let mut ans = Array3::zeros(refined.raw_dim());
    for_each_lane(ans.view_mut(), refined, Axis(0), |mut out, slice| {
        out.assign(&close_slice(slice, kernel))
    });
    ans
}

/// 对 `slice` 的每个 8-连通分量单独做闭运算, 结果逐像素 (饱和) 相加后二值化.
pub fn close_slice(slice: ArrayView2<u8>, kernel: RectKernel) -> Array2<u8> {
    let mut acc = Array2::<u8>::zeros(slice.raw_dim());
    for comp in components(slice, Connectivity::Eight) {
        close_component(&mut acc, &comp, kernel);
    }
    acc.mapv_inplace(binarize);
    acc
}

/// 在分量包围盒四周各扩展一个结构元素边长的局部窗口内闭运算, 并累加到 `acc`.
fn close_component(acc: &mut Array2<u8>, comp: &Component, kernel: RectKernel) {
    let (h, w) = acc.dim();
    let ((top, left), (bottom, right)) = comp.bounding_box();
    let (top, left) = (
        top.saturating_sub(kernel.height()),
        left.saturating_sub(kernel.width()),
    );
    let (bottom, right) = (
        (bottom + kernel.height() + 1).min(h),
        (right + kernel.width() + 1).min(w),
    );

    let mut crop = Array2::<u8>::zeros((bottom - top, right - left));
    for &(y, x) in comp.pixels() {
        crop[(y - top, x - left)] = 1;
    }
    let closed = close(crop.view(), kernel);
    acc.slice_mut(s![top..bottom, left..right])
        .zip_mut_with(&closed, |a, &c| *a = a.saturating_add(c));
}
