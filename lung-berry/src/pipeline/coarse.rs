//! 粗分割: 逐矢状切片提取体内所有空气样区域.
//!
//! 每个矢状切片 (固定宽度索引, 行为 z, 列为高度方向) 独立处理:
//!
//! 1. HU 截断到空气范围, 5x5 中值滤波去噪;
//! 2. 截断上限平台 (组织) 二值化为前景;
//! 3. 在首行上做水平开运算, 去掉扫描床;
//! 4. 左右两列清零后从左上、右上角泛洪, 得到体外空气 (背景) 及其补集 (体内);
//! 5. 对非组织像素做盒式求和得到空洞候选, 与体内区域取交集.

use super::for_each_lane;
use crate::consts::gray::{is_foreground, MASK_BACKGROUND, MASK_LUNG};
use crate::imgproc::{box_count, flood_fill, median_filter, open, RectKernel};
use crate::SegConfig;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};

/// 对整个扫描逐矢状切片计算粗分割掩膜. 输出与 `scan` 同形, 只含 0 和 1.
pub fn coarse_mask(scan: ArrayView3<i16>, cfg: &SegConfig) -> Array3<u8> {
    let mut mask = Array3::zeros(scan.raw_dim());
    for_each_lane(mask.view_mut(), scan, Axis(2), |mut out, sagittal| {
        out.assign(&sagittal_mask(sagittal, cfg))
    });
    mask
}

/// 单个矢状切片 (行为 z, 列为高度方向) 的粗分割.
pub fn sagittal_mask(slice: ArrayView2<i16>, cfg: &SegConfig) -> Array2<u8> {
    let (h, w) = slice.dim();
    if h == 0 || w == 0 {
        return Array2::zeros((h, w));
    }

    let clipped = slice.mapv(|hu| cfg.hu_range.clip(hu));
    let denoised = median_filter(clipped.view(), cfg.median_kernel);
    let mut binary = tissue_plateau(denoised.view());
    remove_table(&mut binary, cfg.table_kernel_width);
    let body = body_interior(&mut binary);
    let holes = hole_candidates(binary.view(), cfg);

    Zip::from(&holes).and(&body).map_collect(|&hole, &inside| {
        if is_foreground(hole) && inside {
            MASK_LUNG
        } else {
            MASK_BACKGROUND
        }
    })
}

/// 值大于 `max - 1` 的像素 (即截断上限平台) 为前景.
fn tissue_plateau(img: ArrayView2<i16>) -> Array2<u8> {
    let Some(&max) = img.iter().max() else {
        return Array2::zeros(img.raw_dim());
    };
    let threshold = max as i32 - 1;
    img.mapv(|v| if v as i32 > threshold { MASK_LUNG } else { MASK_BACKGROUND })
}

/// 以 `width × 1` 的水平结构元素对首行做开运算.
fn remove_table(binary: &mut Array2<u8>, width: usize) {
    let mut top = binary.slice_mut(s![0..1, ..]);
    let opened = open(top.view(), RectKernel::new(width, 1));
    top.assign(&opened);
}

/// 左右两列清零, 再从左上角和右上角以 4-邻接泛洪 (被填充像素置 1).
///
/// 返回体内区域: 未被泛洪到的位置为 `true`.
fn body_interior(binary: &mut Array2<u8>) -> Array2<bool> {
    let w = binary.ncols();
    binary.column_mut(0).fill(MASK_BACKGROUND);
    binary.column_mut(w - 1).fill(MASK_BACKGROUND);

    let mut background = Array2::from_elem(binary.raw_dim(), false);
    flood_fill(binary, &mut background, (0, 0), MASK_LUNG);
    flood_fill(binary, &mut background, (0, w - 1), MASK_LUNG);
    background.mapv_inplace(|b| !b);
    background
}

/// 对非前景像素做盒式求和, 计数不小于 `hole_fill_min_count` 的位置为空洞候选.
fn hole_candidates(binary: ArrayView2<u8>, cfg: &SegConfig) -> Array2<u8> {
    let inverted = binary.mapv(|p| if is_foreground(p) { MASK_BACKGROUND } else { MASK_LUNG });
    box_count(inverted.view(), cfg.hole_box_size).mapv(|c| {
        if c >= cfg.hole_fill_min_count {
            MASK_LUNG
        } else {
            MASK_BACKGROUND
        }
    })
}

/// 将粗分割掩膜以外的体素替换成 `fill`, 得到精分割的输入.
pub fn restrict_to_mask(scan: ArrayView3<i16>, mask: ArrayView3<u8>, fill: i16) -> Array3<i16> {
    Zip::from(&scan)
        .and(&mask)
        .map_collect(|&hu, &m| if is_foreground(m) { hu } else { fill })
}
