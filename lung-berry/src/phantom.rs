//! 测试用合成体数据. 只有空气和软组织两种 HU 值.

use crate::{Idx2d, Idx3d};
use ndarray::{Array2, Array3};

/// 空气 (肺实质) 的 HU 值.
pub(crate) const AIR: i16 = -900;

/// 软组织的 HU 值. 截断后与粗分割以外的体素一样落在平台上.
pub(crate) const TISSUE: i16 = 40;

/// 分裂体数据中, 两个小盘中心相对大盘中心的水平偏移.
/// 该偏移下小盘与大盘的 Jaccard 指数约为 0.055, 只有分裂/合并规则能接受它们.
pub(crate) const SPLIT_OFFSET: f64 = 16.0;

/// `shape` 画布上以 `(cy, cx)` 为圆心、`r` 为半径的实心圆盘.
pub(crate) fn disc(shape: Idx2d, (cy, cx): (f64, f64), r: f64) -> Array2<u8> {
    Array2::from_shape_fn(shape, |(y, x)| {
        let (dy, dx) = (y as f64 - cy, x as f64 - cx);
        (dy * dy + dx * dx <= r * r) as u8
    })
}

/// 体素中心到 `(cz, cy, cx)` 的距离.
fn dist((z, y, x): Idx3d, (cz, cy, cx): (f64, f64, f64)) -> f64 {
    let (dz, dy, dx) = (z as f64 - cz, y as f64 - cy, x as f64 - cx);
    (dz * dz + dy * dy + dx * dx).sqrt()
}

/// 掩膜前景为空气, 其余为组织.
pub(crate) fn to_scan(mask: &Array3<u8>) -> Array3<i16> {
    mask.mapv(|p| if p != 0 { AIR } else { TISSUE })
}

/// `(24, 64, 64)` 的简化躯干: 体外是空气, 躯干是组织, 躯干内有左右两块长方体肺.
///
/// 返回 `(扫描, 肺掩膜)`.
pub(crate) fn torso() -> (Array3<i16>, Array3<u8>) {
    let body = |(_, y, x): Idx3d| (12..52).contains(&y) && (8..56).contains(&x);
    let lung = |(z, y, x): Idx3d| {
        (4..20).contains(&z)
            && (18..46).contains(&y)
            && ((14..28).contains(&x) || (36..50).contains(&x))
    };
    let shape = (24, 64, 64);
    let scan = Array3::from_shape_fn(shape, |p| if body(p) && !lung(p) { TISSUE } else { AIR });
    let lungs = Array3::from_shape_fn(shape, |p| lung(p) as u8);
    (scan, lungs)
}

/// `(32, 48, 48)`: 以 `(16, 24, 24)` 为球心、半径 12 的空气球, 只保留 `z` 在 7..=25 的部分;
/// 另在 `z` 为 2..=5 的切片角落放一块 6x6 的空气.
///
/// 返回 `(扫描, 截断球掩膜)`.
pub(crate) fn truncated_ball_with_blob() -> (Array3<i16>, Array3<u8>) {
    let shape = (32, 48, 48);
    let ball = Array3::from_shape_fn(shape, |p| {
        (dist(p, (16.0, 24.0, 24.0)) <= 12.0 && (7..=25).contains(&p.0)) as u8
    });
    let mut scan = to_scan(&ball);
    for z in 2..=5 {
        for y in 2..8 {
            for x in 2..8 {
                scan[(z, y, x)] = AIR;
            }
        }
    }
    (scan, ball)
}

/// `(32, 48, 48)`: 以 `(16, 24, 24)` 为球心、半径 12 的空气球, 球内距球心 6 处有一层单体素厚的组织壳.
///
/// 返回 `(扫描, 实心球掩膜)`.
pub(crate) fn hollow_shell_ball() -> (Array3<i16>, Array3<u8>) {
    let shape = (32, 48, 48);
    let center = (16.0, 24.0, 24.0);
    let truth = Array3::from_shape_fn(shape, |p| (dist(p, center) <= 12.0) as u8);
    let scan = Array3::from_shape_fn(shape, |p| {
        let d = dist(p, center);
        if d <= 12.0 && (d - 6.0).abs() >= 0.5 {
            AIR
        } else {
            TISSUE
        }
    });
    (scan, truth)
}

/// `(20, 48, 64)`: 部分切片是半径 12 的大盘, 其余切片是两个半径 8.5 的小盘,
/// 小盘中心相对大盘中心左右各偏移 [`SPLIT_OFFSET`].
///
/// `merge` 为 `false` 时大盘在 `z` 为 7..20 (向下追踪时大盘分裂);
/// 为 `true` 时大盘在 `z` 为 0..5 (向下追踪时小盘合并).
///
/// 返回 `(扫描, 大盘所在的切片索引)`.
pub(crate) fn split_volume(merge: bool) -> (Array3<i16>, Vec<usize>) {
    let (n, shape) = (20, (48, 64));
    let big_slices: Vec<usize> = if merge { (0..5).collect() } else { (7..n).collect() };

    let big = disc(shape, (24.0, 32.0), 12.0);
    let two = disc(shape, (24.0, 32.0 - SPLIT_OFFSET), 8.5)
        + disc(shape, (24.0, 32.0 + SPLIT_OFFSET), 8.5);

    let mut mask = Array3::zeros((n, shape.0, shape.1));
    for (z, mut sli) in mask.outer_iter_mut().enumerate() {
        sli.assign(if big_slices.contains(&z) { &big } else { &two });
    }
    (to_scan(&mask), big_slices)
}
