//! 肺分割流水线: 粗分割 → 轮廓追踪 → 分量闭运算.
//!
//! 每次分割都分配新的缓冲区, 各次调用之间不共享任何可变状态. 输入扫描只被借用.

pub mod coarse;
pub mod contours;
pub mod post;
pub mod track;

pub use contours::SliceContours;
pub use track::{Continuity, Direction, TrackState};

use crate::consts::MIN_AXIAL_SLICES;
use crate::{CtScan, LungMask, NiftiHeaderAttr, SegConfig, SegError, SegResult};
use log::{debug, info};
use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 对 `out` 和 `src` 沿 `axis` 的每一对切片执行 `op`. 启用 `rayon` 时各切片并行处理,
/// 每个切片只写入自己的输出通道.
pub(crate) fn for_each_lane<A, B, F>(
    mut out: ArrayViewMut3<A>,
    src: ArrayView3<B>,
    axis: Axis,
    op: F,
) where
    A: Send + Sync,
    B: Sync,
    F: Fn(ArrayViewMut2<A>, ArrayView2<B>) + Sync + Send,
{
    debug_assert_eq!(out.len_of(axis), src.len_of(axis));

    #[cfg(feature = "rayon")]
    out.axis_iter_mut(axis)
        .into_par_iter()
        .zip(src.axis_iter(axis).into_par_iter())
        .for_each(|(o, s)| op(o, s));

    #[cfg(not(feature = "rayon"))]
    out.axis_iter_mut(axis)
        .zip(src.axis_iter(axis))
        .for_each(|(o, s)| op(o, s));
}

/// 分割的全部中间结果, 便于检查和可视化.
#[derive(Debug, Clone)]
pub struct Stages {
    /// 粗分割掩膜.
    pub coarse: Array3<u8>,

    /// 每个水平切片参与追踪的候选轮廓.
    pub contours: Vec<SliceContours>,

    /// 双向追踪叠加后的掩膜. 两个方向都接受的像素值可能大于 1.
    pub refined: Array3<u8>,

    /// 最终掩膜, 只含 0 和 1.
    pub mask: LungMask,
}

/// 肺分割器. 只持有参数, 可在线程间共享.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegConfig,
}

impl Segmenter {
    /// 以给定参数创建分割器. 参数非法时返回 [`SegError::InvalidConfig`].
    pub fn new(config: SegConfig) -> SegResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 分割参数.
    #[inline]
    pub fn config(&self) -> &SegConfig {
        &self.config
    }

    /// 分割 `scan` 中的肺. 输出掩膜与 `scan` 同形, 并共享其 header.
    ///
    /// 若 `scan` 为空或水平切片少于 3 个, 返回错误.
    #[inline]
    pub fn segment(&self, scan: &CtScan) -> SegResult<LungMask> {
        Ok(self.segment_with_stages(scan)?.mask)
    }

    /// 同 [`Segmenter::segment`], 但保留全部中间结果.
    pub fn segment_with_stages(&self, scan: &CtScan) -> SegResult<Stages> {
        check_volume(scan)?;
        let cfg = &self.config;
        let data = scan.data();

        let coarse = coarse::coarse_mask(data, cfg);
        debug!(
            "coarse mask: {} voxels",
            coarse.iter().filter(|&&p| p != 0).count()
        );

        let restricted = coarse::restrict_to_mask(data, coarse.view(), cfg.masked_out_hu);
        let contours = contours::axial_contours(restricted.view(), cfg);
        drop(restricted);

        let refined = track::track_both(&contours, cfg);
        let closed = post::close_components(refined.view(), cfg);
        let mask = LungMask::from_array_like(scan, closed)?;
        info!(
            "segmented {:?}: {} lung voxels ({:.1} ml)",
            scan.shape(),
            mask.count_foreground(),
            mask.volume_ml()
        );

        Ok(Stages {
            coarse,
            contours,
            refined,
            mask,
        })
    }
}

/// 检查扫描是否满足分割的前置条件.
fn check_volume(scan: &CtScan) -> SegResult<()> {
    if scan.size() == 0 {
        return Err(SegError::EmptyVolume);
    }
    if scan.len_z() < MIN_AXIAL_SLICES {
        return Err(SegError::TooFewSlices {
            got: scan.len_z(),
            min: MIN_AXIAL_SLICES,
        });
    }
    Ok(())
}

/// 以默认参数分割 `scan`, 返回预测掩膜并交还原扫描.
pub fn segment_lung(scan: CtScan) -> SegResult<(LungMask, CtScan)> {
    let mask = Segmenter::default().segment(&scan)?;
    Ok((mask, scan))
}
