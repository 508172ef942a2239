//! 分割参数.

use crate::consts::*;
use crate::{SegError, SegResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 闭区间 HU 截断范围. 区间外的值被饱和到端点, 而不是丢弃.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HuRange {
    min: i16,
    max: i16,
}

impl HuRange {
    /// 构建截断范围. 要求 `min < max`, 否则返回 `None`.
    pub fn new(min: i16, max: i16) -> Option<Self> {
        (min < max).then_some(Self { min, max })
    }

    /// 空气范围 \[-1000, -500\].
    #[inline]
    pub const fn air() -> Self {
        Self {
            min: HU_AIR_MIN,
            max: HU_AIR_MAX,
        }
    }

    /// 下限.
    #[inline]
    pub fn min(&self) -> i16 {
        self.min
    }

    /// 上限.
    #[inline]
    pub fn max(&self) -> i16 {
        self.max
    }

    /// 将 `hu` 截断到范围内.
    #[inline]
    pub fn clip(&self, hu: i16) -> i16 {
        hu.clamp(self.min, self.max)
    }
}

impl Default for HuRange {
    fn default() -> Self {
        Self::air()
    }
}

/// 分割流水线的全部可调参数. 默认值见 [`crate::consts`].
///
/// 该结构不持有任何运行时状态, 可在线程间自由共享.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegConfig {
    /// 两个阶段共用的 HU 截断范围.
    pub hu_range: HuRange,

    /// 粗分割掩膜以外的体素被替换成的 HU 值.
    pub masked_out_hu: i16,

    /// 中值滤波窗口边长, 必须为奇数.
    pub median_kernel: usize,

    /// 扫描床移除的水平结构元素宽度.
    pub table_kernel_width: usize,

    /// 空洞填充盒式求和窗口边长.
    pub hole_box_size: usize,

    /// 空洞候选的最小盒式求和值.
    pub hole_fill_min_count: u32,

    /// 直接连续判定的 Jaccard 阈值.
    pub jaccard_threshold: f64,

    /// 分裂/合并判定的阈值除数.
    pub relaxed_jaccard_divisor: f64,

    /// 分裂/合并判定的面积相对容差.
    pub area_ratio_tolerance: f64,

    /// 每个水平切片参与追踪的最长轮廓个数.
    pub max_tracked_contours: usize,

    /// 后处理闭运算结构元素边长.
    pub closing_kernel: usize,
}

impl SegConfig {
    /// 分裂/合并判定使用的放宽 Jaccard 阈值.
    #[inline]
    pub fn relaxed_jaccard_threshold(&self) -> f64 {
        self.jaccard_threshold / self.relaxed_jaccard_divisor
    }

    /// 检查各参数的取值. 返回的错误带有第一个非法字段的名字.
    pub fn validate(&self) -> SegResult<()> {
        let checks = [
            ("hu_range", self.hu_range.min < self.hu_range.max),
            ("median_kernel", self.median_kernel % 2 == 1),
            ("table_kernel_width", self.table_kernel_width > 0),
            ("hole_box_size", self.hole_box_size > 0),
            ("jaccard_threshold", (0.0..=1.0).contains(&self.jaccard_threshold)),
            (
                "relaxed_jaccard_divisor",
                self.relaxed_jaccard_divisor.is_finite() && self.relaxed_jaccard_divisor > 0.0,
            ),
            (
                "area_ratio_tolerance",
                self.area_ratio_tolerance.is_finite() && self.area_ratio_tolerance >= 0.0,
            ),
            ("max_tracked_contours", self.max_tracked_contours > 0),
            ("closing_kernel", self.closing_kernel > 0),
        ];
        match checks.into_iter().find(|&(_, ok)| !ok) {
            Some((field, _)) => Err(SegError::InvalidConfig { field }),
            None => Ok(()),
        }
    }
}

impl Default for SegConfig {
    fn default() -> Self {
        Self {
            hu_range: HuRange::air(),
            masked_out_hu: MASKED_OUT_HU,
            median_kernel: MEDIAN_KERNEL,
            table_kernel_width: TABLE_KERNEL_WIDTH,
            hole_box_size: HOLE_BOX_SIZE,
            hole_fill_min_count: HOLE_FILL_MIN_COUNT,
            jaccard_threshold: JACCARD_THRESHOLD,
            relaxed_jaccard_divisor: RELAXED_JACCARD_DIVISOR,
            area_ratio_tolerance: AREA_RATIO_TOLERANCE,
            max_tracked_contours: MAX_TRACKED_CONTOURS,
            closing_kernel: CLOSING_KERNEL,
        }
    }
}
