//! 通用常量. 分割算法中的经验参数都是 [`crate::SegConfig`] 的默认值.

/// 单通道颜色.
pub mod gray {
    /// 掩膜中背景的像素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 掩膜中肺的像素值. 读取外部掩膜时, 任意非零值都被视为肺.
    pub const MASK_LUNG: u8 = 1;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, MASK_BACKGROUND)
    }

    /// 像素是否是前景 (肺)?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        !is_background(p)
    }

    /// 将任意掩膜像素规范为 0 或 1.
    #[inline]
    pub const fn binarize(p: u8) -> u8 {
        if is_foreground(p) {
            MASK_LUNG
        } else {
            MASK_BACKGROUND
        }
    }
}

/// 三通道颜色, 用于对比图.
pub mod rgb {
    /// 真阳性 (预测与真值均为肺).
    pub const TRUE_POSITIVE: [u8; 3] = [0, 255, 0];

    /// 假阳性 (仅预测为肺).
    pub const FALSE_POSITIVE: [u8; 3] = [255, 0, 0];

    /// 假阴性 (仅真值为肺).
    pub const FALSE_NEGATIVE: [u8; 3] = [0, 0, 255];

    /// 追踪轮廓的颜色, 按轮廓长度降序循环使用.
    pub const CONTOURS: [[u8; 3]; 4] = [[255, 215, 0], [0, 255, 255], [255, 0, 255], [255, 128, 0]];
}

/// 空气 HU 截断下限.
pub const HU_AIR_MIN: i16 = -1000;

/// 空气 HU 截断上限. 高于该值的组织全部饱和到该值.
pub const HU_AIR_MAX: i16 = -500;

/// 粗分割掩膜以外的体素在精分割输入中被替换成的 HU 值.
pub const MASKED_OUT_HU: i16 = 0;

/// 中值滤波窗口边长.
pub const MEDIAN_KERNEL: usize = 5;

/// 移除扫描床时, 在矢状切片首行上做开运算的水平结构元素宽度.
pub const TABLE_KERNEL_WIDTH: usize = 25;

/// 空洞填充时盒式求和窗口的边长.
pub const HOLE_BOX_SIZE: usize = 30;

/// 盒式求和值不小于该值的像素被视为空洞候选.
pub const HOLE_FILL_MIN_COUNT: u32 = 1;

/// 候选轮廓与上一切片掩膜的 Jaccard 指数高于该值时直接视为连续.
pub const JACCARD_THRESHOLD: f64 = 0.1;

/// 分裂/合并判定使用 `JACCARD_THRESHOLD / RELAXED_JACCARD_DIVISOR` 作为放宽后的阈值.
pub const RELAXED_JACCARD_DIVISOR: f64 = 3.0;

/// 分裂/合并判定中面积比较的相对容差.
pub const AREA_RATIO_TOLERANCE: f64 = 0.3;

/// 面积比较的绝对容差.
pub const AREA_ABS_TOLERANCE: f64 = 1e-8;

/// 每个水平切片参与追踪的最长轮廓个数.
pub const MAX_TRACKED_CONTOURS: usize = 4;

/// 后处理闭运算的正方形结构元素边长.
pub const CLOSING_KERNEL: usize = 15;

/// 分割要求的最少水平切片数.
pub const MIN_AXIAL_SLICES: usize = 3;

/// VESSEL12 带肺掩膜的病例数 (编号 1 至 20).
pub const VESSEL12_CASES: u32 = 20;
