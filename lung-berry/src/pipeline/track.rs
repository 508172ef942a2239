//! 双向轮廓追踪.
//!
//! 两个方向分别从中心附近的种子切片出发. 种子切片的全部候选掩膜被无条件接受;
//! 此后每个切片的候选掩膜, 只要与上一切片已接受的某个掩膜满足 [`Continuity`] 中的任意一种关系,
//! 就被接受. 一旦某个切片没有接受任何掩膜, 该方向之后的切片都为空.

use super::SliceContours;
use crate::consts::gray::is_foreground;
use crate::consts::AREA_ABS_TOLERANCE;
use crate::eval::Confusion;
use crate::{Idx2d, SegConfig};
use either::Either;
use log::{debug, warn};
use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};

/// 追踪方向.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// 从 `n / 2` 向索引减小的方向, 在第 0 层之前停止.
    Downward,
    /// 从 `n / 2 + 1` 向索引增大的方向, 直到最后一层.
    Upward,
}

impl Direction {
    /// 全部方向.
    pub const ALL: [Direction; 2] = [Direction::Downward, Direction::Upward];

    /// `len_z` 个切片时的种子切片索引.
    #[inline]
    pub fn seed(&self, len_z: usize) -> usize {
        match self {
            Direction::Downward => len_z / 2,
            Direction::Upward => len_z / 2 + 1,
        }
    }

    /// 追踪终点 (不含).
    #[inline]
    pub fn end(&self, len_z: usize) -> usize {
        match self {
            Direction::Downward => 0,
            Direction::Upward => len_z,
        }
    }

    /// 相邻两次访问的索引差.
    #[inline]
    pub fn step(&self) -> isize {
        match self {
            Direction::Downward => -1,
            Direction::Upward => 1,
        }
    }

    /// 按访问次序给出本方向处理的全部切片索引, 首个即种子切片.
    pub fn indices(&self, len_z: usize) -> impl Iterator<Item = usize> {
        let (seed, end) = (self.seed(len_z), self.end(len_z));
        match self {
            Direction::Downward => Either::Left((end + 1..=seed).rev()),
            Direction::Upward => Either::Right(seed..end),
        }
    }
}

/// 候选掩膜与上一切片某个已接受掩膜之间的延续关系. 按声明次序判定, 先满足者胜出.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Continuity {
    /// Jaccard 指数高于阈值.
    Overlapping,
    /// 一分为二: 候选约为上一掩膜的一半, 且 Jaccard 指数高于放宽后的阈值.
    Split,
    /// 合二为一: 候选约为上一掩膜的两倍, 且 Jaccard 指数高于放宽后的阈值.
    Merged,
}

/// `|a - b| <= atol + rtol * |b|`.
#[inline]
fn is_close(a: f64, b: f64, rtol: f64) -> bool {
    (a - b).abs() <= AREA_ABS_TOLERANCE + rtol * b.abs()
}

/// 判定 `candidate` 与 `previous` 的延续关系. 都不满足时返回 `None`.
pub fn continuity(
    candidate: ArrayView2<u8>,
    previous: ArrayView2<u8>,
    cfg: &SegConfig,
) -> Option<Continuity> {
    let c = Confusion::tally(candidate, previous);
    let j = c.jaccard();
    if j > cfg.jaccard_threshold {
        return Some(Continuity::Overlapping);
    }
    if j <= cfg.relaxed_jaccard_threshold() {
        return None;
    }

    let cur = c.predicted() as f64;
    let prev = c.actual() as f64;
    if is_close(2.0 * cur, prev, cfg.area_ratio_tolerance) {
        Some(Continuity::Split)
    } else if is_close(cur, 2.0 * prev, cfg.area_ratio_tolerance) {
        Some(Continuity::Merged)
    } else {
        None
    }
}

/// 单个方向的追踪状态: 当前切片索引, 以及该切片已接受的全部候选掩膜.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackState {
    slice_index: usize,
    accepted: Vec<Array2<u8>>,
}

impl TrackState {
    /// 种子状态: 无条件接受种子切片的全部候选掩膜.
    pub fn seed(slice_index: usize, contours: &SliceContours) -> Self {
        Self {
            slice_index,
            accepted: contours.candidate_masks(),
        }
    }

    /// 推进到 `slice_index`, 其候选轮廓为 `contours`. 不修改 `self`.
    pub fn step(&self, slice_index: usize, contours: &SliceContours, cfg: &SegConfig) -> Self {
        let accepted = if self.accepted.is_empty() {
            Vec::new()
        } else {
            contours
                .candidate_masks()
                .into_iter()
                .filter(|cand| {
                    self.accepted
                        .iter()
                        .any(|prev| continuity(cand.view(), prev.view(), cfg).is_some())
                })
                .collect()
        };
        Self {
            slice_index,
            accepted,
        }
    }

    /// 当前切片索引.
    #[inline]
    pub fn slice_index(&self) -> usize {
        self.slice_index
    }

    /// 当前切片已接受的候选掩膜.
    #[inline]
    pub fn accepted(&self) -> &[Array2<u8>] {
        &self.accepted
    }

    /// 是否没有接受任何掩膜?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// 已接受掩膜的逐像素 (饱和) 和.
    pub fn combined(&self, shape: Idx2d) -> Array2<u8> {
        let mut ans = Array2::<u8>::zeros(shape);
        for mask in self.accepted.iter() {
            ans.zip_mut_with(mask, |a, &m| *a = a.saturating_add(m));
        }
        ans
    }
}

/// 沿 `direction` 追踪, 返回 `(z, 高, 宽)` 掩膜. 未被访问的切片全为 0.
pub fn track(contours: &[SliceContours], direction: Direction, cfg: &SegConfig) -> Array3<u8> {
    let len_z = contours.len();
    let (h, w) = contours.first().map_or((0, 0), |c| c.shape());
    let mut refined = Array3::zeros((len_z, h, w));

    let mut indices = direction.indices(len_z);
    let Some(seed) = indices.next() else {
        return refined;
    };
    let mut state = TrackState::seed(seed, &contours[seed]);
    if state.is_empty() {
        warn!("{direction:?} seed slice {seed} has no contour, nothing to track");
    }
    refined
        .index_axis_mut(Axis(0), seed)
        .assign(&state.combined((h, w)));

    for z in indices {
        let next = state.step(z, &contours[z], cfg);
        if next.is_empty() && !state.is_empty() {
            debug!("{direction:?} tracking lost at slice {z}");
        }
        state = next;
        refined
            .index_axis_mut(Axis(0), z)
            .assign(&state.combined((h, w)));
    }
    refined
}

/// 两个方向分别追踪并逐体素 (饱和) 相加. 启用 `rayon` 时两个方向并行.
pub fn track_both(contours: &[SliceContours], cfg: &SegConfig) -> Array3<u8> {
    #[cfg(feature = "rayon")]
    let (mut down, up) = rayon::join(
        || track(contours, Direction::Downward, cfg),
        || track(contours, Direction::Upward, cfg),
    );

    #[cfg(not(feature = "rayon"))]
    let (mut down, up) = (
        track(contours, Direction::Downward, cfg),
        track(contours, Direction::Upward, cfg),
    );

    Zip::from(&mut down)
        .and(&up)
        .for_each(|d, &u| *d = d.saturating_add(u));
    debug!(
        "refined mask: {} voxels",
        down.iter().filter(|&&p| is_foreground(p)).count()
    );
    down
}

#[cfg(test)]
mod tests {
    use super::{continuity, track, track_both, Continuity, Direction, TrackState};
    use crate::eval::Confusion;
    use crate::phantom::{disc, split_volume, truncated_ball_with_blob, AIR, SPLIT_OFFSET};
    use crate::pipeline::contours::{axial_contours, SliceContours};
    use crate::SegConfig;
    use ndarray::{s, Array2, Axis};

    #[test]
    fn test_direction_indices() {
        let down: Vec<usize> = Direction::Downward.indices(7).collect();
        assert_eq!(down, vec![3, 2, 1]);
        let up: Vec<usize> = Direction::Upward.indices(7).collect();
        assert_eq!(up, vec![4, 5, 6]);

        let down: Vec<usize> = Direction::Downward.indices(8).collect();
        assert_eq!(down, vec![4, 3, 2, 1]);
        let up: Vec<usize> = Direction::Upward.indices(8).collect();
        assert_eq!(up, vec![5, 6, 7]);

        // 3 层: 第 0 层从不被访问.
        assert_eq!(Direction::Downward.indices(3).collect::<Vec<_>>(), vec![1]);
        assert_eq!(Direction::Upward.indices(3).collect::<Vec<_>>(), vec![2]);
        for d in Direction::ALL {
            assert_eq!(d.step().abs(), 1);
        }
    }

    fn square(shape: (usize, usize), y0: usize, x0: usize, k: usize) -> Array2<u8> {
        let mut m = Array2::zeros(shape);
        m.slice_mut(s![y0..y0 + k, x0..x0 + k]).fill(1);
        m
    }

    #[test]
    fn test_continuity_rules() {
        let cfg = SegConfig::default();
        let shape = (64, 64);

        let a = square(shape, 10, 10, 10);
        assert_eq!(continuity(a.view(), a.view(), &cfg), Some(Continuity::Overlapping));

        // 10x20 的上一掩膜, 候选为 10x10, 与上一掩膜交 4x10=40 像素 (边缘错开 6 列):
        // J = 40 / (100 + 200 - 40) ≈ 0.154 > 0.1.
        let mut prev = Array2::<u8>::zeros(shape);
        prev.slice_mut(s![10..20, 10..30]).fill(1);
        let cand = square(shape, 10, 26, 10);
        assert_eq!(continuity(cand.view(), prev.view(), &cfg), Some(Continuity::Overlapping));

        // 交 2x10=20 像素: J = 20 / 280 ≈ 0.071, 面积约为一半 => 分裂.
        let cand = square(shape, 10, 28, 10);
        assert_eq!(continuity(cand.view(), prev.view(), &cfg), Some(Continuity::Split));
        // 反过来即合并.
        assert_eq!(continuity(prev.view(), cand.view(), &cfg), Some(Continuity::Merged));

        // 交 1x10=10 像素: J = 10 / 290 ≈ 0.034 > 0.0333.
        let cand = square(shape, 10, 29, 10);
        assert_eq!(continuity(cand.view(), prev.view(), &cfg), Some(Continuity::Split));

        // 面积相同但交太少: 不连续.
        let b = square(shape, 10, 19, 10);
        assert_eq!(continuity(b.view(), a.view(), &cfg), None);

        // 交足够但面积比不合适: 不连续.
        let big = square(shape, 30, 10, 20);
        let small = square(shape, 35, 15, 4);
        assert_eq!(continuity(small.view(), big.view(), &cfg), None);

        // 完全不相交.
        let far = square(shape, 40, 40, 10);
        assert_eq!(continuity(far.view(), a.view(), &cfg), None);
    }

    /// 两个空掩膜的并集为空, Jaccard 指数为 1.
    #[test]
    fn test_continuity_empty_masks() {
        let empty = Array2::<u8>::zeros((4, 4));
        assert_eq!(
            continuity(empty.view(), empty.view(), &SegConfig::default()),
            Some(Continuity::Overlapping)
        );
    }

    fn contours_of(masks: &[Array2<u8>]) -> Vec<SliceContours> {
        masks
            .iter()
            .map(|m| SliceContours::from_binary(m.view(), 4))
            .collect()
    }

    #[test]
    fn test_track_state_seed_and_step() {
        let cfg = SegConfig::default();
        let shape = (32, 32);
        let mut two = square(shape, 2, 2, 6);
        two.slice_mut(s![20..26, 20..26]).fill(1);
        let cs = contours_of(&[two.clone(), square(shape, 3, 3, 6), square(shape, 12, 12, 4)]);

        let seed = TrackState::seed(0, &cs[0]);
        assert_eq!(seed.accepted().len(), 2);
        assert_eq!(seed.combined(shape), two);

        let next = seed.step(1, &cs[1], &cfg);
        assert_eq!(next.slice_index(), 1);
        assert_eq!(next.accepted().len(), 1);
        // `step` 不修改原状态.
        assert_eq!(seed.accepted().len(), 2);

        // 与上一切片没有关系的候选被拒绝, 之后状态保持为空.
        let lost = next.step(2, &cs[2], &cfg);
        assert!(lost.is_empty());
        let still = lost.step(3, &cs[0], &cfg);
        assert!(still.is_empty());
        assert_eq!(still.combined(shape), Array2::zeros(shape));
    }

    #[test]
    fn test_track_empty_contours() {
        let cs = vec![SliceContours::default(); 5];
        let refined = track(&cs, Direction::Downward, &SegConfig::default());
        assert_eq!(refined.dim(), (5, 0, 0));
    }

    /// 截断球 (z 在 7..=25) 被逐层恢复, 种子切片之外的角落气泡 (z 在 2..=5) 被拒绝.
    #[test]
    fn test_track_ball_rejects_blob() {
        let cfg = SegConfig::default();
        let (scan, ball) = truncated_ball_with_blob();
        let contours = axial_contours(scan.view(), &cfg);
        let refined = track_both(&contours, &cfg);

        for z in 0..scan.len_of(Axis(0)) {
            let got = refined.index_axis(Axis(0), z);
            let want = ball.index_axis(Axis(0), z);
            if (7..=25).contains(&z) {
                let c = Confusion::between(got, want).unwrap();
                assert!(c.jaccard() > 0.8, "slice {z}: jaccard = {}", c.jaccard());
            } else {
                assert!(got.iter().all(|&p| p == 0), "slice {z} should be empty");
            }
        }
        // 中心两层分别只由一个方向写入.
        assert!(refined.iter().all(|&p| p <= 1));
    }

    /// 与球共享切片 (z 在 20..25) 的角落气泡: 它所在的切片仍有被接受的球截面,
    /// 气泡本身与上一切片的任何掩膜都不满足延续关系, 因此被拒绝.
    #[test]
    fn test_track_rejects_blob_beside_ball() {
        let cfg = SegConfig::default();
        let (mut scan, ball) = truncated_ball_with_blob();
        scan.slice_mut(s![20..25, 2..8, 38..44]).fill(AIR);
        let contours = axial_contours(scan.view(), &cfg);
        assert_eq!(contours[20].len(), 2);

        let refined = track_both(&contours, &cfg);
        assert!(refined.slice(s![20..25, 2..8, 38..44]).iter().all(|&p| p == 0));
        for z in 7..=25 {
            let got = refined.index_axis(Axis(0), z);
            let want = ball.index_axis(Axis(0), z);
            assert!(got.iter().any(|&p| p != 0), "slice {z} lost the ball");
            let c = Confusion::between(got, want).unwrap();
            assert!(c.jaccard() > 0.8, "slice {z}: jaccard = {}", c.jaccard());
        }
    }

    /// 大盘在向下追踪时分裂成两个小盘; 反过来, 向下追踪时两个小盘合并成大盘.
    #[test]
    fn test_track_split_and_merge() {
        let cfg = SegConfig::default();
        for merge in [false, true] {
            let (scan, big_slices) = split_volume(merge);
            let contours = axial_contours(scan.view(), &cfg);
            let refined = track(&contours, Direction::Downward, &cfg);

            for z in 1..=scan.len_of(Axis(0)) / 2 {
                let got = refined.index_axis(Axis(0), z);
                let want = scan.index_axis(Axis(0), z).mapv(|hu| (hu == AIR) as u8);
                let c = Confusion::between(got, want.view()).unwrap();
                assert!(c.jaccard() > 0.85, "merge={merge} slice {z}: {}", c.jaccard());
                let expected = if big_slices.contains(&z) { 1 } else { 2 };
                assert_eq!(contours[z].len(), expected);
            }
        }
    }

    /// 切换切片处的候选是经由分裂/合并规则 (而非普通重叠) 接受的.
    #[test]
    fn test_split_transition_rule() {
        let cfg = SegConfig::default();
        let big = disc((48, 64), (24.0, 32.0), 12.0);
        let small = disc((48, 64), (24.0, 32.0 + SPLIT_OFFSET), 8.5);
        assert_eq!(continuity(small.view(), big.view(), &cfg), Some(Continuity::Split));
        assert_eq!(continuity(big.view(), small.view(), &cfg), Some(Continuity::Merged));

        // 流水线实际产生的候选掩膜 (中值滤波 + 轮廓填充后) 也是如此.
        let (scan, _) = split_volume(false);
        let contours = axial_contours(scan.view(), &cfg);
        let prev = &contours[7].candidate_masks()[0];
        for cand in contours[6].candidate_masks() {
            assert_eq!(continuity(cand.view(), prev.view(), &cfg), Some(Continuity::Split));
        }

        let (scan, _) = split_volume(true);
        let contours = axial_contours(scan.view(), &cfg);
        let merged = &contours[4].candidate_masks()[0];
        for prev in contours[5].candidate_masks() {
            assert_eq!(continuity(merged.view(), prev.view(), &cfg), Some(Continuity::Merged));
        }
    }
}
