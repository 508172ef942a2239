//! 分割结果评估: 混淆计数, Jaccard 指数, 敏感度, 以及多个病例的汇总统计.
//!
//! 所有计数都以 `!= 0` 作为前景判据.

use crate::consts::gray::is_foreground;
use crate::{LungMask, SegError, SegResult};
use itertools::Itertools;
use ndarray::{ArrayView, Dimension, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 预测掩膜相对真值掩膜的逐体素混淆计数.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Confusion {
    /// 预测为前景, 真值为前景.
    pub true_positive: u64,
    /// 预测为前景, 真值为背景.
    pub false_positive: u64,
    /// 预测为背景, 真值为前景.
    pub false_negative: u64,
    /// 预测为背景, 真值为背景.
    pub true_negative: u64,
}

impl Confusion {
    /// 统计 `pred` 相对 `gt` 的混淆计数. 形状不同时返回 [`SegError::ShapeMismatch`].
    pub fn between<D: Dimension>(pred: ArrayView<u8, D>, gt: ArrayView<u8, D>) -> SegResult<Self> {
        if pred.shape() != gt.shape() {
            return Err(SegError::shape_mismatch(pred.shape(), gt.shape()));
        }
        Ok(Self::tally(pred, gt))
    }

    /// 同 [`Confusion::between`], 但调用者保证形状相同, 否则程序 panic.
    pub(crate) fn tally<D: Dimension>(pred: ArrayView<u8, D>, gt: ArrayView<u8, D>) -> Self {
        let mut ans = Self::default();
        Zip::from(&pred).and(&gt).for_each(|&p, &g| {
            match (is_foreground(p), is_foreground(g)) {
                (true, true) => ans.true_positive += 1,
                (true, false) => ans.false_positive += 1,
                (false, true) => ans.false_negative += 1,
                (false, false) => ans.true_negative += 1,
            }
        });
        ans
    }

    /// 体素总数.
    #[inline]
    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    /// 预测前景体素个数 (TP + FP).
    #[inline]
    pub fn predicted(&self) -> u64 {
        self.true_positive + self.false_positive
    }

    /// 真值前景体素个数 (TP + FN).
    #[inline]
    pub fn actual(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    /// 交集大小.
    #[inline]
    pub fn intersection(&self) -> u64 {
        self.true_positive
    }

    /// 并集大小.
    #[inline]
    pub fn union(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative
    }

    /// Jaccard 指数 `TP / (TP + FP + FN)`. 并集为空时两者相同, 返回 1.
    pub fn jaccard(&self) -> f64 {
        match self.union() {
            0 => 1.0,
            u => self.true_positive as f64 / u as f64,
        }
    }

    /// 敏感度 `TP / (TP + FN)`. 真值没有前景时无定义, 返回 `None`.
    pub fn sensitivity(&self) -> Option<f64> {
        match self.actual() {
            0 => None,
            a => Some(self.true_positive as f64 / a as f64),
        }
    }

    /// 假阳性体素个数.
    #[inline]
    pub fn false_positives(&self) -> u64 {
        self.false_positive
    }

    /// 假阴性体素个数.
    #[inline]
    pub fn false_negatives(&self) -> u64 {
        self.false_negative
    }
}

/// 单个病例的评估指标.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scores {
    /// Jaccard 指数.
    pub jaccard: f64,
    /// 敏感度, 无定义时为 `None`.
    pub sensitivity: Option<f64>,
    /// 假阳性体素个数.
    pub false_positives: u64,
    /// 假阴性体素个数.
    pub false_negatives: u64,
}

impl From<Confusion> for Scores {
    fn from(c: Confusion) -> Self {
        Self {
            jaccard: c.jaccard(),
            sensitivity: c.sensitivity(),
            false_positives: c.false_positives(),
            false_negatives: c.false_negatives(),
        }
    }
}

/// 评估预测掩膜 `pred` 相对真值 `gt` 的全部指标.
pub fn evaluate(pred: &LungMask, gt: &LungMask) -> SegResult<Scores> {
    Ok(Confusion::between(pred.data(), gt.data())?.into())
}

/// 多个病例的汇总统计.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    /// 病例数.
    pub cases: usize,
    /// Jaccard 指数均值.
    pub jaccard_mean: f64,
    /// Jaccard 指数 (总体) 标准差.
    pub jaccard_std: f64,
    /// Jaccard 指数最小值.
    pub jaccard_min: f64,
    /// Jaccard 指数最大值.
    pub jaccard_max: f64,
    /// 有定义的敏感度的均值. 全部无定义时为 `None`.
    pub sensitivity_mean: Option<f64>,
    /// 敏感度无定义的病例数.
    pub sensitivity_undefined: usize,
    /// 平均假阳性体素个数.
    pub false_positives_mean: f64,
    /// 平均假阴性体素个数.
    pub false_negatives_mean: f64,
}

impl Summary {
    /// 汇总 `scores`. 没有任何病例时返回 `None`.
    pub fn from_scores(scores: &[Scores]) -> Option<Self> {
        let (jaccard_min, jaccard_max) = scores
            .iter()
            .map(|s| s.jaccard)
            .minmax_by(f64::total_cmp)
            .into_option()?;
        let n = scores.len() as f64;
        let mean = |f: &dyn Fn(&Scores) -> f64| scores.iter().map(f).sum::<f64>() / n;

        let jaccard_mean = mean(&|s: &Scores| s.jaccard);
        let jaccard_var = mean(&|s: &Scores| (s.jaccard - jaccard_mean).powi(2));

        let defined: Vec<f64> = scores.iter().filter_map(|s| s.sensitivity).collect();
        let sensitivity_mean =
            (!defined.is_empty()).then(|| defined.iter().sum::<f64>() / defined.len() as f64);

        Some(Self {
            cases: scores.len(),
            jaccard_mean,
            jaccard_std: jaccard_var.sqrt(),
            jaccard_min,
            jaccard_max,
            sensitivity_mean,
            sensitivity_undefined: scores.len() - defined.len(),
            false_positives_mean: mean(&|s: &Scores| s.false_positives as f64),
            false_negatives_mean: mean(&|s: &Scores| s.false_negatives as f64),
        })
    }
}
