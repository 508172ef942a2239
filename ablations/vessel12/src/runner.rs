//! 程序运行函数.

use crate::result::EvaluationResult;
use log::{info, warn};
use lung_berry::eval::{self, Scores};
use lung_berry::prelude::*;
use lung_berry::vis;
use std::fs;
use std::path::Path;
use std::time::Instant;
use utils::loader;

/// 实际运行.
pub fn run() -> EvaluationResult {
    let base = loader::vessel12_dir_from_env_or_home().expect("Cannot locate home directory");
    assert!(base.is_dir(), "Dataset directory `{}` not found", base.display());

    let out = loader::output_dir_from_env();
    if let Some(dir) = out.as_deref() {
        fs::create_dir_all(dir).expect("Cannot create output directory");
    }

    let segmenter = Segmenter::default();
    let mut result = EvaluationResult::default();
    println!("Segmenting VESSEL12 cases with {} threads...", utils::cpus());

    for (idx, case) in loader::case_loader(&base) {
        let case = match case {
            Ok(c) => c,
            Err(e) => {
                warn!("case {idx:02}: loading failed: {e}");
                result.push_failure(idx, e.to_string());
                continue;
            }
        };
        match run_case(&segmenter, idx, &case, out.as_deref()) {
            Ok(scores) => result.push(idx, scores),
            Err(e) => {
                warn!("case {idx:02}: {e}");
                result.push_failure(idx, e.to_string());
            }
        }
    }
    result
}

/// 分割并评估单个病例. 若给出 `out`, 同时保存预测掩膜和中心切片对比图.
fn run_case(
    segmenter: &Segmenter,
    idx: u32,
    case: &CtCase,
    out: Option<&Path>,
) -> SegResult<Scores> {
    let start = Instant::now();
    let pred = segmenter.segment(case.scan())?;
    let elapsed = start.elapsed();
    let scores = eval::evaluate(&pred, case.mask())?;
    info!(
        "case {idx:02}: jaccard {:.4}, {} ms",
        scores.jaccard,
        elapsed.as_millis()
    );

    if let Some(dir) = out {
        pred.save_npy(dir.join(format!("VESSEL12_{idx:02}.npy")))?;
        let z = case.scan().len_z() / 2;
        vis::save_comparison(
            case.scan().slice_at(z),
            case.mask().slice_at(z),
            pred.slice_at(z),
            dir.join(format!("VESSEL12_{idx:02}_z{z}.png")),
        )?;
    }
    Ok(scores)
}
