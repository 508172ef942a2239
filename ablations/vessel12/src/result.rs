//! 实验结果.

use lung_berry::eval::{Scores, Summary};
use std::io::{self, Write};

#[inline]
fn f64_to_display(f: Option<f64>) -> String {
    match f {
        Some(f) => format!("{f:.6}"),
        None => "/".to_string(),
    }
}

/// 将单个病例的结果写进 `w` 中.
fn describe_into<W: Write>(idx: u32, s: &Scores, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Case `VESSEL12_{idx:02}`:")?;
    writeln!(w, "{S4}Jaccard: {:.6}", s.jaccard)?;
    writeln!(w, "{S4}Sensitivity: {}", f64_to_display(s.sensitivity))?;
    writeln!(w, "{S4}False positives: {}", s.false_positives)?;
    write!(w, "{S4}False negatives: {}", s.false_negatives)?;
    Ok(())
}

/// 将汇总统计写进 `w` 中.
fn summarize_into<W: Write>(s: &Summary, failed: usize, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Summary of {} cases ({failed} failed):", s.cases)?;
    writeln!(
        w,
        "{S4}Jaccard: {:.6} ± {:.6} (min {:.6}, max {:.6})",
        s.jaccard_mean, s.jaccard_std, s.jaccard_min, s.jaccard_max
    )?;
    writeln!(
        w,
        "{S4}Sensitivity: {} ({} undefined)",
        f64_to_display(s.sensitivity_mean),
        s.sensitivity_undefined
    )?;
    writeln!(w, "{S4}Average false positives: {:.1}", s.false_positives_mean)?;
    write!(w, "{S4}Average false negatives: {:.1}", s.false_negatives_mean)?;
    Ok(())
}

/// 评估最终结果.
#[derive(Debug, Default)]
pub struct EvaluationResult {
    data: Vec<(u32, Scores)>,
    failed: Vec<(u32, String)>,
}

impl EvaluationResult {
    /// 记录成功评估的病例.
    pub fn push(&mut self, idx: u32, scores: Scores) {
        self.data.push((idx, scores));
    }

    /// 记录失败的病例.
    pub fn push_failure(&mut self, idx: u32, reason: String) {
        self.failed.push((idx, reason));
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (idx, scores) in self.data.iter() {
            describe_into(*idx, scores, &mut buf).unwrap();
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }

        for (idx, reason) in self.failed.iter() {
            println!("Case `VESSEL12_{idx:02}` failed: {reason}");
        }

        let scores: Vec<Scores> = self.data.iter().map(|(_, s)| *s).collect();
        match Summary::from_scores(&scores) {
            Some(summary) => {
                summarize_into(&summary, self.failed.len(), &mut buf).unwrap();
                println!("{}", String::from_utf8_lossy(&buf));
            }
            None => println!("No case evaluated."),
        }
        utils::sep();
    }
}
