//! 对 `lung-berry::dataset` 的更一层封装. 提供更直接的数据集加载器.

use lung_berry::dataset::vessel12::{self, CaseLoader};
use std::env;
use std::path::{Path, PathBuf};

/// 获取 VESSEL12 数据集基本路径.
///
/// 1. 若环境变量 `$VESSEL12_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/vessel12`. 无法确定用户主目录时返回 `None`.
pub fn vessel12_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var("VESSEL12_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => lung_berry::dataset::home_dataset_dir_with(["vessel12"]),
    }
}

/// 获取预测结果的输出目录: 环境变量 `$VESSEL12_OUT` 非空时返回其值, 否则为 `None`.
pub fn output_dir_from_env() -> Option<PathBuf> {
    env::var_os("VESSEL12_OUT")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
}

/// 获取 VESSEL12 全部病例的加载器.
pub fn case_loader<P: AsRef<Path>>(path: P) -> CaseLoader {
    vessel12::full_case_loader(path)
}
