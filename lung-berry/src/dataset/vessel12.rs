//! VESSEL12 CT scan/肺掩膜数据加载器.
//!
//! 数据集目录结构:
//!
//! ```text
//! {base}/data/VESSEL12_{i:02}/VESSEL12_{i:02}.nii.gz
//! {base}/masks/VESSEL12_01-20_Lungmasks/VESSEL12_{i:02}.nii.gz
//! ```
//!
//! 提供迭代器风格的数据集获取模式.

use crate::consts::VESSEL12_CASES;
use crate::{CtCase, SegResult};
use std::path::{Path, PathBuf};

/// 肺掩膜所在的子目录.
const MASK_DIR: &str = "VESSEL12_01-20_Lungmasks";

/// 病例 `idx` 在数据集 `base` 下的 scan 路径.
pub fn scan_path<P: AsRef<Path>>(base: P, idx: u32) -> PathBuf {
    let name = format!("VESSEL12_{idx:02}");
    let mut ans = base.as_ref().join("data");
    ans.push(&name);
    ans.push(format!("{name}.nii.gz"));
    ans
}

/// 病例 `idx` 在数据集 `base` 下的肺掩膜路径.
pub fn mask_path<P: AsRef<Path>>(base: P, idx: u32) -> PathBuf {
    let mut ans = base.as_ref().join("masks");
    ans.push(MASK_DIR);
    ans.push(format!("VESSEL12_{idx:02}.nii.gz"));
    ans
}

/// 从指定索引和数据集路径创建 VESSEL12 病例 ([`CtCase`]) 加载器.
///
/// # 注意
///
/// 1. `base` 必须是目录, 否则程序 panic.
/// 2. 缺失或损坏的病例不会中断迭代, 加载器在对应位置返回 `Result::Err`.
pub fn case_loader<I: IntoIterator<Item = u32>, P: AsRef<Path>>(data: I, base: P) -> CaseLoader {
    let base = base.as_ref().to_owned();
    assert!(base.is_dir());

    let mut data: Vec<u32> = data.into_iter().collect();
    data.reverse();

    CaseLoader {
        base,
        data_rev: data,
    }
}

/// 从指定数据集路径创建加载器, 按索引序迭代全部 20 个 VESSEL12 病例 (1 至 20).
///
/// # 注意
///
/// `base` 必须是目录, 否则程序 panic.
pub fn full_case_loader<P: AsRef<Path>>(base: P) -> CaseLoader {
    case_loader(1..=VESSEL12_CASES, base)
}

/// VESSEL12 病例 (scan + 肺掩膜) 加载器.
#[derive(Debug)]
pub struct CaseLoader {
    base: PathBuf,
    data_rev: Vec<u32>,
}

impl Iterator for CaseLoader {
    type Item = (u32, SegResult<CtCase>);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.data_rev.pop()?;
        let case = CtCase::open(scan_path(&self.base, idx), mask_path(&self.base, idx));
        Some((idx, case))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.data_rev.len(), Some(self.data_rev.len()))
    }
}

impl ExactSizeIterator for CaseLoader {
    #[inline]
    fn len(&self) -> usize {
        self.data_rev.len()
    }
}
