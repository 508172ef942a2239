//! 🫁欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{CtCase, CtScan, CtWindow, LungMask, MaskSlice, NiftiHeaderAttr, ScanSlice};
pub use crate::{HuRange, SegConfig, SegError, SegResult};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_LUNG};
pub use crate::consts::VESSEL12_CASES;

pub use crate::eval::{Confusion, Scores, Summary};
pub use crate::pipeline::{segment_lung, Direction, Segmenter, SliceContours, Stages, TrackState};

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{self, vessel12};

pub use crate::vis::ImgWriteVis;
