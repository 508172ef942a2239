//! 切片的可视化与持久化存储. 所有图像都以 PNG 等 `image` 支持的格式保存, 格式由扩展名决定.

use crate::consts::gray::{is_foreground, BLACK, WHITE};
use crate::consts::rgb;
use crate::pipeline::SliceContours;
use crate::{CtWindow, MaskSlice, ScanSlice, SegError, SegResult};
use image::{GrayImage, ImageResult, Luma, Rgb, RgbImage};
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于 [`MaskSlice`], 背景保存为黑色, 肺保存为白色;
/// 对于 [`ScanSlice`], 以肺窗 (窗位 -600, 窗宽 1500) 规范化.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 肺窗.
const LUNG_WINDOW: CtWindow = CtWindow::from_lung_visual();

/// 使掩膜像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(p: u8) -> u8 {
    if is_foreground(p) {
        WHITE
    } else {
        BLACK
    }
}

impl ImgWriteVis for ScanSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        for ((h, w), &hu) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([LUNG_WINDOW.eval_hu(hu)]));
        }
        buf.save(path)
    }
}

impl ImgWriteVis for MaskSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([pretty(pix)]));
        }
        buf.save(path)
    }
}

/// 以肺窗将扫描切片转换为灰度 RGB 底图.
fn scan_rgb(scan: ScanSlice) -> RgbImage {
    let (height, width) = scan.shape();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let g = LUNG_WINDOW.eval_hu(scan[(y as usize, x as usize)]);
        Rgb([g, g, g])
    })
}

/// 两种颜色各占一半.
#[inline]
fn blend(Rgb(base): Rgb<u8>, over: [u8; 3]) -> Rgb<u8> {
    Rgb(std::array::from_fn(|i| ((base[i] as u16 + over[i] as u16) / 2) as u8))
}

/// 在扫描切片上画出候选轮廓, 按长度降序循环使用 [`rgb::CONTOURS`] 中的颜色.
pub fn contour_image(scan: ScanSlice, contours: &SliceContours) -> SegResult<RgbImage> {
    if scan.shape() != contours.shape() && !contours.is_empty() {
        let (l, r) = (scan.shape(), contours.shape());
        return Err(SegError::shape_mismatch(&[l.0, l.1], &[r.0, r.1]));
    }
    let mut buf = scan_rgb(scan);
    for (contour, color) in contours.contours().iter().zip(rgb::CONTOURS.iter().cycle()) {
        for &(h, w) in contour.points() {
            buf.put_pixel(w as u32, h as u32, Rgb(*color));
        }
    }
    Ok(buf)
}

/// 将 [`contour_image`] 保存到 `path`.
pub fn save_contours<P: AsRef<Path>>(
    scan: ScanSlice,
    contours: &SliceContours,
    path: P,
) -> SegResult<()> {
    contour_image(scan, contours)?.save(path)?;
    Ok(())
}

/// 对比图: 在扫描切片上以半透明颜色叠加真阳性 (绿), 假阳性 (红), 假阴性 (蓝).
pub fn comparison_image(scan: ScanSlice, gt: MaskSlice, pred: MaskSlice) -> SegResult<RgbImage> {
    for other in [gt.shape(), pred.shape()] {
        if other != scan.shape() {
            let (l, r) = (scan.shape(), other);
            return Err(SegError::shape_mismatch(&[l.0, l.1], &[r.0, r.1]));
        }
    }
    let mut buf = scan_rgb(scan);
    for ((h, w), &g) in gt.indexed_iter() {
        let color = match (is_foreground(pred[(h, w)]), is_foreground(g)) {
            (true, true) => rgb::TRUE_POSITIVE,
            (true, false) => rgb::FALSE_POSITIVE,
            (false, true) => rgb::FALSE_NEGATIVE,
            (false, false) => continue,
        };
        let (x, y) = (w as u32, h as u32);
        buf.put_pixel(x, y, blend(*buf.get_pixel(x, y), color));
    }
    Ok(buf)
}

/// 将 [`comparison_image`] 保存到 `path`.
pub fn save_comparison<P: AsRef<Path>>(
    scan: ScanSlice,
    gt: MaskSlice,
    pred: MaskSlice,
    path: P,
) -> SegResult<()> {
    comparison_image(scan, gt, pred)?.save(path)?;
    Ok(())
}
