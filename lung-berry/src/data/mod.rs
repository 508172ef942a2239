use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayD, ArrayView, Axis, Ix3};
use ndarray_npy::{read_npy, write_npy};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::gray::{binarize, is_foreground};
use crate::{Idx2d, Idx3d, SegError, SegResult};

pub mod slice;
pub mod window;

pub use slice::{MaskSlice, ScanSlice};
pub use window::CtWindow;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 手动拼接的 header 的 `intent_name` 前缀.
const FAKE_INTENT: &[u8] = b"fake";

/// 将 nifti 的 `[W, H, z]` 数组转换成 `(z, H, W)` 标准布局数组. 以后均按照该模式访问.
fn into_zhw<T: Clone>(data: ArrayD<T>) -> SegResult<Array3<T>> {
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = data
        .permuted_axes([2, 1, 0].as_slice())
        .into_dimensionality::<Ix3>()?;

    // The nature of nifti data field layout.
    Ok(if data.is_standard_layout() {
        data
    } else {
        data.as_standard_layout().into_owned()
    })
}

/// 为手动拼接的体数据创建 header. 体素分辨率均为 1 毫米.
fn fake_header() -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    header.pixdim = [1.0; 8];
    header.intent_name[..FAKE_INTENT.len()].copy_from_slice(FAKE_INTENT);
    header
}

/// 3D CT 体数据 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小 `(z, 高, 宽)`.
    fn shape(&self) -> Idx3d;

    /// 获取数据水平切片形状大小.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 判断该结构是否是由 `from_array` 一类方法手动拼接的.
    #[inline]
    fn is_faked(&self) -> bool {
        self.header().intent_name.starts_with(FAKE_INTENT)
    }
}

/// nii 格式 3D CT 扫描, 包括 header 和 CT 扫描 (HU). HU 值以 `i16` 保存.
///
/// 扫描一经加载即只读, 分割流水线只借用它.
#[derive(Debug, Clone)]
pub struct CtScan {
    header: BoxedHeader,
    data: Array3<i16>,
}

impl NiftiHeaderAttr for CtScan {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for CtScan {
    type Output = i16;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl CtScan {
    /// 打开 nii 文件格式 (`.nii` 或 `.nii.gz`) 的 3D CT 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());
        let data = into_zhw(obj.into_volume().into_ndarray::<i16>()?)?;
        Ok(Self { header, data })
    }

    /// 由 `(z, 高, 宽)` 组织的裸 HU 数据直接创建扫描. header 为手动拼接的,
    /// 体素分辨率均为 1 毫米.
    pub fn from_array(data: Array3<i16>) -> Self {
        Self {
            header: fake_header(),
            data,
        }
    }

    /// 获取 3D 扫描 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ScanSlice<'_> {
        ScanSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取能按升序迭代 3D 扫描水平不可变切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ScanSlice> {
        self.data.axis_iter(Axis(0)).map(ScanSlice::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, i16, Ix3> {
        self.data.view()
    }
}

/// 3D 肺掩膜, 包括 header 和掩膜数据. 像素值以 `u8` 保存, 非零即肺.
#[derive(Debug, Clone)]
pub struct LungMask {
    header: BoxedHeader,
    data: Array3<u8>,
}

impl NiftiHeaderAttr for LungMask {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for LungMask {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl LungMask {
    /// 打开 nii 文件格式的 3D 肺掩膜. 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());
        let data = into_zhw(obj.into_volume().into_ndarray::<u8>()?)?;
        Ok(Self { header, data })
    }

    /// 打开由 [`LungMask::save_npy`] 保存的 `(z, 高, 宽)` npy 掩膜. header 为手动拼接的.
    pub fn open_npy<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let data: Array3<u8> = read_npy(path)?;
        Ok(Self::from_array(data))
    }

    /// 以 npy 格式保存掩膜数据, 不含 header.
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> SegResult<()> {
        write_npy(path, &self.data)?;
        Ok(())
    }

    /// 由 `(z, 高, 宽)` 组织的裸掩膜直接创建. header 为手动拼接的.
    pub fn from_array(data: Array3<u8>) -> Self {
        Self {
            header: fake_header(),
            data,
        }
    }

    /// 创建与 `scan` 共享 header 的掩膜.
    ///
    /// 若 `data` 与 `scan` 形状不一致, 返回 [`SegError::ShapeMismatch`].
    pub fn from_array_like(scan: &CtScan, data: Array3<u8>) -> SegResult<Self> {
        if scan.data.shape() != data.shape() {
            return Err(SegError::shape_mismatch(scan.data.shape(), data.shape()));
        }
        Ok(Self {
            header: scan.header.clone(),
            data,
        })
    }

    /// 获取 3D 掩膜 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice<'_> {
        MaskSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取能按升序迭代 3D 掩膜水平不可变切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = MaskSlice> {
        self.data.axis_iter(Axis(0)).map(MaskSlice::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 取出掩膜数据.
    #[inline]
    pub fn into_data(self) -> Array3<u8> {
        self.data
    }

    /// 肺体素个数.
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&p| is_foreground(p)).count()
    }

    /// 肺的实际体积, 以毫升为单位.
    #[inline]
    pub fn volume_ml(&self) -> f64 {
        self.count_foreground() as f64 * self.voxel() / 1000.0
    }

    /// 将所有非零像素规范为 1.
    pub fn binarize(&mut self) {
        self.data.mapv_inplace(binarize);
    }
}

/// 同一病例的扫描和真值肺掩膜. 两者形状保证一致.
#[derive(Debug, Clone)]
pub struct CtCase {
    scan: CtScan,
    mask: LungMask,
}

impl CtCase {
    /// 分别从 nii 文件打开扫描和真值掩膜.
    ///
    /// 若两者形状不一致, 返回 [`SegError::ShapeMismatch`].
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(scan: P, mask: Q) -> SegResult<Self> {
        Self::new(CtScan::open(scan)?, LungMask::open(mask)?)
    }

    /// 组合扫描和真值掩膜. 若两者形状不一致, 返回 [`SegError::ShapeMismatch`].
    pub fn new(scan: CtScan, mask: LungMask) -> SegResult<Self> {
        if scan.shape() != mask.shape() {
            return Err(SegError::shape_mismatch(
                scan.data.shape(),
                mask.data.shape(),
            ));
        }
        Ok(Self { scan, mask })
    }

    /// CT 扫描.
    #[inline]
    pub fn scan(&self) -> &CtScan {
        &self.scan
    }

    /// 真值肺掩膜.
    #[inline]
    pub fn mask(&self) -> &LungMask {
        &self.mask
    }

    /// 拆分为扫描和真值掩膜.
    #[inline]
    pub fn into_parts(self) -> (CtScan, LungMask) {
        (self.scan, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::{CtCase, CtScan, LungMask, NiftiHeaderAttr};
    use crate::SegError;
    use ndarray::Array3;

    #[test]
    fn test_from_array_attr() {
        let scan = CtScan::from_array(Array3::from_elem((3, 4, 5), -1000));
        assert!(scan.is_faked());
        assert_eq!(scan.shape(), (3, 4, 5));
        assert_eq!(scan.slice_shape(), (4, 5));
        assert_eq!(scan.len_z(), 3);
        assert_eq!(scan.size(), 60);
        assert_eq!(scan.voxel(), 1.0);
        assert_eq!(scan.slice_iter().len(), 3);
        assert_eq!(scan[(2, 3, 4)], -1000);
    }

    #[test]
    fn test_mask_foreground() {
        let mut data = Array3::<u8>::zeros((2, 3, 3));
        data[(0, 1, 1)] = 1;
        data[(1, 2, 2)] = 255;
        let mut mask = LungMask::from_array(data);
        assert_eq!(mask.count_foreground(), 2);
        assert!((mask.volume_ml() - 0.002).abs() < 1e-12);

        mask.binarize();
        assert_eq!(mask[(1, 2, 2)], 1);
        assert_eq!(mask.count_foreground(), 2);
    }

    #[test]
    fn test_case_shape_mismatch() {
        let scan = CtScan::from_array(Array3::zeros((3, 4, 5)));
        let mask = LungMask::from_array(Array3::zeros((3, 5, 4)));
        match CtCase::new(scan, mask) {
            Err(SegError::ShapeMismatch { left, right }) => {
                assert_eq!(left, vec![3, 4, 5]);
                assert_eq!(right, vec![3, 5, 4]);
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_mask_like_scan() {
        let scan = CtScan::from_array(Array3::zeros((3, 4, 5)));
        assert!(LungMask::from_array_like(&scan, Array3::zeros((3, 4, 5))).is_ok());
        assert!(LungMask::from_array_like(&scan, Array3::zeros((3, 4, 4))).is_err());
    }

    #[test]
    fn test_npy_round_trip() {
        let mut data = Array3::<u8>::zeros((3, 4, 5));
        data[(1, 2, 3)] = 1;
        let mask = LungMask::from_array(data);

        let path = std::env::temp_dir().join(format!("lung-berry-{}.npy", std::process::id()));
        mask.save_npy(&path).unwrap();
        let loaded = LungMask::open_npy(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.data(), mask.data());
    }
}
