use ndarray::{Array2, ArrayView2};

/// 以 `k × k` 窗口对 `img` 做中值滤波. 越界像素取最近的边缘像素 (replicate).
///
/// `k` 必须为奇数, 否则程序 panic.
pub fn median_filter(img: ArrayView2<i16>, k: usize) -> Array2<i16> {
    assert_eq!(k % 2, 1, "中值滤波窗口边长必须为奇数");
    let (h, w) = img.dim();
    let mut out = Array2::zeros((h, w));
    if h == 0 || w == 0 {
        return out;
    }

    let r = (k / 2) as isize;
    let clamp = |v: usize, d: isize, len: usize| (v as isize + d).clamp(0, len as isize - 1) as usize;
    let mut window = Vec::with_capacity(k * k);
    for ((y, x), pix) in out.indexed_iter_mut() {
        window.clear();
        for dy in -r..=r {
            let yy = clamp(y, dy, h);
            window.extend((-r..=r).map(|dx| img[(yy, clamp(x, dx, w))]));
        }
        let mid = window.len() / 2;
        *pix = *window.select_nth_unstable(mid).1;
    }
    out
}
