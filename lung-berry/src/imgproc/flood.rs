use super::neighbour4;
use crate::Idx2d;
use ndarray::Array2;
use std::collections::VecDeque;

/// 从 `seed` 出发, 以 4-邻接规则将所有与 `seed` 像素值相同的连通像素改写为 `new_val`.
///
/// `filled` 与 `img` 同形, 记录所有被填充过的位置. 已被填充的位置不会再次参与,
/// 因此对同一 `filled` 连续调用时, 它最终就是所有填充区域的并集.
///
/// 返回本次填充的像素个数. `seed` 越界或已被填充时返回 0.
pub fn flood_fill(img: &mut Array2<u8>, filled: &mut Array2<bool>, seed: Idx2d, new_val: u8) -> usize {
    debug_assert_eq!(img.dim(), filled.dim());
    let target = match (img.get(seed), filled.get(seed)) {
        (Some(&v), Some(&false)) => v,
        _ => return 0,
    };

    let mut bfs_q = VecDeque::from([seed]);
    filled[seed] = true;
    let mut cnt = 0;
    while let Some(cur) = bfs_q.pop_front() {
        img[cur] = new_val;
        cnt += 1;
        for pos in neighbour4(cur) {
            if img.get(pos) == Some(&target) && !filled[pos] {
                filled[pos] = true;
                bfs_q.push_back(pos);
            }
        }
    }
    cnt
}

#[cfg(test)]
mod tests {
    use super::flood_fill;
    use ndarray::{array, Array2};

    #[test]
    fn test_flood_fill_4_connected() {
        let mut img = array![
            [0u8, 0, 1, 0],
            [1, 0, 1, 0],
            [0, 1, 0, 0],
            [0, 1, 0, 1],
        ];
        let mut filled = Array2::from_elem(img.dim(), false);
        // (2, 0) 与 (0, 0) 仅对角相邻, 不会被填充.
        assert_eq!(flood_fill(&mut img, &mut filled, (0, 0), 7), 3);
        assert_eq!(img[(1, 1)], 7);
        assert_eq!(img[(2, 0)], 0);
        assert!(!filled[(2, 0)]);
    }

    #[test]
    fn test_flood_fill_same_value() {
        let mut img = Array2::<u8>::zeros((3, 3));
        let mut filled = Array2::from_elem(img.dim(), false);
        assert_eq!(flood_fill(&mut img, &mut filled, (0, 0), 0), 9);
        // 再次填充同一区域没有效果.
        assert_eq!(flood_fill(&mut img, &mut filled, (2, 2), 0), 0);
        assert!(filled.iter().all(|&f| f));
    }

    #[test]
    fn test_flood_fill_out_of_bound() {
        let mut img = Array2::<u8>::zeros((2, 2));
        let mut filled = Array2::from_elem(img.dim(), false);
        assert_eq!(flood_fill(&mut img, &mut filled, (2, 0), 1), 0);
        assert_eq!(img, Array2::zeros((2, 2)));
    }
}
