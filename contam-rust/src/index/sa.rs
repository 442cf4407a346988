use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::TryReserveError;

/// 构建后缀数组（基于倍增法，O(n log n) 轮次的并行排序）。
/// 输入为数值化的文本（1:A,2:C,3:G,4:T,5:N），不需要结尾哨兵：
/// 越过文本末尾的位置按 -1 处理，因此较短的后缀（EOS）排在前面。
pub fn build_sa(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    let mut bufs = SaBuffers {
        sa: Vec::with_capacity(n),
        rank: Vec::with_capacity(n),
        tmp: Vec::with_capacity(n),
        out: Vec::with_capacity(n),
    };
    doubling(text, &mut bufs);
    bufs.out
}

/// 与 [`build_sa`] 相同，但所有工作缓冲区都先用 `try_reserve_exact` 申请，
/// 空间不足时返回错误而不是中止进程。
pub fn try_build_sa(text: &[u8]) -> Result<Vec<u32>, TryReserveError> {
    let n = text.len();
    let mut bufs = SaBuffers { sa: Vec::new(), rank: Vec::new(), tmp: Vec::new(), out: Vec::new() };
    bufs.sa.try_reserve_exact(n)?;
    bufs.rank.try_reserve_exact(n)?;
    bufs.tmp.try_reserve_exact(n)?;
    bufs.out.try_reserve_exact(n)?;
    doubling(text, &mut bufs);
    Ok(bufs.out)
}

// 调用方已为每个缓冲区预留 text.len() 的容量，下面不会再扩容
struct SaBuffers {
    sa: Vec<usize>,
    rank: Vec<i32>,
    tmp: Vec<i32>,
    out: Vec<u32>,
}

fn doubling(text: &[u8], bufs: &mut SaBuffers) {
    let n = text.len();
    if n == 0 {
        return;
    }
    let SaBuffers { sa, rank, tmp, out } = bufs;
    sa.extend(0..n);
    rank.extend(text.iter().map(|&b| b as i32));
    tmp.resize(n, 0);

    let mut k = 1usize;
    loop {
        {
            let rank = &*rank;
            let key = |i: usize| (rank[i], if i + k < n { rank[i + k] } else { -1 });
            sa.par_sort_unstable_by(|&i, &j| key(i).cmp(&key(j)));

            tmp[sa[0]] = 0;
            for w in 1..n {
                let a = sa[w - 1];
                let b = sa[w];
                tmp[b] = tmp[a] + if key(b) != key(a) { 1 } else { 0 };
            }
        }

        // 复制回 rank
        rank.copy_from_slice(tmp);
        if rank[sa[n - 1]] as usize == n - 1 || k >= n {
            break;
        }
        k <<= 1;
    }

    out.extend(sa.iter().map(|&x| x as u32));
}

/// 单条 vector 序列上的后缀数组，支持精确子串的二分定位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixArray {
    text: Vec<u8>,
    sa: Vec<u32>,
}

impl SuffixArray {
    /// 构建所需的全部空间都经由 [`try_build_sa`] 预先申请。
    pub fn try_build(text: Vec<u8>) -> Result<Self, TryReserveError> {
        let sa = try_build_sa(&text)?;
        Ok(Self { text, sa })
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.sa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    /// 后缀数组槽位对应的文本起始偏移
    #[inline]
    pub fn offset(&self, slot: usize) -> usize {
        self.sa[slot] as usize
    }

    /// 比较从 `pos` 开始的后缀与 probe 的前 probe.len() 个碱基。
    /// 后缀提前结束视为小于 probe。
    fn cmp_probe(&self, pos: usize, probe: &[u8]) -> Ordering {
        let suffix = &self.text[pos..];
        for (i, &p) in probe.iter().enumerate() {
            match suffix.get(i) {
                None => return Ordering::Less,
                Some(&t) if t != p => return t.cmp(&p),
                Some(_) => {}
            }
        }
        Ordering::Equal
    }

    #[inline]
    fn matches_at(&self, slot: usize, probe: &[u8]) -> bool {
        slot < self.sa.len() && self.cmp_probe(self.offset(slot), probe) == Ordering::Equal
    }

    /// 返回与 probe 精确匹配的最小槽位
    pub fn locate_first_exact(&self, probe: &[u8]) -> Option<usize> {
        if probe.is_empty() {
            return None;
        }
        let slot = self
            .sa
            .partition_point(|&p| self.cmp_probe(p as usize, probe) == Ordering::Less);
        self.matches_at(slot, probe).then_some(slot)
    }

    /// 返回与 probe 精确匹配的最大槽位
    pub fn locate_last_exact(&self, probe: &[u8]) -> Option<usize> {
        if probe.is_empty() {
            return None;
        }
        let end = self
            .sa
            .partition_point(|&p| self.cmp_probe(p as usize, probe) != Ordering::Greater);
        let slot = end.checked_sub(1)?;
        self.matches_at(slot, probe).then_some(slot)
    }

    /// 给定上一个匹配槽位，返回下一个仍然匹配的槽位
    pub fn locate_next_exact(&self, prev: usize, probe: &[u8]) -> Option<usize> {
        let slot = prev + 1;
        self.matches_at(slot, probe).then_some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_sa(text: &[u8]) -> Vec<u32> {
        let n = text.len();
        let mut suffixes: Vec<(usize, &[u8])> = (0..n).map(|i| (i, &text[i..])).collect();
        suffixes.sort_by(|a, b| a.1.cmp(b.1));
        suffixes.into_iter().map(|(i, _)| i as u32).collect()
    }

    fn make_text(len: usize, seed: u32) -> Vec<u8> {
        let mut x: u32 = seed;
        let mut v = Vec::with_capacity(len);
        for _ in 0..len {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            v.push(((x >> 16) % 5) as u8 + 1);
        }
        v
    }

    #[test]
    fn sa_basic() {
        // 文本：A C G T -> 1 2 3 4
        let sa = build_sa(&[1u8, 2, 3, 4]);
        assert_eq!(sa, vec![0, 1, 2, 3]);
    }

    #[test]
    fn sa_shorter_suffix_sorts_first() {
        // A A A：较短的后缀字典序更小
        let sa = build_sa(&[1u8, 1, 1]);
        assert_eq!(sa, vec![2, 1, 0]);
    }

    #[test]
    fn sa_matches_naive_on_small_random_texts() {
        for len in 1..=40 {
            let text = make_text(len, 1_234_567 + len as u32);
            assert_eq!(build_sa(&text), naive_sa(&text), "mismatch on len={}", len);
        }
    }

    #[test]
    fn try_build_sa_agrees_with_build_sa() {
        assert_eq!(try_build_sa(&[]).unwrap(), Vec::<u32>::new());
        for len in [1, 2, 17, 300] {
            let text = make_text(len, 77 + len as u32);
            let sa = try_build_sa(&text).unwrap();
            assert_eq!(sa, build_sa(&text));
            assert_eq!(sa, naive_sa(&text));
        }
        let sfx = SuffixArray::try_build(vec![1, 1, 1]).unwrap();
        assert_eq!((0..sfx.len()).map(|s| sfx.offset(s)).collect::<Vec<_>>(), vec![2, 1, 0]);
    }

    #[test]
    fn locate_first_last_next_agree_with_scan() {
        let text = make_text(300, 42);
        let sfx = SuffixArray::try_build(text.clone()).unwrap();
        for start in [0usize, 17, 100, 250, 296] {
            let probe = &text[start..start + 4];
            let expected: Vec<usize> = (0..sfx.len())
                .filter(|&s| text[sfx.offset(s)..].starts_with(probe))
                .collect();
            let first = sfx.locate_first_exact(probe).unwrap();
            let last = sfx.locate_last_exact(probe).unwrap();
            assert_eq!(first, expected[0]);
            assert_eq!(last, *expected.last().unwrap());

            let mut walked = vec![first];
            let mut cur = first;
            while let Some(next) = sfx.locate_next_exact(cur, probe) {
                walked.push(next);
                cur = next;
            }
            assert_eq!(walked, expected);
        }
    }

    #[test]
    fn locate_reports_absent_probe() {
        let sfx = SuffixArray::try_build(vec![1, 2, 3, 4, 1, 2, 3, 4]).unwrap();
        assert_eq!(sfx.locate_first_exact(&[4, 4]), None);
        assert_eq!(sfx.locate_last_exact(&[4, 4]), None);
        // probe 超出文本末尾
        assert_eq!(sfx.locate_first_exact(&[3, 4, 1, 2, 3, 4, 1]), None);
        assert_eq!(sfx.locate_first_exact(&[]), None);
        assert!(sfx.locate_first_exact(&[2, 3, 4]).is_some());
    }
}
