//! Flank 前缀/后缀 trie。
//!
//! 所有 overlay 类型共享一个节点 arena，每个类型有自己的根节点。
//! 子节点引用是 1-based 的 arena 下标（0 表示没有子节点），
//! arena 扩容不会使已有下标失效。

use crate::util::dna::BASE_N;
use std::collections::TryReserveError;

/// 每个节点最多 5 个分支（A/C/G/T/N）
pub const MAX_BRANCHES: usize = 5;

/// 可独立建根的 trie 数量（四种 flank overlay 类型）
pub const NUM_ROOTS: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieBranch {
    pub base: u8,
    /// 第一个经过此分支的 contaminant（插入顺序即优先级）
    pub contam_id: u32,
    /// 经过此分支的 contaminant 中，从此处起剩余的最大长度（剪枝上界）
    pub max_remaining: u16,
    /// 1-based 子节点下标，0 = 无
    pub child: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieNode {
    branches: [TrieBranch; MAX_BRANCHES],
    len: u8,
}

impl TrieNode {
    pub fn branches(&self) -> &[TrieBranch] {
        &self.branches[..self.len as usize]
    }

    fn find(&self, base: u8) -> Option<usize> {
        self.branches().iter().position(|b| b.base == base)
    }
}

/// 一次 trie 匹配的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieHit {
    pub subs: u32,
    pub contam_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlankTrie {
    nodes: Vec<TrieNode>,
    roots: [u32; NUM_ROOTS],
}

impl FlankTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self, slot: usize) -> Option<usize> {
        match self.roots.get(slot) {
            Some(&r) if r > 0 => Some(r as usize - 1),
            _ => None,
        }
    }

    /// 申请一个空节点，返回 1-based 下标
    fn alloc_node(&mut self) -> Result<u32, TryReserveError> {
        if self.nodes.len() == self.nodes.capacity() {
            self.nodes.try_reserve(self.nodes.len().max(256))?;
        }
        self.nodes.push(TrieNode::default());
        Ok(self.nodes.len() as u32)
    }

    /// 将一条 contaminant 按遍历顺序（5' 类型从末端向前，3' 类型从首端向后）
    /// 插入到 `slot` 对应的 trie。
    pub fn insert<I>(&mut self, slot: usize, contam_id: u32, walk: I) -> Result<(), TryReserveError>
    where
        I: ExactSizeIterator<Item = u8>,
    {
        let mut remaining = walk.len();
        if remaining == 0 {
            return Ok(());
        }
        if self.roots[slot] == 0 {
            self.roots[slot] = self.alloc_node()?;
        }
        let mut node = self.roots[slot] as usize - 1;

        for base in walk {
            let bi = match self.nodes[node].find(base) {
                Some(bi) => {
                    let br = &mut self.nodes[node].branches[bi];
                    if (br.max_remaining as usize) < remaining {
                        br.max_remaining = remaining as u16;
                    }
                    bi
                }
                None => {
                    let n = &mut self.nodes[node];
                    let bi = n.len as usize;
                    n.branches[bi] = TrieBranch {
                        base,
                        contam_id,
                        max_remaining: remaining as u16,
                        child: 0,
                    };
                    n.len += 1;
                    bi
                }
            };
            remaining -= 1;
            if remaining == 0 {
                break;
            }
            let mut child = self.nodes[node].branches[bi].child;
            if child == 0 {
                child = self.alloc_node()?;
                self.nodes[node].branches[bi].child = child;
            }
            node = child as usize - 1;
        }
        Ok(())
    }

    /// 在 `slot` 的 trie 上匹配整个窗口，`reverse` 为真时从窗口末端向前读取。
    pub fn match_window(&self, slot: usize, max_subs: u32, window: &[u8], reverse: bool) -> Option<TrieHit> {
        let root = self.root(slot)?;
        if window.is_empty() {
            return None;
        }
        self.recursive_match(root, max_subs, window, reverse, 0)
    }

    /// 返回替换数最少的命中；0 替换的命中立即返回。
    /// 查询碱基为 N 时总是计为一次替换；contaminant 上的 N 与任意非 N 碱基匹配。
    pub fn recursive_match(
        &self,
        node: usize,
        max_subs: u32,
        window: &[u8],
        reverse: bool,
        depth: usize,
    ) -> Option<TrieHit> {
        let remaining = window.len() - depth;
        let q = if reverse { window[remaining - 1] } else { window[depth] };

        let mut best: Option<TrieHit> = None;
        for br in self.nodes[node].branches() {
            if (br.max_remaining as usize) < remaining {
                continue;
            }
            let cost = u32::from(q == BASE_N || (br.base != BASE_N && br.base != q));
            if cost > max_subs {
                continue;
            }

            let hit = if remaining == 1 {
                Some(TrieHit { subs: cost, contam_id: br.contam_id })
            } else if br.child == 0 {
                None
            } else {
                self.recursive_match(br.child as usize - 1, max_subs - cost, window, reverse, depth + 1)
                    .map(|h| TrieHit { subs: h.subs + cost, ..h })
            };

            if let Some(h) = hit {
                if h.subs == 0 {
                    return Some(h);
                }
                if best.map_or(true, |b| h.subs < b.subs) {
                    best = Some(h);
                }
            }
        }
        best
    }
}
