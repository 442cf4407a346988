use std::sync::atomic::{AtomicU32, Ordering};

use super::stats::{ContamStats, StatsCounters};
use super::types::*;
use crate::index::sa::SuffixArray;
use crate::index::trie::FlankTrie;

/// Count and length range of the contaminants of one overlay type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeInfo {
    pub count: usize,
    pub min_len: usize,
    pub max_len: usize,
}

impl TypeInfo {
    pub(crate) fn add(&mut self, len: usize) {
        if self.count == 0 || len < self.min_len {
            self.min_len = len;
        }
        self.max_len = self.max_len.max(len);
        self.count += 1;
    }

    fn merge(self, other: TypeInfo) -> TypeInfo {
        match (self.count, other.count) {
            (0, _) => other,
            (_, 0) => self,
            _ => TypeInfo {
                count: self.count + other.count,
                min_len: self.min_len.min(other.min_len),
                max_len: self.max_len.max(other.max_len),
            },
        }
    }
}

/// A vector contaminant together with its suffix array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorIndex {
    pub id: u32,
    pub name: String,
    pub flags: VectorFlags,
    pub sfx: SuffixArray,
}

impl VectorIndex {
    pub fn len(&self) -> usize {
        self.sfx.text().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sfx.text().is_empty()
    }

    pub fn bases(&self) -> &[u8] {
        self.sfx.text()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Flank(usize),
    Vector(usize),
}

/// Finalized, read-only contaminant index.
///
/// Queries only take `&self`, so one index may be shared by any number of
/// threads; the hit counters are the only shared mutable state.
#[derive(Debug)]
pub struct ContamIndex {
    /// Sorted by (type, length desc, id).
    pub(crate) flanks: Vec<FlankContam>,
    pub(crate) vectors: Vec<VectorIndex>,
    /// Indexed by id - 1.
    slots: Vec<Slot>,
    pub(crate) type_info: [TypeInfo; 4],
    pub(crate) trie: FlankTrie,
    pub(crate) stats: ContamStats,
    files: Vec<String>,
    last_resolved: AtomicU32,
}

impl ContamIndex {
    pub(crate) fn new(
        flanks: Vec<FlankContam>,
        vectors: Vec<VectorIndex>,
        type_info: [TypeInfo; 4],
        trie: FlankTrie,
        stats: ContamStats,
        files: Vec<String>,
    ) -> Self {
        let mut slots = vec![Slot::Flank(0); flanks.len() + vectors.len()];
        for (i, f) in flanks.iter().enumerate() {
            slots[f.id as usize - 1] = Slot::Flank(i);
        }
        for (i, v) in vectors.iter().enumerate() {
            slots[v.id as usize - 1] = Slot::Vector(i);
        }
        Self { flanks, vectors, slots, type_info, trie, stats, files, last_resolved: AtomicU32::new(0) }
    }

    fn slot(&self, id: u32) -> Option<Slot> {
        let slot = *self.slots.get((id as usize).checked_sub(1)?)?;
        self.last_resolved.store(id, Ordering::Relaxed);
        Some(slot)
    }

    fn class_info(&self, class: ContamClass) -> TypeInfo {
        let flank = self.type_info.iter().fold(TypeInfo::default(), |acc, t| acc.merge(*t));
        let mut vector = TypeInfo::default();
        for v in &self.vectors {
            vector.add(v.len());
        }
        match class {
            ContamClass::All => flank.merge(vector),
            ContamClass::Flank => flank,
            ContamClass::Vector => vector,
        }
    }

    pub fn num_of_contaminants(&self, class: ContamClass) -> usize {
        match class {
            ContamClass::All => self.slots.len(),
            ContamClass::Flank => self.flanks.len(),
            ContamClass::Vector => self.vectors.len(),
        }
    }

    /// 0 when no contaminant of `class` is loaded.
    pub fn max_contaminant_len(&self, class: ContamClass) -> usize {
        self.class_info(class).max_len
    }

    pub fn min_contaminant_len(&self, class: ContamClass) -> usize {
        self.class_info(class).min_len
    }

    /// Length range of one overlay type.
    pub fn type_info(&self, t: ContamType) -> TypeInfo {
        match t {
            ContamType::Vector => self.class_info(ContamClass::Vector),
            _ => self.type_info[t.index()],
        }
    }

    pub fn contaminant_type(&self, id: u32) -> Option<ContamType> {
        Some(match self.slot(id)? {
            Slot::Flank(i) => self.flanks[i].contam_type,
            Slot::Vector(_) => ContamType::Vector,
        })
    }

    pub fn contaminant_class(&self, id: u32) -> Option<ContamClass> {
        Some(match self.slot(id)? {
            Slot::Flank(_) => ContamClass::Flank,
            Slot::Vector(_) => ContamClass::Vector,
        })
    }

    pub fn contaminant_name(&self, id: u32) -> Option<&str> {
        Some(match self.slot(id)? {
            Slot::Flank(i) => self.flanks[i].name.as_str(),
            Slot::Vector(i) => self.vectors[i].name.as_str(),
        })
    }

    pub fn contaminant_len(&self, id: u32) -> Option<usize> {
        Some(match self.slot(id)? {
            Slot::Flank(i) => self.flanks[i].len(),
            Slot::Vector(i) => self.vectors[i].len(),
        })
    }

    /// Case-insensitive name lookup.
    ///
    /// A name may be shared by entries of several overlay types, so the id
    /// most recently resolved by an id-keyed accessor wins when it carries
    /// the name; otherwise the lowest matching id is returned.
    pub fn contaminant_id(&self, name: &str) -> Option<u32> {
        let last = self.last_resolved.load(Ordering::Relaxed);
        if let Some(slot) = (last as usize).checked_sub(1).and_then(|i| self.slots.get(i)) {
            let last_name = match *slot {
                Slot::Flank(i) => &self.flanks[i].name,
                Slot::Vector(i) => &self.vectors[i].name,
            };
            if last_name.eq_ignore_ascii_case(name) {
                return Some(last);
            }
        }
        let flank = self.flanks.iter().filter(|f| f.name.eq_ignore_ascii_case(name)).map(|f| f.id);
        let vector = self.vectors.iter().filter(|v| v.name.eq_ignore_ascii_case(name)).map(|v| v.id);
        flank.chain(vector).min()
    }

    /// Fill `counts[i]` with hits at overlap length `i + 1` and return the
    /// contaminant's total hits. Vectors have no overlap distribution and
    /// only report their total. Unknown ids return 0.
    pub fn contaminant_dist(&self, id: u32, counts: &mut [u64]) -> u64 {
        counts.fill(0);
        let Some(slot) = self.slot(id) else { return 0 };
        let Some(c) = self.stats.contam_counts(id) else { return 0 };
        if let Slot::Flank(i) = slot {
            let n = counts.len().min(self.flanks[i].len());
            for (len, out) in counts.iter_mut().enumerate().take(n) {
                *out = c.hit_dist.get(len + 1).copied().unwrap_or(0);
            }
        }
        c.hit_tot
    }

    pub fn num_checks(&self, t: ContamType) -> u64 {
        self.stats.num_checks(t)
    }

    pub fn type_hits(&self, t: ContamType) -> u64 {
        self.stats.type_hits(t)
    }

    /// Hits per overlap length (index = overlap) for a flank type.
    pub fn type_dist(&self, t: ContamType) -> Vec<u64> {
        self.stats.type_dist(t)
    }

    pub fn stats_snapshot(&self) -> StatsCounters {
        self.stats.snapshot()
    }

    /// Flank contaminants in index order.
    pub fn flank_contams(&self) -> &[FlankContam] {
        &self.flanks
    }

    pub fn vector_contams(&self) -> &[VectorIndex] {
        &self.vectors
    }

    pub fn trie(&self) -> &FlankTrie {
        &self.trie
    }

    /// Contaminant files this index was built from.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Same contaminants, tries and suffix arrays; counters are ignored.
    pub fn same_structure(&self, other: &ContamIndex) -> bool {
        self.flanks == other.flanks
            && self.vectors == other.vectors
            && self.slots == other.slots
            && self.type_info == other.type_info
            && self.trie == other.trie
    }
}

#[cfg(test)]
mod tests {
    use crate::contam::loader::ContamLoader;
    use crate::contam::types::*;
    use std::io::Cursor;

    fn build(text: &str) -> super::ContamIndex {
        let mut l = ContamLoader::new();
        l.load_contaminants(Cursor::new(text.as_bytes().to_vec())).unwrap();
        l.finalize().unwrap()
    }

    #[test]
    fn accessors_by_id() {
        let v = "ACGTTGCA".repeat(16);
        let idx = build(&format!(">A@1\nACGTACGTAC\n>Vec&1\n{}\n>B@3\nGGGGCCCC\n", v));
        assert_eq!(idx.num_of_contaminants(ContamClass::All), 3);
        assert_eq!(idx.num_of_contaminants(ContamClass::Flank), 2);
        assert_eq!(idx.num_of_contaminants(ContamClass::Vector), 1);

        assert_eq!(idx.contaminant_type(1), Some(ContamType::FivePrimePe1));
        assert_eq!(idx.contaminant_type(2), Some(ContamType::Vector));
        assert_eq!(idx.contaminant_class(3), Some(ContamClass::Flank));
        assert_eq!(idx.contaminant_name(2), Some("Vec"));
        assert_eq!(idx.contaminant_len(2), Some(128));
        assert_eq!(idx.contaminant_type(0), None);
        assert_eq!(idx.contaminant_name(4), None);

        assert_eq!(idx.max_contaminant_len(ContamClass::Flank), 10);
        assert_eq!(idx.min_contaminant_len(ContamClass::Flank), 8);
        assert_eq!(idx.max_contaminant_len(ContamClass::All), 128);
        assert_eq!(idx.min_contaminant_len(ContamClass::All), 8);
        assert_eq!(idx.min_contaminant_len(ContamClass::Vector), 128);
        assert_eq!(idx.type_info(ContamType::ThreePrimePe1).count, 1);
        assert_eq!(idx.type_info(ContamType::ThreePrimePe2).count, 0);
    }

    #[test]
    fn name_lookup_prefers_last_resolved_id() {
        let idx = build(">Adapt@12\nACGTACGTAC\n");
        assert_eq!(idx.contaminant_id("adapt"), Some(1));
        let name = idx.contaminant_name(2).unwrap().to_string();
        assert_eq!(idx.contaminant_id(&name), Some(2));
        assert_eq!(idx.contaminant_id("missing"), None);
    }

    #[test]
    fn dist_is_zeroed_for_unknown_and_unhit() {
        let idx = build(">A@1\nACGTACGTAC\n");
        let mut counts = vec![7u64; 20];
        assert_eq!(idx.contaminant_dist(1, &mut counts), 0);
        assert!(counts.iter().all(|&c| c == 0));
        counts.fill(3);
        assert_eq!(idx.contaminant_dist(9, &mut counts), 0);
        assert!(counts.iter().all(|&c| c == 0));
    }
}
