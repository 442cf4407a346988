//! Read screening against a finalized [`ContamIndex`].
//!
//! Flank contaminants are matched as overlaps onto a read end: a 5' type
//! looks for a contaminant suffix covering the read prefix, a 3' type for a
//! contaminant prefix covering the read suffix. Overlaps are tried longest
//! first, so the first hit is the longest overlap. Vector contaminants must
//! fully contain the read and are checked before any flank.

use serde::Serialize;

use super::index::{ContamIndex, VectorIndex};
use super::types::*;
use crate::util::dna;

/// Longest flank overlap found on one read end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlankHit {
    pub contam_type: ContamType,
    pub contam_id: u32,
    pub overlap: usize,
    pub subs: u32,
}

/// Vector fully containing a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VectorHit {
    pub contam_id: u32,
    pub mismatches: u32,
    /// Read matched the reverse complement of the vector.
    pub antisense: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadHit {
    Flank(FlankHit),
    Vector(VectorHit),
}

impl ReadHit {
    /// Bases of the read attributed to contamination.
    pub fn overlap(&self, read_len: usize) -> usize {
        match self {
            ReadHit::Flank(h) => h.overlap,
            ReadHit::Vector(_) => read_len,
        }
    }

    pub fn contam_id(&self) -> u32 {
        match self {
            ReadHit::Flank(h) => h.contam_id,
            ReadHit::Vector(h) => h.contam_id,
        }
    }

    pub fn contam_type(&self) -> ContamType {
        match self {
            ReadHit::Flank(h) => h.contam_type,
            ReadHit::Vector(_) => ContamType::Vector,
        }
    }
}

/// Substitutions accepted over an overlap of `overlap` bases.
#[inline]
pub fn max_flank_subs(allow_sub_rate: u32, overlap: usize) -> u32 {
    if allow_sub_rate == 0 || overlap < 10 {
        0
    } else {
        allow_sub_rate * (overlap as u32 + 15) / 25
    }
}

fn query_ok(allow_sub_rate: u32, qlen: usize) -> bool {
    allow_sub_rate <= MAX_SUB_RATE && (MIN_CONTAM_QUERY_LEN..=MAX_CONTAM_QUERY_LEN).contains(&qlen)
}

/// Mismatches between equal-length code slices, counting stops at `limit`.
fn count_mismatches(a: &[u8], b: &[u8], limit: u32) -> u32 {
    let mut mm = 0;
    for (x, y) in a.iter().zip(b) {
        if x != y {
            mm += 1;
            if mm >= limit {
                break;
            }
        }
    }
    mm
}

impl ContamIndex {
    /// Length of the longest overlap of contaminant type `t` onto `query`
    /// (ASCII bases), 0 if none. A read contained in a vector checked for
    /// the same read end reports its full length.
    pub fn match_contaminants(&self, t: ContamType, allow_sub_rate: u32, min_overlap: usize, query: &[u8]) -> usize {
        if !t.is_flank() || !query_ok(allow_sub_rate, query.len()) {
            return 0;
        }
        let codes = dna::encode_seq(query);
        if self.find_vector_containment(t.is_pe2(), allow_sub_rate, &codes).is_some() {
            return codes.len();
        }
        self.find_flank_overlap(t, allow_sub_rate, min_overlap, &codes)
            .map_or(0, |h| h.overlap)
    }

    /// Flank overlap only, on already encoded bases.
    pub fn find_flank_overlap(
        &self,
        t: ContamType,
        allow_sub_rate: u32,
        min_overlap: usize,
        codes: &[u8],
    ) -> Option<FlankHit> {
        if !t.is_flank() || !query_ok(allow_sub_rate, codes.len()) {
            return None;
        }
        let info = self.type_info[t.index()];
        if info.count == 0 {
            return None;
        }
        let qlen = codes.len();
        let min_overlap = min_overlap.max(1);
        let longest = qlen.min(info.max_len);
        if longest < min_overlap {
            return None;
        }
        self.stats.record_check(t);

        let five_prime = t.is_five_prime();
        for overlap in (min_overlap..=longest).rev() {
            let window = if five_prime { &codes[..overlap] } else { &codes[qlen - overlap..] };
            let max_subs = max_flank_subs(allow_sub_rate, overlap);
            if let Some(hit) = self.trie.match_window(t.index(), max_subs, window, five_prime) {
                self.stats.record_flank_hit(t, hit.contam_id, overlap);
                return Some(FlankHit { contam_type: t, contam_id: hit.contam_id, overlap, subs: hit.subs });
            }
        }
        None
    }

    /// Whether `query` (ASCII) is contained in any vector flagged for the
    /// given read end. Returns the read length on a hit, else 0.
    pub fn match_vect_contams(&self, is_pe2: bool, allow_sub_rate: u32, query: &[u8]) -> usize {
        let codes = dna::encode_seq(query);
        self.find_vector_containment(is_pe2, allow_sub_rate, &codes)
            .map_or(0, |_| codes.len())
    }

    /// Best containing vector on already encoded bases; returns immediately
    /// on an exact containment.
    pub fn find_vector_containment(&self, is_pe2: bool, allow_sub_rate: u32, codes: &[u8]) -> Option<VectorHit> {
        if self.vectors.is_empty() || !query_ok(allow_sub_rate, codes.len()) {
            return None;
        }
        let mut rc: Option<Vec<u8>> = None;
        let mut best: Option<VectorHit> = None;

        for v in &self.vectors {
            let (sense, antisense) = (v.flags.sense(is_pe2), v.flags.antisense(is_pe2));
            if !(sense || antisense) || v.len() < codes.len() {
                continue;
            }
            self.stats.record_check(ContamType::Vector);

            if sense {
                if let Some(mm) = vect_contained(allow_sub_rate, codes, v) {
                    let hit = VectorHit { contam_id: v.id, mismatches: mm, antisense: false };
                    if mm == 0 {
                        self.stats.record_vector_hit(v.id);
                        return Some(hit);
                    }
                    if best.map_or(true, |b| mm < b.mismatches) {
                        best = Some(hit);
                    }
                }
            }
            if antisense {
                let rc = rc.get_or_insert_with(|| dna::revcomp_codes(codes));
                if let Some(mm) = vect_contained(allow_sub_rate, rc, v) {
                    let hit = VectorHit { contam_id: v.id, mismatches: mm, antisense: true };
                    if mm == 0 {
                        self.stats.record_vector_hit(v.id);
                        return Some(hit);
                    }
                    if best.map_or(true, |b| mm < b.mismatches) {
                        best = Some(hit);
                    }
                }
            }
        }

        if let Some(hit) = best {
            self.stats.record_vector_hit(hit.contam_id);
        }
        best
    }

    /// Mismatches of the best containment of `query` (ASCII, sense strand)
    /// in vector `vector_id`. Counters are not touched.
    pub fn match_vect_contam(&self, allow_sub_rate: u32, query: &[u8], vector_id: u32) -> Option<u32> {
        let codes = dna::encode_seq(query);
        if !query_ok(allow_sub_rate, codes.len()) {
            return None;
        }
        let v = self.vectors.iter().find(|v| v.id == vector_id)?;
        if v.len() < codes.len() {
            return None;
        }
        vect_contained(allow_sub_rate, &codes, v)
    }

    /// Screen one read: vector containment first, then the 5' type and the
    /// 3' type for the read's end.
    pub fn locate_read_contamination(
        &self,
        is_pe2: bool,
        allow_sub_rate: u32,
        min_overlap: usize,
        read: &[u8],
    ) -> Option<ReadHit> {
        if !query_ok(allow_sub_rate, read.len()) {
            return None;
        }
        let codes = dna::encode_seq(read);
        if let Some(v) = self.find_vector_containment(is_pe2, allow_sub_rate, &codes) {
            return Some(ReadHit::Vector(v));
        }
        [ContamType::five_prime_for(is_pe2), ContamType::three_prime_for(is_pe2)]
            .into_iter()
            .find_map(|t| self.find_flank_overlap(t, allow_sub_rate, min_overlap, &codes))
            .map(ReadHit::Flank)
    }
}

/// Seed-and-extend containment of `query` in one vector.
///
/// With substitutions allowed the read is cut into `allowed + 1` windows; by
/// pigeonhole at least one window of a qualifying placement matches exactly,
/// so every exact window hit is extended to a full-length comparison.
fn vect_contained(allow_sub_rate: u32, query: &[u8], v: &VectorIndex) -> Option<u32> {
    let qlen = query.len();
    let sfx = &v.sfx;
    if allow_sub_rate == 0 || qlen <= 25 {
        return sfx.locate_first_exact(query).map(|_| 0);
    }

    let allowed = (qlen / 25) as u32 * allow_sub_rate;
    let win = qlen / (allowed as usize + 1);
    let text = sfx.text();
    let mut lowest = allowed + 1;

    let mut ofs = 0;
    while ofs < qlen {
        if ofs + win > qlen {
            ofs = qlen - win;
        }
        let probe = &query[ofs..ofs + win];
        let mut hit = sfx.locate_first_exact(probe);
        let mut iters = 0;
        while let Some(slot) = hit {
            iters += 1;
            // the first located slot plus MAX_SEED_ITERS follow-ups
            if iters > MAX_SEED_ITERS + 1 {
                break;
            }
            let pos = sfx.offset(slot);
            if pos >= ofs && pos - ofs + qlen <= text.len() {
                let start = pos - ofs;
                let mm = count_mismatches(query, &text[start..start + qlen], lowest);
                if mm < lowest {
                    lowest = mm;
                    if lowest == 0 {
                        return Some(0);
                    }
                }
            }
            hit = sfx.locate_next_exact(slot, probe);
        }
        ofs += win;
    }
    (lowest <= allowed).then_some(lowest)
}
