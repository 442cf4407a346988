use log::{debug, info, warn};
use std::io::BufRead;
use std::path::Path;

use super::descriptor::{parse_descriptor, Overlay};
use super::error::ContamError;
use super::index::{ContamIndex, TypeInfo, VectorIndex};
use super::stats::ContamStats;
use super::types::*;
use crate::index::sa::SuffixArray;
use crate::index::trie::FlankTrie;
use crate::io::fasta::FastaReader;
use crate::util::dna;

/// Accumulates raw contaminant sequences until [`ContamLoader::finalize`]
/// builds the searchable [`ContamIndex`].
///
/// Ids are dense across both classes and assigned in load order. Any error
/// resets the loader; a failed call never leaves a partial load behind.
#[derive(Debug, Default)]
pub struct ContamLoader {
    flanks: Vec<FlankContam>,
    vectors: Vec<VectContam>,
    num_contams: u32,
    files: Vec<String>,
}

impl ContamLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything loaded so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn num_contaminants(&self) -> usize {
        self.num_contams as usize
    }

    pub fn flanks(&self) -> &[FlankContam] {
        &self.flanks
    }

    pub fn vectors(&self) -> &[VectContam] {
        &self.vectors
    }

    /// Files loaded so far, in load order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Load a contaminant multi-FASTA. Returns the total number of
    /// contaminants held after the load.
    pub fn load_contaminants_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, ContamError> {
        let path_str = path.as_ref().display().to_string();
        info!("loading contaminants from '{}'", path_str);
        let fh = match std::fs::File::open(path.as_ref()) {
            Ok(fh) => fh,
            Err(e) => {
                self.reset();
                return Err(ContamError::Io { path: path_str, source: e.into() });
            }
        };
        let total = self.load_contaminants(std::io::BufReader::new(fh)).map_err(|e| match e {
            ContamError::Io { source, .. } => ContamError::Io { path: path_str.clone(), source },
            other => other,
        })?;
        self.files.push(path_str);
        Ok(total)
    }

    /// Load contaminants from any buffered multi-FASTA source.
    pub fn load_contaminants<R: BufRead>(&mut self, reader: R) -> Result<usize, ContamError> {
        let before = self.num_contams;
        match self.load_records(reader) {
            Ok(()) => {
                info!(
                    "accepted {} contaminant entries ({} flank, {} vector in total)",
                    self.num_contams - before,
                    self.flanks.len(),
                    self.vectors.len()
                );
                Ok(self.num_contaminants())
            }
            Err(e) => {
                warn!("contaminant load failed, discarding all contaminants: {}", e);
                self.reset();
                Err(e)
            }
        }
    }

    fn load_records<R: BufRead>(&mut self, reader: R) -> Result<(), ContamError> {
        let mut fasta = FastaReader::new(reader);
        let mut ordinal = 0usize;
        loop {
            let rec = match fasta.next_record() {
                Ok(Some(rec)) => rec,
                Ok(None) => break,
                Err(e) => return Err(ContamError::Io { path: String::new(), source: e }),
            };
            ordinal += 1;
            let desc = parse_descriptor(&rec.id, ordinal)?;
            let mut codes = encode_strict(&desc.name, &rec.seq)?;

            match desc.overlay {
                Overlay::Vector(flags) => {
                    check_len(&desc.name, codes.len(), MIN_VECTOR_LEN, MAX_VECTOR_LEN)?;
                    self.add_vect_contam(flags, &desc.name, &codes)?;
                }
                Overlay::Flank(flags) => {
                    check_len(&desc.name, codes.len(), MIN_FLANK_LEN, MAX_FLANK_LEN)?;
                    for t in flags.forward_types() {
                        self.add_flank_contam(t, false, &desc.name, &codes)?;
                    }
                    if flags.any_rev_cpl() {
                        dna::revcomp_codes_in_place(&mut codes);
                        let rc_name = format!("{}.xRC", desc.name);
                        for t in flags.rev_cpl_types() {
                            self.add_flank_contam(t, true, &rc_name, &codes)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn next_id(&mut self) -> u32 {
        self.num_contams += 1;
        self.num_contams
    }

    /// Add one flank contaminant (`bases` already encoded) for overlay type `t`.
    pub fn add_flank_contam(
        &mut self,
        t: ContamType,
        rev_cpl: bool,
        name: &str,
        bases: &[u8],
    ) -> Result<u32, ContamError> {
        let res = self.try_add_flank(t, rev_cpl, name, bases);
        if res.is_err() {
            self.reset();
        }
        res
    }

    fn try_add_flank(&mut self, t: ContamType, rev_cpl: bool, name: &str, bases: &[u8]) -> Result<u32, ContamError> {
        if !t.is_flank() {
            return Err(ContamError::Parameter(format!("'{}' is not a flank overlay type", t)));
        }
        check_name(name)?;
        check_len(name, bases.len(), MIN_FLANK_LEN, MAX_FLANK_LEN)?;
        check_codes(name, bases)?;
        if self.flanks.len() >= MAX_FLANK_CONTAMS {
            return Err(ContamError::Parameter(format!(
                "too many flank contaminants (max allowed {}) at '{}'",
                MAX_FLANK_CONTAMS, name
            )));
        }

        for other in self.flanks.iter().filter(|f| f.contam_type == t) {
            let same_name = other.name.eq_ignore_ascii_case(name);
            let same_seq = other.bases == bases;
            if same_name {
                return Err(ContamError::Duplicate(format!(
                    "contaminant name '{}' of overlay type {} already loaded{}",
                    name,
                    t,
                    if same_seq { " with the same sequence" } else { " with a different sequence" }
                )));
            }
            if same_seq {
                return Err(ContamError::Duplicate(format!(
                    "contaminants '{}' and '{}' of overlay type {} share the same sequence",
                    name, other.name, t
                )));
            }
        }

        if self.flanks.len() == self.flanks.capacity() {
            self.flanks
                .try_reserve(self.flanks.len().max(8))
                .map_err(ContamError::memory("flank contaminants"))?;
        }
        let id = self.next_id();
        debug!("flank contaminant {} '{}' ({}bp) for {}", id, name, bases.len(), t);
        self.flanks.push(FlankContam {
            id,
            contam_type: t,
            rev_cpl,
            name: name.to_string(),
            bases: bases.to_vec(),
        });
        Ok(id)
    }

    /// Add one vector contaminant (`bases` already encoded).
    pub fn add_vect_contam(&mut self, flags: VectorFlags, name: &str, bases: &[u8]) -> Result<u32, ContamError> {
        let res = self.try_add_vect(flags, name, bases);
        if res.is_err() {
            self.reset();
        }
        res
    }

    fn try_add_vect(&mut self, flags: VectorFlags, name: &str, bases: &[u8]) -> Result<u32, ContamError> {
        if !flags.any() {
            return Err(ContamError::Parameter(format!("vector '{}' has no read end to check", name)));
        }
        check_name(name)?;
        check_len(name, bases.len(), MIN_VECTOR_LEN, MAX_VECTOR_LEN)?;
        check_codes(name, bases)?;
        if self.vectors.len() >= MAX_VECTOR_CONTAMS {
            return Err(ContamError::Parameter(format!(
                "too many vector contaminants (max allowed {}) at '{}'",
                MAX_VECTOR_CONTAMS, name
            )));
        }
        let name_taken = self.flanks.iter().any(|f| f.name.eq_ignore_ascii_case(name))
            || self.vectors.iter().any(|v| v.name.eq_ignore_ascii_case(name));
        if name_taken {
            return Err(ContamError::Duplicate(format!("vector name '{}' already in use", name)));
        }
        if let Some(other) = self.vectors.iter().find(|v| v.bases == bases) {
            return Err(ContamError::Duplicate(format!(
                "vectors '{}' and '{}' share the same sequence",
                name, other.name
            )));
        }

        let mut owned = Vec::new();
        owned
            .try_reserve_exact(bases.len())
            .map_err(ContamError::memory(format!("vector '{}' sequence", name)))?;
        owned.extend_from_slice(bases);

        let id = self.next_id();
        debug!("vector contaminant {} '{}' ({}bp)", id, name, bases.len());
        self.vectors.push(VectContam { id, name: name.to_string(), flags, bases: owned });
        Ok(id)
    }

    /// Sort the flank contaminants, build the per-type tries and the vector
    /// suffix arrays. The loader keeps its contaminants, so finalizing again
    /// yields an identical index.
    pub fn finalize(&mut self) -> Result<ContamIndex, ContamError> {
        let res = self.build_index();
        if res.is_err() {
            self.reset();
        }
        res
    }

    fn build_index(&self) -> Result<ContamIndex, ContamError> {
        if self.num_contams == 0 {
            return Err(ContamError::Parameter("no contaminants loaded".to_string()));
        }

        // longer, then earlier loaded, contaminants own shared trie branches
        let mut flanks = self.flanks.clone();
        flanks.sort_by(|a, b| {
            a.contam_type
                .cmp(&b.contam_type)
                .then(b.len().cmp(&a.len()))
                .then(a.id.cmp(&b.id))
        });

        let mut type_info = [TypeInfo::default(); 4];
        let mut trie = FlankTrie::new();
        for f in &flanks {
            let slot = f.contam_type.index();
            type_info[slot].add(f.len());
            let res = if f.contam_type.is_five_prime() {
                trie.insert(slot, f.id, f.bases.iter().rev().copied())
            } else {
                trie.insert(slot, f.id, f.bases.iter().copied())
            };
            res.map_err(ContamError::memory("flank trie nodes"))?;
        }

        let mut vectors = Vec::with_capacity(self.vectors.len());
        for v in &self.vectors {
            let sfx = SuffixArray::try_build(v.bases.clone())
                .map_err(ContamError::memory(format!("vector '{}' suffix array", v.name)))?;
            vectors.push(VectorIndex { id: v.id, name: v.name.clone(), flags: v.flags, sfx });
        }

        let mut is_flank = vec![false; self.num_contams as usize];
        for f in &flanks {
            is_flank[f.id as usize - 1] = true;
        }
        let stats = ContamStats::new(&is_flank);

        info!(
            "finalized {} contaminants: {} flank ({} trie nodes), {} vector",
            self.num_contams,
            flanks.len(),
            trie.num_nodes(),
            vectors.len()
        );
        Ok(ContamIndex::new(flanks, vectors, type_info, trie, stats, self.files.clone()))
    }
}

fn check_name(name: &str) -> Result<(), ContamError> {
    if name.is_empty() {
        return Err(ContamError::Parameter("contaminant name is empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ContamError::Parameter(format!(
            "contaminant name '{}' longer than {} characters",
            name, MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn check_len(name: &str, len: usize, min: usize, max: usize) -> Result<(), ContamError> {
    if len < min || len > max {
        return Err(ContamError::Parameter(format!(
            "sequence for '{}' is {}bp, outside of accepted length range {}..{}",
            name, len, min, max
        )));
    }
    Ok(())
}

fn check_codes(name: &str, codes: &[u8]) -> Result<(), ContamError> {
    match codes.iter().find(|&&c| !(dna::BASE_A..=dna::BASE_N).contains(&c)) {
        Some(&c) => Err(ContamError::Base { name: name.to_string(), base: char::from(dna::from_alphabet(c)) }),
        None => Ok(()),
    }
}

fn encode_strict(name: &str, seq: &[u8]) -> Result<Vec<u8>, ContamError> {
    seq.iter()
        .map(|&b| dna::to_alphabet_strict(b).ok_or_else(|| ContamError::Base { name: name.to_string(), base: char::from(b) }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(text: &str) -> Result<ContamLoader, ContamError> {
        let mut l = ContamLoader::new();
        l.load_contaminants(Cursor::new(text.as_bytes().to_vec()))?;
        Ok(l)
    }

    fn vector_seq(seed: u32, len: usize) -> String {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                b"ACGT"[(x >> 16) as usize % 4] as char
            })
            .collect()
    }

    #[test]
    fn flank_codes_fan_out_to_types() {
        let l = load(">AdaptorA@12\nACGTACGTAC\n").unwrap();
        assert_eq!(l.num_contaminants(), 2);
        let types: Vec<_> = l.flanks().iter().map(|f| f.contam_type).collect();
        assert_eq!(types, vec![ContamType::FivePrimePe1, ContamType::FivePrimePe2]);
        assert!(l.flanks().iter().all(|f| f.name == "AdaptorA" && !f.rev_cpl));
    }

    #[test]
    fn default_flags_add_reverse_complement_entries() {
        let l = load(">Adapt\nAACCGGTTAC\n").unwrap();
        assert_eq!(l.num_contaminants(), 4);
        let rc: Vec<_> = l.flanks().iter().filter(|f| f.rev_cpl).collect();
        assert_eq!(rc.len(), 2);
        assert_eq!(rc[0].name, "Adapt.xRC");
        assert_eq!(dna::decode_seq(&rc[0].bases), b"GTAACCGGTT");
    }

    #[test]
    fn ids_are_dense_across_classes() {
        let text = format!(">A@1\nACGTAC\n>V&1\n{}\n>B@3\nTTTTGG\n", vector_seq(9, 150));
        let l = load(&text).unwrap();
        assert_eq!(l.flanks()[0].id, 1);
        assert_eq!(l.vectors()[0].id, 2);
        assert_eq!(l.flanks()[1].id, 3);
    }

    #[test]
    fn illegal_base_is_base_error_and_resets() {
        let mut l = ContamLoader::new();
        l.load_contaminants(Cursor::new(b">ok@1\nACGTAC\n".to_vec())).unwrap();
        let err = l.load_contaminants(Cursor::new(b">bad@1\nACGRAC\n".to_vec())).unwrap_err();
        assert!(matches!(err, ContamError::Base { base: 'R', .. }));
        assert_eq!(l.num_contaminants(), 0);
    }

    #[test]
    fn length_out_of_range_is_parameter_error() {
        assert!(matches!(load(">short@1\nACG\n"), Err(ContamError::Parameter(_))));
        let long = "A".repeat(MAX_FLANK_LEN + 1);
        assert!(matches!(load(&format!(">long@1\n{}\n", long)), Err(ContamError::Parameter(_))));
        assert!(matches!(load(">vec&1\nACGTACGT\n"), Err(ContamError::Parameter(_))));
    }

    #[test]
    fn duplicates_are_rejected() {
        // 同类型同名（大小写不敏感）
        assert!(matches!(load(">A@1\nACGTAC\n>a@1\nTTTTTT\n"), Err(ContamError::Duplicate(_))));
        // 同类型同序列
        assert!(matches!(load(">A@1\nACGTAC\n>B@1\nACGTAC\n"), Err(ContamError::Duplicate(_))));
        // 不同类型可共享序列
        assert!(load(">A@1\nACGTAC\n>B@3\nACGTAC\n").is_ok());
        // vector 名称全局唯一
        let text = format!(">A@1\nACGTAC\n>a&1\n{}\n", vector_seq(3, 120));
        assert!(matches!(load(&text), Err(ContamError::Duplicate(_))));
        let v = vector_seq(4, 120);
        let text = format!(">V1&1\n{}\n>V2&2\n{}\n", v, v);
        assert!(matches!(load(&text), Err(ContamError::Duplicate(_))));
    }

    #[test]
    fn too_many_vectors_is_parameter_error() {
        let text: String = (0..=MAX_VECTOR_CONTAMS)
            .map(|i| format!(">V{}&1\n{}\n", i, vector_seq(100 + i as u32, 120)))
            .collect();
        assert!(matches!(load(&text), Err(ContamError::Parameter(_))));
    }

    #[test]
    fn too_many_flanks_is_parameter_error() {
        // 每条记录的序列由 i 的四进制展开得到，互不相同
        let text: String = (0..=MAX_FLANK_CONTAMS)
            .map(|i| {
                let tail: String = (0..8).map(|k| b"ACGT"[(i >> (2 * k)) & 3] as char).collect();
                format!(">A{}@1\nACGT{}\n", i, tail)
            })
            .collect();
        let mut l = ContamLoader::new();
        let err = l.load_contaminants(Cursor::new(text.into_bytes())).unwrap_err();
        assert!(matches!(err, ContamError::Parameter(_)));
        assert_eq!(l.num_contaminants(), 0);
    }

    #[test]
    fn overlong_name_is_parameter_error() {
        let name = "N".repeat(MAX_NAME_LEN + 1);
        let mut l = ContamLoader::new();
        let err = l.load_contaminants(Cursor::new(format!(">{}@1\nACGTAC\n", name).into_bytes())).unwrap_err();
        assert!(matches!(err, ContamError::Parameter(_)));
        assert_eq!(l.num_contaminants(), 0);

        let name = "N".repeat(MAX_NAME_LEN);
        assert!(load(&format!(">{}@1\nACGTAC\n", name)).is_ok());
    }

    #[test]
    fn nameless_overlay_code_is_parameter_error() {
        let mut l = ContamLoader::new();
        l.load_contaminants(Cursor::new(b">ok@1\nACGTAC\n".to_vec())).unwrap();
        let err = l.load_contaminants(Cursor::new(b">@1\nTTGGCA\n".to_vec())).unwrap_err();
        assert!(matches!(err, ContamError::Parameter(_)));
        assert_eq!(l.num_contaminants(), 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut l = ContamLoader::new();
        let err = l.load_contaminants_file("/nonexistent/contams.fa").unwrap_err();
        assert!(matches!(err, ContamError::Io { .. }));
    }

    #[test]
    fn finalize_without_contaminants_fails() {
        let mut l = ContamLoader::new();
        assert!(matches!(l.finalize(), Err(ContamError::Parameter(_))));
    }

    #[test]
    fn finalize_orders_by_type_then_length() {
        let mut l = load(">S@3\nACGTA\n>L@3\nTTTTGGGGCC\n>F@1\nGGGGCC\n").unwrap();
        let idx = l.finalize().unwrap();
        let ids: Vec<u32> = idx.flank_contams().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
