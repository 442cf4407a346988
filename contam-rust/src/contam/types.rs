use serde::Serialize;
use std::fmt;

/// Only reads at least this long are screened.
pub const MIN_CONTAM_QUERY_LEN: usize = 20;
/// Only reads at most this long are screened.
pub const MAX_CONTAM_QUERY_LEN: usize = 2000;

pub const MIN_FLANK_LEN: usize = 4;
pub const MAX_FLANK_LEN: usize = 200;
/// 200 distinct adapters, each possibly loaded in all 8 orientations.
pub const MAX_FLANK_CONTAMS: usize = 200 * 8;

pub const MIN_VECTOR_LEN: usize = 100;
pub const MAX_VECTOR_LEN: usize = 0x0ff_ffff;
pub const MAX_VECTOR_CONTAMS: usize = 10;

pub const MAX_NAME_LEN: usize = 80;

/// Allowed substitution rate is expressed per 25bp of overlap.
pub const MAX_SUB_RATE: u32 = 3;

/// Max seed iterations per query window when looking for vector containment.
pub const MAX_SEED_ITERS: usize = 25_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContamClass {
    /// Both flank and vector contaminants.
    All,
    /// Long sequence (e.g. cloning vector) expected to fully contain a read.
    Vector,
    /// Short sequence (e.g. adapter) overlaying a read end.
    Flank,
}

/// How a contaminant is overlaid onto a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ContamType {
    FivePrimePe1,
    FivePrimePe2,
    ThreePrimePe1,
    ThreePrimePe2,
    Vector,
}

impl ContamType {
    pub const FLANK_TYPES: [ContamType; 4] = [
        ContamType::FivePrimePe1,
        ContamType::FivePrimePe2,
        ContamType::ThreePrimePe1,
        ContamType::ThreePrimePe2,
    ];

    pub const ALL: [ContamType; 5] = [
        ContamType::FivePrimePe1,
        ContamType::FivePrimePe2,
        ContamType::ThreePrimePe1,
        ContamType::ThreePrimePe2,
        ContamType::Vector,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_flank(self) -> bool {
        self != ContamType::Vector
    }

    /// Contaminant suffix overlays the read prefix.
    pub fn is_five_prime(self) -> bool {
        matches!(self, ContamType::FivePrimePe1 | ContamType::FivePrimePe2)
    }

    pub fn is_pe2(self) -> bool {
        matches!(self, ContamType::FivePrimePe2 | ContamType::ThreePrimePe2)
    }

    pub fn label(self) -> &'static str {
        match self {
            ContamType::FivePrimePe1 => "5'SE/PE1",
            ContamType::FivePrimePe2 => "5'PE2",
            ContamType::ThreePrimePe1 => "3'SE/PE1",
            ContamType::ThreePrimePe2 => "3'PE2",
            ContamType::Vector => "Vector",
        }
    }

    pub fn five_prime_for(is_pe2: bool) -> Self {
        if is_pe2 { ContamType::FivePrimePe2 } else { ContamType::FivePrimePe1 }
    }

    pub fn three_prime_for(is_pe2: bool) -> Self {
        if is_pe2 { ContamType::ThreePrimePe2 } else { ContamType::ThreePrimePe1 }
    }
}

impl fmt::Display for ContamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Adapter-like contaminant targeting one read end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlankContam {
    pub id: u32,
    pub contam_type: ContamType,
    /// Sequence was reverse complemented relative to the file.
    pub rev_cpl: bool,
    pub name: String,
    /// Base codes (see `util::dna`).
    pub bases: Vec<u8>,
}

impl FlankContam {
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Which read ends / strands a vector is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VectorFlags {
    pub pe1_sense: bool,
    pub pe1_antisense: bool,
    pub pe2_sense: bool,
    pub pe2_antisense: bool,
}

impl VectorFlags {
    pub fn any(&self) -> bool {
        self.pe1_sense || self.pe1_antisense || self.pe2_sense || self.pe2_antisense
    }

    pub fn sense(&self, is_pe2: bool) -> bool {
        if is_pe2 { self.pe2_sense } else { self.pe1_sense }
    }

    pub fn antisense(&self, is_pe2: bool) -> bool {
        if is_pe2 { self.pe2_antisense } else { self.pe1_antisense }
    }
}

/// Raw vector contaminant as loaded; indexed by `ContamLoader::finalize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectContam {
    pub id: u32,
    pub name: String,
    pub flags: VectorFlags,
    pub bases: Vec<u8>,
}

impl VectContam {
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_predicates() {
        assert!(ContamType::FivePrimePe2.is_five_prime());
        assert!(ContamType::FivePrimePe2.is_pe2());
        assert!(!ContamType::ThreePrimePe1.is_five_prime());
        assert!(!ContamType::ThreePrimePe1.is_pe2());
        assert!(!ContamType::Vector.is_flank());
        assert_eq!(ContamType::three_prime_for(true), ContamType::ThreePrimePe2);
        assert_eq!(ContamType::FivePrimePe1.to_string(), "5'SE/PE1");
    }

    #[test]
    fn vector_flags_by_end() {
        let f = VectorFlags { pe1_sense: true, pe2_antisense: true, ..Default::default() };
        assert!(f.any());
        assert!(f.sense(false));
        assert!(!f.sense(true));
        assert!(f.antisense(true));
        assert!(!VectorFlags::default().any());
    }
}
