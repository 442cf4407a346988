//! Contaminant naming convention.
//!
//! A descriptor name may end with an overlay code: `@` introduces a flank
//! (adapter) code and `&` a vector code, followed by any combination of the
//! digits `1`..`8`:
//!
//! | digit | flank          | vector          |
//! |-------|----------------|-----------------|
//! | 1     | 5' PE1         | PE1 sense       |
//! | 2     | 5' PE2         | PE2 sense       |
//! | 3     | 3' PE1         | PE1 sense       |
//! | 4     | 3' PE2         | PE2 sense       |
//! | 5..8  | as 1..4 after reverse complementing | antisense of 1..4 |
//!
//! `>contamABC@12` therefore checks contamABC against the 5' end of both PE1
//! and PE2 reads. Without a code a sequence is a flank applying to the 5' end
//! of PE1 and PE2, in both orientations.

use super::error::ContamError;
use super::types::{ContamType, VectorFlags};

/// Which overlay types a flank sequence is loaded for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlankFlags {
    /// Indexed by `ContamType::index()` over the four flank types.
    pub forward: [bool; 4],
    pub rev_cpl: [bool; 4],
}

impl FlankFlags {
    /// 5' PE1/PE2 in both orientations.
    pub fn default_five_prime() -> Self {
        Self { forward: [true, true, false, false], rev_cpl: [true, true, false, false] }
    }

    pub fn any_rev_cpl(&self) -> bool {
        self.rev_cpl.iter().any(|&f| f)
    }

    pub fn forward_types(&self) -> impl Iterator<Item = ContamType> + '_ {
        ContamType::FLANK_TYPES.into_iter().filter(|t| self.forward[t.index()])
    }

    pub fn rev_cpl_types(&self) -> impl Iterator<Item = ContamType> + '_ {
        ContamType::FLANK_TYPES.into_iter().filter(|t| self.rev_cpl[t.index()])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Flank(FlankFlags),
    Vector(VectorFlags),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub overlay: Overlay,
}

/// Parse the first token of a FASTA descriptor. `ordinal` is the 1-based
/// record number used to synthesise a name when the descriptor is empty.
pub fn parse_descriptor(token: &str, ordinal: usize) -> Result<Descriptor, ContamError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(Descriptor {
            name: format!("ContamSeq.{}", ordinal),
            overlay: Overlay::Flank(FlankFlags::default_five_prime()),
        });
    }

    let digits_start = token
        .trim_end_matches(|c: char| ('1'..='8').contains(&c))
        .len();
    let (head, codes) = token.split_at(digits_start);
    let sep = head.chars().last();

    if matches!(sep, Some('@' | '&')) && head.len() == 1 && !codes.is_empty() {
        return Err(ContamError::Parameter(format!(
            "contaminant descriptor '{}' has no name before the overlay code",
            token
        )));
    }

    match sep.filter(|_| head.len() > 1) {
        Some('@') if !codes.is_empty() => {
            let mut flags = FlankFlags::default();
            for c in codes.bytes() {
                let d = (c - b'1') as usize;
                if d < 4 { flags.forward[d] = true } else { flags.rev_cpl[d - 4] = true }
            }
            Ok(Descriptor { name: head[..head.len() - 1].to_string(), overlay: Overlay::Flank(flags) })
        }
        Some('&') if !codes.is_empty() => {
            let mut flags = VectorFlags::default();
            for c in codes.bytes() {
                match c {
                    b'1' | b'3' => flags.pe1_sense = true,
                    b'2' | b'4' => flags.pe2_sense = true,
                    b'5' | b'7' => flags.pe1_antisense = true,
                    _ => flags.pe2_antisense = true,
                }
            }
            Ok(Descriptor { name: head[..head.len() - 1].to_string(), overlay: Overlay::Vector(flags) })
        }
        Some('&') => Err(ContamError::Parameter(format!(
            "vector contaminant '{}' requires explicit overlay codes after '&'",
            token
        ))),
        _ => Ok(Descriptor {
            name: token.to_string(),
            overlay: Overlay::Flank(FlankFlags::default_five_prime()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flank(d: &Descriptor) -> FlankFlags {
        match d.overlay {
            Overlay::Flank(f) => f,
            Overlay::Vector(_) => panic!("expected flank"),
        }
    }

    #[test]
    fn flank_codes() {
        let d = parse_descriptor("AdaptorA@12", 1).unwrap();
        assert_eq!(d.name, "AdaptorA");
        let f = flank(&d);
        assert_eq!(f.forward, [true, true, false, false]);
        assert!(!f.any_rev_cpl());

        let d = parse_descriptor("Primer@38", 1).unwrap();
        let f = flank(&d);
        assert_eq!(f.forward, [false, false, true, false]);
        assert_eq!(f.rev_cpl, [false, false, false, true]);
        assert_eq!(f.rev_cpl_types().collect::<Vec<_>>(), vec![ContamType::ThreePrimePe2]);
    }

    #[test]
    fn no_code_defaults_to_five_prime_both_orientations() {
        let d = parse_descriptor("Illumina_Universal", 3).unwrap();
        assert_eq!(d.name, "Illumina_Universal");
        assert_eq!(flank(&d), FlankFlags::default_five_prime());

        // 数字结尾但没有分隔符：整体作为名字
        let d = parse_descriptor("Adapter12", 3).unwrap();
        assert_eq!(d.name, "Adapter12");

        // 分隔符后没有代码
        let d = parse_descriptor("Adapter@", 3).unwrap();
        assert_eq!(d.name, "Adapter@");
    }

    #[test]
    fn empty_descriptor_gets_synthetic_name() {
        let d = parse_descriptor("  ", 7).unwrap();
        assert_eq!(d.name, "ContamSeq.7");
    }

    #[test]
    fn vector_codes() {
        let d = parse_descriptor("pUC19&16", 1).unwrap();
        assert_eq!(d.name, "pUC19");
        match d.overlay {
            Overlay::Vector(v) => {
                assert!(v.pe1_sense);
                assert!(v.pe2_antisense);
                assert!(!v.pe2_sense);
                assert!(!v.pe1_antisense);
            }
            Overlay::Flank(_) => panic!("expected vector"),
        }
    }

    #[test]
    fn vector_without_codes_is_rejected() {
        assert!(matches!(parse_descriptor("pUC19&", 1), Err(ContamError::Parameter(_))));
    }

    #[test]
    fn overlay_code_without_name_is_rejected() {
        assert!(matches!(parse_descriptor("@1", 1), Err(ContamError::Parameter(_))));
        assert!(matches!(parse_descriptor("&26", 1), Err(ContamError::Parameter(_))));
        // 单独的分隔符仍然是名字
        assert_eq!(parse_descriptor("@", 1).unwrap().name, "@");
    }
}
