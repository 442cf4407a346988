// {0:EOS, 1:A, 2:C, 3:G, 4:T, 5:N}
pub const EOS: u8 = 0;
pub const BASE_A: u8 = 1;
pub const BASE_T: u8 = 4;
pub const BASE_N: u8 = 5;

/// 宽松编码：用于 read，任何非 ACGT 的符号都视为 N。
#[inline]
pub fn to_alphabet(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'A' => 1,
        b'C' => 2,
        b'G' => 3,
        b'T' | b'U' => 4,
        _ => BASE_N,
    }
}

/// 严格编码：用于 contaminant 序列校验，只接受 A/C/G/T/N（大小写不敏感）。
#[inline]
pub fn to_alphabet_strict(b: u8) -> Option<u8> {
    match b.to_ascii_uppercase() {
        b'A' => Some(1),
        b'C' => Some(2),
        b'G' => Some(3),
        b'T' => Some(4),
        b'N' => Some(BASE_N),
        _ => None,
    }
}

#[inline]
pub fn from_alphabet(a: u8) -> u8 {
    match a {
        0 => 0,
        1 => b'A',
        2 => b'C',
        3 => b'G',
        4 => b'T',
        _ => b'N',
    }
}

pub fn encode_seq(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| to_alphabet(b)).collect()
}

pub fn decode_seq(codes: &[u8]) -> Vec<u8> {
    codes.iter().map(|&a| from_alphabet(a)).collect()
}

/// 编码空间上的互补碱基；N 与 EOS 保持不变。
#[inline]
pub fn complement_code(a: u8) -> u8 {
    match a {
        1..=4 => BASE_T + BASE_A - a,
        other => other,
    }
}

pub fn revcomp_codes(codes: &[u8]) -> Vec<u8> {
    codes.iter().rev().map(|&a| complement_code(a)).collect()
}

/// 原地反向互补（编码空间）
pub fn revcomp_codes_in_place(codes: &mut [u8]) {
    codes.reverse();
    for a in codes.iter_mut() {
        *a = complement_code(*a);
    }
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        _ => b'N',
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq.iter().rev() {
        out.push(complement(b));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_rejects_iupac() {
        assert_eq!(to_alphabet_strict(b'a'), Some(1));
        assert_eq!(to_alphabet_strict(b'N'), Some(BASE_N));
        assert_eq!(to_alphabet_strict(b'R'), None);
        assert_eq!(to_alphabet_strict(b'U'), None);
        // 宽松编码把未知符号映射为 N
        assert_eq!(to_alphabet(b'R'), BASE_N);
    }

    #[test]
    fn complement_codes_pair_up() {
        assert_eq!(complement_code(1), 4);
        assert_eq!(complement_code(2), 3);
        assert_eq!(complement_code(3), 2);
        assert_eq!(complement_code(4), 1);
        assert_eq!(complement_code(BASE_N), BASE_N);
        assert_eq!(complement_code(EOS), EOS);
    }

    #[test]
    fn revcomp_codes_matches_ascii_revcomp() {
        let seq = b"AACGTNGT";
        let via_codes = decode_seq(&revcomp_codes(&encode_seq(seq)));
        assert_eq!(via_codes, revcomp(seq));

        let mut in_place = encode_seq(seq);
        revcomp_codes_in_place(&mut in_place);
        assert_eq!(decode_seq(&in_place), b"ACNACGTT");
    }
}
