use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Cursor;

use contam_rust::contam::{ContamIndex, ContamLoader, ContamType};
use contam_rust::index::sa;
use contam_rust::util::dna;

fn make_seq(len: usize, seed: u32) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = seed;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

fn build_index(n_adapters: usize, vector_len: usize) -> ContamIndex {
    let mut fasta = String::new();
    for i in 0..n_adapters {
        let seq = make_seq(33, 1000 + i as u32);
        fasta.push_str(&format!(">adapter{}@1234\n{}\n", i, String::from_utf8_lossy(&seq)));
    }
    if vector_len > 0 {
        let seq = make_seq(vector_len, 42);
        fasta.push_str(&format!(">vector&15\n{}\n", String::from_utf8_lossy(&seq)));
    }
    let mut loader = ContamLoader::new();
    loader.load_contaminants(Cursor::new(fasta.into_bytes())).unwrap();
    loader.finalize().unwrap()
}

fn bench_flank_match(c: &mut Criterion) {
    let idx = build_index(50, 0);
    let read = make_seq(100, 7);

    c.bench_function("flank_match_100bp_rate1", |b| {
        b.iter(|| {
            black_box(idx.match_contaminants(ContamType::FivePrimePe1, 1, 1, black_box(&read)));
        })
    });
    c.bench_function("flank_match_100bp_rate3", |b| {
        b.iter(|| {
            black_box(idx.match_contaminants(ContamType::ThreePrimePe1, 3, 1, black_box(&read)));
        })
    });
}

fn bench_vector_containment(c: &mut Criterion) {
    let idx = build_index(0, 10_000);
    let vector = make_seq(10_000, 42);
    let mut read = vector[5000..5100].to_vec();
    read[30] = if read[30] == b'A' { b'C' } else { b'A' };

    c.bench_function("vector_containment_100bp", |b| {
        b.iter(|| {
            black_box(idx.match_vect_contams(false, 1, black_box(&read)));
        })
    });
}

fn bench_build_sa(c: &mut Criterion) {
    let text = dna::encode_seq(&make_seq(10_000, 42));

    c.bench_function("build_sa_10k", |b| {
        b.iter(|| {
            black_box(sa::build_sa(black_box(&text)));
        })
    });
}

criterion_group!(benches, bench_flank_match, bench_vector_containment, bench_build_sa);
criterion_main!(benches);
