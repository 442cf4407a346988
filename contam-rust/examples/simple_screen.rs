//! 演示如何在 library 模式下使用 contam-rust 检测读段污染。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_screen
//! ```

use contam_rust::contam::{ContamClass, ContamLoader, ContamType, ReadHit};
use std::io::Cursor;

fn main() {
    // 1. 装载污染序列：一条 5' adapter（PE1/PE2），一条 3' primer，一条 vector
    let vector: String = "GATTACACCGGTAAGCTTGC".repeat(8);
    let fasta = format!(
        ">AdaptorA@12\nAGATCGGAAGAGC\n>PrimerB@3\nCCTTAAGGTTCA\n>pDemo&15\n{}\n",
        vector
    );
    let mut loader = ContamLoader::new();
    if let Err(e) = loader.load_contaminants(Cursor::new(fasta.into_bytes())) {
        eprintln!("装载失败: {}", e);
        return;
    }

    // 2. 构建索引
    let idx = match loader.finalize() {
        Ok(idx) => idx,
        Err(e) => {
            eprintln!("索引构建失败: {}", e);
            return;
        }
    };
    println!(
        "已装载 {} 条 flank，{} 条 vector",
        idx.num_of_contaminants(ContamClass::Flank),
        idx.num_of_contaminants(ContamClass::Vector)
    );

    // 3. 筛查几条读段
    let reads: [&[u8]; 4] = [
        b"GGAAGAGCTTTACCGATTCAGGCAT",
        b"TTGACCATGCATTAGCCATCCTTAAGG",
        &vector.as_bytes()[10..60],
        b"ACGTTGCATGCAAGTCCGATCGATTGCA",
    ];
    for read in reads {
        let shown = String::from_utf8_lossy(read);
        match idx.locate_read_contamination(false, 1, 4, read) {
            Some(ReadHit::Flank(h)) => println!(
                "{}: {} 重叠 {}bp（{} 处替换），来自 {}",
                shown,
                h.contam_type,
                h.overlap,
                h.subs,
                idx.contaminant_name(h.contam_id).unwrap_or("?")
            ),
            Some(ReadHit::Vector(h)) => println!(
                "{}: 包含于 vector {}（{} 处错配）",
                shown,
                idx.contaminant_name(h.contam_id).unwrap_or("?"),
                h.mismatches
            ),
            None => println!("{}: 未检测到污染", shown),
        }
    }

    // 4. 统计
    for t in ContamType::ALL {
        println!("{}: 检查 {} 次，命中 {} 次", t, idx.num_checks(t), idx.type_hits(t));
    }
}
