use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::contam::types::MAX_FLANK_LEN;
use crate::contam::{ContamClass, ContamIndex, ContamType};

/// Screening totals for one read end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndSummary {
    pub end: String,
    pub reads: u64,
    /// Reads whose length is inside the screenable range.
    pub screened: u64,
    pub contaminated: u64,
    pub vector_contained: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub contam_type: ContamType,
    pub label: &'static str,
    pub loaded: usize,
    pub checks: u64,
    pub hits: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenSummary {
    pub generated: String,
    pub contaminant_files: Vec<String>,
    pub allow_sub_rate: u32,
    pub min_overlap: usize,
    pub ends: Vec<EndSummary>,
    pub types: Vec<TypeSummary>,
}

impl ScreenSummary {
    pub fn collect(idx: &ContamIndex, allow_sub_rate: u32, min_overlap: usize, ends: Vec<EndSummary>) -> Self {
        let types = ContamType::ALL
            .iter()
            .map(|&t| TypeSummary {
                contam_type: t,
                label: t.label(),
                loaded: idx.type_info(t).count,
                checks: idx.num_checks(t),
                hits: idx.type_hits(t),
            })
            .collect();
        Self {
            generated: chrono::Utc::now().to_rfc3339(),
            contaminant_files: idx.files().to_vec(),
            allow_sub_rate,
            min_overlap,
            ends,
            types,
        }
    }
}

pub fn write_json_summary<W: Write>(summary: &ScreenSummary, mut w: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, summary)?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Per-contaminant CSV report.
///
/// Flank rows carry cumulative overlap counts: column `Overlap:n` holds the
/// hits whose overlap was at least `n` bases.
pub fn write_contam_csv<W: Write>(idx: &ContamIndex, mut w: W) -> Result<()> {
    let num_contams = idx.num_of_contaminants(ContamClass::All) as u32;

    if idx.num_of_contaminants(ContamClass::Flank) > 0 {
        let max_len = idx.max_contaminant_len(ContamClass::Flank);
        write!(w, "\"Name\",\"Type\",\"Length\",\"Checked\",\"TotOverlaps\"")?;
        for n in 1..=max_len {
            write!(w, ",\"Overlap:{}\"", n)?;
        }
        writeln!(w)?;

        let mut dist = vec![0u64; MAX_FLANK_LEN];
        for id in 1..=num_contams {
            if idx.contaminant_class(id) != Some(ContamClass::Flank) {
                continue;
            }
            let (Some(name), Some(t), Some(len)) =
                (idx.contaminant_name(id), idx.contaminant_type(id), idx.contaminant_len(id))
            else {
                continue;
            };
            let hits = idx.contaminant_dist(id, &mut dist);
            for i in (1..len).rev() {
                dist[i - 1] += dist[i];
            }
            write!(w, "{},{},{},{},{}", quoted(name), quoted(t.label()), len, idx.num_checks(t), hits)?;
            for i in 0..max_len {
                write!(w, ",{}", if i < len { dist[i] } else { 0 })?;
            }
            writeln!(w)?;
        }
    }

    if idx.num_of_contaminants(ContamClass::Vector) > 0 {
        writeln!(w, "\"Name\",\"Type\",\"Length\",\"Checked\",\"TotContained\"")?;
        for v in idx.vector_contams() {
            let hits = idx.contaminant_dist(v.id, &mut []);
            writeln!(
                w,
                "{},{},{},{},{}",
                quoted(&v.name),
                quoted(ContamType::Vector.label()),
                v.len(),
                idx.num_checks(ContamType::Vector),
                hits
            )?;
        }
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contam::ContamLoader;
    use std::io::Cursor;

    fn build(text: &str) -> ContamIndex {
        let mut l = ContamLoader::new();
        l.load_contaminants(Cursor::new(text.as_bytes().to_vec())).unwrap();
        l.finalize().unwrap()
    }

    #[test]
    fn flank_rows_are_cumulative() {
        let idx = build(">AdA@1\nACGTACGTAC\n>Sh@1\nTTGGCC\n");
        let tail = "T".repeat(14);
        idx.match_contaminants(ContamType::FivePrimePe1, 0, 1, format!("ACGTACGTAC{}", tail).as_bytes());
        idx.match_contaminants(ContamType::FivePrimePe1, 0, 1, format!("GTAC{}TTTTTT", tail).as_bytes());

        let mut out = Vec::new();
        write_contam_csv(&idx, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("\"Name\",\"Type\",\"Length\",\"Checked\",\"TotOverlaps\",\"Overlap:1\""));
        assert!(lines[0].ends_with("\"Overlap:10\""));

        let ada: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(ada[0], "\"AdA\"");
        assert_eq!(ada[2], "10");
        assert_eq!(ada[3], "2");
        assert_eq!(ada[4], "2");
        // overlap 4 和 10 各一次
        assert_eq!(ada[5 + 3], "2");
        assert_eq!(ada[5 + 4], "1");
        assert_eq!(ada[5 + 9], "1");

        let sh: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(sh.len(), 15);
        assert_eq!(sh[4], "0");
        assert_eq!(sh[14], "0");
    }

    #[test]
    fn vector_section_and_json() {
        let v = "ACGTTGCA".repeat(16);
        let idx = build(&format!(">pV&1\n{}\n", v));
        assert_eq!(idx.match_vect_contams(false, 0, &v.as_bytes()[3..43]), 40);

        let mut out = Vec::new();
        write_contam_csv(&idx, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\"Name\",\"Type\",\"Length\",\"Checked\",\"TotContained\"\n\"pV\",\"Vector\",128,1,1\n"
        );

        let summary = ScreenSummary::collect(&idx, 0, 1, vec![EndSummary { end: "PE1".into(), ..Default::default() }]);
        let mut json = Vec::new();
        write_json_summary(&summary, &mut json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["types"][4]["hits"], 1);
        assert_eq!(value["types"][4]["contam_type"], "Vector");
        assert_eq!(value["ends"][0]["end"], "PE1");
    }
}
