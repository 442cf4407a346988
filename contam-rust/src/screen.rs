use anyhow::{bail, Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use std::io::Write;

use crate::contam::types::{MAX_CONTAM_QUERY_LEN, MAX_SUB_RATE, MIN_CONTAM_QUERY_LEN};
use crate::contam::{ContamIndex, ReadHit};
use crate::io::fastq::{FastqReader, FastqRecord};
use crate::report::EndSummary;

/// Read screening options.
#[derive(Debug, Clone)]
pub struct ScreenOpt {
    /// Substitutions allowed per 25bp of overlap (0..=3).
    pub allow_sub_rate: u32,
    pub min_overlap: usize,
    pub threads: usize,
    /// Reads handed to the thread pool at a time.
    pub batch_size: usize,
}

impl Default for ScreenOpt {
    fn default() -> Self {
        Self { allow_sub_rate: 1, min_overlap: 1, threads: 1, batch_size: 10_000 }
    }
}

impl ScreenOpt {
    pub fn validate(&self) -> Result<()> {
        if self.allow_sub_rate > MAX_SUB_RATE {
            bail!("substitution rate must be in range 0..={}, got {}", MAX_SUB_RATE, self.allow_sub_rate);
        }
        if self.threads == 0 {
            bail!("threads must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        Ok(())
    }
}

/// Screen verdict for one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadVerdict {
    /// Read length outside of the screenable range.
    Skipped,
    Clean,
    Contaminated(ReadHit),
}

pub fn screen_read(idx: &ContamIndex, is_pe2: bool, seq: &[u8], opt: &ScreenOpt) -> ReadVerdict {
    if !(MIN_CONTAM_QUERY_LEN..=MAX_CONTAM_QUERY_LEN).contains(&seq.len()) {
        return ReadVerdict::Skipped;
    }
    match idx.locate_read_contamination(is_pe2, opt.allow_sub_rate, opt.min_overlap, seq) {
        Some(hit) => ReadVerdict::Contaminated(hit),
        None => ReadVerdict::Clean,
    }
}

fn end_label(is_pe2: bool) -> &'static str {
    if is_pe2 { "PE2" } else { "PE1" }
}

fn tally(summary: &mut EndSummary, verdict: &ReadVerdict) {
    summary.reads += 1;
    match verdict {
        ReadVerdict::Skipped => {}
        ReadVerdict::Clean => summary.screened += 1,
        ReadVerdict::Contaminated(hit) => {
            summary.screened += 1;
            summary.contaminated += 1;
            if matches!(hit, ReadHit::Vector(_)) {
                summary.vector_contained += 1;
            }
        }
    }
}

fn write_verdict<W: Write + ?Sized>(
    out: &mut W,
    idx: &ContamIndex,
    rec: &FastqRecord,
    is_pe2: bool,
    verdict: &ReadVerdict,
) -> Result<()> {
    let end = end_label(is_pe2);
    match verdict {
        ReadVerdict::Skipped => writeln!(out, "{}\t{}\t{}\tskipped\t*\t*\t0\t0", rec.id, end, rec.seq.len())?,
        ReadVerdict::Clean => writeln!(out, "{}\t{}\t{}\tclean\t*\t*\t0\t0", rec.id, end, rec.seq.len())?,
        ReadVerdict::Contaminated(hit) => {
            let (status, subs) = match hit {
                ReadHit::Flank(h) => ("flank", h.subs),
                ReadHit::Vector(h) => ("vector", h.mismatches),
            };
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                rec.id,
                end,
                rec.seq.len(),
                status,
                hit.contam_type(),
                idx.contaminant_name(hit.contam_id()).unwrap_or("*"),
                hit.overlap(rec.seq.len()),
                subs
            )?;
        }
    }
    Ok(())
}

fn open_fastq(path: &str) -> Result<FastqReader<std::io::BufReader<std::fs::File>>> {
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open reads file '{}'", path))?;
    Ok(FastqReader::new(std::io::BufReader::new(fh)))
}

/// Screen single or paired-end FASTQ files against `idx`, writing one TSV
/// line per read (stdout when `out_path` is `None`). Returns per-end totals.
pub fn screen_fastq(
    idx: &ContamIndex,
    reads1: &str,
    reads2: Option<&str>,
    out_path: Option<&str>,
    opt: &ScreenOpt,
) -> Result<Vec<EndSummary>> {
    opt.validate()?;
    let pool = rayon::ThreadPoolBuilder::new().num_threads(opt.threads).build()?;

    let mut r1 = open_fastq(reads1)?;
    let mut r2 = reads2.map(open_fastq).transpose()?;

    let mut out: Box<dyn Write> = if let Some(p) = out_path {
        let fh = std::fs::File::create(p).with_context(|| format!("cannot create output file '{}'", p))?;
        Box::new(std::io::BufWriter::new(fh))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    };
    writeln!(out, "#read\tend\tlen\tstatus\ttype\tcontaminant\toverlap\tsubs")?;

    let mut sum1 = EndSummary { end: end_label(false).to_string(), ..Default::default() };
    let mut sum2 = EndSummary { end: end_label(true).to_string(), ..Default::default() };
    let mut n_batches = 0usize;

    loop {
        let batch1 = r1.next_batch(opt.batch_size)?;
        let batch2 = match r2.as_mut() {
            Some(r) => r.next_batch(opt.batch_size)?,
            None => Vec::new(),
        };
        if r2.is_some() && batch1.len() != batch2.len() {
            bail!("paired-end files '{}' and '{}' hold different read counts", reads1, reads2.unwrap_or(""));
        }
        if batch1.is_empty() {
            break;
        }
        n_batches += 1;

        let (v1, v2): (Vec<ReadVerdict>, Vec<ReadVerdict>) = pool.install(|| {
            let v1 = batch1.par_iter().map(|rec| screen_read(idx, false, &rec.seq, opt)).collect();
            let v2 = batch2.par_iter().map(|rec| screen_read(idx, true, &rec.seq, opt)).collect();
            (v1, v2)
        });

        for (i, (rec, verdict)) in batch1.iter().zip(&v1).enumerate() {
            tally(&mut sum1, verdict);
            write_verdict(out.as_mut(), idx, rec, false, verdict)?;
            if let (Some(rec2), Some(verdict2)) = (batch2.get(i), v2.get(i)) {
                tally(&mut sum2, verdict2);
                write_verdict(out.as_mut(), idx, rec2, true, verdict2)?;
            }
        }
        debug!("batch {}: {} reads screened", n_batches, batch1.len() + batch2.len());
    }
    out.flush()?;

    info!(
        "PE1: {} reads, {} screened, {} contaminated ({} vector contained)",
        sum1.reads, sum1.screened, sum1.contaminated, sum1.vector_contained
    );
    let mut ends = vec![sum1];
    if r2.is_some() {
        info!(
            "PE2: {} reads, {} screened, {} contaminated ({} vector contained)",
            sum2.reads, sum2.screened, sum2.contaminated, sum2.vector_contained
        );
        ends.push(sum2);
    }
    Ok(ends)
}
