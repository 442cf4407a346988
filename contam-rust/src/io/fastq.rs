use anyhow::{anyhow, bail, Result};
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

pub struct FastqReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    line_no: usize,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false, line_no: 0 }
    }

    fn read_line(&mut self) -> Result<usize> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        if n > 0 { self.line_no += 1; }
        Ok(n)
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        if self.done { return Ok(None); }

        // header line starting with '@', blank lines between records tolerated
        loop {
            if self.read_line()? == 0 { self.done = true; return Ok(None); }
            if !self.buf.trim().is_empty() { break; }
        }
        if !self.buf.starts_with('@') {
            bail!("FASTQ header not starting with '@' at line {}", self.line_no);
        }
        let id = self.buf[1..]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        // sequence line
        if self.read_line()? == 0 { return Err(anyhow!("unexpected EOF after header '{}'", id)); }
        let seq = self.buf.trim_end().as_bytes().to_vec();

        // plus line
        if self.read_line()? == 0 || !self.buf.starts_with('+') {
            return Err(anyhow!("missing '+' line for read '{}'", id));
        }

        // quality line
        if self.read_line()? == 0 { return Err(anyhow!("missing quality line for read '{}'", id)); }
        // line-wrapped FASTQ not supported here
        if self.buf.trim_end().len() != seq.len() {
            bail!("seq/qual length mismatch for read '{}'", id);
        }

        Ok(Some(FastqRecord { id, seq }))
    }

    /// 读取至多 `n` 条记录，用于分批并行处理
    pub fn next_batch(&mut self, n: usize) -> Result<Vec<FastqRecord>> {
        let mut batch = Vec::with_capacity(n);
        while batch.len() < n {
            match self.next_record()? {
                Some(rec) => batch.push(rec),
                None => break,
            }
        }
        Ok(batch)
    }
}
