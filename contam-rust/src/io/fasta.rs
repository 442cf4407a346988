use anyhow::Result;
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    /// First whitespace-delimited token of the descriptor; empty when the
    /// record had no descriptor line (bases before the first '>').
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
    started: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
            started: false,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        let mut seq: Vec<u8> = Vec::new();

        // Find header line; sequence lines ahead of the first header form
        // a record without a descriptor.
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                self.buf.clear();
                let n = self.reader.read_line(&mut self.buf)?;
                if n == 0 {
                    self.done = true;
                    if seq.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(FastaRecord { id: String::new(), desc: None, seq }));
                }
                if let Some(rest) = self.buf.strip_prefix('>') {
                    let h = rest.trim().to_string();
                    if seq.is_empty() {
                        break h;
                    }
                    self.peek_header = Some(h);
                    self.started = true;
                    return Ok(Some(FastaRecord { id: String::new(), desc: None, seq }));
                }
                if !self.started {
                    push_bases(&mut seq, &self.buf);
                }
            }
        };
        self.started = true;

        let mut parts = header.splitn(2, char::is_whitespace);
        let id = parts.next().unwrap_or("").to_string();
        let desc = parts
            .next()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }
            if let Some(rest) = self.buf.strip_prefix('>') {
                self.peek_header = Some(rest.trim().to_string());
                break;
            }
            push_bases(&mut seq, &self.buf);
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

fn push_bases(seq: &mut Vec<u8>, line: &str) {
    for &b in line.as_bytes() {
        match b {
            b'\n' | b'\r' | b' ' | b'\t' => {}
            _ => seq.push(b.to_ascii_uppercase()),
        }
    }
}
