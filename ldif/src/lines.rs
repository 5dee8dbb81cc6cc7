//! Logical-line reader.
//!
//! Splits raw LDIF input into logical lines: continuation lines are merged,
//! comments are dropped and runs of blank lines collapse into a single
//! record separator. Leading and trailing blank lines produce nothing.

/// One logical line of LDIF input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// One or more blank lines separating two records.
    Blank,
    /// A non-comment line with all its continuations merged.
    Content {
        /// 1-based number of the physical line the logical line starts on.
        number: usize,
        text: Vec<u8>,
    },
}

struct Pending {
    number: usize,
    comment: bool,
    text: Vec<u8>,
}

/// Iterator over the logical lines of a byte buffer.
pub struct LineReader<'a> {
    input: &'a [u8],
    number: usize,
    pending: Option<Pending>,
    queued: Option<Line>,
    blank_pending: bool,
    emitted: bool,
}

impl<'a> LineReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        LineReader {
            input,
            number: 0,
            pending: None,
            queued: None,
            blank_pending: false,
            emitted: false,
        }
    }

    /// Next physical line without its terminator (`\n` or `\r\n`).
    fn next_physical(&mut self) -> Option<&'a [u8]> {
        if self.input.is_empty() {
            return None;
        }
        let (line, rest) = match self.input.iter().position(|&c| c == b'\n') {
            Some(i) => (&self.input[..i], &self.input[i + 1..]),
            None => (self.input, &self.input[self.input.len()..]),
        };
        self.input = rest;
        self.number += 1;
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Turn a completed logical line into output, dropping comments and
    /// emitting at most one separator before it.
    fn finish(&mut self, p: Pending) -> Option<Line> {
        if p.comment {
            return None;
        }
        let line = Line::Content {
            number: p.number,
            text: p.text,
        };
        let separate = self.blank_pending && self.emitted;
        self.blank_pending = false;
        self.emitted = true;
        if separate {
            self.queued = Some(line);
            Some(Line::Blank)
        } else {
            Some(line)
        }
    }
}

impl Iterator for LineReader<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        loop {
            if let Some(line) = self.queued.take() {
                return Some(line);
            }

            let Some(physical) = self.next_physical() else {
                let pending = self.pending.take()?;
                match self.finish(pending) {
                    Some(line) => return Some(line),
                    None => continue,
                }
            };

            if let Some(rest) = physical.strip_prefix(b" ") {
                if let Some(p) = self.pending.as_mut() {
                    p.text.extend_from_slice(rest);
                    continue;
                }
            }

            let done = self.pending.take().and_then(|p| self.finish(p));
            if physical.is_empty() {
                self.blank_pending = true;
            } else {
                self.pending = Some(Pending {
                    number: self.number,
                    comment: physical[0] == b'#',
                    text: physical.to_vec(),
                });
            }
            if let Some(line) = done {
                return Some(line);
            }
        }
    }
}
