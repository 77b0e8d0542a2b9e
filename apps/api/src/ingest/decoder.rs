/// Incremental CSV decoder — feeds on raw body chunks, emits complete records.
///
/// Hand-rolled rather than pulled in as a dependency because the upload path
/// needs chunk-at-a-time decoding: a record may start in one body chunk and
/// end three chunks later, and the decoder must produce identical output no
/// matter where the chunk boundaries fall.
///
/// Dialect: comma-separated, double-quote quoting with `""` escapes, LF or
/// CRLF record terminators, optional UTF-8 BOM, blank lines skipped.
use thiserror::Error;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    #[error("record {record}: field is not valid UTF-8")]
    Utf8 { record: usize },

    #[error("record {record}: unexpected character after closing quote")]
    StrayByteAfterQuote { record: usize },

    #[error("unterminated quoted field at end of input")]
    UnterminatedQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start of a field (also the start-of-record position).
    FieldStart,
    /// Inside an unquoted field.
    Unquoted,
    /// Inside a quoted field.
    Quoted,
    /// Just consumed a `"` inside a quoted field; the next byte decides
    /// whether it was an escape or the field terminator.
    QuoteClosed,
}

/// Streaming CSV state machine. Call [`feed`](CsvDecoder::feed) per chunk,
/// then [`finish`](CsvDecoder::finish) once at end-of-stream.
pub struct CsvDecoder {
    state: State,
    field: Vec<u8>,
    record: Vec<String>,
    /// Records completed so far (blank lines included), for error positions.
    records_seen: usize,
    /// Set after `\r` so a following `\n` is folded into one terminator,
    /// even when the pair is split across chunks.
    skip_lf: bool,
    /// BOM detection buffers up to 3 leading bytes before deciding.
    bom_checked: bool,
    pending: Vec<u8>,
}

impl CsvDecoder {
    pub fn new() -> Self {
        Self {
            state: State::FieldStart,
            field: Vec::new(),
            record: Vec::new(),
            records_seen: 0,
            skip_lf: false,
            bom_checked: false,
            pending: Vec::new(),
        }
    }

    /// Consumes one chunk of input and returns the records it completed.
    pub fn feed(&mut self, mut chunk: &[u8]) -> Result<Vec<Vec<String>>, CsvError> {
        let mut out = Vec::new();

        if !self.bom_checked {
            while let Some((&b, rest)) = chunk.split_first() {
                if UTF8_BOM[self.pending.len()] == b {
                    self.pending.push(b);
                    chunk = rest;
                    if self.pending.len() == UTF8_BOM.len() {
                        self.pending.clear();
                        self.bom_checked = true;
                        break;
                    }
                } else {
                    self.bom_checked = true;
                    break;
                }
            }
            if self.bom_checked {
                // Not a BOM after all: the buffered prefix is ordinary data.
                let buffered = std::mem::take(&mut self.pending);
                for b in buffered {
                    self.step(b, &mut out)?;
                }
            } else {
                // Chunk ended inside a possible BOM; wait for more input.
                return Ok(out);
            }
        }

        for &b in chunk {
            self.step(b, &mut out)?;
        }
        Ok(out)
    }

    /// Flushes any trailing record once the stream is exhausted.
    pub fn finish(mut self) -> Result<Vec<Vec<String>>, CsvError> {
        let mut out = Vec::new();

        if !self.bom_checked {
            // Stream shorter than a BOM: whatever was buffered is data.
            let buffered = std::mem::take(&mut self.pending);
            self.bom_checked = true;
            for b in buffered {
                self.step(b, &mut out)?;
            }
        }

        match self.state {
            State::Quoted => return Err(CsvError::UnterminatedQuote),
            // Input ended with a record terminator: nothing buffered.
            State::FieldStart if self.record.is_empty() => return Ok(out),
            _ => {}
        }

        self.end_field()?;
        self.end_record(&mut out);
        Ok(out)
    }

    fn step(&mut self, b: u8, out: &mut Vec<Vec<String>>) -> Result<(), CsvError> {
        if self.skip_lf {
            self.skip_lf = false;
            if b == b'\n' {
                return Ok(());
            }
        }

        match self.state {
            State::FieldStart => match b {
                b'"' => self.state = State::Quoted,
                b',' => self.end_field()?,
                b'\r' => {
                    self.end_field()?;
                    self.end_record(out);
                    self.skip_lf = true;
                }
                b'\n' => {
                    self.end_field()?;
                    self.end_record(out);
                }
                _ => {
                    self.field.push(b);
                    self.state = State::Unquoted;
                }
            },
            State::Unquoted => match b {
                b',' => {
                    self.end_field()?;
                    self.state = State::FieldStart;
                }
                b'\r' => {
                    self.end_field()?;
                    self.end_record(out);
                    self.skip_lf = true;
                    self.state = State::FieldStart;
                }
                b'\n' => {
                    self.end_field()?;
                    self.end_record(out);
                    self.state = State::FieldStart;
                }
                // Bare quotes inside unquoted fields stay literal.
                _ => self.field.push(b),
            },
            State::Quoted => match b {
                b'"' => self.state = State::QuoteClosed,
                // Commas and newlines are data inside quotes.
                _ => self.field.push(b),
            },
            State::QuoteClosed => match b {
                b'"' => {
                    // `""` escape: one literal quote, still inside the field.
                    self.field.push(b'"');
                    self.state = State::Quoted;
                }
                b',' => {
                    self.end_field()?;
                    self.state = State::FieldStart;
                }
                b'\r' => {
                    self.end_field()?;
                    self.end_record(out);
                    self.skip_lf = true;
                    self.state = State::FieldStart;
                }
                b'\n' => {
                    self.end_field()?;
                    self.end_record(out);
                    self.state = State::FieldStart;
                }
                _ => {
                    return Err(CsvError::StrayByteAfterQuote {
                        record: self.records_seen + 1,
                    })
                }
            },
        }
        Ok(())
    }

    fn end_field(&mut self) -> Result<(), CsvError> {
        let bytes = std::mem::take(&mut self.field);
        let value = String::from_utf8(bytes).map_err(|_| CsvError::Utf8 {
            record: self.records_seen + 1,
        })?;
        self.record.push(value);
        Ok(())
    }

    fn end_record(&mut self, out: &mut Vec<Vec<String>>) {
        let fields = std::mem::take(&mut self.record);
        self.records_seen += 1;
        // A lone empty field is a blank line, not data.
        if fields.len() == 1 && fields[0].is_empty() {
            return;
        }
        out.push(fields);
    }
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self::new()
    }
}
