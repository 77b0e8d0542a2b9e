/// Streaming CSV Ingestor — turns an upload body into normalized reviews.
///
/// The body is decoded chunk by chunk, so an upload far larger than memory
/// streams through without ever being buffered whole. The first record is the
/// header row; every later record must match its width. Any structural fault
/// ends the stream with an error, which callers must treat as aborting the
/// whole upload.
use async_stream::try_stream;
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use futures::Stream;
use thiserror::Error;

use crate::ingest::decoder::{CsvDecoder, CsvError};
use crate::ingest::normalizer::{normalize_row, RawRow};
use crate::models::review::NormalizedReview;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    /// Structural CSV fault (bad quoting, bad encoding).
    #[error("malformed CSV: {0}")]
    Parse(#[from] CsvError),

    /// A data row whose shape does not match the header row.
    #[error("row {row}: expected {expected} columns, found {found}")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Transport failure while reading the request body.
    #[error("failed to read upload stream: {message}")]
    Stream { message: String },
}

/// Pairs decoded records with the header row and runs them through the
/// normalizer. Tracks the 1-based data-row ordinal that becomes `csv-row-<n>`.
struct RowAssembler {
    headers: Option<Vec<String>>,
    ordinal: usize,
    source: String,
    upload_date: NaiveDate,
}

impl RowAssembler {
    fn new(source: String, upload_date: NaiveDate) -> Self {
        Self {
            headers: None,
            ordinal: 0,
            source,
            upload_date,
        }
    }

    /// Feeds one record through. `Ok(None)` for the header row and for rows
    /// dropped by the normalizer; dropped rows still consume their ordinal.
    fn push(&mut self, record: Vec<String>) -> Result<Option<NormalizedReview>, IngestError> {
        let headers = match &self.headers {
            None => {
                self.headers = Some(record);
                return Ok(None);
            }
            Some(headers) => headers,
        };

        self.ordinal += 1;
        if record.len() != headers.len() {
            return Err(IngestError::RowShape {
                row: self.ordinal,
                expected: headers.len(),
                found: record.len(),
            });
        }

        Ok(normalize_row(
            &RawRow::new(headers, &record),
            self.ordinal,
            &self.source,
            self.upload_date,
        ))
    }
}

/// Lazily maps a raw body stream to a stream of [`NormalizedReview`].
///
/// The stream ends after the last review (possibly zero for a header-only or
/// empty upload), or with the first error. Once an error is yielded the
/// stream is exhausted; nothing from the failed upload may be persisted.
pub fn review_stream<S, E>(
    body: S,
    source: String,
) -> impl Stream<Item = Result<NormalizedReview, IngestError>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let upload_date = Utc::now().date_naive();

    try_stream! {
        let mut decoder = CsvDecoder::new();
        let mut assembler = RowAssembler::new(source, upload_date);

        for await chunk in body {
            let chunk = chunk.map_err(|e| IngestError::Stream {
                message: e.to_string(),
            })?;
            for record in decoder.feed(&chunk)? {
                if let Some(review) = assembler.push(record)? {
                    yield review;
                }
            }
        }

        for record in decoder.finish()? {
            if let Some(review) = assembler.push(record)? {
                yield review;
            }
        }
    }
}
