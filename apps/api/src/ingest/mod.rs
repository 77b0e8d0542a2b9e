// CSV ingestion: streaming decode, row normalization, upload orchestration.

pub mod decoder;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod stream;
