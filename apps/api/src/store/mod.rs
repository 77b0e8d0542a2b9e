// Durable storage: transactional writes and read-side aggregation views.

pub mod handlers;
pub mod queries;
pub mod writer;
