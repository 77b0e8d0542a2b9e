// Batched sentiment classification.
// Implements: prompt assembly, tolerant response decoding, rate-limit retry,
// sequential batch dispatch. All LLM calls go through llm_client — no direct
// Anthropic calls here.

pub mod batcher;
pub mod classifier;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;
