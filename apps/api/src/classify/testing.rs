// Scripted CompletionModel and review fixtures shared by the classify tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm_client::{CompletionModel, LlmError};
use crate::models::review::NormalizedReview;

/// Returns canned responses in order and records every prompt it was sent.
/// Once the script runs out, further calls fail with `EmptyContent`.
pub struct FakeModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn scripted(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl CompletionModel for FakeModel {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

pub fn review(id: &str, content: &str) -> NormalizedReview {
    NormalizedReview {
        id: id.to_string(),
        content: content.to_string(),
        date: "2025-09-15".to_string(),
        source: "Google Review".to_string(),
    }
}

pub fn reviews(count: usize) -> Vec<NormalizedReview> {
    (1..=count)
        .map(|i| review(&format!("csv-row-{i}"), &format!("ulasan nomor {i}")))
        .collect()
}
