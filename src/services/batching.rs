use std::future::Future;

use crate::errors::{AppError, AppResult};
use crate::models::domain::Question;
use crate::services::dedup::{dedup_questions, DedupMode};

pub const DEFAULT_CHUNK_SIZE: usize = 5;
pub const DEFAULT_RETRY_ALLOWANCE: u32 = 2;

/// Limits on how a short batch gets topped up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub chunk_size: usize,
    pub retry_allowance: u32,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry_allowance: DEFAULT_RETRY_ALLOWANCE,
        }
    }
}

impl BatchPolicy {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_retry_allowance(mut self, retry_allowance: u32) -> Self {
        self.retry_allowance = retry_allowance;
        self
    }

    /// One full request, enough chunks to cover the target, plus the allowance.
    pub fn max_attempts(&self, target: usize) -> u32 {
        let chunks = target.div_ceil(self.chunk_size.max(1));
        1 + chunks as u32 + self.retry_allowance
    }
}

/// Parameters for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCall {
    pub count: usize,
    /// Stems already collected, so the prompt can ask for different ones.
    pub avoid: Vec<String>,
    /// 1-based attempt number.
    pub attempt: u32,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub questions: Vec<Question>,
    pub attempts: u32,
    pub last_error: Option<AppError>,
}

impl BatchOutcome {
    pub fn is_complete(&self, target: usize) -> bool {
        self.questions.len() >= target
    }
}

/// Collects up to `target` unique questions, asking for all of them once and
/// then topping up in chunks until the target or the attempt budget is hit.
pub async fn fill_batch<F, Fut>(
    target: usize,
    policy: &BatchPolicy,
    mode: DedupMode,
    mut generate: F,
) -> BatchOutcome
where
    F: FnMut(BatchCall) -> Fut,
    Fut: Future<Output = AppResult<Vec<Question>>>,
{
    let max_attempts = policy.max_attempts(target);
    let mut collected: Vec<Question> = Vec::new();
    let mut attempts = 0;
    let mut last_error = None;

    while collected.len() < target && attempts < max_attempts {
        let missing = target - collected.len();
        let count = if attempts == 0 {
            target
        } else {
            missing.min(policy.chunk_size.max(1))
        };
        attempts += 1;

        let call = BatchCall {
            count,
            avoid: collected.iter().map(|q| q.text.clone()).collect(),
            attempt: attempts,
        };

        match generate(call).await {
            Ok(batch) => {
                log::debug!(
                    "Attempt {} asked for {} question(s), got {}",
                    attempts,
                    count,
                    batch.len()
                );
                collected.extend(batch);
                collected = dedup_questions(collected, mode);
                collected.truncate(target);
            }
            Err(err) => {
                log::warn!("Attempt {} for {} question(s) failed: {}", attempts, count, err);
                last_error = Some(err);
            }
        }
    }

    if collected.len() < target {
        log::warn!(
            "Returning partial batch: {} of {} question(s) after {} attempt(s)",
            collected.len(),
            target,
            attempts
        );
    }

    BatchOutcome {
        questions: collected,
        attempts,
        last_error,
    }
}
