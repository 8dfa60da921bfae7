// src/classifier/gateway.rs
// Owns the decision of how a ticket gets classified: AI first with bounded
// retries, deterministic keyword fallback as the safety net.

use std::sync::Arc;
use std::time::Duration;

use rand::random;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::TriageConfig;
use crate::llm::CompletionProvider;

use super::keyword::classify_by_keywords;
use super::parse::parse_model_reply;
use super::prompt::build_categorization_prompt;
use super::{ClassificationRequest, ClassificationResult, Source};

/// Confidence substituted when a valid reply omits its Confidence line.
pub const DEFAULT_AI_CONFIDENCE: u8 = 70;

/// Classifier gateway. Holds no mutable state; concurrent classify calls are
/// safe without locking.
pub struct ClassifierGateway {
    provider: Arc<dyn CompletionProvider>,
    config: Arc<TriageConfig>,
}

impl ClassifierGateway {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: Arc<TriageConfig>) -> Self {
        Self { provider, config }
    }

    /// Classify a ticket. Never fails: transient provider errors are retried
    /// per the configured policy, and everything else drops to the keyword
    /// fallback. Retries are sequential, each waiting out its backoff delay,
    /// so the call can block for up to
    /// `sum(backoff delays) + max_attempts * timeout`.
    pub async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        let prompt = build_categorization_prompt(request, &self.config.departments);
        let policy = &self.config.retry;

        for attempt in 1..=policy.max_attempts {
            info!("AI categorization attempt {}/{}", attempt, policy.max_attempts);

            match self.provider.complete(&prompt).await {
                Ok(reply) => match parse_model_reply(&reply, &self.config.departments) {
                    Ok(parsed) => {
                        let confidence = parsed.confidence.unwrap_or(DEFAULT_AI_CONFIDENCE);
                        info!(
                            "Categorized as: {} (confidence: {}%)",
                            parsed.department, confidence
                        );
                        return ClassificationResult {
                            department: parsed.department,
                            confidence,
                            source: Source::Ai,
                            rationale: parsed.rationale,
                        };
                    }
                    // Malformed output will not self-correct on the same
                    // prompt; drop to the fallback instead of retrying.
                    Err(e) => {
                        warn!("Model reply failed validation: {e}");
                        break;
                    }
                },
                Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                    let delay = policy.delay_for(attempt) + jitter();
                    warn!(
                        "AI categorization attempt {}/{} failed ({e}), retrying in {:?}",
                        attempt, policy.max_attempts, delay
                    );
                    sleep(delay).await;
                }
                Err(e) if e.is_retryable() => {
                    error!(
                        "All {} AI categorization attempts failed: {e}",
                        policy.max_attempts
                    );
                }
                Err(e) => {
                    error!("AI categorization failed without retry: {e}");
                    break;
                }
            }
        }

        warn!("AI categorization unavailable, using keyword fallback");
        classify_by_keywords(request, &self.config)
    }

    /// Re-categorize an existing ticket, e.g. after its details changed or
    /// the initial categorization was wrong. Produces a fresh result.
    pub async fn reclassify(&self, request: &ClassificationRequest) -> ClassificationResult {
        info!("Recategorizing ticket");
        self.classify(request).await
    }
}

/// Small additive jitter so synchronized callers do not retry in lockstep.
/// Only ever lengthens a wait, keeping the policy's delays a lower bound.
fn jitter() -> Duration {
    Duration::from_millis(random::<u64>() % 100)
}
