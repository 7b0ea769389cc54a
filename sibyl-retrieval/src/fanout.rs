//! Concurrent multi-strategy fan-out.
//!
//! Strategies of one batch run concurrently, each under its own
//! deadline. A slow or failing strategy never blocks or fails the
//! others; the batch fails only when every strategy does.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use sibyl_core::constants::MAX_FANOUT_CONCURRENCY;
use sibyl_core::errors::{RetrievalError, SibylResult};
use sibyl_core::models::StrategyResult;

use crate::strategy::RetrievalStrategy;

pub struct MultiStrategyRetriever {
    strategies: Vec<Arc<RetrievalStrategy>>,
    per_strategy_deadline: Duration,
    limiter: Arc<Semaphore>,
}

impl MultiStrategyRetriever {
    pub fn new(strategies: Vec<Arc<RetrievalStrategy>>, per_strategy_deadline: Duration) -> Self {
        let permits = strategies.len().clamp(1, MAX_FANOUT_CONCURRENCY);
        Self {
            strategies,
            per_strategy_deadline,
            limiter: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Issue `query` to every configured strategy concurrently.
    ///
    /// Returns surviving results in configured strategy order (fusion
    /// tie-breaking and concat order depend on it). Errors only when all
    /// strategies fail.
    pub async fn fan_out(&self, query: &str, top_k: usize) -> SibylResult<Vec<StrategyResult>> {
        let mut join_set = JoinSet::new();
        for (position, strategy) in self.strategies.iter().enumerate() {
            let strategy = Arc::clone(strategy);
            let limiter = Arc::clone(&self.limiter);
            let query = query.to_string();
            let deadline = self.per_strategy_deadline;
            join_set.spawn(async move {
                let outcome = match limiter.acquire_owned().await {
                    Ok(_permit) => {
                        tokio::time::timeout(deadline, strategy.retrieve(&query, top_k)).await
                    }
                    Err(_) => Ok(Err(RetrievalError::StrategyFailed {
                        strategy: strategy.name().to_string(),
                        reason: "concurrency limiter closed".to_string(),
                    }
                    .into())),
                };
                (position, strategy.name(), deadline, outcome)
            });
        }

        let mut slots: Vec<Option<StrategyResult>> = vec![None; self.strategies.len()];
        while let Some(joined) = join_set.join_next().await {
            let (position, name, deadline, outcome) = match joined {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "fan-out task panicked, skipping strategy");
                    continue;
                }
            };
            match outcome {
                Ok(Ok(result)) => {
                    debug!(
                        strategy = name,
                        candidates = result.candidates.len(),
                        "strategy returned"
                    );
                    slots[position] = Some(result);
                }
                Ok(Err(e)) => {
                    warn!(strategy = name, error = %e, "strategy failed, continuing");
                }
                Err(_) => {
                    let e = RetrievalError::StrategyTimeout {
                        strategy: name.to_string(),
                        deadline_ms: deadline.as_millis() as u64,
                    };
                    warn!(strategy = name, error = %e, "strategy timed out, continuing");
                }
            }
        }

        let results: Vec<StrategyResult> = slots.into_iter().flatten().collect();
        if results.is_empty() {
            return Err(RetrievalError::AllStrategiesFailed {
                attempted: self.strategies.len(),
            }
            .into());
        }
        Ok(results)
    }
}
