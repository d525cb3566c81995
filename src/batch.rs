//! Batched mutation: splits large operation lists into bounded remote mutate calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AdsError;
use crate::models::Identified;

/// Operator tag carried by every mutate operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Add,
    Set,
    Remove,
}

/// One mutate operation: an operator plus the entity payload it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation<R> {
    pub operator: Operator,
    pub operand: R,
}

impl<R> Operation<R> {
    pub fn add(operand: R) -> Self {
        Self {
            operator: Operator::Add,
            operand,
        }
    }

    pub fn set(operand: R) -> Self {
        Self {
            operator: Operator::Set,
            operand,
        }
    }

    pub fn remove(operand: R) -> Self {
        Self {
            operator: Operator::Remove,
            operand,
        }
    }
}

/// Remote mutate capability. Returns one entry per submitted operation, in order.
///
/// Implementations report a response whose length differs from the submitted
/// operations as a `RemoteCall` error rather than returning it.
#[async_trait]
pub trait MutateService<R>: Send + Sync {
    async fn mutate(&self, operations: &[Operation<R>]) -> Result<Vec<R>, AdsError>;
}

/// Outcome of one submitted chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult<R> {
    /// Position of the chunk in submission order.
    pub chunk_index: usize,
    /// Number of operations the chunk carried.
    pub submitted: usize,
    /// Entities returned by the service for this chunk.
    pub value: Vec<R>,
}

impl<R: Identified> MutationResult<R> {
    /// Identifiers of the entities the service returned, skipping any without one.
    pub fn created_ids(&self) -> Vec<i64> {
        self.value.iter().filter_map(Identified::id).collect()
    }
}

/// Submits `requests` in consecutive chunks of at most `chunk_size` operations.
///
/// Chunks are sent one at a time in input order. An empty request list sends
/// nothing and returns an empty result list. The first failing chunk aborts the
/// whole call: later chunks are never submitted and no partial results are
/// returned. Chunks applied before the failure are not rolled back.
pub async fn submit_batch<R, S>(
    service: &S,
    requests: &[Operation<R>],
    chunk_size: usize,
) -> Result<Vec<MutationResult<R>>, AdsError>
where
    S: MutateService<R> + ?Sized,
{
    if chunk_size == 0 {
        return Err(AdsError::Configuration(
            "Batch chunk size must be greater than zero".to_string(),
        ));
    }

    if requests.is_empty() {
        tracing::debug!("Empty batch, nothing to submit");
        return Ok(Vec::new());
    }

    let total_chunks = requests.len().div_ceil(chunk_size);
    let mut results = Vec::with_capacity(total_chunks);

    for (chunk_index, chunk) in requests.chunks(chunk_size).enumerate() {
        tracing::debug!(
            "Submitting chunk {}/{} ({} operations)",
            chunk_index + 1,
            total_chunks,
            chunk.len()
        );

        let value = match service.mutate(chunk).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "Mutate chunk {} failed after {} chunks were applied: {}",
                    chunk_index,
                    chunk_index,
                    e
                );
                return Err(AdsError::ChunkFailed {
                    chunk_index,
                    applied_chunks: chunk_index,
                    source: Box::new(e),
                });
            }
        };

        results.push(MutationResult {
            chunk_index,
            submitted: chunk.len(),
            value,
        });
    }

    tracing::info!(
        "Submitted {} operations in {} chunks",
        requests.len(),
        results.len()
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item(i64);

    impl Identified for Item {
        fn id(&self) -> Option<i64> {
            Some(self.0)
        }
    }

    /// Echoes operands back and records each chunk; fails on `fail_on` if set.
    struct RecordingMutate {
        calls: Mutex<Vec<Vec<i64>>>,
        fail_on: Option<usize>,
    }

    impl RecordingMutate {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl MutateService<Item> for RecordingMutate {
        async fn mutate(&self, operations: &[Operation<Item>]) -> Result<Vec<Item>, AdsError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(operations.iter().map(|op| op.operand.0).collect());
            if self.fail_on == Some(index) {
                return Err(AdsError::remote("AdGroupCriterionService", "mutate", "boom"));
            }
            Ok(operations.iter().map(|op| op.operand.clone()).collect())
        }
    }

    fn requests(n: i64) -> Vec<Operation<Item>> {
        (0..n).map(|i| Operation::add(Item(i))).collect()
    }

    #[tokio::test]
    async fn test_4500_requests_make_three_chunks() {
        let service = RecordingMutate::new(None);

        let results = submit_batch(&service, &requests(4500), 2000).await.unwrap();

        let sizes: Vec<usize> = results.iter().map(|r| r.submitted).collect();
        assert_eq!(sizes, vec![2000, 2000, 500]);
        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].first(), Some(&2000));
        assert_eq!(calls[2].last(), Some(&4499));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_calls() {
        let service = RecordingMutate::new(None);

        let results = submit_batch(&service, &requests(0), 2000).await.unwrap();

        assert!(results.is_empty());
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_stops_later_chunks() {
        let service = RecordingMutate::new(Some(1));

        let err = submit_batch(&service, &requests(10), 3).await.unwrap_err();

        match err {
            AdsError::ChunkFailed {
                chunk_index,
                applied_chunks,
                ..
            } => {
                assert_eq!(chunk_index, 1);
                assert_eq!(applied_chunks, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(service.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_rejected_before_calls() {
        let service = RecordingMutate::new(None);

        let err = submit_batch(&service, &requests(5), 0).await.unwrap_err();

        assert!(err.is_configuration());
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_results_carry_chunk_index_and_ids() {
        let service = RecordingMutate::new(None);

        let results = submit_batch(&service, &requests(5), 2).await.unwrap();

        assert_eq!(
            results.iter().map(|r| r.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(results[2].created_ids(), vec![4]);
    }

    #[test]
    fn test_operation_wire_shape() {
        let op = Operation::remove(Item(3));
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value, serde_json::json!({"operator": "REMOVE", "operand": 3}));
    }
}
