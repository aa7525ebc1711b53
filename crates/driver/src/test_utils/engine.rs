//! A mock [EngineClient].

use crate::{EngineClient, EngineClientError};
use alloy_rpc_types_engine::{ForkchoiceState, PayloadStatus, PayloadStatusEnum};
use async_trait::async_trait;
use core::time::Duration;
use rollup_protocol::ExecutionPayloadEnvelope;
use std::collections::VecDeque;

/// A mock [EngineClient] answering with queued results, and `VALID` once they run out.
#[derive(Debug, Default)]
pub struct TestEngineClient {
    /// Results for `new_payload` calls, in order.
    pub new_payload_results: VecDeque<Result<PayloadStatus, EngineClientError>>,
    /// Results for `forkchoice_updated` calls, in order.
    pub forkchoice_results: VecDeque<Result<PayloadStatus, EngineClientError>>,
    /// Delays every call.
    pub delay: Option<Duration>,
    /// The payloads received.
    pub payloads: Vec<ExecutionPayloadEnvelope>,
    /// The forkchoice states received.
    pub forkchoice_calls: Vec<ForkchoiceState>,
}

impl TestEngineClient {
    /// Queues a result for `new_payload`.
    pub fn with_new_payload(mut self, result: Result<PayloadStatus, EngineClientError>) -> Self {
        self.new_payload_results.push_back(result);
        self
    }

    /// Queues a result for `forkchoice_updated`.
    pub fn with_forkchoice(mut self, result: Result<PayloadStatus, EngineClientError>) -> Self {
        self.forkchoice_results.push_back(result);
        self
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl EngineClient for TestEngineClient {
    async fn new_payload(
        &mut self,
        envelope: &ExecutionPayloadEnvelope,
    ) -> Result<PayloadStatus, EngineClientError> {
        self.wait().await;
        self.payloads.push(envelope.clone());
        self.new_payload_results
            .pop_front()
            .unwrap_or_else(|| Ok(PayloadStatus::from_status(PayloadStatusEnum::Valid)))
    }

    async fn forkchoice_updated(
        &mut self,
        state: ForkchoiceState,
    ) -> Result<PayloadStatus, EngineClientError> {
        self.wait().await;
        self.forkchoice_calls.push(state);
        self.forkchoice_results
            .pop_front()
            .unwrap_or_else(|| Ok(PayloadStatus::from_status(PayloadStatusEnum::Valid)))
    }
}
