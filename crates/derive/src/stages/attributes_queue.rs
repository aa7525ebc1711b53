//! Contains the logic for the `AttributesQueue` stage.

use crate::{
    batch::SingleBatch,
    deadline::{with_deadline, CancellationToken},
    errors::{PipelineError, PipelineResult, ResetError},
    traits::{
        AttributesBuilder, AttributesProvider, DerivationStage, ForkTransformer, NextAttributes,
        OriginProvider, ResettableStage, StageReset,
    },
};
use alloc::{boxed::Box, sync::Arc};
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use core::{fmt::Debug, time::Duration};
use rollup_protocol::{
    AttributesWithParent, BlockInfo, L2BlockInfo, PayloadAttributes, RollupConfig, SystemConfig,
};

/// The default deadline for the [AttributesBuilder] to prepare payload attributes.
pub const ATTRIBUTES_TIMEOUT: Duration = Duration::from_secs(20);

/// [AttributesQueue] accepts batches from the [AttributesProvider] stage
/// and transforms them into [PayloadAttributes]. The outputted payload
/// attributes cannot be buffered because each batch->attributes transformation
/// pulls in data about the current L2 safe head.
///
/// [AttributesQueue] also buffers batches that have been output because
/// multiple batches can be created at once.
///
/// This stage can be reset by clearing its batch buffer.
/// This stage does not need to retain any references to L1 blocks.
#[derive(Debug)]
pub struct AttributesQueue<P, AB>
where
    P: AttributesProvider + Debug,
    AB: AttributesBuilder + Debug,
{
    /// The rollup config.
    cfg: Arc<RollupConfig>,
    /// The previous stage of the derivation pipeline.
    prev: P,
    /// Whether the current batch is the last in its span.
    is_last_in_span: bool,
    /// The current batch being processed.
    batch: Option<SingleBatch>,
    /// The last attributes handed out, kept for deposits-only retries.
    last_attributes: Option<AttributesWithParent>,
    /// The attributes builder.
    builder: AB,
    /// Deadline for a single [AttributesBuilder::prepare_payload_attributes] call.
    timeout: Duration,
    /// Cancellation of the caller driving the pipeline.
    cancel: CancellationToken,
}

impl<P, AB> AttributesQueue<P, AB>
where
    P: AttributesProvider + Debug,
    AB: AttributesBuilder + Debug,
{
    /// Create a new [AttributesQueue] stage.
    pub fn new(cfg: Arc<RollupConfig>, prev: P, builder: AB) -> Self {
        Self {
            cfg,
            prev,
            is_last_in_span: false,
            batch: None,
            last_attributes: None,
            builder,
            timeout: ATTRIBUTES_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the deadline for preparing payload attributes.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the cancellation token that aborts in-flight attribute preparation.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Loads a batch from the previous stage if needed.
    pub async fn load_batch(&mut self, parent: L2BlockInfo) -> PipelineResult<SingleBatch> {
        if self.batch.is_none() {
            let batch = self.prev.next_batch(parent).await?;
            self.batch = Some(batch);
            self.is_last_in_span = self.prev.is_last_in_span();
        }
        self.batch.as_ref().cloned().ok_or(PipelineError::Eof.temp())
    }

    /// Creates the next attributes, transforming a [SingleBatch] into [PayloadAttributes].
    /// This sets `no_tx_pool` and appends the batched transactions to the attributes transaction
    /// list.
    pub async fn create_next_attributes(
        &mut self,
        batch: SingleBatch,
        parent: L2BlockInfo,
    ) -> PipelineResult<PayloadAttributes> {
        // Sanity check parent hash
        crate::ensure!(
            batch.parent_hash == parent.block_info.hash,
            ResetError::BadParentHash(parent.block_info.hash, batch.parent_hash).into()
        );

        // Sanity check timestamp
        let expected = parent.block_info.timestamp + self.cfg.block_time;
        crate::ensure!(
            expected == batch.timestamp,
            ResetError::BadTimestamp(expected, batch.timestamp).into()
        );

        // Prepare the payload attributes
        let tx_count = batch.transactions.len();
        let mut attributes = with_deadline(
            &self.cancel,
            self.timeout,
            self.builder.prepare_payload_attributes(parent, batch.epoch()),
        )
        .await
        .map_err(|e| PipelineError::from(e).temp())??;

        // Verifiers never pull from the transaction pool, the block must be reproducible from L1.
        attributes.no_tx_pool = true;
        attributes.transactions.extend(batch.transactions);

        info!(
            target: "attributes-queue",
            txs = tx_count,
            timestamp = batch.timestamp,
            "generated attributes in payload queue"
        );

        Ok(attributes)
    }
}

impl<P, AB> OriginProvider for AttributesQueue<P, AB>
where
    P: AttributesProvider + Debug,
    AB: AttributesBuilder + Debug,
{
    fn origin(&self) -> Option<BlockInfo> {
        self.prev.origin()
    }
}

#[async_trait]
impl<P, AB> NextAttributes for AttributesQueue<P, AB>
where
    P: AttributesProvider + Debug + Send,
    AB: AttributesBuilder + Debug + Send,
{
    async fn next_attributes(
        &mut self,
        parent: L2BlockInfo,
    ) -> PipelineResult<AttributesWithParent> {
        // Load the batch
        let batch = self.load_batch(parent).await?;

        // Construct the payload attributes from the loaded batch
        let attributes = self.create_next_attributes(batch, parent).await?;
        let populated_attributes = AttributesWithParent::new(
            attributes,
            parent,
            self.is_last_in_span,
            self.origin(),
        );

        // Clear out the local state once we will succeed
        self.last_attributes = Some(populated_attributes.clone());
        self.batch = None;
        self.is_last_in_span = false;
        Ok(populated_attributes)
    }

    fn deposits_only_attributes(
        &mut self,
        parent: BlockNumHash,
        derived_from: BlockInfo,
    ) -> PipelineResult<AttributesWithParent> {
        if let Some(batch) = &self.batch {
            return Err(
                PipelineError::UnexpectedBufferedBatch(batch.parent_hash, batch.epoch()).crit()
            );
        }
        let Some(last) = &self.last_attributes else {
            return Err(PipelineError::NoAttributesGenerated.crit());
        };
        if last.derived_from != Some(derived_from) {
            return Err(PipelineError::UnexpectedOrigin(
                last.derived_from.map(|o| o.id()),
                derived_from.id(),
            )
            .crit());
        }
        if last.parent.id() != parent {
            return Err(PipelineError::UnexpectedParent(last.parent.id(), parent).crit());
        }

        let attributes = last.with_deposits_only();
        self.last_attributes = Some(attributes.clone());
        Ok(attributes)
    }
}

#[async_trait]
impl<P, AB> ResettableStage for AttributesQueue<P, AB>
where
    P: AttributesProvider + Debug + Send,
    AB: AttributesBuilder + Debug + Send,
{
    async fn reset(&mut self, base: BlockInfo, cfg: &SystemConfig) -> PipelineResult<StageReset> {
        let outcome = self.prev.reset(base, cfg).await?;
        self.batch = None;
        self.is_last_in_span = false;
        self.last_attributes = None;
        Ok(outcome)
    }
}

impl<P, AB> DerivationStage for AttributesQueue<P, AB>
where
    P: AttributesProvider + Debug + Send,
    AB: AttributesBuilder + Debug + Send,
{
    fn as_fork_transformer(&mut self) -> Option<&mut dyn ForkTransformer> {
        self.prev.as_fork_transformer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{BuilderError, PipelineErrorKind},
        test_utils::{TestAttributesBuilder, TestAttributesProvider},
    };
    use alloy_primitives::{Bytes, B256};

    fn new_attributes_queue(
        cfg: Option<RollupConfig>,
        origin: Option<BlockInfo>,
        batches: Vec<PipelineResult<SingleBatch>>,
    ) -> AttributesQueue<TestAttributesProvider, TestAttributesBuilder> {
        let cfg = cfg.unwrap_or_default();
        let provider = TestAttributesProvider::new(origin, batches);
        AttributesQueue::new(Arc::new(cfg), provider, TestAttributesBuilder::default())
    }

    fn parent_at(number: u64, timestamp: u64) -> L2BlockInfo {
        L2BlockInfo {
            block_info: BlockInfo {
                hash: B256::with_last_byte(number as u8),
                number,
                timestamp,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn batch_on(parent: &L2BlockInfo, block_time: u64, txs: Vec<Bytes>) -> SingleBatch {
        SingleBatch {
            parent_hash: parent.block_info.hash,
            timestamp: parent.block_info.timestamp + block_time,
            transactions: txs,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_load_batch_eof() {
        let mut aq = new_attributes_queue(None, None, vec![]);
        let result = aq.load_batch(L2BlockInfo::default()).await.unwrap_err();
        assert_eq!(result, PipelineError::Eof.temp());
    }

    #[tokio::test]
    async fn test_load_batch_last_in_span() {
        let mut aq = new_attributes_queue(None, None, vec![Ok(Default::default())]);
        let batch = aq.load_batch(L2BlockInfo::default()).await.unwrap();
        assert_eq!(batch, SingleBatch::default());
        assert!(aq.is_last_in_span);
        assert_eq!(aq.batch, Some(SingleBatch::default()));
    }

    #[tokio::test]
    async fn test_create_next_attributes_bad_parent_hash() {
        let mut aq = new_attributes_queue(None, None, vec![]);
        let bad_hash = B256::with_last_byte(0xff);
        let parent = parent_at(1, 10);
        let batch = SingleBatch { parent_hash: bad_hash, ..Default::default() };
        let result = aq.create_next_attributes(batch, parent).await.unwrap_err();
        assert_eq!(
            result,
            PipelineErrorKind::Reset(ResetError::BadParentHash(parent.block_info.hash, bad_hash))
        );
    }

    #[tokio::test]
    async fn test_create_next_attributes_bad_timestamp() {
        let mut aq = new_attributes_queue(None, None, vec![]);
        let parent = parent_at(1, 10);
        let batch = SingleBatch { parent_hash: parent.block_info.hash, ..Default::default() };
        let result = aq.create_next_attributes(batch, parent).await.unwrap_err();
        assert_eq!(result, PipelineErrorKind::Reset(ResetError::BadTimestamp(12, 0)));
    }

    #[tokio::test]
    async fn test_create_next_attributes_forces_no_tx_pool() {
        let mut aq = new_attributes_queue(None, None, vec![]);
        let parent = parent_at(1, 10);
        let txs = vec![Bytes::from(vec![0x02, 0x01]), Bytes::from(vec![0x02, 0x02])];
        let batch = batch_on(&parent, 2, txs.clone());
        let template = PayloadAttributes {
            timestamp: 12,
            transactions: vec![Bytes::from(vec![0x7e, 0x00])],
            no_tx_pool: false,
            ..Default::default()
        };
        aq.builder.attributes.push(Ok(template));

        let attributes = aq.create_next_attributes(batch, parent).await.unwrap();
        assert!(attributes.no_tx_pool);
        assert_eq!(attributes.transactions.len(), 3);
        assert_eq!(&attributes.transactions[1..], txs.as_slice());
    }

    #[tokio::test]
    async fn test_create_next_attributes_builder_error() {
        let mut aq = new_attributes_queue(None, None, vec![]);
        let parent = parent_at(1, 10);
        let batch = batch_on(&parent, 2, vec![]);
        let result = aq.create_next_attributes(batch, parent).await.unwrap_err();
        assert_eq!(
            result,
            PipelineError::AttributesBuilder(BuilderError::AttributesUnavailable).crit()
        );
    }

    #[cfg(feature = "std")]
    #[tokio::test]
    async fn test_create_next_attributes_timeout() {
        let mut aq =
            new_attributes_queue(None, None, vec![]).with_timeout(Duration::from_millis(10));
        aq.builder.delay = Some(Duration::from_secs(5));
        aq.builder.attributes.push(Ok(PayloadAttributes::default()));
        let parent = parent_at(1, 10);
        let batch = batch_on(&parent, 2, vec![]);
        let result = aq.create_next_attributes(batch, parent).await.unwrap_err();
        assert_eq!(result, PipelineError::Timeout(Duration::from_millis(10)).temp());
    }

    #[cfg(feature = "std")]
    #[tokio::test]
    async fn test_create_next_attributes_cancelled() {
        let cancel = CancellationToken::new();
        let mut aq = new_attributes_queue(None, None, vec![]).with_cancellation(cancel.clone());
        aq.builder.attributes.push(Ok(PayloadAttributes::default()));
        cancel.cancel();
        let parent = parent_at(1, 10);
        let batch = batch_on(&parent, 2, vec![]);
        let result = aq.create_next_attributes(batch, parent).await.unwrap_err();
        assert_eq!(result, PipelineError::Cancelled.temp());
    }

    #[tokio::test]
    async fn test_next_attributes_load_batch_eof() {
        let mut aq = new_attributes_queue(None, None, vec![]);
        let result = aq.next_attributes(L2BlockInfo::default()).await.unwrap_err();
        assert!(result.is_eof());
    }

    #[tokio::test]
    async fn test_next_attributes_success() {
        let origin = BlockInfo { number: 5, hash: B256::with_last_byte(5), ..Default::default() };
        let parent = parent_at(1, 10);
        let batch = batch_on(&parent, 2, vec![Bytes::from(vec![0x02])]);
        let mut aq = new_attributes_queue(None, Some(origin), vec![Ok(batch)]);
        aq.builder.attributes.push(Ok(PayloadAttributes { timestamp: 12, ..Default::default() }));

        let attributes = aq.next_attributes(parent).await.unwrap();
        assert_eq!(attributes.parent, parent);
        assert!(attributes.concluding);
        assert_eq!(attributes.derived_from, Some(origin));
        assert!(attributes.attributes.no_tx_pool);
        assert!(aq.batch.is_none());
        assert_eq!(aq.last_attributes, Some(attributes));
    }

    #[tokio::test]
    async fn test_reset_clears_state_idempotently() {
        let parent = parent_at(1, 10);
        let mut aq = new_attributes_queue(None, None, vec![Ok(batch_on(&parent, 2, vec![]))]);
        aq.load_batch(parent).await.unwrap();
        assert!(aq.batch.is_some());

        let base = BlockInfo::default();
        let cfg = SystemConfig::default();
        assert_eq!(aq.reset(base, &cfg).await, Ok(StageReset::Done));
        assert!(aq.batch.is_none());
        assert!(!aq.is_last_in_span);
        assert!(aq.last_attributes.is_none());

        assert_eq!(aq.reset(base, &cfg).await, Ok(StageReset::Done));
        assert!(aq.batch.is_none());
        assert!(aq.last_attributes.is_none());
    }

    #[tokio::test]
    async fn test_deposits_only_attributes_before_any() {
        let mut aq = new_attributes_queue(None, None, vec![]);
        let result = aq
            .deposits_only_attributes(BlockNumHash::default(), BlockInfo::default())
            .unwrap_err();
        assert_eq!(result, PipelineError::NoAttributesGenerated.crit());
    }

    #[tokio::test]
    async fn test_deposits_only_attributes_buffered_batch() {
        let parent = parent_at(1, 10);
        let batch = batch_on(&parent, 2, vec![]);
        let mut aq = new_attributes_queue(None, None, vec![Ok(batch.clone())]);
        aq.load_batch(parent).await.unwrap();
        let result = aq.deposits_only_attributes(parent.id(), BlockInfo::default()).unwrap_err();
        assert_eq!(
            result,
            PipelineError::UnexpectedBufferedBatch(batch.parent_hash, batch.epoch()).crit()
        );
    }

    #[tokio::test]
    async fn test_deposits_only_attributes_mismatches() {
        let origin = BlockInfo { number: 5, hash: B256::with_last_byte(5), ..Default::default() };
        let parent = parent_at(1, 10);
        let batch = batch_on(&parent, 2, vec![]);
        let mut aq = new_attributes_queue(None, Some(origin), vec![Ok(batch)]);
        aq.builder.attributes.push(Ok(PayloadAttributes::default()));
        aq.next_attributes(parent).await.unwrap();

        let other_origin = BlockInfo { number: 6, ..Default::default() };
        let result = aq.deposits_only_attributes(parent.id(), other_origin).unwrap_err();
        assert_eq!(
            result,
            PipelineError::UnexpectedOrigin(Some(origin.id()), other_origin.id()).crit()
        );

        let other_parent = parent_at(2, 12).id();
        let result = aq.deposits_only_attributes(other_parent, origin).unwrap_err();
        assert_eq!(result, PipelineError::UnexpectedParent(parent.id(), other_parent).crit());
    }

    #[tokio::test]
    async fn test_deposits_only_attributes_strips_user_transactions() {
        let origin = BlockInfo { number: 5, hash: B256::with_last_byte(5), ..Default::default() };
        let parent = parent_at(1, 10);
        let user_tx = Bytes::from(vec![0x02, 0x01]);
        let deposit = Bytes::from(vec![0x7e, 0x01]);
        let batch = batch_on(&parent, 2, vec![user_tx]);
        let mut aq = new_attributes_queue(None, Some(origin), vec![Ok(batch)]);
        aq.builder.attributes.push(Ok(PayloadAttributes {
            transactions: vec![deposit.clone()],
            ..Default::default()
        }));
        let full = aq.next_attributes(parent).await.unwrap();
        assert_eq!(full.attributes.transactions.len(), 2);

        let deposits_only = aq.deposits_only_attributes(parent.id(), origin).unwrap();
        assert_eq!(deposits_only.attributes.transactions, vec![deposit]);
        assert_eq!(deposits_only.parent, parent);
        assert_eq!(aq.last_attributes, Some(deposits_only));
    }
}
