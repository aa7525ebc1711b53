//! The [PipelineDeriver] steps the derivation pipeline on request.

use crate::{Deriver, Emitter, Event};
use async_trait::async_trait;
use core::fmt::Debug;
use rollup_derive::{
    errors::PipelineErrorKind,
    traits::{Pipeline, StepOutcome},
};
use rollup_protocol::AttributesWithParent;

/// Wraps a [Pipeline] as a [Deriver].
///
/// Once attributes are handed out, further steps are skipped until their consumer emits
/// [Event::ConfirmReceivedAttributes], so the pending safe head can catch up first.
#[derive(Debug)]
pub struct PipelineDeriver<P, E>
where
    P: Pipeline + Debug + Send,
    E: Emitter + Debug,
{
    pipeline: P,
    emitter: E,
    needs_attributes_confirmation: bool,
}

impl<P, E> PipelineDeriver<P, E>
where
    P: Pipeline + Debug + Send,
    E: Emitter + Debug,
{
    /// Creates a new [PipelineDeriver].
    pub const fn new(pipeline: P, emitter: E) -> Self {
        Self { pipeline, emitter, needs_attributes_confirmation: false }
    }

    /// Returns the wrapped pipeline.
    pub const fn pipeline(&self) -> &P {
        &self.pipeline
    }

    fn emit_attributes(&mut self, attributes: AttributesWithParent) {
        self.needs_attributes_confirmation = true;
        self.emitter.emit(Event::DerivedAttributes { attributes });
    }

    fn emit_error(&self, err: PipelineErrorKind) {
        match err {
            PipelineErrorKind::Temporary(err) => {
                warn!(target: "pipeline", "Derivation process temporary error: {err}");
                self.emitter.emit(Event::DeriverTemporaryError { err: err.to_string() });
            }
            PipelineErrorKind::Reset(err) => {
                warn!(target: "pipeline", "Derivation process reset: {err}");
                self.emitter.emit(Event::Reset { err: err.to_string() });
            }
            PipelineErrorKind::Critical(err) => {
                error!(target: "pipeline", "Derivation process critical error: {err}");
                self.emitter.emit(Event::CriticalError { err: err.to_string() });
            }
        }
    }
}

#[async_trait]
impl<P, E> Deriver for PipelineDeriver<P, E>
where
    P: Pipeline + Debug + Send,
    E: Emitter + Debug,
{
    async fn on_event(&mut self, event: &Event) -> bool {
        match event {
            Event::PipelineStep { pending_safe } => {
                if self.needs_attributes_confirmation {
                    trace!(target: "pipeline", "Awaiting confirmation of the derived attributes");
                    return true;
                }
                match self.pipeline.step(*pending_safe).await {
                    Ok(StepOutcome::PreparedAttributes(attributes)) => {
                        self.emit_attributes(attributes)
                    }
                    Ok(StepOutcome::ResetProgress) => {
                        self.emitter.emit(Event::PendingSafeRequest);
                    }
                    Ok(StepOutcome::Eof) => match self.pipeline.origin() {
                        Some(origin) => {
                            debug!(
                                target: "pipeline",
                                origin = %origin,
                                "Derivation process went idle"
                            );
                            self.emitter.emit(Event::DeriverIdle { origin });
                        }
                        None => debug!(
                            target: "pipeline",
                            "Derivation process went idle without an origin"
                        ),
                    },
                    Err(err) => self.emit_error(err),
                }
            }
            Event::ConfirmReceivedAttributes => {
                self.needs_attributes_confirmation = false;
            }
            Event::EngineResetConfirmed(heads) => {
                info!(
                    target: "pipeline",
                    safe_head = %heads.local_safe,
                    "Engine reset confirmed, resetting derivation stages"
                );
                self.pipeline.confirm_engine_reset();
                self.emitter.emit(Event::PendingSafeRequest);
            }
            Event::DepositsOnlyPayloadAttributesRequest { parent, derived_from } => {
                match self.pipeline.deposits_only_attributes(*parent, *derived_from) {
                    Ok(attributes) => self.emit_attributes(attributes),
                    Err(err) => self.emit_error(err),
                }
            }
            Event::Reset { .. } => {
                self.needs_attributes_confirmation = false;
                self.pipeline.reset();
                return false;
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::TestEmitter, ResetHeads};
    use rollup_derive::{
        errors::{PipelineError, ResetError},
        test_utils::{new_test_pipeline, TestPipeline},
    };
    use rollup_protocol::{BlockInfo, L2BlockInfo};

    fn new_deriver() -> (PipelineDeriver<TestPipeline, TestEmitter>, TestEmitter) {
        let emitter = TestEmitter::default();
        (PipelineDeriver::new(new_test_pipeline(), emitter.clone()), emitter)
    }

    #[tokio::test]
    async fn test_step_before_engine_reset_requests_reset() {
        let (mut deriver, emitter) = new_deriver();
        let step = Event::PipelineStep { pending_safe: L2BlockInfo::default() };
        assert!(deriver.on_event(&step).await);
        assert_eq!(
            emitter.take(),
            vec![Event::Reset { err: ResetError::EngineNotReset.to_string() }]
        );
    }

    #[tokio::test]
    async fn test_engine_reset_confirmed() {
        let (mut deriver, emitter) = new_deriver();
        assert!(deriver.on_event(&Event::EngineResetConfirmed(ResetHeads::default())).await);
        assert_eq!(emitter.take(), vec![Event::PendingSafeRequest]);

        // The pending safe head is L2 genesis: the reset walk needs the genesis L1 origin.
        deriver.on_event(&Event::PipelineStep { pending_safe: L2BlockInfo::default() }).await;
        assert!(matches!(emitter.take()[..], [Event::DeriverTemporaryError { .. }]));
    }

    #[tokio::test]
    async fn test_reset_is_observed() {
        let (mut deriver, emitter) = new_deriver();
        deriver.pipeline.confirm_engine_reset();
        deriver.needs_attributes_confirmation = true;
        assert!(!deriver.on_event(&Event::Reset { err: "reorg".to_string() }).await);
        assert!(!deriver.needs_attributes_confirmation);

        // The engine must confirm its reset again.
        deriver.on_event(&Event::PipelineStep { pending_safe: L2BlockInfo::default() }).await;
        assert_eq!(
            emitter.take(),
            vec![Event::Reset { err: ResetError::EngineNotReset.to_string() }]
        );
    }

    #[tokio::test]
    async fn test_derived_attributes_await_confirmation() {
        let (mut deriver, emitter) = new_deriver();
        deriver.emit_attributes(AttributesWithParent::default());
        assert_eq!(
            emitter.take(),
            vec![Event::DerivedAttributes { attributes: AttributesWithParent::default() }]
        );

        let step = Event::PipelineStep { pending_safe: L2BlockInfo::default() };
        assert!(deriver.on_event(&step).await);
        assert!(emitter.take().is_empty());

        deriver.on_event(&Event::ConfirmReceivedAttributes).await;
        deriver.on_event(&Event::PipelineStep { pending_safe: L2BlockInfo::default() }).await;
        assert_eq!(emitter.take().len(), 1);
    }

    #[tokio::test]
    async fn test_deposits_only_request_error() {
        let (mut deriver, emitter) = new_deriver();
        let request = Event::DepositsOnlyPayloadAttributesRequest {
            parent: Default::default(),
            derived_from: BlockInfo::default(),
        };
        assert!(deriver.on_event(&request).await);
        assert_eq!(
            emitter.take(),
            vec![Event::CriticalError { err: PipelineError::NoAttributesGenerated.to_string() }]
        );
    }
}
