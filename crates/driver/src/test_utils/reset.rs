//! A mock [FindL2Heads].

use crate::{FindL2Heads, L2Heads, SyncConfig};
use async_trait::async_trait;
use rollup_protocol::RollupConfig;

/// A mock [FindL2Heads] that always answers with the same result.
#[derive(Debug, Clone)]
pub struct TestFindL2Heads {
    /// The result of every lookup.
    pub heads: Result<L2Heads, String>,
    /// The number of lookups.
    pub calls: usize,
}

impl TestFindL2Heads {
    /// Creates a new [TestFindL2Heads].
    pub const fn new(heads: Result<L2Heads, String>) -> Self {
        Self { heads, calls: 0 }
    }
}

impl Default for TestFindL2Heads {
    fn default() -> Self {
        Self::new(Ok(L2Heads::default()))
    }
}

#[async_trait]
impl FindL2Heads for TestFindL2Heads {
    type Error = String;

    async fn find_l2_heads(
        &mut self,
        _: &RollupConfig,
        _: &SyncConfig,
    ) -> Result<L2Heads, Self::Error> {
        self.calls += 1;
        self.heads.clone()
    }
}
