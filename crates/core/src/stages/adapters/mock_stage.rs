//! Mock stage unit for testing.

use crate::stages::base::{EntryPoint, StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// What a [`MockStage`] does when invoked.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Succeed(StageOutput),
    Fail(String),
    Panic(String),
}

/// A scripted stage unit that records every invocation.
#[derive(Debug, Clone)]
pub struct MockStage {
    entry_points: Vec<EntryPoint>,
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<EntryPoint>>>,
}

impl MockStage {
    pub fn new(entry_points: Vec<EntryPoint>, behavior: MockBehavior) -> Self {
        Self {
            entry_points,
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Exposes `run` and returns no output.
    pub fn success() -> Self {
        Self::new(vec![EntryPoint::Run], MockBehavior::Succeed(None))
    }

    pub fn with_output(output: serde_json::Value) -> Self {
        Self::new(vec![EntryPoint::Run], MockBehavior::Succeed(Some(output)))
    }

    pub fn failing() -> Self {
        Self::new(
            vec![EntryPoint::Run],
            MockBehavior::Fail("Mock failure".to_string()),
        )
    }

    pub fn panicking() -> Self {
        Self::new(
            vec![EntryPoint::Run],
            MockBehavior::Panic("Mock panic".to_string()),
        )
    }

    /// Resolves but exposes nothing to call.
    pub fn without_entry_points() -> Self {
        Self::new(Vec::new(), MockBehavior::Succeed(None))
    }

    /// Replace the exposed entry points, keeping the behavior.
    pub fn exposing(mut self, entry_points: Vec<EntryPoint>) -> Self {
        self.entry_points = entry_points;
        self
    }

    /// Entry points invoked so far, in call order.
    pub fn calls(&self) -> Vec<EntryPoint> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl StageUnit for MockStage {
    fn entry_points(&self) -> Vec<EntryPoint> {
        self.entry_points.clone()
    }

    async fn invoke(
        &self,
        entry: &EntryPoint,
        _context: &StageContext,
    ) -> Result<StageOutput, StageError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(entry.clone());
        }

        match &self.behavior {
            MockBehavior::Succeed(output) => Ok(output.clone()),
            MockBehavior::Fail(message) => Err(StageError::Body(anyhow::anyhow!(message.clone()))),
            MockBehavior::Panic(message) => panic!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use fxp_protocol::stage_models::StageName;

    fn context() -> StageContext {
        StageContext::new(StageName::Setup, &RunConfig::default())
    }

    #[tokio::test]
    async fn test_mock_stage_success() {
        let stage = MockStage::with_output(serde_json::json!({"rows": 5}));

        let output = stage
            .invoke(&EntryPoint::Run, &context())
            .await
            .expect("mock should succeed");

        assert_eq!(output, Some(serde_json::json!({"rows": 5})));
        assert_eq!(stage.calls(), vec![EntryPoint::Run]);
    }

    #[tokio::test]
    async fn test_mock_stage_failing() {
        let stage = MockStage::failing();

        let err = stage
            .invoke(&EntryPoint::Run, &context())
            .await
            .expect_err("mock should fail");

        assert_eq!(err.to_string(), "Mock failure");
        assert_eq!(stage.call_count(), 1);
    }

    #[test]
    fn test_clones_share_call_log() {
        let stage = MockStage::success().exposing(vec![EntryPoint::Main]);
        let observer = stage.clone();

        tokio::runtime::Runtime::new()
            .expect("Failed to build runtime")
            .block_on(stage.invoke(&EntryPoint::Main, &context()))
            .expect("mock should succeed");

        assert_eq!(observer.calls(), vec![EntryPoint::Main]);
        assert_eq!(observer.entry_points(), vec![EntryPoint::Main]);
    }
}
