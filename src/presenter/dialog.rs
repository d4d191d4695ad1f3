use super::Presenter;
use crate::catalog::DialogProperties;
use anyhow::Context;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

/// Runs `<binary> --jsonstring <payload>` and waits for it to exit.
#[derive(Debug, Clone)]
pub struct DialogPresenter {
    binary: PathBuf,
}

impl DialogPresenter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Presenter for DialogPresenter {
    fn present<'a>(
        &'a self,
        payload: &'a DialogProperties,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<i32>>> + Send + 'a>> {
        Box::pin(async move {
            let json = serde_json::to_string(payload).context("Failed to encode dialog payload")?;
            let status = tokio::process::Command::new(&self.binary)
                .arg("--jsonstring")
                .arg(json)
                .status()
                .await
                .with_context(|| format!("Failed to run {}", self.binary.display()))?;
            tracing::debug!(code = ?status.code(), "Dialog exited");
            Ok(status.code())
        })
    }
}
