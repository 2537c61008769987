pub mod gemini;
pub mod prompt;

use crate::encode;
use crate::event::AppEvent;
use crate::model::AnalysisResult;
use crate::workflow::SelectedFile;
use async_trait::async_trait;
use futures_util::future;
use self::prompt::AnalysisRequest;
use std::sync::{mpsc, Arc};
use thiserror::Error;
use tokio::runtime::Handle;

/// Coarse failure category for the whole encode/call/parse pipeline. The
/// workflow never branches on variants; the UI shows one fixed retry message
/// while the variant detail goes to the operator log.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {name}: {source}")]
    FileRead {
        name: String,
        source: std::io::Error,
    },
    #[error("analysis request has no documents")]
    EmptyRequest,
    #[error("analysis call failed: {0}")]
    Transport(String),
    #[error("analysis response is not valid JSON: {0}")]
    MalformedResponse(String),
    #[error("analysis response is missing required data: {0}")]
    IncompleteResponse(String),
    #[error("tokio runtime unavailable: {0}")]
    Runtime(String),
}

/// Capability seam over the external generative-AI call so the workflow and
/// its tests can substitute a deterministic stub.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}

/// Drives one analysis run on the tokio runtime and reports the outcome back
/// to the UI thread over the event channel.
#[derive(Clone)]
pub struct AnalysisService {
    analyzer: Arc<dyn Analyzer>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl AnalysisService {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, AnalysisError> {
        let runtime_handle =
            Handle::try_current().map_err(|err| AnalysisError::Runtime(err.to_string()))?;
        Ok(Self {
            analyzer,
            tx,
            runtime_handle,
        })
    }

    /// Fire-and-observe: the run cannot be cancelled once spawned; the
    /// workflow serializes triggers so at most one run is in flight.
    pub fn spawn_run(&self, files: Vec<SelectedFile>, user_context: String) {
        let analyzer = Arc::clone(&self.analyzer);
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            match run_analysis(analyzer.as_ref(), &files, &user_context).await {
                Ok(result) => {
                    tracing::info!(
                        documents = files.len(),
                        optimizations = result.optimizations.len(),
                        "analysis run completed"
                    );
                    let _ = tx.send(AppEvent::AnalysisCompleted(Box::new(result)));
                }
                Err(err) => {
                    tracing::error!("analysis run failed: {err}");
                    let _ = tx.send(AppEvent::AnalysisFailed(err.to_string()));
                }
            }
        });
    }
}

/// Encode every document concurrently (fail fast on the first read error),
/// build the request, then make the single external call. No internal retry;
/// the advisor re-triggers the workflow after an error.
pub async fn run_analysis(
    analyzer: &dyn Analyzer,
    files: &[SelectedFile],
    user_context: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let payloads = future::try_join_all(files.iter().map(encode::encode_file)).await?;
    let request = AnalysisRequest::new(payloads, user_context)?;
    analyzer.analyze(request).await
}
