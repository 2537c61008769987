use crate::model::AnalysisResult;

/// Outcomes reported by background analysis tasks to the UI thread. The
/// failure variant carries the operator-facing detail; the rendered message
/// is always the fixed retry prompt.
#[derive(Debug, Clone)]
pub enum AppEvent {
    AnalysisCompleted(Box<AnalysisResult>),
    AnalysisFailed(String),
}
