use crate::model::AnalysisResult;
use std::path::PathBuf;

/// Synchronous rejection when the advisor triggers a run without documents.
pub const VALIDATION_MESSAGE: &str = "Action requise : Veuillez sélectionner au moins un document fiscal (avis d'imposition ou déclaration) pour lancer l'audit.";

/// Single user-facing message for every analysis failure; the structured
/// detail only goes to the operator log.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Une erreur est survenue lors de l'analyse. Veuillez vérifier vos documents et réessayer.";

/// A document the advisor selected for the next run. The raw bytes are only
/// read at encode time; nothing is cached between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

/// The four-way union makes illegal combinations (loading and error at once)
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Loading,
    Success(AnalysisResult),
    Error(String),
}

/// Snapshot handed to the analysis service when a run is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    pub files: Vec<SelectedFile>,
    pub user_context: String,
}

/// The only mutable shared state in the application: the state machine plus
/// the pending file list and the free-text client context. Mutated on the UI
/// thread only; background work reports back through events.
#[derive(Debug, Default)]
pub struct Workflow {
    state: WorkflowState,
    files: Vec<SelectedFile>,
    user_context: String,
}

impl Workflow {
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn user_context_mut(&mut self) -> &mut String {
        &mut self.user_context
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, WorkflowState::Loading)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            WorkflowState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Selecting a new document dismisses a standing error, mirroring the
    /// validation flow: fix the selection, the message goes away.
    pub fn add_file(&mut self, path: PathBuf) {
        if matches!(self.state, WorkflowState::Error(_)) {
            self.state = WorkflowState::Idle;
        }
        self.files.push(SelectedFile::from_path(path));
    }

    pub fn remove_file(&mut self, index: usize) {
        if index < self.files.len() {
            self.files.remove(index);
        }
    }

    /// Guarded trigger. Returns the run snapshot when the transition to
    /// Loading is taken; `None` either while a run is already in flight or
    /// when the selection is empty (which sets the validation message without
    /// leaving the pre-run states).
    pub fn begin_run(&mut self) -> Option<RunInput> {
        if self.is_loading() {
            return None;
        }
        if self.files.is_empty() {
            self.state = WorkflowState::Error(VALIDATION_MESSAGE.to_string());
            return None;
        }

        self.state = WorkflowState::Loading;
        Some(RunInput {
            files: self.files.clone(),
            user_context: self.user_context.trim().to_string(),
        })
    }

    /// Success transition; ignored unless a run is in flight so a stale event
    /// cannot overwrite a reset.
    pub fn complete(&mut self, result: AnalysisResult) {
        if self.is_loading() {
            self.state = WorkflowState::Success(result);
        }
    }

    /// Failure transition. The pending files stay selected so the advisor can
    /// retry without re-uploading.
    pub fn fail(&mut self) {
        if self.is_loading() {
            self.state = WorkflowState::Error(ANALYSIS_FAILED_MESSAGE.to_string());
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisResult, TaxData};

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            extracted_data: TaxData {
                full_name: "Jean Dupont".to_string(),
                year: Some(2023),
                household_parts: Some(2.0),
                taxable_income: 45_000.0,
                tmi: 30.0,
                total_tax_paid: Some(6_000.0),
                per_ceiling_available: Some(3_000.0),
                real_estate_income: Vec::new(),
                financial_income: None,
            },
            optimizations: Vec::new(),
            summary: "ok".to_string(),
        }
    }

    fn workflow_with_file() -> Workflow {
        let mut workflow = Workflow::default();
        workflow.add_file("avis-2023.png".into());
        workflow
    }

    #[test]
    fn begin_run_without_files_sets_validation_message_and_never_loads() {
        let mut workflow = Workflow::default();
        assert!(workflow.begin_run().is_none());
        assert!(!workflow.is_loading());
        assert_eq!(workflow.error_message(), Some(VALIDATION_MESSAGE));
    }

    #[test]
    fn begin_run_transitions_to_loading_with_a_snapshot() {
        let mut workflow = workflow_with_file();
        workflow.user_context_mut().push_str("  Projet immobilier  ");

        let input = workflow.begin_run().expect("run should start");
        assert!(workflow.is_loading());
        assert_eq!(input.files.len(), 1);
        assert_eq!(input.files[0].name, "avis-2023.png");
        assert_eq!(input.user_context, "Projet immobilier");
    }

    #[test]
    fn at_most_one_run_in_flight() {
        let mut workflow = workflow_with_file();
        assert!(workflow.begin_run().is_some());
        assert!(workflow.begin_run().is_none());
        assert!(workflow.is_loading());
    }

    #[test]
    fn entering_loading_clears_a_previous_error() {
        let mut workflow = Workflow::default();
        assert!(workflow.begin_run().is_none());
        assert!(workflow.error_message().is_some());

        workflow.add_file("avis-2023.png".into());
        assert!(workflow.begin_run().is_some());
        assert!(workflow.error_message().is_none());
    }

    #[test]
    fn adding_a_file_dismisses_the_validation_message() {
        let mut workflow = Workflow::default();
        assert!(workflow.begin_run().is_none());
        workflow.add_file("avis-2023.png".into());
        assert_eq!(*workflow.state(), WorkflowState::Idle);
    }

    #[test]
    fn failure_keeps_pending_files_for_retry() {
        let mut workflow = workflow_with_file();
        workflow.begin_run().expect("run should start");
        workflow.fail();

        assert_eq!(workflow.error_message(), Some(ANALYSIS_FAILED_MESSAGE));
        assert_eq!(workflow.files().len(), 1);

        // Retry without re-selecting anything.
        assert!(workflow.begin_run().is_some());
    }

    #[test]
    fn completion_stores_the_result() {
        let mut workflow = workflow_with_file();
        workflow.begin_run().expect("run should start");
        workflow.complete(sample_result());

        let result = workflow.result().expect("result should be stored");
        assert_eq!(result.extracted_data.tmi, 30.0);
        assert!(result.optimizations.is_empty());
    }

    #[test]
    fn stale_events_outside_loading_are_ignored() {
        let mut workflow = workflow_with_file();
        workflow.complete(sample_result());
        assert_eq!(*workflow.state(), WorkflowState::Idle);

        workflow.fail();
        assert_eq!(*workflow.state(), WorkflowState::Idle);
    }

    #[test]
    fn reset_returns_to_idle_from_any_state_and_is_idempotent() {
        let mut workflow = workflow_with_file();
        workflow.user_context_mut().push_str("contexte");
        workflow.begin_run().expect("run should start");
        workflow.complete(sample_result());

        for _ in 0..2 {
            workflow.reset();
            assert_eq!(*workflow.state(), WorkflowState::Idle);
            assert!(workflow.files().is_empty());
            assert!(workflow.user_context_mut().is_empty());
            assert!(workflow.result().is_none());
            assert!(workflow.error_message().is_none());
        }

        let mut failed = workflow_with_file();
        failed.begin_run().expect("run should start");
        failed.fail();
        failed.reset();
        assert_eq!(*failed.state(), WorkflowState::Idle);
        assert!(failed.files().is_empty());
    }
}
