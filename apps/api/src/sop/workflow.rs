//! Workflow Controller: one run per "Generate" trigger.
//!
//! Flow: Idle → Validating → Extracting (only with a CV) → Composing → Generating →
//!       Done | Failed.
//!
//! Validation errors stop the run before anything external happens and leave the session
//! untouched. CV extraction problems become warnings. A generation failure ends the run in
//! `Failed` and is stored in the session in place of any earlier letter.

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::llm_client::TextGenerator;
use crate::sop::composer::{compose_prompt, ComposedPrompt};
use crate::sop::extractor::extract_text_blocking;
use crate::sop::profile::{validate_profile, ApplicantProfile};
use crate::sop::session::{GenerationResult, SessionStore};

pub const CV_UNREADABLE_WARNING: &str =
    "Could not process the uploaded CV. Continuing without it; try another file if you want it included.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Validating,
    Extracting,
    Composing,
    Generating,
    Done,
    Failed,
}

/// The prompt plus everything the user should be told about how it was built.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedPrompt {
    pub prompt: ComposedPrompt,
    pub warnings: Vec<String>,
    pub cv_included: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRun {
    pub state: WorkflowState,
    pub transitions: Vec<WorkflowState>,
    pub warnings: Vec<String>,
    /// Set when validation blocked the run.
    pub validation_errors: Vec<String>,
    /// Set once the generation step has been reached.
    pub result: Option<GenerationResult>,
}

pub struct Workflow<'a> {
    generator: &'a dyn TextGenerator,
    state: WorkflowState,
    transitions: Vec<WorkflowState>,
    warnings: Vec<String>,
}

impl<'a> Workflow<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self {
            generator,
            state: WorkflowState::Idle,
            transitions: vec![WorkflowState::Idle],
            warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    fn advance(&mut self, next: WorkflowState) {
        debug!("Workflow transition {:?} -> {:?}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    /// Runs validation, optional extraction and composition. On validation failure the
    /// workflow is left in `Failed` and the user-facing errors are returned.
    pub async fn prepare(&mut self, profile: &ApplicantProfile) -> Result<PreparedPrompt, Vec<String>> {
        self.advance(WorkflowState::Validating);
        let validation = validate_profile(profile);
        if !validation.passed {
            warn!("Validation blocked generation: {:?}", validation.errors);
            self.advance(WorkflowState::Failed);
            return Err(validation.errors);
        }
        for warning in &validation.warnings {
            warn!("Thin applicant profile: {warning}");
        }
        self.warnings.extend(validation.warnings);

        let mut cv_text = String::new();
        if profile.has_cv() {
            self.advance(WorkflowState::Extracting);
            match extract_text_blocking(profile.cv_pdf.clone()).await {
                Ok(text) => cv_text = text,
                Err(e) => {
                    warn!("CV extraction failed, continuing without it: {e}");
                    self.warnings.push(format!("{CV_UNREADABLE_WARNING} ({e})"));
                }
            }
        }

        self.advance(WorkflowState::Composing);
        let cv_included = !cv_text.trim().is_empty();
        let prompt = compose_prompt(profile, cv_included.then_some(cv_text.as_str()));

        Ok(PreparedPrompt {
            prompt,
            warnings: self.warnings.clone(),
            cv_included,
        })
    }

    /// Full pipeline. Stores the generation outcome in `session_id`'s context.
    pub async fn run(
        mut self,
        profile: &ApplicantProfile,
        sessions: &SessionStore,
        session_id: Uuid,
    ) -> WorkflowRun {
        let prepared = match self.prepare(profile).await {
            Ok(prepared) => prepared,
            Err(errors) => return self.finish(errors, None),
        };

        self.advance(WorkflowState::Generating);
        info!(
            "Generating SOP for '{}' at '{}' (session {session_id})",
            profile.target_program, profile.target_university
        );
        let result = match self.generator.generate(prepared.prompt.as_str()).await {
            Ok(letter) => {
                self.advance(WorkflowState::Done);
                GenerationResult::Success { letter }
            }
            Err(e) => {
                error!("SOP generation failed: {e}");
                self.advance(WorkflowState::Failed);
                GenerationResult::Failure {
                    reason: e.to_string(),
                }
            }
        };

        sessions
            .record(session_id, result.clone(), &profile.target_program)
            .await;

        self.finish(Vec::new(), Some(result))
    }

    fn finish(self, validation_errors: Vec<String>, result: Option<GenerationResult>) -> WorkflowRun {
        WorkflowRun {
            state: self.state,
            transitions: self.transitions,
            warnings: self.warnings,
            validation_errors,
            result,
        }
    }
}


#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::test_support::RecordingGenerator;
    use super::*;
    use crate::sop::extractor::fixtures::pdf_with_pages;
    use crate::sop::prompts::{CV_HEADER, INSTRUCTIONS};
    use super::WorkflowState::*;

    fn profile() -> ApplicantProfile {
        ApplicantProfile {
            target_program: "M.Sc. Data Science".to_string(),
            target_university: "Example University".to_string(),
            academic_interests: "Machine Learning".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_happy_path_calls_generator_once_and_stores_letter() {
        let generator = RecordingGenerator::replying("Dear Committee");
        let sessions = SessionStore::new();
        let id = Uuid::new_v4();

        let run = Workflow::new(&generator).run(&profile(), &sessions, id).await;

        assert_eq!(run.state, Done);
        assert_eq!(run.transitions, vec![Idle, Validating, Composing, Generating, Done]);
        assert_eq!(generator.calls(), 1);

        let prompt = generator.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("Paper Publications: None mentioned."));
        assert!(prompt.ends_with(&INSTRUCTIONS.join("\n")));

        let stored = sessions.get(id).await.unwrap().last_result.unwrap();
        assert_eq!(stored.result.letter(), Some("Dear Committee"));
        assert_eq!(stored.target_program, "M.Sc. Data Science");
    }

    #[tokio::test]
    async fn test_missing_program_blocks_without_calling_generator() {
        for (program, university) in [("", "X"), ("X", "")] {
            let generator = RecordingGenerator::replying("unused");
            let sessions = SessionStore::new();
            let id = Uuid::new_v4();
            let input = ApplicantProfile {
                target_program: program.to_string(),
                target_university: university.to_string(),
                ..profile()
            };

            let run = Workflow::new(&generator).run(&input, &sessions, id).await;

            assert_eq!(run.state, Failed);
            assert_eq!(run.transitions, vec![Idle, Validating, Failed]);
            assert!(!run.validation_errors.is_empty());
            assert!(run.result.is_none());
            assert_eq!(generator.calls(), 0);
            assert!(sessions.get(id).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_prior_result() {
        let generator = RecordingGenerator::replying("First letter");
        let sessions = SessionStore::new();
        let id = Uuid::new_v4();
        Workflow::new(&generator).run(&profile(), &sessions, id).await;

        let blank = ApplicantProfile::default();
        Workflow::new(&generator).run(&blank, &sessions, id).await;

        let stored = sessions.get(id).await.unwrap().last_result.unwrap();
        assert_eq!(stored.result.letter(), Some("First letter"));
    }

    #[tokio::test]
    async fn test_thin_profile_warns_and_still_generates() {
        let generator = RecordingGenerator::replying("Letter");
        let sessions = SessionStore::new();
        let id = Uuid::new_v4();
        let thin = ApplicantProfile {
            academic_interests: String::new(),
            ..profile()
        };

        let run = Workflow::new(&generator).run(&thin, &sessions, id).await;

        assert_eq!(run.state, Done);
        assert_eq!(run.warnings.len(), 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_cv_is_tolerated() {
        let generator = RecordingGenerator::replying("Letter");
        let sessions = SessionStore::new();
        let id = Uuid::new_v4();
        let with_bad_cv = ApplicantProfile {
            cv_pdf: Some(Bytes::from_static(b"%PDF-1.4 definitely broken")),
            ..profile()
        };

        let run = Workflow::new(&generator).run(&with_bad_cv, &sessions, id).await;

        assert_eq!(run.state, Done);
        assert_eq!(
            run.transitions,
            vec![Idle, Validating, Extracting, Composing, Generating, Done]
        );
        assert!(run.warnings.iter().any(|w| w.starts_with(CV_UNREADABLE_WARNING)));
        let prompt = generator.prompts.lock().unwrap()[0].clone();
        assert!(!prompt.contains(CV_HEADER));
    }

    #[tokio::test]
    async fn test_readable_cv_lands_in_prompt() {
        let generator = RecordingGenerator::replying("Letter");
        let sessions = SessionStore::new();
        let id = Uuid::new_v4();
        let with_cv = ApplicantProfile {
            cv_pdf: Some(Bytes::from(pdf_with_pages(&["Kaggle"]))),
            ..profile()
        };

        let mut workflow = Workflow::new(&generator);
        let prepared = workflow.prepare(&with_cv).await.unwrap();

        assert!(prepared.cv_included);
        assert!(prepared.prompt.as_str().contains(CV_HEADER));
        assert!(prepared.prompt.as_str().contains("Kaggle"));
        assert_eq!(workflow.state(), Composing);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_overwrites_and_keeps_diagnostic() {
        let sessions = SessionStore::new();
        let id = Uuid::new_v4();
        let ok = RecordingGenerator::replying("Old letter");
        Workflow::new(&ok).run(&profile(), &sessions, id).await;

        let failing = RecordingGenerator::failing(429, "Resource has been exhausted");
        let run = Workflow::new(&failing).run(&profile(), &sessions, id).await;

        assert_eq!(run.state, Failed);
        assert_eq!(failing.calls(), 1);
        let expected = GenerationResult::Failure {
            reason: "Generation service error (status 429): Resource has been exhausted".to_string(),
        };
        assert_eq!(run.result.as_ref(), Some(&expected));
        let stored = sessions.get(id).await.unwrap().last_result.unwrap();
        assert_eq!(stored.result, expected);
    }

    #[tokio::test]
    async fn test_rerun_repeats_full_pipeline() {
        let generator = RecordingGenerator::replying("Letter");
        let sessions = SessionStore::new();
        let id = Uuid::new_v4();

        Workflow::new(&generator).run(&profile(), &sessions, id).await;
        let second = Workflow::new(&generator).run(&profile(), &sessions, id).await;

        assert_eq!(generator.calls(), 2);
        assert_eq!(second.transitions.first(), Some(&Idle));
        assert_eq!(second.state, Done);
    }
}
