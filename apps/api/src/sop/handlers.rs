//! Axum route handlers for the SOP API.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::sop::composer::ComposedPrompt;
use crate::sop::export::{content_disposition, download_filename, letter_page};
use crate::sop::profile::ApplicantProfile;
use crate::sop::session::{GenerationResult, StoredResult};
use crate::sop::workflow::{Workflow, WorkflowState};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Parsed multipart form.
#[derive(Debug, Default)]
pub struct SopForm {
    pub profile: ApplicantProfile,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub prompt: ComposedPrompt,
    pub warnings: Vec<String>,
    pub cv_included: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub session_id: Uuid,
    pub state: WorkflowState,
    pub transitions: Vec<WorkflowState>,
    pub warnings: Vec<String>,
    pub letter: Option<String>,
    pub error: Option<String>,
    pub download_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub last_result: Option<StoredResult>,
    pub download_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Form parsing
// ────────────────────────────────────────────────────────────────────────────

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "on" | "1"
    )
}

fn is_pdf_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_name = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    let by_type = content_type
        .map(|t| t.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    by_name || by_type
}

/// Reads every known field of the SOP form. Unknown fields are drained and ignored.
pub async fn read_form(multipart: &mut Multipart, max_upload_bytes: usize) -> Result<SopForm, AppError> {
    let mut form = SopForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if name == "cv" {
            let is_pdf = is_pdf_upload(field.file_name(), field.content_type());
            let data: Bytes = field.bytes().await?;
            if data.is_empty() {
                continue;
            }
            if !is_pdf {
                return Err(AppError::Validation(
                    "Only PDF files are accepted for the CV upload".to_string(),
                ));
            }
            if data.len() > max_upload_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "CV upload exceeds the {max_upload_bytes} byte limit"
                )));
            }
            form.profile.cv_pdf = Some(data);
            continue;
        }

        let value = field.text().await?;
        let profile = &mut form.profile;
        match name.as_str() {
            "program" => profile.target_program = value,
            "university" => profile.target_university = value,
            "interests" => profile.academic_interests = value,
            "experience" => profile.job_experience = value,
            "has_publications" => profile.has_publications = parse_flag(&value),
            "publication_details" => profile.publication_details = value,
            "skills" => profile.key_skills = value,
            "goals" => profile.future_goals = value,
            "rationale" => profile.program_rationale = value,
            "session_id" if !value.trim().is_empty() => {
                let id = Uuid::parse_str(value.trim()).map_err(|_| {
                    AppError::Validation("session_id must be a UUID".to_string())
                })?;
                form.session_id = Some(id);
            }
            _ => {}
        }
    }

    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
///
/// The input form.
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /api/v1/sop/preview
///
/// Validates, extracts and composes, then returns the prompt without calling the model.
pub async fn handle_preview(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PreviewResponse>, AppError> {
    let form = read_form(&mut multipart, state.config.max_upload_bytes).await?;

    let mut workflow = Workflow::new(state.generator.as_ref());
    let prepared = workflow
        .prepare(&form.profile)
        .await
        .map_err(|errors| AppError::Validation(errors.join(" ")))?;
    debug!("Preview stopped in {:?} without calling the model", workflow.state());

    Ok(Json(PreviewResponse {
        prompt: prepared.prompt,
        warnings: prepared.warnings,
        cv_included: prepared.cv_included,
    }))
}

/// POST /api/v1/sop/generate
///
/// Runs the full workflow for the session named in the form (or a new one).
/// Returns 200 with the letter, or 502 with the generation diagnostic.
pub async fn handle_generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let form = read_form(&mut multipart, state.config.max_upload_bytes).await?;
    let session_id = form.session_id.unwrap_or_else(Uuid::new_v4);

    let run = Workflow::new(state.generator.as_ref())
        .run(&form.profile, &state.sessions, session_id)
        .await;

    let Some(result) = run.result else {
        return Err(AppError::Validation(run.validation_errors.join(" ")));
    };

    let (status, letter, error) = match result {
        GenerationResult::Success { letter } => (StatusCode::OK, Some(letter), None),
        GenerationResult::Failure { reason } => (StatusCode::BAD_GATEWAY, None, Some(reason)),
    };
    info!("Session {session_id} finished in {:?}", run.state);

    Ok((
        status,
        Json(GenerateResponse {
            session_id,
            state: run.state,
            transitions: run.transitions,
            warnings: run.warnings,
            download_name: letter
                .as_ref()
                .map(|_| download_filename(&form.profile.target_program)),
            letter,
            error,
        }),
    ))
}

/// GET /api/v1/sop/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let download_name = session
        .last_result
        .as_ref()
        .filter(|stored| stored.result.letter().is_some())
        .map(|stored| download_filename(&stored.target_program));

    Ok(Json(SessionResponse {
        session_id,
        last_result: session.last_result,
        download_name,
    }))
}

/// Loads the session's last successful letter, or explains why there is none.
async fn last_letter(state: &AppState, session_id: Uuid) -> Result<(String, String), AppError> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    match session.last_result {
        Some(StoredResult {
            result: GenerationResult::Success { letter },
            target_program,
            ..
        }) => Ok((letter, target_program)),
        Some(StoredResult {
            result: GenerationResult::Failure { reason },
            ..
        }) => Err(AppError::Generation(reason)),
        None => Err(AppError::NotFound(format!(
            "Session {session_id} has no generated letter yet"
        ))),
    }
}

/// GET /api/v1/sop/:session_id/view
///
/// The letter as HTML with line breaks preserved.
pub async fn handle_view(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let (letter, program) = last_letter(&state, session_id).await?;
    Ok(Html(letter_page(&program, &letter)))
}

/// GET /api/v1/sop/:session_id/download
///
/// The letter as a plain-text attachment, byte-identical to the generated text.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (letter, program) = last_letter(&state, session_id).await?;
    let disposition = content_disposition(&download_filename(&program));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        letter,
    )
        .into_response())
}

/// DELETE /api/v1/sop/:session_id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {session_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_variants() {
        for yes in ["yes", "Yes", "true", "on", "1", " YES "] {
            assert!(parse_flag(yes), "{yes}");
        }
        for no in ["no", "", "false", "0", "maybe"] {
            assert!(!parse_flag(no), "{no}");
        }
    }

    #[test]
    fn test_pdf_detection_by_name_or_type() {
        assert!(is_pdf_upload(Some("cv.PDF"), None));
        assert!(is_pdf_upload(Some("cv"), Some("application/pdf")));
        assert!(!is_pdf_upload(Some("cv.docx"), Some("application/msword")));
        assert!(!is_pdf_upload(None, None));
    }
}
