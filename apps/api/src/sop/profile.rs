use bytes::Bytes;
use serde::Serialize;

/// Everything the applicant supplies through the form.
///
/// Only `target_program` and `target_university` are required. Text fields are kept
/// exactly as entered; emptiness checks ignore surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct ApplicantProfile {
    pub target_program: String,
    pub target_university: String,
    pub academic_interests: String,
    pub job_experience: String,
    pub has_publications: bool,
    pub publication_details: String,
    pub key_skills: String,
    pub future_goals: String,
    pub program_rationale: String,
    /// Raw bytes of the uploaded PDF résumé, if any.
    pub cv_pdf: Option<Bytes>,
}

impl ApplicantProfile {
    pub fn has_cv(&self) -> bool {
        self.cv_pdf.as_ref().is_some_and(|b| !b.is_empty())
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Outcome of the validation gate. `passed == false` blocks the workflow;
/// warnings never do.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileValidation {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub const MISSING_REQUIRED_MESSAGE: &str =
    "Please provide the Target Program and Target University.";

pub const THIN_PROFILE_WARNING: &str = "Please provide at least some information about your \
    interests, experience, or upload a CV for better results.";

/// Checks the two required fields and flags low-information input.
pub fn validate_profile(profile: &ApplicantProfile) -> ProfileValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if is_blank(&profile.target_program) || is_blank(&profile.target_university) {
        errors.push(MISSING_REQUIRED_MESSAGE.to_string());
    } else if is_blank(&profile.academic_interests)
        && is_blank(&profile.job_experience)
        && !profile.has_cv()
    {
        warnings.push(THIN_PROFILE_WARNING.to_string());
    }

    ProfileValidation {
        passed: errors.is_empty(),
        errors,
        warnings,
    }
}
