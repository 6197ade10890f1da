//! Prompt Composer. Renders an `ApplicantProfile` (plus optional CV text) into the
//! single prompt sent to the model.
//!
//! Pure and deterministic: no clock, no randomness, no I/O.

use std::fmt;

use serde::Serialize;

use crate::sop::profile::{is_blank, ApplicantProfile};
use crate::sop::prompts::{
    CANDIDATE_HEADER, CV_CHAR_LIMIT, CV_FOOTER, CV_HEADER, INSTRUCTIONS, LABEL_EXPERIENCE,
    LABEL_GOALS, LABEL_INTERESTS, LABEL_PROGRAM, LABEL_PUBLICATIONS, LABEL_RATIONALE,
    LABEL_SKILLS, LABEL_UNIVERSITY, NO_PUBLICATIONS, PREAMBLE,
};

/// The rendered prompt. Built once by [`compose_prompt`], read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns at most the first `CV_CHAR_LIMIT` characters of the CV text.
pub fn truncate_cv_text(cv_text: &str) -> &str {
    match cv_text.char_indices().nth(CV_CHAR_LIMIT) {
        Some((byte_idx, _)) => &cv_text[..byte_idx],
        None => cv_text,
    }
}

/// Builds the prompt.
///
/// Order: preamble, program, university, interests, experience, publications, skills,
/// goals, rationale, CV block, instructions. Optional fields that are blank are left out
/// entirely; the publications line is always present.
pub fn compose_prompt(profile: &ApplicantProfile, cv_text: Option<&str>) -> ComposedPrompt {
    let mut lines: Vec<String> = PREAMBLE.iter().map(|l| l.to_string()).collect();
    lines.push(CANDIDATE_HEADER.to_string());

    lines.push(labeled(LABEL_PROGRAM, &profile.target_program));
    lines.push(labeled(LABEL_UNIVERSITY, &profile.target_university));
    push_optional(&mut lines, LABEL_INTERESTS, &profile.academic_interests);
    push_optional(&mut lines, LABEL_EXPERIENCE, &profile.job_experience);

    let publications = if profile.has_publications && !is_blank(&profile.publication_details) {
        profile.publication_details.as_str()
    } else {
        NO_PUBLICATIONS
    };
    lines.push(labeled(LABEL_PUBLICATIONS, publications));

    push_optional(&mut lines, LABEL_SKILLS, &profile.key_skills);
    push_optional(&mut lines, LABEL_GOALS, &profile.future_goals);
    push_optional(&mut lines, LABEL_RATIONALE, &profile.program_rationale);

    if let Some(cv) = cv_text.filter(|t| !is_blank(t)) {
        lines.push(CV_HEADER.to_string());
        lines.push(truncate_cv_text(cv).to_string());
        lines.push(CV_FOOTER.to_string());
    }

    lines.extend(INSTRUCTIONS.iter().map(|l| l.to_string()));

    ComposedPrompt(lines.join("\n"))
}

fn labeled(label: &str, value: &str) -> String {
    format!("{label}: {value}")
}

fn push_optional(lines: &mut Vec<String>, label: &str, value: &str) {
    if !is_blank(value) {
        lines.push(labeled(label, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ApplicantProfile {
        ApplicantProfile {
            target_program: "M.Sc. Data Science".to_string(),
            target_university: "Example University".to_string(),
            academic_interests: "Machine Learning".to_string(),
            ..Default::default()
        }
    }

    fn full() -> ApplicantProfile {
        ApplicantProfile {
            target_program: "MSc Robotics".to_string(),
            target_university: "Tech Institute".to_string(),
            academic_interests: "Control theory".to_string(),
            job_experience: "Two years at Acme Automation".to_string(),
            has_publications: true,
            publication_details: "Adaptive grasping, ICRA 2023".to_string(),
            key_skills: "C++, ROS".to_string(),
            future_goals: "Lead a field robotics lab".to_string(),
            program_rationale: "The swarm robotics group".to_string(),
            cv_pdf: None,
        }
    }

    fn instruction_block() -> String {
        INSTRUCTIONS.join("\n")
    }

    #[test]
    fn test_composition_is_deterministic() {
        let profile = full();
        let a = compose_prompt(&profile, Some("Worked on things."));
        let b = compose_prompt(&profile, Some("Worked on things."));
        assert_eq!(a, b);
    }

    #[test]
    fn test_end_to_end_minimal_profile() {
        let prompt = compose_prompt(&minimal(), None);
        let text = prompt.as_str();

        assert!(text.contains("Target Program: M.Sc. Data Science\n"));
        assert!(text.contains("Target University: Example University\n"));
        assert!(text.contains("Academic Interests/Subjects: Machine Learning\n"));
        assert!(text.contains("Paper Publications: None mentioned.\n"));

        for absent in [LABEL_EXPERIENCE, LABEL_SKILLS, LABEL_GOALS, LABEL_RATIONALE] {
            assert!(!text.contains(absent), "{absent} should be omitted");
        }
        assert!(!text.contains(CV_HEADER));
        assert!(text.ends_with(&instruction_block()));
    }

    #[test]
    fn test_non_empty_fields_appear_exactly_once() {
        let profile = full();
        let text = compose_prompt(&profile, None).to_string();
        let expected = [
            (LABEL_INTERESTS, &profile.academic_interests),
            (LABEL_EXPERIENCE, &profile.job_experience),
            (LABEL_PUBLICATIONS, &profile.publication_details),
            (LABEL_SKILLS, &profile.key_skills),
            (LABEL_GOALS, &profile.future_goals),
            (LABEL_RATIONALE, &profile.program_rationale),
        ];
        for (label, value) in expected {
            let line = format!("{label}: {value}");
            assert_eq!(text.matches(&line).count(), 1, "{line}");
            assert_eq!(text.matches(label).count(), 1, "{label}");
        }
    }

    #[test]
    fn test_blank_optional_field_label_absent() {
        let profile = ApplicantProfile {
            key_skills: "   \n".to_string(),
            ..full()
        };
        let text = compose_prompt(&profile, None).to_string();
        assert!(!text.contains(LABEL_SKILLS));
    }

    #[test]
    fn test_field_order_is_fixed() {
        let text = compose_prompt(&full(), Some("CV body")).to_string();
        let positions: Vec<usize> = [
            LABEL_PROGRAM,
            LABEL_UNIVERSITY,
            LABEL_INTERESTS,
            LABEL_EXPERIENCE,
            LABEL_PUBLICATIONS,
            LABEL_SKILLS,
            LABEL_GOALS,
            LABEL_RATIONALE,
            CV_HEADER,
            "CV body",
            CV_FOOTER,
            INSTRUCTIONS[0],
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn test_publication_flag_false_ignores_stray_details() {
        let profile = ApplicantProfile {
            has_publications: false,
            publication_details: "Something I typed earlier".to_string(),
            ..full()
        };
        let text = compose_prompt(&profile, None).to_string();
        assert!(text.contains("Paper Publications: None mentioned."));
        assert!(!text.contains("Something I typed earlier"));
    }

    #[test]
    fn test_publication_flag_true_without_details_falls_back() {
        let profile = ApplicantProfile {
            has_publications: true,
            publication_details: String::new(),
            ..full()
        };
        let text = compose_prompt(&profile, None).to_string();
        assert!(text.contains("Paper Publications: None mentioned."));
    }

    #[test]
    fn test_long_cv_truncated_to_limit() {
        let cv = format!("{}{}", "a".repeat(CV_CHAR_LIMIT), "TAIL");
        let text = compose_prompt(&minimal(), Some(&cv)).to_string();
        let block = format!("{CV_HEADER}\n{}\n{CV_FOOTER}", "a".repeat(CV_CHAR_LIMIT));
        assert!(text.contains(&block));
        assert!(!text.contains("TAIL"));
    }

    #[test]
    fn test_short_cv_included_in_full() {
        let text = compose_prompt(&minimal(), Some("Short CV text")).to_string();
        assert!(text.contains(&format!("{CV_HEADER}\nShort CV text\n{CV_FOOTER}")));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let cv = "é".repeat(CV_CHAR_LIMIT + 10);
        let cut = truncate_cv_text(&cv);
        assert_eq!(cut.chars().count(), CV_CHAR_LIMIT);
    }

    #[test]
    fn test_blank_cv_text_adds_no_block() {
        let text = compose_prompt(&minimal(), Some("  \n ")).to_string();
        assert!(!text.contains(CV_HEADER));
    }

    #[test]
    fn test_required_fields_kept_verbatim() {
        let profile = ApplicantProfile {
            target_program: "  AI & Robotics Program!! ".to_string(),
            ..minimal()
        };
        let text = compose_prompt(&profile, None).to_string();
        assert!(text.contains("Target Program:   AI & Robotics Program!! \n"));
    }
}
