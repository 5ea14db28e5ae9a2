//! Career chat — keyword intent detection plus fixed answer templates over the
//! context of a previous analysis (predicted role and missing skills).

pub mod handlers;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    JobRole,
    SkillGap,
    ResumeTips,
    Unknown,
}

/// What the client remembers from its last analysis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

/// First matching rule wins: role, then skills, then resume advice.
pub fn detect_intent(question: &str) -> Intent {
    let q = question.to_lowercase();

    if q.contains("job") || q.contains("role") {
        Intent::JobRole
    } else if q.contains("skill") || q.contains("learn") || q.contains("improve") {
        Intent::SkillGap
    } else if q.contains("resume") {
        Intent::ResumeTips
    } else {
        Intent::Unknown
    }
}

pub fn respond(intent: Intent, context: &ChatContext) -> String {
    match intent {
        Intent::JobRole => match context.job_role.as_deref().map(str::trim) {
            Some(role) if !role.is_empty() => {
                format!("You are best suited for the role of {role}.")
            }
            _ => "Upload your resume first so I can suggest a role that fits you.".to_string(),
        },
        Intent::SkillGap => {
            if context.missing_skills.is_empty() {
                "You currently meet most of the job requirements.".to_string()
            } else {
                format!(
                    "You should focus on learning: {}",
                    context.missing_skills.join(", ")
                )
            }
        }
        Intent::ResumeTips => {
            "Try to include measurable achievements and highlight relevant skills clearly."
                .to_string()
        }
        Intent::Unknown => "I can assist only with resume and career-related queries.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_rules_in_priority_order() {
        assert_eq!(detect_intent("Which JOB suits me?"), Intent::JobRole);
        assert_eq!(detect_intent("what role and skills?"), Intent::JobRole);
        assert_eq!(detect_intent("How do I improve?"), Intent::SkillGap);
        assert_eq!(detect_intent("What should I learn next"), Intent::SkillGap);
        assert_eq!(detect_intent("Is my resume ok?"), Intent::ResumeTips);
        assert_eq!(detect_intent("What's the weather?"), Intent::Unknown);
    }

    #[test]
    fn test_role_answer_uses_context() {
        let ctx = ChatContext {
            job_role: Some("Data Scientist".into()),
            missing_skills: vec![],
        };
        assert_eq!(
            respond(Intent::JobRole, &ctx),
            "You are best suited for the role of Data Scientist."
        );
    }

    #[test]
    fn test_role_answer_without_analysis() {
        let answer = respond(Intent::JobRole, &ChatContext::default());
        assert!(answer.contains("Upload your resume"));
    }

    #[test]
    fn test_skill_gap_lists_missing_skills() {
        let ctx = ChatContext {
            job_role: None,
            missing_skills: vec!["Aws".into(), "Kubernetes".into()],
        };
        assert_eq!(
            respond(Intent::SkillGap, &ctx),
            "You should focus on learning: Aws, Kubernetes"
        );
    }

    #[test]
    fn test_skill_gap_without_missing_skills() {
        assert_eq!(
            respond(Intent::SkillGap, &ChatContext::default()),
            "You currently meet most of the job requirements."
        );
    }

    #[test]
    fn test_unknown_intent_is_scoped() {
        assert!(respond(Intent::Unknown, &ChatContext::default()).contains("career-related"));
    }
}
