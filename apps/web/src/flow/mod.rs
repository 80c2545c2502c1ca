// Session Flow Controller: upload → job description → chat.
// Each step is derived from what the session holds; handlers redirect back to
// the earliest incomplete step instead of trusting the URL.

pub mod handlers;
pub mod upload;

use axum::response::Redirect;

use crate::errors::AppError;
use crate::session::SessionData;

pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

pub const JOB_TOO_SHORT_MESSAGE: &str =
    "Please enter a detailed job description (at least 50 characters).";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body.";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully.";

/// Answer returned whenever the LLM call fails.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I encountered an error while processing your question. Please try again.";

/// Where a session stands in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Start,
    AwaitingJob,
    Chatting,
}

impl Step {
    pub fn of(data: &SessionData) -> Self {
        match (&data.resume_text, &data.job_text) {
            (Some(_), Some(_)) => Step::Chatting,
            (Some(_), None) => Step::AwaitingJob,
            (None, _) => Step::Start,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Step::Start => "/",
            Step::AwaitingJob => "/job",
            Step::Chatting => "/chat",
        }
    }
}

/// Ok when the session has reached `required`; otherwise the redirect to the step it is on.
pub fn require(data: &SessionData, required: Step) -> Result<(), Redirect> {
    let current = Step::of(data);
    if current < required {
        return Err(Redirect::to(current.path()));
    }
    Ok(())
}

/// Trimmed job description, or the validation error when it is too short.
pub fn validate_job_description(raw: &str) -> Result<String, AppError> {
    let job = raw.trim();
    if job.chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(JOB_TOO_SHORT_MESSAGE.to_string()));
    }
    Ok(job.to_string())
}

pub fn validate_question(raw: &str) -> Result<&str, AppError> {
    let question = raw.trim();
    if question.is_empty() {
        return Err(AppError::Validation(EMPTY_QUESTION_MESSAGE.to_string()));
    }
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(resume: Option<&str>, job: Option<&str>) -> SessionData {
        SessionData {
            resume_text: resume.map(String::from),
            resume_filename: resume.map(|_| "cv.txt".to_string()),
            job_text: job.map(String::from),
        }
    }

    #[test]
    fn test_step_of_session() {
        assert_eq!(Step::of(&data(None, None)), Step::Start);
        assert_eq!(Step::of(&data(Some("cv"), None)), Step::AwaitingJob);
        assert_eq!(Step::of(&data(Some("cv"), Some("job"))), Step::Chatting);
        // A job without a resume never counts as progress.
        assert_eq!(Step::of(&data(None, Some("job"))), Step::Start);
    }

    #[test]
    fn test_require_redirects_to_current_step() {
        assert!(require(&data(Some("cv"), None), Step::AwaitingJob).is_ok());
        assert!(require(&data(Some("cv"), Some("job")), Step::AwaitingJob).is_ok());
        assert!(require(&data(None, None), Step::AwaitingJob).is_err());
        assert!(require(&data(Some("cv"), None), Step::Chatting).is_err());
        assert!(require(&data(None, None), Step::Start).is_ok());
    }

    #[test]
    fn test_job_description_length_is_measured_after_trim() {
        let padded = format!("   {}   ", "x".repeat(49));
        assert!(matches!(
            validate_job_description(&padded),
            Err(AppError::Validation(msg)) if msg == JOB_TOO_SHORT_MESSAGE
        ));

        let exact = format!("\n{}\n", "x".repeat(50));
        assert_eq!(validate_job_description(&exact).unwrap(), "x".repeat(50));
    }

    #[test]
    fn test_job_description_counts_characters_not_bytes() {
        // 25 two-byte characters: 50 bytes but only 25 characters.
        assert!(validate_job_description(&"é".repeat(25)).is_err());
        assert!(validate_job_description(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn test_question_must_not_be_blank() {
        assert!(validate_question(" \n\t ").is_err());
        assert_eq!(validate_question("  Am I a good fit? ").unwrap(), "Am I a good fit?");
    }
}
