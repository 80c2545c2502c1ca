// Prompt Builder for the chat step.
// Inserted text is not escaped; the chat page renders the answer as HTML.

/// Opening instruction for every question.
pub const ASSISTANT_PREAMBLE: &str = "You are a helpful assistant that analyzes a job description \
    and my CV. Keep answers short and easy to read.";

/// Restricts the answer to the HTML subset the chat page renders.
pub const HTML_FORMAT_INSTRUCTION: &str = "Format the response using HTML with <strong>, <br>, \
    and paragraphs where needed. Use <ul> and <li> for lists.\n\
    Only return the final response text.";

/// Builds the single user message sent to the model.
pub fn build_prompt(resume_text: &str, job_text: &str, question: &str) -> String {
    format!(
        "{ASSISTANT_PREAMBLE}\n\n\
         Job Description:\n{job_text}\n\n\
         CV:\n{resume_text}\n\n\
         Question: {question}\n\n\
         {HTML_FORMAT_INSTRUCTION}"
    )
}
