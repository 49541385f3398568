//! Prompt templates for the front ends

/// Tone used when the caller does not pick one.
pub const DEFAULT_TONE: &str = "neutral";

/// Level used by the tutor when the caller does not pick one.
pub const DEFAULT_LEVEL: &str = "beginner";

/// Ask for a summary of `text` in the given tone.
pub fn summarize_prompt(text: &str, tone: &str) -> String {
    let tone = non_empty_or(tone, DEFAULT_TONE);
    format!(
        "Summarize the following text in a {tone} tone. \
         Capture the key points and keep the summary concise.\n\n\
         Text:\n{}\n\nSummary:",
        text.trim()
    )
}

pub fn tutor_prompt(topic: &str, level: &str) -> String {
    let level = non_empty_or(level, DEFAULT_LEVEL);
    format!(
        "You are a helpful tutor. Explain {} to a {level} student. Keep it concise.",
        topic.trim()
    )
}

pub fn quiz_prompt(topic: &str) -> String {
    format!(
        "Create a short quiz with 3 questions about {}. Provide the answers at the end.",
        topic.trim()
    )
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() { default } else { value }
}
