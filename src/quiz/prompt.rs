//! Prompt construction for question generation.

use super::{OPTION_COUNT, QUESTION_COUNT};
use crate::llm::Message;

/// Establishes strict-JSON-only behaviour
pub const SYSTEM_PROMPT: &str = "You are an expert exam generator. You always return valid JSON arrays \
when asked. Never include markdown formatting or explanations.";

/// Marker between the instructions and the study material
pub const MATERIAL_HEADER: &str = "\n\nStudy material:\n";

/// Generator instructions, without the material
pub fn instructions() -> String {
    format!(
        r#"You are an exam generator. Create exactly {count} high-quality multiple-choice questions (MCQs) from the provided study material. Return ONLY a valid JSON array with {count} objects, NO commentary or markdown formatting. Each object must have exactly this structure:

{{
  "question": "string",
  "options": [{options}],
  "answer": "string"
}}

Important requirements:
- The "answer" field must exactly match one of the {option_count} options, verbatim
- Questions should cover diverse concepts from the material
- Keep questions clear and objective
- Avoid ambiguous phrasing
- Keep options concise
- Each question should have exactly {option_count} options
- Do not wrap the output in ``` code fences
- Return only the JSON array, no other text"#,
        count = QUESTION_COUNT,
        option_count = OPTION_COUNT,
        options = vec!["\"string\""; OPTION_COUNT].join(", "),
    )
}

/// Build the system + user messages for one generation request
pub fn build_messages(source_text: &str) -> Vec<Message> {
    let mut user = instructions();
    user.push_str(MATERIAL_HEADER);
    user.push_str(source_text);

    vec![Message::system(SYSTEM_PROMPT), Message::user(user)]
}
