//! System instruction and response schema sent with every generation
//!
//! These two values are the behavioral contract with the generation
//! service: what kind of document to produce, and the exact JSON shape to
//! wrap it in.

use serde_json::{json, Value};

/// Instruction sent as the service's system prompt
pub const SYSTEM_INSTRUCTION: &str = r#"
You are an expert AI web developer and UI/UX designer. Your task is to build and iterate on single-file HTML applications based on user prompts.

Rules:
1. Output specific, complete, and functional HTML code.
2. Include all CSS (in <style> tags) and JavaScript (in <script> tags) within the single HTML string.
3. Use modern design principles (flexbox, grid, nice typography, shadows, rounded corners).
4. Do not include external CSS/JS files unless they are CDN links to popular libraries (e.g., FontAwesome, Google Fonts, Tailwind via CDN).
5. If the user asks for changes, you MUST return the FULL updated HTML code, not just the snippets that changed.
6. **CRITICAL:** Output properly formatted HTML with 2-space indentation. Do not minify the code.
7. Your response must be a JSON object with two fields:
   - "message": A short, friendly explanation of what you built or changed (e.g., "I created a calculator with a dark theme.").
   - "html": The complete HTML string.
"#;

/// Structured-output schema: an object with two required string fields
///
/// Expressed in the OpenAPI subset the Gemini API accepts.
///
/// # Examples
///
/// ```
/// use sitewright::prompts::response_schema;
///
/// let schema = response_schema();
/// assert_eq!(schema["required"][0], "message");
/// assert_eq!(schema["required"][1], "html");
/// ```
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "message": {
                "type": "STRING",
                "description": "A short explanation of the changes or the build."
            },
            "html": {
                "type": "STRING",
                "description": "The full HTML code for the application."
            }
        },
        "required": ["message", "html"]
    })
}
