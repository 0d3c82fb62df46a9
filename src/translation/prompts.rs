/*!
 * Prompt and output-schema construction for section translation.
 */

use serde_json::{json, Value};

use crate::catalog::ContentBlock;

/// Name under which the output schema is registered with providers
pub const OUTPUT_SCHEMA_NAME: &str = "section_translation";

/// Build the instruction sent for one section
pub fn build_translation_prompt(
    page_name: &str,
    section_context: &str,
    language_name: &str,
    content: &ContentBlock,
) -> String {
    format!(
        "You are translating the \"{section}\" section of the \"{page}\" page of a website \
about Thai visas and immigration.\n\
Translate every text value of the JSON below into {language}.\n\
Rules:\n\
- Keep every key exactly as it is; translate values only.\n\
- Keep arrays the same length and in the same order.\n\
- Do not translate visa names, form numbers, currency amounts or URLs.\n\
- Use a clear, professional tone suitable for official guidance.\n\
Return the result as {{\"translated_content\": <object>}} with the same structure.\n\n\
Content:\n{content}",
        section = section_context,
        page = page_name,
        language = language_name,
        content = content.to_json_string(),
    )
}

/// Fixed JSON schema every answer must satisfy
pub fn translation_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "translated_content": {
                "type": "object",
                "description": "The translated content, mirroring the keys of the input"
            }
        },
        "required": ["translated_content"]
    })
}
