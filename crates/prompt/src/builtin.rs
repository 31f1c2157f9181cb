//! Built-in prompt definitions.

use crate::types::{PromptDefinition, QUERY_PROMPT_ID, SYSTEM_PROMPT_ID};

/// Static assistant instructions. Kept free of template syntax.
pub const COURSE_INSTRUCTIONS: &str = "You are an assistant for course materials and educational content, with tools for looking up course information.

Tool usage:
- Course outline or structure questions: use get_course_outline to fetch the course title, course link and the full lesson list
- Questions about specific course content: use search_course_content for detailed material
- You may make up to 2 sequential rounds of tool calls
- A good pattern is get_course_outline first to learn the structure, then search_course_content for details
- Build accurate, fact-based answers from tool results
- If the tools return nothing relevant, say so plainly without suggesting alternatives

Outline answers must include:
- Course title
- Course link, when available
- Every lesson with its number and title

Answering:
- Course-specific questions: use a tool first, then answer
- General knowledge questions: answer from your own knowledge without tools
- No meta-commentary: give the answer only, without describing your reasoning, the tools you used or the type of question
- Do not say \"based on the search results\" or \"using the outline tool\"

Every answer must be:
1. Brief and focused
2. Educational
3. Clear, in accessible language
4. Supported by examples when they help understanding
Answer exactly what was asked.";

/// System directive template: instructions, optional history, round marker.
pub fn system_template() -> String {
    format!(
        "{}{{{{#if history}}}}\n\nPrevious conversation:\n{{{{history}}}}{{{{/if}}}}\n\n[Round {{{{round}}}} of {{{{max_rounds}}}}]",
        COURSE_INSTRUCTIONS
    )
}

/// Query frame template.
pub const QUERY_TEMPLATE: &str = "Answer this question about course materials: {{query}}";

/// Look up a built-in definition by id.
pub fn definition(prompt_id: &str) -> Option<PromptDefinition> {
    match prompt_id {
        SYSTEM_PROMPT_ID => Some(PromptDefinition::builtin(
            SYSTEM_PROMPT_ID,
            "Course assistant system directive",
            system_template(),
        )),
        QUERY_PROMPT_ID => Some(PromptDefinition::builtin(
            QUERY_PROMPT_ID,
            "Course question frame",
            QUERY_TEMPLATE.to_string(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_template_shape() {
        let template = system_template();
        assert!(template.starts_with(COURSE_INSTRUCTIONS));
        assert!(template.contains("{{#if history}}"));
        assert!(template.ends_with("[Round {{round}} of {{max_rounds}}]"));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(definition("nope").is_none());
    }
}
