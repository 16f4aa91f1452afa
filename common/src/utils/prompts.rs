pub static DESCRIPTION_REWRITE_PROMPT: &str = "Rewrite the following Jira issue description to be clear, concise, and professional. Preserve technical details like error codes, logs, stack traces, and commands exactly as they are.";

pub static DOCUMENTATION_ANSWER_PROMPT: &str = r#"You are provided with excerpts from the project documentation below. Each line starts with the title of the page it was taken from.

Your task is:
1. Find the excerpts that are relevant to the question.
2. Answer using ONLY that content. Do not invent any facts.
3. Provide a clear, complete, plain text answer without markdown or bold unless present in the source."#;

pub fn description_rewrite_prompt(raw_text: &str) -> String {
    format!("{DESCRIPTION_REWRITE_PROMPT}\n\nDescription:\n{raw_text}")
}

pub fn documentation_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "The user asked: \"{question}\"\n\n{DOCUMENTATION_ANSWER_PROMPT}\n\nDocumentation excerpts:\n{context}\n"
    )
}
