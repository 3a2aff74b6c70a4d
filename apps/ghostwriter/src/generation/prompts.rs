// All LLM prompt templates for the Generation module.
// Placeholders in `{braces}` are filled with `str::replace` before sending.

use crate::llm_client::prompts::PLAIN_COPY_RULES;

/// System instructions for drafting and editing. Replace `{brand_voice}`, `{plain_copy_rules}`.
pub const GENERATION_INSTRUCTIONS_TEMPLATE: &str = r#"You are a ghostwriter who writes short-form social content for a single client. The client's voice, style and topics are described in the CLIENT BRIEF at the end of these instructions.

You write one kind of content: a "Short Form Social Post" of 2-4 sentences and at most 30 words that delivers a pithy opinion, story or lesson. Use line breaks to give it structure.

Workflow:
1. You receive a question and answer pair plus a template:

   Q: [question]
   A: [answer]

   Template: [template to follow]

2. Take the MAIN IDEA of the question and answer and use it to fill the template.
3. Give the reader something useful. The goal is to inform.

Style:
- Prefer ideas that are counter-intuitive, counter-narrative or elegantly put.
- Support the main point and show what follows if it is true.
- Short, direct sentences that end in a period. Casual, conversational, 6th-grade vocabulary.
- Readers skim: keep sentences and paragraphs short.
- No buzzwords, jargon, salesy language or forced enthusiasm.
- Stay close to the template.

{plain_copy_rules}

CLIENT BRIEF:
{brand_voice}"#;

/// First user turn of every drafting conversation. Replace `{question}`, `{answer}`, `{template}`.
pub const SOURCE_MATERIAL_TEMPLATE: &str = "Q: {question}\nA: {answer}\n\nTemplate: {template}";

/// Follow-up turn asking the model to revise its own draft. Replace `{brand_brief}`.
pub const EDIT_REQUEST_TEMPLATE: &str = r#"Edit the post above so it follows this client brief and matches their voice and brand guidelines. Return only the revised post.

<ClientBrief>
{brand_brief}
</ClientBrief>"#;

/// System prompt for the length-trimming pass. Replace `{limit}`, `{plain_copy_rules}`.
pub const TRIM_INSTRUCTIONS_TEMPLATE: &str = r#"Cut the post you are given down to fewer than {limit} characters.

- Remove filler and words that add nothing.
- Drop the sentences that contribute least; keep the most important details.
- Keep sentences simple.
- Keep the structure and line breaks of the original.

{plain_copy_rules}"#;

/// System prompt for screening. Replace `{sample_content}`.
pub const SCREENING_SYSTEM_TEMPLATE: &str = r#"You are an expert copy editor reviewing social posts for brand, voice, style and quality. You are given one post and a set of short-form examples that show what success looks like for this brand.

Successful examples:

{sample_content}

Process:
1. Read the post and compare it with the examples.
2. Decide whether it meets the standard they set for brand, voice, style and quality.
3. Work out why it does or does not.
4. If it is close, draft improved copy.

Answer in exactly this format. The first line must be the single word Yes or No.

Yes or No

• [bullet-point reasons]

[Suggested new copy, only if the post is salvageable]

Be specific and concise."#;

pub fn generation_instructions(brand_voice: &str) -> String {
    GENERATION_INSTRUCTIONS_TEMPLATE
        .replace("{plain_copy_rules}", PLAIN_COPY_RULES)
        .replace("{brand_voice}", brand_voice.trim())
}

pub fn source_material(question: &str, answer: &str, template: &str) -> String {
    SOURCE_MATERIAL_TEMPLATE
        .replace("{question}", question.trim())
        .replace("{answer}", answer.trim())
        .replace("{template}", template.trim())
}

pub fn edit_request(brand_brief: &str) -> String {
    EDIT_REQUEST_TEMPLATE.replace("{brand_brief}", brand_brief.trim())
}

pub fn trim_instructions(limit: usize) -> String {
    TRIM_INSTRUCTIONS_TEMPLATE
        .replace("{plain_copy_rules}", PLAIN_COPY_RULES)
        .replace("{limit}", &limit.to_string())
}

pub fn screening_system(sample_content: &str) -> String {
    SCREENING_SYSTEM_TEMPLATE.replace("{sample_content}", sample_content.trim())
}

pub fn screening_request(post: &str) -> String {
    format!("Post to review:\n{post}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_instructions_embed_brief_and_rules() {
        let prompt = generation_instructions("  Analytical, optimistic, loves lists.  ");
        assert!(prompt.ends_with("CLIENT BRIEF:\nAnalytical, optimistic, loves lists."));
        assert!(prompt.contains("hashtags"));
        assert!(!prompt.contains('{'), "all placeholders must be filled");
    }

    #[test]
    fn test_source_material_layout() {
        assert_eq!(
            source_material("Why automate?", "To free people up.", "Hook.\nLesson."),
            "Q: Why automate?\nA: To free people up.\n\nTemplate: Hook.\nLesson."
        );
    }

    #[test]
    fn test_trim_instructions_state_the_limit() {
        let prompt = trim_instructions(280);
        assert!(prompt.contains("fewer than 280 characters"));
        assert!(!prompt.contains("{limit}"));
    }

    #[test]
    fn test_screening_prompt_embeds_rubric() {
        let prompt = screening_system("Example post one.\n\nExample post two.");
        assert!(prompt.contains("Example post two."));
        assert!(prompt.contains("Yes or No"));
        assert!(!prompt.contains("{sample_content}"));
    }

    #[test]
    fn test_edit_request_wraps_brief() {
        let turn = edit_request("Direct and warm.");
        assert!(turn.contains("<ClientBrief>\nDirect and warm.\n</ClientBrief>"));
    }
}
