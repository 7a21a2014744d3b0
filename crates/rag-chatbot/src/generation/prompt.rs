//! Prompt templates for grounded answer generation

use crate::providers::ChatMessage;

/// Answer when the context is empty or does not cover the question
pub const NOT_IN_DOCS: &str = "NOT_IN_DOCS";

/// Answer when the question is outside the configured domain
pub const UNRELATED: &str = "UNRELATED";

/// Stand-in for the context block when retrieval found nothing
pub const NO_CONTEXT_MARKER: &str = "No relevant context found.";

/// Prompt builder for grounded queries
///
/// Output depends only on the arguments, so identical inputs always produce
/// identical prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    domain: String,
}

impl PromptBuilder {
    /// Create a builder for assistants answering about `domain`
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Join contexts with blank lines, or the no-context marker
    pub fn build_context(contexts: &[String]) -> String {
        if contexts.is_empty() {
            NO_CONTEXT_MARKER.to_string()
        } else {
            contexts.join("\n\n")
        }
    }

    /// Numbered source list (`1. <source>`), empty when there are no sources
    pub fn format_sources_list(sources: &[String]) -> String {
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| format!("{}. {}", i + 1, source))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// System instruction carrying the content contract
    pub fn build_system_prompt(&self) -> String {
        format!(
            r#"You are an AI assistant answering user questions about {domain}.
Follow these strict rules:

**Content Rules:**
1. Use ONLY the provided context. Never add facts from general knowledge.
2. If the context is empty or insufficient to answer, respond with exactly: "{not_in_docs}".
3. If the question is unrelated to {domain}, respond with exactly: "{unrelated}".
4. Do NOT copy-paste raw text; paraphrase in natural, human language.

**Answer Structure:**
- Factual or how-to questions: start with a clear, direct answer, then the supporting details.
- Advice-seeking questions ("should I...", "is it better to..."): give a balanced view that ALWAYS lists both advantages and disadvantages, and for high-stakes financial, legal or tax decisions recommend consulting a qualified professional.
- End with actionable next steps when they apply.
- If the answer draws on the listed sources, name them inline where they are used.

**Formatting Rules:**
- Write mathematical formulas with LaTeX delimiters: $...$ inline and $$...$$ on their own line.
- Use **bold** for key terms and *italics* for emphasis.
- Keep markdown dense: no blank lines inside lists, no stray empty lines between paragraphs and lists.
- Do not turn every sentence into its own bullet; group related points into short paragraphs or multi-sentence bullets.
- Keep responses concise but comprehensive."#,
            domain = self.domain,
            not_in_docs = NOT_IN_DOCS,
            unrelated = UNRELATED,
        )
    }

    /// User message: context, optional sources, question, task instructions
    pub fn build_user_prompt(&self, query: &str, contexts: &[String], sources: &[String]) -> String {
        let mut prompt = String::new();

        prompt.push_str("Context:\n");
        prompt.push_str(&Self::build_context(contexts));
        prompt.push_str("\n\n");

        if !sources.is_empty() {
            prompt.push_str("Available sources:\n");
            prompt.push_str(&Self::format_sources_list(sources));
            prompt.push_str("\n\n");
        }

        prompt.push_str("Question:\n");
        prompt.push_str(query);
        prompt.push_str("\n\n");

        prompt.push_str(&format!(
            r#"Instructions:
- Answer using ONLY the context above.
- If the context does not contain the answer, reply with exactly "{not_in_docs}".
- If the question is not about {domain}, reply with exactly "{unrelated}".
- Paraphrase instead of quoting the context.
- For advice questions, cover both advantages and disadvantages and recommend professional advice for high-stakes decisions.
- Use $...$ or $$...$$ for formulas, keep markdown compact, and finish with next steps when useful."#,
            not_in_docs = NOT_IN_DOCS,
            unrelated = UNRELATED,
            domain = self.domain,
        ));

        prompt
    }

    /// Full two-message prompt
    pub fn build_messages(
        &self,
        query: &str,
        contexts: &[String],
        sources: &[String],
    ) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.build_system_prompt()),
            ChatMessage::user(self.build_user_prompt(query, contexts, sources)),
        ]
    }
}
