//! Prompt templates for node summaries and document descriptions.

/// Collection of prompts used while building a document tree.
pub struct Prompts;

impl Prompts {
    /// Prompt asking for a one-paragraph description of a section.
    ///
    /// `{text}` is replaced by the section's owned text.
    pub fn node_summary() -> &'static str {
        r#"You are given a part of a document, your task is to generate a description of the partial document about what are main points covered in the partial document.

Partial Document Text: {text}

Directly return the description as a single paragraph, do not include any other texts."#
    }

    /// Prompt asking for a one-sentence description of a whole document.
    ///
    /// `{structure}` is replaced by the JSON-serialized node projection.
    pub fn doc_description() -> &'static str {
        r#"You are an expert in generating descriptions for a document.
You are given a structure of a document. Your task is to generate a one-sentence description for the document, which makes it easy to distinguish the document from other documents.

Document Structure: {structure}

Directly return the description, do not include any other texts."#
    }

    /// Fill the node summary template.
    pub fn render_node_summary(text: &str) -> String {
        Self::node_summary().replace("{text}", text)
    }

    /// Fill the document description template.
    pub fn render_doc_description(structure_json: &str) -> String {
        Self::doc_description().replace("{structure}", structure_json)
    }
}
