// file: src/utils/template.rs
// description: prompt templates for the model-driven stages
// reference: Internal code standards

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub const DECOMPOSE: &'static str =
        "Break down the following query into structured parameters: {input}";
    pub const SEARCH: &'static str = "Generate search queries for: {input}";
    pub const EXTRACT: &'static str = "Extract relevant information from: {input}";
    pub const SUMMARIZE: &'static str = "Summarize the following data: {input}";

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, input: &str) -> String {
        self.template.replace("{input}", input)
    }
}
