use serde::{Deserialize, Serialize};

/// Page text of a template: one paragraph per page, or one paragraph reused
/// on every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoryContent {
    Pages(Vec<String>),
    Single(String),
}

impl StoryContent {
    /// Text for `page_index`, falling back to the first paragraph when the
    /// template has fewer paragraphs than pages.
    pub fn page_text(&self, page_index: usize) -> &str {
        match self {
            StoryContent::Single(text) => text,
            StoryContent::Pages(pages) => pages
                .get(page_index)
                .or_else(|| pages.first())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTemplate {
    pub title: String,
    pub content: StoryContent,
    #[serde(alias = "pages")]
    pub page_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Boy,
    Girl,
}

/// Body of `POST /api/create-pdf`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub child_name: String,
    pub child_age: i64,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub photos: Vec<String>,
}
