//! Page geometry and text placement for storybook pages.
//!
//! Everything here is pure: a page is first turned into a [`PagePlan`] with
//! every string already positioned, and only then written out as PDF.

use crate::models::StoryTemplate;
use crate::services::photo::FittedImage;

/// Placeholder replaced by the child's name in titles and page text.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Average Helvetica advance width, as a fraction of the font size. Only used
/// to centre the footer.
const AVERAGE_GLYPH_EM: f32 = 0.5;

/// Fixed canvas and typography settings, in layout units (PDF points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub image_max_width: f32,
    pub image_max_height: f32,
    pub image_top_margin: f32,
    pub margin_x: f32,
    /// First title baseline, measured down from the bottom of the photo.
    pub title_gap: f32,
    pub title_size: f32,
    pub title_line_height: f32,
    pub title_max_line_length: usize,
    /// First text baseline, measured down from the bottom of the photo.
    pub text_gap: f32,
    pub body_size: f32,
    pub line_height: f32,
    pub max_line_length: usize,
    /// Lines whose baseline would fall below this are dropped.
    pub bottom_margin: f32,
    pub footer_y: f32,
    pub footer_size: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 400.0,
            page_height: 600.0,
            image_max_width: 280.0,
            image_max_height: 180.0,
            image_top_margin: 20.0,
            margin_x: 30.0,
            title_gap: 40.0,
            title_size: 18.0,
            title_line_height: 22.0,
            title_max_line_length: 30,
            text_gap: 60.0,
            body_size: 12.0,
            line_height: 14.0,
            max_line_length: 50,
            bottom_margin: 50.0,
            footer_y: 25.0,
            footer_size: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub image_x: f32,
    pub image_y: f32,
    pub image_width: f32,
    pub image_height: f32,
    pub text_start_y: f32,
    pub line_height: f32,
}

/// A single line of text with its baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub index: usize,
    pub layout: PageLayout,
    pub title: Vec<PlacedText>,
    pub body: Vec<PlacedText>,
    pub footer: PlacedText,
    /// Wrapped lines that did not fit above the bottom margin.
    pub dropped_lines: usize,
}

pub fn substitute_name(text: &str, child_name: &str) -> String {
    text.replace(NAME_PLACEHOLDER, child_name)
}

/// Greedy word wrap by character count. A word longer than the limit gets a
/// line of its own.
pub fn wrap_text(text: &str, max_line_length: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line.is_empty() {
            line.push_str(word);
            line_len = word_len;
        } else if line_len + 1 + word_len > max_line_length {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_len = word_len;
        } else {
            line.push(' ');
            line.push_str(word);
            line_len += 1 + word_len;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Stack lines downwards from `start_y`, stopping at the first line that would
/// sit below `bottom`. Returns the placed lines and how many were dropped.
fn place_lines(
    lines: Vec<String>,
    x: f32,
    start_y: f32,
    line_height: f32,
    bottom: f32,
    size: f32,
) -> (Vec<PlacedText>, usize) {
    let total = lines.len();
    let placed: Vec<PlacedText> = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlacedText {
            text,
            x,
            y: start_y - i as f32 * line_height,
            size,
        })
        .take_while(|line| line.y >= bottom)
        .collect();
    let dropped = total - placed.len();
    (placed, dropped)
}

fn footer(page_index: usize, page_count: usize, geometry: &PageGeometry) -> PlacedText {
    let text = format!("Page {} of {}", page_index + 1, page_count);
    let width = text.chars().count() as f32 * geometry.footer_size * AVERAGE_GLYPH_EM;
    PlacedText {
        x: ((geometry.page_width - width) / 2.0).max(0.0),
        y: geometry.footer_y,
        size: geometry.footer_size,
        text,
    }
}

pub fn plan_page(
    template: &StoryTemplate,
    child_name: &str,
    page_index: usize,
    image: &FittedImage,
    geometry: &PageGeometry,
) -> PagePlan {
    let page_count = template.page_count as usize;
    let image_bottom = image.y;

    let title = if page_index == 0 {
        let lines = wrap_text(
            &substitute_name(&template.title, child_name),
            geometry.title_max_line_length,
        );
        place_lines(
            lines,
            geometry.margin_x,
            image_bottom - geometry.title_gap,
            geometry.title_line_height,
            geometry.bottom_margin,
            geometry.title_size,
        )
        .0
    } else {
        Vec::new()
    };

    // Extra title lines push the text down so it stays below the title.
    let extra_title_lines = title.len().saturating_sub(1) as f32;
    let text_start_y =
        image_bottom - geometry.text_gap - extra_title_lines * geometry.title_line_height;

    let text = substitute_name(template.content.page_text(page_index), child_name);
    let (body, dropped_lines) = place_lines(
        wrap_text(&text, geometry.max_line_length),
        geometry.margin_x,
        text_start_y,
        geometry.line_height,
        geometry.bottom_margin,
        geometry.body_size,
    );

    PagePlan {
        index: page_index,
        layout: PageLayout {
            image_x: image.x,
            image_y: image.y,
            image_width: image.width,
            image_height: image.height,
            text_start_y,
            line_height: geometry.line_height,
        },
        title,
        body,
        footer: footer(page_index, page_count, geometry),
        dropped_lines,
    }
}

pub fn plan_story(
    template: &StoryTemplate,
    child_name: &str,
    image: &FittedImage,
    geometry: &PageGeometry,
) -> Vec<PagePlan> {
    (0..template.page_count as usize)
        .map(|i| plan_page(template, child_name, i, image, geometry))
        .collect()
}
