use crate::error::{StoryError, StoryResult};
use crate::models::GenerationRequest;
use crate::services::catalog::{MAX_CHILD_AGE, StoryCatalog};
use crate::services::document;
use crate::services::layout::{self, PageGeometry};
use crate::services::photo;
use crate::utils::attachment_filename;

pub const MAX_PHOTOS: usize = 2;

/// A finished document ready to be sent back.
#[derive(Debug)]
pub struct Storybook {
    pub title: String,
    pub file_name: String,
    pub page_count: usize,
    pub dropped_lines: usize,
    pub bytes: Vec<u8>,
}

/// Checks the request shape and returns the child's age as a bracket age.
pub fn validate(request: &GenerationRequest) -> StoryResult<u8> {
    if request.child_name.trim().is_empty() {
        return Err(StoryError::Validation("childName is required".to_string()));
    }

    let age = u8::try_from(request.child_age)
        .ok()
        .filter(|age| *age <= MAX_CHILD_AGE)
        .ok_or_else(|| {
            StoryError::Validation(format!(
                "childAge must be between 0 and {}, got {}",
                MAX_CHILD_AGE, request.child_age
            ))
        })?;

    if request.photos.is_empty() {
        return Err(StoryError::Validation(
            "at least one photo is required".to_string(),
        ));
    }
    if request.photos.len() > MAX_PHOTOS {
        return Err(StoryError::Validation(format!(
            "no more than {} photos are allowed, got {}",
            MAX_PHOTOS,
            request.photos.len()
        )));
    }

    Ok(age)
}

/// Runs a request end to end: pick the story, fit the photo, lay out every
/// page and serialise. Only the first photo is used.
pub fn create_storybook(
    catalog: &StoryCatalog,
    request: &GenerationRequest,
) -> StoryResult<Storybook> {
    let age = validate(request)?;
    let child_name = request.child_name.trim();

    let template = catalog.select(age, request.gender)?;
    tracing::debug!(
        template = %template.title,
        pages = template.page_count,
        "Selected story template"
    );

    let first_photo = request
        .photos
        .first()
        .ok_or_else(|| StoryError::Validation("at least one photo is required".to_string()))?;
    let prepared = photo::decode_data_url(first_photo)?;

    let geometry = PageGeometry::default();
    let fitted = photo::fit_image(prepared.width(), prepared.height(), &geometry);
    tracing::debug!(
        natural_width = prepared.width(),
        natural_height = prepared.height(),
        scale = fitted.scale,
        "Fitted photo"
    );

    let plans = layout::plan_story(template, child_name, &fitted, &geometry);
    let dropped_lines: usize = plans.iter().map(|p| p.dropped_lines).sum();
    if dropped_lines > 0 {
        tracing::debug!(dropped_lines, "Story text truncated at bottom margin");
    }

    let title = layout::substitute_name(&template.title, child_name);
    let bytes = document::assemble(&title, &prepared, &plans, &geometry)?;

    Ok(Storybook {
        file_name: attachment_filename(child_name),
        title,
        page_count: plans.len(),
        dropped_lines,
        bytes,
    })
}
