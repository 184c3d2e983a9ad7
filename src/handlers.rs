use crate::AppState;
use crate::error::StoryError;
use crate::models::GenerationRequest;
use crate::services::storybook;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{Html, IntoResponse, Response},
};
use http::HeaderValue;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use std::sync::Arc;

pub async fn index() -> Html<String> {
    let html_content = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Storybook Service</title>
        <meta charset="utf-8">
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; }
            .info-box { background-color: #f0f8ff; padding: 20px; border-radius: 8px; margin: 20px 0; }
            .endpoint { background-color: #f5f5f5; padding: 10px; margin: 10px 0; border-radius: 4px; font-family: monospace; }
        </style>
    </head>
    <body>
        <h1>Storybook Service</h1>

        <div class="info-box">
            <h2>Service Information</h2>
            <p>This service turns a child's photo and a few details into a personalized PDF storybook.</p>
            <p>A story is picked by age (0 to 12) and, when given, gender.</p>
        </div>

        <h2>Available Endpoints:</h2>
        <div class="endpoint">GET / - This information page</div>
        <div class="endpoint">GET /health - Health check</div>
        <div class="endpoint">POST /api/create-pdf - Generate a storybook PDF</div>

        <h2>How to Use:</h2>
        <p>POST a JSON body to /api/create-pdf:</p>
        <div class="endpoint">{ "childName": "Mia", "childAge": 5, "gender": "Girl", "photos": ["data:image/jpeg;base64,..."] }</div>
        <p>Send one or two PNG or JPEG photos as data URLs. The first photo appears on every page.</p>
    </body>
    </html>
    "#
    .to_string();

    Html(html_content)
}

pub async fn health_check() -> &'static str {
    "OK"
}

#[tracing::instrument(skip_all, fields(generation_id = %uuid::Uuid::new_v4()))]
pub async fn create_pdf(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, StoryError> {
    let Json(request) = payload?;
    tracing::info!(
        child_age = request.child_age,
        gender = ?request.gender,
        photos = request.photos.len(),
        "Generating storybook"
    );

    // Decoding and page rendering are CPU bound.
    let catalog = Arc::clone(&state.catalog);
    let book = tokio::task::spawn_blocking(move || storybook::create_storybook(&catalog, &request))
        .await
        .map_err(|e| StoryError::Serialization(e.to_string()))??;

    tracing::info!(
        pages = book.page_count,
        bytes = book.bytes.len(),
        dropped_lines = book.dropped_lines,
        "Storybook ready"
    );

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", book.file_name))
        .map_err(|e| StoryError::Serialization(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (CONTENT_DISPOSITION, disposition),
        ],
        book.bytes,
    )
        .into_response())
}
