use crate::error::{StoryError, StoryResult};
use crate::services::layout::PageGeometry;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GenericImageView, ImageFormat};
use regex::Regex;
use std::sync::OnceLock;

/// A decoded upload together with the format it was decoded as and the
/// bytes it was decoded from. JPEG bytes are embedded in the PDF unchanged.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl PreparedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Where the photo sits on a page, in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedImage {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

fn data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^data:(?P<mime>[^;,]*)(?P<params>[^,]*),(?P<payload>.*)$")
            .expect("data URL pattern compiles")
    })
}

fn image_format_from_mime(mime: &str) -> StoryResult<ImageFormat> {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/png" => Ok(ImageFormat::Png),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(ImageFormat::Jpeg),
        other => Err(StoryError::ImageDecode(format!(
            "unsupported image type '{}'",
            other
        ))),
    }
}

/// Split a `data:<mime>;base64,<payload>` URL into its format and raw bytes.
pub fn parse_data_url(data_url: &str) -> StoryResult<(ImageFormat, Vec<u8>)> {
    let captures = data_url_pattern()
        .captures(data_url.trim())
        .ok_or_else(|| StoryError::ImageDecode("photo is not a data URL".to_string()))?;

    let format = image_format_from_mime(&captures["mime"])?;

    if !captures["params"]
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"))
    {
        return Err(StoryError::ImageDecode(
            "photo data URL is not base64 encoded".to_string(),
        ));
    }

    let payload: String = captures["payload"]
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let bytes = general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| StoryError::ImageDecode(format!("invalid base64 payload: {}", e)))?;

    Ok((format, bytes))
}

pub fn decode_image(bytes: Vec<u8>, format: ImageFormat) -> StoryResult<PreparedImage> {
    let image = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| StoryError::ImageDecode(e.to_string()))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(StoryError::ImageDecode("photo has no pixels".to_string()));
    }

    Ok(PreparedImage {
        image,
        format,
        bytes,
    })
}

pub fn decode_data_url(data_url: &str) -> StoryResult<PreparedImage> {
    let (format, bytes) = parse_data_url(data_url)?;
    decode_image(bytes, format)
}

/// Scale the photo uniformly into the geometry's image box, centred
/// horizontally and hung from the top margin.
pub fn fit_image(natural_width: u32, natural_height: u32, geometry: &PageGeometry) -> FittedImage {
    let natural_width = natural_width.max(1) as f32;
    let natural_height = natural_height.max(1) as f32;

    let scale = (geometry.image_max_height / natural_height)
        .min(geometry.image_max_width / natural_width);
    let width = natural_width * scale;
    let height = natural_height * scale;

    FittedImage {
        x: (geometry.page_width - width) / 2.0,
        y: geometry.page_height - geometry.image_top_margin - height,
        width,
        height,
        scale,
    }
}
