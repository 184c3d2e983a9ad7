//! Serialises planned pages into a PDF with `pdf-writer`.

use crate::error::{StoryError, StoryResult};
use crate::services::layout::{PageGeometry, PagePlan, PlacedText};
use crate::services::photo::PreparedImage;
use crate::utils::to_win_ansi;
use image::{GenericImageView, ImageFormat};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");
const PHOTO: Name<'static> = Name(b"Im1");

const PRODUCER: &str = concat!("storybook ", env!("CARGO_PKG_VERSION"));

/// Hands out sequential indirect object ids.
struct RefAllocator {
    next: i32,
}

impl RefAllocator {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn bump(&mut self) -> Ref {
        let id = Ref::new(self.next);
        self.next += 1;
        id
    }
}

/// Component count and sample precision from a baseline or progressive
/// JPEG frame header, or `None` if no frame header precedes the scan.
fn jpeg_frame_components(bytes: &[u8]) -> Option<(u8, u8)> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // Fill bytes before a marker.
            0xFF => {
                pos += 1;
                continue;
            }
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let precision = *bytes.get(pos + 4)?;
            let components = *bytes.get(pos + 9)?;
            return Some((components, precision));
        }
        pos += 2 + length;
    }

    None
}

fn compress(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
}

/// Write the photo once as an image XObject; every page refers to it.
///
/// Gray and RGB JPEGs go in as-is behind `DCTDecode`. Anything else is
/// written as Flate-compressed RGB, with alpha split out into a soft mask.
fn embed_photo(pdf: &mut Pdf, refs: &mut RefAllocator, photo_id: Ref, photo: &PreparedImage) {
    let (width, height) = photo.image.dimensions();

    if photo.format == ImageFormat::Jpeg {
        let gray = match jpeg_frame_components(&photo.bytes) {
            Some((1, 8)) => Some(true),
            Some((3, 8)) => Some(false),
            _ => None,
        };
        if let Some(gray) = gray {
            let mut xobject = pdf.image_xobject(photo_id, &photo.bytes);
            xobject.filter(Filter::DctDecode);
            xobject.width(width as i32);
            xobject.height(height as i32);
            if gray {
                xobject.color_space().device_gray();
            } else {
                xobject.color_space().device_rgb();
            }
            xobject.bits_per_component(8);
            return;
        }
        // CMYK and 12-bit JPEGs are re-encoded below.
    }

    let (rgb, alpha) = if photo.image.color().has_alpha() {
        let rgba = photo.image.to_rgba8().into_raw();
        let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
        let mut alpha = Vec::with_capacity(rgba.len() / 4);
        for px in rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        (rgb, Some(alpha))
    } else {
        (photo.image.to_rgb8().into_raw(), None)
    };

    let smask_id = alpha.map(|alpha| {
        let smask_id = refs.bump();
        let smask_data = compress(&alpha);
        let mut smask = pdf.image_xobject(smask_id, &smask_data);
        smask.filter(Filter::FlateDecode);
        smask.width(width as i32);
        smask.height(height as i32);
        smask.color_space().device_gray();
        smask.bits_per_component(8);
        smask_id
    });

    let rgb_data = compress(&rgb);
    let mut xobject = pdf.image_xobject(photo_id, &rgb_data);
    xobject.filter(Filter::FlateDecode);
    xobject.width(width as i32);
    xobject.height(height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    if let Some(smask_id) = smask_id {
        xobject.s_mask(smask_id);
    }
}

fn show_text(content: &mut Content, font: Name<'static>, line: &PlacedText) {
    content.begin_text();
    content.set_font(font, line.size);
    content.next_line(line.x, line.y);
    content.show(Str(&to_win_ansi(&line.text)));
    content.end_text();
}

fn render_page(plan: &PagePlan) -> Vec<u8> {
    let layout = &plan.layout;
    let mut content = Content::new();

    content.save_state();
    content.transform([
        layout.image_width,
        0.0,
        0.0,
        layout.image_height,
        layout.image_x,
        layout.image_y,
    ]);
    content.x_object(PHOTO);
    content.restore_state();

    content.set_fill_gray(0.0);
    for line in &plan.title {
        show_text(&mut content, FONT_BOLD, line);
    }
    for line in &plan.body {
        show_text(&mut content, FONT_REGULAR, line);
    }
    show_text(&mut content, FONT_REGULAR, &plan.footer);

    content.finish()
}

/// Build the whole document. Nothing is returned unless every page was
/// written.
pub fn assemble(
    title: &str,
    photo: &PreparedImage,
    plans: &[PagePlan],
    geometry: &PageGeometry,
) -> StoryResult<Vec<u8>> {
    if plans.is_empty() {
        return Err(StoryError::Serialization("story has no pages".to_string()));
    }

    let mut refs = RefAllocator::new();
    let catalog_id = refs.bump();
    let page_tree_id = refs.bump();
    let regular_id = refs.bump();
    let bold_id = refs.bump();
    let photo_id = refs.bump();
    let info_id = refs.bump();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    embed_photo(&mut pdf, &mut refs, photo_id, photo);

    let mut page_ids = Vec::with_capacity(plans.len());
    for plan in plans {
        let page_id = refs.bump();
        let content_id = refs.bump();

        pdf.stream(content_id, &render_page(plan));

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, geometry.page_width, geometry.page_height));
        page.parent(page_tree_id);
        page.contents(content_id);
        {
            let mut resources = page.resources();
            resources
                .fonts()
                .pair(FONT_REGULAR, regular_id)
                .pair(FONT_BOLD, bold_id);
            resources.x_objects().pair(PHOTO, photo_id);
        }
        page.finish();

        page_ids.push(page_id);
    }

    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    Ok(pdf.finish())
}
