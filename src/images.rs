use std::collections::HashSet;

use log::warn;
use pdf::content::{Matrix, Op};
use pdf::enc::StreamFilter;
use pdf::object::{ColorSpace, ImageXObject, Page, Resolve, XObject};
use png::ColorType;
use sha2::{Digest, Sha256};

use crate::config::ImageFilterConfig;
use crate::document::{PageSpace, apply_matrix, multiply_matrix};
use crate::error::BoxError;
use crate::geometry::Rectangle;
use crate::render::encode_png;

/// Raster image drawn on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    /// XObject resource name, or `inline_<n>` for inline images.
    pub name: String,
    /// Placement in page space.
    pub rect: Rectangle,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Encoding of [`EmbeddedImage::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Jpx,
    Jbig2,
    Fax,
    Flate,
    Raw,
}

impl ImageFormat {
    /// File extension when the bytes form a standalone image file.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ImageFormat::Png => Some("png"),
            ImageFormat::Jpeg => Some("jpg"),
            ImageFormat::Jpx => Some("jp2"),
            ImageFormat::Jbig2 | ImageFormat::Fax | ImageFormat::Flate | ImageFormat::Raw => None,
        }
    }
}

/// Images found on one page plus the number that could not be decoded.
#[derive(Debug, Default)]
pub struct PageImages {
    pub images: Vec<EmbeddedImage>,
    pub failures: usize,
}

/// Why an image was not saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRejection {
    /// Icon, thin rule, or too few bytes to be content.
    TooSmall,
    Duplicate,
    Unsupported,
}

/// Size, aspect and content-hash filter, shared across a whole document.
#[derive(Debug, Clone)]
pub struct ImageFilter {
    config: ImageFilterConfig,
    seen: HashSet<[u8; 32]>,
}

impl ImageFilter {
    pub fn new(config: ImageFilterConfig) -> Self {
        Self {
            config,
            seen: HashSet::new(),
        }
    }

    /// Accept or reject `image`. Accepted images are remembered for deduplication.
    pub fn check(&mut self, image: &EmbeddedImage) -> Result<&'static str, ImageRejection> {
        let config = &self.config;
        let ratio = if image.height > 0 {
            image.width as f32 / image.height as f32
        } else {
            0.0
        };
        let extreme_ratio =
            ratio > config.max_aspect_ratio || ratio < 1.0 / config.max_aspect_ratio;
        if image.data.len() < config.min_bytes
            || image.width < config.min_width
            || image.height < config.min_height
            || extreme_ratio
        {
            return Err(ImageRejection::TooSmall);
        }

        let digest: [u8; 32] = Sha256::digest(&image.data).into();
        if self.seen.contains(&digest) {
            return Err(ImageRejection::Duplicate);
        }
        let extension = image.format.extension().ok_or(ImageRejection::Unsupported)?;
        self.seen.insert(digest);
        Ok(extension)
    }
}

/// PNG colour type and channel count for samples the `pdf` crate decodes fully.
fn decoded_layout(image: &ImageXObject) -> Option<(ColorType, usize)> {
    match (image.color_space.as_ref(), image.bits_per_component.unwrap_or(8)) {
        (Some(ColorSpace::DeviceRGB) | None, 8) => Some((ColorType::Rgb, 3)),
        (Some(ColorSpace::DeviceGray), 8) => Some((ColorType::Grayscale, 1)),
        _ => None,
    }
}

fn stream_format(filter: Option<&StreamFilter>) -> ImageFormat {
    match filter {
        Some(StreamFilter::DCTDecode(_)) => ImageFormat::Jpeg,
        Some(StreamFilter::JPXDecode) => ImageFormat::Jpx,
        Some(StreamFilter::JBIG2Decode(_)) => ImageFormat::Jbig2,
        Some(StreamFilter::CCITTFaxDecode(_)) => ImageFormat::Fax,
        Some(StreamFilter::FlateDecode(_)) => ImageFormat::Flate,
        Some(_) | None => ImageFormat::Raw,
    }
}

/// Bytes to store for `image`. JPEG and JPEG 2000 streams are kept as is,
/// other 8-bit RGB and gray images become a PNG, the rest stay encoded.
fn image_payload(
    image: &ImageXObject,
    resolver: &impl Resolve,
) -> Result<(ImageFormat, Vec<u8>), BoxError> {
    let (data, filter) = image.raw_image_data(resolver)?;
    let format = stream_format(filter);
    let (color, channels) = match (format, decoded_layout(image)) {
        (ImageFormat::Jpeg | ImageFormat::Jpx, _) | (_, None) => {
            return Ok((format, data.to_vec()));
        }
        (_, Some(layout)) => layout,
    };
    let samples = image.image_data(resolver)?;
    let expected = image.width as usize * image.height as usize * channels;
    if samples.len() != expected {
        return Err(BoxError::UnsupportedImage(format!(
            "{color:?} samples are {} bytes, expected {expected}",
            samples.len()
        )));
    }
    let png = encode_png(&samples, image.width, image.height, color)?;
    Ok((ImageFormat::Png, png))
}

/// Decode `image` and place it where `ctm` draws the unit square.
fn embed(
    name: String,
    image: &ImageXObject,
    resolver: &impl Resolve,
    ctm: &Matrix,
    space: &PageSpace,
) -> Result<EmbeddedImage, BoxError> {
    let (format, data) = image_payload(image, resolver)?;
    Ok(EmbeddedImage {
        name,
        rect: unit_square_bounds(ctm, space),
        width: image.width,
        height: image.height,
        format,
        data,
    })
}

/// Page-space bounds of the unit square under `matrix`, where images are drawn.
fn unit_square_bounds(matrix: &Matrix, space: &PageSpace) -> Rectangle {
    let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
        .map(|corner| space.to_page(apply_matrix(matrix, corner)));
    Rectangle::bounding(corners).unwrap_or(Rectangle::new(0.0, 0.0, 0.0, 0.0))
}

/// Extract every image XObject and inline image drawn by `operations`.
pub fn collect_page_images(
    page: &Page,
    operations: &[Op],
    resolver: &impl Resolve,
    space: &PageSpace,
) -> Result<PageImages, BoxError> {
    let resources = page.resources().ok();
    let mut ctm = Matrix::default();
    let mut stack: Vec<Matrix> = Vec::new();
    let mut found = PageImages::default();
    let mut inline_index = 0usize;

    for op in operations {
        match op {
            Op::Save => stack.push(ctm),
            Op::Restore => ctm = stack.pop().unwrap_or_default(),
            Op::Transform { matrix } => ctm = multiply_matrix(matrix, &ctm),
            Op::XObject { name } => {
                let Some(xobject_ref) = resources.and_then(|res| res.xobjects.get(name)) else {
                    continue;
                };
                let xobject = resolver.get(*xobject_ref)?;
                if let XObject::Image(image) = &*xobject {
                    match embed(name.as_str().to_owned(), image, resolver, &ctm, space) {
                        Ok(embedded) => found.images.push(embedded),
                        Err(err) => {
                            warn!("skipping image {}: {err}", name.as_str());
                            found.failures += 1;
                        }
                    }
                }
            }
            Op::InlineImage { image } => {
                inline_index += 1;
                let name = format!("inline_{inline_index}");
                match embed(name, image, resolver, &ctm, space) {
                    Ok(embedded) => found.images.push(embedded),
                    Err(err) => {
                        warn!("skipping inline image {inline_index}: {err}");
                        found.failures += 1;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(found)
}
