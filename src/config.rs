use crate::error::BoxError;

/// Thresholds for the box pipeline. Every value can be overridden per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Shapes narrower than this are dropped as icons or checkboxes.
    pub min_width: f32,
    /// Shapes shorter than this are dropped.
    pub min_height: f32,
    /// Shapes covering more than this fraction of the page are backgrounds or borders.
    pub max_area_fraction: f32,
    /// Two shapes whose origin and size all differ by less than this are the same box.
    /// Zero turns deduplication off.
    pub dedup_tolerance: f32,
    /// Margin added around each box so stroke width is not clipped.
    pub clip_padding: f32,
    /// Raster zoom factor handed to the renderer.
    pub render_scale: f32,
    /// Also pull embedded raster images out of each page.
    pub extract_images: bool,
    pub images: ImageFilterConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_width: 50.0,
            min_height: 50.0,
            max_area_fraction: 0.95,
            dedup_tolerance: 2.0,
            clip_padding: 2.0,
            render_scale: 2.0,
            extract_images: false,
            images: ImageFilterConfig::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_size(mut self, width: f32, height: f32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    pub fn with_max_area_fraction(mut self, fraction: f32) -> Self {
        self.max_area_fraction = fraction;
        self
    }

    pub fn with_dedup_tolerance(mut self, tolerance: f32) -> Self {
        self.dedup_tolerance = tolerance;
        self
    }

    pub fn with_clip_padding(mut self, padding: f32) -> Self {
        self.clip_padding = padding;
        self
    }

    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    pub fn with_images(mut self, enable: bool) -> Self {
        self.extract_images = enable;
        self
    }

    /// Reject thresholds the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), BoxError> {
        non_negative("min_width", self.min_width)?;
        non_negative("min_height", self.min_height)?;
        non_negative("clip_padding", self.clip_padding)?;
        if !(self.max_area_fraction > 0.0 && self.max_area_fraction <= 1.0) {
            return Err(BoxError::InvalidConfig(format!(
                "max_area_fraction must be in (0, 1], got {}",
                self.max_area_fraction
            )));
        }
        non_negative("dedup_tolerance", self.dedup_tolerance)?;
        positive("render_scale", self.render_scale)?;
        self.images.validate()
    }
}

/// Filters applied to embedded raster images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFilterConfig {
    /// Pixel width below which an image counts as an icon.
    pub min_width: u32,
    pub min_height: u32,
    /// Encoded size below which an image is skipped.
    pub min_bytes: usize,
    /// Images longer than this ratio on either axis are rules or separators.
    pub max_aspect_ratio: f32,
}

impl Default for ImageFilterConfig {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
            min_bytes: 2048,
            max_aspect_ratio: 10.0,
        }
    }
}

impl ImageFilterConfig {
    pub fn validate(&self) -> Result<(), BoxError> {
        if !(self.max_aspect_ratio.is_finite() && self.max_aspect_ratio >= 1.0) {
            return Err(BoxError::InvalidConfig(format!(
                "max_aspect_ratio must be at least 1, got {}",
                self.max_aspect_ratio
            )));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), BoxError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BoxError::InvalidConfig(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn positive(name: &str, value: f32) -> Result<(), BoxError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BoxError::InvalidConfig(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}
