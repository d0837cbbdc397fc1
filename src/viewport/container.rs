//! The page-side host of a viewport: it reports layout and owns the optional
//! loading indicator. The controller only reads its size and notifies it.

/// Text shown while assets are loading
pub const LOADING_TEXT: &str = "Loading model…";
/// Replaces the loading text when every asset failed
pub const FAILED_TEXT: &str = "Could not load the model.";

pub trait Container {
    /// Stable identity, matching `ViewportConfig::container`
    fn id(&self) -> &str;

    /// Current layout width in logical pixels; zero when not laid out
    fn client_width(&self) -> u32;

    /// Current layout height in logical pixels; zero when not laid out
    fn client_height(&self) -> u32;

    /// Physical pixels per logical pixel
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// True once the container has a non-zero size in both dimensions
    fn is_laid_out(&self) -> bool {
        self.client_width() > 0 && self.client_height() > 0
    }

    /// Removes the loading indicator, if one is present
    fn remove_loading_indicator(&mut self);

    /// Replaces the loading indicator's text, if one is present
    fn set_loading_text(&mut self, text: &str);
}

/// Container with a fixed, manually updated layout.
///
/// Used for headless viewports and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticContainer {
    id: String,
    width: u32,
    height: u32,
    pixel_ratio: f64,
    loading_indicator: Option<String>,
}

impl StaticContainer {
    /// A container of the given size showing the loading indicator
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            pixel_ratio: 1.0,
            loading_indicator: Some(LOADING_TEXT.to_string()),
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn without_loading_indicator(mut self) -> Self {
        self.loading_indicator = None;
        self
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn loading_indicator(&self) -> Option<&str> {
        self.loading_indicator.as_deref()
    }
}

impl Container for StaticContainer {
    fn id(&self) -> &str {
        &self.id
    }

    fn client_width(&self) -> u32 {
        self.width
    }

    fn client_height(&self) -> u32 {
        self.height
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn remove_loading_indicator(&mut self) {
        self.loading_indicator = None;
    }

    fn set_loading_text(&mut self, text: &str) {
        if let Some(indicator) = self.loading_indicator.as_mut() {
            *indicator = text.to_string();
        }
    }
}
