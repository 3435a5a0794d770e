//! Page cursors

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{CoreError, CoreResult};

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Largest page Zoho Books serves.
pub const MAX_PAGE_SIZE: u32 = 200;

/// A resolved page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Validate and build a page position.
    pub fn new(page: u32, page_size: u32) -> CoreResult<Self> {
        if page == 0 {
            return Err(CoreError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(CoreError::ValidationError(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// The page after this one, same size.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Opaque continuation token handed out as `next_cursor`.
///
/// Encodes `page:page_size` as URL-safe base64 without padding.
pub struct PageCursor;

impl PageCursor {
    #[must_use]
    pub fn encode(position: PageRequest) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", position.page, position.page_size))
    }

    pub fn decode(cursor: &str) -> CoreResult<PageRequest> {
        let invalid = || CoreError::ValidationError(format!("invalid cursor '{cursor}'"));

        let bytes = URL_SAFE_NO_PAD
            .decode(cursor.trim())
            .map_err(|_| invalid())?;
        let text = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (page, page_size) = text.split_once(':').ok_or_else(invalid)?;
        let page = page.parse::<u32>().map_err(|_| invalid())?;
        let page_size = page_size.parse::<u32>().map_err(|_| invalid())?;

        PageRequest::new(page, page_size).map_err(|_| invalid())
    }
}
