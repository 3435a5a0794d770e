//! Shapes shared by several resource kinds

use serde::{Deserialize, Serialize};

use super::pagination::{DEFAULT_PAGE_SIZE, PageCursor, PageRequest};
use crate::error::{CoreError, CoreResult};

/// Column every list is ordered by unless the caller overrides it.
pub const DEFAULT_SORT_COLUMN: &str = "created_time";

/// List ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "A", alias = "asc")]
    Ascending,
    #[serde(alias = "D", alias = "desc")]
    Descending,
}

impl SortOrder {
    /// Zoho's `sort_order` code.
    #[must_use]
    pub const fn as_api(self) -> &'static str {
        match self {
            Self::Ascending => "A",
            Self::Descending => "D",
        }
    }
}

/// Paging, ordering and search options accepted by every list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ListOptions {
    /// Page number, starting at 1 (default 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Results per page, 1-200 (default 25)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// `next_cursor` from a previous page; takes precedence over page/page_size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Column to sort by (default created_time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,
    /// ascending (default) or descending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Free-text search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl ListOptions {
    /// The page this request addresses.
    pub fn resolve(&self) -> CoreResult<PageRequest> {
        if let Some(cursor) = &self.cursor {
            return PageCursor::decode(cursor);
        }
        PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Query parameters for `position` with ordering and search applied.
    pub fn query_params(&self, position: PageRequest) -> CoreResult<Vec<(String, String)>> {
        let sort_column = match self.sort_column.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_SORT_COLUMN,
            Some(column)
                if column
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') =>
            {
                column
            }
            Some(column) => {
                return Err(CoreError::ValidationError(format!(
                    "sort_column '{column}' is not a column name"
                )));
            }
        };

        let mut params = vec![
            ("page".to_string(), position.page.to_string()),
            ("per_page".to_string(), position.page_size.to_string()),
            ("sort_column".to_string(), sort_column.to_string()),
            (
                "sort_order".to_string(),
                self.sort_order.unwrap_or_default().as_api().to_string(),
            ),
        ];
        if let Some(text) = self.search_text.as_deref().map(str::trim)
            && !text.is_empty()
        {
            params.push(("search_text".to_string(), text.to_string()));
        }
        Ok(params)
    }
}

/// One line of an invoice or sales order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct LineItem {
    /// Existing item to bill; either this or `name` is required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Free-form line name when no item_id is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Quantity, must be positive (Zoho defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    /// Unit price, must not be negative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Discount (amount or percentage string such as "10%")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}
