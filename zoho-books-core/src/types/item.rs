//! Item (product / service) requests

use serde::{Deserialize, Serialize};

use super::common::ListOptions;
use crate::error::{CoreError, CoreResult};
use crate::utils::validation::{
    Validate, check_non_negative, optional_id, optional_non_negative, require_id, require_text,
};

/// Where an item can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Sales,
    Purchases,
    SalesAndPurchases,
    Inventory,
}

impl ItemType {
    /// `filter_by` value selecting this type.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Sales => "ItemType.Sales",
            Self::Purchases => "ItemType.Purchases",
            Self::SalesAndPurchases => "ItemType.SalesAndPurchases",
            Self::Inventory => "ItemType.Inventory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Goods,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Inactive,
}

impl ItemStatus {
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Active => "Status.Active",
            Self::Inactive => "Status.Inactive",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ListItemsRequest {
    /// Only items of this type; cannot be combined with status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    /// Only active or inactive items; cannot be combined with item_type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(flatten)]
    pub options: ListOptions,
}

impl Validate for ListItemsRequest {
    fn validate(&self) -> CoreResult<()> {
        if self.item_type.is_some() && self.status.is_some() {
            return Err(CoreError::ValidationError(
                "item_type and status cannot be combined; Zoho accepts a single filter".to_string(),
            ));
        }
        Ok(())
    }
}

impl ListItemsRequest {
    pub fn filters(&self) -> Vec<(String, String)> {
        self.item_type
            .map(ItemType::as_filter)
            .or_else(|| self.status.map(ItemStatus::as_filter))
            .map(|filter| vec![("filter_by".to_string(), filter.to_string())])
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateItemRequest {
    /// Item name (required)
    pub name: String,
    /// Selling price, not negative (required)
    pub rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Unit of measure, e.g. "hrs" or "pcs"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    /// Cost price for purchase items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_rate: Option<f64>,
    /// Income account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Expense account for purchase items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

impl Validate for CreateItemRequest {
    fn validate(&self) -> CoreResult<()> {
        require_text("name", &self.name)?;
        check_non_negative("rate", self.rate)?;
        optional_non_negative("purchase_rate", self.purchase_rate)?;
        optional_id("account_id", self.account_id.as_deref())?;
        optional_id("purchase_account_id", self.purchase_account_id.as_deref())?;
        optional_id("tax_id", self.tax_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateItemRequest {
    /// Item to update
    #[serde(skip_serializing)]
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

impl Validate for UpdateItemRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("item_id", &self.item_id)?;
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        optional_non_negative("rate", self.rate)?;
        optional_non_negative("purchase_rate", self.purchase_rate)?;
        optional_id("account_id", self.account_id.as_deref())?;
        optional_id("tax_id", self.tax_id.as_deref())
    }
}
