//! Contact (customer / vendor) requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::ListOptions;
use crate::error::CoreResult;
use crate::utils::validation::{
    Validate, check_email, optional_email, optional_id, require_id, require_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Customer,
    Vendor,
}

impl ContactType {
    #[must_use]
    pub const fn as_api(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ContactStatusFilter {
    All,
    #[default]
    Active,
    Inactive,
}

impl ContactStatusFilter {
    #[must_use]
    pub const fn as_api(self) -> &'static str {
        match self {
            Self::All => "Status.All",
            Self::Active => "Status.Active",
            Self::Inactive => "Status.Inactive",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ListContactsRequest {
    /// Only customers or only vendors; omit for both
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<ContactType>,
    /// Status filter (default active)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<ContactStatusFilter>,
    #[serde(flatten)]
    pub options: ListOptions,
}

impl ListContactsRequest {
    pub fn filters(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "filter_by".to_string(),
            self.filter_by.unwrap_or_default().as_api().to_string(),
        )];
        if let Some(contact_type) = self.contact_type {
            params.push(("contact_type".to_string(), contact_type.as_api().to_string()));
        }
        params
    }
}

/// Fields of a new contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct NewContact {
    /// Display name of the contact (required)
    pub contact_name: String,
    /// Primary email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Primary phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Mobile phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    /// Company name if different from the contact name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Currency used with this contact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
    /// Payment terms in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<u32>,
    /// Billing address object (attention, address, city, state, zip, country)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Value>,
    /// Shipping address object, same shape as billing_address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Value>,
    /// Additional contact persons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_persons: Option<Vec<Value>>,
    /// Custom field values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for NewContact {
    fn validate(&self) -> CoreResult<()> {
        require_text("contact_name", &self.contact_name)?;
        optional_email("email", self.email.as_deref())?;
        optional_id("currency_id", self.currency_id.as_deref())
    }
}

/// A contact of an explicit type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateContactRequest {
    /// customer or vendor
    pub contact_type: ContactType,
    #[serde(flatten)]
    pub contact: NewContact,
}

impl Validate for CreateContactRequest {
    fn validate(&self) -> CoreResult<()> {
        self.contact.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateContactRequest {
    /// Contact to update
    #[serde(skip_serializing)]
    pub contact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
    /// Payment terms in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_persons: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for UpdateContactRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("contact_id", &self.contact_id)?;
        if let Some(name) = &self.contact_name {
            require_text("contact_name", name)?;
        }
        if let Some(email) = &self.email {
            check_email("email", email)?;
        }
        optional_id("currency_id", self.currency_id.as_deref())
    }
}
