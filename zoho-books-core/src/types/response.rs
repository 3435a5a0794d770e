//! Response shapes returned by the resource services

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// The resource kinds exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Contact,
    Invoice,
    Expense,
    Item,
    SalesOrder,
}

impl ResourceKind {
    /// Collection path under the Books API base.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Contact => "/contacts",
            Self::Invoice => "/invoices",
            Self::Expense => "/expenses",
            Self::Item => "/items",
            Self::SalesOrder => "/salesorders",
        }
    }

    /// Key of a single record in Zoho's response body.
    #[must_use]
    pub const fn api_singular(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Invoice => "invoice",
            Self::Expense => "expense",
            Self::Item => "item",
            Self::SalesOrder => "salesorder",
        }
    }

    /// Key of the record list in Zoho's response body.
    #[must_use]
    pub const fn api_plural(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::Invoice => "invoices",
            Self::Expense => "expenses",
            Self::Item => "items",
            Self::SalesOrder => "salesorders",
        }
    }

    /// Key of a single record in our responses.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::SalesOrder => "sales_order",
            other => other.api_singular(),
        }
    }

    /// Key of the record list in our responses.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::SalesOrder => "sales_orders",
            other => other.api_plural(),
        }
    }

    /// Identifier field, as Zoho names it.
    #[must_use]
    pub const fn id_field(self) -> &'static str {
        match self {
            Self::Contact => "contact_id",
            Self::Invoice => "invoice_id",
            Self::Expense => "expense_id",
            Self::Item => "item_id",
            Self::SalesOrder => "salesorder_id",
        }
    }

    /// Human-readable name used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contact => "Contact",
            Self::Invoice => "Invoice",
            Self::Expense => "Expense",
            Self::Item => "Item",
            Self::SalesOrder => "Sales order",
        }
    }

    /// Plural label used in messages.
    #[must_use]
    pub const fn label_plural(self) -> &'static str {
        match self {
            Self::Contact => "Contacts",
            Self::Invoice => "Invoices",
            Self::Expense => "Expenses",
            Self::Item => "Items",
            Self::SalesOrder => "Sales orders",
        }
    }
}

/// One page of a list operation.
///
/// Serializes as `{<kind plural>: [...], page, page_size, has_more_page,
/// total?, next_cursor?, message}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub kind: ResourceKind,
    /// Records exactly as Zoho returned them.
    pub items: Vec<Value>,
    pub page: u32,
    pub page_size: u32,
    pub has_more_page: bool,
    pub total: Option<u64>,
    /// Present iff `has_more_page`.
    pub next_cursor: Option<String>,
    pub message: String,
}

impl Serialize for ListPage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(self.kind.plural(), &self.items)?;
        map.serialize_entry("page", &self.page)?;
        map.serialize_entry("page_size", &self.page_size)?;
        map.serialize_entry("has_more_page", &self.has_more_page)?;
        if let Some(total) = self.total {
            map.serialize_entry("total", &total)?;
        }
        if let Some(cursor) = &self.next_cursor {
            map.serialize_entry("next_cursor", cursor)?;
        }
        map.serialize_entry("message", &self.message)?;
        map.end()
    }
}

/// A single record: `{<kind singular>: {...} | null, message}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordResponse {
    /// Key the record is reported under, usually [`ResourceKind::singular`].
    pub key: &'static str,
    pub record: Option<Value>,
    pub message: String,
}

impl RecordResponse {
    /// Identifier of the record, if it carries one under `id_field`.
    #[must_use]
    pub fn id(&self, id_field: &str) -> Option<&str> {
        self.record.as_ref()?.get(id_field)?.as_str()
    }
}

impl Serialize for RecordResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, &self.record)?;
        map.serialize_entry("message", &self.message)?;
        map.end()
    }
}

/// Outcome of a delete or status change: `{success, message, <kind>_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub kind: ResourceKind,
    pub id: String,
    pub message: String,
}

impl Serialize for ActionResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry(self.kind.id_field(), &self.id)?;
        map.end()
    }
}
