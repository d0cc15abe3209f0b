//! Invoicing catalogue: line packages, itineraries and invoice terms

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A sellable invoice line (`invoice_package`)
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePackage {
    pub id: i64,
    pub sku: Option<String>,
    pub quantity: i64,
    pub category: Option<String>,
    pub items: Option<String>,
    pub items_full_details: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub category_name: String,
    pub description: Option<String>,
}

/// Dropdown entry for itinerary categories
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub id: i64,
    pub category_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub subcategory_name: String,
    pub details: Option<String>,
}

/// A subcategory joined with its category name
#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub subcategory_name: String,
    pub details: Option<String>,
}

/// Invoice terms block (`terms`)
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceTerm {
    pub id: i64,
    pub category: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
