//! Tour catalogue: packages, destinations and combined-package legs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::Storage;
use crate::utils::format::{format_date, format_date_time, ucfirst};

#[derive(Debug, Clone, Serialize)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `single` tours visit one destination, `combined` tours several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Single,
    Combined,
}

impl PackageType {
    pub const ALL: [&'static str; 2] = ["single", "combined"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "single" => Some(Self::Single),
            "combined" => Some(Self::Combined),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Combined => "combined",
        }
    }
}

/// A tour package (`main.packages`)
#[derive(Debug, Clone, Serialize)]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub duration: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub inclusions: Option<String>,
    pub exclusions: Option<String>,
    pub destination_id: Option<i64>,
    pub package_type: PackageType,
    pub tour_type: Option<String>,
    pub frontend_category: Option<String>,
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub active: bool,
    pub featured: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One leg of a combined package, joined with the destination name
#[derive(Debug, Clone, Serialize)]
pub struct CombinedDestination {
    pub destination_id: i64,
    pub name: String,
    pub display_order: i64,
}

/// A tour with its destination and combined legs loaded
#[derive(Debug, Clone)]
pub struct TourDetail {
    pub tour: Tour,
    pub destination_name: Option<String>,
    pub destination_slug: Option<String>,
    pub combined: Vec<CombinedDestination>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourView {
    #[serde(flatten)]
    pub tour: Tour,
    pub destination_name: Option<String>,
    pub destination_slug: Option<String>,
    pub tour_type_display: String,
    pub image_url: Option<String>,
    /// Destination names joined by `, `; only set for combined packages
    pub combined_destinations: Option<String>,
    pub combined_destination_ids: Vec<i64>,
    pub formatted_created_at: String,
    pub formatted_updated_at: String,
}

/// `Standard` when unset, otherwise `day_tour` becomes `Day tour`.
pub fn tour_type_display(tour_type: Option<&str>) -> String {
    match tour_type.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => ucfirst(&t.replace('_', " ")),
        None => "Standard".to_string(),
    }
}

impl TourDetail {
    pub fn view(self, storage: &Storage) -> TourView {
        let combined = self.tour.package_type == PackageType::Combined;
        TourView {
            destination_name: self.destination_name,
            destination_slug: self.destination_slug,
            tour_type_display: tour_type_display(self.tour.tour_type.as_deref()),
            image_url: self
                .tour
                .image
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| storage.url(p)),
            combined_destinations: combined.then(|| {
                self.combined
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }),
            combined_destination_ids: self.combined.iter().map(|c| c.destination_id).collect(),
            formatted_created_at: format_date(&self.tour.created_at),
            formatted_updated_at: format_date_time(&self.tour.updated_at),
            tour: self.tour,
        }
    }
}
