//! Query-string parameters for the list endpoints
//!
//! Every field is kept as a raw optional string. Empty values count as absent,
//! matching how HTML forms submit untouched filters.

use serde::Deserialize;

/// `page` and `per_page`, shared by every paginated endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Trimmed, non-empty query value.
pub fn param(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Checkbox-style flag: `1`, `true`, `on` or `yes`.
pub fn flag(value: &Option<String>) -> bool {
    matches!(
        param(value).map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "on" | "yes")
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePackageListParams {
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortDir")]
    pub sort_dir: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermsListParams {
    /// `active` or `inactive`
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermsQuestionListParams {
    pub package_id: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionListParams {
    pub package_type: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub show_archived: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TourListParams {
    pub destination_id: Option<String>,
    pub package_type: Option<String>,
    pub tour_type: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub active_only: Option<String>,
    pub featured_only: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletedTourListParams {
    pub assigned_team: Option<String>,
    pub followup_status: Option<String>,
    pub tail_end: Option<String>,
    pub destination: Option<String>,
    pub tour_type: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelledTourListParams {
    pub refund_status: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub with_coordinator: Option<String>,
    pub destination: Option<String>,
    pub assigned_team: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomesticTourListParams {
    pub destination: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub handled_by: Option<String>,
    pub accommodation_booked: Option<String>,
    pub coordinated_with_supplier: Option<String>,
    pub transfer_details_sent: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LuzonJoinerListParams {
    pub destination: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub with_coordinator: Option<String>,
    pub assigned_team: Option<String>,
    pub accommodation_booked: Option<String>,
    pub van_details_sent: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

/// Admin user listing: `pending`, `approved` or everything
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListParams {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_ignores_blank_values() {
        assert_eq!(param(&Some("  Boracay ".to_string())), Some("Boracay"));
        assert_eq!(param(&Some("   ".to_string())), None);
        assert_eq!(param(&None), None);
    }

    #[test]
    fn test_flag() {
        assert!(flag(&Some("true".to_string())));
        assert!(flag(&Some("1".to_string())));
        assert!(flag(&Some("TRUE".to_string())));
        assert!(!flag(&Some("false".to_string())));
        assert!(!flag(&None));
    }
}
