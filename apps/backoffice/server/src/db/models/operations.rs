//! Tour operations trackers: completed, cancelled, domestic and Luzon joiner tours

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::format::{format_money, format_stored_date, ucfirst};

pub const FOLLOWUP_STATUSES: [&str; 3] = ["1st Follow up sent", "1st Text Sent", "No Follow Up"];

pub const TAIL_END_STATUSES: [&str; 6] = [
    "No Review",
    "With Review Posted",
    "With Photos",
    "FB Feedback Only",
    "No Review, No Feedback, No Photo",
    "ALL GOOD POSTED",
];

pub const REFUND_STATUSES: [&str; 4] = ["Pending", "Processing", "Completed", "Not Applicable"];

pub const PAYMENT_STATUSES: [&str; 2] = ["Partially Paid", "Fully Paid"];

pub const COORDINATOR_OPTIONS: [&str; 2] = ["With", "None"];

pub fn followup_status_display(status: Option<&str>) -> Option<String> {
    status.map(|s| {
        match s {
            "1st Follow up sent" => "1st Follow-up Sent",
            "No Follow Up" => "No Follow-up",
            other => other,
        }
        .to_string()
    })
}

pub fn tail_end_display(tail_end: Option<&str>) -> Option<String> {
    tail_end.map(|t| {
        match t {
            "With Review Posted" => "Review Posted",
            "With Photos" => "Photos Shared",
            "No Review, No Feedback, No Photo" => "No Activity",
            "ALL GOOD POSTED" => "All Good - Posted",
            other => other,
        }
        .to_string()
    })
}

pub fn with_coordinator_display(value: &str) -> &'static str {
    if value == "With" {
        "Yes"
    } else {
        "No"
    }
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag == Some(true) {
        "Yes"
    } else {
        "No"
    }
}

/// Customer linked to a completed tour through its invoice number
#[derive(Debug, Clone, Serialize)]
pub struct LinkedCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedInvoice {
    pub invoice_status: Option<String>,
    pub total_price: Option<f64>,
    pub amount_due: Option<f64>,
    pub payment_received: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedTour {
    pub id: i64,
    pub tour_id: Option<i64>,
    pub assigned_team: String,
    pub followup_status: Option<String>,
    pub tail_end: Option<String>,
    pub completion_date: Option<String>,
    pub notes: Option<String>,
    pub customer_assigned: bool,
    pub invoice_no: Option<String>,
    pub travel_dates: String,
    pub destination: String,
    pub tour_type: String,
    pub days: i64,
    pub pax: i64,
    pub lead_guest: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub customer: Option<LinkedCustomer>,
    #[serde(skip)]
    pub invoice: Option<LinkedInvoice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedTourView {
    #[serde(flatten)]
    pub tour: CompletedTour,
    pub customer: Option<LinkedCustomer>,
    pub invoice: Option<LinkedInvoice>,
    pub formatted_completion_date: Option<String>,
    pub followup_status_display: Option<String>,
    pub tail_end_display: Option<String>,
}

impl CompletedTour {
    pub fn view(mut self) -> CompletedTourView {
        CompletedTourView {
            customer: self.customer.take(),
            invoice: self.invoice.take(),
            formatted_completion_date: format_stored_date(self.completion_date.as_deref()),
            followup_status_display: followup_status_display(self.followup_status.as_deref()),
            tail_end_display: tail_end_display(self.tail_end.as_deref()),
            tour: self,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelledTour {
    pub id: i64,
    pub tour_id: Option<i64>,
    pub cancellation_person: Option<String>,
    pub cancellation_reason: Option<String>,
    pub refund_status: Option<String>,
    pub cancellation_date: String,
    pub days: i64,
    pub pax: i64,
    pub with_coordinator: String,
    pub pickup_point: String,
    pub balance: Option<f64>,
    pub payment_status: String,
    pub accommodation: Option<String>,
    pub room_setup: Option<String>,
    pub booked_accommodation: Option<bool>,
    pub van_details_sent: Option<bool>,
    pub assigned_team: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub lead_guest: String,
    pub contact: String,
    pub destination: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelledTourView {
    #[serde(flatten)]
    pub tour: CancelledTour,
    pub formatted_cancellation_date: Option<String>,
    pub formatted_balance: Option<String>,
    pub refund_status_display: Option<String>,
    pub payment_status_display: String,
    pub with_coordinator_display: &'static str,
}

impl CancelledTour {
    pub fn view(self) -> CancelledTourView {
        CancelledTourView {
            formatted_cancellation_date: format_stored_date(Some(&self.cancellation_date)),
            formatted_balance: format_money(self.balance),
            refund_status_display: self.refund_status.clone(),
            payment_status_display: self.payment_status.clone(),
            with_coordinator_display: with_coordinator_display(&self.with_coordinator),
            tour: self,
        }
    }
}

/// Domestic tour. The YES/NO columns are exposed as booleans.
#[derive(Debug, Clone, Serialize)]
pub struct DomesticTour {
    pub id: i64,
    pub travel_dates: String,
    pub destination: String,
    pub days: i64,
    pub pax: i64,
    pub lead_guest: String,
    pub contact: String,
    pub pickup_details: Option<String>,
    pub balance: Option<f64>,
    pub payment_status: String,
    pub accommodation: Option<String>,
    pub booked_accommodation: Option<bool>,
    pub coordinated_with_supplier: Option<bool>,
    pub hotel_balance: Option<f64>,
    pub transfer_details_sent: Option<bool>,
    pub handled_by: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomesticTourView {
    #[serde(flatten)]
    pub tour: DomesticTour,
    pub formatted_balance: Option<String>,
    pub formatted_hotel_balance: Option<String>,
    pub payment_status_display: String,
    pub coordinated_with_supplier_display: &'static str,
    pub status_display: String,
}

impl DomesticTour {
    pub fn view(self) -> DomesticTourView {
        DomesticTourView {
            formatted_balance: format_money(self.balance),
            formatted_hotel_balance: format_money(self.hotel_balance),
            payment_status_display: self.payment_status.clone(),
            coordinated_with_supplier_display: yes_no(self.coordinated_with_supplier),
            status_display: ucfirst(&self.status),
            tour: self,
        }
    }
}

/// Luzon joiner tour (`luzon_exclusive`)
#[derive(Debug, Clone, Serialize)]
pub struct LuzonJoiner {
    pub id: i64,
    pub travel_dates: String,
    pub destination: String,
    pub days: i64,
    pub pax: i64,
    pub with_coordinator: String,
    pub lead_guest: String,
    pub contact: String,
    pub pickup_point: String,
    pub balance: Option<f64>,
    pub payment_status: String,
    pub accommodation: Option<String>,
    pub room_setup: Option<String>,
    pub booked_accommodation: Option<bool>,
    pub van_details_sent: Option<bool>,
    pub assigned_team: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LuzonJoinerView {
    #[serde(flatten)]
    pub tour: LuzonJoiner,
    pub formatted_balance: Option<String>,
    pub payment_status_display: String,
    pub with_coordinator_display: &'static str,
    pub status_display: String,
}

impl LuzonJoiner {
    pub fn view(self) -> LuzonJoinerView {
        LuzonJoinerView {
            formatted_balance: format_money(self.balance),
            payment_status_display: self.payment_status.clone(),
            with_coordinator_display: with_coordinator_display(&self.with_coordinator),
            status_display: ucfirst(&self.status),
            tour: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_followup_and_tail_end_display() {
        assert_eq!(
            followup_status_display(Some("1st Follow up sent")).as_deref(),
            Some("1st Follow-up Sent")
        );
        assert_eq!(
            followup_status_display(Some("1st Text Sent")).as_deref(),
            Some("1st Text Sent")
        );
        assert_eq!(followup_status_display(None), None);
        assert_eq!(
            tail_end_display(Some("No Review, No Feedback, No Photo")).as_deref(),
            Some("No Activity")
        );
        assert_eq!(
            tail_end_display(Some("ALL GOOD POSTED")).as_deref(),
            Some("All Good - Posted")
        );
    }

    #[test]
    fn test_coordinator_display() {
        assert_eq!(with_coordinator_display("With"), "Yes");
        assert_eq!(with_coordinator_display("None"), "No");
        assert_eq!(yes_no(None), "No");
    }
}
