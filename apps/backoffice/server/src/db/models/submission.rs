//! Customer form submissions and their companions, answers and receipts

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::Storage;
use crate::utils::format::{format_date, format_file_size, format_money, format_stored_date};

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: i64,
    pub package_type: String,
    pub email: String,
    pub lead_guest: String,
    pub fb_name: Option<String>,
    pub contact_number: String,
    pub payment_date: Option<String>,
    pub payment_amount: Option<f64>,
    pub has_payment_receipt: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Companion {
    pub id: i64,
    pub submission_id: i64,
    pub full_name: String,
}

/// An answer joined with its question's text
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionAnswer {
    pub id: i64,
    pub submission_id: i64,
    pub question_id: i64,
    pub answer: String,
    #[serde(skip)]
    pub question_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub id: i64,
    pub submission_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

/// A submission with its related rows loaded
#[derive(Debug, Clone)]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub companions: Vec<Companion>,
    pub answers: Vec<SubmissionAnswer>,
    pub receipts: Vec<PaymentReceipt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub question_id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptView {
    pub id: i64,
    pub file_name: String,
    pub file_url: String,
    pub file_size: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub id: i64,
    pub package_type: String,
    pub email: String,
    pub lead_guest: String,
    pub fb_name: Option<String>,
    pub contact_number: String,
    pub payment_date: Option<String>,
    pub formatted_payment_date: Option<String>,
    pub payment_amount: Option<f64>,
    pub formatted_payment_amount: Option<String>,
    pub has_payment_receipt: bool,
    pub archived: bool,
    pub formatted_created_at: String,
    pub companions: Vec<String>,
    pub answers: Vec<AnswerView>,
    pub payment_receipts: Vec<ReceiptView>,
    pub created_at: DateTime<Utc>,
}

pub const UNKNOWN_QUESTION: &str = "Unknown Question";

impl PaymentReceipt {
    pub fn view(&self, storage: &Storage) -> ReceiptView {
        ReceiptView {
            id: self.id,
            file_name: self.file_name.clone(),
            file_url: storage.url(&self.file_path),
            file_size: self.file_size.and_then(format_file_size),
            mime_type: self.mime_type.clone(),
        }
    }
}

impl SubmissionDetail {
    pub fn view(self, storage: &Storage) -> SubmissionView {
        let s = self.submission;
        SubmissionView {
            id: s.id,
            formatted_payment_date: format_stored_date(s.payment_date.as_deref()),
            formatted_payment_amount: format_money(s.payment_amount),
            formatted_created_at: format_date(&s.created_at),
            companions: self.companions.into_iter().map(|c| c.full_name).collect(),
            answers: self
                .answers
                .into_iter()
                .map(|a| AnswerView {
                    question_id: a.question_id,
                    question: a
                        .question_text
                        .unwrap_or_else(|| UNKNOWN_QUESTION.to_string()),
                    answer: a.answer,
                })
                .collect(),
            payment_receipts: self.receipts.iter().map(|r| r.view(storage)).collect(),
            package_type: s.package_type,
            email: s.email,
            lead_guest: s.lead_guest,
            fb_name: s.fb_name,
            contact_number: s.contact_number,
            payment_date: s.payment_date,
            payment_amount: s.payment_amount,
            has_payment_receipt: s.has_payment_receipt,
            archived: s.archived,
            created_at: s.created_at,
        }
    }
}

/// `show_archived` query values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveScope {
    /// Only submissions that are not archived
    #[default]
    Active,
    All,
    ArchivedOnly,
}

impl ArchiveScope {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("1") => Self::All,
            Some("2") => Self::ArchivedOnly,
            _ => Self::Active,
        }
    }
}
