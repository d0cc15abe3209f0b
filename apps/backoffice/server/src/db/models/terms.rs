//! Terms and conditions documents and the customer form's questions

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::Storage;
use crate::utils::format::{basename, format_date};

/// A terms and conditions document (`terms_and_conditions`)
#[derive(Debug, Clone, Serialize)]
pub struct TermsAndCondition {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub pdf_file_path: Option<String>,
    #[serde(skip)]
    pub original_file_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermsAndConditionView {
    #[serde(flatten)]
    pub terms: TermsAndCondition,
    pub pdf_file_name: Option<String>,
    pub has_pdf: bool,
    pub pdf_url: Option<String>,
    pub formatted_created_at: String,
    pub formatted_updated_at: String,
}

impl TermsAndCondition {
    /// Download name of the attached PDF.
    pub fn pdf_file_name(&self) -> Option<String> {
        let path = self.pdf_file_path.as_deref().filter(|p| !p.is_empty())?;
        Some(
            self.original_file_name
                .clone()
                .unwrap_or_else(|| basename(path).to_string()),
        )
    }

    pub fn view(self, storage: &Storage) -> TermsAndConditionView {
        let path = self.pdf_file_path.clone().filter(|p| !p.is_empty());
        TermsAndConditionView {
            pdf_file_name: self.pdf_file_name(),
            has_pdf: path.is_some(),
            pdf_url: path.map(|p| storage.url(&p)),
            formatted_created_at: format_date(&self.created_at),
            formatted_updated_at: format_date(&self.updated_at),
            terms: self,
        }
    }
}

/// A package on the customer form (`tnc.packages`)
#[derive(Debug, Clone, Serialize)]
pub struct FormPackage {
    pub id: i64,
    pub name: String,
}

impl FormPackage {
    /// Blank names fall back to `Package <id>`.
    pub fn new(id: i64, name: Option<String>) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Package {id}"));
        Self { id, name }
    }
}

/// A yes/no question shown on the customer form (`terms_questions`)
#[derive(Debug, Clone, Serialize)]
pub struct TermsQuestion {
    pub id: i64,
    pub package_id: i64,
    pub question_text: String,
    pub yes_option: String,
    pub no_option: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Name of the owning package, `Unknown Package` when it is gone
    pub package_name: String,
}

pub const UNKNOWN_PACKAGE: &str = "Unknown Package";
