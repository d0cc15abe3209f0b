//! Repository for customer submissions and their related rows

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{delete_row, insert_row, update_row, Columns};
use crate::db::models::{
    now_timestamp, parse_timestamp, Companion, Field, PaymentReceipt, Submission,
    SubmissionAnswer, SubmissionDetail, SubmissionListParams,
};
use crate::db::queries::{build_submission_list_query, fetch_page, Page, PageRequest};
use crate::error::{BackofficeError, Result};

const TABLE: &str = "submissions";

/// Fields of a submission write
#[derive(Debug, Clone, Default)]
pub struct SubmissionChanges {
    pub package_type: Field<String>,
    pub email: Field<String>,
    pub lead_guest: Field<String>,
    pub fb_name: Field<String>,
    pub contact_number: Field<String>,
    pub payment_date: Field<String>,
    pub payment_amount: Field<f64>,
    pub has_payment_receipt: Field<bool>,
    pub archived: Field<bool>,
}

impl SubmissionChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("package_type", self.package_type)
            .field("email", self.email)
            .field("lead_guest", self.lead_guest)
            .field("fb_name", self.fb_name)
            .field("contact_number", self.contact_number)
            .field("payment_date", self.payment_date)
            .field("payment_amount", self.payment_amount)
            .field("has_payment_receipt", self.has_payment_receipt)
            .field("archived", self.archived)
    }
}

/// A form answer as submitted
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: i64,
    pub answer: String,
}

/// A new receipt row for a stored upload
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
}

fn map_submission(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        package_type: row.get(1)?,
        email: row.get(2)?,
        lead_guest: row.get(3)?,
        fb_name: row.get(4)?,
        contact_number: row.get(5)?,
        payment_date: row.get(6)?,
        payment_amount: row.get(7)?,
        has_payment_receipt: row.get(8)?,
        archived: row.get(9)?,
        created_at: parse_timestamp(&row.get::<_, String>(10)?),
    })
}

pub fn find_submission(conn: &Connection, id: i64) -> Result<Option<Submission>> {
    let sql = r#"
        SELECT id, package_type, email, lead_guest, fb_name, contact_number, payment_date,
               payment_amount, has_payment_receipt, archived, created_at
        FROM submissions
        WHERE id = ?1
    "#;

    conn.query_row(sql, [id], map_submission)
        .optional()
        .map_err(BackofficeError::Database)
}

fn list_companions(conn: &Connection, submission_id: i64) -> Result<Vec<Companion>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, submission_id, full_name FROM companions WHERE submission_id = ?1 ORDER BY id",
        )
        .map_err(BackofficeError::Database)?;

    let companions = stmt
        .query_map([submission_id], |row| {
            Ok(Companion {
                id: row.get(0)?,
                submission_id: row.get(1)?,
                full_name: row.get(2)?,
            })
        })
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(companions)
}

fn list_answers(conn: &Connection, submission_id: i64) -> Result<Vec<SubmissionAnswer>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT a.id, a.submission_id, a.question_id, a.answer, q.question_text
            FROM submission_answers a
            LEFT JOIN terms_questions q ON q.id = a.question_id
            WHERE a.submission_id = ?1
            ORDER BY a.id
            "#,
        )
        .map_err(BackofficeError::Database)?;

    let answers = stmt
        .query_map([submission_id], |row| {
            Ok(SubmissionAnswer {
                id: row.get(0)?,
                submission_id: row.get(1)?,
                question_id: row.get(2)?,
                answer: row.get(3)?,
                question_text: row.get(4)?,
            })
        })
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(answers)
}

pub fn list_receipts(conn: &Connection, submission_id: i64) -> Result<Vec<PaymentReceipt>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, submission_id, file_name, file_path, file_size, mime_type
            FROM payment_receipts
            WHERE submission_id = ?1
            ORDER BY id
            "#,
        )
        .map_err(BackofficeError::Database)?;

    let receipts = stmt
        .query_map([submission_id], |row| {
            Ok(PaymentReceipt {
                id: row.get(0)?,
                submission_id: row.get(1)?,
                file_name: row.get(2)?,
                file_path: row.get(3)?,
                file_size: row.get(4)?,
                mime_type: row.get(5)?,
            })
        })
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(receipts)
}

/// Load companions, answers and receipts for a submission
pub fn load_submission_detail(conn: &Connection, submission: Submission) -> Result<SubmissionDetail> {
    Ok(SubmissionDetail {
        companions: list_companions(conn, submission.id)?,
        answers: list_answers(conn, submission.id)?,
        receipts: list_receipts(conn, submission.id)?,
        submission,
    })
}

pub fn find_submission_detail(conn: &Connection, id: i64) -> Result<Option<SubmissionDetail>> {
    match find_submission(conn, id)? {
        Some(submission) => Ok(Some(load_submission_detail(conn, submission)?)),
        None => Ok(None),
    }
}

pub fn paginate_submissions(
    conn: &Connection,
    params: &SubmissionListParams,
    request: PageRequest,
) -> Result<Page<SubmissionDetail>> {
    fetch_page(conn, &build_submission_list_query(params), request, map_submission)?
        .try_map(|submission| load_submission_detail(conn, submission))
}

/// Create a submission with its companions and answers in one transaction
pub fn create_submission(
    conn: &Connection,
    changes: SubmissionChanges,
    companions: &[String],
    answers: &[NewAnswer],
) -> Result<SubmissionDetail> {
    let tx = conn.unchecked_transaction().map_err(BackofficeError::Database)?;

    let id = insert_row(&tx, TABLE, changes.columns().set("created_at", now_timestamp()))?;

    for full_name in companions {
        tx.execute(
            "INSERT INTO companions (submission_id, full_name) VALUES (?1, ?2)",
            params![id, full_name],
        )
        .map_err(BackofficeError::Database)?;
    }

    for answer in answers {
        tx.execute(
            "INSERT INTO submission_answers (submission_id, question_id, answer) VALUES (?1, ?2, ?3)",
            params![id, answer.question_id, answer.answer],
        )
        .map_err(BackofficeError::Database)?;
    }

    tx.commit().map_err(BackofficeError::Database)?;

    find_submission_detail(conn, id)?.ok_or_else(|| BackofficeError::not_found("Submission", id))
}

pub fn update_submission(
    conn: &Connection,
    id: i64,
    changes: SubmissionChanges,
) -> Result<Option<Submission>> {
    if !update_row(conn, TABLE, id, changes.columns())? {
        return Ok(None);
    }
    find_submission(conn, id)
}

pub fn set_submission_archived(conn: &Connection, id: i64, archived: bool) -> Result<bool> {
    update_row(conn, TABLE, id, Columns::new().set("archived", archived))
}

/// Delete a submission; related rows cascade. Returns the receipts that
/// were attached so their files can be removed.
pub fn delete_submission(conn: &Connection, id: i64) -> Result<Option<Vec<PaymentReceipt>>> {
    if find_submission(conn, id)?.is_none() {
        return Ok(None);
    }
    let receipts = list_receipts(conn, id)?;
    delete_row(conn, TABLE, id)?;
    Ok(Some(receipts))
}

/// Attach a receipt and flag the submission as having one
pub fn add_payment_receipt(
    conn: &Connection,
    submission_id: i64,
    receipt: NewReceipt,
) -> Result<PaymentReceipt> {
    let tx = conn.unchecked_transaction().map_err(BackofficeError::Database)?;

    tx.execute(
        r#"
        INSERT INTO payment_receipts (submission_id, file_name, file_path, file_size, mime_type)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            submission_id,
            receipt.file_name,
            receipt.file_path,
            receipt.file_size,
            receipt.mime_type
        ],
    )
    .map_err(BackofficeError::Database)?;
    let id = tx.last_insert_rowid();

    tx.execute(
        "UPDATE submissions SET has_payment_receipt = 1 WHERE id = ?1",
        [submission_id],
    )
    .map_err(BackofficeError::Database)?;

    tx.commit().map_err(BackofficeError::Database)?;

    Ok(PaymentReceipt {
        id,
        submission_id,
        file_name: receipt.file_name,
        file_path: receipt.file_path,
        file_size: Some(receipt.file_size),
        mime_type: receipt.mime_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_connection, Tenant};

    fn changes(email: &str) -> SubmissionChanges {
        SubmissionChanges {
            package_type: Field::Present("Coron Joiner".to_string()),
            email: Field::Present(email.to_string()),
            lead_guest: Field::Present("Juan Dela Cruz".to_string()),
            contact_number: Field::Present("09171234567".to_string()),
            payment_amount: Field::Present(2500.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_with_relations() {
        let conn = create_test_connection(Tenant::Tnc);
        conn.execute(
            "INSERT INTO terms_questions (package_id, question_text, yes_option, no_option) VALUES (1, 'Refundable?', 'Yes', 'No')",
            [],
        )
        .unwrap();
        let question_id = conn.last_insert_rowid();

        let detail = create_submission(
            &conn,
            changes("juan@example.com"),
            &["Maria Clara".to_string(), "Jose Rizal".to_string()],
            &[
                NewAnswer {
                    question_id,
                    answer: "yes".to_string(),
                },
                NewAnswer {
                    question_id: 404,
                    answer: "no".to_string(),
                },
            ],
        )
        .unwrap();

        assert_eq!(detail.companions.len(), 2);
        assert_eq!(detail.answers[0].question_text.as_deref(), Some("Refundable?"));
        assert!(detail.answers[1].question_text.is_none());
        assert!(!detail.submission.archived);
    }

    #[test]
    fn test_archive_hides_from_default_listing() {
        let conn = create_test_connection(Tenant::Tnc);
        let kept = create_submission(&conn, changes("a@example.com"), &[], &[]).unwrap();
        let archived = create_submission(&conn, changes("b@example.com"), &[], &[]).unwrap();
        assert!(set_submission_archived(&conn, archived.submission.id, true).unwrap());

        let active = paginate_submissions(
            &conn,
            &SubmissionListParams::default(),
            PageRequest::new(1, 15),
        )
        .unwrap();
        assert_eq!(active.total, 1);
        assert_eq!(active.data[0].submission.id, kept.submission.id);

        let only_archived = paginate_submissions(
            &conn,
            &SubmissionListParams {
                show_archived: Some("2".to_string()),
                ..Default::default()
            },
            PageRequest::new(1, 15),
        )
        .unwrap();
        assert_eq!(only_archived.data[0].submission.id, archived.submission.id);
    }

    #[test]
    fn test_receipt_and_delete() {
        let conn = create_test_connection(Tenant::Tnc);
        let created = create_submission(&conn, changes("c@example.com"), &["Ana".to_string()], &[])
            .unwrap();
        let id = created.submission.id;

        add_payment_receipt(
            &conn,
            id,
            NewReceipt {
                file_name: "gcash.png".to_string(),
                file_path: "payment_receipts/1_gcash.png".to_string(),
                file_size: 2048,
                mime_type: Some("image/png".to_string()),
            },
        )
        .unwrap();
        assert!(find_submission(&conn, id).unwrap().unwrap().has_payment_receipt);

        let receipts = delete_submission(&conn, id).unwrap().unwrap();
        assert_eq!(receipts.len(), 1);
        assert!(list_companions(&conn, id).unwrap().is_empty());
        assert!(delete_submission(&conn, id).unwrap().is_none());
    }

    #[test]
    fn test_update_partial() {
        let conn = create_test_connection(Tenant::Tnc);
        let created = create_submission(&conn, changes("d@example.com"), &[], &[]).unwrap();

        let updated = update_submission(
            &conn,
            created.submission.id,
            SubmissionChanges {
                fb_name: Field::Present("juan.fb".to_string()),
                payment_amount: Field::Null,
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.fb_name.as_deref(), Some("juan.fb"));
        assert_eq!(updated.payment_amount, None);
        assert_eq!(updated.email, "d@example.com");
    }
}
