//! Repository for the customer form's packages and questions

use rusqlite::{Connection, Row};
use sea_query::Expr;

use super::{delete_row, insert_row, row_exists, update_row, Columns};
use crate::db::models::{
    now_timestamp, parse_timestamp, Field, FormPackage, TermsQuestion, TermsQuestionListParams,
    UNKNOWN_PACKAGE,
};
use crate::db::queries::{
    base_terms_question_query, build_terms_question_list_query, fetch_all, fetch_page, tcol, Page,
    PageRequest,
};
use crate::error::{BackofficeError, Result};

const TABLE: &str = "terms_questions";

/// Fields of a question write
#[derive(Debug, Clone, Default)]
pub struct TermsQuestionChanges {
    pub package_id: Field<i64>,
    pub question_text: Field<String>,
    pub yes_option: Field<String>,
    pub no_option: Field<String>,
    pub sort_order: Field<i64>,
}

impl TermsQuestionChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("package_id", self.package_id)
            .field("question_text", self.question_text)
            .field("yes_option", self.yes_option)
            .field("no_option", self.no_option)
            .field("sort_order", self.sort_order)
    }
}

fn map_terms_question(row: &Row<'_>) -> rusqlite::Result<TermsQuestion> {
    let package_id: Option<i64> = row.get(8)?;
    let package_name = match package_id {
        Some(id) => FormPackage::new(id, row.get(9)?).name,
        None => UNKNOWN_PACKAGE.to_string(),
    };

    Ok(TermsQuestion {
        id: row.get(0)?,
        package_id: row.get(1)?,
        question_text: row.get(2)?,
        yes_option: row.get(3)?,
        no_option: row.get(4)?,
        sort_order: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?),
        updated_at: parse_timestamp(&row.get::<_, String>(7)?),
        package_name,
    })
}

pub fn paginate_terms_questions(
    conn: &Connection,
    params: &TermsQuestionListParams,
    request: PageRequest,
) -> Result<Page<TermsQuestion>> {
    fetch_page(
        conn,
        &build_terms_question_list_query(params),
        request,
        map_terms_question,
    )
}

pub fn find_terms_question(conn: &Connection, id: i64) -> Result<Option<TermsQuestion>> {
    let mut query = base_terms_question_query();
    query.and_where(Expr::col(tcol("q", "id")).eq(id));
    Ok(fetch_all(conn, &query, map_terms_question)?.into_iter().next())
}

/// Sort position after the last question of a package, starting at 1
pub fn next_sort_order(conn: &Connection, package_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM terms_questions WHERE package_id = ?1",
        [package_id],
        |row| row.get(0),
    )
    .map_err(BackofficeError::Database)
}

pub fn create_terms_question(
    conn: &Connection,
    changes: TermsQuestionChanges,
) -> Result<TermsQuestion> {
    let now = now_timestamp();
    let id = insert_row(
        conn,
        TABLE,
        changes
            .columns()
            .set("created_at", now.clone())
            .set("updated_at", now),
    )?;
    find_terms_question(conn, id)?.ok_or_else(|| BackofficeError::not_found("Terms question", id))
}

pub fn update_terms_question(
    conn: &Connection,
    id: i64,
    changes: TermsQuestionChanges,
) -> Result<Option<TermsQuestion>> {
    if !update_row(conn, TABLE, id, changes.columns().set("updated_at", now_timestamp()))? {
        return Ok(None);
    }
    find_terms_question(conn, id)
}

pub fn delete_terms_question(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, TABLE, id)
}

/// Packages for the question editor's dropdown, by id
pub fn list_form_packages(conn: &Connection) -> Result<Vec<FormPackage>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM packages ORDER BY id ASC")
        .map_err(BackofficeError::Database)?;

    let packages = stmt
        .query_map([], |row| Ok(FormPackage::new(row.get(0)?, row.get(1)?)))
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(packages)
}

pub fn form_package_exists(conn: &Connection, id: i64) -> Result<bool> {
    row_exists(conn, "packages", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_connection, Tenant};

    fn package(conn: &Connection, name: Option<&str>) -> i64 {
        conn.execute("INSERT INTO packages (name) VALUES (?1)", [name])
            .unwrap();
        conn.last_insert_rowid()
    }

    fn question(package_id: i64, text: &str, sort_order: i64) -> TermsQuestionChanges {
        TermsQuestionChanges {
            package_id: Field::Present(package_id),
            question_text: Field::Present(text.to_string()),
            yes_option: Field::Present("I agree".to_string()),
            no_option: Field::Present("I do not agree".to_string()),
            sort_order: Field::Present(sort_order),
        }
    }

    #[test]
    fn test_next_sort_order() {
        let conn = create_test_connection(Tenant::Tnc);
        let pkg = package(&conn, Some("Coron Joiner"));
        assert_eq!(next_sort_order(&conn, pkg).unwrap(), 1);

        create_terms_question(&conn, question(pkg, "Pets allowed?", 4)).unwrap();
        assert_eq!(next_sort_order(&conn, pkg).unwrap(), 5);
    }

    #[test]
    fn test_package_names() {
        let conn = create_test_connection(Tenant::Tnc);
        let named = package(&conn, Some("Coron Joiner"));
        let blank = package(&conn, Some("  "));

        let q1 = create_terms_question(&conn, question(named, "Q1", 1)).unwrap();
        let q2 = create_terms_question(&conn, question(blank, "Q2", 1)).unwrap();
        let q3 = create_terms_question(&conn, question(999, "Q3", 1)).unwrap();

        assert_eq!(q1.package_name, "Coron Joiner");
        assert_eq!(q2.package_name, format!("Package {blank}"));
        assert_eq!(q3.package_name, UNKNOWN_PACKAGE);
        assert_eq!(list_form_packages(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_list_filter_and_order() {
        let conn = create_test_connection(Tenant::Tnc);
        let a = package(&conn, Some("A"));
        let b = package(&conn, Some("B"));
        create_terms_question(&conn, question(a, "second", 2)).unwrap();
        create_terms_question(&conn, question(a, "first", 1)).unwrap();
        create_terms_question(&conn, question(b, "other", 1)).unwrap();

        let params = TermsQuestionListParams {
            package_id: Some(a.to_string()),
            ..Default::default()
        };
        let page = paginate_terms_questions(&conn, &params, PageRequest::new(1, 50)).unwrap();
        let texts: Vec<&str> = page.data.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_update_and_delete() {
        let conn = create_test_connection(Tenant::Tnc);
        let pkg = package(&conn, Some("A"));
        let q = create_terms_question(&conn, question(pkg, "Old", 1)).unwrap();

        let updated = update_terms_question(
            &conn,
            q.id,
            TermsQuestionChanges {
                question_text: Field::Present("New".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.question_text, "New");
        assert_eq!(updated.yes_option, "I agree");
        assert!(delete_terms_question(&conn, q.id).unwrap());
        assert!(find_terms_question(&conn, q.id).unwrap().is_none());
    }
}
