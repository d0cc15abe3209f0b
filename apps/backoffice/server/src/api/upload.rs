//! Request bodies that may be JSON, urlencoded or multipart
//!
//! Text fields of all three formats land in one JSON object so the same
//! [`Validator`] rules apply. Bracketed keys such as `companions[]` or
//! `answers[0][answer]` become arrays and objects.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use serde_json::{Map, Value};

use crate::error::BackofficeError;
use crate::validation::{as_decimal, as_integer, Validator};

/// File types recognised from their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Png,
    Jpeg,
    Gif,
}

impl FileKind {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            Some(Self::Pdf)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["pdf"],
            Self::Png => &["png"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Gif => &["gif"],
        }
    }
}

/// Accepted types and size limit of an upload field
#[derive(Debug, Clone, Copy)]
pub struct FileRule {
    pub kinds: &'static [FileKind],
    /// Types as listed in the error message
    pub label: &'static str,
    pub max_kb: u64,
}

pub const PDF_UPLOAD: FileRule = FileRule {
    kinds: &[FileKind::Pdf],
    label: "pdf",
    max_kb: 10 * 1024,
};

pub const RECEIPT_UPLOAD: FileRule = FileRule {
    kinds: &[FileKind::Jpeg, FileKind::Png, FileKind::Pdf],
    label: "jpg, jpeg, png, pdf",
    max_kb: 5 * 1024,
};

pub const IMAGE_UPLOAD: FileRule = FileRule {
    kinds: &[FileKind::Jpeg, FileKind::Png, FileKind::Gif],
    label: "jpeg, png, jpg, gif",
    max_kb: 2 * 1024,
};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::sniff(&self.bytes)
    }

    /// Lowercase extension of the client file name when it matches the
    /// detected type, otherwise the type's canonical extension.
    pub fn extension(&self) -> Option<&'static str> {
        let kind = self.kind()?;
        let client = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let extensions = kind.extensions();
        Some(
            extensions
                .iter()
                .find(|ext| client.as_deref() == Some(**ext))
                .copied()
                .unwrap_or(extensions[0]),
        )
    }
}

/// Check an upload against a rule, recording failures on `v`.
///
/// Returns the detected type when the file passes.
pub fn check_file(
    v: &mut Validator<'_>,
    field: &str,
    file: Option<&UploadedFile>,
    rule: &FileRule,
    required: bool,
) -> Option<FileKind> {
    let attribute = field.replace('_', " ");
    let Some(file) = file else {
        if required {
            v.fail(field, format!("The {attribute} field is required."));
        }
        return None;
    };

    let kind = file.kind().filter(|kind| rule.kinds.contains(kind));
    if kind.is_none() {
        v.fail(
            field,
            format!("The {attribute} field must be a file of type: {}.", rule.label),
        );
    }
    if file.size() > rule.max_kb * 1024 {
        v.fail(
            field,
            format!(
                "The {attribute} field must not be greater than {} kilobytes.",
                rule.max_kb
            ),
        );
        return None;
    }
    kind
}

/// Text fields and files of a request body
#[derive(Debug, Default)]
pub struct FormInput {
    pub fields: Map<String, Value>,
    files: HashMap<String, UploadedFile>,
}

impl FormInput {
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.get(field)
    }

    /// Loose read for the unvalidated endpoints: trimmed text, numbers
    /// rendered as text, blank as `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(as_integer)
    }

    pub fn decimal(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(as_decimal)
    }

    fn insert(&mut self, key: &str, value: Value) {
        let path = key_path(key);
        // the top level is always an object; a nameless head has no slot
        if path[0].is_empty() {
            tracing::debug!(key, "ignoring form field without a name");
            return;
        }
        let mut root = Value::Object(std::mem::take(&mut self.fields));
        insert_path(&mut root, &path, value);
        if let Value::Object(fields) = root {
            self.fields = fields;
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, BackofficeError> {
        let mut input = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| BackofficeError::bad_request(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| BackofficeError::bad_request(e.body_text()))?;
                // an untouched file input still sends an empty part
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                input.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    },
                );
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| BackofficeError::bad_request(e.body_text()))?;
                input.insert(&name, Value::String(text));
            }
        }
        Ok(input)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, BackofficeError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => Ok(Self {
                fields,
                files: HashMap::new(),
            }),
            Ok(_) => Err(BackofficeError::bad_request(
                "The request body must be a JSON object.",
            )),
            Err(e) => Err(BackofficeError::bad_request(format!("Malformed JSON: {e}"))),
        }
    }
}

/// `answers[0][answer]` becomes `["answers", "0", "answer"]`, `tags[]`
/// becomes `["tags", ""]`.
fn key_path(key: &str) -> Vec<&str> {
    match key.find('[') {
        None => vec![key],
        Some(open) => {
            let mut path = vec![&key[..open]];
            path.extend(
                key[open..]
                    .split('[')
                    .skip(1)
                    .map(|segment| segment.trim_end_matches(']')),
            );
            path
        }
    }
}

fn insert_path(slot: &mut Value, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *slot = value;
        return;
    };

    let is_index = head.is_empty() || head.parse::<usize>().is_ok();
    if is_index {
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        let Value::Array(items) = slot else {
            return;
        };
        // indexes past the end append, so sparse keys cannot grow the array
        let index = head
            .parse::<usize>()
            .ok()
            .filter(|i| *i < items.len())
            .unwrap_or(items.len());
        if index == items.len() {
            items.push(Value::Null);
        }
        insert_path(&mut items[index], rest, value);
    } else {
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        let entry = map.entry(head.to_string()).or_insert(Value::Null);
        insert_path(entry, rest, value);
    }
}

impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = BackofficeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| BackofficeError::bad_request(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| BackofficeError::bad_request(e.body_text()))?;
            let mut input = Self::default();
            for (key, value) in pairs {
                input.insert(&key, Value::String(value));
            }
            return Ok(input);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| BackofficeError::bad_request(e.body_text()))?;
        Self::from_json(&bytes)
    }
}
