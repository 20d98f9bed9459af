//! Validation engine: trim, check, coerce and escape raw submissions.
//!
//! Every field of a form is checked and all failures are reported together.
//! Validation is pure; reference existence is the guard's business.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::{
    error::{AppError, AppResult, FieldError},
    models::{
        AuthorData, AuthorForm, BookData, BookForm, BookInstanceData, BookInstanceForm,
        BookInstanceStatus, EntityKind, GenreData, GenreForm, RecordId, Reference,
    },
};

pub const NAME_MAX: usize = 100;

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]*$").expect("alphanumeric pattern is valid"));

/// A raw submission the engine knows how to sanitize
pub trait Form: Validate + DeserializeOwned + Default + Sized {
    type Data;

    /// Field names in reporting order
    const FIELDS: &'static [&'static str];

    /// Fields that take a list of values as well as a single one
    const LIST_FIELDS: &'static [&'static str] = &[];

    /// Strip surrounding whitespace from every text input
    fn trim(self) -> Self;

    /// Well-formed foreign references carried by the submission
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Format checks and type coercion on trimmed input. Returns data only
    /// when no error was recorded for any field.
    fn coerce(self, errors: &mut FieldErrors) -> Option<Self::Data>;
}

/// A form as submitted, with the errors found while reading its JSON shape
#[derive(Debug)]
pub struct Submission<F> {
    pub form: F,
    pub shape_errors: Vec<FieldError>,
}

impl<F> From<F> for Submission<F> {
    fn from(form: F) -> Self {
        Self {
            form,
            shape_errors: Vec::new(),
        }
    }
}

impl<F: Form> Submission<F> {
    /// Read a raw JSON body field by field.
    ///
    /// Numbers and booleans are taken as their text, `null` as absent and
    /// unknown fields are ignored. A field holding an object (or a list,
    /// where one value is expected) is reported on that field; every other
    /// field still goes through the full pipeline.
    pub fn from_json(raw: Value) -> Self {
        let mut shape_errors = Vec::new();
        let mut fields = serde_json::Map::new();

        match raw {
            Value::Object(entries) => {
                for (name, value) in entries {
                    let Some(field) = F::FIELDS.iter().copied().find(|f| *f == name) else {
                        continue;
                    };
                    match text_value(value, F::LIST_FIELDS.contains(&field)) {
                        Ok(Some(value)) => {
                            fields.insert(name, value);
                        }
                        Ok(None) => {}
                        Err(message) => shape_errors.push(FieldError::new(field, message)),
                    }
                }
            }
            _ => shape_errors.push(FieldError::new("form", "Submission must be a JSON object")),
        }

        match serde_json::from_value(Value::Object(fields)) {
            Ok(form) => Self { form, shape_errors },
            Err(e) => {
                shape_errors.push(FieldError::new("form", format!("Malformed submission: {}", e)));
                Self {
                    form: F::default(),
                    shape_errors,
                }
            }
        }
    }
}

/// Text form of a JSON value; `None` when the value is null
fn text_value(value: Value, list: bool) -> Result<Option<Value>, &'static str> {
    match value {
        Value::Null => Ok(None),
        Value::String(_) => Ok(Some(value)),
        Value::Number(n) => Ok(Some(Value::String(n.to_string()))),
        Value::Bool(b) => Ok(Some(Value::String(b.to_string()))),
        Value::Array(items) if list => items
            .into_iter()
            .filter_map(|item| text_value(item, false).transpose())
            .collect::<Result<Vec<_>, _>>()
            .map(|items| Some(Value::Array(items))),
        Value::Array(_) => Err("Expected a single value, found a list"),
        Value::Object(_) => Err("Expected text, found an object"),
    }
}

/// Field errors collected across all rules of one form
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold in the failures reported by the declarative rules
    fn extend_rules(&mut self, rules: &ValidationErrors) {
        for (field, errs) in rules.field_errors() {
            let field: &str = &field;
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                self.add(field, message);
            }
        }
    }

    /// Shape errors replace whatever the rules said about the same field
    fn absorb_shape_errors(&mut self, shape_errors: Vec<FieldError>) {
        self.errors
            .retain(|e| !shape_errors.iter().any(|s| s.field == e.field));
        self.errors.extend(shape_errors);
    }

    fn into_sorted(mut self, order: &[&str]) -> Vec<FieldError> {
        self.errors
            .sort_by_key(|e| order.iter().position(|f| *f == e.field).unwrap_or(order.len()));
        self.errors
    }
}

/// Run a form through the full pipeline
pub fn sanitize<F: Form>(form: F) -> Result<F::Data, Vec<FieldError>> {
    sanitize_submission(Submission::from(form))
}

/// Run a submission through the full pipeline, keeping its shape errors
pub fn sanitize_submission<F: Form>(submission: Submission<F>) -> Result<F::Data, Vec<FieldError>> {
    let Submission { form, shape_errors } = submission;
    let form = form.trim();
    let mut errors = FieldErrors::default();
    if let Err(rules) = form.validate() {
        errors.extend_rules(&rules);
    }
    let data = form.coerce(&mut errors);
    errors.absorb_shape_errors(shape_errors);

    match data {
        Some(data) if errors.is_empty() => Ok(data),
        _ => Err(errors.into_sorted(F::FIELDS)),
    }
}

/// Sanitized submission of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Sanitized {
    Author(AuthorData),
    Book(BookData),
    BookInstance(BookInstanceData),
    Genre(GenreData),
}

/// Validate a raw JSON submission for the given kind
pub fn validate(kind: EntityKind, raw: Value) -> Result<Sanitized, Vec<FieldError>> {
    match kind {
        EntityKind::Author => {
            sanitize_submission(Submission::<AuthorForm>::from_json(raw)).map(Sanitized::Author)
        }
        EntityKind::Book => {
            sanitize_submission(Submission::<BookForm>::from_json(raw)).map(Sanitized::Book)
        }
        EntityKind::BookInstance => {
            sanitize_submission(Submission::<BookInstanceForm>::from_json(raw))
                .map(Sanitized::BookInstance)
        }
        EntityKind::Genre => {
            sanitize_submission(Submission::<GenreForm>::from_json(raw)).map(Sanitized::Genre)
        }
    }
}

/// Merge validation failures with reference resolution failures into one verdict
pub fn merge<D>(
    validated: Result<D, Vec<FieldError>>,
    reference_errors: Vec<FieldError>,
) -> AppResult<D> {
    match validated {
        Ok(data) if reference_errors.is_empty() => Ok(data),
        Ok(_) => Err(AppError::Validation(reference_errors)),
        Err(mut errors) => {
            errors.extend(reference_errors);
            Err(AppError::Validation(errors))
        }
    }
}

// =============================================================================
// Field rules
// =============================================================================

/// HTML-escape a value for safe rendering downstream.
///
/// Applied once at write time: stored text is already escaped, so clients
/// must send raw text back on replace rather than the escaped form they read.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

fn check_max(errors: &mut FieldErrors, field: &str, value: &str, max: usize, message: &str) {
    if value.chars().count() > max {
        errors.add(field, message);
    }
}

fn check_alphanumeric(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if !ALPHANUMERIC.is_match(value) {
        errors.add(field, message);
    }
}

/// Parse an ISO-8601 date or date-time into a UTC instant
pub fn parse_iso_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.and_utc())
}

/// Optional date: blank means absent, anything else must parse
fn optional_date(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    message: &str,
) -> Option<NaiveDate> {
    let value = value.filter(|v| !v.is_empty())?;
    match parse_iso_datetime(value) {
        Some(dt) => Some(dt.date_naive()),
        None => {
            errors.add(field, message);
            None
        }
    }
}

/// Required single reference; emptiness is reported by the length rule
fn reference_id(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> Option<RecordId> {
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, message);
            None
        }
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_option(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

// =============================================================================
// Forms
// =============================================================================

impl Form for AuthorForm {
    type Data = AuthorData;

    const FIELDS: &'static [&'static str] =
        &["first_name", "family_name", "date_of_birth", "date_of_death"];

    fn trim(mut self) -> Self {
        trim_in_place(&mut self.first_name);
        trim_in_place(&mut self.family_name);
        self.date_of_birth = trim_option(self.date_of_birth);
        self.date_of_death = trim_option(self.date_of_death);
        self
    }

    fn coerce(self, errors: &mut FieldErrors) -> Option<AuthorData> {
        check_max(errors, "first_name", &self.first_name, NAME_MAX, "First name must not exceed 100 characters.");
        check_alphanumeric(errors, "first_name", &self.first_name, "First name has non-alphanumeric characters.");
        check_max(errors, "family_name", &self.family_name, NAME_MAX, "Family name must not exceed 100 characters.");
        check_alphanumeric(errors, "family_name", &self.family_name, "Family name has non-alphanumeric characters.");
        let date_of_birth = optional_date(errors, "date_of_birth", self.date_of_birth.as_deref(), "Invalid date of birth");
        let date_of_death = optional_date(errors, "date_of_death", self.date_of_death.as_deref(), "Invalid date of death");

        if !errors.is_empty() {
            return None;
        }
        Some(AuthorData {
            first_name: escape(&self.first_name),
            family_name: escape(&self.family_name),
            date_of_birth,
            date_of_death,
        })
    }
}

impl Form for GenreForm {
    type Data = GenreData;

    const FIELDS: &'static [&'static str] = &["name"];

    fn trim(mut self) -> Self {
        trim_in_place(&mut self.name);
        self
    }

    fn coerce(self, errors: &mut FieldErrors) -> Option<GenreData> {
        check_max(errors, "name", &self.name, NAME_MAX, "Genre name must not exceed 100 characters");

        if !errors.is_empty() {
            return None;
        }
        Some(GenreData {
            name: escape(&self.name),
        })
    }
}

impl Form for BookForm {
    type Data = BookData;

    const FIELDS: &'static [&'static str] = &["title", "author", "summary", "isbn", "genre"];

    const LIST_FIELDS: &'static [&'static str] = &["genre"];

    /// Also drops blank genre entries
    fn trim(mut self) -> Self {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.author);
        trim_in_place(&mut self.summary);
        trim_in_place(&mut self.isbn);
        self.genre = self
            .genre
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        self
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = Vec::new();
        if let Ok(id) = self.author.parse() {
            references.push(Reference {
                field: "author",
                kind: EntityKind::Author,
                id,
            });
        }
        for id in self.genre.iter().filter_map(|g| g.parse::<RecordId>().ok()) {
            if !references.iter().any(|r| r.kind == EntityKind::Genre && r.id == id) {
                references.push(Reference {
                    field: "genre",
                    kind: EntityKind::Genre,
                    id,
                });
            }
        }
        references
    }

    fn coerce(self, errors: &mut FieldErrors) -> Option<BookData> {
        let author = reference_id(errors, "author", &self.author, "Author reference is not a valid id");

        let mut genre: Vec<RecordId> = Vec::with_capacity(self.genre.len());
        for raw in &self.genre {
            match raw.parse::<RecordId>() {
                Ok(id) if !genre.contains(&id) => genre.push(id),
                Ok(_) => {}
                Err(_) => errors.add(
                    "genre",
                    format!("Genre reference '{}' is not a valid id", escape(raw)),
                ),
            }
        }

        if !errors.is_empty() {
            return None;
        }
        Some(BookData {
            title: escape(&self.title),
            author: author?,
            summary: escape(&self.summary),
            isbn: escape(&self.isbn),
            genre,
        })
    }
}

impl Form for BookInstanceForm {
    type Data = BookInstanceData;

    const FIELDS: &'static [&'static str] = &["book", "imprint", "status", "due_back"];

    fn trim(mut self) -> Self {
        trim_in_place(&mut self.book);
        trim_in_place(&mut self.imprint);
        self.status = trim_option(self.status);
        self.due_back = trim_option(self.due_back);
        self
    }

    fn references(&self) -> Vec<Reference> {
        self.book
            .parse()
            .map(|id| Reference {
                field: "book",
                kind: EntityKind::Book,
                id,
            })
            .into_iter()
            .collect()
    }

    fn coerce(self, errors: &mut FieldErrors) -> Option<BookInstanceData> {
        let book = reference_id(errors, "book", &self.book, "Book reference is not a valid id");

        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            None => BookInstanceStatus::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.add(
                    "status",
                    "Status must be one of Available, Maintenance, Loaned, Reserve",
                );
                BookInstanceStatus::default()
            }),
        };

        let due_back = match self.due_back.as_deref().filter(|d| !d.is_empty()) {
            None => Utc::now(),
            Some(raw) => parse_iso_datetime(raw).unwrap_or_else(|| {
                errors.add("due_back", "Invalid date");
                Utc::now()
            }),
        };

        if !errors.is_empty() {
            return None;
        }
        Some(BookInstanceData {
            book: book?,
            imprint: escape(&self.imprint),
            status,
            due_back,
        })
    }
}
