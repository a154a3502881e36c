//! Form field validation
//!
//! Checks every textual field of a submission against [`FIELD_SCHEMA`]:
//! - Fields are visited in schema order and every violation is collected
//! - Values are trimmed; whitespace-only counts as missing
//! - Markup characters (`< > " ' &`) are rejected in every field
//! - Control characters are rejected, except line breaks and tabs in
//!   multi-line fields
//! - Optional fields that were not submitted become empty strings

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{FieldViolation, Material, SubmissionFields};

/// Smallest accepted quantity
pub const MIN_QUANTITY: u32 = 1;

/// Largest accepted quantity
pub const MAX_QUANTITY: u32 = 100_000;

/// Characters that would let a value inject markup into the notification body
pub const FORBIDDEN_CHARACTERS: &[char] = &['<', '>', '"', '\'', '&'];

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is a valid regex")
});

static DIGITS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits pattern is a valid regex"));

/// Whether `value` has the `local@domain.tld` shape accepted for `email`.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// How a field's value is interpreted once the shared text checks pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    MultilineText,
    Email,
    Material,
    Quantity,
    Date,
}

/// One entry of the field schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: usize,
}

/// The submission form, in declaration order.
pub const FIELD_SCHEMA: &[FieldRule] = &[
    FieldRule {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
        required: true,
        max_length: 100,
    },
    FieldRule {
        name: "email",
        label: "Email",
        kind: FieldKind::Email,
        required: true,
        max_length: 254,
    },
    FieldRule {
        name: "projectName",
        label: "Project name",
        kind: FieldKind::Text,
        required: true,
        max_length: 200,
    },
    FieldRule {
        name: "material",
        label: "Material",
        kind: FieldKind::Material,
        required: true,
        max_length: 32,
    },
    FieldRule {
        name: "quantity",
        label: "Quantity",
        kind: FieldKind::Quantity,
        required: true,
        max_length: 16,
    },
    FieldRule {
        name: "surfaceTreatment",
        label: "Surface treatment",
        kind: FieldKind::Text,
        required: false,
        max_length: 100,
    },
    FieldRule {
        name: "tolerance",
        label: "Tolerance",
        kind: FieldKind::MultilineText,
        required: false,
        max_length: 500,
    },
    FieldRule {
        name: "deliveryDate",
        label: "Delivery date",
        kind: FieldKind::Date,
        required: false,
        max_length: 10,
    },
    FieldRule {
        name: "destination",
        label: "Destination",
        kind: FieldKind::Text,
        required: false,
        max_length: 200,
    },
    FieldRule {
        name: "additionalNotes",
        label: "Additional notes",
        kind: FieldKind::MultilineText,
        required: false,
        max_length: 2000,
    },
];

/// A value that passed its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    Material(Material),
    Quantity(u32),
    Date(Option<NaiveDate>),
}

impl FieldRule {
    /// Validate one raw value against this rule.
    fn check(&self, raw: &str) -> Result<FieldValue, String> {
        let value = raw.trim();

        if value.is_empty() {
            if self.required {
                return Err(format!("{} is required", self.label));
            }
            return Ok(match self.kind {
                FieldKind::Date => FieldValue::Date(None),
                _ => FieldValue::Text(String::new()),
            });
        }

        if value.chars().count() > self.max_length {
            return Err(format!(
                "{} must be at most {} characters",
                self.label, self.max_length
            ));
        }

        if value.contains(FORBIDDEN_CHARACTERS) || self.has_disallowed_control(value) {
            return Err(format!("{} contains invalid characters", self.label));
        }

        match self.kind {
            FieldKind::Text | FieldKind::MultilineText => Ok(FieldValue::Text(value.to_string())),
            FieldKind::Email => {
                if is_valid_email(value) {
                    Ok(FieldValue::Text(value.to_string()))
                } else {
                    Err("Invalid email address".to_string())
                }
            }
            FieldKind::Material => Material::from_token(value)
                .map(FieldValue::Material)
                .ok_or_else(|| {
                    let allowed: Vec<&str> = Material::ALL.iter().map(|m| m.as_str()).collect();
                    format!("{} must be one of: {}", self.label, allowed.join(", "))
                }),
            FieldKind::Quantity => parse_quantity(value)
                .map(FieldValue::Quantity)
                .map_err(|msg| format!("{} {}", self.label, msg)),
            FieldKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|date| FieldValue::Date(Some(date)))
                .map_err(|_| format!("{} must be a valid date (YYYY-MM-DD)", self.label)),
        }
    }

    fn has_disallowed_control(&self, value: &str) -> bool {
        let multiline = self.kind == FieldKind::MultilineText;
        value
            .chars()
            .any(|c| c.is_control() && !(multiline && matches!(c, '\n' | '\r' | '\t')))
    }
}

fn parse_quantity(value: &str) -> Result<u32, &'static str> {
    if !DIGITS_PATTERN.is_match(value) {
        return Err("must be a whole number");
    }
    // Digit strings too long for u32 are out of range as well
    match value.parse::<u32>() {
        Ok(n) if (MIN_QUANTITY..=MAX_QUANTITY).contains(&n) => Ok(n),
        _ => Err("must be between 1 and 100000"),
    }
}

/// Values that passed validation, keyed by field name.
#[derive(Default)]
struct ValidatedValues(HashMap<&'static str, FieldValue>);

impl ValidatedValues {
    fn text(&mut self, name: &str) -> String {
        match self.0.remove(name) {
            Some(FieldValue::Text(text)) => text,
            _ => String::new(),
        }
    }

    fn material(&mut self, name: &str) -> Option<Material> {
        match self.0.remove(name) {
            Some(FieldValue::Material(material)) => Some(material),
            _ => None,
        }
    }

    fn quantity(&mut self, name: &str) -> Option<u32> {
        match self.0.remove(name) {
            Some(FieldValue::Quantity(quantity)) => Some(quantity),
            _ => None,
        }
    }

    fn date(&mut self, name: &str) -> Option<NaiveDate> {
        match self.0.remove(name) {
            Some(FieldValue::Date(date)) => date,
            _ => None,
        }
    }
}

/// Validate the textual fields of a submission.
///
/// Returns the typed field set, or every violation found, in schema order.
pub fn validate_fields(
    fields: &HashMap<String, String>,
) -> Result<SubmissionFields, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    let mut values = ValidatedValues::default();

    for rule in FIELD_SCHEMA {
        let raw = fields.get(rule.name).map(String::as_str).unwrap_or("");
        match rule.check(raw) {
            Ok(value) => {
                values.0.insert(rule.name, value);
            }
            Err(message) => violations.push(FieldViolation::new(rule.name, message)),
        }
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    let (Some(material), Some(quantity)) = (values.material("material"), values.quantity("quantity"))
    else {
        return Err(vec![FieldViolation::new(
            "material",
            "Material and quantity are required",
        )]);
    };

    Ok(SubmissionFields {
        name: values.text("name"),
        email: values.text("email"),
        project_name: values.text("projectName"),
        material,
        quantity,
        surface_treatment: values.text("surfaceTreatment"),
        tolerance: values.text("tolerance"),
        delivery_date: values.date("deliveryDate"),
        destination: values.text("destination"),
        additional_notes: values.text("additionalNotes"),
    })
}
