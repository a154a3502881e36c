//! Validation modules

pub mod fields;

pub use fields::{
    is_valid_email, validate_fields, FieldKind, FieldRule, FIELD_SCHEMA, FORBIDDEN_CHARACTERS,
    MAX_QUANTITY, MIN_QUANTITY,
};
