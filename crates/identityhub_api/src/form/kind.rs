use serde::Serialize;

use crate::models::FieldSchema;

/// How a classified field is rendered and serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Pick from the field's allowed values; serialized as `{id}`.
    Select,
    /// Free list of strings.
    ArrayOfString,
    /// `date` or `datetime`, passed through as the entered string.
    Date,
    Number,
    /// Multi-line string (textarea custom fields).
    Text,
    PlainString,
    /// Nothing IdentityHub can fill in (users, cascading selects, ...).
    Unsupported,
}

const TEXTAREA_CUSTOM_TYPE: &str = "textarea";

impl FieldKind {
    /// Derives the kind with select taking precedence over the schema type.
    pub fn detect(has_options: bool, schema: Option<&FieldSchema>) -> Self {
        if has_options {
            return FieldKind::Select;
        }
        let Some(schema) = schema else {
            return FieldKind::Unsupported;
        };

        match schema.field_type.to_ascii_lowercase().as_str() {
            "string" => {
                let multiline = schema
                    .custom
                    .as_deref()
                    .is_some_and(|custom| custom.to_ascii_lowercase().ends_with(TEXTAREA_CUSTOM_TYPE));
                if multiline {
                    FieldKind::Text
                } else {
                    FieldKind::PlainString
                }
            }
            "number" => FieldKind::Number,
            "date" | "datetime" => FieldKind::Date,
            "array"
                if schema
                    .items
                    .as_deref()
                    .is_some_and(|items| items.eq_ignore_ascii_case("string")) =>
            {
                FieldKind::ArrayOfString
            }
            _ => FieldKind::Unsupported,
        }
    }

    pub fn is_supported(self) -> bool {
        self != FieldKind::Unsupported
    }
}
