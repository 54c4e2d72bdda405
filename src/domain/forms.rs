//! Canonical schema for each submission kind.
//!
//! Incoming bodies arrive as loose string maps (form-encoded, multipart or
//! JSON). Each kind picks its canonical fields out of that map, accepting a
//! few legacy field names, and reports every missing required field at once.

use crate::domain::model::Kind;
use crate::utils::error::{Result, SiteError};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Raw submitted fields, keyed by the name used on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    values: HashMap<String, String>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Trimmed, non-empty value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among `names`, together with the name that matched.
    pub fn first_of<'a>(&self, names: &[&'a str]) -> Option<(&'a str, &str)> {
        names
            .iter()
            .find_map(|name| self.get(name).map(|value| (*name, value)))
    }

    /// JSON bodies may carry numbers or booleans; they are kept as their text form.
    pub fn from_json(object: Map<String, Value>) -> Self {
        let values = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                Value::Null => None,
                Value::Array(_) | Value::Object(_) => None,
                other => Some((key, other.to_string())),
            })
            .collect();
        Self { values }
    }
}

impl From<HashMap<String, String>> for FormFields {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FormFields {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { values }
    }
}

/// One canonical field and the legacy keys that may carry it.
struct FieldDef {
    name: &'static str,
    required: bool,
    /// Accepted input names, in precedence order. Empty means just `name`.
    aliases: &'static [&'static str],
}

const fn required(name: &'static str) -> FieldDef {
    FieldDef {
        name,
        required: true,
        aliases: &[],
    }
}

const fn optional(name: &'static str) -> FieldDef {
    FieldDef {
        name,
        required: false,
        aliases: &[],
    }
}

const CONTACT: &[FieldDef] = &[
    required("name"),
    required("email"),
    required("subject"),
    required("message"),
    optional("phone"),
];

const FORUM: &[FieldDef] = &[
    required("firstName"),
    required("lastName"),
    FieldDef {
        name: "companyName",
        required: true,
        aliases: &["companyName", "Name of comppany", "company"],
    },
    required("email"),
    optional("phone"),
    optional("address"),
    optional("country"),
];

const MARKETPLACE: &[FieldDef] = &[
    required("businessName"),
    required("ownerName"),
    required("country"),
    required("email"),
    required("category"),
    required("description"),
];

// TODO: settle whether `name` on the membership form really means the
// Christian flag once the front-end form is updated; until then all three
// spellings are accepted.
const MEMBERSHIP: &[FieldDef] = &[
    required("firstName"),
    required("lastName"),
    required("email"),
    required("country"),
    optional("title"),
    optional("phone"),
    optional("address"),
    FieldDef {
        name: "isChristian",
        required: false,
        aliases: &["isChristian", "name", "christian"],
    },
    optional("intoBusiness"),
    optional("preferredGarment"),
];

const SCHOOL: &[FieldDef] = &[
    required("firstName"),
    required("lastName"),
    required("email"),
    optional("title"),
    optional("phone"),
    optional("address"),
    optional("country"),
];

const TOUR: &[FieldDef] = &[
    required("firstName"),
    required("lastName"),
    required("email"),
    required("destination"),
    optional("title"),
    optional("phone"),
    optional("address"),
    optional("country"),
    optional("dates"),
];

const PRODUCT: &[FieldDef] = &[
    required("name"),
    required("category"),
    optional("price"),
    optional("description"),
    optional("email"),
];

fn schema(kind: Kind) -> &'static [FieldDef] {
    match kind {
        Kind::Contact => CONTACT,
        Kind::Forum => FORUM,
        Kind::Marketplace => MARKETPLACE,
        Kind::Membership => MEMBERSHIP,
        Kind::School => SCHOOL,
        Kind::Tour => TOUR,
        Kind::Product => PRODUCT,
    }
}

/// Canonical field names for `kind`, in display order.
pub fn field_names(kind: Kind) -> impl Iterator<Item = &'static str> {
    schema(kind).iter().map(|spec| spec.name)
}

/// Picks the canonical fields for `kind` out of `input`.
///
/// Fails with `ValidationError` naming every missing required field.
pub fn parse_submission(kind: Kind, input: &FormFields) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    let mut missing = Vec::new();

    for spec in schema(kind) {
        let aliases: &[&str] = if spec.aliases.is_empty() {
            std::slice::from_ref(&spec.name)
        } else {
            spec.aliases
        };

        match input.first_of(aliases) {
            Some((matched, value)) => {
                if matched != spec.name {
                    tracing::debug!(
                        "{} field '{}' taken from legacy input name '{}'",
                        kind,
                        spec.name,
                        matched
                    );
                }
                fields.insert(spec.name.to_string(), Value::String(value.to_string()));
            }
            None if spec.required => missing.push(spec.name.to_string()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(SiteError::ValidationError { missing });
    }

    if kind == Kind::Product {
        normalize_product(&mut fields);
    }

    Ok(fields)
}

// 價格可解析成數字時存為數字，否則保留原字串
fn normalize_product(fields: &mut Map<String, Value>) {
    if let Some(Value::String(raw)) = fields.get("price") {
        if let Some(number) = raw.parse::<f64>().ok().and_then(number_value) {
            fields.insert("price".to_string(), Value::Number(number));
        }
    }
    fields.insert("approved".to_string(), Value::Bool(false));
}

fn number_value(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}
