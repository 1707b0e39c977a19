//! Database schema validation.
//!
//! The task database must carry five exactly-named properties with exact
//! types. Matching is strict string equality on names and type tags, with no
//! case folding or fuzzy matching. Option membership (e.g. the Priority choices)
//! is not validated, only the property type.

use super::client::DatabaseMeta;

/// Required property name → Notion type tag.
pub const REQUIRED_PROPERTIES: [(&str, &str); 5] = [
    ("Name", "title"),
    ("Start at", "date"),
    ("Finish at", "date"),
    ("Priority", "multi_select"),
    ("Progress", "status"),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Required property names absent from the database.
    pub missing: Vec<String>,
    /// Present but wrongly typed, as "name (expected: X, found: Y)".
    pub mismatched: Vec<String>,
}

impl SchemaReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty()
    }

    /// Itemized, user-facing summary of everything wrong with the schema.
    pub fn describe(&self) -> String {
        let mut message = String::from("Database schema issues found.");
        if !self.missing.is_empty() {
            message.push_str(&format!(" Missing properties: {}.", self.missing.join(", ")));
        }
        if !self.mismatched.is_empty() {
            message.push_str(&format!(
                " Incorrect property types: {}.",
                self.mismatched.join(", ")
            ));
        }
        message
    }
}

/// Compare the database's declared properties against the required shape.
/// Both report lists empty ⇔ the schema is acceptable.
pub fn validate_database_schema(database: &DatabaseMeta) -> SchemaReport {
    let mut report = SchemaReport::default();

    for (name, expected) in REQUIRED_PROPERTIES {
        match database.properties.get(name) {
            None => report.missing.push(name.to_string()),
            Some(property) if property.kind != expected => report.mismatched.push(format!(
                "{} (expected: {}, found: {})",
                name, expected, property.kind
            )),
            Some(_) => {}
        }
    }

    report
}
