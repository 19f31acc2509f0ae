//! OCM search expressions
//!
//! OCM list endpoints accept an SQL-like `search` parameter. String literals
//! are single quoted; embedded quotes are doubled.

/// Quote a string literal
#[must_use]
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Labels whose key starts with `prefix`
#[must_use]
pub fn label_key_prefix(prefix: &str) -> String {
    format!("key like {}", quote(&format!("{prefix}%")))
}

/// Labels of an organization whose key starts with `prefix`
#[must_use]
pub fn organization_label_key_prefix(organization_id: &str, prefix: &str) -> String {
    format!(
        "organization_id = {} and {}",
        quote(organization_id),
        label_key_prefix(prefix)
    )
}

/// Active managed subscriptions of an organization, optionally by display name
#[must_use]
pub fn active_subscriptions(organization_id: &str, display_name: Option<&str>) -> String {
    let mut search = format!(
        "organization_id = {} and managed = true and status in ('Active', 'Reserved')",
        quote(organization_id)
    );
    if let Some(name) = display_name {
        search.push_str(&format!(" and display_name = {}", quote(name)));
    }
    search
}

/// Ready managed clusters of an organization
#[must_use]
pub fn ready_clusters(organization_id: &str) -> String {
    format!(
        "organization.id = {} and managed = 'true' and state = 'ready'",
        quote(organization_id)
    )
}
