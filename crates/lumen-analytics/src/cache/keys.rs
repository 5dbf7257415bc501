//! Cache key generation.

use lumen_core::{Cursor, Filter, OrderBy, canonical_json};

/// Opciones de paginacion que forman parte de la key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOptions {
    pub limit: Option<usize>,
    pub order_by: Option<OrderBy>,
    pub start_after: Option<Cursor>,
}

/// Genera una key estable para una consulta.
///
/// Formato: `resource|f=<json>|l=<n>|o=<json>|s=<cursor>`, cada segmento
/// solo si esta presente. Los filtros se serializan como JSON canonico y
/// se ordenan, asi dos consultas estructuralmente iguales comparten key.
///
/// # Examples
///
/// ```
/// use lumen_analytics::cache::{KeyOptions, generate_key};
/// use lumen_core::{Filter, OrderBy};
///
/// let options = KeyOptions {
///     limit: Some(10),
///     order_by: Some(OrderBy::desc("created_at")),
///     start_after: None,
/// };
/// let key = generate_key("events", &[Filter::eq("kind", "click")], &options);
/// assert_eq!(
///     key,
///     r#"events|f=[{"field":"kind","operator":"==","value":"click"}]|l=10|o={"direction":"desc","field":"created_at"}"#
/// );
///
/// assert_eq!(generate_key("events", &[], &KeyOptions::default()), "events");
/// ```
pub fn generate_key(resource: &str, filters: &[Filter], options: &KeyOptions) -> String {
    let mut key = resource.to_string();

    if !filters.is_empty() {
        let mut parts: Vec<String> = filters.iter().map(canonical_json).collect();
        parts.sort();
        key.push_str("|f=[");
        key.push_str(&parts.join(","));
        key.push(']');
    }
    if let Some(limit) = options.limit {
        key.push_str(&format!("|l={}", limit));
    }
    if let Some(order) = &options.order_by {
        key.push_str("|o=");
        key.push_str(&canonical_json(order));
    }
    if let Some(cursor) = &options.start_after {
        key.push_str("|s=");
        key.push_str(cursor.as_str());
    }

    key
}

/// Agrega el segmento de scope de sanitizacion: `<key>|p=<scope>`.
///
/// Resultados sanitizados para scopes distintos nunca comparten key.
pub fn with_scope(mut key: String, scope: &str) -> String {
    key.push_str("|p=");
    key.push_str(scope);
    key
}

/// Retorna el segmento de recurso de una key.
pub fn resource_of(key: &str) -> &str {
    key.split('|').next().unwrap_or(key)
}
