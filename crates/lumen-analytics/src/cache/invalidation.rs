//! Cache invalidation with pattern matching support.

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use super::TtlCache;

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvalidationResult {
    /// Número de entries invalidadas.
    pub count: usize,
    /// Patrones aplicados.
    pub patterns: Vec<String>,
}

impl InvalidationResult {
    fn merge(&mut self, other: InvalidationResult) {
        self.count += other.count;
        self.patterns.extend(other.patterns);
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Serialize,
{
    /// Invalida todas las entradas de un recurso.
    ///
    /// Coincide con las keys cuyo segmento de recurso es exactamente
    /// `resource`, sin afectar recursos que solo comparten el prefijo.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lumen_analytics::cache::{CacheConfig, TtlCache};
    /// let cache: TtlCache<u32> = TtlCache::new(CacheConfig::default()).unwrap();
    /// cache.set("events|l=10", 1, None);
    /// cache.set("events", 2, None);
    /// cache.set("events_archive|l=10", 3, None);
    ///
    /// let result = cache.invalidate_resource("events");
    /// assert_eq!(result.count, 2);
    /// assert!(cache.has("events_archive|l=10"));
    /// ```
    pub fn invalidate_resource(&self, resource: &str) -> InvalidationResult {
        let pattern_str = format!(r"^{}(\||$)", regex::escape(resource));
        self.invalidate_by_pattern(&pattern_str)
    }

    /// Invalida entradas usando una expresion regular sobre la key completa.
    ///
    /// Un patron invalido no elimina nada.
    pub fn invalidate_by_pattern(&self, pattern_str: &str) -> InvalidationResult {
        let pattern = match Regex::new(pattern_str) {
            Ok(p) => p,
            Err(e) => {
                debug!(pattern = %pattern_str, error = %e, "Invalid invalidation pattern");
                return InvalidationResult {
                    count: 0,
                    patterns: vec![pattern_str.to_string()],
                };
            },
        };

        let count = self.invalidate_pattern(&pattern);

        info!(
            pattern = %pattern_str,
            count = count,
            "Cache entries invalidated by pattern"
        );

        InvalidationResult {
            count,
            patterns: vec![pattern_str.to_string()],
        }
    }

    /// Invalida usando multiples patrones.
    pub fn invalidate_by_patterns(&self, patterns: &[&str]) -> InvalidationResult {
        let mut total = InvalidationResult::default();
        for pattern in patterns {
            total.merge(self.invalidate_by_pattern(pattern));
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::super::CacheConfig;
    use super::*;

    fn populated() -> TtlCache<u32> {
        let cache = TtlCache::new(CacheConfig::default()).unwrap();
        cache.set("events", 1, None);
        cache.set("events|l=10", 2, None);
        cache.set(r#"events|f=[{"field":"kind"}]|l=5"#, 3, None);
        cache.set("events_archive|l=10", 4, None);
        cache.set("users|l=10", 5, None);
        cache
    }

    #[tokio::test]
    async fn test_invalidate_resource_is_exact() {
        let cache = populated();

        let result = cache.invalidate_resource("events");

        assert_eq!(result.count, 3);
        assert_eq!(result.patterns, vec![r"^events(\||$)".to_string()]);
        assert!(cache.has("events_archive|l=10"));
        assert!(cache.has("users|l=10"));
    }

    #[tokio::test]
    async fn test_resource_name_is_escaped() {
        let cache: TtlCache<u32> = TtlCache::new(CacheConfig::default()).unwrap();
        cache.set("a.b|l=1", 1, None);
        cache.set("axb|l=1", 2, None);

        assert_eq!(cache.invalidate_resource("a.b").count, 1);
        assert!(cache.has("axb|l=1"));
    }

    #[tokio::test]
    async fn test_invalid_pattern_removes_nothing() {
        let cache = populated();

        let result = cache.invalidate_by_pattern("(unclosed");

        assert_eq!(result.count, 0);
        assert_eq!(cache.len(), 5);
    }

    #[tokio::test]
    async fn test_multiple_patterns() {
        let cache = populated();

        let result = cache.invalidate_by_patterns(&["^users", r"\|l=10$"]);

        assert_eq!(result.count, 3);
        assert_eq!(result.patterns.len(), 2);
        assert_eq!(cache.len(), 2);
    }
}
