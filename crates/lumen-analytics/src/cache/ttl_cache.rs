//! In-memory TTL cache with least-recently-accessed eviction.

use std::collections::HashMap;
use std::time::Duration;

use lumen_core::{ConfigError, Result};
use lumen_source::Sweep;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::CacheMetrics;

/// Tamaño asumido cuando el valor no se puede serializar.
pub const DEFAULT_SIZE_ESTIMATE: usize = 1024;

/// TTL maximo de una entrada. TTLs mayores se recortan a este valor.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Configuracion del cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximo numero de entries (default: 100)
    pub max_entries: usize,
    /// TTL por defecto en milisegundos (default: 300000 = 5 minutos)
    pub default_ttl_ms: u64,
    /// Intervalo del sweep de expirados en milisegundos (default: 60000)
    pub sweep_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            default_ttl_ms: 300_000,
            sweep_interval_ms: 60_000,
        }
    }
}

impl CacheConfig {
    /// Rechaza capacidades o duraciones en cero.
    pub fn validate(&self) -> Result<()> {
        ConfigError::ensure_positive("cache.max_entries", self.max_entries as u64)?;
        ConfigError::ensure_positive("cache.default_ttl_ms", self.default_ttl_ms)?;
        ConfigError::ensure_positive("cache.sweep_interval_ms", self.sweep_interval_ms)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Una entrada del cache con su metadata de acceso.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
    pub expires_at: Instant,
    pub last_accessed: Instant,
    pub access_count: u64,
    pub size_estimate: usize,
    /// Orden de acceso, desempata `last_accessed` iguales.
    access_seq: u64,
}

impl<V> CacheEntry<V> {
    /// Una entrada expira estrictamente despues de `expires_at`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Tiempo de vida restante.
    pub fn remaining_ttl(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

/// Snapshot de estadisticas del cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_entries: usize,
    /// Suma de `size_estimate` en bytes.
    pub total_size: usize,
    /// Entradas expiradas que el sweep aun no elimino.
    pub expired_entries: usize,
    /// `sum(access_count) / entries`
    pub hit_rate: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Memoria residente del proceso, si la plataforma la expone.
    pub memory_bytes: Option<u64>,
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    access_seq: u64,
}

impl<V> Inner<V> {
    fn next_seq(&mut self) -> u64 {
        self.access_seq += 1;
        self.access_seq
    }
}

/// Cache en memoria con expiracion por entrada y capacidad acotada.
///
/// Al llegar a `max_entries`, insertar una key nueva elimina la entrada
/// accedida hace mas tiempo. Las entradas expiradas se eliminan al
/// accederlas y en el sweep periodico (ver [`Sweep`]).
///
/// # Examples
///
/// ```
/// use lumen_analytics::cache::{CacheConfig, TtlCache};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache: TtlCache<Vec<u32>> = TtlCache::new(CacheConfig::default()).unwrap();
/// cache.set("events|l=10", vec![1, 2, 3], Some(Duration::from_secs(60)));
///
/// assert_eq!(cache.get("events|l=10"), Some(vec![1, 2, 3]));
/// assert!(cache.get("users").is_none());
/// # }
/// ```
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    config: CacheConfig,
    metrics: CacheMetrics,
}

impl<V> TtlCache<V>
where
    V: Clone + Serialize,
{
    /// Crea un nuevo cache con la configuracion dada.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(config.max_entries),
                access_seq: 0,
            }),
            config,
            metrics: CacheMetrics::new("records"),
        })
    }

    /// Retorna la configuracion.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Inserta un valor. Sin `ttl` usa el TTL por defecto.
    ///
    /// Si el cache esta lleno y la key es nueva, primero elimina la entrada
    /// accedida hace mas tiempo. Sobrescribir una key existente nunca evicta.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let now = Instant::now();
        let ttl = ttl.unwrap_or_else(|| self.config.default_ttl()).min(MAX_TTL);
        let size_estimate = estimate_size(&value);

        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.config.max_entries {
            if let Some(evicted) = oldest_key(&inner.entries) {
                inner.entries.remove(&evicted);
                self.metrics.record_eviction("capacity");
                debug!(key = %evicted, "Evicted least recently accessed entry");
            }
        }

        let access_seq = inner.next_seq();
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                expires_at: now + ttl,
                last_accessed: now,
                access_count: 0,
                size_estimate,
                access_seq,
            },
        );
        self.metrics.update_entry_count(inner.entries.len());
    }

    /// Obtiene un valor si existe y no expiro.
    ///
    /// Un hit incrementa `access_count` y refresca `last_accessed`.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let access_seq = inner.next_seq();

        match inner.entries.get_mut(key) {
            None => {
                self.metrics.record_miss();
                return None;
            },
            Some(entry) if !entry.is_expired(now) => {
                entry.access_count += 1;
                entry.last_accessed = now;
                entry.access_seq = access_seq;
                self.metrics.record_hit();
                return Some(entry.value.clone());
            },
            Some(_) => {},
        }

        inner.entries.remove(key);
        self.metrics.record_eviction("ttl");
        self.metrics.update_entry_count(inner.entries.len());
        self.metrics.record_miss();
        None
    }

    /// Retorna true si la key existe y no expiro, sin tocar la metadata de acceso.
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let expired = match inner.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            inner.entries.remove(key);
            self.metrics.record_eviction("ttl");
            self.metrics.update_entry_count(inner.entries.len());
        }
        !expired
    }

    /// Elimina una entrada. Retorna true si existia.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.entries.remove(key).is_some();
        if removed {
            self.metrics.record_eviction("manual");
            self.metrics.update_entry_count(inner.entries.len());
        }
        removed
    }

    /// Elimina todas las entradas.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        self.metrics.update_entry_count(0);
    }

    /// Elimina todas las entradas cuya key coincide con `pattern`.
    pub fn invalidate_pattern(&self, pattern: &Regex) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !pattern.is_match(key));
        let removed = before - inner.entries.len();

        for _ in 0..removed {
            self.metrics.record_eviction("manual");
        }
        self.metrics.update_entry_count(inner.entries.len());
        removed
    }

    /// Elimina la entrada accedida hace mas tiempo. Retorna su key.
    pub fn evict_oldest(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        let key = oldest_key(&inner.entries)?;
        inner.entries.remove(&key);
        self.metrics.record_eviction("capacity");
        self.metrics.update_entry_count(inner.entries.len());
        Some(key)
    }

    /// Elimina todas las entradas expiradas. Retorna cuantas elimino.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - inner.entries.len();

        for _ in 0..removed {
            self.metrics.record_eviction("ttl");
        }
        self.metrics.update_entry_count(inner.entries.len());
        removed
    }

    /// Retorna el numero de entradas, incluidas las expiradas no eliminadas.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot de las keys actuales.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Retorna la metadata de una entrada sin registrar un acceso.
    pub fn entry(&self, key: &str) -> Option<CacheEntry<V>> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Calcula las estadisticas actuales.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let inner = self.inner.lock();

        let total_entries = inner.entries.len();
        let mut total_size = 0;
        let mut expired_entries = 0;
        let mut accesses = 0u64;
        for entry in inner.entries.values() {
            total_size += entry.size_estimate;
            accesses += entry.access_count;
            if entry.is_expired(now) {
                expired_entries += 1;
            }
        }

        CacheStats {
            total_entries,
            total_size,
            expired_entries,
            hit_rate: if total_entries == 0 {
                0.0
            } else {
                accesses as f64 / total_entries as f64
            },
            hits: self.metrics.hits(),
            misses: self.metrics.misses(),
            evictions: self.metrics.evictions(),
            memory_bytes: resident_memory(),
        }
    }
}

impl<V> Sweep for TtlCache<V>
where
    V: Clone + Serialize + Send + Sync + 'static,
{
    fn sweep_name(&self) -> &str {
        "cache-expiry"
    }

    fn sweep(&self) -> usize {
        self.purge_expired()
    }
}

/// Busca la entrada con menor `last_accessed`; empates por orden de acceso.
fn oldest_key<V>(entries: &HashMap<String, CacheEntry<V>>) -> Option<String> {
    entries
        .iter()
        .min_by_key(|(_, entry)| (entry.last_accessed, entry.access_seq))
        .map(|(key, _)| key.clone())
}

fn estimate_size<V: Serialize>(value: &V) -> usize {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len())
        .unwrap_or(DEFAULT_SIZE_ESTIMATE)
}

/// Memoria residente del proceso (Linux: `/proc/self/statm`).
fn resident_memory() -> Option<u64> {
    const PAGE_SIZE: u64 = 4096;
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(pages * PAGE_SIZE)
}
