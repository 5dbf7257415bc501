//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::cache::register_cache_metrics;
use super::fetch::register_fetch_metrics;

/// Registra las descripciones de todas las metricas.
pub fn register_metrics() {
    register_cache_metrics();
    register_fetch_metrics();
}

/// Inicializa el sistema de metricas y retorna el handle para renderizar.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    // Buckets para histogramas (en segundos)
    let handle = PrometheusBuilder::new()
        .set_buckets(&[
            0.0001, // 100 microsegundos
            0.001,  // 1 milisegundo
            0.005,  // 5 milisegundos
            0.01,   // 10 milisegundos
            0.05,   // 50 milisegundos
            0.1,    // 100 milisegundos
            0.5,    // 500 milisegundos
            1.0,    // 1 segundo
            5.0,    // 5 segundos
            30.0,   // timeout de query por defecto
        ])?
        .install_recorder()?;

    register_metrics();
    info!("Metrics system initialized");
    Ok(handle)
}
