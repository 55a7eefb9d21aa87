//! Configuración del acceso al servicio de registros.

use std::env;

use serde::{Deserialize, Serialize};

/// Ubicación y tiempos de espera del servicio de registros.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub consultations_path: String,
    pub athletes_path: String,
    pub professionals_path: String,
    /// Segundos de espera para consultas y catálogos.
    pub timeout_secs: u64,
    /// Segundos de espera para el listado de opciones de filtro.
    pub options_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 8000,
            consultations_path: "/Modulos/Consultas/".to_string(),
            athletes_path: "/Catalogos/Atletas/".to_string(),
            professionals_path: "/Catalogos/Profesionales-Salud/".to_string(),
            timeout_secs: 10,
            options_timeout_secs: 5,
        }
    }
}

impl UpstreamConfig {
    /// Valores por defecto sobrescritos por `BACKEND_PROTOCOL`, `BACKEND_HOST`,
    /// `BACKEND_PORT` y `REPORT_UPSTREAM_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que [`UpstreamConfig::from_env`] con una fuente de variables arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut base = Self::default();
        if let Some(protocol) = lookup("BACKEND_PROTOCOL") {
            base.protocol = protocol;
        }
        if let Some(host) = lookup("BACKEND_HOST") {
            base.host = host;
        }
        if let Some(port) = lookup("BACKEND_PORT").and_then(|raw| raw.trim().parse().ok()) {
            base.port = port;
        }
        if let Some(secs) =
            lookup("REPORT_UPSTREAM_TIMEOUT_SECS").and_then(|raw| raw.trim().parse().ok())
        {
            base.timeout_secs = secs;
        }
        base
    }

    /// URL base; omite el puerto por defecto del protocolo.
    pub fn base_url(&self) -> String {
        let default_port = matches!(
            (self.protocol.as_str(), self.port),
            ("https", 443) | ("http", 80)
        );
        if default_port {
            format!("{}://{}", self.protocol, self.host)
        } else {
            format!("{}://{}:{}", self.protocol, self.host, self.port)
        }
    }

    pub fn consultations_url(&self) -> String {
        format!("{}{}", self.base_url(), self.consultations_path)
    }

    pub fn athletes_url(&self) -> String {
        format!("{}{}", self.base_url(), self.athletes_path)
    }

    pub fn professionals_url(&self) -> String {
        format!("{}{}", self.base_url(), self.professionals_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_is_elided() {
        let config = UpstreamConfig {
            protocol: "https".to_string(),
            host: "registros.example".to_string(),
            port: 443,
            ..UpstreamConfig::default()
        };
        assert_eq!(config.base_url(), "https://registros.example");
        assert_eq!(
            config.athletes_url(),
            "https://registros.example/Catalogos/Atletas/"
        );
    }

    #[test]
    fn non_default_port_is_kept() {
        let config = UpstreamConfig::default();
        assert_eq!(
            config.consultations_url(),
            "http://localhost:8000/Modulos/Consultas/"
        );
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = UpstreamConfig::from_lookup(|key| match key {
            "BACKEND_HOST" => Some("backend".to_string()),
            "BACKEND_PORT" => Some("80".to_string()),
            "REPORT_UPSTREAM_TIMEOUT_SECS" => Some("no-numero".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url(), "http://backend");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.options_timeout_secs, 5);
    }
}
