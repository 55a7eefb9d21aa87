//! Registro crudo devuelto por el servicio de registros.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registro sin esquema fijo (consulta, atleta o profesional).
///
/// Envuelve un `serde_json::Value` y expone accesos tipados; la presencia y
/// el nombre de los campos varían entre instancias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    /// Valor del campo, ignorando campos ausentes o `null`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Texto del campo cuando es una cadena.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    /// Forma textual del campo `id`.
    pub fn id_text(&self) -> Option<String> {
        self.field("id").and_then(scalar_text)
    }

    /// Identificador para mensajes de log.
    pub fn log_id(&self) -> String {
        self.id_text().unwrap_or_else(|| "desconocido".to_string())
    }
}

/// Forma textual de un escalar JSON; `None` para null, arreglos y objetos.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_fields_read_as_absent() {
        let record = RawRecord::new(json!({"fecha": null, "id": 4}));
        assert!(record.field("fecha").is_none());
        assert_eq!(record.id_text().as_deref(), Some("4"));
    }

    #[test]
    fn scalar_text_skips_composites() {
        assert_eq!(scalar_text(&json!("7")).as_deref(), Some("7"));
        assert_eq!(scalar_text(&json!(7)).as_deref(), Some("7"));
        assert_eq!(scalar_text(&json!(true)).as_deref(), Some("true"));
        assert!(scalar_text(&json!({"id": 1})).is_none());
        assert!(scalar_text(&json!([1])).is_none());
    }

    #[test]
    fn deserializes_transparently() {
        let records: Vec<RawRecord> = serde_json::from_str(r#"[{"id": 1}, "suelto"]"#).unwrap();
        assert!(records[0].is_object());
        assert!(!records[1].is_object());
        assert_eq!(records[1].log_id(), "desconocido");
    }
}
