//! Tipos de dominio para el reporte de consultas médicas.

mod config;
mod record;

pub use config::UpstreamConfig;
pub use record::{scalar_text, RawRecord};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Valor de filtro que significa "todos".
pub const ALL_SENTINEL: &str = "todos";

/// `true` si el filtro de entidad no restringe nada.
pub fn is_all_sentinel(value: &str) -> bool {
    value.is_empty() || value == ALL_SENTINEL
}

/// Parámetros de un reporte tal como los envía quien lo solicita.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportRequest {
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub fecha_fin: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub atleta_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub profesional_id: Option<String>,
}

impl ReportRequest {
    /// Fechas obligatorias del reporte, o `InvalidRequest` si falta alguna.
    pub fn required_dates(&self) -> Result<(&str, &str), ReportError> {
        match (self.fecha_inicio.as_deref(), self.fecha_fin.as_deref()) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(ReportError::InvalidRequest(
                "Las fechas de inicio y fin son requeridas".to_string(),
            )),
        }
    }

    /// Filtro de atleta activo (ni vacío ni "todos").
    pub fn athlete_filter(&self) -> Option<&str> {
        active_filter(self.atleta_id.as_deref())
    }

    /// Filtro de profesional activo (ni vacío ni "todos").
    pub fn professional_filter(&self) -> Option<&str> {
        active_filter(self.profesional_id.as_deref())
    }
}

fn active_filter(value: Option<&str>) -> Option<&str> {
    value.filter(|id| !is_all_sentinel(id))
}

/// Acepta IDs como cadena o número.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

/// Último segundo del día; el rango de fechas incluye el día final completo.
const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => panic!("23:59:59 es una hora válida"),
};

/// Criterios de filtrado ya interpretados.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_from: NaiveDateTime,
    /// Inclusivo, normalizado a las 23:59:59 del día.
    pub date_to: NaiveDateTime,
    pub athlete_id: Option<String>,
    pub professional_id: Option<String>,
}

impl FilterCriteria {
    /// No valida que `date_from <= date_to`; un rango invertido no deja pasar
    /// ninguna consulta fechada.
    pub fn new(
        date_from: NaiveDate,
        date_to: NaiveDate,
        athlete_id: Option<String>,
        professional_id: Option<String>,
    ) -> Self {
        Self {
            date_from: date_from.and_time(NaiveTime::MIN),
            date_to: date_to.and_time(END_OF_DAY),
            athlete_id: athlete_id.filter(|id| !is_all_sentinel(id)),
            professional_id: professional_id.filter(|id| !is_all_sentinel(id)),
        }
    }

    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        self.date_from <= moment && moment <= self.date_to
    }
}

/// Consulta lista para presentarse, con nombres resueltos desde los catálogos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedConsultation {
    pub id: String,
    #[serde(rename = "fecha")]
    pub formatted_date: String,
    #[serde(rename = "diagnostico")]
    pub diagnosis: String,
    #[serde(rename = "tratamiento")]
    pub treatment: String,
    #[serde(rename = "atleta_id")]
    pub athlete_id: Option<String>,
    #[serde(rename = "atleta_nombre")]
    pub athlete_name: String,
    #[serde(rename = "profesional_id")]
    pub professional_id: Option<String>,
    #[serde(rename = "profesional_nombre")]
    pub professional_name: String,
}

/// Consultas de un profesional dentro de un mes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfessionalCount {
    #[serde(rename = "profesional_id")]
    pub professional_id: String,
    #[serde(rename = "profesional_name")]
    pub professional_name: String,
    pub count: usize,
}

/// Histograma de un mes del periodo móvil de 12 meses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyBucket {
    #[serde(rename = "mes")]
    pub month_label: String,
    #[serde(rename = "mes_numero")]
    pub month_number: u32,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "profesionales")]
    pub per_professional: Vec<ProfessionalCount>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTotal {
    pub mes: String,
    pub total: usize,
}

/// Consultas del mes en curso por profesional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfessionalSummary {
    pub nombre: String,
    pub id: String,
    pub total: usize,
    pub especialidad: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedAthlete {
    pub nombre: String,
    pub id: String,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedDiagnosis {
    pub nombre: String,
    pub total: usize,
}

/// Resumen estadístico sobre el historial completo de consultas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationStatistics {
    pub total_consultas: usize,
    pub consultas_mes_actual: usize,
    pub profesionales_data: Vec<ProfessionalSummary>,
    pub monthly_data_by_profesional: Vec<MonthlyBucket>,
    pub monthly_data: Vec<MonthlyTotal>,
    pub top_atletas: Vec<RankedAthlete>,
    pub top_diagnosticos: Vec<RankedDiagnosis>,
}

/// Opción de los selectores de filtro.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterOption {
    pub id: Value,
    pub nombre: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterOptions {
    pub atletas: Vec<FilterOption>,
    pub profesionales: Vec<FilterOption>,
}

/// Conteo por nombre, en orden de aparición.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

/// Todo lo que necesita el generador de documentos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportData {
    pub generated_at: NaiveDateTime,
    /// `DD/MM/YYYY - DD/MM/YYYY`.
    pub period: String,
    pub athlete_label: Option<String>,
    pub professional_label: Option<String>,
    pub total: usize,
    pub per_professional: Vec<NameCount>,
    pub rows: Vec<EnrichedConsultation>,
    pub filename: String,
}

/// Error general del reporte.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Servicio de registros no disponible: {0}")]
    UpstreamUnavailable(String),
    #[error("Solicitud inválida: {0}")]
    InvalidRequest(String),
    #[error("Registro mal formado: {0}")]
    MalformedRecord(String),
    #[error("No se pudo generar el documento: {0}")]
    Render(String),
    #[error("Error interno: {0}")]
    Internal(String),
}

impl ReportError {
    /// Código HTTP equivalente.
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::UpstreamUnavailable(_) => 503,
            ReportError::InvalidRequest(_) => 400,
            ReportError::MalformedRecord(_) | ReportError::Render(_) | ReportError::Internal(_) => {
                500
            }
        }
    }

    fn detail(&self) -> &str {
        match self {
            ReportError::UpstreamUnavailable(detail)
            | ReportError::InvalidRequest(detail)
            | ReportError::MalformedRecord(detail)
            | ReportError::Render(detail)
            | ReportError::Internal(detail) => detail,
        }
    }
}

/// Cuerpo de error devuelto a quien llama.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub detalles: String,
}

impl From<&ReportError> for ErrorBody {
    fn from(err: &ReportError) -> Self {
        let error = match err {
            ReportError::UpstreamUnavailable(_) => "Error al conectar con los servicios externos",
            ReportError::InvalidRequest(_) => "Solicitud inválida",
            ReportError::MalformedRecord(_) | ReportError::Render(_) | ReportError::Internal(_) => {
                "Error interno del servidor"
            }
        };
        Self {
            error: error.to_string(),
            detalles: err.detail().to_string(),
        }
    }
}
