use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Statuses below this value are open; everything else is closed.
pub const OPEN_STATUS_LIMIT: i64 = 4;

/// Open/closed classification derived from a ticket's numeric status.
///
/// The same value doubles as the `status` filter accepted by the API, so the
/// SQL predicate and the in-memory classification never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    Aberto,
    Fechado,
}

impl StatusClass {
    pub fn classify(status: i64) -> Self {
        if status < OPEN_STATUS_LIMIT {
            StatusClass::Aberto
        } else {
            StatusClass::Fechado
        }
    }

    /// SQL predicate on the `status` column selecting this class.
    pub fn predicate(&self) -> String {
        match self {
            StatusClass::Aberto => format!("status < {}", OPEN_STATUS_LIMIT),
            StatusClass::Fechado => format!("status > {}", OPEN_STATUS_LIMIT - 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Status deve ser 'aberto' ou 'fechado'")]
pub struct InvalidStatus(pub String);

impl FromStr for StatusClass {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aberto" => Ok(StatusClass::Aberto),
            "fechado" => Ok(StatusClass::Fechado),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}
