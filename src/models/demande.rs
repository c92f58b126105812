// ============================================================================
// Structure : Demande
// ============================================================================
// Une demande du back-office (échange ou levée de fonds)
//
// CONCEPTS RUST :
// 1. #[serde(try_from = ...)] : désérialisation en deux temps
//    - serde lit d'abord un objet JSON générique (Map)
//    - TryFrom le convertit en Demande en validant les champs
// 2. Option<T> : client / responsable / date peuvent manquer
// 3. BTreeMap : conserve les champs non interprétés pour la vue détail
// ============================================================================

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::DemandeState;

/// Clés acceptées pour l'identifiant selon le backend
/// - "codeEchange" : service des échanges
/// - "codeLV" : service des levées de fonds
const ID_KEYS: [&str; 3] = ["id", "codeEchange", "codeLV"];

/// Client rattaché à une demande
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub code: String,
}

/// Responsable (commercial) rattaché à une demande
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Responsible {
    pub code: String,
}

/// Une demande telle que renvoyée par le backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Demande {
    /// Identifiant (codeEchange / codeLV)
    pub id: i64,

    /// État courant
    pub state: DemandeState,

    /// Date de création (None si absente ou illisible)
    pub created_at: Option<DateTime<Utc>>,

    /// Client (None si absent)
    pub client: Option<Client>,

    /// Responsable (None si absent)
    pub responsible: Option<Responsible>,

    /// Indicateur "livrer"
    pub deliverable: bool,

    /// Tous les autres champs, affichés tels quels dans la vue détail
    pub extra: BTreeMap<String, Value>,
}

impl Demande {
    /// Crée une demande minimale (utile pour les tests et le mode hors-ligne)
    pub fn new(id: i64, state: DemandeState) -> Self {
        Self {
            id,
            state,
            created_at: None,
            client: None,
            responsible: None,
            deliverable: false,
            extra: BTreeMap::new(),
        }
    }

    /// Builder : ajoute un client
    pub fn with_client(mut self, code: impl Into<String>) -> Self {
        self.client = Some(Client { code: code.into() });
        self
    }

    /// Builder : ajoute un responsable
    pub fn with_responsible(mut self, code: impl Into<String>) -> Self {
        self.responsible = Some(Responsible { code: code.into() });
        self
    }

    /// Builder : fixe la date de création
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Code client, s'il existe
    ///
    /// CONCEPT RUST : Option::as_ref + map
    /// - &Option<Client> -> Option<&Client> -> Option<&str>
    pub fn client_code(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.code.as_str())
    }

    /// Code responsable, s'il existe
    pub fn responsible_code(&self) -> Option<&str> {
        self.responsible.as_ref().map(|r| r.code.as_str())
    }

    /// Jour de création au format "YYYY-MM-DD" (UTC)
    pub fn created_day(&self) -> Option<String> {
        self.created_at
            .map(|date| date.format("%Y-%m-%d").to_string())
    }
}

// ============================================================================
// Conversion JSON -> Demande
// ============================================================================

impl TryFrom<Map<String, Value>> for Demande {
    type Error = anyhow::Error;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self> {
        // Identifiant : première clé connue présente
        let id = ID_KEYS
            .iter()
            .find_map(|key| fields.remove(*key))
            .context("Demande sans identifiant")?;
        let id = id
            .as_i64()
            .ok_or_else(|| anyhow!("Identifiant non numérique : {}", id))?;

        let state = fields
            .remove("state")
            .with_context(|| format!("Demande {} sans état", id))?;
        let state: DemandeState = serde_json::from_value(state)
            .with_context(|| format!("État invalide pour la demande {}", id))?;

        let created_at = match fields.remove("createdAt") {
            None | Some(Value::Null) => None,
            Some(value) => parse_timestamp(&value),
        };

        let client = fields
            .remove("client")
            .and_then(|value| nested_code(&value, &["code"]))
            .map(|code| Client { code });

        let responsible = fields
            .remove("responsable")
            .and_then(|value| nested_code(&value, &["codeResponsable", "code"]))
            .map(|code| Responsible { code });

        let deliverable = match fields.remove("livrer") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => flag,
            Some(other) => bail!("Champ livrer invalide pour la demande {} : {}", id, other),
        };

        Ok(Self {
            id,
            state,
            created_at,
            client,
            responsible,
            deliverable,
            extra: fields.into_iter().collect(),
        })
    }
}

/// Extrait le code d'un sous-objet ({"code": "..."}), null-safe
fn nested_code(value: &Value, keys: &[&str]) -> Option<String> {
    let object = value.as_object()?;
    keys.iter()
        .find_map(|key| object.get(*key))
        .and_then(|code| match code {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Parse une date de création
///
/// Formats acceptés :
/// - RFC 3339 ("2024-01-01T10:00:00Z", "2024-01-01T10:00:00.000+01:00")
/// - date-heure sans fuseau, interprétée en UTC ("2024-01-01T10:00:00")
/// - date seule ("2024-01-01")
/// - timestamp en millisecondes
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            if let Ok(date) = DateTime::parse_from_rfc3339(s) {
                return Some(date.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
