use super::store::{ReferenceStore, StoreError};
use crate::core::models::region::{ReferenceRegion, RegionRole};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const SECRETORY_QUERY: &str = "\
MATCH (protein:Protein {name: $target})-[:HAS_DOMAIN]->(domain:Domain)
WHERE domain.type = 'secretory_functional' AND domain.sequence IS NOT NULL
RETURN protein.name + '_' + coalesce(domain.name, 'domain') AS id,
       domain.sequence AS sequence,
       coalesce(protein.species, 'human') AS species";

const BINDING_QUERY: &str = "\
MATCH (protein:Protein {name: $target})-[rel:BINDS_WITH]->(receptor:Receptor)
WHERE rel.binding_energy < $cutoff AND rel.high_affinity = true
WITH receptor, rel.binding_energy AS energy
ORDER BY energy ASC
LIMIT $limit
MATCH (receptor)-[:HAS_BINDING_SITE]->(site:BindingSite)
WHERE site.sequence IS NOT NULL
RETURN receptor.receptor_id + '_binding_site' AS id,
       site.sequence AS sequence,
       coalesce(receptor.species, 'human') AS species";

/// Connection and query parameters for a Neo4j instance reached over its HTTP API.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStoreSettings {
    pub uri: String,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub timeout: Duration,
    /// Only receptor interactions stronger (more negative) than this are followed.
    pub binding_energy_cutoff: f64,
    pub top_receptors: usize,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<TransactionError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    data: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TransactionError {
    code: String,
    message: String,
}

/// Live reference store backed by a graph database.
pub struct GraphStore {
    settings: GraphStoreSettings,
    client: Client,
}

impl GraphStore {
    pub fn new(settings: GraphStoreSettings) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| StoreError::Connection {
                endpoint: settings.uri.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/db/{}/tx/commit",
            self.settings.uri.trim_end_matches('/'),
            self.settings.database
        )
    }

    fn request_body(&self, target: &str) -> Value {
        json!({
            "statements": [
                {
                    "statement": SECRETORY_QUERY,
                    "parameters": { "target": target },
                },
                {
                    "statement": BINDING_QUERY,
                    "parameters": {
                        "target": target,
                        "cutoff": self.settings.binding_energy_cutoff,
                        "limit": self.settings.top_receptors,
                    },
                },
            ]
        })
    }

    fn classify(&self, error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            StoreError::Timeout {
                seconds: self.settings.timeout.as_secs(),
            }
        } else if error.is_decode() {
            StoreError::Decode(error.to_string())
        } else if error.is_status() {
            StoreError::Query(error.to_string())
        } else {
            StoreError::Connection {
                endpoint: self.settings.uri.clone(),
                message: error.to_string(),
            }
        }
    }
}

impl ReferenceStore for GraphStore {
    fn describe(&self) -> String {
        format!("graph store at {}", self.settings.uri)
    }

    fn query_regions(&self, target: &str) -> Result<Vec<ReferenceRegion>, StoreError> {
        let endpoint = self.endpoint();
        debug!(%endpoint, target, "Querying reference store.");

        let mut request = self.client.post(&endpoint).json(&self.request_body(target));
        if !self.settings.user.is_empty() {
            request = request.basic_auth(&self.settings.user, self.settings.password.as_ref());
        }

        let response: TransactionResponse = request
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| self.classify(e))?;

        regions_from_response(response)
    }
}

fn regions_from_response(
    response: TransactionResponse,
) -> Result<Vec<ReferenceRegion>, StoreError> {
    if let Some(error) = response.errors.first() {
        return Err(StoreError::Query(format!("{}: {}", error.code, error.message)));
    }

    let roles = [RegionRole::SecretoryDomain, RegionRole::ReceptorBinding];
    let mut regions = Vec::new();
    for (result, role) in response.results.into_iter().zip(roles) {
        for row in result.data {
            match region_from_row(&row.row, role) {
                Ok(region) => regions.push(region),
                Err(reason) => warn!(row = ?row.row, %reason, "Skipping unusable reference row."),
            }
        }
    }
    Ok(regions)
}

fn region_from_row(row: &[Value], role: RegionRole) -> Result<ReferenceRegion, String> {
    let text = |index: usize| {
        row.get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("column {index} is missing or not a string"))
    };
    let id = text(0)?;
    let sequence = text(1)?;
    let species = text(2)?;
    ReferenceRegion::new(id, sequence, role, species).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: Value) -> Result<Vec<ReferenceRegion>, StoreError> {
        regions_from_response(serde_json::from_value(body).unwrap())
    }

    fn settings(uri: &str) -> GraphStoreSettings {
        GraphStoreSettings {
            uri: uri.to_string(),
            database: "neo4j".to_string(),
            user: "neo4j".to_string(),
            password: None,
            timeout: Duration::from_millis(300),
            binding_energy_cutoff: -8.0,
            top_receptors: 3,
        }
    }

    #[test]
    fn rows_are_assigned_roles_by_statement_order() {
        let regions = parse(json!({
            "results": [
                { "columns": ["id", "sequence", "species"],
                  "data": [{ "row": ["THBS4_TSP", "KQEVVQIQFQ", "human"] }] },
                { "columns": ["id", "sequence", "species"],
                  "data": [{ "row": ["P00533_binding_site", "LLKGVPGNDV", "human"] },
                           { "row": ["P08581_binding_site", "VPGNDVPALN", "mouse"] }] }
            ],
            "errors": []
        }))
        .unwrap();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].role(), RegionRole::SecretoryDomain);
        assert_eq!(regions[1].role(), RegionRole::ReceptorBinding);
        assert_eq!(regions[2].species(), "mouse");
    }

    #[test]
    fn invalid_rows_are_skipped() {
        let regions = parse(json!({
            "results": [
                { "data": [{ "row": ["bad", "KQ*EV", "human"] },
                           { "row": ["missing", null, "human"] },
                           { "row": ["good", "KQEV", "human"] }] }
            ]
        }))
        .unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].id(), "good");
    }

    #[test]
    fn transaction_errors_become_query_errors() {
        let result = parse(json!({
            "results": [],
            "errors": [{ "code": "Neo.ClientError.Security.Unauthorized", "message": "denied" }]
        }));
        assert!(matches!(result, Err(StoreError::Query(m)) if m.contains("Unauthorized")));
    }

    #[test]
    fn unreachable_store_reports_error_instead_of_panicking() {
        let store = GraphStore::new(settings("http://127.0.0.1:9")).unwrap();
        assert!(store.query_regions("THBS4").is_err());
    }

    #[test]
    fn endpoint_joins_uri_and_database() {
        let store = GraphStore::new(settings("http://localhost:7474/")).unwrap();
        assert_eq!(store.endpoint(), "http://localhost:7474/db/neo4j/tx/commit");
    }
}
