//! Wire representation of a schema and conversions to/from editable state
//!
//! The JSON field names here are the backend contract, including the
//! literal `"Fields in database table"` key carrying the comma-joined
//! field names. Row ids never cross the wire.

use serde::{Deserialize, Serialize};

use super::document::{
    AuthType, DbCredentials, KeyValue, LlmCredentials, RequestBody, SchemaDocument,
    SftpCredentials, TrainingPair,
};

/// The over-the-wire schema document, as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSchema {
    pub sftp: SftpCredentials,
    pub name: String,
    #[serde(rename = "Fields in database table", default)]
    pub fields: String,
    #[serde(rename = "trainingSets", default)]
    pub training_sets: Vec<TrainingPair>,
    #[serde(rename = "llmEndpoint", default)]
    pub llm_endpoint: Option<WireLlmEndpoint>,
    #[serde(rename = "dbCredentials", default)]
    pub db_credentials: Option<DbCredentials>,
}

/// LLM endpoint section of the wire document, with row ids stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLlmEndpoint {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "authType", default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub credentials: LlmCredentials,
    #[serde(default)]
    pub body: RequestBody,
    #[serde(rename = "extraHeaders", default)]
    pub extra_headers: Vec<KeyValue>,
    #[serde(rename = "extraQueryParams", default)]
    pub extra_query_params: Vec<KeyValue>,
}

impl SchemaDocument {
    /// Serialize for transport: strips row ids, joins trimmed field names
    /// into the single comma-joined string, and nulls out the optional
    /// sections when they do not apply. Callers validate first; this
    /// conversion never fails.
    pub fn to_wire(&self) -> WireSchema {
        let fields = self
            .fields
            .values()
            .map(|name| name.trim())
            .collect::<Vec<_>>()
            .join(",");

        let llm_endpoint = if self.llm_endpoint.url.trim().is_empty() {
            None
        } else {
            Some(WireLlmEndpoint {
                url: self.llm_endpoint.url.clone(),
                auth_type: self.llm_endpoint.auth_type,
                credentials: self.llm_endpoint.credentials.clone(),
                body: self.llm_endpoint.body.clone(),
                extra_headers: self.llm_endpoint.extra_headers.values().cloned().collect(),
                extra_query_params: self
                    .llm_endpoint
                    .extra_query_params
                    .values()
                    .cloned()
                    .collect(),
            })
        };

        let db_credentials = if self.db_credentials.is_empty() {
            None
        } else {
            Some(self.db_credentials.clone())
        };

        WireSchema {
            sftp: self.sftp.clone(),
            name: self.name.trim().to_string(),
            fields,
            training_sets: self.training_sets.values().cloned().collect(),
            llm_endpoint,
            db_credentials,
        }
    }

    /// Repopulate editable state from a retrieved wire document.
    ///
    /// Every list goes through its row list's reconcile, so rows get fresh
    /// session-scoped ids. Missing optional sections become empty defaults
    /// rather than staying absent. The live `sftp` credentials are the
    /// ones that performed the retrieval and are left untouched.
    pub fn apply_wire(&mut self, wire: WireSchema) {
        self.name = wire.name;

        let names: Vec<String> = if wire.fields.trim().is_empty() {
            Vec::new()
        } else {
            wire.fields
                .split(',')
                .map(|name| name.trim().to_string())
                .collect()
        };
        self.fields.reconcile(names);

        self.training_sets.reconcile(wire.training_sets);

        match wire.llm_endpoint {
            Some(endpoint) => {
                self.llm_endpoint.url = endpoint.url;
                self.llm_endpoint.auth_type = endpoint.auth_type;
                self.llm_endpoint.credentials = endpoint.credentials;
                self.llm_endpoint.body = endpoint.body;
                self.llm_endpoint.extra_headers.reconcile(endpoint.extra_headers);
                self.llm_endpoint
                    .extra_query_params
                    .reconcile(endpoint.extra_query_params);
            }
            None => {
                self.llm_endpoint.url.clear();
                self.llm_endpoint.auth_type = AuthType::None;
                self.llm_endpoint.credentials = LlmCredentials::default();
                self.llm_endpoint.body = RequestBody::default();
                self.llm_endpoint.extra_headers.reconcile(Vec::new());
                self.llm_endpoint.extra_query_params.reconcile(Vec::new());
            }
        }

        self.db_credentials = wire.db_credentials.unwrap_or_default();
    }
}
