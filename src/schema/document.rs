//! Editable schema document and its validation rules

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::rows::RowList;

/// SFTP connection details. The port stays a plain string until transport
/// time; the backend owns parsing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SftpCredentials {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub port: String,
}

impl SftpCredentials {
    /// All four sub-fields filled in. Required before any save/retrieve.
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.trim().is_empty()
            && !self.port.trim().is_empty()
    }
}

/// An input/output example pair attached to a schema for model guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingPair {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

/// A key/value entry for extra headers and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// How the user-described LLM endpoint authenticates.
///
/// The serde renames are the wire contract; the backend stores the same
/// strings the original form's dropdown produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthType {
    #[default]
    None,
    #[serde(rename = "Authorization Header")]
    AuthorizationHeader,
    #[serde(rename = "Client ID/Secret")]
    ClientIdSecret,
}

impl AuthType {
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "header" | "authorization-header" => Ok(Self::AuthorizationHeader),
            "client" | "client-id-secret" => Ok(Self::ClientIdSecret),
            _ => anyhow::bail!("unknown auth type: {} (expected none, header, or client)", s),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::AuthorizationHeader => "Authorization Header",
            Self::ClientIdSecret => "Client ID/Secret",
        }
    }
}

/// Auth material for the LLM endpoint. Which fields matter depends on
/// [`AuthType`]; the others are carried but unused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmCredentials {
    #[serde(rename = "authHeader", default)]
    pub auth_header: String,
    #[serde(rename = "clientId", default)]
    pub client_id: String,
    #[serde(rename = "clientSecret", default)]
    pub client_secret: String,
}

/// Request/response template for the LLM endpoint. `sample_json` is the
/// body template as text; the two keys are dotted/indexed paths into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(rename = "sampleJson", default)]
    pub sample_json: String,
    #[serde(rename = "queryKey", default)]
    pub query_key: String,
    #[serde(rename = "responseKey", default)]
    pub response_key: String,
}

/// Optional LLM endpoint descriptor. Always present in editable state;
/// treated as absent when `url` is blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmEndpoint {
    pub url: String,
    pub auth_type: AuthType,
    pub credentials: LlmCredentials,
    pub body: RequestBody,
    pub extra_headers: RowList<KeyValue>,
    pub extra_query_params: RowList<KeyValue>,
}

/// Optional database connection. All-or-nothing: either every field is
/// filled or every field is blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbCredentials {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
}

impl DbCredentials {
    fn fields(&self) -> [&str; 5] {
        [
            &self.host,
            &self.port,
            &self.user,
            &self.password,
            &self.database,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|f| f.trim().is_empty())
    }

    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(|f| !f.trim().is_empty())
    }
}

/// A validation failure. Variants are ordered to match the invariant chain
/// in [`SchemaDocument::validate`]; the message texts mirror what the user
/// sees as the single-line status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("schema name must not be empty")]
    EmptyName,
    #[error("at least one schema field is required")]
    NoFields,
    #[error("all schema field names must be filled out")]
    BlankFieldName,
    #[error("schema field names must be unique: '{0}' appears more than once")]
    DuplicateFieldName(String),
    #[error("all training set input and output fields must be filled")]
    IncompleteTrainingSet,
    #[error("authorization header value is required")]
    MissingAuthHeader,
    #[error("client id and client secret are required")]
    MissingClientCredentials,
    #[error("all extra headers must have a key and a value")]
    IncompleteHeader,
    #[error("all extra query parameters must have a key and a value")]
    IncompleteQueryParam,
    #[error("query key is required when a sample body is set")]
    MissingQueryKey,
    #[error("response key is required when a sample body is set")]
    MissingResponseKey,
    #[error("database connection fields must be all filled or all empty")]
    PartialDbCredentials,
}

/// The editable schema document: the canonical in-session state that CLI
/// edits mutate, validated and serialized on save, repopulated on retrieve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub sftp: SftpCredentials,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: RowList<String>,
    #[serde(default)]
    pub training_sets: RowList<TrainingPair>,
    #[serde(default)]
    pub llm_endpoint: LlmEndpoint,
    #[serde(default)]
    pub db_credentials: DbCredentials,
}

impl SchemaDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Check every invariant in order and report the first violation.
    ///
    /// The ordering is a contract: callers rely on seeing the most
    /// relevant error first (a missing name before a missing field list,
    /// endpoint problems before database ones).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if self.fields.is_empty() {
            return Err(ValidationError::NoFields);
        }
        if self.fields.values().any(|name| name.trim().is_empty()) {
            return Err(ValidationError::BlankFieldName);
        }
        let mut seen = HashSet::new();
        for name in self.fields.values() {
            if !seen.insert(name.trim()) {
                return Err(ValidationError::DuplicateFieldName(name.trim().to_string()));
            }
        }

        let incomplete = |set: &TrainingPair| {
            set.input.trim().is_empty() || set.output.trim().is_empty()
        };
        if self.training_sets.values().any(incomplete) {
            return Err(ValidationError::IncompleteTrainingSet);
        }

        if !self.llm_endpoint.url.trim().is_empty() {
            let creds = &self.llm_endpoint.credentials;
            match self.llm_endpoint.auth_type {
                AuthType::AuthorizationHeader if creds.auth_header.trim().is_empty() => {
                    return Err(ValidationError::MissingAuthHeader);
                }
                AuthType::ClientIdSecret
                    if creds.client_id.trim().is_empty()
                        || creds.client_secret.trim().is_empty() =>
                {
                    return Err(ValidationError::MissingClientCredentials);
                }
                _ => {}
            }

            let blank = |kv: &KeyValue| kv.key.trim().is_empty() || kv.value.trim().is_empty();
            if self.llm_endpoint.extra_headers.values().any(blank) {
                return Err(ValidationError::IncompleteHeader);
            }
            if self.llm_endpoint.extra_query_params.values().any(blank) {
                return Err(ValidationError::IncompleteQueryParam);
            }

            let body = &self.llm_endpoint.body;
            if !body.sample_json.trim().is_empty() {
                if body.query_key.trim().is_empty() {
                    return Err(ValidationError::MissingQueryKey);
                }
                if body.response_key.trim().is_empty() {
                    return Err(ValidationError::MissingResponseKey);
                }
            }
        }

        if !self.db_credentials.is_empty() && !self.db_credentials.is_complete() {
            return Err(ValidationError::PartialDbCredentials);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_doc() -> SchemaDocument {
        let mut doc = SchemaDocument::new("Orders");
        doc.fields.add("id".to_string());
        doc.fields.add("total".to_string());
        doc
    }

    #[test]
    fn minimal_document_validates() {
        assert_eq!(valid_doc().validate(), Ok(()));
    }

    #[test]
    fn blank_name_is_first_violation() {
        // No name and no fields: the name violation wins.
        let doc = SchemaDocument::default();
        assert_eq!(doc.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn whitespace_only_name_is_blank() {
        let mut doc = valid_doc();
        doc.name = "   ".to_string();
        assert_eq!(doc.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn empty_field_list_is_rejected() {
        let doc = SchemaDocument::new("Orders");
        assert_eq!(doc.validate(), Err(ValidationError::NoFields));
    }

    #[test]
    fn blank_field_name_is_rejected() {
        let mut doc = valid_doc();
        doc.fields.add("  ".to_string());
        assert_eq!(doc.validate(), Err(ValidationError::BlankFieldName));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let mut doc = valid_doc();
        doc.fields.add("id".to_string());
        assert_eq!(
            doc.validate(),
            Err(ValidationError::DuplicateFieldName("id".to_string()))
        );
    }

    #[test]
    fn duplicates_compare_on_trimmed_names() {
        let mut doc = valid_doc();
        doc.fields.add(" id ".to_string());
        assert_eq!(
            doc.validate(),
            Err(ValidationError::DuplicateFieldName("id".to_string()))
        );
    }

    #[test]
    fn field_names_are_case_sensitive() {
        let mut doc = valid_doc();
        doc.fields.add("ID".to_string());
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn half_filled_training_set_is_rejected() {
        let mut doc = valid_doc();
        doc.training_sets.add(TrainingPair {
            input: "show totals".to_string(),
            output: String::new(),
        });
        assert_eq!(doc.validate(), Err(ValidationError::IncompleteTrainingSet));
    }

    #[test]
    fn auth_header_required_when_selected() {
        let mut doc = valid_doc();
        doc.llm_endpoint.url = "https://llm.example.com".to_string();
        doc.llm_endpoint.auth_type = AuthType::AuthorizationHeader;
        assert_eq!(doc.validate(), Err(ValidationError::MissingAuthHeader));

        doc.llm_endpoint.credentials.auth_header = "Bearer token".to_string();
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn client_credentials_required_when_selected() {
        let mut doc = valid_doc();
        doc.llm_endpoint.url = "https://llm.example.com".to_string();
        doc.llm_endpoint.auth_type = AuthType::ClientIdSecret;
        doc.llm_endpoint.credentials.client_id = "abc".to_string();
        assert_eq!(
            doc.validate(),
            Err(ValidationError::MissingClientCredentials)
        );
    }

    #[test]
    fn endpoint_checks_skipped_when_url_blank() {
        // Auth type and half-filled headers are irrelevant without a url.
        let mut doc = valid_doc();
        doc.llm_endpoint.auth_type = AuthType::AuthorizationHeader;
        doc.llm_endpoint.extra_headers.add(KeyValue {
            key: "X-Thing".to_string(),
            value: String::new(),
        });
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn half_filled_header_is_rejected() {
        let mut doc = valid_doc();
        doc.llm_endpoint.url = "https://llm.example.com".to_string();
        doc.llm_endpoint.extra_headers.add(KeyValue {
            key: "X-Thing".to_string(),
            value: String::new(),
        });
        assert_eq!(doc.validate(), Err(ValidationError::IncompleteHeader));
    }

    #[test]
    fn half_filled_query_param_is_rejected() {
        let mut doc = valid_doc();
        doc.llm_endpoint.url = "https://llm.example.com".to_string();
        doc.llm_endpoint.extra_query_params.add(KeyValue {
            key: String::new(),
            value: "v1".to_string(),
        });
        assert_eq!(doc.validate(), Err(ValidationError::IncompleteQueryParam));
    }

    #[test]
    fn sample_body_requires_both_keys() {
        let mut doc = valid_doc();
        doc.llm_endpoint.url = "https://llm.example.com".to_string();
        doc.llm_endpoint.body.sample_json = r#"{"q": "_query_"}"#.to_string();
        assert_eq!(doc.validate(), Err(ValidationError::MissingQueryKey));

        doc.llm_endpoint.body.query_key = "q".to_string();
        assert_eq!(doc.validate(), Err(ValidationError::MissingResponseKey));

        doc.llm_endpoint.body.response_key = "answer".to_string();
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn partial_db_credentials_are_rejected() {
        let mut doc = valid_doc();
        doc.db_credentials.host = "db.example.com".to_string();
        assert_eq!(doc.validate(), Err(ValidationError::PartialDbCredentials));
    }

    #[test]
    fn full_db_credentials_validate() {
        let mut doc = valid_doc();
        doc.db_credentials = DbCredentials {
            host: "db.example.com".to_string(),
            port: "5432".to_string(),
            user: "app".to_string(),
            password: "secret".to_string(),
            database: "orders".to_string(),
        };
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn endpoint_violations_reported_before_db_ones() {
        let mut doc = valid_doc();
        doc.llm_endpoint.url = "https://llm.example.com".to_string();
        doc.llm_endpoint.auth_type = AuthType::AuthorizationHeader;
        doc.db_credentials.host = "db.example.com".to_string();
        assert_eq!(doc.validate(), Err(ValidationError::MissingAuthHeader));
    }

    #[test]
    fn auth_type_parses_cli_spellings() {
        assert_eq!(AuthType::from_str("none").unwrap(), AuthType::None);
        assert_eq!(
            AuthType::from_str("header").unwrap(),
            AuthType::AuthorizationHeader
        );
        assert_eq!(
            AuthType::from_str("client").unwrap(),
            AuthType::ClientIdSecret
        );
        assert!(AuthType::from_str("basic").is_err());
    }
}
