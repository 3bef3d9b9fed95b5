//! NameAPI person matcher client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use tracing::debug;
use url::Url;

use super::{NameMatchType, NameMatcher};
use crate::config::NameMatcherConfig;
use crate::error::RegistryError;

const SERVICE: &str = "nameapi";

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersonMatcherRequest<'a> {
    context: MatchContext,
    input_person1: InputPerson<'a>,
    input_person2: InputPerson<'a>,
}

#[derive(Debug, Serialize)]
struct MatchContext {
    priority: &'static str,
    properties: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputPerson<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    person_name: PersonNameFields<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersonNameFields<'a> {
    name_fields: Vec<NameField<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NameField<'a> {
    string: &'a str,
    field_type: &'static str,
}

impl<'a> InputPerson<'a> {
    fn full_name(name: &'a str) -> Self {
        Self {
            kind: "NaturalInputPerson",
            person_name: PersonNameFields {
                name_fields: vec![NameField {
                    string: name,
                    field_type: "FULLNAME",
                }],
            },
        }
    }
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonMatcherResponse {
    match_type: String,
}

/// Remote matcher backed by NameAPI's person matcher
pub struct NameApiMatcher {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl NameApiMatcher {
    pub fn new(
        config: &NameMatcherConfig,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Client {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let endpoint = format!(
            "{}/matcher/personmatcher",
            config.base_url.trim_end_matches('/')
        );
        let endpoint = Url::parse(&endpoint).map_err(|e| RegistryError::Client {
            service: SERVICE,
            message: format!("invalid base url '{}': {}", config.base_url, e),
        })?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

fn build_request<'a>(first: &'a str, second: &'a str) -> PersonMatcherRequest<'a> {
    PersonMatcherRequest {
        context: MatchContext {
            priority: "REALTIME",
            properties: Vec::new(),
        },
        input_person1: InputPerson::full_name(first),
        input_person2: InputPerson::full_name(second),
    }
}

#[async_trait]
impl NameMatcher for NameApiMatcher {
    async fn match_person_names(
        &self,
        first: &str,
        second: &str,
    ) -> Result<NameMatchType, RegistryError> {
        let body = build_request(first, second);

        let response = self
            .http
            .post(self.endpoint.clone())
            .query(&[("apiKey", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|source| RegistryError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: PersonMatcherResponse =
            response.json().await.map_err(|e| RegistryError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let grade = NameMatchType::from_wire(&parsed.match_type);
        debug!(first, second, %grade, "person match");
        Ok(grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(build_request("Jane Smith", "SMITH, Jane")).unwrap();

        assert_eq!(body["context"]["priority"], "REALTIME");
        assert_eq!(body["inputPerson1"]["type"], "NaturalInputPerson");
        assert_eq!(
            body["inputPerson1"]["personName"]["nameFields"][0]["string"],
            "Jane Smith"
        );
        assert_eq!(
            body["inputPerson2"]["personName"]["nameFields"][0]["fieldType"],
            "FULLNAME"
        );
    }

    #[test]
    fn test_response_decodes() {
        let parsed: PersonMatcherResponse =
            serde_json::from_str(r#"{"matchType":"SIMILAR","confidence":0.8}"#).unwrap();
        assert_eq!(NameMatchType::from_wire(&parsed.match_type), NameMatchType::Similar);
    }

    #[test]
    fn test_endpoint() {
        let config = NameMatcherConfig {
            base_url: "https://api.nameapi.org/rest/v5.3/".to_string(),
            api_key: None,
        };
        let matcher = NameApiMatcher::new(&config, "k", Duration::from_secs(1)).unwrap();
        assert_eq!(
            matcher.endpoint.as_str(),
            "https://api.nameapi.org/rest/v5.3/matcher/personmatcher"
        );
    }
}
