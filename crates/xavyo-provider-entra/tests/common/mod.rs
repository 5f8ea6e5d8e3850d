//! Common test utilities for xavyo-provider-entra integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};
use xavyo_provider::{logging, NamedLockRegistry, Provider};
use xavyo_provider_entra::{
    register_services, EntraConfig, EntraCredentials, GraphClient, RetryConfig,
};

pub const TENANT_ID: &str = "contoso";
pub const APP_OBJECT_ID: &str = "6c9e6a8a-0d6e-4c8e-8a5f-3f0c2f1e9b11";
pub const CREDENTIAL_KEY_ID: &str = "0b0f4c5e-8f0a-4d3e-9c1b-7a2d5e6f8a90";
pub const POLICY_ID: &str = "a7e1c9d2-3b4f-4e5a-8c6d-9f0e1a2b3c4d";

/// Test data factory for creating application registrations.
pub fn create_application(id: &str, identifier_uris: &[&str]) -> Value {
    json!({
        "id": id,
        "appId": "11111111-2222-3333-4444-555555555555",
        "displayName": "Test Application",
        "identifierUris": identifier_uris
    })
}

/// Test data factory for creating federated identity credentials.
pub fn create_federated_credential(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Deployments from main",
        "audiences": ["api://AzureADTokenExchange"],
        "issuer": "https://token.actions.githubusercontent.com",
        "subject": "repo:contoso/app:ref:refs/heads/main"
    })
}

/// Test data factory for creating claims mapping policies.
pub fn create_claims_mapping_policy(id: &str, display_name: &str) -> Value {
    json!({
        "id": id,
        "displayName": display_name,
        "definition": [r#"{"ClaimsMappingPolicy":{"Version":1,"IncludeBasicClaimSet":"true"}}"#]
    })
}

/// Creates an OData error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Configuration pointing at a mock server with near-instant retries.
pub fn config_for(server: &MockGraphServer) -> EntraConfig {
    EntraConfig::builder()
        .tenant_id(TENANT_ID)
        .endpoint_override(server.url())
        .timeout_secs(5)
        .retry(RetryConfig {
            max_retries: 2,
            base_delay_ms: 10,
            max_delay_ms: 50,
        })
        .build()
        .unwrap()
}

pub fn test_credentials() -> EntraCredentials {
    EntraCredentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string().into(),
    }
}

/// Graph client and provider sharing one lock registry.
pub fn provider_for(server: &MockGraphServer) -> (Provider, Arc<NamedLockRegistry>) {
    logging::init_test_logging();
    let client = Arc::new(GraphClient::new(&config_for(server), test_credentials()).unwrap());
    let locks = Arc::new(NamedLockRegistry::new());
    (register_services(client, locks.clone()), locks)
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Creates a new mock Graph API server.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Creates a mock server with the token endpoint already mounted.
    pub async fn with_token() -> Self {
        let server = Self::new().await;
        server.mock_token_endpoint(TENANT_ID).await;
        server
    }

    /// Returns the mock server's base URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Sets up OAuth token endpoint.
    pub async fn mock_token_endpoint(&self, tenant_id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", tenant_id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response("mock-access-token", 3600)),
            )
            .mount(&self.server)
            .await;
    }

    /// Sets up an application whose identifier URIs follow PATCH requests.
    ///
    /// Returns the shared URI list so tests can inspect or alter it.
    pub async fn mock_application(&self, id: &str, uris: &[&str]) -> Arc<Mutex<Vec<String>>> {
        let state = Arc::new(Mutex::new(
            uris.iter().map(|u| (*u).to_string()).collect::<Vec<_>>(),
        ));
        let app_path = format!("/v1.0/applications/{id}");

        let read_state = state.clone();
        let app_id = id.to_string();
        Mock::given(method("GET"))
            .and(path(app_path.clone()))
            .respond_with(move |_: &Request| {
                let uris = read_state.lock().unwrap().clone();
                ResponseTemplate::new(200).set_body_json(json!({
                    "id": app_id,
                    "identifierUris": uris
                }))
            })
            .mount(&self.server)
            .await;

        let write_state = state.clone();
        Mock::given(method("PATCH"))
            .and(path(app_path))
            .respond_with(move |request: &Request| {
                let body: Value = request.body_json().unwrap_or_default();
                if let Some(uris) = body["identifierUris"].as_array() {
                    *write_state.lock().unwrap() = uris
                        .iter()
                        .filter_map(|u| u.as_str().map(String::from))
                        .collect();
                }
                ResponseTemplate::new(204)
            })
            .mount(&self.server)
            .await;

        state
    }

    /// Sets up every request under an application to answer 404.
    pub async fn mock_missing_application(&self, id: &str) {
        Mock::given(path(format!("/v1.0/applications/{id}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(create_odata_error(
                "Request_ResourceNotFound",
                &format!("Resource '{id}' does not exist or one of its queried reference-property objects are not present."),
            )))
            .mount(&self.server)
            .await;
    }

    /// Sets up a GET on a path answering with a fixed status and body.
    pub async fn mock_get(&self, url_path: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Requests received with the given method, oldest first.
    pub async fn requests_with_method(&self, http_method: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method)
            .collect()
    }

    /// JSON bodies of the PATCH requests received so far.
    pub async fn patch_bodies(&self) -> Vec<Value> {
        self.requests_with_method("PATCH")
            .await
            .iter()
            .map(|r| r.body_json::<Value>().unwrap())
            .collect()
    }
}
