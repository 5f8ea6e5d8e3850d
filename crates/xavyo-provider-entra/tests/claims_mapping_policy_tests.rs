//! Integration tests for `azuread_claims_mapping_policy`.

mod common;

use common::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};
use xavyo_provider::ResourceData;

const RESOURCE: &str = "azuread_claims_mapping_policy";
const DEFINITION: &str = r#"{"ClaimsMappingPolicy":{"Version":1,"IncludeBasicClaimSet":"true"}}"#;

fn policy_path() -> String {
    format!("/v1.0/policies/claimsMappingPolicies/{POLICY_ID}")
}

fn declared(display_name: &str) -> ResourceData {
    let mut data = ResourceData::new().with("display_name", display_name);
    data.set_list("definition", [DEFINITION]);
    data
}

#[tokio::test]
async fn test_create_and_update_policy() {
    let server = MockGraphServer::with_token().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/policies/claimsMappingPolicies"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(create_claims_mapping_policy(POLICY_ID, "basic claims")),
        )
        .expect(1)
        .mount(&server.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(policy_path()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server.server)
        .await;
    server
        .mock_get(
            &policy_path(),
            200,
            create_claims_mapping_policy(POLICY_ID, "basic claims"),
        )
        .await;
    let (provider, _) = provider_for(&server);

    let state = provider
        .create(RESOURCE, declared("basic claims"))
        .await
        .unwrap();
    assert_eq!(state.id(), Some(POLICY_ID));
    assert_eq!(state.get_list("definition"), vec![DEFINITION]);

    let mut next = declared("extended claims");
    next.set_id(POLICY_ID);
    provider.update(RESOURCE, next).await.unwrap();

    let bodies = server.patch_bodies().await;
    assert_eq!(
        bodies,
        vec![json!({ "displayName": "extended claims", "definition": [DEFINITION] })]
    );
}

#[tokio::test]
async fn test_create_without_policy_in_response_is_integrity_error() {
    let server = MockGraphServer::with_token().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/policies/claimsMappingPolicies"))
        .respond_with(ResponseTemplate::new(201).set_body_string("null"))
        .mount(&server.server)
        .await;
    let (provider, _) = provider_for(&server);

    let diagnostics = provider
        .create(RESOURCE, declared("basic claims"))
        .await
        .unwrap_err();
    let diagnostic = diagnostics.iter().next().unwrap();
    assert!(diagnostic.summary.starts_with("API error during create"));
}

// Deleting a policy that is already gone is an error.
#[tokio::test]
async fn test_delete_on_missing_policy_is_an_error() {
    let server = MockGraphServer::with_token().await;
    Mock::given(method("DELETE"))
        .and(path(policy_path()))
        .respond_with(ResponseTemplate::new(404).set_body_json(create_odata_error(
            "Request_ResourceNotFound",
            "Resource does not exist",
        )))
        .mount(&server.server)
        .await;
    let (provider, _) = provider_for(&server);

    let mut state = declared("basic claims");
    state.set_id(POLICY_ID);
    let diagnostics = provider.delete(RESOURCE, &state).await.unwrap_err();
    assert!(diagnostics.for_attribute("id").is_some());
}
