//! HTTP integration tests for the people API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p people-api)
//!
//! Run with: cargo test -p people-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use people_integration_tests::{api_base_url, unique_card_id, unique_last_name};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Create a person over HTTP and return its ID, found by searching for it.
async fn create_person(client: &Client, body: &Value) -> i64 {
    let base_url = api_base_url();
    let resp = client
        .put(format!("{base_url}/api/people/0"))
        .json(body)
        .send()
        .await
        .expect("Failed to create person");
    assert_eq!(resp.status(), StatusCode::OK);

    let found = search(
        client,
        &json!({"firstName": body["firstName"], "lastName": body["lastName"]}),
    )
    .await;
    found["people"][0]["id"].as_i64().expect("created person is searchable")
}

async fn search(client: &Client, body: &Value) -> Value {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/api/people/search"))
        .json(body)
        .send()
        .await
        .expect("Failed to search");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse search result")
}

async fn get_person(client: &Client, id: i64) -> Value {
    let base_url = api_base_url();
    let resp = client
        .get(format!("{base_url}/api/people/{id}"))
        .send()
        .await
        .expect("Failed to get person");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse person")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_health_and_readiness() {
    let client = Client::new();
    let base_url = api_base_url();

    let resp = client.get(format!("{base_url}/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_search_paging_shape() {
    let client = Client::new();
    let last_name = unique_last_name("HttpPage");

    for first_name in ["Ann", "Bob", "Cal"] {
        create_person(
            &client,
            &json!({"personType": "IN", "firstName": first_name, "lastName": last_name}),
        )
        .await;
    }

    let result = search(
        &client,
        &json!({"lastName": last_name, "page": 2, "pageSize": 2}),
    )
    .await;

    assert_eq!(result["totalCount"], 3);
    assert_eq!(result["totalPages"], 2);
    assert_eq!(result["people"].as_array().unwrap().len(), 1);
    assert_eq!(result["people"][0]["firstName"], "Cal");
    assert!(result["people"][0]["emailAddress"].is_null());
}

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_search_invalid_paging_is_400() {
    let client = Client::new();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/people/search"))
        .json(&json!({"page": 0}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.text().await.unwrap(),
        "Page must be greater than or equal to 1"
    );
}

// ============================================================================
// Get / Update / Create
// ============================================================================

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_get_missing_person_is_404() {
    let client = Client::new();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/people/{}", i32::MAX))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_update_missing_person_is_404() {
    let client = Client::new();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/people/{}", i32::MAX))
        .json(&json!({"firstName": "Nobody"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_create_update_round_trip() {
    let client = Client::new();
    let base_url = api_base_url();
    let last_name = unique_last_name("HttpCrud");
    let card_id = unique_card_id();

    let id = create_person(
        &client,
        &json!({
            "personType": "EM",
            "firstName": "Ken",
            "lastName": last_name,
            "emailAddresses": ["a@x.com", "b@x.com"],
            "phoneNumbers": [{"phoneNumber": "697-555-0142", "phoneNumberTypeId": 1}],
            "creditCards": [{
                "creditCardId": card_id,
                "cardType": "Vista",
                "cardNumber": "11111000471254",
                "expMonth": 11,
                "expYear": 2028
            }]
        }),
    )
    .await;

    let person = get_person(&client, id).await;
    assert_eq!(person["businessEntityId"], id);
    assert_eq!(person["personType"], "EM");
    assert_eq!(person["emailAddresses"], json!(["a@x.com", "b@x.com"]));
    assert_eq!(person["phoneNumbers"][0]["name"], "Cell");
    assert_eq!(person["creditCards"][0]["creditCardId"], card_id.as_i32());

    let resp = client
        .post(format!("{base_url}/api/people/{id}"))
        .json(&json!({
            "middleName": "J",
            "emailAddresses": ["a@x.com"],
            "creditCards": []
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().is_empty());

    let person = get_person(&client, id).await;
    assert_eq!(person["firstName"], "Ken");
    assert_eq!(person["middleName"], "J");
    assert_eq!(person["emailAddresses"], json!(["a@x.com"]));
    assert_eq!(person["phoneNumbers"].as_array().unwrap().len(), 1);
    assert!(person["creditCards"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_create_with_existing_card_is_500() {
    let client = Client::new();
    let base_url = api_base_url();
    let card_id = unique_card_id();
    let card = json!({
        "creditCardId": card_id,
        "cardType": "Vista",
        "cardNumber": "1111",
        "expMonth": 1,
        "expYear": 2029
    });

    create_person(
        &client,
        &json!({
            "personType": "IN",
            "firstName": "First",
            "lastName": unique_last_name("HttpDup"),
            "creditCards": [card]
        }),
    )
    .await;

    let resp = client
        .put(format!("{base_url}/api/people/0"))
        .json(&json!({
            "personType": "IN",
            "firstName": "Second",
            "lastName": unique_last_name("HttpDup"),
            "creditCards": [card]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), "Error creating person");
}

#[tokio::test]
#[ignore = "Requires running people-api server and database"]
async fn test_create_missing_last_name_is_400() {
    let client = Client::new();
    let base_url = api_base_url();

    let resp = client
        .put(format!("{base_url}/api/people/0"))
        .json(&json!({"personType": "IN", "firstName": "Ken"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
