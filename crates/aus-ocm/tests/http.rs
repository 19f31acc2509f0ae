//! OCM client against a local HTTP server

use aus_labels::{BackendError, Directory, Label, LabelScope, LabelStore};
use aus_ocm::{search, OcmClient, DEFAULT_TIMEOUT};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNTS: &str = "/api/accounts_mgmt/v1";
const CLUSTERS: &str = "/api/clusters_mgmt/v1";

/// Run blocking client calls off the async test runtime
async fn with_client<T, F>(server: &MockServer, calls: F) -> T
where
    T: Send + 'static,
    F: FnOnce(OcmClient) -> T + Send + 'static,
{
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = OcmClient::new(&uri, "secret", DEFAULT_TIMEOUT).unwrap();
        calls(client)
    })
    .await
    .unwrap()
}

fn subscription(id: &str) -> serde_json::Value {
    json!({"id": id, "display_name": format!("cluster-{id}"), "cluster_id": format!("c-{id}")})
}

#[tokio::test]
async fn list_follows_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNTS}/subscriptions")))
        .and(query_param("page", "1"))
        .and(query_param("size", "100"))
        .and(query_param("fetchLabels", "true"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "total": 3,
            "items": [subscription("s1"), subscription("s2")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNTS}/subscriptions")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "total": 3,
            "items": [subscription("s3")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subscriptions = with_client(&server, |client| client.subscriptions("org1", None))
        .await
        .unwrap();
    let ids: Vec<String> = subscriptions.into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["s1", "s2", "s3"]);
}

#[tokio::test]
async fn list_stops_on_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{CLUSTERS}/clusters")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 5, "items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let clusters = with_client(&server, |client| client.clusters("org1"))
        .await
        .unwrap();
    assert!(clusters.is_empty());
}

#[tokio::test]
async fn unauthorized_and_forbidden_are_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNTS}/current_account")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNTS}/organizations/org1")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (account, organization) = with_client(&server, |client| {
        (client.current_organization_id(), client.organization("org1"))
    })
    .await;
    assert!(matches!(account, Err(BackendError::Unavailable(_))));
    assert!(matches!(organization, Err(BackendError::Unavailable(_))));
}

#[tokio::test]
async fn unknown_organization_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNTS}/organizations/org-x")))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such organization"))
        .mount(&server)
        .await;

    let result = with_client(&server, |client| client.organization("org-x")).await;
    assert!(matches!(
        result,
        Err(BackendError::NotFound { ref name, .. }) if name == "org-x"
    ));
}

#[tokio::test]
async fn other_statuses_keep_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{CLUSTERS}/clusters")))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let result = with_client(&server, |client| client.clusters("org1")).await;
    match result {
        Err(BackendError::Http {
            status, message, ..
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend down");
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn organization_labels_fall_back_to_global_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNTS}/organizations/org1/labels")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNTS}/labels")))
        .and(query_param(
            "search",
            search::organization_label_key_prefix("org1", "sre-capabilities.aus."),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "items": [{"key": "sre-capabilities.aus.blocked-versions", "value": "4.12.*", "internal": false}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let labels = with_client(&server, |client| {
        client.list_labels(
            &LabelScope::Organization("org1".to_string()),
            "sre-capabilities.aus.",
        )
    })
    .await
    .unwrap();
    assert_eq!(
        labels,
        vec![Label::new("sre-capabilities.aus.blocked-versions", "4.12.*")]
    );
}

#[tokio::test]
async fn label_writes_send_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNTS}/subscriptions/sub1/labels")))
        .and(body_json(json!({
            "key": "sre-capabilities.aus.schedule",
            "value": "* * * * *",
            "internal": false
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!(
            "{ACCOUNTS}/subscriptions/sub1/labels/sre-capabilities.aus.soak-days"
        )))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    with_client(&server, |client| {
        let scope = LabelScope::Subscription("sub1".to_string());
        client
            .upsert_label(&scope, "sre-capabilities.aus.schedule", "* * * * *", false)
            .unwrap();
        client
            .delete_label(&scope, "sre-capabilities.aus.soak-days", false)
            .unwrap();
    })
    .await;
}

#[tokio::test]
async fn version_gates_and_agreements() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{CLUSTERS}/version_gates")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "items": [{
                "id": "gate-1",
                "version_raw_id_prefix": "4.14",
                "description": "STS role changes",
                "documentation_url": "https://docs.example.test/4.14",
                "sts_only": true
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{CLUSTERS}/clusters/c1/gate_agreements")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "items": [{"id": "a1", "version_gate": {"id": "gate-0"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{CLUSTERS}/clusters/c1/gate_agreements")))
        .and(body_json(json!({"version_gate": {"id": "gate-1"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "a2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (gates, agreements) = with_client(&server, |client| {
        let gates = client.version_gates().unwrap();
        let agreements = client.gate_agreements("c1").unwrap();
        client.add_gate_agreement("c1", "gate-1", true).unwrap();
        client.add_gate_agreement("c1", "gate-1", false).unwrap();
        (gates, agreements)
    })
    .await;
    assert_eq!(gates.len(), 1);
    assert!(gates[0].sts_only);
    assert_eq!(agreements, vec!["gate-0"]);
}
