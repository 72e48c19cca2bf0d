use integration_tests::{runtime, tea_shop_options, TestServer};
use serde_json::json;

fn server() -> TestServer {
    TestServer::with_options(tea_shop_options().with_graphiql(true))
}

#[test]
fn browsers_get_an_empty_editor() {
    let response = runtime().block_on(async { server().get(&[]).from_browser().await });

    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(
        response.header("content-length"),
        Some(response.body.len().to_string().as_str())
    );

    let html = response.text();
    assert!(html.contains("graphiql.min.js"));
    assert!(html.contains("query: undefined,"));
    assert!(html.contains("response: undefined,"));
}

#[test]
fn queries_are_executed_and_prepopulated() {
    let response = runtime().block_on(async {
        server()
            .get(&[
                ("query", "query Tea($name: String) { tea(name: $name) { origin } }"),
                ("variables", r#"{"name": "Darjeeling"}"#),
                ("operationName", "Tea"),
            ])
            .from_browser()
            .await
    });

    assert_eq!(response.status, 200);
    let html = response.text();
    assert!(html.contains(r#"query: "query Tea($name: String) { tea(name: $name) { origin } }","#));
    assert!(html.contains(r#"variables: "{\n  \"name\": \"Darjeeling\"\n}","#));
    assert!(html.contains(r#"operationName: "Tea","#));
    assert!(html.contains(r#"\"origin\": \"India\""#));
}

#[test]
fn mutations_over_get_are_not_executed() {
    let response = runtime().block_on(async {
        server()
            .get(&[("query", r#"mutation { orderTea(name: "Sencha") { id } }"#)])
            .from_browser()
            .await
    });

    assert_eq!(response.status, 200);
    let html = response.text();
    assert!(html.contains(r#"query: "mutation { orderTea(name: \"Sencha\") { id } }","#));
    assert!(html.contains("response: undefined,"));
}

#[test]
fn errors_are_shown_in_the_editor() {
    let response = runtime().block_on(async {
        server()
            .get(&[("query", "{ __typename }"), ("variables", "{oops")])
            .from_browser()
            .await
    });

    assert_eq!(response.status, 400);
    assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    assert!(response.text().contains("Variables are invalid JSON."));
}

#[test]
fn raw_and_json_clients_get_json() {
    let response = runtime().block_on(async {
        server()
            .get(&[("query", "{ __typename }"), ("raw", "")])
            .from_browser()
            .await
    });
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.json(), json!({"data": {"__typename": "Query"}}));

    let response = runtime().block_on(async {
        server()
            .get(&[("query", "{ __typename }")])
            .header("accept", "application/json")
            .await
    });
    assert_eq!(response.header("content-type"), Some("application/json"));

    let response = runtime().block_on(async { server().get(&[("query", "{ __typename }")]).await });
    assert_eq!(response.header("content-type"), Some("application/json"));
}

#[test]
fn disabled_graphiql() {
    let response = runtime().block_on(async { TestServer::tea_shop().get(&[]).from_browser().await });

    assert_eq!(response.status, 400);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Must provide query string."}]})
    );
}
