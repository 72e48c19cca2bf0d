use std::sync::Arc;

use graphql_http::Options;
use graphql_mocks::{FieldDefinition, MaxDepth, MockSchema, ObjectType};
use integration_tests::{runtime, tea_shop_options, TestServer};
use serde_json::json;

#[test]
fn syntax_errors() {
    let response = runtime().block_on(async { TestServer::tea_shop().get(&[("query", "{ teas { name }")]).await });

    assert_eq!(response.status, 400);
    let body = response.json();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["message"].as_str().unwrap().starts_with("Syntax Error"));
    assert!(!errors[0]["locations"].as_array().unwrap().is_empty());
    assert!(body.get("data").is_none());
}

#[test]
fn validation_errors() {
    let response = runtime().block_on(async {
        TestServer::tea_shop()
            .post(&[])
            .json(json!({"query": "{ teas { name flavor } coffee }"}))
            .await
    });

    assert_eq!(response.status, 400);
    insta::assert_json_snapshot!(response.json(), @r#"
    {
      "errors": [
        {
          "message": "Cannot query field \"flavor\" on type \"Tea\".",
          "locations": [
            {
              "line": 1,
              "column": 15
            }
          ]
        },
        {
          "message": "Cannot query field \"coffee\" on type \"Query\".",
          "locations": [
            {
              "line": 1,
              "column": 24
            }
          ]
        }
      ]
    }
    "#);
}

#[test]
fn additional_validation_rules() {
    let server = TestServer::with_options(tea_shop_options().with_validation_rule(Arc::new(MaxDepth::new(1))));

    let response = runtime().block_on(async { server.get(&[("query", "{ teas { name } }")]).await });
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{
            "message": "Field \"name\" exceeds the maximum query depth of 1.",
            "locations": [{"line": 1, "column": 10}]
        }]})
    );

    let response = runtime().block_on(async { server.get(&[("query", "{ __typename }")]).await });
    assert_eq!(response.status, 200);
}

#[test]
fn mutations_require_post() {
    let server = TestServer::tea_shop();
    let mutation = r#"mutation { orderTea(name: "Sencha", quantity: 2) { quantity tea { name } } }"#;

    let response = runtime().block_on(async { server.get(&[("query", mutation)]).await });
    assert_eq!(response.status, 405);
    assert_eq!(response.header("allow"), Some("POST"));
    insta::assert_json_snapshot!(response.json(), @r#"
    {
      "errors": [
        {
          "message": "Can only perform a mutation operation from a POST request."
        }
      ]
    }
    "#);

    let response = runtime().block_on(async { server.post(&[]).json(json!({"query": mutation})).await });
    assert_eq!(response.status, 200);
    assert_eq!(
        response.json(),
        json!({"data": {"orderTea": {"quantity": 2, "tea": {"name": "Sencha"}}}})
    );
}

#[test]
fn get_checks_the_selected_operation() {
    let server = TestServer::tea_shop();
    let document = r#"query Menu { teas { name } } mutation Order { orderTea(name: "Rooibos") { id } }"#;

    let response = runtime().block_on(async {
        server
            .get(&[("query", document), ("operationName", "Menu")])
            .await
    });
    assert_eq!(response.status, 200);

    let response = runtime().block_on(async {
        server
            .get(&[("query", document), ("operationName", "Order")])
            .await
    });
    assert_eq!(response.status, 405);
}

#[test]
fn execution_setup_errors() {
    let server = TestServer::tea_shop();

    let response = runtime().block_on(async {
        server
            .get(&[("query", "query A { __typename } query B { __typename }")])
            .await
    });
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Must provide operation name if query contains multiple operations."}]})
    );

    let response = runtime().block_on(async {
        server
            .post(&[])
            .json(json!({"query": "query A { __typename }", "operationName": "B"}))
            .await
    });
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Unknown operation named \"B\"."}]})
    );

    let response = runtime().block_on(async {
        server
            .post(&[])
            .json(json!({"query": "query ($name: String!) { tea(name: $name) { name } }"}))
            .await
    });
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{
            "message": "Variable \"$name\" of required type \"String!\" was not provided.",
            "locations": [{"line": 1, "column": 8}]
        }]})
    );
}

#[test]
fn field_errors_keep_the_success_status() {
    let response = runtime().block_on(async {
        TestServer::tea_shop()
            .get(&[("query", "{ specialOfTheDay { name } }")])
            .await
    });

    assert_eq!(response.status, 200);
    insta::assert_json_snapshot!(response.json(), @r#"
    {
      "data": {
        "specialOfTheDay": null
      },
      "errors": [
        {
          "message": "The special of the day is sold out.",
          "locations": [
            {
              "line": 1,
              "column": 3
            }
          ],
          "path": [
            "specialOfTheDay"
          ]
        }
      ]
    }
    "#);
}

#[test]
fn invalid_variables() {
    let server = TestServer::tea_shop();
    let query = "query Tea($name: String) { tea(name: $name) { name } }";

    let response = runtime().block_on(async { server.get(&[("query", query), ("variables", "{name")]).await });
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Variables are invalid JSON."}]})
    );

    let response = runtime().block_on(async { server.get(&[("query", query), ("variables", "[1]")]).await });
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Variables must be an object."}]})
    );

    let response = runtime().block_on(async { server.get(&[("query", query), ("variables", "null")]).await });
    assert_eq!(response.status, 200);
    assert_eq!(response.json(), json!({"data": {"tea": null}}));
}

#[test]
fn responses_are_idempotent() {
    let server = TestServer::tea_shop();
    let params = [("query", "{ teas { name price } specialOfTheDay { name } }")];

    let first = runtime().block_on(async { server.get(&params).await });
    let second = runtime().block_on(async { server.get(&params).await });

    assert_eq!(first.status, second.status);
    assert_eq!(first.body, second.body);
}

#[test]
fn syntax_errors_do_not_depend_on_graphiql() {
    let server = TestServer::with_options(tea_shop_options().with_graphiql(true));

    let response = runtime().block_on(async {
        server
            .get(&[("query", "{")])
            .header("accept", "application/json")
            .await
    });

    assert_eq!(response.status, 400);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.json()["errors"].as_array().map(Vec::len), Some(1));
}

fn ticker_options() -> Options<MockSchema> {
    let schema = MockSchema::builder()
        .object(ObjectType::new("Query").field("now", FieldDefinition::new("Int")))
        .object(ObjectType::new("Subscription").field("tick", FieldDefinition::new("Int")))
        .subscription("Subscription")
        .build();

    Options::new(schema)
}

#[test]
fn subscriptions_require_post() {
    let server = TestServer::with_options(ticker_options());

    let response = runtime().block_on(async { server.get(&[("query", "subscription { tick }")]).await });
    assert_eq!(response.status, 405);
    assert_eq!(response.header("allow"), Some("POST"));
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Can only perform a subscription operation from a POST request."}]})
    );

    let server = TestServer::with_options(ticker_options().with_graphiql(true));
    let response =
        runtime().block_on(async { server.get(&[("query", "subscription { tick }")]).from_browser().await });
    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    let html = response.text();
    assert!(html.contains(r#"query: "subscription { tick }","#));
    assert!(html.contains("response: undefined,"));
}
