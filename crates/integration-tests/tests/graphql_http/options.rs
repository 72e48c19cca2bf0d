use graphql_http::{Options, OptionsSource};
use graphql_mocks::MockSchema;
use integration_tests::{runtime, tea_shop_options, TestServer};
use serde_json::json;

#[test]
fn request_scoped_options() {
    let schema = std::sync::Arc::new(graphql_mocks::tea_shop::schema());
    let server = TestServer::with_options(OptionsSource::from_fn(move |parts: &http::request::Parts| {
        let customer = parts
            .headers
            .get("x-customer")
            .and_then(|value| value.to_str().ok())
            .map(|customer| json!({"customer": customer}));
        let pretty = parts.uri.path().ends_with("/graphql") && parts.headers.contains_key("x-pretty");
        let schema = schema.clone();

        async move {
            let mut options = Options::<MockSchema>::new(schema).with_pretty(pretty);
            if let Some(customer) = customer {
                options = options.with_context(customer);
            }
            Ok(options)
        }
    }));

    let response = runtime().block_on(async {
        server
            .get(&[("query", "{ customer }")])
            .header("x-customer", "Ada")
            .await
    });
    assert_eq!(response.text(), r#"{"data":{"customer":"Ada"}}"#);

    let response = runtime().block_on(async {
        server
            .get(&[("query", "{ customer }")])
            .header("x-pretty", "1")
            .await
    });
    assert_eq!(response.text(), "{\n  \"data\": {\n    \"customer\": null\n  }\n}");
}

#[test]
fn root_value() {
    let server = TestServer::with_options(tea_shop_options().with_root_value(json!({"greeting": "Welcome!"})));

    let response = runtime().block_on(async { server.get(&[("query", "{ greeting }")]).await });
    assert_eq!(response.json(), json!({"data": {"greeting": "Welcome!"}}));
}

#[test]
fn missing_schema() {
    let server = TestServer::with_options(Options::<MockSchema>::default().with_graphiql(true));

    let response = runtime().block_on(async { server.get(&[("query", "{ __typename }")]).from_browser().await });
    assert_eq!(response.status, 500);
    assert_eq!(response.header("content-type"), Some("application/json"));
    insta::assert_json_snapshot!(response.json(), @r#"
    {
      "errors": [
        {
          "message": "GraphQL options must contain a schema."
        }
      ]
    }
    "#);
}

#[test]
fn failing_option_function() {
    let server = TestServer::with_options(OptionsSource::<MockSchema>::from_sync_fn(|_| {
        Err("tenant lookup failed".into())
    }));

    let response = runtime().block_on(async { server.get(&[("query", "{ __typename }")]).await });
    assert_eq!(response.status, 500);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "GraphQL option function must return an options object: tenant lookup failed"}]})
    );
}
