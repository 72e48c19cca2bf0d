use integration_tests::{runtime, TestServer};
use serde_json::json;

#[test]
fn only_get_and_post_are_allowed() {
    let server = TestServer::tea_shop();

    for method in [http::Method::PUT, http::Method::DELETE, http::Method::PATCH, http::Method::HEAD] {
        let response = runtime().block_on(async { server.execute(method.clone(), &[("query", "{ __typename }")]).await });

        assert_eq!(response.status, 405, "{method}");
        assert_eq!(response.header("allow"), Some("GET, POST"));
        if method != http::Method::HEAD {
            assert_eq!(
                response.json(),
                json!({"errors": [{"message": "GraphQL only supports GET and POST requests."}]})
            );
        }
    }
}

#[test]
fn query_over_get() {
    let response = runtime().block_on(async {
        let server = TestServer::tea_shop();
        server.get(&[("query", "{ __typename }")]).await
    });

    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("application/json"));
    insta::assert_json_snapshot!(response.json(), @r#"
    {
      "data": {
        "__typename": "Query"
      }
    }
    "#);
}

#[test]
fn query_over_post() {
    let server = TestServer::tea_shop();

    let response = runtime().block_on(async {
        server
            .post(&[])
            .json(json!({"query": "query Tea($name: String) { tea(name: $name) { name origin } }", "variables": {"name": "Sencha"}}))
            .await
    });
    assert_eq!(response.status, 200);
    insta::assert_json_snapshot!(response.json(), @r#"
    {
      "data": {
        "tea": {
          "name": "Sencha",
          "origin": "Japan"
        }
      }
    }
    "#);

    let response = runtime().block_on(async {
        server
            .post(&[])
            .body("application/graphql", "{ teas { name } }")
            .await
    });
    assert_eq!(
        response.json(),
        json!({"data": {"teas": [{"name": "Sencha"}, {"name": "Earl Grey"}, {"name": "Rooibos"}, {"name": "Darjeeling"}]}})
    );

    let response = runtime().block_on(async {
        server
            .post(&[])
            .body(
                "application/x-www-form-urlencoded",
                "query=query%20Tea(%24name%3A%20String)%20%7B%20tea(name%3A%20%24name)%20%7B%20price%20%7D%20%7D&variables=%7B%22name%22%3A%22Rooibos%22%7D",
            )
            .await
    });
    assert_eq!(response.json(), json!({"data": {"tea": {"price": 3.5}}}));
}

#[test]
fn url_parameters_take_precedence_over_the_body() {
    let response = runtime().block_on(async {
        TestServer::tea_shop()
            .post(&[("query", "{ __typename }")])
            .json(json!({"query": "{ teas { name } }"}))
            .await
    });

    assert_eq!(response.json(), json!({"data": {"__typename": "Query"}}));
}

#[test]
fn variables_in_the_query_string() {
    let response = runtime().block_on(async {
        TestServer::tea_shop()
            .get(&[
                ("query", "query Tea($name: String) { tea(name: $name) { caffeinated } }"),
                ("variables", r#"{"name": "Rooibos"}"#),
            ])
            .await
    });

    assert_eq!(response.status, 200);
    assert_eq!(response.json(), json!({"data": {"tea": {"caffeinated": false}}}));
}

#[test]
fn operation_name_selects_the_operation() {
    let response = runtime().block_on(async {
        TestServer::tea_shop()
            .get(&[
                ("query", "query A { __typename } query B { teas { origin } }"),
                ("operationName", "B"),
            ])
            .await
    });

    assert_eq!(
        response.json(),
        json!({"data": {"teas": [{"origin": "Japan"}, {"origin": "China"}, {"origin": "South Africa"}, {"origin": "India"}]}})
    );
}

#[test]
fn missing_query() {
    let server = TestServer::tea_shop();

    let response = runtime().block_on(async { server.get(&[]).await });
    assert_eq!(response.status, 400);
    insta::assert_json_snapshot!(response.json(), @r#"
    {
      "errors": [
        {
          "message": "Must provide query string."
        }
      ]
    }
    "#);

    // Empty values count as absent.
    let response = runtime().block_on(async { server.post(&[]).json(json!({"query": ""})).await });
    assert_eq!(response.status, 400);
    assert_eq!(response.json(), json!({"errors": [{"message": "Must provide query string."}]}));
}
