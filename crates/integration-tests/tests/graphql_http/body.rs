use graphql_http::{GraphqlHttp, StandardBodyDecoder};
use integration_tests::{runtime, tea_shop_options, TestServer};
use serde_json::json;

#[test]
fn body_limit() {
    let server = TestServer::new(
        GraphqlHttp::builder(tea_shop_options())
            .body_decoder(StandardBodyDecoder::new(16))
            .build(),
    );

    let response = runtime().block_on(async {
        server
            .post(&[])
            .body("application/graphql", "{ teas { name origin price } }")
            .await
    });
    assert_eq!(response.status, 413);
    assert_eq!(response.json(), json!({"errors": [{"message": "Request body too large."}]}));

    let response = runtime().block_on(async { server.post(&[]).body("application/graphql", "{ __typename }").await });
    assert_eq!(response.status, 200);
}

#[test]
fn unsupported_charset_and_encoding() {
    let server = TestServer::tea_shop();

    let response = runtime().block_on(async {
        server
            .post(&[])
            .body("application/json; charset=ascii", r#"{"query": "{ __typename }"}"#)
            .await
    });
    assert_eq!(response.status, 415);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Unsupported charset \"ASCII\"."}]})
    );

    let response = runtime().block_on(async {
        server
            .post(&[])
            .header("content-encoding", "br")
            .body("application/json", r#"{"query": "{ __typename }"}"#)
            .await
    });
    assert_eq!(response.status, 415);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Unsupported content-encoding \"br\"."}]})
    );
}

#[test]
fn malformed_bodies() {
    let server = TestServer::tea_shop();

    for body in ["[]", "{\"query\": ", "\"{ __typename }\""] {
        let response = runtime().block_on(async { server.post(&[]).body("application/json", body).await });
        assert_eq!(response.status, 400, "{body}");
        assert_eq!(
            response.json(),
            json!({"errors": [{"message": "POST body sent invalid JSON."}]})
        );
    }

    let response = runtime().block_on(async {
        server
            .post(&[])
            .body("application/json", &b"{\"query\": \"\xff\"}"[..])
            .await
    });
    assert_eq!(response.status, 400);
    assert_eq!(response.json(), json!({"errors": [{"message": "Invalid body."}]}));

    let response = runtime().block_on(async { server.post(&[]).body("not a media type", "{}").await });
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Invalid Content-Type header."}]})
    );
}

#[test]
fn unknown_content_types_have_no_fields() {
    let response = runtime().block_on(async {
        TestServer::tea_shop()
            .post(&[])
            .body("text/plain", "{ __typename }")
            .await
    });

    assert_eq!(response.status, 400);
    assert_eq!(
        response.json(),
        json!({"errors": [{"message": "Must provide query string."}]})
    );
}

#[test]
fn gzip_bodies() {
    use std::io::Write;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(br#"{"query": "{ tea(name: \"Sencha\") { origin } }"}"#).unwrap();
    let body = encoder.finish().unwrap();

    let response = runtime().block_on(async {
        TestServer::tea_shop()
            .post(&[])
            .header("content-encoding", "gzip")
            .body("application/json", body)
            .await
    });

    assert_eq!(response.status, 200);
    assert_eq!(response.json(), json!({"data": {"tea": {"origin": "Japan"}}}));
}
