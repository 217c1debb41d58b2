use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use temperature_api::config::{TemperatureConfig, ViacepConfig, WeatherConfig};
use temperature_api::server::create_router;
use temperature_api::AppState;

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

fn test_router(viacep_url: &str, weather_url: &str) -> Router {
    let config = TemperatureConfig {
        viacep: ViacepConfig {
            base_url: viacep_url.to_string(),
        },
        weather: WeatherConfig {
            api_key: "test-key".to_string(),
            base_url: weather_url.to_string(),
        },
        ..Default::default()
    };
    create_router(AppState::new(config).expect("client build"))
}

async fn post_cep(app: Router, body: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_happy_path_sao_paulo() {
    let viacep = MockServer::start().await;
    let weather = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cep": "01001-000",
            "localidade": "São Paulo",
            "uf": "SP"
        })))
        .expect(1)
        .mount(&viacep)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("q", "São Paulo"))
        .and(header("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": { "temp_c": 25.0, "humidity": 60 }
        })))
        .expect(1)
        .mount(&weather)
        .await;

    let app = test_router(&viacep.uri(), &weather.uri());
    let (status, body) = post_cep(app, r#"{"cep":"01001000"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!((json["temp_C"].as_f64().unwrap() - 25.0).abs() < 1e-9);
    assert!((json["temp_K"].as_f64().unwrap() - 298.15).abs() < 1e-9);
    assert!((json["temp_F"].as_f64().unwrap() - 77.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_invalid_zipcode_lengths_rejected() {
    for cep in ["", "0100100", "010010001"] {
        let app = test_router("http://127.0.0.1:1", "http://127.0.0.1:1");
        let (status, body) = post_cep(app, &format!(r#"{{"cep":"{}"}}"#, cep)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "cep {:?}", cep);
        assert_eq!(String::from_utf8(body).unwrap(), "invalid zipcode");
    }
}

#[tokio::test]
async fn test_missing_zipcode_rejected() {
    let app = test_router("http://127.0.0.1:1", "http://127.0.0.1:1");
    let (status, body) = post_cep(app, "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "missing zipcode");
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = test_router("http://127.0.0.1:1", "http://127.0.0.1:1");
    let (status, _body) = post_cep(app, "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_locality_is_not_found() {
    let viacep = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/99999999/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "cep": "99999-999", "localidade": "" })),
        )
        .mount(&viacep)
        .await;

    let app = test_router(&viacep.uri(), "http://127.0.0.1:1");
    let (status, body) = post_cep(app, r#"{"cep":"99999999"}"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(String::from_utf8(body).unwrap(), "cannot find zipcode");
}

#[tokio::test]
async fn test_directory_not_found_shape_is_server_error() {
    let viacep = MockServer::start().await;

    // ViaCEP's "unknown CEP" shape fails the string-map decode
    Mock::given(method("GET"))
        .and(path("/ws/00000000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "erro": true })))
        .mount(&viacep)
        .await;

    let app = test_router(&viacep.uri(), "http://127.0.0.1:1");
    let (status, _body) = post_cep(app, r#"{"cep":"00000000"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_directory_non_200_is_server_error() {
    let viacep = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&viacep)
        .await;

    let app = test_router(&viacep.uri(), "http://127.0.0.1:1");
    let (status, body) = post_cep(app, r#"{"cep":"01001000"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().contains("502"));
}

#[tokio::test]
async fn test_directory_transport_failure_is_server_error() {
    // Nothing listens on this port
    let app = test_router("http://127.0.0.1:1", "http://127.0.0.1:1");
    let (status, _body) = post_cep(app, r#"{"cep":"01001000"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_weather_non_200_defaults_to_zero_celsius() {
    let viacep = MockServer::start().await;
    let weather = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "localidade": "São Paulo" })),
        )
        .mount(&viacep)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
        .mount(&weather)
        .await;

    let app = test_router(&viacep.uri(), &weather.uri());
    let (status, body) = post_cep(app, r#"{"cep":"01001000"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!((json["temp_C"].as_f64().unwrap() - 0.0).abs() < 1e-9);
    assert!((json["temp_K"].as_f64().unwrap() - 273.15).abs() < 1e-9);
    assert!((json["temp_F"].as_f64().unwrap() - 32.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_weather_unexpected_shape_defaults_to_zero_celsius() {
    let viacep = MockServer::start().await;
    let weather = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "localidade": "São Paulo" })),
        )
        .mount(&viacep)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "no data" })))
        .mount(&weather)
        .await;

    let app = test_router(&viacep.uri(), &weather.uri());
    let (status, body) = post_cep(app, r#"{"cep":"01001000"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!((json["temp_C"].as_f64().unwrap() - 0.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_trace_context_propagated_to_both_upstreams() {
    opentelemetry::global::set_text_map_propagator(
        opentelemetry_sdk::propagation::TraceContextPropagator::new(),
    );

    let viacep = MockServer::start().await;
    let weather = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "localidade": "São Paulo" })),
        )
        .mount(&viacep)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "current": { "temp_c": 10.0 } })),
        )
        .mount(&weather)
        .await;

    let app = test_router(&viacep.uri(), &weather.uri());

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("traceparent", TRACEPARENT)
        .body(Body::from(r#"{"cep":"01001000"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for server in [&viacep, &weather] {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let traceparent = requests[0]
            .headers
            .get("traceparent")
            .expect("traceparent must be forwarded")
            .to_str()
            .unwrap();
        assert!(traceparent.contains("4bf92f3577b34da6a3ce929d0e0e4736"));
    }
}
