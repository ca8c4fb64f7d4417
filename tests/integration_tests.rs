//! End-to-end tests for the web front end.
//!
//! The router is driven in-process with `oneshot`; both upstream APIs are
//! replaced by wiremock servers.

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode, header};
use cityweather::api::{
    GEOLOCATION_SERVICE_ERROR, LOCATION_WEATHER_FAILED, MANUAL_LOOKUP_FAILED,
};
use cityweather::config::AppConfig;
use cityweather::location_resolver::{CITY_NOT_FOUND, LOCATION_FAILED};
use cityweather::models::ClientAddressSource;
use cityweather::{AppState, web};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLER: ([u8; 4], u16) = ([8, 8, 8, 8], 40000);

fn test_config(weather: &MockServer, geo_base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.weather.api_key = Some("test-key".to_string());
    config.weather.base_url = format!("{}/data/2.5", weather.uri());
    config.geolocation.base_url = geo_base_url.to_string();
    config
}

fn build_app(config: &AppConfig) -> Router {
    let state = AppState::from_config(config).unwrap();
    web::app(config, state).layer(MockConnectInfo(SocketAddr::from(CALLER)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn current_body(city: &str, temp: f64) -> Value {
    json!({
        "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": temp, "humidity": 40},
        "name": city,
        "sys": {"country": "FR"},
        "cod": 200
    })
}

fn paris_forecast() -> Value {
    json!({
        "cod": "200",
        "message": 0,
        "list": [
            {"dt_txt": "2024-01-01 12:00:00", "main": {"temp": 20.0},
             "weather": [{"description": "sunny intervals", "icon": "02d"}]},
            {"dt_txt": "2024-01-01 15:00:00", "main": {"temp": 15.0},
             "weather": [{"description": "light rain", "icon": "10d"}]}
        ]
    })
}

async fn mount_city(server: &MockServer, city: &str, current: Value, forecast: Value) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(current))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast))
        .mount(server)
        .await;
}

async fn mount_unknown_city(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"cod": "404", "message": "city not found"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_index_renders_form() {
    let weather = MockServer::start().await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (status, body) = send(app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<form method="post" action="/">"#));
    assert!(!body.contains("class=\"error\""));
}

#[tokio::test]
async fn test_info_page_makes_no_upstream_calls() {
    let weather = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&weather)
        .await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (status, body) = send(app, get("/info")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("About this app"));
}

#[tokio::test]
async fn test_manual_lookup_renders_daily_summary() {
    let weather = MockServer::start().await;
    mount_city(&weather, "Paris", current_body("Paris", 18.0), paris_forecast()).await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (status, body) = send(app, post_form("city=Paris")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Weather in Paris, FR"));
    assert!(body.contains("18.0°C"));
    assert!(body.contains(r#"<time datetime="2024-01-01">"#));
    assert!(body.contains("High: 20.0°C"));
    assert!(body.contains("Low: 15.0°C"));
    assert!(body.contains("sunny intervals"));
    assert!(!body.contains("light rain"));
}

#[tokio::test]
async fn test_manual_lookup_with_spaces_in_city() {
    let weather = MockServer::start().await;
    mount_city(
        &weather,
        "New York",
        current_body("New York", 5.0),
        paris_forecast(),
    )
    .await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (_, body) = send(app, post_form("city=New+York")).await;

    assert!(body.contains("Weather in New York, FR"));
}

#[tokio::test]
async fn test_empty_city_gives_generic_retry_message() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", ""))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"cod": "400", "message": "Nothing to geocode"})),
        )
        .expect(1..)
        .mount(&weather)
        .await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (status, body) = send(app, post_form("city=")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(MANUAL_LOOKUP_FAILED));
    assert!(body.contains(r#"name="city""#));
}

#[tokio::test]
async fn test_missing_city_field_is_treated_as_empty() {
    let weather = MockServer::start().await;
    mount_unknown_city(&weather).await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (status, body) = send(app, post_form("")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(MANUAL_LOOKUP_FAILED));
}

#[tokio::test]
async fn test_unknown_city_and_network_failure_share_one_message() {
    let weather = MockServer::start().await;
    mount_unknown_city(&weather).await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));
    let (_, not_found) = send(app, post_form("city=Atlantis")).await;

    let mut config = test_config(&weather, "http://127.0.0.1:9");
    config.weather.base_url = "http://127.0.0.1:9".to_string();
    let (_, unreachable) = send(build_app(&config), post_form("city=Paris")).await;

    assert!(not_found.contains(MANUAL_LOOKUP_FAILED));
    assert!(unreachable.contains(MANUAL_LOOKUP_FAILED));
}

#[tokio::test]
async fn test_empty_forecast_still_renders_results() {
    let weather = MockServer::start().await;
    mount_city(
        &weather,
        "Paris",
        current_body("Paris", 18.0),
        json!({"cod": "200", "list": []}),
    )
    .await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (_, body) = send(app, post_form("city=Paris")).await;

    assert!(body.contains("Weather in Paris, FR"));
    assert!(body.contains("No forecast available"));
    assert!(!body.contains(MANUAL_LOOKUP_FAILED));
}

#[tokio::test]
async fn test_user_input_is_escaped() {
    let weather = MockServer::start().await;
    mount_city(
        &weather,
        "<script>",
        json!({
            "weather": [{"description": "clear sky", "icon": "01d"}],
            "main": {"temp": 1.0},
            "name": "",
            "cod": 200
        }),
        paris_forecast(),
    )
    .await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (_, body) = send(app, post_form("city=%3Cscript%3E")).await;

    assert!(body.contains("Weather in &lt;script&gt;"));
    assert!(!body.contains("<script>"));
}

#[tokio::test]
async fn test_location_lookup_uses_detected_city() {
    let weather = MockServer::start().await;
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "country": "France", "regionName": "Auvergne-Rhône-Alpes", "city": "Lyon"
        })))
        .expect(1)
        .mount(&geo)
        .await;
    mount_city(&weather, "Lyon", current_body("Lyon", 11.0), paris_forecast()).await;
    let app = build_app(&test_config(&weather, &geo.uri()));

    let (status, body) = send(app, get("/location")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Weather in Lyon, FR"));
    assert!(body.contains("High: 20.0°C"));
}

#[tokio::test]
async fn test_location_failure_skips_weather_provider() {
    let weather = MockServer::start().await;
    let geo = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", 18.0)))
        .expect(0)
        .mount(&weather)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail", "message": "private range", "query": "8.8.8.8"
        })))
        .mount(&geo)
        .await;
    let app = build_app(&test_config(&weather, &geo.uri()));

    let (status, body) = send(app, get("/location")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(LOCATION_FAILED));
    assert!(body.contains(r#"name="city""#));
    assert!(!body.contains("private range"));
    weather.verify().await;
}

#[tokio::test]
async fn test_location_without_place_fields() {
    let weather = MockServer::start().await;
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(&geo)
        .await;
    let app = build_app(&test_config(&weather, &geo.uri()));

    let (_, body) = send(app, get("/location")).await;

    assert!(body.contains(CITY_NOT_FOUND));
}

#[tokio::test]
async fn test_geolocation_service_unreachable() {
    let weather = MockServer::start().await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (_, body) = send(app, get("/location")).await;

    assert!(body.contains(GEOLOCATION_SERVICE_ERROR));
}

#[tokio::test]
async fn test_location_weather_failure_has_location_message() {
    let weather = MockServer::start().await;
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "city": "Nowhere"
        })))
        .mount(&geo)
        .await;
    mount_unknown_city(&weather).await;
    let app = build_app(&test_config(&weather, &geo.uri()));

    let (_, body) = send(app, get("/location")).await;

    assert!(body.contains(LOCATION_WEATHER_FAILED));
}

#[tokio::test]
async fn test_forwarded_header_source() {
    let weather = MockServer::start().await;
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/198.51.100.23"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "city": "Lyon"
        })))
        .expect(1)
        .mount(&geo)
        .await;
    mount_city(&weather, "Lyon", current_body("Lyon", 11.0), paris_forecast()).await;

    let mut config = test_config(&weather, &geo.uri());
    config.geolocation.address_source = ClientAddressSource::XForwardedFor;
    let request = Request::builder()
        .uri("/location")
        .header("x-forwarded-for", "198.51.100.23, 10.0.0.1")
        .body(Body::empty())
        .unwrap();

    let (_, body) = send(build_app(&config), request).await;

    assert!(body.contains("Weather in Lyon, FR"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let weather = MockServer::start().await;
    let app = build_app(&test_config(&weather, "http://127.0.0.1:9"));

    let (status, _) = send(app, get("/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slow_provider_renders_retry_page() {
    let weather = MockServer::start().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Paris", 18.0))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&weather)
        .await;

    let mut config = test_config(&weather, "http://127.0.0.1:9");
    config.weather.timeout_seconds = 1;
    config.validate().unwrap();

    let (status, body) = send(build_app(&config), post_form("city=Paris")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(MANUAL_LOOKUP_FAILED));
}
