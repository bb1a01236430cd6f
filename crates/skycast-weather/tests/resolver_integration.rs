//! Integration tests for WeatherResolver using wiremock.
//!
//! These tests check the fallback chain against a mock OpenWeatherMap server,
//! including which queries were issued and in what order.

use std::time::Duration;

use skycast_core::{NetworkError, SearchConfig, WeatherConfig};
use skycast_weather::{
    FixedLocation, GeoCoordinate, InputProblem, LocationError, ResolutionError, SearchPolicy,
    UnavailableLocation, WeatherProvider, WeatherResolver,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_for(server: &MockServer, timeout_secs: u64) -> WeatherResolver {
    let config = WeatherConfig {
        api_key: "test_key".to_string(),
        base_url: server.uri(),
        timeout_secs,
        ..WeatherConfig::default()
    };
    let provider = WeatherProvider::new(&config).unwrap();
    WeatherResolver::new(provider, SearchPolicy::from(&SearchConfig::default()))
}

/// Helper to create a current-weather body
fn current_body(name: &str, country: &str, lat: f64, lon: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": lon, "lat": lat},
        "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds"}],
        "main": {"temp": 28.4, "feels_like": 30.1, "pressure": 1010, "humidity": 62},
        "visibility": 8000,
        "wind": {"speed": 3.6},
        "clouds": {"all": 40},
        "dt": 1760781600,
        "sys": {"country": country},
        "name": name
    })
}

/// Helper to create a forecast body with `count` 3-hourly entries
fn forecast_body(count: usize) -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "dt": 1760788800 + (i as i64) * 3 * 3600,
                "main": {"temp": 20.0 + i as f64, "temp_min": 19.0, "temp_max": 25.0},
                "weather": [{"main": "Rain", "description": "light rain"}]
            })
        })
        .collect();
    serde_json::json!({"cod": "200", "cnt": count, "list": list})
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(serde_json::json!({
        "cod": "404",
        "message": "city not found"
    }))
}

async fn mount_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
        .mount(server)
        .await;
}

/// `q` values of every /weather request, in arrival order
async fn weather_queries(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/weather")
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

async fn forecast_request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/forecast")
        .count()
}

#[tokio::test]
async fn test_first_candidate_short_circuits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Mumbai,IN"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Mumbai", "IN", 19.0144, 72.8479)),
        )
        .mount(&mock_server)
        .await;
    mount_forecast(&mock_server).await;

    let resolver = resolver_for(&mock_server, 5);
    let report = resolver.resolve_by_city("mumbai").await.unwrap();

    assert_eq!(report.snapshot.location_name, "Mumbai");
    assert_eq!(weather_queries(&mock_server).await, vec!["Mumbai,IN"]);
    assert_eq!(report.forecast.unwrap().len(), 40);
}

#[tokio::test]
async fn test_hyderabad_second_alias_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Hyderabad,IN"))
        .respond_with(not_found())
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Hyderabad,Telangana,IN"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Hyderabad", "IN", 17.3753, 78.4744)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", "17.3753"))
        .and(query_param("lon", "78.4744"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 5);
    let report = resolver.resolve_by_city("Hyderabad").await.unwrap();

    assert_eq!(report.snapshot.location_name, "Hyderabad");
    assert_eq!(
        weather_queries(&mock_server).await,
        vec!["Hyderabad,IN", "Hyderabad,Telangana,IN"]
    );
    assert!(report.has_forecast());
}

#[tokio::test]
async fn test_mapped_city_exhausts_aliases_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(not_found())
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 5);
    let result = resolver.resolve_by_city("Delhi").await;

    assert!(matches!(result, Err(ResolutionError::CityNotFound { .. })));
    assert_eq!(
        weather_queries(&mock_server).await,
        vec!["Delhi,IN", "New Delhi,IN", "Delhi,India"]
    );
}

#[tokio::test]
async fn test_every_mapped_city_queries_its_aliases_in_order() {
    let table: [(&str, &[&str]); 7] = [
        (
            "Hyderabad",
            &[
                "Hyderabad,IN",
                "Hyderabad,Telangana,IN",
                "Hyderabad,India",
                "Hyderabad,TS,IN",
            ],
        ),
        ("Mumbai", &["Mumbai,IN", "Mumbai,Maharashtra,IN", "Mumbai,India"]),
        ("delhi", &["Delhi,IN", "New Delhi,IN", "Delhi,India"]),
        (
            "BANGALORE",
            &["Bengaluru,IN", "Bangalore,IN", "Bengaluru,Karnataka,IN"],
        ),
        (
            "Chennai",
            &["Chennai,IN", "Chennai,Tamil Nadu,IN", "Chennai,India"],
        ),
        (
            " Kolkata ",
            &["Kolkata,IN", "Kolkata,West Bengal,IN", "Kolkata,India"],
        ),
        ("Pune", &["Pune,IN", "Pune,Maharashtra,IN", "Pune,India"]),
    ];

    for (input, expected) in table {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(not_found())
            .mount(&mock_server)
            .await;

        let resolver = resolver_for(&mock_server, 5);
        let result = resolver.resolve_by_city(input).await;

        assert!(
            matches!(result, Err(ResolutionError::CityNotFound { .. })),
            "{} should end as not found",
            input
        );
        assert_eq!(weather_queries(&mock_server).await, expected, "{}", input);
    }
}

#[tokio::test]
async fn test_atlantis_is_not_found_with_suggestions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(not_found())
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 5);
    let result = resolver.resolve_by_city("Atlantis").await;

    match result {
        Err(ResolutionError::CityNotFound { query, suggestions }) => {
            assert_eq!(query, "Atlantis");
            for city in ["Mumbai", "Delhi", "Chennai", "Bangalore", "Kolkata", "Pune"] {
                assert!(suggestions.iter().any(|s| s == city), "missing {}", city);
            }
        }
        other => panic!("expected CityNotFound, got {:?}", other),
    }

    assert_eq!(
        weather_queries(&mock_server).await,
        vec!["Atlantis", "Atlantis,India", "Atlantis,IN"]
    );
    assert_eq!(forecast_request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_provider_error_aborts_chain() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Springfield"))
        .respond_with(not_found())
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Springfield,India"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
        })))
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 5);
    let result = resolver.resolve_by_city("Springfield").await;

    assert!(matches!(
        result,
        Err(ResolutionError::Provider { status: 401, .. })
    ));
    assert_eq!(
        weather_queries(&mock_server).await,
        vec!["Springfield", "Springfield,India"]
    );
}

#[tokio::test]
async fn test_network_error_moves_to_next_candidate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Nagpur"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Wrong", "XX", 0.0, 0.0))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Nagpur,India"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Nagpur", "IN", 21.15, 79.1)),
        )
        .mount(&mock_server)
        .await;
    mount_forecast(&mock_server).await;

    let resolver = resolver_for(&mock_server, 1);
    let report = resolver.resolve_by_city("Nagpur").await.unwrap();

    assert_eq!(report.snapshot.location_name, "Nagpur");
    assert_eq!(
        weather_queries(&mock_server).await,
        vec!["Nagpur", "Nagpur,India"]
    );
}

#[tokio::test]
async fn test_blank_input_never_hits_network() {
    let mock_server = MockServer::start().await;

    let resolver = resolver_for(&mock_server, 5);

    for input in ["", "   ", "\t\n"] {
        let result = resolver.resolve_by_city(input).await;
        assert!(matches!(
            result,
            Err(ResolutionError::InvalidInput(InputProblem::BlankCity))
        ));
    }

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_forecast_failure_is_not_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Pune,IN"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Pune", "IN", 18.5196, 73.8553)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 5);
    let report = resolver.resolve_by_city("Pune").await.unwrap();

    assert_eq!(report.snapshot.location_name, "Pune");
    assert!(matches!(
        report.forecast,
        Err(ResolutionError::ForecastUnavailable(_))
    ));
}

#[tokio::test]
async fn test_coordinate_with_forecast_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "17.385"))
        .and(query_param("lon", "78.4867"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Hyderabad", "IN", 17.385, 78.4867)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body(40))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 1);
    let report = resolver
        .resolve_by_coordinate(GeoCoordinate::new(17.385, 78.4867))
        .await
        .unwrap();

    assert_eq!(report.snapshot.location_name, "Hyderabad");
    assert!(!report.has_forecast());
    assert!(matches!(
        report.forecast,
        Err(ResolutionError::ForecastUnavailable(_))
    ));
}

#[tokio::test]
async fn test_coordinate_network_error_is_terminal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Hyderabad", "IN", 17.385, 78.4867))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 1);
    let result = resolver
        .resolve_by_coordinate(GeoCoordinate::new(17.385, 78.4867))
        .await;

    assert!(matches!(
        result,
        Err(ResolutionError::Network(NetworkError::Timeout))
    ));
    assert_eq!(forecast_request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_coordinate_provider_error_is_terminal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "cod": 429,
            "message": "Your account is temporary blocked"
        })))
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 5);
    let result = resolver
        .resolve_by_coordinate(GeoCoordinate::new(17.385, 78.4867))
        .await;

    assert!(matches!(
        result,
        Err(ResolutionError::Provider { status: 429, .. })
    ));
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_out_of_range_coordinate_is_invalid_input() {
    let mock_server = MockServer::start().await;

    let resolver = resolver_for(&mock_server, 5);
    let result = resolver
        .resolve_by_coordinate(GeoCoordinate::new(123.0, 78.4867))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::InvalidInput(InputProblem::CoordinateOutOfRange(_))
    ));
    assert_ne!(err.user_message(), "Please enter a city name");
    assert!(err.user_message().starts_with("Invalid coordinates."));
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_exact_query_has_no_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(not_found())
        .mount(&mock_server)
        .await;

    let resolver = resolver_for(&mock_server, 5);
    let result = resolver.resolve_exact("London").await;

    assert!(matches!(result, Err(ResolutionError::CityNotFound { .. })));
    assert_eq!(weather_queries(&mock_server).await, vec!["London"]);
}

#[tokio::test]
async fn test_location_source_feeds_coordinate_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "52.52"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Berlin", "DE", 52.52, 13.405)),
        )
        .mount(&mock_server)
        .await;
    mount_forecast(&mock_server).await;

    let resolver = resolver_for(&mock_server, 5);
    let source = FixedLocation(GeoCoordinate::new(52.52, 13.405));
    let report = resolver.resolve_by_location(&source).await.unwrap();

    assert_eq!(report.snapshot.location_name, "Berlin");
}

#[tokio::test]
async fn test_unavailable_location_maps_to_error() {
    let mock_server = MockServer::start().await;

    let resolver = resolver_for(&mock_server, 5);
    let result = resolver.resolve_by_location(&UnavailableLocation).await;

    assert!(matches!(
        result,
        Err(ResolutionError::LocationUnavailable(LocationError::ServiceUnavailable))
    ));
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_daily_and_hourly_from_resolved_forecast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Kolkata", "IN", 22.5697, 88.3697)),
        )
        .mount(&mock_server)
        .await;
    mount_forecast(&mock_server).await;

    let resolver = resolver_for(&mock_server, 5);
    let report = resolver.resolve_by_city("Kolkata").await.unwrap();
    let forecast = report.forecast.unwrap();

    let daily = forecast.daily();
    let hourly = forecast.hourly();
    let all = forecast.points();

    assert_eq!(daily.len(), 5);
    for (day, index) in daily.iter().zip([0usize, 8, 16, 24, 32]) {
        assert_eq!(day, &all[index]);
    }
    assert_eq!(hourly.as_slice(), &all[0..8]);
}
