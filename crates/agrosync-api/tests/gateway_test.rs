#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agrosync_api::types::{CreateFacilityBody, CreatePlotBody, CreateSpeciesBody, ThresholdsBody};
use agrosync_api::{ApiClient, Error, ErrorKind, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

async fn mount_error(server: &MockServer, verb: &str, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

// ── Facilities ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_facilities_unwraps_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/facilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "facilities": [
                { "facility_id": "f-1", "name": "North Greenhouse", "location": "Valencia" },
                { "facility_id": "f-2", "name": "South Field" }
            ]
        })))
        .mount(&server)
        .await;

    let facilities = client.list_facilities().await.unwrap();
    assert_eq!(facilities.len(), 2);
    assert_eq!(facilities[0].name, "North Greenhouse");
    assert_eq!(facilities[1].location, None);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let transport =
        TransportConfig::default().with_access_token(SecretString::from("tok-123".to_owned()));
    let client = ApiClient::new(&server.uri(), &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/facilities"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "facilities": [] })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.list_facilities().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_facility_returns_canonical_record() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/facilities"))
        .and(body_json(json!({ "name": "Orchard", "location": "Murcia" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Facility created",
            "facility": {
                "facility_id": "f-9",
                "name": "Orchard",
                "location": "Murcia",
                "created_at": "2024-05-01T10:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    let body = CreateFacilityBody {
        name: "Orchard".into(),
        location: "Murcia".into(),
    };
    let facility = client.create_facility(&body).await.unwrap();
    assert_eq!(facility.facility_id, "f-9");
    assert_eq!(facility.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));
}

// ── Plots and sensor state ──────────────────────────────────────────

#[tokio::test]
async fn test_list_facility_plots() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/facilities/f-1/plots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "plots": [{
                "plot_id": "p-1",
                "facility_id": "f-1",
                "name": "Tomatoes A",
                "species": "Tomato",
                "area": 120.5,
                "mac_address": "AA:BB:CC:DD:EE:FF"
            }]
        })))
        .mount(&server)
        .await;

    let plots = client.list_facility_plots("f-1").await.unwrap();
    assert_eq!(plots.len(), 1);
    assert_eq!(plots[0].area, Some(120.5));
}

#[tokio::test]
async fn test_create_plot_omits_absent_optionals() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/plots"))
        .and(body_json(json!({
            "facility_id": "f-1",
            "name": "Lettuce",
            "location": "Row 4",
            "mac_address": "11:22:33:44:55:66"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "plot": { "plot_id": "p-7", "facility_id": "f-1", "name": "Lettuce" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = CreatePlotBody {
        facility_id: "f-1".into(),
        name: "Lettuce".into(),
        location: "Row 4".into(),
        mac_address: "11:22:33:44:55:66".into(),
        species: None,
        area: None,
    };
    let plot = client.create_plot(&body).await.unwrap();
    assert_eq!(plot.plot_id, "p-7");
}

#[tokio::test]
async fn test_plot_state_404_is_not_found() {
    let (server, client) = setup().await;
    mount_error(
        &server,
        "GET",
        "/plots/p-1/state",
        404,
        json!({ "detail": "No state found for plot" }),
    )
    .await;

    let err = client.get_plot_state("p-1").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_plot_state_500_is_transient() {
    let (server, client) = setup().await;
    mount_error(&server, "GET", "/plots/p-1/state", 500, json!({ "detail": "boom" })).await;

    let err = client.get_plot_state("p-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_plot_history_keeps_backend_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/plots/p-1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "history": [
                { "plot_id": "p-1", "timestamp": "2024-05-02T10:00:00Z", "temperature": 21.5 },
                { "plot_id": "p-1", "timestamp": "2024-05-01T10:00:00Z", "humidity": 60.0 }
            ]
        })))
        .mount(&server)
        .await;

    let history = client.get_plot_history("p-1").await.unwrap();
    assert_eq!(history[0].timestamp, "2024-05-02T10:00:00Z");
    assert_eq!(history[1].temperature, None);
}

// ── Irrigation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_last_irrigation_accepts_capitalised_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/plots/p-1/last-irrigation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plot_id": "p-1",
            "last_irrigation": "2024-05-02T06:00:00Z",
            "details": {
                "PlotId": "p-1",
                "Timestamp": "2024-05-02T06:00:00Z",
                "duration": 15,
                "water_amount": 42.0,
                "type": "scheduled"
            }
        })))
        .mount(&server)
        .await;

    let last = client.get_last_irrigation("p-1").await.unwrap();
    assert_eq!(last.details.plot_id.as_deref(), Some("p-1"));
    assert_eq!(last.details.irrigation_type.as_deref(), Some("scheduled"));
    assert_eq!(last.details.water_amount, Some(42.0));
}

#[tokio::test]
async fn test_facility_irrigations_passes_date() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/facilities/f-1/irrigations"))
        .and(query_param("date", "2024-05-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "facility_id": "f-1",
            "date": "2024-05-02",
            "irrigations_by_plot": {
                "p-1": [{ "timestamp": "2024-05-02T06:00:00Z", "details": { "water_amount": 10.0 } }]
            },
            "total_events": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let resp = client.list_facility_irrigations("f-1", Some(date)).await.unwrap();
    assert_eq!(resp.total_events, 1);
    assert_eq!(resp.irrigations_by_plot["p-1"].len(), 1);
}

// ── Species ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_species_list_and_create() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/species"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "species": [{ "pk": "SPECIES#tomato", "name": "Tomato" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/species"))
        .and(body_json(json!({ "name": "Basil" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "species": { "species_id": "s-basil", "name": "Basil" }
        })))
        .mount(&server)
        .await;

    let species = client.list_species().await.unwrap();
    assert_eq!(species[0].species_id.as_deref(), Some("SPECIES#tomato"));

    let created = client
        .create_species(&CreateSpeciesBody { name: "Basil".into() })
        .await
        .unwrap();
    assert_eq!(created.species_id.as_deref(), Some("s-basil"));
}

// ── Thresholds ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_thresholds_round_trip_wire_names() {
    let (server, client) = setup().await;

    let sent = json!({
        "species_id": "s-1",
        "MinTemperature": 10.0,
        "MaxTemperature": 30.0,
        "MinHumidity": null,
        "MaxHumidity": null,
        "MinLight": null,
        "MaxLight": null,
        "MinIrrigation": null,
        "MaxIrrigation": null,
        "umbral_enabled": false
    });
    let stored = json!({
        "species_id": "s-1",
        "MinTemperature": 10.0,
        "MaxTemperature": 30.0,
        "umbral_enabled": false
    });
    Mock::given(method("PUT"))
        .and(path("/plots/p-1/thresholds"))
        .and(body_json(sent))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored))
        .expect(1)
        .mount(&server)
        .await;

    let body = ThresholdsBody {
        species_id: "s-1".into(),
        min_temperature: Some(10.0),
        max_temperature: Some(30.0),
        enabled: Some(false),
        ..ThresholdsBody::default()
    };
    let saved = client.put_plot_thresholds("p-1", &body).await.unwrap();
    assert_eq!(saved, body);
}

#[tokio::test]
async fn test_cleared_bounds_are_sent_as_null() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/plots/p-1/thresholds"))
        .and(body_json(json!({
            "species_id": "tomato",
            "MinTemperature": null,
            "MaxTemperature": null,
            "MinHumidity": 40.0,
            "MaxHumidity": null,
            "MinLight": null,
            "MaxLight": null,
            "MinIrrigation": null,
            "MaxIrrigation": null,
            "umbral_enabled": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "species_id": "tomato",
            "MinHumidity": 40.0,
            "umbral_enabled": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = ThresholdsBody {
        species_id: "tomato".into(),
        min_humidity: Some(40.0),
        enabled: Some(true),
        ..ThresholdsBody::default()
    };
    let saved = client.put_plot_thresholds("p-1", &body).await.unwrap();
    assert_eq!(saved.min_temperature, None);
    assert_eq!(saved.max_temperature, None);
}

#[tokio::test]
async fn test_threshold_validation_detail_is_surfaced() {
    let (server, client) = setup().await;
    mount_error(
        &server,
        "PUT",
        "/plots/p-1/thresholds",
        422,
        json!({ "detail": [{ "loc": ["body", "species_id"], "msg": "field required" }] }),
    )
    .await;

    let err = client
        .put_plot_thresholds("p-1", &ThresholdsBody::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        Error::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "field required");
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}

// ── Responsibles ────────────────────────────────────────────────────

#[tokio::test]
async fn test_put_responsibles_sends_full_list() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/facilities/f-1/responsibles"))
        .and(body_json(json!({ "responsibles": ["a@farm.io", "b@farm.io"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "facility_id": "f-1",
            "responsibles": ["a@farm.io", "b@farm.io"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = vec!["a@farm.io".to_owned(), "b@farm.io".to_owned()];
    let echoed = client.put_responsibles("f-1", &list).await.unwrap();
    assert_eq!(echoed, list);
}

// ── Error taxonomy ──────────────────────────────────────────────────

#[tokio::test]
async fn test_401_is_unauthorized() {
    let (server, client) = setup().await;
    mount_error(&server, "GET", "/facilities", 401, json!({ "detail": "Token expired" })).await;

    let err = client.list_facilities().await.unwrap_err();
    assert!(err.is_unauthorized(), "got: {err:?}");
}

#[tokio::test]
async fn test_malformed_success_body_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/species"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client.list_species().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // Nothing listens on the discard port.
    let client = ApiClient::from_reqwest("http://127.0.0.1:9", reqwest::Client::new()).unwrap();
    let err = client.list_facilities().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.kind(), ErrorKind::Transient);
}
