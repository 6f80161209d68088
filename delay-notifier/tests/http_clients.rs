//! HTTP client tests against a mock API and feed.

use std::sync::Arc;

use chrono::{DateTime, Duration};
use delay_notifier::domain::{NewNotification, NotificationId, ProviderKind, StationCode};
use delay_notifier::feed::{FeedConfig, FeedError, ScheduleClient, ScheduleSource};
use delay_notifier::handler::{HandlerRegistry, TransitDelayHandler};
use delay_notifier::reconcile::Reconciler;
use delay_notifier::stations::StationDirectory;
use delay_notifier::store::{
    ApiClient, HttpNotificationStore, HttpProviderSource, NotificationStore, ProviderSource,
    StoreConfig, StoreError,
};
use delay_notifier::tracker::ProviderTracker;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> ApiClient {
    ApiClient::new(StoreConfig::new(server.uri())).unwrap()
}

fn new_notification(title: &str) -> NewNotification {
    let start = DateTime::parse_from_rfc3339("2026-10-19T08:00:00-04:00").unwrap();
    NewNotification {
        title: title.to_string(),
        message: None,
        start_time: start,
        end_time: start + Duration::minutes(15),
        source: Some("njtransit".to_string()),
    }
}

fn envelope(json: &serde_json::Value) -> String {
    let escaped = json
        .to_string()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;");
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><string xmlns="http://microsoft.com/webservices/">{escaped}</string>"#
    )
}

fn summit_board() -> serde_json::Value {
    json!({"STATION": {
        "STATION_2CHAR": "ST",
        "STATIONNAME": "Summit",
        "ITEMS": {"ITEM": [
            {
                "TRAIN_ID": "6612",
                "STATUS": "Late",
                "SEC_LATE": "600",
                "STOPS": {"STOP": [
                    {"NAME": "Summit", "DEPARTED": "NO"},
                    {"NAME": "Newark Broad Street", "DEPARTED": "NO"},
                    {"NAME": "New York Penn Station", "DEPARTED": "NO"}
                ]}
            },
            {
                "TRAIN_ID": "6615",
                "STATUS": "Late",
                "SEC_LATE": "900",
                "STOPS": {"STOP": [
                    {"NAME": "New York Penn Station", "DEPARTED": "YES"},
                    {"NAME": "Summit", "DEPARTED": "NO"}
                ]}
            }
        ]}
    }})
}

#[tokio::test]
async fn provider_listing_skips_unsupported_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "p1", "type": "NJTransit",
             "njtransit": {"orig_station_code": "ST", "dest_station_code": "NY"}},
            {"_id": "w1", "type": "Weather"}
        ])))
        .mount(&server)
        .await;

    let providers = HttpProviderSource::new(api(&server))
        .list_providers()
        .await
        .unwrap();

    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].id.as_str(), "p1");
    assert_eq!(providers[0].kind, ProviderKind::TransitDelay);
}

#[tokio::test]
async fn provider_listing_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/providers"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let err = HttpProviderSource::new(api(&server))
        .list_providers()
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Api { status: 503, .. }));
}

#[tokio::test]
async fn basic_auth_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/providers"))
        .and(header("authorization", "Basic bWU6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/providers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let authed = ApiClient::new(StoreConfig::new(server.uri()).with_basic_auth("me", "secret"))
        .unwrap();
    assert!(HttpProviderSource::new(authed).list_providers().await.is_ok());

    let err = HttpProviderSource::new(api(&server))
        .list_providers()
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized));
}

#[tokio::test]
async fn create_reads_location_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .and(body_partial_json(json!({"title": "late", "source": "njtransit"})))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/notifications/n-42", server.uri())),
        )
        .mount(&server)
        .await;

    let id = HttpNotificationStore::new(api(&server))
        .create(&new_notification("late"))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "n-42");
}

#[tokio::test]
async fn create_falls_back_to_body_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "n-7"})))
        .mount(&server)
        .await;

    let id = HttpNotificationStore::new(api(&server))
        .create(&new_notification("late"))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "n-7");
}

#[tokio::test]
async fn create_without_id_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let err = HttpNotificationStore::new(api(&server))
        .create(&new_notification("late"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingId));
}

#[tokio::test]
async fn list_passes_only_current() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("only_current", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "a", "title": "old", "start_time": "2026-10-19T08:00:00-04:00",
             "end_time": "2026-10-19T08:15:00-04:00", "source": "njtransit"},
            {"_id": "b", "title": "manual", "start_time": "2026-10-19T08:00:00-04:00",
             "end_time": "2026-10-19T09:00:00-04:00"}
        ])))
        .mount(&server)
        .await;

    let listed = HttpNotificationStore::new(api(&server))
        .list(false)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].has_source("njtransit"));
    assert!(listed[1].source.is_none());
}

#[tokio::test]
async fn delete_status_handling() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/notifications/gone"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/notifications/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = HttpNotificationStore::new(api(&server));
    store
        .delete(&NotificationId::new("gone".to_string()).unwrap())
        .await
        .unwrap();

    let err = store
        .delete(&NotificationId::new("missing".to_string()).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Api { status: 404, .. }));
}

#[tokio::test]
async fn feed_decodes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getTrainScheduleJSON"))
        .and(query_param("station", "ST"))
        .and(query_param("username", "rider"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(&summit_board())))
        .mount(&server)
        .await;

    let client =
        ScheduleClient::new(FeedConfig::new("rider", "pw").with_base_url(server.uri())).unwrap();
    let schedule = client
        .station_schedule(&StationCode::parse("ST").unwrap())
        .await
        .unwrap();

    assert_eq!(schedule.code.as_deref(), Some("ST"));
    assert_eq!(schedule.items.len(), 2);
    assert_eq!(schedule.items[0].seconds_late, 600);
    assert_eq!(schedule.items[0].stops.len(), 3);
}

#[tokio::test]
async fn feed_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getTrainScheduleJSON"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client =
        ScheduleClient::new(FeedConfig::new("rider", "bad").with_base_url(server.uri())).unwrap();
    let err = client
        .station_schedule(&StationCode::parse("ST").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Unauthorized));
}

#[tokio::test]
async fn full_cycle_against_mock_services() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "p1", "type": "NJTransit",
             "njtransit": {"orig_station_code": "ST", "dest_station_code": "NY"}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getTrainScheduleJSON"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(&summit_board())))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .and(body_partial_json(json!({
            "title": "Train 6612 from Summit to New York Penn Station is 10 minutes late",
            "source": "njtransit"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "n-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let feed =
        ScheduleClient::new(FeedConfig::new("rider", "pw").with_base_url(server.uri())).unwrap();
    let stations = StationDirectory::from_pairs([
        ("ST", "summit"),
        ("NY", "new york penn station"),
    ]);
    let registry = HandlerRegistry::new().with(
        ProviderKind::TransitDelay,
        Arc::new(TransitDelayHandler::new(Arc::new(feed), Arc::new(stations))),
    );
    let mut tracker = ProviderTracker::new(
        Arc::new(HttpProviderSource::new(api.clone())),
        registry,
        Reconciler::new(Arc::new(HttpNotificationStore::new(api))),
    );

    let report = tracker.run_cycle().await;
    assert_eq!(report.added, 1);
    assert_eq!(report.reconciled, 1);
    assert_eq!(report.poll_failures, 0);

    let id = delay_notifier::domain::ProviderId::new("p1".to_string()).unwrap();
    let state = tracker.state(&id).unwrap();
    assert_eq!(state.applied.len(), 1);
    assert_eq!(state.applied[0].id.as_str(), "n-1");
}

#[tokio::test]
async fn purge_survives_foreign_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("only_current", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "stale-1", "title": "old", "start_time": "2026-10-19T08:00:00-04:00",
             "end_time": "2026-10-19T08:15:00-04:00", "source": "njtransit"},
            {"_id": "w1", "title": "rain", "source": "weather",
             "start_time": "2026-10-19T08:00:00", "end_time": "2026-10-19T09:00:00"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/notifications/stale-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let feed =
        ScheduleClient::new(FeedConfig::new("rider", "pw").with_base_url(server.uri())).unwrap();
    let registry = HandlerRegistry::new().with(
        ProviderKind::TransitDelay,
        Arc::new(TransitDelayHandler::new(
            Arc::new(feed),
            Arc::new(StationDirectory::default()),
        )),
    );
    let tracker = ProviderTracker::new(
        Arc::new(HttpProviderSource::new(api.clone())),
        registry,
        Reconciler::new(Arc::new(HttpNotificationStore::new(api))),
    );

    let report = tracker.purge_stale().await.unwrap();
    assert_eq!(report.matched, 1);
    assert_eq!(report.deleted, 1);
}
