//! Report engine tests against an in-memory API

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use spacecount_runtime::{ApiResponse, ManualClock, ParamsSerializer, QueryParams, RuntimeError};
use spacecount_sdk::{
    Aggregation, EngineConfig, HttpClient, Metric, RelativeRange, ReportEngineBuilder, ReportRequest, SdkError,
    TimeRangeSpec,
};
use std::sync::{Arc, Mutex};

/// Serves one space and its buckets, recording every request
struct FakeApi {
    space: Value,
    buckets: Vec<Value>,
    requests: Mutex<Vec<(String, QueryParams)>>,
}

impl FakeApi {
    fn new(space: Value, buckets: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            space,
            buckets,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<(String, QueryParams)> {
        self.requests.lock().unwrap().clone()
    }

    fn counts_params(&self) -> QueryParams {
        self.requests()
            .into_iter()
            .find(|(url, _)| url.ends_with("/counts"))
            .map(|(_, params)| params)
            .expect("no counts request")
    }
}

#[async_trait]
impl HttpClient for FakeApi {
    async fn get(
        &self,
        url: &str,
        params: &QueryParams,
        _serializer: Option<&dyn ParamsSerializer>,
    ) -> Result<ApiResponse, RuntimeError> {
        self.requests.lock().unwrap().push((url.to_string(), params.clone()));

        if url.ends_with("/counts") {
            let page = params.get("page").and_then(Value::as_u64).unwrap_or(1);
            let body = if page == 1 { json!(self.buckets) } else { json!([]) };
            return Ok(ApiResponse::ok(body));
        }
        if url == "/spaces/spc_1" {
            return Ok(ApiResponse::ok(self.space.clone()));
        }
        Err(RuntimeError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn bucket(timestamp: &str, max: f64, entrances: f64) -> Value {
    json!({
        "timestamp": timestamp,
        "interval": {
            "start": timestamp,
            "analytics": {"max": max, "min": 0, "entrances": entrances, "exits": 0}
        }
    })
}

fn utc_space() -> Value {
    json!({"id": "spc_1", "name": "Lobby", "time_zone": "UTC", "capacity": 40})
}

fn engine_for(api: Arc<FakeApi>, config: EngineConfig) -> spacecount_sdk::ReportEngine {
    ReportEngineBuilder::new()
        .with_config(config)
        .with_client(api)
        .build()
        .expect("Failed to build engine")
}

#[tokio::test]
async fn test_single_day_occupancy_report() {
    let buckets = (0..5)
        .map(|h| bucket(&format!("2020-01-01T{:02}:00:00Z", h), f64::from(h + 1), 0.0))
        .collect();
    let api = FakeApi::new(utc_space(), buckets);
    let engine = engine_for(api.clone(), EngineConfig::new());

    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-01T00:00:00Z", "2020-01-01T05:00:00Z"),
    );
    let report = engine.hourly_report(&request).await.unwrap();

    assert_eq!(report.data.len(), 1);
    assert_eq!(report.data[0].date.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    assert_eq!(
        report.data[0].values,
        vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
    );
    assert_eq!(report.start_date.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    assert_eq!(report.end_date.to_rfc3339(), "2020-01-01T05:00:00+00:00");
    assert_eq!(report.metric, Metric::Occupancy);
    assert_eq!(report.aggregation, Aggregation::None);
    assert_eq!(report.space.name.as_deref(), Some("Lobby"));
    assert_eq!(report.space.extra.get("capacity"), Some(&json!(40)));

    let params = api.counts_params();
    assert_eq!(params.get("interval"), Some(&json!("1h")));
    assert_eq!(params.get("start_time"), Some(&json!("2020-01-01T00:00:00+00:00")));
    assert_eq!(params.get("end_time"), Some(&json!("2020-01-01T05:00:00+00:00")));
    assert_eq!(params.get("page"), Some(&json!(1)));
    assert_eq!(params.get("page_size"), Some(&json!(5000)));
    assert!(params.get("slow").is_none());
}

#[tokio::test]
async fn test_report_serializes_with_nulls() {
    let buckets = vec![
        bucket("2020-01-01T02:00:00Z", 2.0, 0.0),
        json!({"timestamp": "2020-01-01T03:00:00Z", "interval": {"analytics": {}}}),
    ];
    let api = FakeApi::new(utc_space(), buckets);
    let engine = engine_for(api, EngineConfig::new());

    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-01T02:00:00Z", "2020-01-01T04:00:00Z"),
    );
    let report = engine.hourly_report(&request).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["data"][0]["values"], json!([null, null, 2.0, null]));
    assert_eq!(json["metric"], json!("occupancy"));
    assert_eq!(json["aggregation"], json!("none"));
    assert_eq!(json["space"]["timeZone"], json!("UTC"));
    assert!(json.get("startDate").is_some());
}

#[tokio::test]
async fn test_weekday_sum_of_entrances_in_local_time() {
    // Wednesdays 2020-01-01 and 2020-01-08, 09:00 and 10:00 in New York
    let buckets = vec![
        bucket("2020-01-01T14:00:00Z", 0.0, 10.0),
        bucket("2020-01-01T15:00:00Z", 0.0, 4.0),
        bucket("2020-01-08T14:00:00Z", 0.0, 20.0),
        bucket("2020-01-08T15:00:00Z", 0.0, 6.0),
    ];
    let space = json!({"id": 7, "time_zone": "America/New_York"});
    let api = FakeApi::new(space, buckets);
    let engine = engine_for(api, EngineConfig::new().with_slow(true));

    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-01T00:00:00", "2020-01-09T00:00:00"),
    )
    .with_metric(Metric::Entrances)
    .with_aggregation(Aggregation::Sum);

    let report = engine.hourly_report(&request).await.unwrap();

    assert_eq!(report.space.id, "7");
    assert_eq!(report.data.len(), 1);
    // Padded back to local midnight, then 09:00 and 10:00
    let values = &report.data[0].values;
    assert_eq!(values.len(), 11);
    assert_eq!(values[9], Some(30.0));
    assert_eq!(values[10], Some(10.0));
    assert_eq!(report.data[0].date.to_rfc3339(), "2020-01-08T00:00:00-05:00");
    assert_eq!(report.start_date.to_rfc3339(), "2020-01-01T00:00:00-05:00");
}

#[tokio::test]
async fn test_slow_flag_and_relative_range() {
    let api = FakeApi::new(utc_space(), vec![bucket("2020-03-09T00:00:00Z", 1.0, 0.0)]);
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2020, 3, 11, 15, 30, 0).unwrap()));
    let engine = ReportEngineBuilder::new()
        .with_config(EngineConfig::new().with_slow(true).with_interval("15m"))
        .with_client(api.clone())
        .with_clock(clock)
        .build()
        .unwrap();

    let request = ReportRequest::new("spc_1", TimeRangeSpec::relative(RelativeRange::Yesterday));
    let report = engine.hourly_report(&request).await.unwrap();
    assert_eq!(report.start_date.to_rfc3339(), "2020-03-10T00:00:00+00:00");
    assert_eq!(report.end_date.to_rfc3339(), "2020-03-11T00:00:00+00:00");

    let params = api.counts_params();
    assert_eq!(params.get("slow"), Some(&json!("true")));
    assert_eq!(params.get("interval"), Some(&json!("15m")));
    assert_eq!(params.get("start_time"), Some(&json!("2020-03-10T00:00:00+00:00")));
}

#[tokio::test]
async fn test_explicit_date_overrides_clock() {
    let api = FakeApi::new(utc_space(), vec![bucket("2020-01-01T00:00:00Z", 1.0, 0.0)]);
    let engine = engine_for(api, EngineConfig::new());

    let request = ReportRequest::new("spc_1", TimeRangeSpec::relative(RelativeRange::Today)).with_date("2020-06-15");
    let report = engine.hourly_report(&request).await.unwrap();

    assert_eq!(report.start_date.to_rfc3339(), "2020-06-15T00:00:00+00:00");
    assert_eq!(report.end_date.to_rfc3339(), "2020-06-16T00:00:00+00:00");
}

#[tokio::test]
async fn test_repeated_reports_hit_the_cache() {
    let api = FakeApi::new(utc_space(), vec![bucket("2020-01-01T00:00:00Z", 1.0, 0.0)]);
    let engine = engine_for(api.clone(), EngineConfig::new());
    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-01T00:00:00Z", "2020-01-01T01:00:00Z"),
    );

    let first = engine.hourly_report(&request).await.unwrap();
    let second = engine.hourly_report(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.requests().len(), 2);
    assert!(engine.fetcher().cache().stats().hits >= 2);
}

#[tokio::test]
async fn test_disabled_cache_refetches() {
    let api = FakeApi::new(utc_space(), vec![bucket("2020-01-01T00:00:00Z", 1.0, 0.0)]);
    let engine = engine_for(api.clone(), EngineConfig::new().enable_cache(false));
    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-01T00:00:00Z", "2020-01-01T01:00:00Z"),
    );

    engine.hourly_report(&request).await.unwrap();
    engine.hourly_report(&request).await.unwrap();

    assert_eq!(api.requests().len(), 4);
    assert!(engine.fetcher().cache().is_empty());
}

#[tokio::test]
async fn test_no_buckets_is_an_error() {
    let api = FakeApi::new(utc_space(), Vec::new());
    let engine = engine_for(api, EngineConfig::new());
    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-01T00:00:00Z", "2020-01-01T01:00:00Z"),
    );

    let err = engine.hourly_report(&request).await.unwrap_err();
    assert!(matches!(err, SdkError::Runtime(RuntimeError::EmptyInput)));
}

#[tokio::test]
async fn test_weekend_only_range_excluding_weekends_is_an_error() {
    // 2020-01-04 is a Saturday
    let api = FakeApi::new(utc_space(), vec![bucket("2020-01-04T10:00:00Z", 1.0, 0.0)]);
    let engine = engine_for(api, EngineConfig::new());
    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-04T00:00:00Z", "2020-01-05T00:00:00Z").excluding_weekends(),
    );

    let err = engine.hourly_report(&request).await.unwrap_err();
    assert!(matches!(err, SdkError::Runtime(RuntimeError::EmptyInput)));
}

#[tokio::test]
async fn test_space_without_time_zone_is_invalid() {
    let api = FakeApi::new(json!({"id": "spc_1"}), Vec::new());
    let engine = engine_for(api, EngineConfig::new());
    let request = ReportRequest::new("spc_1", TimeRangeSpec::relative(RelativeRange::Today));

    let err = engine.hourly_report(&request).await.unwrap_err();
    assert!(matches!(err, SdkError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unknown_space_propagates_status() {
    let api = FakeApi::new(utc_space(), Vec::new());
    let engine = engine_for(api, EngineConfig::new());
    let request = ReportRequest::new("spc_missing", TimeRangeSpec::relative(RelativeRange::Today));

    let err = engine.hourly_report(&request).await.unwrap_err();
    assert!(matches!(
        err,
        SdkError::Runtime(RuntimeError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let api = FakeApi::new(utc_space(), Vec::new());
    let engine = engine_for(api.clone(), EngineConfig::new());
    let request = ReportRequest::new(
        "spc_1",
        TimeRangeSpec::absolute("2020-01-02T00:00:00Z", "2020-01-01T00:00:00Z"),
    );

    let err = engine.hourly_report(&request).await.unwrap_err();
    assert!(matches!(err, SdkError::Core(_)));
    // Only the space was fetched
    assert_eq!(api.requests().len(), 1);
}
