use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use fertigate::config::{ClassifierErrorStatus, Config};
use fertigate::{
    routes, ClassificationGateway, Classifier, FeatureVector, RequestCoordinator, TelemetryStore,
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Classifier stub: fixed answer, counts invocations.
struct CountingClassifier {
    code: i64,
    calls: AtomicUsize,
}

impl Classifier for CountingClassifier {
    fn predict(&self, _features: &FeatureVector) -> anyhow::Result<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.code)
    }
}

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        Ok((resp.status(), resp.json().await?))
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let resp = self.client.get(self.url(path)).send().await?;
        Ok((resp.status(), resp.json().await?))
    }
}

async fn spawn(gateway: ClassificationGateway, config: Config) -> Result<TestServer> {
    // ---
    let coordinator = RequestCoordinator::new(Arc::new(TelemetryStore::new()), gateway, &config);
    let app = routes::router(coordinator);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(TestServer {
        base: format!("http://{addr}"),
        client: Client::new(),
    })
}

async fn spawn_with_stub(code: i64) -> Result<(TestServer, Arc<CountingClassifier>)> {
    let stub = Arc::new(CountingClassifier {
        code,
        calls: AtomicUsize::new(0),
    });
    let server = spawn(ClassificationGateway::new(stub.clone()), Config::default()).await?;
    Ok((server, stub))
}

#[tokio::test]
async fn sensor_push_then_read() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(0).await?;

    let (status, body) = server.get("/get_sensor_data").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"temperature": 0.0, "humidity": 0.0, "soil_moisture": 0.0})
    );

    let (status, body) = server
        .post(
            "/sensor",
            json!({"temperature": 25.0, "humidity": 60.0, "soil_moisture": 30.0}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "success", "message": "Sensor data received"})
    );

    let (status, body) = server.get("/get_sensor_data").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"temperature": 25.0, "humidity": 60.0, "soil_moisture": 30.0})
    );
    Ok(())
}

#[tokio::test]
async fn sensor_missing_field_keeps_previous_reading() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(0).await?;
    server
        .post(
            "/sensor",
            json!({"temperature": 25.0, "humidity": 60.0, "soil_moisture": 30.0}),
        )
        .await?;

    let (status, body) = server
        .post("/sensor", json!({"temperature": 40.0, "soil_moisture": 10.0}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Missing required sensor data!"})
    );

    let (_, body) = server.get("/get_sensor_data").await?;
    assert_eq!(
        body,
        json!({"temperature": 25.0, "humidity": 60.0, "soil_moisture": 30.0})
    );
    Ok(())
}

#[tokio::test]
async fn sensor_malformed_body_is_invalid_data() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(0).await?;

    let resp = server
        .client
        .post(server.url("/sensor"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({"status": "error", "message": "Invalid data"}));

    let (status, body) = server
        .post(
            "/sensor",
            json!({"temperature": "hot", "humidity": 60.0, "soil_moisture": 30.0}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid data");

    // Positional arrays are not a valid reading.
    let (status, body) = server.post("/sensor", json!([25.0, 60.0, 30.0])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid data");

    let (_, body) = server.get("/get_sensor_data").await?;
    assert_eq!(body["temperature"], 0.0);
    Ok(())
}

#[tokio::test]
async fn irrigation_state_round_trip() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(0).await?;

    let (_, body) = server.get("/get_irrigation_state").await?;
    assert_eq!(body, json!({"irrigation_state": false}));

    let (status, body) = server
        .post("/set_irrigation_state", json!({"state": true}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "irrigation_state": true}));

    let (_, body) = server.get("/get_irrigation_state").await?;
    assert_eq!(body, json!({"irrigation_state": true}));
    Ok(())
}

#[tokio::test]
async fn irrigation_invalid_request() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(0).await?;

    for body in [
        json!({}),
        json!({"state": null}),
        json!({"state": "on"}),
        json!([true]),
    ] {
        let (status, resp) = server.post("/set_irrigation_state", body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp, json!({"success": false, "message": "Invalid request"}));
    }

    let (_, body) = server.get("/get_irrigation_state").await?;
    assert_eq!(body, json!({"irrigation_state": false}));
    Ok(())
}

#[tokio::test]
async fn process_data_predicts_from_live_telemetry() -> Result<()> {
    // ---
    let (server, stub) = spawn_with_stub(6).await?;
    server
        .post(
            "/sensor",
            json!({"temperature": 25.0, "humidity": 60.0, "soil_moisture": 30.0}),
        )
        .await?;

    let (status, body) = server
        .post(
            "/process_data",
            json!({
                "nitrogen": 10, "potassium": 10, "phosphorous": 10,
                "soilType": "Sandy", "cropType": "Wheat"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Predicted Fertilizer": "Urea"}));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn process_data_unknown_soil_skips_classifier() -> Result<()> {
    // ---
    let (server, stub) = spawn_with_stub(6).await?;

    let (status, body) = server
        .post(
            "/process_data",
            json!({
                "nitrogen": 10, "potassium": 10, "phosphorous": 10,
                "soilType": "Unknown-Type", "cropType": "Wheat"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Invalid Soil or Crop Type"})
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn process_data_unmapped_code_is_unknown() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(42).await?;

    let (status, body) = server
        .post(
            "/process_data",
            json!({
                "nitrogen": 5, "potassium": 0, "phosphorous": 36,
                "soilType": "Black", "cropType": "Maize"
            }),
        )
        .await?;
    // "Black" is not a known soil class.
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Soil or Crop Type");

    let (status, body) = server
        .post(
            "/process_data",
            json!({
                "nitrogen": 5, "potassium": 0, "phosphorous": 36,
                "soilType": "Clayey", "cropType": "Maize"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Predicted Fertilizer": "Unknown"}));
    Ok(())
}

#[tokio::test]
async fn process_data_without_classifier() -> Result<()> {
    // ---
    let server = spawn(ClassificationGateway::unavailable(), Config::default()).await?;
    let payload = json!({
        "nitrogen": 10, "potassium": 10, "phosphorous": 10,
        "soilType": "Loamy", "cropType": "Rice"
    });

    let (status, body) = server.post("/process_data", payload.clone()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Classifier unavailable"})
    );

    let config = Config {
        classifier_error_status: ClassifierErrorStatus::ServerError,
        ..Config::default()
    };
    let server = spawn(ClassificationGateway::unavailable(), config).await?;
    let (status, _) = server.post("/process_data", payload).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn process_data_missing_nutrient() -> Result<()> {
    // ---
    let (server, stub) = spawn_with_stub(6).await?;

    let (status, body) = server
        .post(
            "/process_data",
            json!({"nitrogen": 10, "phosphorous": 10, "soilType": "Sandy", "cropType": "Wheat"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Missing required field: potassium"})
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn health_reports_classifier_and_last_reading() -> Result<()> {
    // ---
    let server = spawn(ClassificationGateway::unavailable(), Config::default()).await?;

    let (status, body) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["classifier"], "unavailable");
    assert!(body["last_reading_at"].is_null());

    server
        .post(
            "/sensor",
            json!({"temperature": 1.0, "humidity": 2.0, "soil_moisture": 3.0}),
        )
        .await?;
    let (_, body) = server.get("/health").await?;
    assert!(body["last_reading_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn concurrent_pushes_never_mix_readings() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(0).await?;
    let server = Arc::new(server);

    let mut tasks = Vec::new();
    for id in 1..=16 {
        let server = Arc::clone(&server);
        tasks.push(tokio::spawn(async move {
            let v = id as f64;
            server
                .post(
                    "/sensor",
                    json!({"temperature": v, "humidity": v, "soil_moisture": v}),
                )
                .await
        }));
    }
    for task in tasks {
        let (status, _) = task.await??;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = server.get("/get_sensor_data").await?;
    let t = body["temperature"].as_f64().unwrap_or(-1.0);
    assert!((1.0..=16.0).contains(&t));
    assert_eq!(body["humidity"].as_f64(), Some(t));
    assert_eq!(body["soil_moisture"].as_f64(), Some(t));
    Ok(())
}

#[tokio::test]
async fn cors_allows_any_origin() -> Result<()> {
    // ---
    let (server, _) = spawn_with_stub(0).await?;
    let resp = server
        .client
        .get(server.url("/get_irrigation_state"))
        .header("origin", "http://dashboard.local")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .contains_key("access-control-allow-origin"));
    Ok(())
}

#[tokio::test]
async fn process_data_malformed_body_reports_detail() -> Result<()> {
    // ---
    let (server, stub) = spawn_with_stub(6).await?;

    let resp = server
        .client
        .post(server.url("/process_data"))
        .header("content-type", "application/json")
        .body("{\"soilType\": ")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = server
        .post("/process_data", json!(["Sandy", "Wheat", 10, 10, 10]))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .is_some_and(|m| m.starts_with("expected a JSON object")));

    let (status, body) = server
        .post(
            "/process_data",
            json!({
                "nitrogen": "lots", "potassium": 10, "phosphorous": 10,
                "soilType": "Sandy", "cropType": "Wheat"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .is_some_and(|m| m.contains("invalid type")));

    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn process_data_non_string_label_is_invalid_category() -> Result<()> {
    // ---
    let (server, stub) = spawn_with_stub(6).await?;

    let (status, body) = server
        .post(
            "/process_data",
            json!({
                "nitrogen": 10, "potassium": 10, "phosphorous": 10,
                "soilType": 3, "cropType": "Wheat"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Invalid Soil or Crop Type"})
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    Ok(())
}
