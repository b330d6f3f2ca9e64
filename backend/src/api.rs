use std::sync::{Arc, Mutex, MutexGuard};

use actix_cors::Cors;
use actix_web::{
    get,
    http::header::{self, ContentType},
    middleware::{DefaultHeaders, Logger},
    options, post,
    web::{self, Data},
    App, HttpMessage, HttpRequest, HttpResponse, HttpServer, Responder,
};
use common::{
    req::RawDevice,
    validate::{self, INVALID_BODY},
};
use log::info;
use serde_json::Value;

use crate::{
    config::Config,
    db::{Db, StorageError},
    error::ApiError,
};

type SharedDb = web::Data<Arc<Mutex<Db>>>;

const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const INVALID_ID: &str = "Invalid device id";
const INVALID_QUERY: &str = "Invalid query string";

fn lock(db: &SharedDb) -> Result<MutexGuard<'_, Db>, StorageError> {
    db.lock().map_err(|_| StorageError::Poisoned)
}

#[options("/api/devices")]
async fn api_devices_preflight() -> impl Responder {
    HttpResponse::Ok().content_type(ContentType::json()).finish()
}

#[derive(serde::Deserialize, Debug)]
struct DevicesQuery {
    device_id: Option<String>,
}

#[get("/api/devices")]
async fn api_devices(
    query: web::Query<DevicesQuery>,
    db: SharedDb,
) -> Result<impl Responder, ApiError> {
    let mut db = lock(&db).map_err(ApiError::Fetch)?;
    let res = match query.device_id.as_deref() {
        Some(label) => db.devices_by_label(label),
        None => db.devices(),
    }
    .map_err(ApiError::Fetch)?;

    Ok(web::Json(res))
}

#[get("/api/devices/{id}")]
async fn api_device(path: web::Path<i32>, db: SharedDb) -> Result<impl Responder, ApiError> {
    let mut db = lock(&db).map_err(ApiError::Fetch)?;
    match db.device(path.into_inner()).map_err(ApiError::Fetch)? {
        Some(dev) => Ok(web::Json(dev)),
        None => Err(ApiError::NotFound),
    }
}

#[post("/api/devices")]
async fn api_create_device(
    req: HttpRequest,
    body: web::Bytes,
    db: SharedDb,
) -> Result<impl Responder, ApiError> {
    let raw = parse_body(&req, &body)
        .ok_or_else(|| ApiError::Validation(vec![INVALID_BODY.to_owned()]))?;
    let new_device = validate::validate(&raw).map_err(ApiError::Validation)?;

    let mut db = lock(&db).map_err(ApiError::Store)?;
    let dev = db.insert_device(&new_device).map_err(ApiError::Store)?;
    info!("Added device {} ({:?})", dev.id, dev.device_id);

    Ok(HttpResponse::Created().json(dev))
}

/// Reads a create payload from either an urlencoded form or a json object.
fn parse_body(req: &HttpRequest, body: &[u8]) -> Option<RawDevice> {
    if req.content_type() == FORM_CONTENT_TYPE {
        return serde_urlencoded::from_bytes(body).ok();
    }
    // serde would also read a json array into the struct positionally
    match serde_json::from_slice::<Value>(body).ok()? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|_, _| ApiError::BadRequest(INVALID_ID.to_owned()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|_, _| ApiError::BadRequest(INVALID_QUERY.to_owned()).into()),
    )
    .service(api_devices_preflight)
    .service(api_devices)
    .service(api_device)
    .service(api_create_device);
}

fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .allowed_header(header::AUTHORIZATION)
        .allowed_header("X-Requested-With")
        .max_age(3600)
}

/// Headers every response carries, whether or not the request came with an
/// `Origin`.
fn default_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .add((header::CONTENT_TYPE, "application/json"))
}

pub async fn new_http_server(db: Arc<Mutex<Db>>, config: &Config) -> std::io::Result<()> {
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(configure)
            .wrap(cors())
            .wrap(default_headers())
            .wrap(Logger::default())
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        http::{Method, StatusCode},
        test,
    };
    use common::req::{Device, ErrorList, ErrorMessage};
    use serde_json::json;

    fn new_db() -> Arc<Mutex<Db>> {
        Arc::new(Mutex::new(Db::connect(":memory:").unwrap()))
    }

    macro_rules! app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(Data::new($db.clone()))
                    .configure(configure)
                    .wrap(cors())
                    .wrap(default_headers()),
            )
            .await
        };
    }

    macro_rules! list {
        ($app:expr) => {{
            let req = test::TestRequest::get().uri("/api/devices").to_request();
            let devices: Vec<Device> = test::call_and_read_body_json(&$app, req).await;
            devices
        }};
    }

    fn sensor_1() -> serde_json::Value {
        json!({
            "device_id": "sensor-1",
            "coordinate_x": 37.618423,
            "coordinate_y": 55.751244,
            "signal_quality": 7
        })
    }

    #[actix_web::test]
    async fn list_starts_empty() {
        let db = new_db();
        let app = app!(db);

        let req = test::TestRequest::get().uri("/api/devices").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );

        let devices: Vec<Device> = test::read_body_json(resp).await;
        assert!(devices.is_empty());
    }

    #[actix_web::test]
    async fn create_then_list() {
        let db = new_db();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/devices")
            .set_json(sensor_1())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Device = test::read_body_json(resp).await;
        assert_eq!(created.device_id, "sensor-1");

        let devices = list!(app);
        assert_eq!(devices.len(), 1);
        let dev = &devices[0];
        assert_eq!(dev, &created);
        assert_eq!(dev.coordinate_x, 37.618423);
        assert_eq!(dev.coordinate_y, 55.751244);
        assert_eq!(dev.signal_quality, 7);
    }

    #[actix_web::test]
    async fn new_ids_exceed_previous_ones() {
        let db = new_db();
        let app = app!(db);

        let mut last_id = 0;
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/api/devices")
                .set_json(sensor_1())
                .to_request();
            let created: Device = test::call_and_read_body_json(&app, req).await;
            assert!(created.id > last_id);
            last_id = created.id;
        }

        let devices = list!(app);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices.iter().filter(|d| d.id == last_id).count(), 1);
    }

    #[actix_web::test]
    async fn create_from_form() {
        let db = new_db();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/devices")
            .set_form([
                ("device_id", "form <b>"),
                ("coordinate_x", "30.500000"),
                ("coordinate_y", "59.900000"),
                ("signal_quality", "3"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let dev: Device = test::read_body_json(resp).await;
        assert_eq!(dev.device_id, "form <b>");
        assert_eq!(dev.coordinate_x, 30.5);
        assert_eq!(dev.coordinate_y, 59.9);
        assert_eq!(dev.signal_quality, 3);
    }

    #[actix_web::test]
    async fn missing_fields_are_rejected_without_insert() {
        let db = new_db();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/devices")
            .set_json(json!({ "device_id": "  ", "coordinate_x": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorList = test::read_body_json(resp).await;
        assert_eq!(
            body.errors,
            vec![
                "Missing or empty device_id",
                "Missing or empty coordinate_y",
                "Missing or empty signal_quality",
            ]
        );
        assert!(list!(app).is_empty());
    }

    #[actix_web::test]
    async fn signal_out_of_range_is_rejected() {
        let db = new_db();
        let app = app!(db);

        let mut payload = sensor_1();
        payload["signal_quality"] = json!(11);
        let req = test::TestRequest::post()
            .uri("/api/devices")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorList = test::read_body_json(resp).await;
        assert_eq!(body.errors.len(), 1);
        assert!(body.errors[0].contains("Signal quality"));
        assert!(list!(app).is_empty());
    }

    #[actix_web::test]
    async fn coordinates_out_of_range_are_rejected() {
        let db = new_db();
        let app = app!(db);

        let mut payload = sensor_1();
        payload["coordinate_x"] = json!(200.0);
        payload["coordinate_y"] = json!("north");
        let req = test::TestRequest::post()
            .uri("/api/devices")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorList = test::read_body_json(resp).await;
        assert_eq!(
            body.errors,
            vec![
                "Coordinate_x must be between -180 and 180",
                "Coordinate_y must be a number",
            ]
        );
        assert!(list!(app).is_empty());
    }

    #[actix_web::test]
    async fn unreadable_body_is_rejected() {
        let db = new_db();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/devices")
            .insert_header(ContentType::json())
            .set_payload("device_id=sensor")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorList = test::read_body_json(resp).await;
        assert_eq!(body.errors, vec![INVALID_BODY]);
    }

    #[actix_web::test]
    async fn non_object_json_is_rejected() {
        let db = new_db();
        let app = app!(db);

        for payload in [json!(["sensor-1", 37.6, 55.7, 7]), json!([]), json!("sensor-1")] {
            let req = test::TestRequest::post()
                .uri("/api/devices")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: ErrorList = test::read_body_json(resp).await;
            assert_eq!(body.errors, vec![INVALID_BODY]);
        }

        assert!(list!(app).is_empty());
    }

    #[actix_web::test]
    async fn bad_path_and_query_get_json_errors() {
        let db = new_db();
        let app = app!(db);

        for (uri, message) in [
            ("/api/devices/abc", INVALID_ID),
            ("/api/devices?device_id=a&device_id=b", INVALID_QUERY),
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                resp.headers().get(header::CONTENT_TYPE).unwrap(),
                "application/json"
            );

            let body: ErrorMessage = test::read_body_json(resp).await;
            assert_eq!(body.error, message);
        }
    }

    #[actix_web::test]
    async fn preflight_succeeds() {
        let db = new_db();
        let app = app!(db);

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/devices")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            ALLOWED_METHODS
        );
        assert!(test::read_body(resp).await.is_empty());
    }

    #[actix_web::test]
    async fn browser_preflight_succeeds() {
        let db = new_db();
        let app = app!(db);

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/devices")
            .insert_header((header::ORIGIN, "http://localhost:8000"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn filter_by_label_and_fetch_by_id() {
        let db = new_db();
        let app = app!(db);

        for label in ["a", "b", "a"] {
            let mut payload = sensor_1();
            payload["device_id"] = json!(label);
            let req = test::TestRequest::post()
                .uri("/api/devices")
                .set_json(payload)
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/devices?device_id=a")
            .to_request();
        let devices: Vec<Device> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(devices.len(), 2);
        assert!(devices.iter().all(|d| d.device_id == "a"));

        let req = test::TestRequest::get()
            .uri(&format!("/api/devices/{}", devices[1].id))
            .to_request();
        let dev: Device = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dev, devices[1]);

        let req = test::TestRequest::get()
            .uri("/api/devices/9999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorMessage = test::read_body_json(resp).await;
        assert_eq!(body.error, "Device not found");
    }

    #[actix_web::test]
    async fn storage_failures_become_500() {
        let db = new_db();
        let app = app!(db);
        db.lock().unwrap().break_storage();

        let req = test::TestRequest::get().uri("/api/devices").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorMessage = test::read_body_json(resp).await;
        assert_eq!(body.error, "Failed to fetch devices");

        let req = test::TestRequest::post()
            .uri("/api/devices")
            .set_json(sensor_1())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorMessage = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Database error: "));
        assert!(body.error.len() > "Database error: ".len());
    }
}
