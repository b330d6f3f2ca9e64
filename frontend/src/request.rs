// keep in sync with api.rs of backend
use common::req::{CreateResponse, Device, ErrorList, ErrorMessage, NewDevice};
use reqwest::header::ACCEPT;

/// Port the backend listens on, on the same host that served the page.
pub const API_PORT: u16 = 8080;

const SERVER_ERROR: &str = "Server error";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no browser location to derive the api address from")]
    NoLocation,

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx answer, with the message the server reported.
    #[error("{0}")]
    Status(String),
}

fn api_url(endpoint: &str) -> Result<String, Error> {
    let host_url = host_url()?;
    Ok(format!("{host_url}/{endpoint}"))
}

fn host_url() -> Result<String, Error> {
    let location = web_sys::window().ok_or(Error::NoLocation)?.location();
    let protocol = location.protocol().map_err(|_| Error::NoLocation)?;
    let hostname = location.hostname().map_err(|_| Error::NoLocation)?;
    Ok(format!("{protocol}//{hostname}:{API_PORT}"))
}

pub async fn devices() -> Result<Vec<Device>, Error> {
    let client = reqwest::Client::new();

    let resp = client
        .get(api_url("api/devices")?)
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(Error::Status(error_message(resp).await));
    }
    Ok(resp.json::<Vec<Device>>().await?)
}

pub async fn create_device(dev: &NewDevice) -> Result<Device, Error> {
    let client = reqwest::Client::new();

    let resp = client
        .post(api_url("api/devices")?)
        .header(ACCEPT, "application/json")
        .json(dev)
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(Error::Status(error_message(resp).await));
    }
    let created = resp.json::<CreateResponse>().await?;
    Ok(created_device(created, dev))
}

/// The created record, rebuilt from the submitted payload when the server
/// only acknowledged the id.
pub fn created_device(resp: CreateResponse, sent: &NewDevice) -> Device {
    match resp {
        CreateResponse::Device(dev) => dev,
        CreateResponse::Created(ack) => Device {
            id: ack.id,
            device_id: sent.device_id.clone(),
            coordinate_x: sent.coordinate_x,
            coordinate_y: sent.coordinate_y,
            signal_quality: sent.signal_quality,
        },
    }
}

async fn error_message(resp: reqwest::Response) -> String {
    match resp.text().await {
        Ok(body) => error_text(&body),
        Err(_) => SERVER_ERROR.to_owned(),
    }
}

/// User facing text of an error body: the validation messages joined, the
/// single error message, or a generic fallback.
pub fn error_text(body: &str) -> String {
    if let Ok(list) = serde_json::from_str::<ErrorList>(body) {
        if !list.errors.is_empty() {
            return list.errors.join("; ");
        }
    }
    if let Ok(msg) = serde_json::from_str::<ErrorMessage>(body) {
        return msg.error;
    }
    SERVER_ERROR.to_owned()
}
