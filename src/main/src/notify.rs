use anyhow::{anyhow, Result};
use embedded_svc::{
    http::{client::Client, Status},
    io::{Read, Write},
};
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use log::*;
use serde::Serialize;

use control::Notifier;

/// Two-field wire contract of the notification endpoint.
#[derive(Serialize)]
struct AlertPayload {
    value1: u16,
    value2: u16,
}

#[derive(Debug)]
pub struct NotificationOutcome {
    pub status: u16,
    pub body: Option<String>,
}

/// Pushes alert notifications to the configured endpoint with a single
/// blocking POST per alert. No retry: the throttle has already consumed
/// its cooldown by the time this runs.
pub struct LineNotifier {
    endpoint: String,
}

impl LineNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    fn post(&self, co2: u16, tvoc: u16) -> Result<NotificationOutcome> {
        let payload = serde_json::to_string(&AlertPayload {
            value1: co2,
            value2: tvoc,
        })?;
        debug!("{payload}");

        let connection = EspHttpConnection::new(&HttpConfiguration::default())?;
        let mut client = Client::wrap(connection);

        let headers = [("Content-Type", "application/json")];
        let mut request = client.post(&self.endpoint, &headers)?;
        request.write_all(payload.as_bytes())?;
        request.flush()?;

        let mut response = request.submit()?;
        let status = response.status();
        let body = if status == 200 {
            Some(read_body(&mut response)?)
        } else {
            None
        };

        Ok(NotificationOutcome { status, body })
    }
}

fn read_body<R>(reader: &mut R) -> Result<String>
where
    R: Read,
    R::Error: std::fmt::Debug,
{
    let mut body = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        let n = reader
            .read(&mut chunk)
            .map_err(|err| anyhow!("Failed to read response body: {err:?}"))?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

impl Notifier for LineNotifier {
    fn notify(&mut self, co2: u16, tvoc: u16) {
        info!("Notify LINE");
        info!("CO2: {co2}");
        info!("TVOC: {tvoc}");

        match self.post(co2, tvoc) {
            Ok(outcome) => {
                info!("status_code={}", outcome.status);
                if let Some(body) = outcome.body {
                    // Best-effort echo of the endpoint's response
                    match serde_json::from_str::<serde_json::Value>(&body) {
                        Ok(json) => info!("{json}"),
                        Err(_) => info!("{body}"),
                    }
                }
            }
            Err(err) => error!("Notification failed: {err:?}"),
        }
    }
}
