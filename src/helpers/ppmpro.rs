use reqwest::{Client, Method, Proxy, Response, header};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::{
    config::Config,
    error::{Error, Result},
    models::ppmpro::{
        ActivityUpdate, Note, RecentTimesheets, Timesheet, TimesheetId, TimesheetResponse,
        TimesheetSummary,
    },
};

/// The PPM Pro endpoints the workflow needs.
#[allow(async_fn_in_trait)]
pub trait TimesheetApi {
    async fn recent(&self) -> Result<Vec<TimesheetSummary>>;
    async fn timesheet(&self, id: &TimesheetId) -> Result<Timesheet>;
    async fn update_activities(&self, id: &TimesheetId, updates: &[ActivityUpdate]) -> Result<()>;
    async fn submit(&self, id: &TimesheetId, note: &Note) -> Result<()>;
    async fn approve_all(&self, note: &Note) -> Result<()>;
}

pub fn ppmpro_client_init(config: &Config) -> Result<Client> {
    info!("Initializing PPM Pro client");

    let cookie = match header::HeaderValue::from_str(&config.cookie) {
        Ok(value) => {
            let mut val = value;
            val.set_sensitive(true);
            val
        }
        Err(e) => {
            error!("Failed to create Cookie header value: {}", e);
            return Err(Error::Config(format!("session cookie is not a valid header: {e}")));
        }
    };

    let mut headers = header::HeaderMap::new();
    headers.insert(header::COOKIE, cookie);

    let mut builder = Client::builder().default_headers(headers);
    if let Some(proxy) = &config.proxy {
        info!("Routing requests through proxy {}", proxy);
        match Proxy::all(proxy_url(proxy)) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(e) => {
                error!("Failed to configure proxy {}: {}", proxy, e);
                return Err(Error::Config(format!("invalid proxy {proxy}: {e}")));
            }
        }
    }

    match builder.build() {
        Ok(client) => {
            info!("PPM Pro client initialized successfully");
            Ok(client)
        }
        Err(e) => {
            error!("Failed to build PPM Pro client: {}", e);
            Err(Error::Config(e.to_string()))
        }
    }
}

/// Proxies are given as `host:port`; a scheme is only added when missing.
pub fn proxy_url(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}

/// PPM Pro REST client authenticated by a session cookie.
#[derive(Clone)]
pub struct PpmProClient {
    client: Client,
    base_url: String,
}

impl PpmProClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: ppmpro_client_init(config)?,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, path: &str, body: Option<String>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        info!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if method == Method::PUT {
            request = request.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        match request.send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
                    let error_text = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    error!(
                        "PPM Pro API returned error status {}: {}",
                        status, error_text
                    );
                    return Err(Error::Http {
                        status: status.as_u16(),
                        reason,
                    });
                }
                Ok(resp)
            }
            Err(e) => {
                error!("Failed to send request to PPM Pro API: {}", e);
                Err(Error::Transport(e))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path, None).await?;

        let text = match response.text().await {
            Ok(text) => {
                debug!("Received {} bytes from PPM Pro API", text.len());
                text
            }
            Err(e) => {
                error!("Failed to read response body: {}", e);
                return Err(Error::Transport(e));
            }
        };

        match serde_json::from_str::<T>(&text) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!("Failed to parse PPM Pro response: {}", e);
                error!("Raw response: {}", text);
                Err(Error::Decode(e))
            }
        }
    }

    async fn put_json<T: serde::Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        let body = serde_json::to_string(body)?;
        self.request(Method::PUT, path, Some(body)).await?;
        Ok(())
    }
}

impl TimesheetApi for PpmProClient {
    async fn recent(&self) -> Result<Vec<TimesheetSummary>> {
        let recent: RecentTimesheets = self.get_json("/timesheet/recent").await?;
        info!("Found {} recent timesheets", recent.items.len());
        Ok(recent.items)
    }

    async fn timesheet(&self, id: &TimesheetId) -> Result<Timesheet> {
        let response: TimesheetResponse = self.get_json(&format!("/timesheet/{id}")).await?;
        info!(
            "Fetched timesheet {} with {} activities",
            id,
            response.timesheet.activities.len()
        );
        Ok(response.timesheet)
    }

    async fn update_activities(&self, id: &TimesheetId, updates: &[ActivityUpdate]) -> Result<()> {
        info!("Uploading {} activity records", updates.len());
        self.put_json(&format!("/timesheet/{id}/activities"), updates)
            .await
    }

    async fn submit(&self, id: &TimesheetId, note: &Note) -> Result<()> {
        self.put_json(&format!("/timesheet/{id}?submit=true"), note)
            .await
    }

    async fn approve_all(&self, note: &Note) -> Result<()> {
        self.put_json("/timesheet/approveAllTimesheets?filterApproval=AsApprover", note)
            .await
    }
}

pub mod utils {
    use chrono::{Datelike, Duration, NaiveDate};
    use tracing::{error, info};

    use crate::{
        error::{Error, Result},
        models::ppmpro::{TimesheetId, TimesheetSummary},
    };

    /// Most recent Monday on or before `date`; timesheets start on Mondays.
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        date - Duration::days(date.weekday().num_days_from_monday() as i64)
    }

    pub fn find_current_timesheet(
        summaries: &[TimesheetSummary],
        reference_date: NaiveDate,
    ) -> Result<TimesheetId> {
        let start = week_start(reference_date).format("%Y-%m-%d").to_string();
        info!("Looking for timesheet starting on {}", start);

        // Last match wins if the API ever lists a week twice.
        match summaries
            .iter()
            .rev()
            .find(|summary| summary.start_date.as_deref() == Some(start.as_str()))
        {
            Some(summary) => {
                info!("Current timesheet id is {}", summary.id);
                Ok(summary.id.clone())
            }
            None => {
                error!("No timesheet found starting on {}", start);
                Err(Error::TimesheetNotFound { week_start: start })
            }
        }
    }
}
