// The validation service, reached over HTTP.

use log::{debug, info};
use std::time::Duration;

use tally_entry::service::{
    DataEntryRequest, DataEntryResponse, ServiceError, ValidationResults, ValidationService,
};

pub struct HttpValidationService {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpValidationService {
    pub fn new(base_url: &str, timeout: Duration) -> HttpValidationService {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HttpValidationService {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, request: &DataEntryRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

impl ValidationService for HttpValidationService {
    fn validate(&mut self, request: &DataEntryRequest) -> Result<ValidationResults, ServiceError> {
        let url = self.url(request);
        info!("POST {}", url);
        debug!("validate: body {}", request.body);
        let resp = match self
            .agent
            .post(&url)
            .set("content-type", "application/json")
            .send_json(&request.body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let msg = resp.into_string().unwrap_or_default();
                return Err(ServiceError::Status(code, msg));
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(ServiceError::Unreachable(err.to_string()));
            }
        };
        if !(200..=299).contains(&resp.status()) {
            return Err(ServiceError::Status(
                resp.status(),
                resp.status_text().to_string(),
            ));
        }
        let body: DataEntryResponse = resp
            .into_json()
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
        Ok(body.validation_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tally_entry::EntryTarget;

    #[test]
    fn url_without_double_slash() {
        let svc = HttpValidationService::new("http://localhost:8080/", Duration::from_secs(1));
        let req = DataEntryRequest {
            target: EntryTarget {
                polling_station_id: 12,
                entry_number: 2,
            },
            body: json!({}),
        };
        assert_eq!(
            svc.url(&req),
            "http://localhost:8080/api/polling_stations/12/data_entries/2"
        );
    }

    #[test]
    fn unreachable_server() {
        // Nothing listens on the discard port.
        let mut svc = HttpValidationService::new("http://127.0.0.1:9", Duration::from_secs(1));
        let req = DataEntryRequest {
            target: EntryTarget {
                polling_station_id: 1,
                entry_number: 1,
            },
            body: json!({"data": {}}),
        };
        assert!(matches!(
            svc.validate(&req),
            Err(ServiceError::Unreachable(_))
        ));
    }
}
