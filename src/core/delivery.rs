use crate::domain::model::{DeliveryOutcome, FailedDelivery, Record};
use chrono::{SecondsFormat, Utc};
use reqwest::header;
use serde_json::{json, Value};

/// Client for the TrafficPoint pixel endpoint.
///
/// Records are delivered strictly one at a time: a single rejection or
/// transport failure must not block or skip its neighbours, and never
/// escapes this component — every record ends up in the outcome partition.
pub struct PixelClient {
    client: reqwest::Client,
    pixel_url: String,
    cookie_header: String,
}

impl PixelClient {
    pub fn new(pixel_url: String, cookie_header: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            pixel_url,
            cookie_header,
        }
    }

    pub async fn deliver(&self, records: &[Record]) -> DeliveryOutcome {
        let mut outcome = DeliveryOutcome::default();

        for record in records {
            match self.send_one(record).await {
                Ok(()) => outcome.success.push(record.with_status("OK")),
                Err(message) => {
                    tracing::debug!(
                        trx_id = record.trx_id().unwrap_or_default(),
                        error = %message,
                        "pixel rejected record"
                    );
                    outcome
                        .failed
                        .push(FailedDelivery::from_record(record, message));
                }
            }
        }

        outcome
    }

    async fn send_one(&self, record: &Record) -> std::result::Result<(), String> {
        let payload = build_payload(record).to_string();

        let response = self
            .client
            .post(&self.pixel_url)
            .header(header::COOKIE, &self.cookie_header)
            .form(&[("data", payload)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let body = response.text().await.map_err(|e| e.to_string())?;
        let result: Value = serde_json::from_str(&body).map_err(|e| e.to_string())?;

        if result.get("status").and_then(Value::as_str) == Some("OK") {
            Ok(())
        } else {
            Err(result
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string())
        }
    }
}

/// The tracking payload submitted as the `data` form field, embedding the
/// record's business fields plus a fresh timestamp.
fn build_payload(record: &Record) -> Value {
    let field = |name: &str| record.field(name).cloned().unwrap_or(Value::Null);

    json!({
        "trackInfo": {
            "tokenId": "",
            "track_type": "event",
            "date": field("date"),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        "params": {
            "commission_amount": field("commission_amount"),
            "currency": field("currency"),
            "amount": field("amount"),
            "ioId": field("io_id"),
        },
        "trxId": field("trx_id"),
        "eventName": record.str_field("event").unwrap_or_default().to_lowercase(),
        "source_token": record.text_field("token"),
        "parent_api_call": json!({ "parent_api_call": field("parent_api_call") }).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn record(trx_id: &str) -> Record {
        serde_json::from_value(json!({
            "trx_id": trx_id,
            "io_id": "io-a",
            "amount": "10.00",
            "commission_amount": "1.00",
            "currency": "USD",
            "date": "2025-02-01",
            "event": "Sale",
            "token": "tok-1",
            "parent_api_call": {"call": "x"},
        }))
        .unwrap()
    }

    #[test]
    fn test_payload_embeds_business_fields() {
        let payload = build_payload(&record("trx-1"));

        assert_eq!(payload["trxId"], "trx-1");
        assert_eq!(payload["eventName"], "sale");
        assert_eq!(payload["source_token"], "tok-1");
        assert_eq!(payload["params"]["ioId"], "io-a");
        assert_eq!(payload["trackInfo"]["track_type"], "event");
        assert_eq!(payload["trackInfo"]["tokenId"], "");
        // parent_api_call is re-wrapped as a JSON string
        let parent: Value =
            serde_json::from_str(payload["parent_api_call"].as_str().unwrap()).unwrap();
        assert_eq!(parent["parent_api_call"]["call"], "x");
    }

    #[tokio::test]
    async fn test_deliver_classifies_ok_response_as_success() {
        let server = MockServer::start();
        let pixel = server.mock(|when, then| {
            when.method(POST)
                .path("/scraper")
                .header("cookie", "session=abc")
                .header("content-type", "application/x-www-form-urlencoded");
            then.status(200).json_body(json!({"status": "OK"}));
        });

        let client = PixelClient::new(server.url("/scraper"), "session=abc".to_string());
        let outcome = client.deliver(&[record("trx-1")]).await;

        pixel.assert();
        assert_eq!(outcome.success.len(), 1);
        assert_eq!(outcome.failed.len(), 0);
        assert_eq!(outcome.success[0].str_field("status"), Some("OK"));
    }

    #[tokio::test]
    async fn test_deliver_classifies_error_status_with_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/scraper").body_contains("trx-bad");
            then.status(200)
                .json_body(json!({"status": "ERROR", "error": "bad trx"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/scraper").body_contains("trx-good");
            then.status(200).json_body(json!({"status": "OK"}));
        });

        let client = PixelClient::new(server.url("/scraper"), "session=abc".to_string());
        let outcome = client.deliver(&[record("trx-bad"), record("trx-good")]).await;

        // the failure does not block the following record
        assert_eq!(outcome.success.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].trx_id, "trx-bad");
        assert_eq!(outcome.failed[0].error, "bad trx");
        assert_eq!(outcome.success[0].trx_id(), Some("trx-good"));
    }

    #[tokio::test]
    async fn test_deliver_treats_unparseable_body_as_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/scraper");
            then.status(200).body("not json");
        });

        let client = PixelClient::new(server.url("/scraper"), "session=abc".to_string());
        let outcome = client.deliver(&[record("trx-1")]).await;

        assert_eq!(outcome.success.len(), 0);
        assert_eq!(outcome.failed.len(), 1);
        assert!(!outcome.failed[0].error.is_empty());
    }

    #[tokio::test]
    async fn test_deliver_classifies_transport_failure() {
        // port 9 (discard) refuses the connection; no server is involved
        let client = PixelClient::new(
            "http://127.0.0.1:9/scraper".to_string(),
            "session=abc".to_string(),
        );
        let outcome = client.deliver(&[record("trx-1")]).await;

        assert_eq!(outcome.success.len(), 0);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].trx_id, "trx-1");
        assert!(!outcome.failed[0].error.is_empty());
    }

    #[tokio::test]
    async fn test_deliver_error_without_message_is_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/scraper");
            then.status(200).json_body(json!({"status": "ERROR"}));
        });

        let client = PixelClient::new(server.url("/scraper"), "session=abc".to_string());
        let outcome = client.deliver(&[record("trx-1")]).await;

        assert_eq!(outcome.failed[0].error, "Unknown error");
    }

    #[tokio::test]
    async fn test_outcome_partitions_every_input() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/scraper").body_contains("trx-2");
            then.status(200)
                .json_body(json!({"status": "ERROR", "error": "nope"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/scraper").body_contains("trx-1");
            then.status(200).json_body(json!({"status": "OK"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/scraper").body_contains("trx-3");
            then.status(200).json_body(json!({"status": "OK"}));
        });

        let records = vec![record("trx-1"), record("trx-2"), record("trx-3")];
        let client = PixelClient::new(server.url("/scraper"), "session=abc".to_string());
        let outcome = client.deliver(&records).await;

        assert_eq!(outcome.success.len() + outcome.failed.len(), records.len());
        // input order is preserved within each list
        assert_eq!(outcome.success[0].trx_id(), Some("trx-1"));
        assert_eq!(outcome.success[1].trx_id(), Some("trx-3"));
        assert_eq!(outcome.failed[0].trx_id, "trx-2");
    }
}
