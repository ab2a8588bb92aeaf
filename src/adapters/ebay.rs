//! eBay Finding API client
//!
//! Searches completed (sold) or active listings. The Finding API wraps
//! every JSON value in a one-element array, hence the `Vec` fields below.

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::agents::SearchProvider;
use crate::config::MarketplaceConfig;
use crate::domain::{SaleRecord, SearchQuery};
use crate::error::{Result, SearchError};

/// eBay's quota error text
const QUOTA_EXCEEDED: &str = "exceeded the number of times";

pub struct EbayClient {
    http: reqwest::Client,
    base_url: String,
    app_id: Option<String>,
    timeout_secs: u64,
}

impl EbayClient {
    pub fn new(config: &MarketplaceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            app_id: config.resolved_app_id(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn build_params(app_id: &str, query: &SearchQuery) -> Vec<(String, String)> {
        let operation = if query.sold_only {
            "findCompletedItems"
        } else {
            "findItemsAdvanced"
        };

        let mut params = vec![
            ("OPERATION-NAME".to_string(), operation.to_string()),
            ("SERVICE-VERSION".to_string(), "1.0.0".to_string()),
            ("SECURITY-APPNAME".to_string(), app_id.to_string()),
            ("RESPONSE-DATA-FORMAT".to_string(), "JSON".to_string()),
            ("GLOBAL-ID".to_string(), "EBAY-US".to_string()),
            ("keywords".to_string(), query.keywords.clone()),
            (
                "paginationInput.entriesPerPage".to_string(),
                query.max_results.to_string(),
            ),
            ("sortOrder".to_string(), "EndTimeSoonest".to_string()),
        ];

        let filters = [("MinPrice", query.min_price), ("MaxPrice", query.max_price)];
        for (index, (name, value)) in filters
            .iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .enumerate()
        {
            params.push((format!("itemFilter({}).name", index), name.to_string()));
            params.push((format!("itemFilter({}).value", index), value.to_string()));
        }

        params
    }

    fn transport_error(&self, err: reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            SearchError::from(err)
        }
    }
}

#[async_trait]
impl SearchProvider for EbayClient {
    async fn search(
        &self,
        query: &SearchQuery,
    ) -> std::result::Result<Vec<SaleRecord>, SearchError> {
        let app_id = self.app_id.as_deref().ok_or_else(|| {
            SearchError::NotConfigured("set marketplace.app_id or EBAY_APP_ID".to_string())
        })?;

        let params = Self::build_params(app_id, query);
        debug!(keywords = %query.keywords, sold_only = query.sold_only, "eBay search");

        let resp = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS || body.contains(QUOTA_EXCEEDED) {
                warn!(status = status.as_u16(), "eBay quota exceeded");
                return Err(SearchError::RateLimited(first_error_message(&body)));
            }
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        parse_response(&body, query.sold_only)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FindingEnvelope {
    #[serde(rename = "findCompletedItemsResponse", default)]
    completed: Vec<FindingResponse>,
    #[serde(rename = "findItemsAdvancedResponse", default)]
    advanced: Vec<FindingResponse>,
    #[serde(rename = "errorMessage", default)]
    error_message: Vec<ErrorMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct FindingResponse {
    #[serde(default)]
    ack: Vec<String>,
    #[serde(rename = "searchResult", default)]
    search_result: Vec<SearchResult>,
    #[serde(rename = "errorMessage", default)]
    error_message: Vec<ErrorMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(default)]
    item: Vec<EbayItem>,
}

#[derive(Debug, Default, Deserialize)]
struct EbayItem {
    #[serde(rename = "itemId", default)]
    item_id: Vec<String>,
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "sellingStatus", default)]
    selling_status: Vec<SellingStatus>,
    #[serde(default)]
    condition: Vec<ItemCondition>,
    #[serde(rename = "viewItemURL", default)]
    view_item_url: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SellingStatus {
    #[serde(rename = "currentPrice", default)]
    current_price: Vec<Amount>,
    #[serde(rename = "sellingState", default)]
    selling_state: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Amount {
    #[serde(rename = "__value__", default)]
    value: String,
    #[serde(rename = "@currencyId", default)]
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemCondition {
    #[serde(rename = "conditionDisplayName", default)]
    display_name: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    error: Vec<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Vec<String>,
}

fn first<T: Clone>(values: &[T]) -> Option<T> {
    values.first().cloned()
}

fn first_error_message(body: &str) -> String {
    serde_json::from_str::<FindingEnvelope>(body)
        .ok()
        .and_then(|env| {
            env.error_message
                .iter()
                .chain(env.completed.iter().flat_map(|r| r.error_message.iter()))
                .chain(env.advanced.iter().flat_map(|r| r.error_message.iter()))
                .flat_map(|m| m.error.iter())
                .find_map(|e| first(&e.message))
        })
        .unwrap_or_else(|| "marketplace quota exceeded".to_string())
}

/// Parse a Finding API body into sale records. Items without a positive
/// price are skipped.
fn parse_response(
    body: &str,
    sold_only: bool,
) -> std::result::Result<Vec<SaleRecord>, SearchError> {
    let envelope: FindingEnvelope =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

    let responses = if sold_only {
        &envelope.completed
    } else {
        &envelope.advanced
    };
    let Some(response) = responses.first() else {
        return Err(SearchError::Parse("missing search response".to_string()));
    };

    if response.ack.first().map(String::as_str) == Some("Failure") {
        let message = response
            .error_message
            .iter()
            .flat_map(|m| m.error.iter())
            .find_map(|e| first(&e.message))
            .unwrap_or_else(|| "search failed".to_string());
        if message.contains(QUOTA_EXCEEDED) {
            return Err(SearchError::RateLimited(message));
        }
        return Err(SearchError::Status { status: 200, body: message });
    }

    let records = response
        .search_result
        .iter()
        .flat_map(|r| r.item.iter())
        .filter_map(|item| to_record(item, sold_only))
        .collect::<Vec<_>>();

    debug!(count = records.len(), "Parsed eBay listings");
    Ok(records)
}

fn to_record(item: &EbayItem, sold_only: bool) -> Option<SaleRecord> {
    let status = item.selling_status.first()?;
    let amount = status.current_price.first()?;
    let price = Decimal::from_str(amount.value.trim()).ok()?;
    if price <= Decimal::ZERO {
        return None;
    }

    let state = first(&status.selling_state).unwrap_or_default();
    let sold = sold_only && state != "EndedWithoutSales";

    Some(SaleRecord {
        item_id: first(&item.item_id).unwrap_or_default(),
        title: first(&item.title).unwrap_or_default(),
        price,
        currency: amount.currency.clone().unwrap_or_else(|| "USD".to_string()),
        sold,
        condition: item
            .condition
            .first()
            .and_then(|c| first(&c.display_name))
            .unwrap_or_else(|| "Unknown".to_string()),
        url: first(&item.view_item_url).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const COMPLETED: &str = r#"{
        "findCompletedItemsResponse": [{
            "ack": ["Success"],
            "searchResult": [{
                "@count": "3",
                "item": [
                    {
                        "itemId": ["1001"],
                        "title": ["2003 Topps LeBron James #221 RC"],
                        "sellingStatus": [{
                            "currentPrice": [{"@currencyId": "USD", "__value__": "549.99"}],
                            "sellingState": ["EndedWithSales"]
                        }],
                        "condition": [{"conditionDisplayName": ["Used"]}],
                        "viewItemURL": ["https://www.ebay.com/itm/1001"]
                    },
                    {
                        "itemId": ["1002"],
                        "title": ["2003 Topps LeBron James"],
                        "sellingStatus": [{
                            "currentPrice": [{"@currencyId": "USD", "__value__": "480.00"}],
                            "sellingState": ["EndedWithoutSales"]
                        }],
                        "viewItemURL": ["https://www.ebay.com/itm/1002"]
                    },
                    {
                        "itemId": ["1003"],
                        "title": ["broken listing"],
                        "sellingStatus": [{"currentPrice": [{"__value__": "n/a"}]}]
                    }
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_parse_completed_items() {
        let records = parse_response(COMPLETED, true).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].item_id, "1001");
        assert_eq!(records[0].price, dec!(549.99));
        assert_eq!(records[0].condition, "Used");
        assert!(records[0].sold);

        assert!(!records[1].sold);
        assert_eq!(records[1].condition, "Unknown");
    }

    #[test]
    fn test_quota_failure_is_rate_limited() {
        let body = r#"{
            "findCompletedItemsResponse": [{
                "ack": ["Failure"],
                "errorMessage": [{"error": [{"message": ["Service call has exceeded the number of times the operation is allowed to be called"]}]}]
            }]
        }"#;
        let err = parse_response(body, true).unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"errorMessage": [{"error": [{"message": ["Service call has exceeded the number of times"]}]}]}"#;
        assert!(first_error_message(body).contains(QUOTA_EXCEEDED));
        assert_eq!(first_error_message("<html>"), "marketplace quota exceeded");
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(
            parse_response("not json", true),
            Err(SearchError::Parse(_))
        ));
        assert!(matches!(parse_response("{}", true), Err(SearchError::Parse(_))));
    }

    #[test]
    fn test_build_params() {
        let query = SearchQuery::new("LeBron James 2003 Topps")
            .max_results(20)
            .sold_only(true)
            .price_range(None, Some(dec!(1000)));
        let params = EbayClient::build_params("APP", &query);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("OPERATION-NAME"), Some("findCompletedItems"));
        assert_eq!(get("paginationInput.entriesPerPage"), Some("20"));
        assert_eq!(get("itemFilter(0).name"), Some("MaxPrice"));
        assert_eq!(get("itemFilter(0).value"), Some("1000"));
        assert_eq!(get("itemFilter(1).name"), None);
    }

    #[tokio::test]
    async fn test_missing_app_id() {
        let config = MarketplaceConfig::default();
        let client = EbayClient {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            app_id: None,
            timeout_secs: config.request_timeout_secs,
        };
        let err = client.search(&SearchQuery::new("x")).await.unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_stalled_server_reports_configured_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let config = MarketplaceConfig {
            base_url: format!("http://{}/search", addr),
            app_id: Some("APP".to_string()),
            request_timeout_secs: 1,
            ..MarketplaceConfig::default()
        };
        let client = EbayClient::new(&config).unwrap();

        let err = client.search(&SearchQuery::new("x")).await.unwrap_err();
        assert!(matches!(err, SearchError::Timeout { secs: 1 }), "got {:?}", err);
        assert_eq!(err.to_string(), "Request timed out after 1s");
        server.abort();
    }
}
