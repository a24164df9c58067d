use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, error, instrument, warn};

use crate::{
    config::ApiConfig, error::CongestionError, model::CongestionRecord, parser, registry,
};

use super::CongestionProvider;

const REDACTED: &str = "REDACTED";

/// Client for the Seoul Open API real-time city data (`citydata`) service.
#[derive(Debug, Clone)]
pub struct SeoulCityDataProvider {
    config: ApiConfig,
    base_url: Url,
    http: Client,
}

impl SeoulCityDataProvider {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid Seoul API base URL: {}", config.base_url))?;

        if base_url.cannot_be_a_base() {
            return Err(anyhow!(
                "Invalid Seoul API base URL: {} cannot carry path segments",
                config.base_url
            ));
        }

        Ok(Self { config, base_url, http: Client::new() })
    }

    /// `{base}/{key}/{type}/{service}/{start}/{end}/{area}`, each segment percent-encoded.
    /// The area name is used as given, without trimming.
    pub fn endpoint(&self, area_name: &str) -> Url {
        self.endpoint_with_key(&self.config.api_key, area_name)
    }

    fn endpoint_with_key(&self, api_key: &str, area_name: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                api_key,
                self.config.request_type.as_str(),
                self.config.service_name.as_str(),
                self.config.start_index.as_str(),
                self.config.end_index.as_str(),
                area_name,
            ]);
        }
        url
    }

    async fn fetch(&self, endpoint: Url) -> Result<String, CongestionError> {
        let res = self.http.get(endpoint).send().await.map_err(|e| {
            error!(error = %e.without_url(), "Failed to send request to Seoul API");
            CongestionError::FetchFailed
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            error!(error = %e.without_url(), "Failed to read Seoul API response body");
            CongestionError::FetchFailed
        })?;

        if !status.is_success() {
            error!(%status, body = %truncate_body(&body), "Seoul API request failed");
            return Err(CongestionError::FetchFailed);
        }

        Ok(body)
    }
}

#[async_trait]
impl CongestionProvider for SeoulCityDataProvider {
    #[instrument(skip(self))]
    async fn get_congestion_info(
        &self,
        area_name: &str,
    ) -> Result<CongestionRecord, CongestionError> {
        if area_name.trim().is_empty() {
            warn!("Invalid area name parameter");
            return Err(CongestionError::InvalidAreaName);
        }

        let redacted = self.endpoint_with_key(REDACTED, area_name);
        debug!(endpoint = %redacted, "Requesting Seoul city data");
        let body = self.fetch(self.endpoint(area_name)).await?;

        if body.is_empty() {
            error!("Failed to fetch data from Seoul API: empty response body");
            return Err(CongestionError::FetchFailed);
        }

        let record = parser::parse(&body, area_name)?;

        let coordinates = registry::lookup(&record.area_name);
        if !coordinates.is_known() {
            debug!(area = %record.area_name, "No registered coordinates for area");
        }

        Ok(record.with_coordinates(coordinates))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use httpmock::prelude::*;
    use serde_json::json;

    fn provider_for(server: &MockServer) -> SeoulCityDataProvider {
        let config = ApiConfig {
            base_url: server.base_url(),
            api_key: "TEST_KEY".into(),
            ..ApiConfig::default()
        };
        SeoulCityDataProvider::new(config).expect("mock server URL is a valid base")
    }

    fn citydata(area: &str) -> serde_json::Value {
        json!({
            "CITYDATA": {
                "AREA_NM": area,
                "LIVE_PPLTN_STTS": [{
                    "PPLTN_TIME": "2024-01-01 08:55",
                    "AREA_CONGEST_LVL": "약간 붐빔",
                    "AREA_CONGEST_MSG": "사람들이 몰려있을 가능성이 크고 붐빈다고 느낄 수 있어요.",
                    "FCST_PPLTN": [
                        { "FCST_TIME": "2024-01-01 09:00", "FCST_CONGEST_LVL": "여유" },
                        { "FCST_TIME": "2024-01-01 10:00", "FCST_CONGEST_LVL": "붐빔" }
                    ]
                }],
                "ROAD_TRAFFIC_STTS": {
                    "AVG_ROAD_DATA": { "ROAD_MSG": "정체가 심해요.", "ROAD_TRAFFIC_IDX": "정체" }
                }
            }
        })
    }

    #[test]
    fn endpoint_appends_encoded_segments_in_order() {
        let config = ApiConfig {
            base_url: "http://openapi.seoul.go.kr:8088".into(),
            api_key: "KEY".into(),
            ..ApiConfig::default()
        };
        let provider = SeoulCityDataProvider::new(config).unwrap();

        assert_eq!(
            provider.endpoint("강남역").as_str(),
            "http://openapi.seoul.go.kr:8088/KEY/json/citydata/1/5/%EA%B0%95%EB%82%A8%EC%97%AD"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_and_untrimmed_area() {
        let config = ApiConfig {
            base_url: "http://localhost:8088/proxy/".into(),
            api_key: "KEY".into(),
            ..ApiConfig::default()
        };
        let provider = SeoulCityDataProvider::new(config).unwrap();

        assert_eq!(
            provider.endpoint(" 강남역 ").as_str(),
            "http://localhost:8088/proxy/KEY/json/citydata/1/5/%20%EA%B0%95%EB%82%A8%EC%97%AD%20"
        );
    }

    #[test]
    fn redacted_endpoint_hides_api_key() {
        let config = ApiConfig { api_key: "SECRET".into(), ..ApiConfig::default() };
        let provider = SeoulCityDataProvider::new(config).unwrap();

        let url = provider.endpoint_with_key(REDACTED, "서울역");
        assert!(!url.as_str().contains("SECRET"));
        assert!(url.as_str().contains("/REDACTED/json/citydata/"));
    }

    #[test]
    fn rejects_base_url_without_path_support() {
        let config = ApiConfig {
            base_url: "mailto:someone@example.com".into(),
            ..ApiConfig::default()
        };
        assert!(SeoulCityDataProvider::new(config).is_err());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "가".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn fetches_parses_and_enriches_known_area() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/TEST_KEY/json/citydata/1/5/");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(citydata("강남역"));
            })
            .await;

        let record = provider_for(&server).get_congestion_info("강남역").await.unwrap();

        assert_eq!(record.area_name, "강남역");
        assert_eq!(record.area_congest_level, "약간 붐빔");
        assert_eq!(record.forecast_times, vec!["09:00:00", "10:00:00"]);
        assert_eq!(record.forecast_congestions, vec!["여유", "붐빔"]);
        assert_eq!(record.road_congest_idx.as_deref(), Some("정체"));
        assert_eq!(record.coordinates(), Coordinates::new(37.4981, 127.0276));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn unknown_area_gets_origin_coordinates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(citydata("임시 행사장"));
            })
            .await;

        let record = provider_for(&server).get_congestion_info("임시 행사장").await.unwrap();
        assert_eq!(record.coordinates(), Coordinates::UNKNOWN);
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_accepted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(citydata("서울역"));
            })
            .await;

        let record = provider_for(&server).get_congestion_info("  서울역 ").await.unwrap();
        assert_eq!(record.area_name, "서울역");
        assert_eq!(record.coordinates(), Coordinates::new(37.5547, 126.9706));
    }

    #[tokio::test]
    async fn blank_area_name_makes_no_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(citydata("강남역"));
            })
            .await;

        let provider = provider_for(&server);
        for blank in ["", "   ", "\t\n"] {
            let err = provider.get_congestion_info(blank).await.unwrap_err();
            assert_eq!(err, CongestionError::InvalidAreaName);
        }
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn empty_body_is_a_fetch_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("");
            })
            .await;

        let err = provider_for(&server).get_congestion_info("강남역").await.unwrap_err();
        assert_eq!(err, CongestionError::FetchFailed);
    }

    #[tokio::test]
    async fn error_status_is_a_fetch_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(500).body("internal error");
            })
            .await;

        let err = provider_for(&server).get_congestion_info("강남역").await.unwrap_err();
        assert_eq!(err, CongestionError::FetchFailed);
    }

    #[tokio::test]
    async fn mismatched_area_is_a_fetch_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(citydata("서울역"));
            })
            .await;

        let err = provider_for(&server).get_congestion_info("강남역").await.unwrap_err();
        assert_eq!(err, CongestionError::FetchFailed);
    }

    #[tokio::test]
    async fn missing_citydata_is_a_structure_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!({
                    "RESULT": { "RESULT.CODE": "ERROR-500", "RESULT.MESSAGE": "서버 오류" }
                }));
            })
            .await;

        let err = provider_for(&server).get_congestion_info("강남역").await.unwrap_err();
        assert_eq!(err, CongestionError::InvalidJsonStructure);
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("<RESULT><CODE>INFO-200</CODE></RESULT>");
            })
            .await;

        let err = provider_for(&server).get_congestion_info("강남역").await.unwrap_err();
        assert_eq!(err, CongestionError::ParseFailed);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_fetch_failure() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".into(),
            api_key: "TEST_KEY".into(),
            ..ApiConfig::default()
        };
        let provider = SeoulCityDataProvider::new(config).unwrap();

        let err = provider.get_congestion_info("강남역").await.unwrap_err();
        assert_eq!(err, CongestionError::FetchFailed);
    }
}
