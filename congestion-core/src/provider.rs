use crate::{
    ApiConfig, CongestionError, CongestionRecord, provider::citydata::SeoulCityDataProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod citydata;

/// Source of real-time congestion snapshots for a named area.
#[async_trait]
pub trait CongestionProvider: Send + Sync + Debug {
    /// Fetch, validate, decode and geo-enrich the snapshot for `area_name`.
    async fn get_congestion_info(
        &self,
        area_name: &str,
    ) -> Result<CongestionRecord, CongestionError>;
}

/// Construct the Seoul `citydata` provider from config.
pub fn provider_from_config(config: &ApiConfig) -> anyhow::Result<Box<dyn CongestionProvider>> {
    config.require_api_key()?;

    let boxed: Box<dyn CongestionProvider> = Box::new(SeoulCityDataProvider::new(config.clone())?);
    Ok(boxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = ApiConfig::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No Seoul Open API key configured"));
    }

    #[test]
    fn provider_from_config_errors_on_unusable_base_url() {
        let cfg = ApiConfig {
            api_key: "KEY".into(),
            base_url: "not a url".into(),
            ..ApiConfig::default()
        };
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid Seoul API base URL"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let cfg = ApiConfig { api_key: "KEY".into(), ..ApiConfig::default() };
        assert!(provider_from_config(&cfg).is_ok());
    }
}
