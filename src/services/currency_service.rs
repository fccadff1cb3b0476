use crate::error::Result;
use crate::models::exchange_rate::EurRates;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Remote source of euro exchange rates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeRateClient: Send + Sync {
    async fn eur_rates(&self) -> Result<EurRates>;
}

/// Unauthenticated client for the public currency API.
#[derive(Clone)]
pub struct CurrencyService {
    client: Client,
    base_url: String,
}

impl CurrencyService {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ExchangeRateClient for CurrencyService {
    async fn eur_rates(&self) -> Result<EurRates> {
        let url = format!("{}/currencies/eur.json", self.base_url);
        tracing::debug!("Fetching EUR rates from: {}", url);

        let rates = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<EurRates>()
            .await?;
        Ok(rates)
    }
}

#[derive(Clone)]
pub struct CurrencyRepository {
    client: Arc<dyn ExchangeRateClient>,
}

impl CurrencyRepository {
    pub fn new(client: Arc<dyn ExchangeRateClient>) -> Self {
        Self { client }
    }

    /// `Ok(None)` when the response carries no `gbp` rate.
    pub async fn get_euro_to_gbp_rate(&self) -> Result<Option<f64>> {
        let rates = self.client.eur_rates().await.map_err(|e| {
            tracing::warn!(error = %e, "EUR rate lookup failed");
            e
        })?;
        let rate = rates.rate("gbp");
        if rate.is_none() {
            tracing::warn!(date = %rates.date, "EUR rate response has no GBP entry");
        }
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn rates(entries: &[(&str, f64)]) -> EurRates {
        EurRates {
            date: "2025-06-01".to_string(),
            eur: entries
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn returns_gbp_rate() {
        let mut client = MockExchangeRateClient::new();
        client
            .expect_eur_rates()
            .returning(|| Ok(rates(&[("gbp", 0.89), ("usd", 1.13)])));
        let repo = CurrencyRepository::new(Arc::new(client));

        assert_eq!(repo.get_euro_to_gbp_rate().await.unwrap(), Some(0.89));
    }

    #[tokio::test]
    async fn empty_rate_map_gives_none() {
        let mut client = MockExchangeRateClient::new();
        client.expect_eur_rates().returning(|| Ok(rates(&[])));
        let repo = CurrencyRepository::new(Arc::new(client));

        assert_eq!(repo.get_euro_to_gbp_rate().await.unwrap(), None);
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let mut client = MockExchangeRateClient::new();
        client
            .expect_eur_rates()
            .returning(|| Err(Error::Internal("Unable to resolve host".into())));
        let repo = CurrencyRepository::new(Arc::new(client));

        let err = repo.get_euro_to_gbp_rate().await.unwrap_err();
        assert_eq!(err.user_message(), crate::error::NO_NETWORK_MESSAGE);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service = CurrencyService::new("https://example.test/v1/", Client::new());
        assert_eq!(service.base_url, "https://example.test/v1");
    }
}
