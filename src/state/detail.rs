use serde::Serialize;
use tokio::sync::watch;

use crate::models::candidate::Candidate;
use crate::services::candidate_repository::CandidateRepository;
use crate::services::currency_service::CurrencyRepository;
use crate::utils::format::convert_salary_to_pounds;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailView {
    pub candidate: Option<Candidate>,
    pub gbp_rate: Option<f64>,
    pub deleted: bool,
    pub error: Option<String>,
}

impl DetailView {
    /// Expected salary in pounds, absent until both the candidate and a rate
    /// are known.
    pub fn salary_in_pounds(&self) -> Option<f64> {
        let candidate = self.candidate.as_ref()?;
        let rate = self.gbp_rate?;
        Some(convert_salary_to_pounds(candidate.salary, rate))
    }
}

/// Controller of the candidate detail screen.
pub struct DetailController {
    repository: CandidateRepository,
    currency: CurrencyRepository,
    state: watch::Sender<DetailView>,
}

impl DetailController {
    pub fn new(repository: CandidateRepository, currency: CurrencyRepository) -> Self {
        let (state, _) = watch::channel(DetailView::default());
        Self {
            repository,
            currency,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailView> {
        self.state.subscribe()
    }

    pub fn current(&self) -> DetailView {
        self.state.borrow().clone()
    }

    pub fn salary_in_pounds(&self) -> Option<f64> {
        self.state.borrow().salary_in_pounds()
    }

    pub async fn load(&self, id: i64) {
        match self.repository.get_candidate(id).await {
            Ok(candidate) => self.state.send_modify(|view| view.candidate = Some(candidate)),
            Err(e) => self.fail(e.user_message()),
        }
    }

    /// A missing GBP entry leaves the rate unset without reporting an error.
    pub async fn load_gbp_rate(&self) {
        match self.currency.get_euro_to_gbp_rate().await {
            Ok(rate) => {
                tracing::debug!(?rate, "EUR to GBP rate loaded");
                self.state.send_modify(|view| view.gbp_rate = rate);
            }
            Err(e) => self.fail(e.user_message()),
        }
    }

    pub async fn toggle_favorite(&self) {
        let Some(id) = self.loaded_id() else {
            return;
        };
        match self.repository.toggle_favorite(id).await {
            Ok(favorite) => self.state.send_modify(|view| {
                if let Some(candidate) = view.candidate.as_mut() {
                    candidate.favorite = favorite;
                }
            }),
            Err(e) => self.fail(e.user_message()),
        }
    }

    /// Deletes the shown candidate; `true` once it is gone.
    pub async fn delete(&self) -> bool {
        let Some(candidate) = self.state.borrow().candidate.clone() else {
            return false;
        };
        match self.repository.delete_candidate(&candidate).await {
            Ok(()) => {
                self.state.send_modify(|view| view.deleted = true);
                true
            }
            Err(e) => {
                self.fail(e.user_message());
                false
            }
        }
    }

    pub fn acknowledge_error(&self) {
        self.state.send_modify(|view| view.error = None);
    }

    fn loaded_id(&self) -> Option<i64> {
        self.state.borrow().candidate.as_ref().and_then(|c| c.id)
    }

    fn fail(&self, message: String) {
        self.state.send_modify(|view| view.error = Some(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::candidate_store::MockCandidateStore;
    use crate::error::Error;
    use crate::models::candidate::CandidateRow;
    use crate::models::exchange_rate::EurRates;
    use crate::services::currency_service::MockExchangeRateClient;
    use mockall::predicate::eq;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn stored(id: i64) -> CandidateRow {
        CandidateRow {
            id,
            firstname: "Martin".into(),
            lastname: "Dupond".into(),
            phone: "0606060606".into(),
            email: "martin@mail.fr".into(),
            birthdate: "03/10/2000".into(),
            salary: 1500,
            notes: String::new(),
            profile_picture: String::new(),
            favorite: false,
        }
    }

    fn rates(entries: Vec<(&'static str, f64)>) -> MockExchangeRateClient {
        let mut client = MockExchangeRateClient::new();
        client.expect_eur_rates().returning(move || {
            Ok(EurRates {
                date: "2025-06-01".into(),
                eur: entries
                    .iter()
                    .map(|(code, rate)| (code.to_string(), *rate))
                    .collect::<HashMap<_, _>>(),
            })
        });
        client
    }

    fn controller(store: MockCandidateStore, client: MockExchangeRateClient) -> DetailController {
        DetailController::new(
            CandidateRepository::new(Arc::new(store)),
            CurrencyRepository::new(Arc::new(client)),
        )
    }

    #[tokio::test]
    async fn shows_salary_in_pounds() {
        let mut store = MockCandidateStore::new();
        store.expect_query_by_id().with(eq(1)).returning(|id| Ok(stored(id)));
        let detail = controller(store, rates(vec![("gbp", 0.89)]));

        detail.load(1).await;
        detail.load_gbp_rate().await;
        assert_eq!(detail.salary_in_pounds(), Some(1335.0));
    }

    #[tokio::test]
    async fn empty_rate_map_shows_no_conversion() {
        let mut store = MockCandidateStore::new();
        store.expect_query_by_id().returning(|id| Ok(stored(id)));
        let detail = controller(store, rates(Vec::new()));

        detail.load(1).await;
        detail.load_gbp_rate().await;
        let view = detail.current();
        assert_eq!(view.salary_in_pounds(), None);
        assert_eq!(view.error, None);
        assert!(view.candidate.is_some());
    }

    #[tokio::test]
    async fn offline_rate_lookup_reports_generic_message() {
        let mut client = MockExchangeRateClient::new();
        client
            .expect_eur_rates()
            .returning(|| Err(Error::Internal("Unable to resolve host".into())));
        let detail = controller(MockCandidateStore::new(), client);

        detail.load_gbp_rate().await;
        assert_eq!(
            detail.current().error.as_deref(),
            Some(crate::error::NO_NETWORK_MESSAGE)
        );
    }

    #[tokio::test]
    async fn missing_candidate_is_reported() {
        let mut store = MockCandidateStore::new();
        store
            .expect_query_by_id()
            .returning(|id| Err(Error::NotFound(format!("Candidate {} not found", id))));
        let detail = controller(store, rates(Vec::new()));

        detail.load(5).await;
        let view = detail.current();
        assert!(view.candidate.is_none());
        assert!(view.error.unwrap().contains("Candidate 5 not found"));
    }

    #[tokio::test]
    async fn toggle_and_delete() {
        let mut store = MockCandidateStore::new();
        store.expect_query_by_id().returning(|id| Ok(stored(id)));
        store
            .expect_update_favorite_flag()
            .with(eq(2), eq(true))
            .returning(|_, _| Ok(()));
        store.expect_delete_by_id().with(eq(2)).returning(|_| Ok(()));
        let detail = controller(store, rates(Vec::new()));

        assert!(!detail.delete().await);
        detail.load(2).await;
        detail.toggle_favorite().await;
        assert!(detail.current().candidate.unwrap().favorite);

        assert!(detail.delete().await);
        assert!(detail.current().deleted);
    }
}
