use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::watch;

use crate::dto::candidate_dto::CandidatePayload;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::services::candidate_repository::CandidateRepository;
use crate::utils::time::format_birthdate_for_database;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditView {
    pub candidate: Option<Candidate>,
    pub saved: bool,
    pub error: Option<String>,
}

/// Controller of the edit screen: loads one candidate and writes the edited
/// form back over it.
pub struct EditController {
    repository: CandidateRepository,
    state: watch::Sender<EditView>,
    birthdate_for_db: Mutex<Option<String>>,
}

impl EditController {
    pub fn new(repository: CandidateRepository) -> Self {
        let (state, _) = watch::channel(EditView::default());
        Self {
            repository,
            state,
            birthdate_for_db: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EditView> {
        self.state.subscribe()
    }

    pub fn current(&self) -> EditView {
        self.state.borrow().clone()
    }

    pub async fn load(&self, id: i64) {
        match self.repository.get_candidate(id).await {
            Ok(candidate) => self.state.send_modify(|view| {
                view.candidate = Some(candidate);
                view.saved = false;
            }),
            Err(e) => self.state.send_modify(|view| view.error = Some(e.user_message())),
        }
    }

    /// Records the date picked on screen; it wins over the typed birthdate on save.
    pub fn set_birthdate_for_db(&self, date: NaiveDate) {
        *self.birthdate_for_db.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(format_birthdate_for_database(date));
    }

    pub fn birthdate_for_db(&self) -> Option<String> {
        self.birthdate_for_db
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validates `form` and replaces the loaded candidate with it. The id and
    /// favorite flag of the loaded candidate are kept.
    pub async fn save(&self, mut form: CandidatePayload) -> Result<Candidate> {
        let Some(loaded) = self.state.borrow().candidate.clone() else {
            return Err(Error::BadRequest("No candidate loaded".to_string()));
        };
        if let Some(birthdate) = self.birthdate_for_db() {
            form.birthdate = birthdate;
        }

        let edited = form.into_candidate().map(|edited| Candidate {
            id: loaded.id,
            favorite: loaded.favorite,
            ..edited
        });
        let result = match edited {
            Ok(candidate) => self
                .repository
                .update_candidate(&candidate)
                .await
                .map(|()| candidate),
            Err(e) => Err(e),
        };

        match result {
            Ok(candidate) => {
                let saved = candidate.clone();
                self.state.send_modify(|view| {
                    view.candidate = Some(saved);
                    view.saved = true;
                    view.error = None;
                });
                Ok(candidate)
            }
            Err(e) => {
                self.state.send_modify(|view| view.error = Some(e.user_message()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::candidate_store::MockCandidateStore;
    use crate::models::candidate::CandidateRow;
    use mockall::predicate::function;
    use std::sync::Arc;

    fn stored() -> CandidateRow {
        CandidateRow {
            id: 3,
            firstname: "Charlie".into(),
            lastname: "Chocolate".into(),
            phone: "0606060606".into(),
            email: "charlie@mail.fr".into(),
            birthdate: "03/10/2000".into(),
            salary: 1000,
            notes: String::new(),
            profile_picture: String::new(),
            favorite: true,
        }
    }

    fn form() -> CandidatePayload {
        CandidatePayload::from_candidate(&Candidate::from_row(stored()))
    }

    #[tokio::test]
    async fn save_keeps_id_and_favorite() {
        let mut store = MockCandidateStore::new();
        store.expect_query_by_id().returning(|_| Ok(stored()));
        store
            .expect_update()
            .with(function(|row: &CandidateRow| {
                row.id == 3 && row.salary == 2500 && row.birthdate == "01/02/1999"
            }))
            .times(1)
            .returning(|_| Ok(()));
        let edit = EditController::new(CandidateRepository::new(Arc::new(store)));

        edit.load(3).await;
        edit.set_birthdate_for_db(NaiveDate::from_ymd_opt(1999, 2, 1).unwrap());
        let saved = edit
            .save(CandidatePayload {
                salary: 2500,
                ..form()
            })
            .await
            .unwrap();
        assert!(saved.favorite);
        assert!(edit.current().saved);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_store() {
        let mut store = MockCandidateStore::new();
        store.expect_query_by_id().returning(|_| Ok(stored()));
        store.expect_update().never();
        let edit = EditController::new(CandidateRepository::new(Arc::new(store)));

        edit.load(3).await;
        let result = edit
            .save(CandidatePayload {
                email: "broken".into(),
                ..form()
            })
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(edit.current().error.is_some());
    }

    #[tokio::test]
    async fn save_without_load_is_rejected() {
        let edit = EditController::new(CandidateRepository::new(Arc::new(MockCandidateStore::new())));
        assert!(matches!(edit.save(form()).await, Err(Error::BadRequest(_))));
    }
}
