use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::watch;

use crate::dto::candidate_dto::CandidatePayload;
use crate::error::Result;
use crate::models::candidate::Candidate;
use crate::services::candidate_repository::CandidateRepository;
use crate::utils::time::format_birthdate_for_database;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddView {
    pub added: Option<Candidate>,
    pub error: Option<String>,
}

pub struct AddController {
    repository: CandidateRepository,
    state: watch::Sender<AddView>,
    birthdate_for_db: Mutex<Option<String>>,
}

impl AddController {
    pub fn new(repository: CandidateRepository) -> Self {
        let (state, _) = watch::channel(AddView::default());
        Self {
            repository,
            state,
            birthdate_for_db: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AddView> {
        self.state.subscribe()
    }

    pub fn current(&self) -> AddView {
        self.state.borrow().clone()
    }

    pub fn set_birthdate_for_db(&self, date: NaiveDate) {
        *self.birthdate_for_db.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(format_birthdate_for_database(date));
    }

    /// Validates the form and inserts a new, non-favorite candidate.
    pub async fn add(&self, mut form: CandidatePayload) -> Result<Candidate> {
        let picked = self
            .birthdate_for_db
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(birthdate) = picked {
            form.birthdate = birthdate;
        }

        let result = match form.into_candidate() {
            Ok(candidate) => self
                .repository
                .add_candidate(&candidate)
                .await
                .map(|id| Candidate {
                    id: Some(id),
                    ..candidate
                }),
            Err(e) => Err(e),
        };

        match result {
            Ok(candidate) => {
                let added = candidate.clone();
                self.state.send_modify(|view| {
                    view.added = Some(added);
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
