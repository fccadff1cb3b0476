use crate::database::candidate_store::CandidateStore;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

pub type CandidateListStream = BoxStream<'static, Result<Vec<Candidate>>>;

/// Conversion and error boundary between the candidate store and the screens.
///
/// Nothing here panics or short-circuits a stream: every store failure comes
/// back as an `Err` value, and list streams keep running after one.
#[derive(Clone)]
pub struct CandidateRepository {
    store: Arc<dyn CandidateStore>,
}

impl CandidateRepository {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self { store }
    }

    pub fn get_all_candidates(&self) -> CandidateListStream {
        self.store
            .query_all()
            .map(|result| result.map(|rows| rows.into_iter().map(Candidate::from_row).collect()))
            .boxed()
    }

    pub fn get_all_favorite_candidates(&self) -> CandidateListStream {
        self.store
            .query_by_favorite(true)
            .map(|result| result.map(|rows| rows.into_iter().map(Candidate::from_row).collect()))
            .boxed()
    }

    pub async fn get_candidate(&self, id: i64) -> Result<Candidate> {
        let row = self.store.query_by_id(id).await.map_err(|e| {
            tracing::warn!(candidate_id = id, error = %e, "Failed to load candidate");
            e
        })?;
        Ok(Candidate::from_row(row))
    }

    pub async fn get_candidate_or_none(&self, id: i64) -> Result<Option<Candidate>> {
        let row = self.store.query_by_id_or_none(id).await?;
        Ok(row.map(Candidate::from_row))
    }

    /// Inserts the candidate and returns its new id.
    pub async fn add_candidate(&self, candidate: &Candidate) -> Result<i64> {
        let id = self
            .store
            .insert(candidate.to_new_row())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to add candidate");
                e
            })?;
        tracing::info!(candidate_id = id, "Candidate added");
        Ok(id)
    }

    /// Replaces every field except the favorite flag, which only changes
    /// through [`CandidateRepository::update_favorite`].
    pub async fn update_candidate(&self, candidate: &Candidate) -> Result<()> {
        let row = candidate
            .to_row()
            .ok_or_else(|| Error::BadRequest("Candidate has not been saved yet".to_string()))?;
        let id = row.id;
        self.store.update(row).await.map_err(|e| {
            tracing::warn!(candidate_id = id, error = %e, "Failed to update candidate");
            e
        })?;
        tracing::info!(candidate_id = id, "Candidate updated");
        Ok(())
    }

    pub async fn delete_candidate(&self, candidate: &Candidate) -> Result<()> {
        let id = candidate
            .id
            .ok_or_else(|| Error::BadRequest("Candidate has not been saved yet".to_string()))?;
        self.store.delete_by_id(id).await.map_err(|e| {
            tracing::warn!(candidate_id = id, error = %e, "Failed to delete candidate");
            e
        })?;
        tracing::info!(candidate_id = id, "Candidate deleted");
        Ok(())
    }

    pub async fn update_favorite(&self, id: i64, is_favorite: bool) -> Result<()> {
        self.store
            .update_favorite_flag(id, is_favorite)
            .await
            .map_err(|e| {
                tracing::warn!(candidate_id = id, error = %e, "Failed to update favorite flag");
                e
            })
    }

    /// Flips the stored favorite flag and returns the new value.
    pub async fn toggle_favorite(&self, id: i64) -> Result<bool> {
        let current = self.store.query_by_id(id).await?;
        let favorite = !current.favorite;
        self.update_favorite(id, favorite).await?;
        Ok(favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::candidate_store::MockCandidateStore;
    use crate::models::candidate::CandidateRow;
    use futures::stream;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn row(id: i64, firstname: &str, favorite: bool) -> CandidateRow {
        CandidateRow {
            id,
            firstname: firstname.to_string(),
            lastname: "dupond".to_string(),
            phone: "0606060606".to_string(),
            email: "test@mail.fr".to_string(),
            birthdate: "03/10/2000".to_string(),
            salary: 2000,
            notes: "best candidate".to_string(),
            profile_picture: String::new(),
            favorite,
        }
    }

    #[tokio::test]
    async fn get_all_candidates_maps_rows() {
        let mut store = MockCandidateStore::new();
        store
            .expect_query_all()
            .returning(|| stream::iter(vec![Ok::<_, Error>(vec![row(1, "martin", true)])]).boxed());
        let repo = CandidateRepository::new(Arc::new(store));

        let first = repo.get_all_candidates().next().await.unwrap();
        let candidates = assert_ok!(first);
        assert_eq!(candidates, vec![Candidate::from_row(row(1, "martin", true))]);
    }

    #[tokio::test]
    async fn list_stream_survives_a_failure() {
        let mut store = MockCandidateStore::new();
        store.expect_query_all().returning(|| {
            stream::iter(vec![
                Err(Error::Internal("disk I/O error".into())),
                Ok(vec![row(1, "martin", false)]),
            ])
            .boxed()
        });
        let repo = CandidateRepository::new(Arc::new(store));

        let items: Vec<_> = repo.get_all_candidates().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_err());
        assert_eq!(items[1].as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn favorites_query_the_flag() {
        let mut store = MockCandidateStore::new();
        store
            .expect_query_by_favorite()
            .with(eq(true))
            .returning(|_| stream::iter(vec![Ok::<_, Error>(vec![row(4, "Alice", true)])]).boxed());
        let repo = CandidateRepository::new(Arc::new(store));

        let favorites = repo.get_all_favorite_candidates().next().await.unwrap().unwrap();
        assert!(favorites.iter().all(|c| c.favorite));
    }

    #[tokio::test]
    async fn get_candidate_carries_store_failure() {
        let mut store = MockCandidateStore::new();
        store
            .expect_query_by_id()
            .with(eq(9))
            .returning(|id| Err(Error::NotFound(format!("Candidate {} not found", id))));
        let repo = CandidateRepository::new(Arc::new(store));

        let err = assert_err!(repo.get_candidate(9).await);
        assert_eq!(err.to_string(), "Not found: Candidate 9 not found");
    }

    #[tokio::test]
    async fn update_of_unsaved_candidate_is_rejected() {
        let store = MockCandidateStore::new();
        let repo = CandidateRepository::new(Arc::new(store));
        let candidate = Candidate::new("Bob", "Marley", "0606", "b@m.fr", "01/01/2000", 1000);

        assert!(matches!(
            repo.update_candidate(&candidate).await,
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            repo.delete_candidate(&candidate).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn add_failure_keeps_message() {
        let mut store = MockCandidateStore::new();
        store
            .expect_insert()
            .returning(|_| Err(Error::Internal("database is locked".into())));
        let repo = CandidateRepository::new(Arc::new(store));
        let candidate = Candidate::new("Bob", "Marley", "0606", "b@m.fr", "01/01/2000", 1000);

        let err = assert_err!(repo.add_candidate(&candidate).await);
        assert!(err.to_string().contains("database is locked"));
    }

    #[tokio::test]
    async fn get_candidate_or_none_maps_absence() {
        let mut store = MockCandidateStore::new();
        store
            .expect_query_by_id_or_none()
            .with(eq(1))
            .returning(|id| Ok(Some(row(id, "martin", false))));
        store
            .expect_query_by_id_or_none()
            .with(eq(2))
            .returning(|_| Ok(None));
        let repo = CandidateRepository::new(Arc::new(store));

        let found = assert_ok!(repo.get_candidate_or_none(1).await);
        assert_eq!(found.map(|c| c.firstname), Some("martin".to_string()));
        assert_eq!(assert_ok!(repo.get_candidate_or_none(2).await), None);
    }

    #[tokio::test]
    async fn toggle_writes_negated_flag() {
        let mut store = MockCandidateStore::new();
        store
            .expect_query_by_id()
            .returning(|id| Ok(row(id, "Alice", false)));
        store
            .expect_update_favorite_flag()
            .with(eq(4), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        let repo = CandidateRepository::new(Arc::new(store));

        assert!(repo.toggle_favorite(4).await.unwrap());
    }
}
