use crate::error::{Error, Result};
use crate::models::candidate::{CandidateRow, NewCandidateRow};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::watch;

pub type CandidateRowStream = BoxStream<'static, Result<Vec<CandidateRow>>>;

const SELECT_COLUMNS: &str = r#"
    SELECT id, firstname, lastname, phone, email, birthdate, salary, notes, profile_picture, favorite
    FROM candidates
"#;

/// Persistent table of candidates.
///
/// The two list queries are live: they yield the current rows immediately and
/// again after every write made through the same store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn insert(&self, candidate: NewCandidateRow) -> Result<i64>;

    fn query_all(&self) -> CandidateRowStream;

    /// Fails with [`Error::NotFound`] when no row has this id.
    async fn query_by_id(&self, id: i64) -> Result<CandidateRow>;

    async fn query_by_id_or_none(&self, id: i64) -> Result<Option<CandidateRow>>;

    fn query_by_favorite(&self, favorite: bool) -> CandidateRowStream;

    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// Rewrites every mutable column except `favorite`.
    async fn update(&self, candidate: CandidateRow) -> Result<()>;

    async fn update_favorite_flag(&self, id: i64, favorite: bool) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
enum ListQuery {
    All,
    ByFavorite(bool),
}

impl ListQuery {
    async fn fetch(self, pool: &SqlitePool) -> Result<Vec<CandidateRow>> {
        let rows = match self {
            ListQuery::All => {
                sqlx::query_as::<_, CandidateRow>(&format!("{SELECT_COLUMNS} ORDER BY id"))
                    .fetch_all(pool)
                    .await?
            }
            ListQuery::ByFavorite(flag) => sqlx::query_as::<_, CandidateRow>(&format!(
                "{SELECT_COLUMNS} WHERE favorite = ? ORDER BY id"
            ))
            .bind(flag)
            .fetch_all(pool)
            .await?,
        };
        Ok(rows)
    }
}

pub struct SqliteCandidateStore {
    pool: SqlitePool,
    changes: watch::Sender<u64>,
}

impl SqliteCandidateStore {
    pub fn new(pool: SqlitePool) -> Self {
        let (changes, _) = watch::channel(0);
        Self { pool, changes }
    }

    fn notify_change(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }

    fn observe(&self, query: ListQuery) -> CandidateRowStream {
        let pool = self.pool.clone();
        let receiver = self.changes.subscribe();

        stream::unfold(
            (pool, receiver, true),
            move |(pool, mut receiver, first)| async move {
                if !first && receiver.changed().await.is_err() {
                    return None;
                }
                let result = query.fetch(&pool).await;
                if let Err(e) = &result {
                    tracing::warn!(error = %e, ?query, "Candidate list query failed");
                }
                Some((result, (pool, receiver, false)))
            },
        )
        .boxed()
    }
}

fn ensure_affected(rows_affected: u64, id: i64) -> Result<()> {
    if rows_affected == 0 {
        return Err(Error::NotFound(format!("Candidate {} not found", id)));
    }
    Ok(())
}

#[async_trait]
impl CandidateStore for SqliteCandidateStore {
    async fn insert(&self, candidate: NewCandidateRow) -> Result<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO candidates (firstname, lastname, phone, email, birthdate, salary, notes, profile_picture, favorite)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&candidate.firstname)
        .bind(&candidate.lastname)
        .bind(&candidate.phone)
        .bind(&candidate.email)
        .bind(&candidate.birthdate)
        .bind(candidate.salary)
        .bind(&candidate.notes)
        .bind(&candidate.profile_picture)
        .bind(candidate.favorite)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.notify_change();
        Ok(id)
    }

    fn query_all(&self) -> CandidateRowStream {
        self.observe(ListQuery::All)
    }

    async fn query_by_id(&self, id: i64) -> Result<CandidateRow> {
        self.query_by_id_or_none(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", id)))
    }

    async fn query_by_id_or_none(&self, id: i64) -> Result<Option<CandidateRow>> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    fn query_by_favorite(&self, favorite: bool) -> CandidateRowStream {
        self.observe(ListQuery::ByFavorite(favorite))
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), id)?;

        self.notify_change();
        Ok(())
    }

    async fn update(&self, candidate: CandidateRow) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE candidates
            SET firstname = ?, lastname = ?, phone = ?, email = ?, birthdate = ?,
                salary = ?, notes = ?, profile_picture = ?
            WHERE id = ?
            "#,
        )
        .bind(&candidate.firstname)
        .bind(&candidate.lastname)
        .bind(&candidate.phone)
        .bind(&candidate.email)
        .bind(&candidate.birthdate)
        .bind(candidate.salary)
        .bind(&candidate.notes)
        .bind(&candidate.profile_picture)
        .bind(candidate.id)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), candidate.id)?;

        self.notify_change();
        Ok(())
    }

    async fn update_favorite_flag(&self, id: i64, favorite: bool) -> Result<()> {
        let result = sqlx::query("UPDATE candidates SET favorite = ? WHERE id = ?")
            .bind(favorite)
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), id)?;

        self.notify_change();
        Ok(())
    }
}
