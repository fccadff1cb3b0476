use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `candidates` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub email: String,
    pub birthdate: String,
    pub salary: i64,
    pub notes: String,
    pub profile_picture: String,
    pub favorite: bool,
}

/// Column values for a row that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidateRow {
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub email: String,
    pub birthdate: String,
    pub salary: i64,
    pub notes: String,
    pub profile_picture: String,
    pub favorite: bool,
}

/// A job applicant tracked by the recruiter.
///
/// `id` stays `None` until the first successful insert; `birthdate` is kept in
/// the storage format `dd/MM/yyyy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Option<i64>,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub email: String,
    pub birthdate: String,
    pub salary: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub favorite: bool,
}

impl Candidate {
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        birthdate: impl Into<String>,
        salary: i64,
    ) -> Self {
        Self {
            id: None,
            firstname: firstname.into(),
            lastname: lastname.into(),
            phone: phone.into(),
            email: email.into(),
            birthdate: birthdate.into(),
            salary,
            notes: String::new(),
            profile_picture: String::new(),
            favorite: false,
        }
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub fn from_row(row: CandidateRow) -> Self {
        Self {
            id: Some(row.id),
            firstname: row.firstname,
            lastname: row.lastname,
            phone: row.phone,
            email: row.email,
            birthdate: row.birthdate,
            salary: row.salary,
            notes: row.notes,
            profile_picture: row.profile_picture,
            favorite: row.favorite,
        }
    }

    /// Row for an update of an already persisted candidate.
    pub fn to_row(&self) -> Option<CandidateRow> {
        let id = self.id?;
        Some(CandidateRow {
            id,
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            birthdate: self.birthdate.clone(),
            salary: self.salary,
            notes: self.notes.clone(),
            profile_picture: self.profile_picture.clone(),
            favorite: self.favorite,
        })
    }

    pub fn to_new_row(&self) -> NewCandidateRow {
        NewCandidateRow {
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            birthdate: self.birthdate.clone(),
            salary: self.salary,
            notes: self.notes.clone(),
            profile_picture: self.profile_picture.clone(),
            favorite: self.favorite,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Case-insensitive substring match on first or last name.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.firstname.to_lowercase().contains(&needle)
            || self.lastname.to_lowercase().contains(&needle)
    }
}
