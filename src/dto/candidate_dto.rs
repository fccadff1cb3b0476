use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::state::selection::SelectedView;
use crate::utils::time::{format_birthdate_for_database, parse_birthdate_input};

/// Add/edit form as typed by the recruiter.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CandidatePayload {
    #[validate(custom(function = "crate::utils::validation::validate_not_blank"))]
    pub firstname: String,
    #[validate(custom(function = "crate::utils::validation::validate_not_blank"))]
    pub lastname: String,
    #[validate(custom(function = "crate::utils::validation::validate_phone"))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "crate::utils::validation::validate_birthdate"))]
    pub birthdate: String,
    #[validate(range(min = 0))]
    pub salary: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub profile_picture: String,
}

impl CandidatePayload {
    /// Validates the form and builds an unsaved candidate with the birthdate
    /// normalized to the storage format.
    pub fn into_candidate(self) -> Result<Candidate> {
        self.validate()?;
        let birthdate = parse_birthdate_input(&self.birthdate)
            .map(format_birthdate_for_database)
            .ok_or_else(|| Error::BadRequest(format!("Invalid birthdate: {}", self.birthdate)))?;

        Ok(Candidate {
            id: None,
            firstname: self.firstname.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            birthdate,
            salary: self.salary,
            notes: self.notes,
            profile_picture: self.profile_picture,
            favorite: false,
        })
    }

    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            firstname: candidate.firstname.clone(),
            lastname: candidate.lastname.clone(),
            phone: candidate.phone.clone(),
            email: candidate.email.clone(),
            birthdate: candidate.birthdate.clone(),
            salary: candidate.salary,
            notes: candidate.notes.clone(),
            profile_picture: candidate.profile_picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritePayload {
    pub favorite: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateListQuery {
    pub search: Option<String>,
    pub view: Option<SelectedView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub full_name: String,
}

impl From<Candidate> for CandidateResponse {
    fn from(candidate: Candidate) -> Self {
        Self {
            full_name: candidate.full_name(),
            candidate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateListResponse {
    pub items: Vec<CandidateResponse>,
    pub total: usize,
}

impl From<Vec<Candidate>> for CandidateListResponse {
    fn from(candidates: Vec<Candidate>) -> Self {
        let items: Vec<CandidateResponse> = candidates.into_iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDetailResponse {
    #[serde(flatten)]
    pub candidate: CandidateResponse,
    pub age: Option<u32>,
    pub salary_gbp: Option<f64>,
    pub salary_gbp_display: Option<String>,
}
