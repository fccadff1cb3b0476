pub mod candidate_repository;
pub mod currency_service;
