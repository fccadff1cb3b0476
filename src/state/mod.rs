pub mod add;
pub mod detail;
pub mod edit;
pub mod home;
pub mod selection;
pub mod status;
