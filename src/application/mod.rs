pub mod app_error;
pub mod field_mapper;
pub mod use_cases;
