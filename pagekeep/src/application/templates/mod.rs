// pagekeep/src/application/templates/mod.rs
pub mod offline_page;
