pub mod glossary;
pub mod home;
pub mod query;
pub mod timeline;
