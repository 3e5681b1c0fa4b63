//! Core domain types shared by the engine and the REST client

pub mod models;
