//! Greeting service

use apistack_core::now_iso;

use crate::models::NameResponse;

/// Greets an already-validated name
#[derive(Debug, Clone)]
pub struct NameService {
    environment: String,
}

impl NameService {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }

    pub fn process_name(&self, name: &str) -> NameResponse {
        NameResponse {
            message: format!("Hello, {name}!"),
            environment: self.environment.clone(),
            timestamp: now_iso(),
        }
    }
}
