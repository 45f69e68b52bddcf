use serde::{Deserialize, Serialize};

/// Body of `POST /company/{id}/clients/search`.
#[derive(Debug, Serialize)]
pub struct ClientSearchRequest {
    pub page: u32,
    pub page_size: u32,
    pub fields: Vec<&'static str>,
}

impl ClientSearchRequest {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            fields: vec!["id", "name", "phone"],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClientSearchResponse {
    #[serde(default)]
    pub data: Vec<ClientEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ClientEntry {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(default)]
    pub phone: String,
}
