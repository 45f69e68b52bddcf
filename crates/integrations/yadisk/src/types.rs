use serde::Deserialize;

/// Subset of the resource metadata returned by `GET /v1/disk/resources`.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub path: Option<String>,
    pub public_url: Option<String>,
}

/// Upload target returned by `GET /v1/disk/resources/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadLink {
    pub href: String,
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "PUT".to_owned()
}
