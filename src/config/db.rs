use super::environment::AppConfig;

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

impl MongoConfig {
    /// `None` when no MongoDB URL is configured; callers fall back to the in-memory store.
    pub fn from_app(app: &AppConfig) -> Option<Self> {
        let url = app.mongodb_url.clone()?;
        Some(Self {
            url,
            database: app
                .mongodb_database
                .clone()
                .unwrap_or_else(|| "course_pipeline".to_string()),
        })
    }
}
