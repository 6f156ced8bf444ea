use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub database: String,
    pub bind_addr: String,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            mongodb_uri: std::env::var("MONGODB_URI")
                .context("You need to add the MONGODB_URI to the env")?,
            database: std::env::var("ROLLBOOK_DB").unwrap_or_else(|_| "rollbook".into()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            jwt_secret: std::env::var("JWT_SECRET")
                .context("You need to add the JWT_SECRET to the env")?,
        })
    }
}
