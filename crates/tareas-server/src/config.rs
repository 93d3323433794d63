use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub airtable_api_key: String,
    pub airtable_base_id: String,
    pub session_secret: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            airtable_api_key: env::var("AIRTABLE_API_KEY")
                .expect("AIRTABLE_API_KEY must be set"),
            airtable_base_id: env::var("AIRTABLE_BASE_ID")
                .expect("AIRTABLE_BASE_ID must be set"),
            session_secret: env::var("SESSION_SECRET")
                .expect("SESSION_SECRET must be set"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
        })
    }
}
