use mongodb::{Client, Collection, Database};

use crate::config::AppConfig;
use crate::schemas::{Attendance, Student};

/// Handle to the document store. Opened once at startup and cloned into every
/// worker; the client closes its connections when the last clone drops.
#[derive(Clone)]
pub struct Db {
    database: Database,
}

impl Db {
    pub async fn connect(config: &AppConfig) -> mongodb::error::Result<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        Ok(Self {
            database: client.database(&config.database),
        })
    }

    pub fn students(&self) -> Collection<Student> {
        self.database.collection("students")
    }

    pub fn attendance(&self) -> Collection<Attendance> {
        self.database.collection("attendance")
    }
}
