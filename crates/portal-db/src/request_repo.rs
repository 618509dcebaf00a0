//! Repository for citizen service requests.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

use portal_models::{CitizenRequest, Cpf};

use crate::client::Database;
use crate::error::{DbError, DbResult};

/// Repository for citizen request records.
///
/// Only a validated [`Cpf`] can be written, so every stored row carries a
/// checksum-verified CPF by construction.
pub struct RequestRepository {
    db: Database,
}

impl RequestRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a request whose CPF already passed validation.
    pub async fn create(
        &self,
        name: &str,
        cpf: &Cpf,
        description: &str,
    ) -> DbResult<CitizenRequest> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO citizen_requests (name, cpf, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(cpf.as_str())
        .bind(description)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        info!(id, cpf = %cpf.formatted(), "citizen request recorded");
        Ok(CitizenRequest {
            id,
            name: name.to_string(),
            cpf: cpf.clone(),
            description: description.to_string(),
            created_at: now,
        })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<CitizenRequest>> {
        let row = sqlx::query(
            "SELECT id, name, cpf, description, created_at FROM citizen_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(request_from_row).transpose()
    }

    /// All requests, newest first.
    pub async fn list(&self) -> DbResult<Vec<CitizenRequest>> {
        let rows = sqlx::query(
            "SELECT id, name, cpf, description, created_at FROM citizen_requests
             ORDER BY created_at DESC",
        )
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(request_from_row).collect()
    }
}

fn request_from_row(row: &SqliteRow) -> DbResult<CitizenRequest> {
    let raw: String = row.try_get("cpf")?;
    let cpf = Cpf::parse(&raw)
        .map_err(|e| DbError::invalid_row(format!("stored CPF failed validation: {}", e)))?;

    Ok(CitizenRequest {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        cpf,
        description: row.try_get("description")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> RequestRepository {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        RequestRepository::new(db)
    }

    #[tokio::test]
    async fn stored_requests_come_back_with_canonical_cpf() {
        let repo = repo().await;
        let cpf = Cpf::parse("111.444.777-35").unwrap();
        let created = repo
            .create("Jo\u{e3}o Silva", &cpf, "Broken bench in the square")
            .await
            .unwrap();

        let stored = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.cpf.as_str(), "11144477735");
        assert_eq!(stored.name, "Jo\u{e3}o Silva");

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
