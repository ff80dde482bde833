use super::*;
use gym_core::ID;
use gym_core::Unique;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::Row;

/// Table for registered members and their password hashes.
pub const USERS: &str = "users";

/// Idempotent DDL for the members table.
pub const CREATES: &str = const_format::concatcp!(
    "CREATE TABLE IF NOT EXISTS ",
    USERS,
    " (
        id              UUID PRIMARY KEY,
        name            VARCHAR(255) NOT NULL,
        email           VARCHAR(255) UNIQUE NOT NULL,
        password_hash   TEXT NOT NULL,
        role            VARCHAR(16) NOT NULL DEFAULT 'MEMBER'
    );"
);

/// Connects to DB_URL and ensures the members table exists.
pub async fn db() -> anyhow::Result<Arc<Client>> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").map_err(|_| anyhow::anyhow!("DB_URL must be set"))?;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client.execute("SET client_min_messages TO WARNING", &[]).await?;
    client.batch_execute(CREATES).await?;
    Ok(Arc::new(client))
}

fn member(row: &Row) -> Result<Member, Failure> {
    Ok(Member::new(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        row.get::<_, String>(1),
        row.get::<_, String>(2),
        row.get::<_, String>(3).parse::<Role>()?,
    ))
}

impl Members for Arc<Client> {
    async fn lookup(&self, email: &str) -> Result<Option<(Member, Password)>, Failure> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, name, email, role, password_hash FROM ",
                USERS,
                " WHERE email = $1"
            ),
            &[&email],
        )
        .await
        .map_err(Failure::internal)?
        .map(|row| -> Result<_, Failure> {
            Ok((member(&row)?, Password::restore(row.get::<_, String>(4))))
        })
        .transpose()
    }

    async fn find(&self, id: ID<Member>) -> Result<Option<Member>, Failure> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, name, email, role FROM ",
                USERS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map_err(Failure::internal)?
        .map(|row| member(&row))
        .transpose()
    }

    async fn exists(&self, email: &str) -> Result<bool, Failure> {
        self.query_opt(
            const_format::concatcp!("SELECT 1 FROM ", USERS, " WHERE email = $1"),
            &[&email],
        )
        .await
        .map(|opt| opt.is_some())
        .map_err(Failure::internal)
    }

    async fn create(&self, member: &Member, password: &Password) -> Result<(), Failure> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                USERS,
                " (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5)"
            ),
            &[
                &member.id().inner(),
                &member.name(),
                &member.email(),
                &password.as_str(),
                &member.role().as_str(),
            ],
        )
        .await
        .map(|_| ())
        .map_err(|e| {
            if e.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
                Failure::Conflict
            } else {
                Failure::internal(e)
            }
        })
    }
}
