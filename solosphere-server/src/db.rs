use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create jobs collection
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            seq BIGSERIAL NOT NULL,
            id UUID PRIMARY KEY,
            doc JSONB NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create bids collection
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bids (
            seq BIGSERIAL NOT NULL,
            id UUID PRIMARY KEY,
            doc JSONB NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One bid per (bidder, job); keep in sync with Collection::unique_fields
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_bids_bidder_job ON bids ((doc->>'email'), (doc->>'jobId'))",
    )
    .execute(pool)
    .await?;

    // Create indexes for the lookups the repositories issue
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_seq ON jobs(seq)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_owner ON jobs((doc #>> '{buyer,email}'))")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_category ON jobs((doc #>> '{job_category}'))")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bids_seq ON bids(seq)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bids_email ON bids((doc #>> '{email}'))")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bids_buyer_email ON bids((doc #>> '{buyer_email}'))",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
