use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::{info, warn};

use super::settings::{AppEnv, DatabaseSettings};

pub(crate) static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// Production refuses local databases and always negotiates TLS.
pub(crate) fn connect_options(db: &DatabaseSettings, app_env: AppEnv) -> Result<PgConnectOptions> {
    let options =
        PgConnectOptions::from_str(&db.url).context("DATABASE_URL is not a valid postgres URL")?;

    if app_env == AppEnv::Production {
        if is_local_host(options.get_host()) {
            return Err(anyhow!(
                "DATABASE_URL points to a local host; refusing to start in production"
            ));
        }
        return Ok(options.ssl_mode(PgSslMode::Require));
    }

    Ok(options)
}

pub(crate) fn is_local_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.starts_with('/') || LOCAL_HOSTS.iter().any(|local| host.eq_ignore_ascii_case(local))
}

pub(crate) async fn create_pool(db: &DatabaseSettings, app_env: AppEnv) -> Result<PgPool> {
    let options = connect_options(db, app_env)?;

    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .acquire_timeout(Duration::from_secs(db.connect_timeout_secs))
        .connect_with(options)
        .await
        .context("failed to connect to database")?;

    info!(max_connections = db.max_connections, "database pool opened");
    Ok(pool)
}

pub(crate) async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to apply database migrations")?;
    info!("database migrations applied");
    Ok(())
}

pub(crate) async fn close_pool(pool: PgPool) {
    pool.close().await;
    info!("database pool closed");
}

pub(crate) async fn server_version(pool: &PgPool) -> Result<String> {
    sqlx::query_scalar::<_, String>("SELECT version()")
        .fetch_one(pool)
        .await
        .context("failed to query server version")
}

pub(crate) async fn list_tables(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = 'public'
          AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .fetch_all(pool)
    .await
    .context("failed to list tables")
}

/// Runs a multi-statement script in one round trip and returns the rows affected.
pub(crate) async fn execute_script(pool: &PgPool, sql: &str) -> Result<u64> {
    if sql.trim().is_empty() {
        warn!("SQL script is empty, nothing to execute");
        return Ok(0);
    }

    let result = sqlx::raw_sql(sql)
        .execute(pool)
        .await
        .context("failed to execute SQL script")?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::{connect_options, is_local_host};
    use crate::infrastructure::settings::{AppEnv, DatabaseSettings};

    fn db(url: &str) -> DatabaseSettings {
        DatabaseSettings {
            url: url.to_string(),
            max_connections: 1,
            connect_timeout_secs: 1,
        }
    }

    #[test]
    fn local_hosts_are_detected() {
        assert!(is_local_host("localhost"));
        assert!(is_local_host("LOCALHOST"));
        assert!(is_local_host("127.0.0.1"));
        assert!(is_local_host("[::1]"));
        assert!(is_local_host("/var/run/postgresql"));
        assert!(!is_local_host("db.example.com"));
    }

    #[test]
    fn production_refuses_localhost() {
        let err = connect_options(&db("postgres://u:p@localhost:5432/blog"), AppEnv::Production)
            .expect_err("must refuse");
        assert!(err.to_string().contains("local host"));
    }

    #[test]
    fn production_accepts_remote_host() {
        let options =
            connect_options(&db("postgres://u:p@db.example.com:5432/blog"), AppEnv::Production)
                .expect("must accept");
        assert_eq!(options.get_host(), "db.example.com");
    }

    #[test]
    fn development_accepts_localhost() {
        assert!(
            connect_options(&db("postgres://u:p@localhost:5432/blog"), AppEnv::Development)
                .is_ok()
        );
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(connect_options(&db("not a url"), AppEnv::Development).is_err());
    }
}
