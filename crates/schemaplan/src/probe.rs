//! Target server detection.

use schemaplan_mysql::ServerInfo;
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;

use crate::error::Result;

const SERVER_VARIABLES: &str = "SELECT @@version, @@character_set_server, @@collation_server";

/// Reads flavor, version and defaults from a live server. Only runs a
/// read-only query.
///
/// # Errors
///
/// Returns an error if the server cannot be reached or reports a version
/// that cannot be parsed.
pub async fn probe(database_url: &str) -> Result<ServerInfo> {
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;
    let (version, charset, collation): (String, String, String) =
        sqlx::query_as(SERVER_VARIABLES).fetch_one(&pool).await?;
    pool.close().await;

    let server = ServerInfo::from_variables(&version, charset, collation)?;
    info!(
        flavor = %server.flavor,
        version = %server.version,
        collation = %server.collation,
        "Detected server"
    );
    Ok(server)
}

/// Builds server info without a connection, starting from
/// [`ServerInfo::default`] and applying the given overrides.
///
/// # Errors
///
/// Returns an error if `version` cannot be parsed.
pub fn offline(
    version: Option<&str>,
    charset: Option<String>,
    collation: Option<String>,
) -> Result<ServerInfo> {
    let mut server = ServerInfo::default();
    if let Some(version) = version {
        let parsed = ServerInfo::from_variables(version, "", "")?;
        server.flavor = parsed.flavor;
        server.version = parsed.version;
    }
    if let Some(charset) = charset {
        server.charset = charset;
    }
    if let Some(collation) = collation {
        server.collation = collation;
    }
    Ok(server)
}
