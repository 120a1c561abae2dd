use std::time::Duration;

use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::TableCreateStatement,
};

use crate::{
    config::AppConfig,
    entity::{CartItems, OrderItems, Orders, Products, Users},
};

pub fn connect_options(config: &AppConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.database_url());
    options
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .sqlx_logging(false);
    options
}

/// Create a SeaORM connection.
pub async fn create_orm_conn(options: ConnectOptions) -> Result<DatabaseConnection> {
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Create every table and index the service needs, skipping the ones that
/// already exist. Safe to run on every start.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);

    create_entity(conn, &schema, Users).await?;
    create_entity(conn, &schema, Products).await?;
    create_entity(conn, &schema, CartItems).await?;
    create_entity(conn, &schema, Orders).await?;
    create_entity(conn, &schema, OrderItems).await?;

    tracing::debug!(?backend, "schema up to date");
    Ok(())
}

async fn create_entity<E: EntityTrait>(
    conn: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let backend = conn.get_database_backend();

    let mut table: TableCreateStatement = schema.create_table_from_entity(entity);
    table.if_not_exists();
    conn.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        conn.execute(backend.build(&index)).await?;
    }

    Ok(())
}
