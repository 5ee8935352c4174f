use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub async fn init_db(db_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Pack opens hold a connection for the whole allocation transaction.
    opt.max_connections(max_connections)
        .min_connections(5.min(max_connections))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(30 * 60))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("pack_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
