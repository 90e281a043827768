use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite; a single connection so every statement sees the same
    // database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to connect to test database");

    use sea_orm_migration::MigratorTrait;
    crate::database::migrations::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}
