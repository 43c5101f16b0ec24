//! Integration tests against a MySQL testcontainer
//!
//! Covers schema introspection through `SHOW TABLES`/`DESCRIBE`, generation
//! from a live database, and the runtime mapper's INSERT/UPDATE/DELETE
//! round trips.
//!
//! A single container is shared across all tests using the `ctor` pattern.
//! Tests run sequentially with `serial_test` and clean up tables between runs.
//!
//! Container cleanup:
//! - The `watchdog` feature handles cleanup on CTRL+C or SIGTERM signals
//! - For normal process exit, `shutdown_hooks` signals the container thread to stop
//! - The container lives inside the thread, so it's dropped when the thread exits

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};

use chrono::NaiveDateTime;
use ctor::ctor;
use datamapper::{
    DataMapper, Error, FromRow, LoadArgs, MySqlPool, Query, Record, RowExt, TableMapping, Value,
};
use datamapper_codegen::schema::KeyRole;
use datamapper_codegen::{CodegenBuilder, MySqlSchemaReader, SchemaSource};
use serial_test::serial;
use tempfile::TempDir;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use rust_decimal::Decimal;
use testcontainers_modules::mysql::Mysql;

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

// Holds the connection URL (container lives in the thread)
static DB_URL: OnceLock<String> = OnceLock::new();
// Flag to signal the container thread to exit
static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static CONTAINER_THREAD: OnceLock<JoinHandle<()>> = OnceLock::new();

extern "C" fn cleanup_on_exit() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    // Give the container thread time to clean up
    std::thread::sleep(std::time::Duration::from_millis(500));
}

#[ctor]
fn setup_container() {
    use std::time::Duration;

    shutdown_hooks::add_shutdown_hook(cleanup_on_exit);

    let (ready_tx, ready_rx) = std::sync::mpsc::channel();

    // The container gets its own runtime and thread so it outlives each test's runtime
    let handle = thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let container: ContainerAsync<Mysql> = Mysql::default().start().await.unwrap();
            let port = container.get_host_port_ipv4(3306).await.unwrap();
            let url = format!("mysql://root@127.0.0.1:{}/test", port);

            let pool = MySqlPool::new(&url).unwrap();
            for stmt in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                Query::new(stmt).execute(&pool).await.unwrap();
            }
            pool.disconnect().await.unwrap();

            ready_tx.send(url).unwrap();

            while !SHUTDOWN.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });
    });

    let _ = CONTAINER_THREAD.set(handle);

    let url = ready_rx.recv().unwrap();
    DB_URL.set(url).unwrap();
}

fn get_db_url() -> &'static str {
    DB_URL.get().expect("Container not initialized")
}

const ALL_TABLES: &[&str] = &["category_items", "categories", "order_items", "settings", "users"];

async fn clean_all_tables(pool: &MySqlPool) {
    Query::new("SET FOREIGN_KEY_CHECKS = 0")
        .execute(pool)
        .await
        .unwrap();
    for table in ALL_TABLES {
        Query::new(format!("DELETE FROM `{}`", table))
            .execute(pool)
            .await
            .unwrap();
    }
    Query::new("SET FOREIGN_KEY_CHECKS = 1")
        .execute(pool)
        .await
        .unwrap();
}

fn users_mapping() -> TableMapping {
    TableMapping::new(
        "users",
        &["id", "username", "email", "balance", "created_at"],
        &["id"],
        true,
    )
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: Option<String>,
    balance: Decimal,
    #[datamapper(column = "created_at")]
    created: Option<NaiveDateTime>,
}

fn snapshot(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect()
}

// ============ Schema Reader ============

#[tokio::test]
#[serial]
async fn test_show_tables_and_describe() {
    let reader = MySqlSchemaReader::connect(get_db_url()).unwrap();

    let names = reader.list_tables().await.unwrap();
    assert_eq!(names, vec!["categories", "category_items", "order_items", "settings", "users"]);

    let users = reader.describe("users").await.unwrap();
    assert_eq!(
        users.field_names(),
        vec!["id", "username", "email", "balance", "created_at"]
    );
    assert_eq!(users.primary_keys(), vec!["id"]);
    assert!(users.has_auto_primary_key());
    assert!(users.columns[0].column_type.starts_with("int"));
    assert_eq!(users.columns[1].key, KeyRole::Unique);
    assert_eq!(users.columns[3].column_type, "decimal(10,2)");
    assert!(users.columns[2].nullable);
    assert!(!users.columns[1].nullable);

    let items = reader.describe("category_items").await.unwrap();
    assert_eq!(items.column("category_id").unwrap().key, KeyRole::Multiple);

    let order_items = reader.describe("order_items").await.unwrap();
    assert_eq!(order_items.primary_keys(), vec!["order_id", "product_id"]);
    assert!(!order_items.has_auto_primary_key());
}

#[tokio::test]
#[serial]
async fn test_describe_unknown_table_fails() {
    let reader = MySqlSchemaReader::connect(get_db_url()).unwrap();
    let err = reader.describe("no_such_table").await.unwrap_err();
    assert!(err.to_string().contains("no_such_table"));
}

#[tokio::test]
#[serial]
async fn test_database_and_ddl_generate_identical_files() {
    let from_db = TempDir::new().unwrap();
    let from_ddl = TempDir::new().unwrap();
    let schema_file = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/schema.sql");

    let report = CodegenBuilder::from_database(get_db_url())
        .model_dir(from_db.path())
        .generate()
        .await
        .unwrap();
    assert_eq!(report.written(), 11);

    CodegenBuilder::new(schema_file)
        .model_dir(from_ddl.path())
        .generate()
        .await
        .unwrap();

    assert_eq!(snapshot(from_db.path()), snapshot(from_ddl.path()));
}

#[tokio::test]
#[serial]
async fn test_schema_source_preserves_show_tables_order() {
    let reader = MySqlSchemaReader::connect(get_db_url()).unwrap();
    let tables = reader.read_tables().await.unwrap();
    let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, reader.list_tables().await.unwrap());
}

// ============ Runtime Mapper ============

#[tokio::test]
#[serial]
async fn test_insert_load_update_delete() -> anyhow::Result<()> {
    let pool = MySqlPool::new(get_db_url())?;
    clean_all_tables(&pool).await;

    let mut mapper = DataMapper::new(users_mapping());
    let mut user: Record = [("username", "alice"), ("balance", "12.50")]
        .into_iter()
        .collect();
    mapper.save(&pool, &mut user).await?;

    let id = match user.get("id") {
        Some(Value::UInt(id)) => *id,
        other => panic!("expected generated id, got {:?}", other),
    };
    assert!(id > 0);

    // load into a fresh model by primary key
    let mut loaded = Record::new();
    let mut loader = DataMapper::new(users_mapping());
    loader
        .load(&pool, &mut loaded, LoadArgs::Positional(vec![Value::UInt(id)]))
        .await?;
    assert_eq!(loaded.get("username"), Some(&Value::from("alice")));
    assert_eq!(loaded.get("email"), Some(&Value::Null));
    let balance: Decimal = RowExt::get(&loaded, "balance")?;
    assert_eq!(balance, Decimal::new(1250, 2));

    // update a single column
    loaded.set("email", "alice@example.com");
    loader.save(&pool, &mut loaded).await?;

    let email: Option<Record> = Query::new("SELECT `email` FROM `users` WHERE `id` = ?")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    assert_eq!(
        email.and_then(|r| r.get("email").cloned()),
        Some(Value::from("alice@example.com"))
    );

    // clearing a column writes NULL
    loaded.set("email", Value::Null);
    loader.save(&pool, &mut loaded).await?;
    let row: Option<Record> = Query::new("SELECT `email` FROM `users` WHERE `id` = ?")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    assert_eq!(row.and_then(|r| r.get("email").cloned()), Some(Value::Null));

    loader.delete(&pool, &mut loaded).await?;
    assert!(loaded.iter().all(|(_, v)| v.is_null()));

    let err = DataMapper::new(users_mapping())
        .load(&pool, &mut Record::new(), LoadArgs::Positional(vec![Value::UInt(id)]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    pool.disconnect().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_saved_rows_read_back_as_structs() -> anyhow::Result<()> {
    let pool = MySqlPool::new(get_db_url())?;
    clean_all_tables(&pool).await;

    for name in ["bob", "carol"] {
        let mut user: Record = [("username", name), ("balance", "0.00")].into_iter().collect();
        DataMapper::new(users_mapping()).save(&pool, &mut user).await?;
    }

    let rows: Vec<UserRow> = Query::new(
        "SELECT `id`, `username`, `email`, `balance`, `created_at` FROM `users` ORDER BY `username`",
    )
    .fetch_all(&pool)
    .await?;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].username, "bob");
    assert_eq!(rows[1].username, "carol");
    assert!(rows[0].id < rows[1].id);
    assert_eq!(rows[0].email, None);
    assert_eq!(rows[0].balance, Decimal::ZERO);
    assert!(rows[0].created.is_none());

    pool.disconnect().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_composite_key_round_trip() -> anyhow::Result<()> {
    let pool = MySqlPool::new(get_db_url())?;
    clean_all_tables(&pool).await;

    let mapping = TableMapping::new(
        "order_items",
        &["order_id", "product_id", "quantity"],
        &["order_id", "product_id"],
        false,
    );

    let mut item: Record = [("order_id", 7i64), ("product_id", 3i64), ("quantity", 2i64)]
        .into_iter()
        .collect();
    DataMapper::new(mapping.clone()).save(&pool, &mut item).await?;

    let mut loaded = Record::new();
    let mut mapper = DataMapper::new(mapping.clone());
    mapper
        .load(
            &pool,
            &mut loaded,
            LoadArgs::Positional(vec![Value::Int(7), Value::Int(3)]),
        )
        .await?;
    assert_eq!(loaded.get("quantity"), Some(&Value::Int(2)));

    loaded.set("quantity", 5i64);
    mapper.save(&pool, &mut loaded).await?;

    let keys: Record = [("order_id", 7i64), ("product_id", 3i64)].into_iter().collect();
    let mut reloaded = Record::new();
    DataMapper::new(mapping)
        .load(&pool, &mut reloaded, LoadArgs::Named(keys))
        .await?;
    assert_eq!(reloaded.get("quantity"), Some(&Value::Int(5)));

    pool.disconnect().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_manual_key_must_be_set() -> anyhow::Result<()> {
    let pool = MySqlPool::new(get_db_url())?;
    clean_all_tables(&pool).await;

    let mapping = TableMapping::new("settings", &["name", "content"], &["name"], false);
    let mut setting: Record = [("content", "on")].into_iter().collect();

    let err = DataMapper::new(mapping.clone())
        .save(&pool, &mut setting)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingPrimaryKey { .. }));

    setting.set("name", "theme");
    let mut mapper = DataMapper::new(mapping);
    mapper.save(&pool, &mut setting).await?;
    assert_eq!(
        mapper.snapshot().and_then(|s| s.get("name")),
        Some(&Value::from("theme"))
    );

    pool.disconnect().await?;
    Ok(())
}
