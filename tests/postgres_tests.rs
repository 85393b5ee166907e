// tests/postgres_tests.rs
//
// Runs against a real Postgres when DATABASE_URL is set, skipped otherwise.

use chrono::{TimeZone, Utc};
use manga_comments::{config::Config, db::Sql, routes, state::AppState};
use serde_json::{Value, json};
use sqlx::{PgPool, postgres::PgPoolOptions};

fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

async fn spawn_app(database_url: &str) -> String {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.to_string()),
        "RUST_LOG" => Some("error".to_string()),
        _ => None,
    });

    let sql = Sql::from_config(&config).expect("Failed to build query handle");
    assert!(sql.is_some());

    let app = routes::create_router(AppState { sql, config });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn ensure_schema(pool: &PgPool) {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS public.profiles (
            id UUID PRIMARY KEY,
            username TEXT,
            avatar_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .expect("Failed to create profiles");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS public.manga_comments (
            id BIGSERIAL PRIMARY KEY,
            manga_id BIGINT NOT NULL,
            user_id UUID,
            comment TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            parent_id BIGINT
        )
        "#,
    )
    .execute(pool)
    .await
    .expect("Failed to create manga_comments");
}

#[tokio::test]
async fn comments_come_back_oldest_first_with_profiles() {
    let Some(database_url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return;
    };

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");
    ensure_schema(&pool).await;

    // A manga id no other run will use.
    let manga_id = 1_000_000 + (uuid::Uuid::new_v4().as_u128() % 1_000_000_000) as i64;
    let user_id = uuid::Uuid::new_v4();
    let username = format!("u_{}", &user_id.to_string()[..8]);

    sqlx::query("INSERT INTO public.profiles (id, username, avatar_url) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(&username)
        .bind("http://x/a.png")
        .execute(&pool)
        .await
        .unwrap();

    // Inserted out of chronological order.
    let rows = [
        (3, Some(user_id), "third"),
        (1, Some(user_id), "first"),
        (2, None, "second"),
    ];
    for (day, author, text) in rows {
        sqlx::query(
            "INSERT INTO public.manga_comments (manga_id, user_id, comment, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(manga_id)
        .bind(author)
        .bind(text)
        .bind(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
        .execute(&pool)
        .await
        .unwrap();
    }

    let address = spawn_app(&database_url).await;
    let body = reqwest::get(format!("{}/api/manga/{}/comments", address, manga_id))
        .await
        .expect("Failed to execute request")
        .json::<Value>()
        .await
        .unwrap();

    assert_eq!(body["ok"], true);
    let items = body["items"].as_array().unwrap();
    let texts: Vec<&str> = items.iter().map(|i| i["comment"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);

    assert_eq!(items[0]["created_at"], "2024-01-01T00:00:00.000Z");
    assert_eq!(items[0]["manga_id"], manga_id);
    assert_eq!(
        items[0]["profile"],
        json!({ "id": user_id.to_string(), "username": username, "avatar_url": "http://x/a.png" })
    );
    assert_eq!(items[1]["user_id"], Value::Null);
    assert_eq!(
        items[1]["profile"],
        json!({ "id": null, "username": null, "avatar_url": null })
    );
    assert!(items.iter().all(|i| i["id"].is_string()));

    let empty = reqwest::get(format!("{}/api/manga/{}/comments", address, manga_id + 1))
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(empty, json!({ "ok": true, "items": [] }));
}
