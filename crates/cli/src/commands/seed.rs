//! Demo data seeding.
//!
//! Creates a demo account (`demo@slowcafe.wifi` / `Demopass1`) and a batch
//! of cafes with plausibly slow wifi. Inserts are idempotent: rerunning the
//! command skips rows that already exist.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use cafe_wifi_core::types::wifi::round2;
use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

const DEMO_EMAIL: &str = "demo@slowcafe.wifi";
const DEMO_PASSWORD: &str = "Demopass1";

const NAME_PREFIXES: &[&str] = &[
    "Buffering", "Dial-Up", "Glacial", "Molasses", "Patience", "Snail Mail", "Spinner",
    "Timeout", "Tortoise", "Yesterday's",
];
const NAME_SUFFIXES: &[&str] = &[
    "Beans", "Brew", "Cafe", "Coffee House", "Espresso Bar", "Grounds", "Roasters",
];
const STREETS: &[&str] = &[
    "Latency Lane", "Packet Loss Parkway", "Jitter Junction", "Throttle Terrace",
    "Bandwidth Boulevard", "Congestion Court",
];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to hash demo password")]
    PasswordHash,
}

/// Seed the database with a demo account and `count` cafes.
pub async fn run(count: u32) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| SeedError::MissingEnvVar("DATABASE_URL"))?;
    let pool = PgPool::connect(&database_url).await?;

    let user_id = seed_demo_user(&pool).await?;
    let created = seed_cafes(&pool, user_id, count).await?;

    tracing::info!(created, "seeding complete");
    Ok(())
}

async fn seed_demo_user(pool: &PgPool) -> Result<Uuid, SeedError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(DEMO_PASSWORD.as_bytes(), &salt)
        .map_err(|_| SeedError::PasswordHash)?
        .to_string();

    let id = Uuid::new_v4();
    let row: Option<(Uuid,)> = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, first_name) \
         VALUES ($1, $2, $3, 'Demo') \
         ON CONFLICT (email) DO NOTHING \
         RETURNING id",
    )
    .bind(id)
    .bind(DEMO_EMAIL)
    .bind(&password_hash)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id,)) => {
            tracing::info!(email = DEMO_EMAIL, "demo account created");
            Ok(id)
        }
        None => {
            let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(DEMO_EMAIL)
                .fetch_one(pool)
                .await?;
            tracing::info!(email = DEMO_EMAIL, "demo account already present");
            Ok(id)
        }
    }
}

async fn seed_cafes(pool: &PgPool, added_by: Uuid, count: u32) -> Result<u32, SeedError> {
    let mut rng = rand::rng();
    let mut created = 0;

    for index in 0..count {
        let prefix = NAME_PREFIXES[index as usize % NAME_PREFIXES.len()];
        let suffix = NAME_SUFFIXES[index as usize / NAME_PREFIXES.len() % NAME_SUFFIXES.len()];
        let street = STREETS[index as usize % STREETS.len()];
        let name = format!("{prefix} {suffix}");
        let address = format!("{} {street}, Slow City", 100 + index);
        let contact: i64 = 5_550_000_000 + i64::from(index);

        // Mostly slow connections, with the odd decent one for contrast.
        let download = round2(if rng.random_range(0..5) == 0 {
            rng.random_range(10.0..60.0)
        } else {
            rng.random_range(0.3..5.0)
        });
        let upload = round2(download * rng.random_range(0.3..0.8));
        let ping = round2(rng.random_range(20.0..250.0));
        let tested_at = Utc::now();

        // A single history entry matching the wifi columns, so averages and
        // history reads line up with organically recorded tests.
        let entry = serde_json::json!([{
            "download": download,
            "upload": upload,
            "ping": ping,
            "deviceType": "seed",
            "timestamp": tested_at,
        }]);

        let inserted = sqlx::query(
            "INSERT INTO cafes (id, name, address, contact, description, \
                 wifi_download, wifi_upload, wifi_ping, wifi_last_tested, \
                 amenities, speed_tests, latitude, longitude, added_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             ON CONFLICT (LOWER(name), LOWER(address)) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&address)
        .bind(contact)
        .bind(format!("Come for the coffee, stay because {name} is still loading."))
        .bind(download)
        .bind(upload)
        .bind(ping)
        .bind(tested_at)
        .bind(vec!["wifi".to_string(), "beverages".to_string()])
        .bind(&entry)
        .bind(40.0 + rng.random_range(-0.05..0.05))
        .bind(-74.0 + rng.random_range(-0.05..0.05))
        .bind(added_by)
        .execute(pool)
        .await?
        .rows_affected();

        created += u32::try_from(inserted).unwrap_or(0);
    }

    Ok(created)
}
