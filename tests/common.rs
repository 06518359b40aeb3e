use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;

use ladle::config::{ApiConfig, ConfigV1, LoggingConfig, StorageConfig};
use ladle::Client;

#[derive(Serialize)]
struct TestClaims {
    exp: i64,
    iat: i64,
    #[serde(rename = "userId")]
    user_id: String,
    email: String,
}

/// Mints a signed access token whose expiry lies `exp_offset_secs` from now.
pub fn mint_token(exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = TestClaims {
        exp: now + exp_offset_secs,
        iat: now,
        user_id: "u1".to_string(),
        email: "u1@example.com".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("token should encode")
}

/// Config against a mock server, with in-memory credential storage.
pub fn test_config(base_url: &str) -> ConfigV1 {
    ConfigV1 {
        api: ApiConfig::new(base_url),
        storage: StorageConfig::disabled(),
        logging: LoggingConfig::default(),
    }
}

pub async fn connect(base_url: &str) -> Client {
    Client::connect(&test_config(base_url))
        .await
        .expect("client should build")
}

/// A login/register response body carrying the given token pair.
pub fn auth_body(access: &str, refresh: &str) -> String {
    format!(
        r#"{{"token": "{}", "refreshToken": "{}",
             "user": {{"_id": "u1", "username": "carla", "email": "carla@example.com",
                       "name": "Carla", "recipesCount": 3}}}}"#,
        access, refresh
    )
}

/// A refresh response body carrying the given token pair.
pub fn refresh_body(access: &str, refresh: &str) -> String {
    format!(r#"{{"token": "{}", "refreshToken": "{}"}}"#, access, refresh)
}

static SCRATCH: AtomicU32 = AtomicU32::new(0);

/// A unique temp path for file-store scenarios.
pub fn scratch_path() -> PathBuf {
    let file = format!(
        "ladle-it-{}-{}.json",
        std::process::id(),
        SCRATCH.fetch_add(1, Ordering::Relaxed)
    );
    std::env::temp_dir().join(file)
}
