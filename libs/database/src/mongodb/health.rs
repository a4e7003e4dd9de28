use mongodb::{Client, bson::doc};
use std::time::{Duration, Instant};

use super::MongoError;

/// Round-trip a `ping` and report how long it took
pub async fn ping(client: &Client) -> Result<Duration, MongoError> {
    let start = Instant::now();
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(start.elapsed())
}

/// Readiness probe: `Err` carries a message suitable for the `/ready` body
pub async fn check_health(client: &Client) -> Result<(), String> {
    match ping(client).await {
        Ok(latency) => {
            tracing::trace!(latency_ms = latency.as_millis() as u64, "MongoDB ping");
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_check_health() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        assert!(check_health(&client).await.is_ok());
    }
}
