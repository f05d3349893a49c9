use redis::{AsyncCommands, RedisResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn get_event_availability(&self, event_id: &str) -> RedisResult<Option<i32>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("event:{}:availability", event_id);
        conn.get(key).await
    }

    pub async fn set_event_availability(&self, event_id: &str, count: i32) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("event:{}:availability", event_id);
        conn.set(key, count).await
    }

    /// Decrement the cached remaining-seat count after a booking. Lua
    /// guard: only touch an existing key, otherwise the next read
    /// re-seeds from Postgres instead of starting from a bogus negative.
    /// The cache is advisory; the SQL row is the source of truth.
    pub async fn decr_event_availability(
        &self,
        event_id: &str,
        count: i32,
    ) -> RedisResult<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("event:{}:availability", event_id);
        let script = redis::Script::new(
            r#"
            if redis.call("EXISTS", KEYS[1]) == 1 then
                return redis.call("DECRBY", KEYS[1], ARGV[1])
            else
                return nil
            end
        "#,
        );

        script.key(key).arg(count).invoke_async(&mut conn).await
    }

    pub async fn delete_event_availability(&self, event_id: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("event:{}:availability", event_id);
        conn.del(key).await
    }

    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}
