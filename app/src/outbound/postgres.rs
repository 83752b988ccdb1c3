use std::collections::BTreeMap;

use anyhow::Context;
use internal::{
    domain::point::{FieldValue, LatestRecord, TelemetryPoint},
    port::telemetry::TelemetrySinkDrivenPort,
};
use log::{debug, info};
use serde_json::{Map, Number, Value};
use sqlx::{
    PgPool, query, query_as,
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    types::Json,
};
use time::OffsetDateTime;
use tokio::sync::OnceCell;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Telemetry sink backed by PostgreSQL. The pool is created on first use and
/// reused for the lifetime of the repository.
pub struct TelemetryRepository {
    options: PgConnectOptions,
    pool: OnceCell<PgPool>,
}

impl TelemetryRepository {
    pub fn new(options: PgConnectOptions) -> Self {
        TelemetryRepository {
            options,
            pool: OnceCell::new(),
        }
    }

    #[cfg(test)]
    fn with_pool(pool: PgPool) -> Self {
        TelemetryRepository {
            options: PgConnectOptions::new(),
            pool: OnceCell::from(pool),
        }
    }

    async fn pool(&self) -> anyhow::Result<&PgPool> {
        self.pool
            .get_or_try_init(|| async {
                let pool = PgPoolOptions::new()
                    .max_connections(2)
                    .connect_with(self.options.clone())
                    .await
                    .context("Cannot connect to postgres")?;
                MIGRATOR
                    .run(&pool)
                    .await
                    .context("Cannot apply telemetry migrations")?;
                info!("Connected to telemetry database");
                Ok(pool)
            })
            .await
    }
}

impl TelemetrySinkDrivenPort for TelemetryRepository {
    async fn write(&self, point: &TelemetryPoint) -> anyhow::Result<()> {
        let record = TelemetryRecord::from_point(point);
        let result = query(
            "INSERT INTO telemetry (measurement, brew_id, recorded_at, fields) VALUES ($1, $2, $3, $4)",
        )
        .bind(record.measurement)
        .bind(record.brew_id)
        .bind(record.recorded_at)
        .bind(Json(record.fields))
        .execute(self.pool().await?)
        .await
        .context("Can't execute telemetry insert")?;
        debug!("Inserted {} telemetry row(s)", result.rows_affected());
        Ok(())
    }

    async fn latest(&self) -> anyhow::Result<Option<LatestRecord>> {
        let row: Option<(String, OffsetDateTime, Json<Map<String, Value>>)> = query_as(
            "SELECT brew_id, recorded_at, fields FROM telemetry ORDER BY recorded_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(self.pool().await?)
        .await
        .context("Can't fetch latest telemetry")?;
        Ok(row.map(|(brew_id, timestamp, Json(fields))| LatestRecord {
            brew_id,
            timestamp,
            fields: fields_from_json(fields),
        }))
    }
}

struct TelemetryRecord {
    measurement: String,
    brew_id: String,
    recorded_at: OffsetDateTime,
    fields: Value,
}

impl TelemetryRecord {
    fn from_point(point: &TelemetryPoint) -> Self {
        let fields = point
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), field_to_json(value)))
            .collect::<Map<String, Value>>();
        TelemetryRecord {
            measurement: point.measurement.to_string(),
            brew_id: point.brew_id.clone(),
            recorded_at: point.timestamp,
            fields: Value::Object(fields),
        }
    }
}

fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Float(v) => Number::from_f64(*v).map(Value::Number).unwrap_or(Value::Null),
        FieldValue::Bool(v) => Value::Bool(*v),
        FieldValue::Text(v) => Value::String(v.clone()),
    }
}

fn fields_from_json(fields: Map<String, Value>) -> BTreeMap<String, FieldValue> {
    fields
        .into_iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::Number(n) => FieldValue::Float(n.as_f64()?),
                Value::Bool(b) => FieldValue::Bool(b),
                Value::String(s) => FieldValue::Text(s),
                _ => return None,
            };
            Some((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use internal::domain::{
        frame::{ControllerAction, TelemetryFrame},
        point::{FieldValue, TelemetryPoint},
    };
    use internal::port::telemetry::TelemetrySinkDrivenPort;
    use serde_json::{Value, json};
    use sqlx::PgPool;
    use time::macros::datetime;

    use super::{TelemetryRecord, TelemetryRepository, fields_from_json};

    fn point() -> TelemetryPoint {
        let frame = TelemetryFrame {
            instant: 18.75,
            average: 18.8,
            min: 18.5,
            max: 19.0,
            target: 19.0,
            ambient: 14.5,
            action: ControllerAction::Rest,
            rest: Some(true),
            heat: Some(false),
            cool: Some(false),
            reason_code: "R0".into(),
            json_size: None,
        };
        TelemetryPoint::from_frame(&frame, "42-IPA-01", datetime!(2024-03-01 10:00:00.250 UTC))
    }

    #[test]
    fn should_create_telemetry_record() {
        let record = TelemetryRecord::from_point(&point());
        assert_eq!(record.measurement, "temperature");
        assert_eq!(record.brew_id, "42-IPA-01");
        assert_eq!(record.recorded_at, datetime!(2024-03-01 10:00:00.250 UTC));
        assert_eq!(record.fields["target"], json!(19.0));
        assert_eq!(record.fields["action"], json!("Rest"));
        assert_eq!(record.fields["rest"], json!(true));
        assert_eq!(record.fields.get("json-size"), None);
    }

    #[test]
    fn should_store_integral_readings_as_floats() {
        let record = TelemetryRecord::from_point(&point());
        assert_eq!(serde_json::to_string(&record.fields["target"]).unwrap(), "19.0");
    }

    #[test]
    fn should_read_back_fields() {
        let Value::Object(fields) = json!({"target": 19.0, "heat": false, "reason-code": "R1", "junk": null}) else {
            unreachable!()
        };
        let fields = fields_from_json(fields);
        assert_eq!(fields.get("target"), Some(&FieldValue::Float(19.0)));
        assert_eq!(fields.get("heat"), Some(&FieldValue::Bool(false)));
        assert_eq!(fields.get("reason-code"), Some(&FieldValue::Text("R1".into())));
        assert_eq!(fields.get("junk"), None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL instance reachable through DATABASE_URL"]
    async fn should_insert_and_read_latest(pool: PgPool) -> anyhow::Result<()> {
        let repo = TelemetryRepository::with_pool(pool);
        assert_eq!(repo.latest().await?, None);

        repo.write(&point()).await?;
        let latest = repo.latest().await?.unwrap();
        assert_eq!(latest.brew_id, "42-IPA-01");
        assert_eq!(latest.timestamp, datetime!(2024-03-01 10:00:00.250 UTC));
        assert_eq!(latest.fields.get("target"), Some(&FieldValue::Float(19.0)));
        Ok(())
    }
}
