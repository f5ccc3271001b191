//! Append-only SQLite persistence for transformed weather records.
//!
//! Three independent tables, one per record kind, each indexed on its time
//! column. The pipeline only ever appends; updates and deletes of prior rows
//! are left to downstream consumers.

use crate::types::records::{CurrentWeatherRecord, DailyWeatherRecord, HourlyWeatherRecord};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open weather database at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Row counts per table plus the most recent observation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageStats {
    pub current_rows: i64,
    pub hourly_rows: i64,
    pub daily_rows: i64,
    pub latest_current_timestamp: Option<DateTime<Utc>>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS current_weather (
    timestamp   TEXT NOT NULL,
    temp        REAL,
    feels_like  REAL,
    humidity    INTEGER,
    pressure    INTEGER,
    wind_speed  REAL,
    wind_deg    INTEGER,
    description TEXT NOT NULL,
    icon        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_current_timestamp ON current_weather (timestamp);

CREATE TABLE IF NOT EXISTS hourly_weather (
    timestamp   TEXT NOT NULL,
    temp        REAL,
    feels_like  REAL,
    humidity    INTEGER,
    pressure    INTEGER,
    wind_speed  REAL,
    wind_deg    INTEGER,
    description TEXT NOT NULL,
    icon        TEXT NOT NULL,
    pop         REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_hourly_timestamp ON hourly_weather (timestamp);

CREATE TABLE IF NOT EXISTS daily_weather (
    date        TEXT NOT NULL,
    temp_min    REAL,
    temp_max    REAL,
    temp_day    REAL,
    temp_night  REAL,
    humidity    INTEGER,
    pressure    INTEGER,
    wind_speed  REAL,
    wind_deg    INTEGER,
    description TEXT NOT NULL,
    icon        TEXT NOT NULL,
    pop         REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_daily_date ON daily_weather (date);
";

pub struct WeatherStore {
    conn: Connection,
}

impl WeatherStore {
    /// Open (creating if needed) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self { conn };
        store.init_schema()?;
        info!("Weather database ready at {}", path.display());
        Ok(store)
    }

    /// In-memory database, used by tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn insert_current(&mut self, record: &CurrentWeatherRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO current_weather
                 (timestamp, temp, feels_like, humidity, pressure, wind_speed, wind_deg, description, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.timestamp,
                record.temp,
                record.feels_like,
                record.humidity,
                record.pressure,
                record.wind_speed,
                record.wind_deg,
                record.description,
                record.icon,
            ],
        )?;
        debug!("Inserted current weather row at {}", record.timestamp);
        Ok(())
    }

    /// Append a batch of hourly rows in one transaction. Returns the row
    /// count inserted.
    pub fn insert_hourly(&mut self, records: &[HourlyWeatherRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO hourly_weather
                     (timestamp, temp, feels_like, humidity, pressure, wind_speed, wind_deg, description, icon, pop)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.timestamp,
                    record.temp,
                    record.feels_like,
                    record.humidity,
                    record.pressure,
                    record.wind_speed,
                    record.wind_deg,
                    record.description,
                    record.icon,
                    record.pop,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} hourly weather rows", records.len());
        Ok(records.len())
    }

    /// Append a batch of daily rows in one transaction. Returns the row
    /// count inserted.
    pub fn insert_daily(&mut self, records: &[DailyWeatherRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO daily_weather
                     (date, temp_min, temp_max, temp_day, temp_night, humidity, pressure, wind_speed, wind_deg, description, icon, pop)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.date,
                    record.temp_min,
                    record.temp_max,
                    record.temp_day,
                    record.temp_night,
                    record.humidity,
                    record.pressure,
                    record.wind_speed,
                    record.wind_deg,
                    record.description,
                    record.icon,
                    record.pop,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} daily weather rows", records.len());
        Ok(records.len())
    }

    /// The most recently observed current-conditions row, if any.
    pub fn latest_current(&self) -> Result<Option<CurrentWeatherRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                "SELECT timestamp, temp, feels_like, humidity, pressure, wind_speed, wind_deg, description, icon
                 FROM current_weather
                 ORDER BY timestamp DESC
                 LIMIT 1",
                [],
                |row| {
                    Ok(CurrentWeatherRecord {
                        timestamp: row.get(0)?,
                        temp: row.get(1)?,
                        feels_like: row.get(2)?,
                        humidity: row.get(3)?,
                        pressure: row.get(4)?,
                        wind_speed: row.get(5)?,
                        wind_deg: row.get(6)?,
                        description: row.get(7)?,
                        icon: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn usage_stats(&self) -> Result<UsageStats, StoreError> {
        let count = |table: &str| -> Result<i64, rusqlite::Error> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        };
        let latest_current_timestamp = self
            .conn
            .query_row(
                "SELECT MAX(timestamp) FROM current_weather",
                [],
                |row| row.get::<_, Option<DateTime<Utc>>>(0),
            )
            .optional()?
            .flatten();

        Ok(UsageStats {
            current_rows: count("current_weather")?,
            hourly_rows: count("hourly_weather")?,
            daily_rows: count("daily_weather")?,
            latest_current_timestamp,
        })
    }
}

impl std::fmt::Debug for WeatherStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn current_at(hour: u32) -> CurrentWeatherRecord {
        CurrentWeatherRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            temp: Some(5.0),
            feels_like: Some(2.0),
            humidity: Some(80),
            pressure: Some(1013),
            wind_speed: Some(4.47),
            wind_deg: Some(315),
            description: "Partly Cloudy".to_string(),
            icon: "02d".to_string(),
        }
    }

    fn hourly_at(hour: u32) -> HourlyWeatherRecord {
        HourlyWeatherRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            temp: Some(5.0),
            feels_like: Some(5.0),
            humidity: Some(65),
            pressure: None,
            wind_speed: Some(4.47),
            wind_deg: Some(315),
            description: "Light Rain".to_string(),
            icon: "09d".to_string(),
            pop: 0.2,
        }
    }

    fn daily_on(day: u32) -> DailyWeatherRecord {
        DailyWeatherRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            temp_min: Some(0.0),
            temp_max: Some(7.2),
            temp_day: Some(7.2),
            temp_night: Some(0.0),
            humidity: Some(55),
            pressure: None,
            wind_speed: Some(4.47),
            wind_deg: Some(315),
            description: "Sunny".to_string(),
            icon: "01d".to_string(),
            pop: 0.4,
        }
    }

    #[test]
    fn insert_and_read_back_latest_current() {
        let mut store = WeatherStore::in_memory().unwrap();
        assert_eq!(store.latest_current().unwrap(), None);

        store.insert_current(&current_at(8)).unwrap();
        store.insert_current(&current_at(12)).unwrap();

        let latest = store.latest_current().unwrap().unwrap();
        assert_eq!(latest, current_at(12));
    }

    #[test]
    fn batch_inserts_report_row_counts() {
        let mut store = WeatherStore::in_memory().unwrap();
        let hourly: Vec<_> = (0..5).map(hourly_at).collect();
        let daily: Vec<_> = (1..=3).map(daily_on).collect();

        assert_eq!(store.insert_hourly(&hourly).unwrap(), 5);
        assert_eq!(store.insert_daily(&daily).unwrap(), 3);
        assert_eq!(store.insert_hourly(&[]).unwrap(), 0);
    }

    #[test]
    fn usage_stats_count_rows_per_table() {
        let mut store = WeatherStore::in_memory().unwrap();
        store.insert_current(&current_at(9)).unwrap();
        store.insert_hourly(&[hourly_at(10), hourly_at(11)]).unwrap();
        store.insert_daily(&[daily_on(1)]).unwrap();

        let stats = store.usage_stats().unwrap();
        assert_eq!(stats.current_rows, 1);
        assert_eq!(stats.hourly_rows, 2);
        assert_eq!(stats.daily_rows, 1);
        assert_eq!(
            stats.latest_current_timestamp,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn cycles_append_rather_than_overwrite() {
        let mut store = WeatherStore::in_memory().unwrap();
        for _ in 0..3 {
            store.insert_current(&current_at(12)).unwrap();
            store.insert_daily(&[daily_on(1)]).unwrap();
        }
        let stats = store.usage_stats().unwrap();
        assert_eq!(stats.current_rows, 3);
        assert_eq!(stats.daily_rows, 3);
    }

    #[test]
    fn reopening_a_database_file_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.db");

        {
            let mut store = WeatherStore::open(&path).unwrap();
            store.insert_current(&current_at(12)).unwrap();
        }
        let store = WeatherStore::open(&path).unwrap();
        assert_eq!(store.usage_stats().unwrap().current_rows, 1);
    }
}
