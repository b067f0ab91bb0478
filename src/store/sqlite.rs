use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};

use super::error::StoreResult;
use super::StationStore;
use crate::gyunggi::GyunggiStation;
use crate::openapi::Source;
use crate::seoul::SeoulStation;
use crate::station::StandardBusStation;

const SCHEMA: &str = include_str!("schema.sql");

pub struct SqliteStationStore {
    conn: Connection,
    /// Stamped on every standard row written by this store
    collected_at: String,
}

impl SqliteStationStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        log::debug!("Preparing station tables");
        conn.execute_batch(SCHEMA)?;

        Ok(SqliteStationStore {
            conn,
            collected_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }

    #[cfg(test)]
    pub fn count(&self, table: &str) -> StoreResult<i64> {
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count)
    }
}

impl StationStore for SqliteStationStore {
    fn create_seoul_station(&mut self, station: &SeoulStation) -> StoreResult<()> {
        let mut statement = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO seoul_bus_station (
                station_id, station_name, station_type, ars_id,
                longitude, latitude, arrival_display_yn
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        statement.execute(params![
            station.station_id,
            station.station_name,
            station.station_type,
            station.ars_id,
            station.longitude,
            station.latitude,
            station.arrival_display_yn,
        ])?;
        Ok(())
    }

    fn create_gyunggi_station(&mut self, station: &GyunggiStation) -> StoreResult<()> {
        let mut statement = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO gyunggi_bus_station (
                station_id, station_name, coordinate_x, coordinate_y,
                gps_coordinate_x, gps_coordinate_y, link_id, station_type,
                transfer_station_ext_no, median_bus_lane_yn, station_english_name, ars_id,
                institution_code, data_display_yn, registered_by, registered_at,
                memo, sign_post_type, dong_code, region_code,
                use_yn, station_chinese_name, station_japanese_name, station_vietnam_name,
                drt_yn, station_type_name, transfer_station_type_name, sign_post_type_name
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28
            )",
        )?;
        statement.execute(params![
            station.station_id,
            station.station_name,
            station.coordinate_x,
            station.coordinate_y,
            station.gps_coordinate_x,
            station.gps_coordinate_y,
            station.link_id,
            station.station_type,
            station.transfer_station_ext_no,
            station.median_bus_lane_yn,
            station.station_english_name,
            station.ars_id,
            station.institution_code,
            station.data_display_yn,
            station.registered_by,
            station.registered_at,
            station.memo,
            station.sign_post_type,
            station.dong_code,
            station.region_code,
            station.use_yn,
            station.station_chinese_name,
            station.station_japanese_name,
            station.station_vietnam_name,
            station.drt_yn,
            station.station_type_name,
            station.transfer_station_type_name,
            station.sign_post_type_name,
        ])?;
        Ok(())
    }

    fn create_standard_station(
        &mut self,
        origin: Source,
        station: &StandardBusStation,
    ) -> StoreResult<()> {
        let mut statement = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO bus_station (
                source, station_id, station_name, ars_id, latitude, longitude, collected_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        statement.execute(params![
            origin.as_str(),
            station.station_id,
            station.station_name,
            station.ars_id,
            station.latitude,
            station.longitude,
            self.collected_at,
        ])?;
        Ok(())
    }
}
