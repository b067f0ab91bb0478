pub mod error;
pub mod sqlite;

use crate::gyunggi::GyunggiStation;
use crate::openapi::Source;
use crate::seoul::SeoulStation;
use crate::station::StandardBusStation;

use self::error::StoreResult;

/// Persistence for collected stations, one station per call
pub trait StationStore {
    fn create_seoul_station(&mut self, station: &SeoulStation) -> StoreResult<()>;

    fn create_gyunggi_station(&mut self, station: &GyunggiStation) -> StoreResult<()>;

    fn create_standard_station(
        &mut self,
        origin: Source,
        station: &StandardBusStation,
    ) -> StoreResult<()>;
}

// Writers stop at the first failure, stations already written stay written.

pub fn insert_seoul_stations(
    store: &mut impl StationStore,
    stations: &[SeoulStation],
) -> StoreResult<usize> {
    for station in stations {
        store.create_seoul_station(station)?;
    }
    log::info!("[seoul] raw stations written: {}", stations.len());
    Ok(stations.len())
}

pub fn insert_gyunggi_stations(
    store: &mut impl StationStore,
    stations: &[GyunggiStation],
) -> StoreResult<usize> {
    for station in stations {
        store.create_gyunggi_station(station)?;
    }
    log::info!("[gyunggi] raw stations written: {}", stations.len());
    Ok(stations.len())
}

pub fn insert_standard_stations(
    store: &mut impl StationStore,
    origin: Source,
    stations: Vec<StandardBusStation>,
) -> StoreResult<usize> {
    for station in &stations {
        store.create_standard_station(origin, station)?;
    }
    log::info!("[{}] standard stations written: {}", origin, stations.len());
    Ok(stations.len())
}
