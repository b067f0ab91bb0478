//! One collection run: every source is probed, paged through, corrected,
//! standardized and written before the next one starts.

use serde::Serialize;

use crate::config::CollectorConfig;
use crate::error::CollectorResult;
use crate::geo::BesselToWgs84;
use crate::gyunggi::{self, GyunggiApi, GyunggiStation};
use crate::openapi::client::Transport;
use crate::openapi::pagination::collect_all;
use crate::openapi::Source;
use crate::seoul::{self, SeoulApi, SeoulStation};
use crate::station::StandardBusStation;
use crate::store::{
    insert_gyunggi_stations, insert_seoul_stations, insert_standard_stations, StationStore,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub collected: usize,
    pub kept: usize,
    pub written: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub seoul: SourceSummary,
    pub gyunggi: SourceSummary,
}

pub struct Collector<T: Transport> {
    transport: T,
    config: CollectorConfig,
}

impl<T: Transport> Collector<T> {
    pub fn new(transport: T, config: CollectorConfig) -> Self {
        Collector { transport, config }
    }

    fn seoul_api(&self) -> SeoulApi {
        SeoulApi::new(
            self.config.seoul.base_url.clone(),
            self.config.seoul.api_key.clone(),
            self.config.doc_type,
        )
    }

    fn gyunggi_api(&self) -> GyunggiApi {
        GyunggiApi::new(
            self.config.gyunggi.base_url.clone(),
            self.config.gyunggi.api_key.clone(),
            self.config.doc_type,
        )
    }

    pub async fn collect_seoul_bus_stations(&self) -> CollectorResult<Vec<SeoulStation>> {
        let stations = collect_all(&self.transport, &self.seoul_api(), &self.config.paging).await?;
        Ok(stations)
    }

    pub async fn collect_gyunggi_bus_stations(&self) -> CollectorResult<Vec<GyunggiStation>> {
        let stations =
            collect_all(&self.transport, &self.gyunggi_api(), &self.config.paging).await?;
        Ok(stations)
    }

    /// Filters and reprojects the raw stations, returning them alongside their standard form
    pub fn correct_gyunggi_bus_stations(
        &self,
        stations: Vec<GyunggiStation>,
    ) -> CollectorResult<(Vec<GyunggiStation>, Vec<StandardBusStation>)> {
        let transform = BesselToWgs84::new()?;
        let corrected = gyunggi::correct_stations(stations, &transform)?;
        let standard = gyunggi::convert_to_standard(&corrected);
        Ok((corrected, standard))
    }

    pub async fn run_seoul(&self, store: &mut impl StationStore) -> CollectorResult<SourceSummary> {
        let stations = self.collect_seoul_bus_stations().await?;
        let standard = seoul::convert_to_standard(&stations);

        insert_seoul_stations(store, &stations)?;
        let kept = standard.len();
        let written = insert_standard_stations(store, Source::Seoul, standard)?;

        Ok(SourceSummary {
            collected: stations.len(),
            kept,
            written,
        })
    }

    pub async fn run_gyunggi(
        &self,
        store: &mut impl StationStore,
    ) -> CollectorResult<SourceSummary> {
        let stations = self.collect_gyunggi_bus_stations().await?;
        let collected = stations.len();
        let (corrected, standard) = self.correct_gyunggi_bus_stations(stations)?;

        insert_gyunggi_stations(store, &corrected)?;
        let written = insert_standard_stations(store, Source::Gyunggi, standard)?;

        Ok(SourceSummary {
            collected,
            kept: corrected.len(),
            written,
        })
    }

    /// Runs Seoul then Gyunggi, stopping at the first error
    pub async fn run(&self, store: &mut impl StationStore) -> CollectorResult<RunSummary> {
        let seoul = self.run_seoul(store).await?;
        let gyunggi = self.run_gyunggi(store).await?;
        Ok(RunSummary { seoul, gyunggi })
    }
}
