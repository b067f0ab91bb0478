//! Seoul metropolitan bus stations (`tbisMasterStation`).
//!
//! Pages are addressed by a 1-based row range in the path:
//! `{base}/{key}/{doc type}/tbisMasterStation/{start}/{end}`.

use serde::Deserialize;
use url::Url;

use crate::openapi::error::{OpenApiError, OpenApiResult};
use crate::openapi::pagination::{PageWindow, PagedSource};
use crate::openapi::serde_helpers::{deserialize_lenient_f64, deserialize_lenient_string};
use crate::openapi::{decode_body, DocType, Page, ResultCode, Source};
use crate::station::StandardBusStation;

const SERVICE: &str = "tbisMasterStation";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeoulStation {
    #[serde(rename = "STTN_ID", deserialize_with = "deserialize_lenient_string")]
    pub station_id: String,
    #[serde(rename = "STTN_NM", deserialize_with = "deserialize_lenient_string")]
    pub station_name: String,
    /// Lane kind, e.g. 일반차로 or 중앙차로
    #[serde(rename = "STTN_TYPE", deserialize_with = "deserialize_lenient_string")]
    pub station_type: String,
    #[serde(rename = "STTN_NO", deserialize_with = "deserialize_lenient_string")]
    pub ars_id: String,
    /// WGS84 longitude
    #[serde(rename = "CRDNT_X", deserialize_with = "deserialize_lenient_f64")]
    pub longitude: f64,
    /// WGS84 latitude
    #[serde(rename = "CRDNT_Y", deserialize_with = "deserialize_lenient_f64")]
    pub latitude: f64,
    /// Whether an arrival information display is installed
    #[serde(
        rename = "BUSINFO_FCLT_INSTL_YN",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub arrival_display_yn: String,
}

impl SeoulStation {
    pub fn to_standard(&self) -> StandardBusStation {
        StandardBusStation {
            station_id: self.station_id.clone(),
            station_name: self.station_name.clone(),
            ars_id: self.ars_id.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Deserialize)]
struct SeoulResponse {
    #[serde(rename = "TbisMasterStation")]
    listing: SeoulListing,
}

#[derive(Deserialize)]
struct SeoulListing {
    list_total_count: u64,
    #[serde(rename = "RESULT", alias = "result")]
    result: ResultCode,
    #[serde(default)]
    row: Vec<SeoulStation>,
}

pub struct SeoulApi {
    base_url: Url,
    api_key: String,
    doc_type: DocType,
}

impl SeoulApi {
    pub fn new(base_url: Url, api_key: impl Into<String>, doc_type: DocType) -> Self {
        SeoulApi {
            base_url,
            api_key: api_key.into(),
            doc_type,
        }
    }
}

impl PagedSource for SeoulApi {
    type Record = SeoulStation;

    fn origin(&self) -> Source {
        Source::Seoul
    }

    fn page_url(&self, window: &PageWindow) -> OpenApiResult<Url> {
        let start = window.start_row().to_string();
        let end = window.end_row().to_string();

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OpenApiError::InvalidUrl {
                origin: self.origin(),
                base: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend([
                self.api_key.as_str(),
                self.doc_type.as_str(),
                SERVICE,
                start.as_str(),
                end.as_str(),
            ]);
        Ok(url)
    }

    fn parse_page(&self, url: &Url, body: &str) -> OpenApiResult<Page<SeoulStation>> {
        let SeoulResponse { listing } = decode_body(self.origin(), url, body)?;
        Ok(Page {
            total_count: listing.list_total_count,
            result: listing.result,
            rows: listing.row,
        })
    }
}

/// No correction is needed, every Seoul station maps straight across
pub fn convert_to_standard(stations: &[SeoulStation]) -> Vec<StandardBusStation> {
    let standard: Vec<_> = stations.iter().map(SeoulStation::to_standard).collect();
    log::info!("[seoul] stations after filtering: {}", standard.len());
    standard
}
