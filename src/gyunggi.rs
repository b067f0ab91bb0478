//! Gyunggi provincial bus stations (`TBBMSSTATIONM`).
//!
//! Pages are addressed by index and size in the query string. The body is a
//! positional array rather than a keyed object:
//!
//! ```json
//! {"TBBMSSTATIONM": [
//!     {"head": [{"list_total_count": 1}, {"RESULT": {"CODE": "", "MESSAGE": ""}}, {"api_version": "1.0"}]},
//!     {"row": [{"STTN_ID": "..."}]}
//! ]}
//! ```

use std::sync::OnceLock;

use geo::Point;
use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::geo::{BesselToWgs84, TransformResult};
use crate::openapi::error::{OpenApiError, OpenApiResult};
use crate::openapi::pagination::{PageWindow, PagedSource};
use crate::openapi::serde_helpers::{deserialize_lenient_f64, deserialize_lenient_string};
use crate::openapi::{decode_body, DocType, Page, ResultCode, Source};
use crate::station::StandardBusStation;

const SERVICE: &str = "TBBMSSTATIONM";

/// ARS ids containing this are Seoul stations, already collected from the Seoul service
const SEOUL_MARKER: &str = "서울";

/// Raw station as listed by the Gyunggi service.
///
/// `coordinate_x`/`coordinate_y` are EPSG:5174 metres as fetched and are replaced by
/// WGS84 longitude/latitude in [`correct_stations`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GyunggiStation {
    #[serde(rename = "STTN_ID", deserialize_with = "deserialize_lenient_string")]
    pub station_id: String,
    #[serde(rename = "STTN_NM", deserialize_with = "deserialize_lenient_string")]
    pub station_name: String,
    #[serde(rename = "Y_CRDNT", deserialize_with = "deserialize_lenient_f64")]
    pub coordinate_y: f64,
    #[serde(rename = "X_CRDNT", deserialize_with = "deserialize_lenient_f64")]
    pub coordinate_x: f64,
    // upstream labels the GPS axes the other way round
    #[serde(rename = "GPS_X_CRDNT", deserialize_with = "deserialize_lenient_f64")]
    pub gps_coordinate_y: f64,
    #[serde(rename = "GPS_Y_CRDNT", deserialize_with = "deserialize_lenient_f64")]
    pub gps_coordinate_x: f64,
    #[serde(rename = "RINK_ID", deserialize_with = "deserialize_lenient_string")]
    pub link_id: String,
    #[serde(rename = "STTN_TYPE", deserialize_with = "deserialize_lenient_string")]
    pub station_type: String,
    /// C or N
    #[serde(rename = "TRANSIT_STTN_EXTNO", deserialize_with = "deserialize_lenient_string")]
    pub transfer_station_ext_no: String,
    #[serde(rename = "CNTR_CARTRK_YN", deserialize_with = "deserialize_lenient_string")]
    pub median_bus_lane_yn: String,
    #[serde(rename = "STTN_ENG_NM", deserialize_with = "deserialize_lenient_string")]
    pub station_english_name: String,
    #[serde(rename = "ARS_ID", deserialize_with = "deserialize_lenient_string")]
    pub ars_id: String,
    #[serde(rename = "INST_CD", deserialize_with = "deserialize_lenient_string")]
    pub institution_code: String,
    #[serde(rename = "DATA_EXPRS_EXTNO", deserialize_with = "deserialize_lenient_string")]
    pub data_display_yn: String,
    #[serde(rename = "REGIST_ID", deserialize_with = "deserialize_lenient_string")]
    pub registered_by: String,
    /// YYYYMMDDHHmmss
    #[serde(rename = "REGIST_DE", deserialize_with = "deserialize_lenient_string")]
    pub registered_at: String,
    #[serde(rename = "RM", deserialize_with = "deserialize_lenient_string")]
    pub memo: String,
    #[serde(rename = "SIGNPOST_TYPE", deserialize_with = "deserialize_lenient_string")]
    pub sign_post_type: String,
    #[serde(rename = "ADMINIST_DONG_CD", deserialize_with = "deserialize_lenient_string")]
    pub dong_code: String,
    #[serde(rename = "VOLM_STATN_CD", deserialize_with = "deserialize_lenient_string")]
    pub region_code: String,
    #[serde(rename = "USE_DIV", deserialize_with = "deserialize_lenient_string")]
    pub use_yn: String,
    #[serde(rename = "STTN_CHN_NM", deserialize_with = "deserialize_lenient_string")]
    pub station_chinese_name: String,
    #[serde(rename = "STTN_JPNLANG_NM", deserialize_with = "deserialize_lenient_string")]
    pub station_japanese_name: String,
    #[serde(rename = "STTN_VIETNAM_NM", deserialize_with = "deserialize_lenient_string")]
    pub station_vietnam_name: String,
    #[serde(rename = "DRT_EXTNO", deserialize_with = "deserialize_lenient_string")]
    pub drt_yn: String,
    /// e.g. 미지정, 시내
    #[serde(rename = "STATION_TP_NM", deserialize_with = "deserialize_lenient_string")]
    pub station_type_name: String,
    /// e.g. 일반, 환승
    #[serde(rename = "CHNG_STATION_YN_NM", deserialize_with = "deserialize_lenient_string")]
    pub transfer_station_type_name: String,
    #[serde(rename = "MARK_TYPE_NM", deserialize_with = "deserialize_lenient_string")]
    pub sign_post_type_name: String,
}

impl GyunggiStation {
    /// Why this station should not be kept, if anything
    fn rejection(&self) -> Option<&'static str> {
        if self.ars_id.contains(SEOUL_MARKER) {
            Some("listed by Seoul")
        } else if self.station_name.is_empty() {
            Some("no station name")
        } else if self.ars_id.is_empty() {
            Some("no ARS id")
        } else {
            None
        }
    }

    /// Expects a station that has been through [`correct_stations`]
    pub fn to_standard(&self) -> StandardBusStation {
        StandardBusStation {
            station_id: self.station_id.clone(),
            station_name: self.station_name.clone(),
            ars_id: normalize_ars_id(&self.ars_id),
            latitude: self.coordinate_y,
            longitude: self.coordinate_x,
        }
    }
}

/// First run of digits in the raw ARS id, or the raw id if it has none
pub fn normalize_ars_id(raw: &str) -> String {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new("[0-9]+").expect("digit pattern is valid"));

    match digits.find(raw) {
        Some(m) => m.as_str().to_string(),
        None => raw.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GyunggiHead {
    pub total_count: u64,
    pub result: ResultCode,
    pub api_version: String,
}

#[derive(Deserialize)]
struct GyunggiResponse {
    #[serde(rename = "TBBMSSTATIONM")]
    sections: Vec<Value>,
}

#[derive(Deserialize)]
struct HeadSection {
    head: Vec<HeadSlot>,
}

/// Each positional head entry fills one of these
#[derive(Deserialize)]
struct HeadSlot {
    list_total_count: Option<u64>,
    #[serde(rename = "RESULT")]
    result: Option<ResultCode>,
    api_version: Option<String>,
}

#[derive(Deserialize)]
struct RowSection {
    #[serde(default)]
    row: Vec<GyunggiStation>,
}

fn parse_response(url: &Url, body: &str) -> OpenApiResult<(GyunggiHead, Vec<GyunggiStation>)> {
    let origin = Source::Gyunggi;
    let malformed = |reason: String| OpenApiError::parse(origin, url, reason);

    let GyunggiResponse { sections } = decode_body(origin, url, body)?;

    let [head_section, row_section]: [Value; 2] = sections
        .try_into()
        .map_err(|s: Vec<Value>| malformed(format!("expected 2 sections, got {}", s.len())))?;

    let HeadSection { head } = serde_json::from_value(head_section)
        .map_err(|e| malformed(format!("invalid head section: {}", e)))?;
    let [count_slot, result_slot, version_slot]: [HeadSlot; 3] = head
        .try_into()
        .map_err(|h: Vec<HeadSlot>| malformed(format!("expected 3 head entries, got {}", h.len())))?;

    let head = GyunggiHead {
        total_count: count_slot
            .list_total_count
            .ok_or_else(|| malformed("head[0] has no list_total_count".to_string()))?,
        result: result_slot
            .result
            .ok_or_else(|| malformed("head[1] has no RESULT".to_string()))?,
        api_version: version_slot.api_version.unwrap_or_default(),
    };

    let RowSection { row } = serde_json::from_value(row_section)
        .map_err(|e| malformed(format!("invalid row section: {}", e)))?;

    Ok((head, row))
}

pub struct GyunggiApi {
    base_url: Url,
    api_key: String,
    doc_type: DocType,
}

impl GyunggiApi {
    pub fn new(base_url: Url, api_key: impl Into<String>, doc_type: DocType) -> Self {
        GyunggiApi {
            base_url,
            api_key: api_key.into(),
            doc_type,
        }
    }
}

impl PagedSource for GyunggiApi {
    type Record = GyunggiStation;

    fn origin(&self) -> Source {
        Source::Gyunggi
    }

    fn page_url(&self, window: &PageWindow) -> OpenApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OpenApiError::InvalidUrl {
                origin: self.origin(),
                base: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .push(SERVICE);
        url.query_pairs_mut()
            .append_pair("KEY", &self.api_key)
            .append_pair("Type", self.doc_type.as_str())
            .append_pair("pIndex", &window.index.to_string())
            .append_pair("pSize", &window.size.to_string());
        Ok(url)
    }

    fn parse_page(&self, url: &Url, body: &str) -> OpenApiResult<Page<GyunggiStation>> {
        let (head, rows) = parse_response(url, body)?;
        log::trace!("[gyunggi] api version {}", head.api_version);

        Ok(Page {
            total_count: head.total_count,
            result: head.result,
            rows,
        })
    }
}

/// Drops stations Seoul already covers or that lack a name or ARS id, and
/// reprojects the survivors' coordinates to WGS84 in place.
///
/// A failed reprojection fails the whole batch.
pub fn correct_stations(
    stations: Vec<GyunggiStation>,
    transform: &BesselToWgs84,
) -> TransformResult<Vec<GyunggiStation>> {
    let fetched = stations.len();
    let mut corrected = Vec::with_capacity(fetched);
    let mut rejections = vec![];

    for mut station in stations {
        if let Some(reason) = station.rejection() {
            log::debug!(
                "[gyunggi] dropping station {} ({:?}): {}",
                station.station_id,
                station.ars_id,
                reason
            );
            rejections.push(reason);
            continue;
        }

        let position = transform.transform(Point::new(station.coordinate_x, station.coordinate_y))?;
        station.coordinate_x = position.x();
        station.coordinate_y = position.y();

        corrected.push(station);
    }

    if !rejections.is_empty() {
        log::warn!(
            "[gyunggi] dropped {} of {} stations: {:?}",
            rejections.len(),
            fetched,
            rejections.into_iter().counts()
        );
    }

    Ok(corrected)
}

pub fn convert_to_standard(corrected: &[GyunggiStation]) -> Vec<StandardBusStation> {
    let standard: Vec<_> = corrected.iter().map(GyunggiStation::to_standard).collect();
    log::info!("[gyunggi] stations after filtering: {}", standard.len());
    standard
}
