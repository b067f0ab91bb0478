use std::sync::Mutex;

use serde_json::{json, Value};
use url::Url;

use crate::openapi::client::{Transport, TransportError};

pub fn init() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Answers every request from a closure and remembers what was asked
pub struct StubTransport<F> {
    respond: F,
    requests: Mutex<Vec<Url>>,
}

impl<F> StubTransport<F>
where
    F: Fn(&Url) -> Result<String, TransportError>,
{
    pub fn new(respond: F) -> Self {
        init();
        StubTransport {
            respond,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl<F> Transport for StubTransport<F>
where
    F: Fn(&Url) -> Result<String, TransportError>,
{
    async fn get(&self, url: &Url) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        (self.respond)(url)
    }
}

pub fn query_param(url: &Url, key: &str) -> String {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

pub fn failure_body(code: &str, message: &str) -> String {
    json!({ "RESULT": { "CODE": code, "MESSAGE": message } }).to_string()
}

pub fn seoul_row(id: &str, name: &str, ars_id: &str, lon: f64, lat: f64) -> Value {
    json!({
        "STTN_ID": id,
        "STTN_NM": name,
        "STTN_TYPE": "중앙차로",
        "STTN_NO": ars_id,
        "CRDNT_X": lon.to_string(),
        "CRDNT_Y": lat,
        "BUSINFO_FCLT_INSTL_YN": "Y",
    })
}

pub fn seoul_body(total: u64, code: &str, rows: Vec<Value>) -> String {
    json!({
        "TbisMasterStation": {
            "list_total_count": total,
            "RESULT": { "CODE": code, "MESSAGE": "정상 처리되었습니다" },
            "row": rows,
        }
    })
    .to_string()
}

/// Planar coordinates are EPSG:5174 metres
pub fn gyunggi_row(id: &str, name: &str, ars_id: &str, x: f64, y: f64) -> Value {
    json!({
        "STTN_ID": id,
        "STTN_NM": name,
        "X_CRDNT": x,
        "Y_CRDNT": y,
        "GPS_X_CRDNT": null,
        "GPS_Y_CRDNT": null,
        "RINK_ID": "2180155200",
        "STTN_TYPE": "1",
        "TRANSIT_STTN_EXTNO": "N",
        "CNTR_CARTRK_YN": "N",
        "STTN_ENG_NM": "Station",
        "ARS_ID": ars_id,
        "INST_CD": 4111000,
        "DATA_EXPRS_EXTNO": "Y",
        "REGIST_ID": "admin",
        "REGIST_DE": "20230101120000",
        "RM": null,
        "SIGNPOST_TYPE": "0",
        "ADMINIST_DONG_CD": "4111156000",
        "VOLM_STATN_CD": "1",
        "USE_DIV": "Y",
        "STTN_CHN_NM": "站",
        "STTN_JPNLANG_NM": "停留所",
        "STTN_VIETNAM_NM": "Trạm",
        "DRT_EXTNO": "N",
        "STATION_TP_NM": "시내",
        "CHNG_STATION_YN_NM": "일반",
        "MARK_TYPE_NM": "표지판 없음",
    })
}

pub fn gyunggi_body(total: u64, code: &str, rows: Vec<Value>) -> String {
    json!({
        "TBBMSSTATIONM": [
            {
                "head": [
                    { "list_total_count": total },
                    { "RESULT": { "CODE": code, "MESSAGE": "정상 처리되었습니다." } },
                    { "api_version": "1.0" },
                ]
            },
            { "row": rows },
        ]
    })
    .to_string()
}
