/// Station shape shared by every source.
///
/// Latitude and longitude are always WGS84 degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardBusStation {
    pub station_id: String,
    pub station_name: String,
    /// Short code riders use to query arrivals
    pub ars_id: String,
    pub latitude: f64,
    pub longitude: f64,
}
