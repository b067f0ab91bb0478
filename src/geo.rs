use geo::Point;
use proj4rs::Proj;

/// EPSG:5174, Korean 1985 modified central belt on the Bessel ellipsoid
const EPSG_5174: &str = "+proj=tmerc +lat_0=38 +lon_0=127.0028902777778 +k=1 \
    +x_0=200000 +y_0=500000 +ellps=bessel +units=m +no_defs \
    +towgs84=-115.80,474.99,674.11,1.16,-2.31,-1.63,6.43";

/// EPSG:4326
const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";

#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    #[error("Invalid projection definition: {0}")]
    Definition(String),

    #[error("Failed to reproject ({x}, {y}): {reason}")]
    Reproject { x: f64, y: f64, reason: String },

    #[error("Reprojecting ({x}, {y}) did not give a finite position")]
    NonFinite { x: f64, y: f64 },
}

pub type TransformResult<T> = Result<T, TransformError>;

/// Converts planar Bessel survey coordinates into WGS84 longitude/latitude
pub struct BesselToWgs84 {
    from: Proj,
    to: Proj,
}

impl BesselToWgs84 {
    pub fn new() -> TransformResult<Self> {
        let from = Proj::from_proj_string(EPSG_5174)
            .map_err(|e| TransformError::Definition(format!("{:?}", e)))?;
        let to = Proj::from_proj_string(WGS84)
            .map_err(|e| TransformError::Definition(format!("{:?}", e)))?;

        Ok(BesselToWgs84 { from, to })
    }

    /// `planar` is (x, y) in metres, the result is (longitude, latitude) in degrees
    pub fn transform(&self, planar: Point) -> TransformResult<Point> {
        let (x, y) = planar.x_y();
        let mut point = (x, y, 0.0);

        proj4rs::transform::transform(&self.from, &self.to, &mut point).map_err(|e| {
            TransformError::Reproject {
                x,
                y,
                reason: format!("{:?}", e),
            }
        })?;

        // longlat output is in radians
        let (lon, lat) = (point.0.to_degrees(), point.1.to_degrees());
        if !lon.is_finite() || !lat.is_finite() {
            return Err(TransformError::NonFinite { x, y });
        }

        Ok(Point::new(lon, lat))
    }
}
