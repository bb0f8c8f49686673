//! Reprojection of document coordinates to WGS84 longitude/latitude.
//!
//! Source systems are looked up by EPSG code in the proj4 definitions bundled
//! with `proj4rs`. Coordinates are read in x/y order (easting or longitude
//! first) whatever axis order the EPSG registry declares.

use proj4rs::errors::{Error as ProjError, Result as ProjResult};
use proj4rs::transform::{transform, Transform, TransformClosure};
use proj4rs::Proj;

use super::geometry::Geometry;

pub const WGS84_SRID: u32 = 4326;

const WEB_MERCATOR_SRID: u32 = 3857;
/// Unofficial Web Mercator code still written by older exporters.
const GOOGLE_MERCATOR_SRID: u32 = 900913;

/// Conversion from a source CRS to EPSG:4326 (x = longitude, y = latitude).
#[derive(Debug, Clone)]
pub enum Projection {
    Identity,
    Proj { source: Box<Proj>, target: Box<Proj> },
}

impl Projection {
    /// Projection for an EPSG code, or `None` if no definition is known.
    pub fn for_srid(srid: u32) -> Option<Self> {
        let srid = if srid == GOOGLE_MERCATOR_SRID {
            WEB_MERCATOR_SRID
        } else {
            srid
        };
        if srid == WGS84_SRID {
            return Some(Self::Identity);
        }

        let source = u16::try_from(srid).ok().and_then(|code| Proj::from_epsg_code(code).ok())?;
        let target = Proj::from_epsg_code(WGS84_SRID as u16).ok()?;
        Some(Self::Proj {
            source: Box::new(source),
            target: Box::new(target),
        })
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Reproject every coordinate of `geometry` in place.
    pub fn to_wgs84(&self, geometry: &mut Geometry) -> Result<(), ProjError> {
        let Self::Proj { source, target } = self else {
            return Ok(());
        };

        // proj4rs works in radians on geographic systems.
        if source.is_latlong() {
            for coord in geometry.coords_mut() {
                coord.x = coord.x.to_radians();
                coord.y = coord.y.to_radians();
            }
        }
        transform(source, target, geometry)?;
        for coord in geometry.coords_mut() {
            coord.x = coord.x.to_degrees();
            coord.y = coord.y.to_degrees();
        }
        Ok(())
    }
}

impl Transform for Geometry {
    fn transform_coordinates<F: TransformClosure>(&mut self, f: &mut F) -> ProjResult<()> {
        for coord in self.coords_mut() {
            let (x, y, _) = f(coord.x, coord.y, 0.0)?;
            coord.x = x;
            coord.y = y;
        }
        Ok(())
    }
}
