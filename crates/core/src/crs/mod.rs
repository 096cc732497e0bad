//! Coordinate reference system carried from the input DEM to the CS-map output.
//!
//! csmap never reprojects; the CRS is only passed through so the output raster
//! lands in the same spatial reference as its source.

use std::fmt;

/// Coordinate Reference System as read from the input raster
#[derive(Debug, Clone, PartialEq)]
pub struct CRS {
    wkt: Option<String>,
    epsg: Option<u32>,
    geographic: Option<bool>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            geographic: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
            geographic: None,
        }
    }

    /// Attach an EPSG code to a WKT definition
    pub fn with_epsg(mut self, code: u32) -> Self {
        self.epsg = Some(code);
        self
    }

    /// Mark the CRS as geographic (lat/lon) or projected
    pub fn with_geographic(mut self, geographic: bool) -> Self {
        self.geographic = Some(geographic);
        self
    }

    /// Whether coordinates are angular rather than projected.
    ///
    /// An explicit flag wins, then the WKT root element, then the EPSG
    /// 4000..=4999 geographic range.
    pub fn is_geographic(&self) -> bool {
        if let Some(flag) = self.geographic {
            return flag;
        }
        if let Some(wkt) = &self.wkt {
            let root = wkt.trim_start();
            return root.starts_with("GEOGCS") || root.starts_with("GEOGCRS");
        }
        matches!(self.epsg, Some(4000..=4999))
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Short identifier for logs and `info` output
    pub fn identifier(&self) -> String {
        match (&self.epsg, &self.wkt) {
            (Some(code), _) => format!("EPSG:{}", code),
            (None, Some(wkt)) => format!("WKT:{}", &wkt[..wkt.len().min(50)]),
            (None, None) => "Unknown".to_string(),
        }
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
