//! GeoTIFF reading and writing using GDAL, with true windowed I/O

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::io::{RasterSource, RgbaRaster, RgbaSink};
use crate::raster::{GeoTransform, Raster, RasterElement, RgbaLayer, Window, RGBA_BANDS};
use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use std::path::Path;
use std::sync::Mutex;

fn dataset_crs(dataset: &Dataset) -> Option<CRS> {
    let srs = dataset.spatial_ref().ok()?;
    let wkt = srs.to_wkt().ok()?;
    let crs = CRS::from_wkt(wkt);
    Some(match srs.auth_code() {
        Ok(code) => crs.with_epsg(code as u32),
        Err(_) => crs,
    })
}

fn apply_georef(dataset: &mut Dataset, transform: &GeoTransform, crs: Option<&CRS>) -> Result<()> {
    dataset.set_geo_transform(&transform.to_gdal())?;
    if let Some(crs) = crs {
        let srs = match (crs.epsg(), crs.wkt()) {
            (Some(code), _) => SpatialRef::from_epsg(code)?,
            (None, Some(wkt)) => SpatialRef::from_wkt(wkt)?,
            (None, None) => return Ok(()),
        };
        dataset.set_spatial_ref(&srs)?;
    }
    Ok(())
}

/// Read a whole band of a raster file into memory
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let dataset = Dataset::open(path.as_ref())?;
    let rasterband = dataset.rasterband(band.unwrap_or(1))?;
    let (cols, rows) = dataset.raster_size();

    let buffer = rasterband.read_as::<T>((0, 0), (cols, rows), (cols, rows), None)?;
    let (_, data) = buffer.into_shape_and_vec();
    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Ok(gt) = dataset.geo_transform() {
        raster.set_transform(GeoTransform::from_gdal(gt));
    }
    raster.set_crs(dataset_crs(&dataset));
    if let Some(nd) = rasterband.no_data_value().and_then(num_traits::cast) {
        raster.set_nodata(Some(nd));
    }

    Ok(raster)
}

/// Write an in-memory RGBA raster as a 4-band u8 GeoTIFF
pub fn write_rgba_geotiff<P: AsRef<Path>>(raster: &RgbaRaster, path: P) -> Result<()> {
    let mut sink = GdalRgbaSink::create(
        path,
        raster.rows(),
        raster.cols(),
        raster.transform(),
        raster.crs(),
    )?;
    sink.write_window(
        Window::new(0, 0, raster.cols(), raster.rows()),
        raster.layer(),
    )
}

/// Windowed elevation reader over a GDAL dataset.
///
/// GDAL handles are not shareable between threads, so reads are serialized
/// through a mutex while computation stays parallel.
pub struct GdalSource {
    dataset: Mutex<Dataset>,
    band: usize,
    shape: (usize, usize),
    transform: GeoTransform,
    crs: Option<CRS>,
}

impl GdalSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = Dataset::open(path.as_ref())?;
        let (cols, rows) = dataset.raster_size();
        let transform = dataset
            .geo_transform()
            .map(GeoTransform::from_gdal)
            .unwrap_or_default();
        let crs = dataset_crs(&dataset);
        Ok(Self {
            dataset: Mutex::new(dataset),
            band: 1,
            shape: (rows, cols),
            transform,
            crs,
        })
    }
}

impl RasterSource for GdalSource {
    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn crs(&self) -> Option<CRS> {
        self.crs.clone()
    }

    fn read_window(&self, window: Window) -> Result<Array2<f64>> {
        let (rows, cols) = self.shape;
        let w = window.clip(rows, cols);
        if w.is_empty() {
            return Ok(Array2::zeros((w.height, w.width)));
        }

        let dataset = self
            .dataset
            .lock()
            .map_err(|_| Error::Other("GDAL dataset lock poisoned".into()))?;
        let band = dataset.rasterband(self.band)?;
        let buffer = band.read_as::<f64>(
            (w.col_off as isize, w.row_off as isize),
            (w.width, w.height),
            (w.width, w.height),
            None,
        )?;
        let (_, data) = buffer.into_shape_and_vec();
        Array2::from_shape_vec((w.height, w.width), data).map_err(|e| Error::Other(e.to_string()))
    }
}

/// Four-band u8 GeoTIFF written window by window
pub struct GdalRgbaSink {
    dataset: Dataset,
}

impl GdalRgbaSink {
    pub fn create<P: AsRef<Path>>(
        path: P,
        rows: usize,
        cols: usize,
        transform: &GeoTransform,
        crs: Option<&CRS>,
    ) -> Result<Self> {
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset =
            driver.create_with_band_type::<u8, _>(path.as_ref(), cols, rows, RGBA_BANDS)?;
        apply_georef(&mut dataset, transform, crs)?;
        Ok(Self { dataset })
    }
}

impl RgbaSink for GdalRgbaSink {
    fn write_window(&mut self, window: Window, block: &RgbaLayer) -> Result<()> {
        if block.shape() != (window.height, window.width) {
            return Err(Error::SizeMismatch {
                er: window.height,
                ec: window.width,
                ar: block.rows(),
                ac: block.cols(),
            });
        }

        for b in 0..RGBA_BANDS {
            let data: Vec<u8> = block.band(b).iter().copied().collect();
            let mut buffer = Buffer::new((window.width, window.height), data);
            let mut band = self.dataset.rasterband(b + 1)?;
            band.write(
                (window.col_off as isize, window.row_off as isize),
                (window.width, window.height),
                &mut buffer,
            )?;
        }
        Ok(())
    }
}
