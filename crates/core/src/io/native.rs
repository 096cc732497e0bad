//! Native GeoTIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate. Georeferencing is limited to the
//! ModelPixelScale/ModelTiepoint tag pair; the CRS is carried as an EPSG code
//! in the GeoKeyDirectory.
//! Enable the `gdal` feature for full GeoTIFF support and windowed I/O.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::io::RgbaRaster;
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::RGBA8;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

// GeoKey ids and values (GeoTIFF 1.0, section 6)
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;
const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const USER_DEFINED: u16 = 32767;

/// Read band 1 of a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P, _band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(&buf),
        DecodingResult::F64(buf) => cast_all(&buf),
        DecodingResult::U8(buf) => cast_all(&buf),
        DecodingResult::U16(buf) => cast_all(&buf),
        DecodingResult::U32(buf) => cast_all(&buf),
        DecodingResult::I8(buf) => cast_all(&buf),
        DecodingResult::I16(buf) => cast_all(&buf),
        DecodingResult::I32(buf) => cast_all(&buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    // Multi-sample images decode interleaved; only single-band DEMs are valid input
    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_crs(&mut decoder));

    Ok(raster)
}

fn cast_all<S, T>(buf: &[S]) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

/// GeoTransform from ModelPixelScaleTag + ModelTiepointTag, if both are present
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// EPSG code from the GeoKeyDirectory, if the file carries one inline
fn read_crs<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
    let header = keys.get(..4)?;
    let count = header[3] as usize;

    let (mut model_type, mut geographic, mut projected) = (None, None, None);
    // entries: [key id, tag location, count, value]; location 0 means inline
    for entry in keys[4..].chunks_exact(4).take(count) {
        if entry[1] != 0 {
            continue;
        }
        match entry[0] {
            GT_MODEL_TYPE => model_type = Some(entry[3]),
            GEOGRAPHIC_TYPE => geographic = Some(entry[3]),
            PROJECTED_CS_TYPE => projected = Some(entry[3]),
            _ => {}
        }
    }

    // a projected CRS also names its geographic base; 32767 is user-defined
    let code = projected
        .or(geographic)
        .filter(|&c| c != 0 && c != USER_DEFINED)?;
    let crs = CRS::from_epsg(code as u32);
    Some(match model_type {
        Some(MODEL_TYPE_GEOGRAPHIC) => crs.with_geographic(true),
        Some(MODEL_TYPE_PROJECTED) => crs.with_geographic(false),
        _ => crs,
    })
}

/// GeoKeyDirectory for an output raster: model type, pixel-is-area, and the EPSG code when known
fn geokeys(crs: Option<&CRS>) -> Vec<u16> {
    let geographic = crs.is_some_and(|c| c.is_geographic());
    let model_type = if geographic {
        MODEL_TYPE_GEOGRAPHIC
    } else {
        MODEL_TYPE_PROJECTED
    };
    let mut entries = vec![
        [GT_MODEL_TYPE, 0, 1, model_type],
        [GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA],
    ];
    if let Some(code) = crs.and_then(|c| c.epsg()).and_then(|c| u16::try_from(c).ok()) {
        let key = if geographic {
            GEOGRAPHIC_TYPE
        } else {
            PROJECTED_CS_TYPE
        };
        entries.push([key, 0, 1, code]);
    }

    let mut keys = vec![1, 1, 0, entries.len() as u16];
    keys.extend(entries.into_iter().flatten());
    keys
}

/// Write an RGBA raster as an 8-bit, 4-sample GeoTIFF
pub fn write_rgba_geotiff<P: AsRef<Path>>(raster: &RgbaRaster, path: P) -> Result<()> {
    let file = BufWriter::new(File::create(path.as_ref())?);
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let mut image = encoder
        .new_image::<RGBA8>(raster.cols() as u32, raster.rows() as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();
    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    let geokeys = geokeys(raster.crs());
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    image
        .write_data(&raster.layer().to_interleaved())
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RgbaLayer;
    use tempfile::NamedTempFile;
    use tiff::encoder::colortype::Gray32Float;

    fn write_dem(path: &Path, rows: u32, cols: u32, gt: GeoTransform, keys: Option<&[u16]>) {
        let data: Vec<f32> = (0..rows * cols).map(|i| i as f32 * 0.5).collect();
        let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
        let mut image = encoder.new_image::<Gray32Float>(cols, rows).unwrap();
        let scale = [gt.pixel_width, -gt.pixel_height, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
            .unwrap();
        if let Some(keys) = keys {
            image
                .encoder()
                .write_tag(Tag::GeoKeyDirectoryTag, keys)
                .unwrap();
        }
        image.write_data(&data).unwrap();
    }

    fn rgba_with_crs(crs: Option<CRS>) -> RgbaRaster {
        let layer = RgbaLayer::from_fn(3, 4, |_, _| [10, 20, 30, 255]);
        RgbaRaster::from_layer(layer).with_georef(GeoTransform::new(0.0, 0.0, 1.0, -1.0), crs)
    }

    fn crs_after_write(raster: &RgbaRaster) -> Option<CRS> {
        let tmp = NamedTempFile::with_suffix(".tif").unwrap();
        write_rgba_geotiff(raster, tmp.path()).unwrap();
        let mut decoder = Decoder::new(File::open(tmp.path()).unwrap()).unwrap();
        read_crs(&mut decoder)
    }

    #[test]
    fn read_float_dem_with_georef() {
        let tmp = NamedTempFile::with_suffix(".tif").unwrap();
        let gt = GeoTransform::new(500.0, 900.0, 2.0, -2.0);
        write_dem(tmp.path(), 6, 8, gt, None);

        let dem: Raster<f64> = read_geotiff(tmp.path(), None).unwrap();
        assert_eq!(dem.shape(), (6, 8));
        assert_eq!(dem.get(1, 2).unwrap(), 5.0);
        assert_eq!(*dem.transform(), gt);
        assert!(dem.crs().is_none());
    }

    #[test]
    fn read_dem_crs_from_geokeys() {
        let tmp = NamedTempFile::with_suffix(".tif").unwrap();
        let gt = GeoTransform::new(139.0, 36.0, 0.001, -0.001);
        let keys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];
        write_dem(tmp.path(), 4, 4, gt, Some(&keys[..]));

        let dem: Raster<f32> = read_geotiff(tmp.path(), None).unwrap();
        let crs = dem.crs().unwrap();
        assert_eq!(crs.epsg(), Some(4326));
        assert!(crs.is_geographic());
    }

    #[test]
    fn projected_code_wins_over_geographic_base() {
        let tmp = NamedTempFile::with_suffix(".tif").unwrap();
        let gt = GeoTransform::new(0.0, 0.0, 5.0, -5.0);
        let keys: [u16; 16] = [1, 1, 0, 3, 1024, 0, 1, 1, 2048, 0, 1, 6668, 3072, 0, 1, 6677];
        write_dem(tmp.path(), 4, 4, gt, Some(&keys[..]));

        let dem: Raster<f32> = read_geotiff(tmp.path(), None).unwrap();
        assert_eq!(dem.crs().unwrap().epsg(), Some(6677));
        assert!(!dem.crs().unwrap().is_geographic());
    }

    #[test]
    fn user_defined_crs_is_dropped() {
        let tmp = NamedTempFile::with_suffix(".tif").unwrap();
        let gt = GeoTransform::new(0.0, 0.0, 1.0, -1.0);
        let keys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32767];
        write_dem(tmp.path(), 4, 4, gt, Some(&keys[..]));

        let dem: Raster<f32> = read_geotiff(tmp.path(), None).unwrap();
        assert!(dem.crs().is_none());
    }

    #[test]
    fn rgba_keeps_projected_epsg() {
        let crs = crs_after_write(&rgba_with_crs(Some(CRS::from_epsg(6677)))).unwrap();
        assert_eq!(crs.epsg(), Some(6677));
        assert!(!crs.is_geographic());
    }

    #[test]
    fn rgba_keeps_geographic_epsg() {
        let source = CRS::from_epsg(6668).with_geographic(true);
        let crs = crs_after_write(&rgba_with_crs(Some(source))).unwrap();
        assert_eq!(crs.epsg(), Some(6668));
        assert!(crs.is_geographic());
    }

    #[test]
    fn rgba_without_crs_writes_model_keys_only() {
        assert_eq!(geokeys(None), vec![1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1]);
        assert!(crs_after_write(&rgba_with_crs(None)).is_none());
    }

    #[test]
    fn rgba_roundtrip_keeps_bytes() {
        let layer = RgbaLayer::from_fn(5, 7, |r, c| [r as u8 * 40, c as u8 * 30, 200, 255]);
        let raster = RgbaRaster::from_layer(layer.clone())
            .with_georef(GeoTransform::new(10.0, 20.0, 1.0, -1.0), None);

        let tmp = NamedTempFile::with_suffix(".tif").unwrap();
        write_rgba_geotiff(&raster, tmp.path()).unwrap();

        let mut decoder = Decoder::new(File::open(tmp.path()).unwrap()).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (7, 5));
        match decoder.read_image().unwrap() {
            DecodingResult::U8(bytes) => assert_eq!(bytes, layer.to_interleaved()),
            _ => panic!("expected 8-bit samples"),
        }
        assert_eq!(
            read_geotransform(&mut decoder),
            Some(GeoTransform::new(10.0, 20.0, 1.0, -1.0))
        );
    }
}
