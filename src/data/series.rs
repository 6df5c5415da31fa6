use std::fs;
use std::path::{Path, PathBuf};

use dicom::dictionary_std::tags;
use dicom::object::{FileDicomObject, InMemDicomObject, OpenFileOptions, open_file};
use dicom_pixeldata::PixelDecoder;
use ndarray::s;

use super::DataError;
use super::model::SliceImage;

/// Ordinal (1-indexed, by ascending SliceLocation) of the slice shown as the
/// representative image of a series.
pub const REPRESENTATIVE_SLICE: usize = 6;

// ---------------------------------------------------------------------------
// Series scan
// ---------------------------------------------------------------------------

/// One scanned slice file: where it is and where it sits along the z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRef {
    pub path: PathBuf,
    pub location: f64,
}

/// Enumerate every regular file of a series directory and read each file's
/// SliceLocation from its header, without touching pixel data. Series
/// directories mix file suffixes, so no extension filter is applied; every
/// file must be a readable DICOM slice. The result is sorted by ascending
/// location, ties broken by path, duplicates kept.
pub fn scan_series(dir: &Path) -> Result<Vec<SliceRef>, DataError> {
    if !dir.is_dir() {
        return Err(DataError::SeriesDirMissing { dir: dir.to_owned() });
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(DataError::EmptySeries { dir: dir.to_owned() });
    }

    let mut slices = Vec::with_capacity(files.len());
    for path in files {
        let location = header_location(&path)?;
        log::debug!("scanned {}: SliceLocation {}", path.display(), location);
        slices.push(SliceRef { path, location });
    }

    slices.sort_by(|a, b| {
        a.location
            .total_cmp(&b.location)
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(slices)
}

/// Header-only read of one slice's SliceLocation.
fn header_location(path: &Path) -> Result<f64, DataError> {
    let obj = OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(path)
        .map_err(|source| DataError::SliceRead {
            path: path.to_owned(),
            source: source.into(),
        })?;
    element_f64(&obj, tags::SLICE_LOCATION).ok_or_else(|| DataError::MissingTag {
        path: path.to_owned(),
        tag: "SliceLocation",
    })
}

fn element_f64(obj: &FileDicomObject<InMemDicomObject>, tag: dicom::core::Tag) -> Option<f64> {
    obj.element(tag).ok()?.to_float64().ok()
}

// ---------------------------------------------------------------------------
// Representative pick
// ---------------------------------------------------------------------------

/// Pick the fixed ordinal out of a sorted scan. Series shorter than the
/// ordinal are an explicit error reporting found vs needed.
pub fn pick_representative<'a>(
    slices: &'a [SliceRef],
    dir: &Path,
) -> Result<&'a SliceRef, DataError> {
    if slices.len() < REPRESENTATIVE_SLICE {
        return Err(DataError::TooFewSlices {
            dir: dir.to_owned(),
            found: slices.len(),
            needed: REPRESENTATIVE_SLICE,
        });
    }
    Ok(&slices[REPRESENTATIVE_SLICE - 1])
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Fully decode one slice file and apply the rescale:
/// `hu = stored × RescaleSlope + RescaleIntercept`.
pub fn decode_slice(path: &Path) -> Result<SliceImage, DataError> {
    let obj = open_file(path).map_err(|source| DataError::SliceRead {
        path: path.to_owned(),
        source: source.into(),
    })?;

    let slice_location = require_f64(&obj, tags::SLICE_LOCATION, "SliceLocation", path)?;
    let slope = require_f64(&obj, tags::RESCALE_SLOPE, "RescaleSlope", path)?;
    let intercept = require_f64(&obj, tags::RESCALE_INTERCEPT, "RescaleIntercept", path)?;

    let decoded = obj
        .decode_pixel_data()
        .map_err(|source| DataError::PixelDecode {
            path: path.to_owned(),
            source: source.into(),
        })?;
    let stored = decoded
        .to_ndarray::<u16>()
        .map_err(|source| DataError::PixelDecode {
            path: path.to_owned(),
            source: source.into(),
        })?
        .slice_move(s![0, .., .., 0]);

    Ok(SliceImage {
        hu: stored.mapv(|v| f64::from(v) * slope + intercept),
        slice_location,
        source: path.to_owned(),
    })
}

fn require_f64(
    obj: &FileDicomObject<InMemDicomObject>,
    tag: dicom::core::Tag,
    name: &'static str,
    path: &Path,
) -> Result<f64, DataError> {
    element_f64(obj, tag).ok_or_else(|| DataError::MissingTag {
        path: path.to_owned(),
        tag: name,
    })
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Scan a series directory and decode its representative slice.
pub fn load_representative_slice(dir: &Path) -> Result<SliceImage, DataError> {
    let slices = scan_series(dir)?;
    let picked = pick_representative(&slices, dir)?;
    log::debug!(
        "representative slice of {}: {} (SliceLocation {})",
        dir.display(),
        picked.path.display(),
        picked.location
    );
    decode_slice(&picked.path)
}

// =============================================================================
// Unit tests
// =============================================================================
