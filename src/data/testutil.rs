//! Test fixtures: minimal CT slice files written with the in-memory object
//! API, enough for header scans and pixel decoding.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::dictionary_std::tags;
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};

const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

static UID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn fresh_uid() -> String {
    format!("2.25.4242{}", UID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

fn base_object(location: f64) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(CT_IMAGE_STORAGE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(fresh_uid()),
    ));
    obj.put(DataElement::new(
        tags::MODALITY,
        VR::CS,
        PrimitiveValue::from("CT"),
    ));
    obj.put(DataElement::new(
        tags::SLICE_LOCATION,
        VR::DS,
        PrimitiveValue::from(location.to_string()),
    ));
    obj
}

fn write_object(obj: InMemDicomObject, path: &Path) {
    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(fresh_uid()),
        )
        .unwrap();
    file.write_to_file(path).unwrap();
}

/// Write a slice with header data only (no pixel data). Enough for scans.
pub fn write_header_slice(path: &Path, location: f64) {
    write_object(base_object(location), path);
}

/// Write a slice whose header lacks SliceLocation.
pub fn write_slice_without_location(path: &Path) {
    let mut obj = base_object(0.0);
    obj.remove_element(tags::SLICE_LOCATION);
    write_object(obj, path);
}

/// Write a decodable CT slice: 16-bit MONOCHROME2, `size`×`size`, every
/// pixel set to `pixel`, with the given rescale pair.
pub fn write_ct_slice(
    path: &Path,
    location: f64,
    size: u16,
    pixel: u16,
    slope: f64,
    intercept: f64,
) {
    let mut obj = base_object(location);
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    obj.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        PrimitiveValue::from(1_u16),
    ));
    obj.put(DataElement::new(
        tags::ROWS,
        VR::US,
        PrimitiveValue::from(size),
    ));
    obj.put(DataElement::new(
        tags::COLUMNS,
        VR::US,
        PrimitiveValue::from(size),
    ));
    obj.put(DataElement::new(
        tags::BITS_ALLOCATED,
        VR::US,
        PrimitiveValue::from(16_u16),
    ));
    obj.put(DataElement::new(
        tags::BITS_STORED,
        VR::US,
        PrimitiveValue::from(16_u16),
    ));
    obj.put(DataElement::new(
        tags::HIGH_BIT,
        VR::US,
        PrimitiveValue::from(15_u16),
    ));
    obj.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0_u16),
    ));
    obj.put(DataElement::new(
        tags::RESCALE_SLOPE,
        VR::DS,
        PrimitiveValue::from(slope.to_string()),
    ));
    obj.put(DataElement::new(
        tags::RESCALE_INTERCEPT,
        VR::DS,
        PrimitiveValue::from(intercept.to_string()),
    ));

    let pixels = vec![pixel; usize::from(size) * usize::from(size)];
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(pixels.into()),
    ));

    write_object(obj, path);
}
