//! Write a self-consistent demo tree: NPS tables and uniformity-phantom
//! DICOM series for every compatible selection, plus a matching
//! `nps-viewer.json`.
//!
//! ```bash
//! cargo run --bin generate_sample [root]   # default root: demo-data/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::dictionary_std::tags;
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};

const SCANNERS: [&str; 2] = ["Siemens AS+", "Siemens Flash"];

const FBP_KERNELS: [&str; 8] = [
    "H10s", "H20s", "H30s", "H37s", "H40s", "H50s", "H60s", "H70h",
];

const ITERATIVE_KERNELS: [&str; 8] = [
    "J30s", "J37s", "J40s", "J45s", "J49s", "J70h", "Q30s", "Q33s",
];

/// Dose tiers with their CTDIvol in mGy.
const TIERS: [(&str, f64); 3] = [("CTDI1", 40.0), ("CTDI2", 60.0), ("CTDI3", 80.0)];

const SLICES_PER_SERIES: usize = 8;
const IMAGE_SIZE: u16 = 64;
const SLICE_SPACING_MM: f64 = 3.0;
const FIRST_SLICE_LOCATION: f64 = -110.0;

const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

fn reconstructions() -> [(&'static str, &'static [&'static str]); 3] {
    [
        ("FBP", &FBP_KERNELS),
        ("IR1", &ITERATIVE_KERNELS),
        ("IR2", &ITERATIVE_KERNELS),
    ]
}

// ---------------------------------------------------------------------------
// NPS tables
// ---------------------------------------------------------------------------

/// Numeric part of a kernel name ("H37s" → 37). Sharper kernels push the
/// NPS peak towards higher frequencies.
fn kernel_sharpness(kernel: &str) -> f64 {
    let digits: String = kernel.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(30.0)
}

/// Rising-then-falling NPS bump peaking at `peak` with height `amplitude`.
fn nps_value(frequency: f64, peak: f64, amplitude: f64) -> f64 {
    let x = frequency / peak;
    amplitude * x * x * (1.0 - x * x).exp()
}

fn write_table(path: &Path, dose: f64, kernel: &str, rng: &mut SimpleRng) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let peak = 0.15 + kernel_sharpness(kernel) / 100.0;
    let amplitude = 1200.0 / dose;

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["F", "NPSTOT"])?;
    for i in 0..=60 {
        let frequency = f64::from(i) * 0.02;
        let value = nps_value(frequency, peak, amplitude) + rng.gauss(0.0, amplitude * 0.01);
        writer.write_record([format!("{frequency:.3}"), format!("{:.4}", value.max(0.0))])?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// DICOM series
// ---------------------------------------------------------------------------

/// Stored pixel values of one phantom slice: a water disk in air, with noise
/// falling as dose rises. Stored value = HU + 1024 (slope 1 / intercept
/// -1024).
fn phantom_pixels(dose: f64, rng: &mut SimpleRng) -> Vec<u16> {
    let size = usize::from(IMAGE_SIZE);
    let centre = (size as f64 - 1.0) / 2.0;
    let radius = size as f64 * 0.38;
    let sigma = 600.0 / dose;

    let mut pixels = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let dr = row as f64 - centre;
            let dc = col as f64 - centre;
            let hu = if dr.hypot(dc) <= radius { 0.0 } else { -1000.0 };
            let stored = hu + rng.gauss(0.0, sigma) + 1024.0;
            pixels.push(stored.round().clamp(0.0, 4095.0) as u16);
        }
    }
    pixels
}

fn put_str(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

fn put_u16(obj: &mut InMemDicomObject, tag: Tag, value: u16) {
    obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

fn write_slice(path: &Path, location: f64, pixels: Vec<u16>, sop_uid: &str) -> Result<()> {
    let mut obj = InMemDicomObject::new_empty();
    put_str(&mut obj, tags::SOP_CLASS_UID, VR::UI, CT_IMAGE_STORAGE);
    put_str(&mut obj, tags::SOP_INSTANCE_UID, VR::UI, sop_uid);
    put_str(&mut obj, tags::MODALITY, VR::CS, "CT");
    put_str(
        &mut obj,
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        "MONOCHROME2",
    );
    put_str(&mut obj, tags::SLICE_LOCATION, VR::DS, &location.to_string());
    put_str(&mut obj, tags::RESCALE_SLOPE, VR::DS, "1");
    put_str(&mut obj, tags::RESCALE_INTERCEPT, VR::DS, "-1024");
    put_u16(&mut obj, tags::SAMPLES_PER_PIXEL, 1);
    put_u16(&mut obj, tags::ROWS, IMAGE_SIZE);
    put_u16(&mut obj, tags::COLUMNS, IMAGE_SIZE);
    put_u16(&mut obj, tags::BITS_ALLOCATED, 16);
    put_u16(&mut obj, tags::BITS_STORED, 16);
    put_u16(&mut obj, tags::HIGH_BIT, 15);
    put_u16(&mut obj, tags::PIXEL_REPRESENTATION, 0);
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(pixels.into()),
    ));

    let file = obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
            .media_storage_sop_instance_uid(sop_uid),
    )?;
    file.write_to_file(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Point a config file at the generated roots; everything else keeps the
/// built-in defaults.
fn write_config(root: &Path, nps_root: &Path, image_root: &Path) -> Result<()> {
    let config = serde_json::json!({
        "nps_root": nps_root,
        "image_root": image_root,
    });
    let path = root.join("nps-viewer.json");
    fs::write(&path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let root = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "demo-data".to_string()),
    );
    let nps_root = root.join("nps");
    let image_root = root.join("images");

    let mut rng = SimpleRng::new(42);
    let mut next_uid: u64 = 1;
    let mut tables = 0usize;
    let mut slices = 0usize;

    for scanner in SCANNERS {
        for (reconstruction, kernels) in reconstructions() {
            for &kernel in kernels {
                for (tier, dose) in TIERS {
                    let table = nps_root
                        .join(scanner)
                        .join(tier)
                        .join(reconstruction)
                        .join(format!("{kernel}.csv"));
                    write_table(&table, dose, kernel, &mut rng)?;
                    tables += 1;

                    // Double spaces are part of the archive naming.
                    let series = image_root
                        .join(scanner)
                        .join(format!("{tier} {reconstruction}  3.0  {kernel}"));
                    fs::create_dir_all(&series)?;
                    for i in 0..SLICES_PER_SERIES {
                        let location = FIRST_SLICE_LOCATION + SLICE_SPACING_MM * i as f64;
                        let sop_uid = format!("2.25.77{next_uid}");
                        next_uid += 1;
                        let pixels = phantom_pixels(dose, &mut rng);
                        write_slice(
                            &series.join(format!("slice{:02}.dcm", i + 1)),
                            location,
                            pixels,
                            &sop_uid,
                        )?;
                        slices += 1;
                    }
                }
            }
        }
    }

    write_config(&root, &nps_root, &image_root)?;

    println!(
        "Wrote {tables} NPS tables and {slices} slices under {}",
        root.display()
    );
    println!("Run the viewer from {} to browse them", root.display());
    Ok(())
}
