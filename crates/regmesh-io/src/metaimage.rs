//! MetaImage (`.mha` / `.mhd`) codec.
//!
//! Supports uncompressed little-endian pixel data of type `MET_UCHAR`,
//! `MET_SHORT`, `MET_FLOAT` or `MET_DOUBLE`. `.mha` files hold the pixels
//! after the header (`ElementDataFile = LOCAL`); `.mhd` headers name a
//! separate raw file next to them.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use burn::tensor::backend::Backend;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use nalgebra::SMatrix;
use regmesh_core::spatial::{Direction, Point, Spacing};
use regmesh_core::{Image, ImageGeometry};
use tracing::{debug, warn};

/// Pixel storage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetElementType {
    UChar,
    Short,
    Float,
    Double,
}

impl MetElementType {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "MET_UCHAR" => Ok(Self::UChar),
            "MET_SHORT" => Ok(Self::Short),
            "MET_FLOAT" => Ok(Self::Float),
            "MET_DOUBLE" => Ok(Self::Double),
            other => bail!("Unsupported MetaImage element type {other}"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UChar => "MET_UCHAR",
            Self::Short => "MET_SHORT",
            Self::Float => "MET_FLOAT",
            Self::Double => "MET_DOUBLE",
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            Self::UChar => 1,
            Self::Short => 2,
            Self::Float => 4,
            Self::Double => 8,
        }
    }

    fn decode(self, bytes: &[u8], count: usize) -> Result<Vec<f32>> {
        let needed = count
            .checked_mul(self.byte_size())
            .ok_or_else(|| anyhow!("MetaImage pixel count {count} overflows the addressable byte size"))?;
        if bytes.len() < needed {
            bail!("MetaImage pixel data holds {} bytes, expected {}", bytes.len(), needed);
        }
        let mut cursor = Cursor::new(&bytes[..needed]);
        let mut pixels = Vec::with_capacity(count);
        for _ in 0..count {
            let value = match self {
                Self::UChar => cursor.read_u8()? as f32,
                Self::Short => cursor.read_i16::<LittleEndian>()? as f32,
                Self::Float => cursor.read_f32::<LittleEndian>()?,
                Self::Double => cursor.read_f64::<LittleEndian>()? as f32,
            };
            pixels.push(value);
        }
        Ok(pixels)
    }

    fn encode(self, pixels: &[f32], out: &mut Vec<u8>) -> Result<()> {
        for &value in pixels {
            match self {
                Self::UChar => out.write_u8(value.round().clamp(0.0, u8::MAX as f32) as u8)?,
                Self::Short => out.write_i16::<LittleEndian>(
                    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16,
                )?,
                Self::Float => out.write_f32::<LittleEndian>(value)?,
                Self::Double => out.write_f64::<LittleEndian>(value as f64)?,
            }
        }
        Ok(())
    }
}

/// Header fields plus the byte offset where pixel data starts.
struct Header {
    fields: HashMap<String, String>,
    data_offset: usize,
}

impl Header {
    fn parse(bytes: &[u8]) -> Result<Self> {
        let mut fields = HashMap::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let end = bytes[offset..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| offset + p)
                .unwrap_or(bytes.len());
            let line = String::from_utf8_lossy(&bytes[offset..end]);
            offset = (end + 1).min(bytes.len());

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_string();
            let value = value.trim().to_string();
            let last = key == "ElementDataFile";
            fields.insert(key, value);
            if last {
                return Ok(Self {
                    fields,
                    data_offset: offset,
                });
            }
        }
        bail!("MetaImage header has no ElementDataFile entry")
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| anyhow!("MetaImage header is missing {key}"))
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn numbers<T: std::str::FromStr>(&self, key: &str, count: usize) -> Result<Option<Vec<T>>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let parsed = value
            .split_whitespace()
            .map(|token| token.parse::<T>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| anyhow!("MetaImage {key} is not numeric: {value}"))?;
        if parsed.len() != count {
            bail!("MetaImage {key} has {} values, expected {count}", parsed.len());
        }
        Ok(Some(parsed))
    }
}

/// Read a D-dimensional MetaImage.
pub fn read_metaimage<B: Backend, P: AsRef<Path>, const D: usize>(
    path: P,
    device: &B::Device,
) -> Result<Image<B, D>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Failed to read MetaImage {}", path.display()))?;
    let header = Header::parse(&bytes).with_context(|| format!("Invalid MetaImage header in {}", path.display()))?;

    let dims: usize = header
        .require("NDims")?
        .parse()
        .context("MetaImage NDims is not an integer")?;
    if dims != D {
        bail!("Expected a {D}D MetaImage, found {dims} dimensions");
    }
    if header.flag("CompressedData") {
        bail!("Compressed MetaImage data is not supported");
    }
    if header.flag("BinaryDataByteOrderMSB") || header.flag("ElementByteOrderMSB") {
        bail!("Big-endian MetaImage data is not supported");
    }

    let size_values = header
        .numbers::<usize>("DimSize", D)?
        .ok_or_else(|| anyhow!("MetaImage header is missing DimSize"))?;
    let mut geometry = ImageGeometry::<D>::with_size(std::array::from_fn(|i| size_values[i]));

    if let Some(offset) = header.numbers::<f64>("Offset", D)? {
        geometry.origin = Point::new(std::array::from_fn(|i| offset[i]));
    } else if let Some(offset) = header.numbers::<f64>("Origin", D)? {
        geometry.origin = Point::new(std::array::from_fn(|i| offset[i]));
    }
    if let Some(spacing) = header.numbers::<f64>("ElementSpacing", D)? {
        geometry.spacing = Spacing::new(std::array::from_fn(|i| spacing[i]));
    }
    if let Some(matrix) = header.numbers::<f64>("TransformMatrix", D * D)? {
        // Stored axis by axis: entries `c*D .. c*D + D` are the direction of index axis c.
        geometry.direction = Direction(SMatrix::<f64, D, D>::from_fn(|r, c| matrix[c * D + r]));
    }

    let element_type = MetElementType::parse(header.require("ElementType")?)?;
    if let Some(channels) = header.get("ElementNumberOfChannels") {
        if channels != "1" {
            bail!("Multi-channel MetaImage data is not supported ({channels} channels)");
        }
    }
    let count = size_values
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| anyhow!("MetaImage DimSize {size_values:?} overflows the pixel count"))?;

    let data_file = header.require("ElementDataFile")?;
    let pixels = if data_file.eq_ignore_ascii_case("LOCAL") {
        element_type.decode(&bytes[header.data_offset..], count)?
    } else {
        let raw_path = path.parent().unwrap_or_else(|| Path::new(".")).join(data_file);
        let raw = fs::read(&raw_path)
            .with_context(|| format!("Failed to read MetaImage data file {}", raw_path.display()))?;
        element_type.decode(&raw, count)?
    };
    debug!(
        size = ?geometry.size,
        element_type = element_type.as_str(),
        "Read MetaImage {}",
        path.display()
    );

    Image::from_pixels(pixels, geometry, device).context("MetaImage does not form a valid image")
}

/// Write a MetaImage with `MET_FLOAT` pixels.
pub fn write_metaimage<B: Backend, P: AsRef<Path>, const D: usize>(path: P, image: &Image<B, D>) -> Result<()> {
    write_metaimage_as(path, image, MetElementType::Float)
}

fn join<T: std::fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write a MetaImage with the given pixel type.
///
/// A `.mhd` path gets its pixels in a sibling `.raw` file; any other path
/// stores them inline.
pub fn write_metaimage_as<B: Backend, P: AsRef<Path>, const D: usize>(
    path: P,
    image: &Image<B, D>,
    element_type: MetElementType,
) -> Result<()> {
    let path = path.as_ref();
    let geometry = image.geometry();
    let direction = geometry.direction;
    let transform: Vec<f64> = (0..D)
        .flat_map(|c| (0..D).map(move |r| direction[(r, c)]))
        .collect();

    let detached = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mhd"))
        .unwrap_or(false);
    let data_file = if detached {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("MetaImage path {} has no file name", path.display()))?;
        format!("{stem}.raw")
    } else {
        "LOCAL".to_string()
    };

    let values = image.pixel_values();
    if matches!(element_type, MetElementType::UChar | MetElementType::Short) {
        warn_on_truncation(&values, element_type);
    }
    let mut data = Vec::with_capacity(values.len() * element_type.byte_size());
    element_type.encode(&values, &mut data)?;

    let mut out = Vec::new();
    writeln!(out, "ObjectType = Image")?;
    writeln!(out, "NDims = {D}")?;
    writeln!(out, "BinaryData = True")?;
    writeln!(out, "BinaryDataByteOrderMSB = False")?;
    writeln!(out, "CompressedData = False")?;
    writeln!(out, "TransformMatrix = {}", join(transform))?;
    writeln!(out, "Offset = {}", join(geometry.origin.to_vec()))?;
    writeln!(out, "ElementSpacing = {}", join(geometry.spacing.to_vec()))?;
    writeln!(out, "DimSize = {}", join(geometry.size))?;
    writeln!(out, "ElementType = {}", element_type.as_str())?;
    writeln!(out, "ElementDataFile = {data_file}")?;

    if detached {
        let raw_path = path.with_file_name(&data_file);
        fs::write(&raw_path, &data)
            .with_context(|| format!("Failed to write MetaImage data file {}", raw_path.display()))?;
    } else {
        out.extend_from_slice(&data);
    }
    fs::write(path, out).with_context(|| format!("Failed to write MetaImage {}", path.display()))
}

fn warn_on_truncation(values: &[f32], element_type: MetElementType) {
    let lossy = values.iter().filter(|v| v.fract() != 0.0).count();
    if lossy > 0 {
        warn!(
            lossy,
            element_type = element_type.as_str(),
            "Rounding non-integer pixels for integer MetaImage output"
        );
    }
}
