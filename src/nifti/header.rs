//! `NIfTI` header parsing.
//!
//! Supports both NIfTI-1 (348-byte header) and NIfTI-2 (540-byte header) formats
//! with automatic version detection and endianness handling. Only the fields a
//! FEAT design needs (dimensions, voxel spacing, timing units) are decoded.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// NIfTI format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NiftiVersion {
    /// NIfTI-1 format (348-byte header, 16-bit dimensions)
    #[default]
    Nifti1,
    /// NIfTI-2 format (540-byte header, 64-bit dimensions)
    Nifti2,
}

impl NiftiVersion {
    /// Header size in bytes for this version.
    pub const fn header_size(self) -> usize {
        match self {
            Self::Nifti1 => 348,
            Self::Nifti2 => 540,
        }
    }

    /// Default vox_offset for this version (header size + extension flag).
    pub const fn default_vox_offset(self) -> i64 {
        match self {
            Self::Nifti1 => 352,
            Self::Nifti2 => 544,
        }
    }
}

/// NIfTI-1 header field byte offsets.
mod offsets_v1 {
    pub const SIZEOF_HDR: usize = 0;
    pub const DIM: usize = 40;
    pub const DATATYPE: usize = 70;
    pub const BITPIX: usize = 72;
    pub const PIXDIM: usize = 76;
    pub const VOX_OFFSET: usize = 108;
    pub const XYZT_UNITS: usize = 123;
    pub const DESCRIP: usize = 148;
    pub const AUX_FILE: usize = 228;
    pub const MAGIC: usize = 344;
}

/// NIfTI-2 header field byte offsets.
mod offsets_v2 {
    pub const SIZEOF_HDR: usize = 0;
    pub const MAGIC: usize = 4;
    pub const DATATYPE: usize = 12;
    pub const BITPIX: usize = 14;
    pub const DIM: usize = 16;
    pub const PIXDIM: usize = 104;
    pub const VOX_OFFSET: usize = 168;
    pub const DESCRIP: usize = 240;
    pub const XYZT_UNITS: usize = 500;
}

/// `NIfTI` data type codes.
///
/// Only the code is needed to read timing metadata, so codes outside the
/// common scalar set (RGB, complex, float128) are kept as [`DataType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
    /// Any other code, carried through unchanged.
    Other(i16),
}

impl DataType {
    /// Parse from `NIfTI` datatype code.
    pub const fn from_code(code: i16) -> Self {
        match code {
            2 => Self::UInt8,
            4 => Self::Int16,
            8 => Self::Int32,
            16 => Self::Float32,
            64 => Self::Float64,
            256 => Self::Int8,
            512 => Self::UInt16,
            768 => Self::UInt32,
            1024 => Self::Int64,
            1280 => Self::UInt64,
            other => Self::Other(other),
        }
    }

    /// `NIfTI` datatype code.
    pub const fn code(self) -> i16 {
        match self {
            Self::UInt8 => 2,
            Self::Int16 => 4,
            Self::Int32 => 8,
            Self::Float32 => 16,
            Self::Float64 => 64,
            Self::Int8 => 256,
            Self::UInt16 => 512,
            Self::UInt32 => 768,
            Self::Int64 => 1024,
            Self::UInt64 => 1280,
            Self::Other(code) => code,
        }
    }

    /// Bits per element, when known from the code alone.
    pub const fn bitpix(self) -> Option<i16> {
        match self {
            Self::UInt8 | Self::Int8 => Some(8),
            Self::Int16 | Self::UInt16 => Some(16),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(32),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(64),
            Self::Other(_) => None,
        }
    }
}

/// Temporal units for time dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemporalUnits {
    #[default]
    /// Temporal spacing unspecified.
    Unknown,
    /// Temporal spacing in seconds.
    Second,
    /// Temporal spacing in milliseconds.
    Millisecond,
    /// Temporal spacing in microseconds.
    Microsecond,
}

impl TemporalUnits {
    fn from_code(code: u8) -> Self {
        match code & 0x38 {
            0x08 => Self::Second,
            0x10 => Self::Millisecond,
            0x18 => Self::Microsecond,
            _ => Self::Unknown,
        }
    }

    fn to_code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Second => 0x08,
            Self::Millisecond => 0x10,
            Self::Microsecond => 0x18,
        }
    }

    /// Factor converting a value in these units to seconds.
    ///
    /// Unknown units are taken to be seconds, which is what FSL assumes.
    pub const fn seconds_per_unit(self) -> f64 {
        match self {
            Self::Unknown | Self::Second => 1.0,
            Self::Millisecond => 1e-3,
            Self::Microsecond => 1e-6,
        }
    }
}

/// Spatial unit code written alongside the temporal units (millimetres).
const SPATIAL_UNITS_MM: u8 = 0x02;

/// The subset of a NIfTI-1 / NIfTI-2 header this crate reads.
///
/// Dimensions and spacing are held with 64-bit width for both versions.
#[derive(Debug, Clone)]
pub struct NiftiHeader {
    /// NIfTI format version.
    pub version: NiftiVersion,
    /// Number of dimensions (1-7).
    pub ndim: u8,
    /// Size along each dimension; `dim[3]` is the time axis.
    pub dim: [i64; 7],
    /// Data type.
    pub datatype: DataType,
    /// qfac at index 0, then spacing per axis; `pixdim[4]` is the TR.
    pub pixdim: [f64; 8],
    /// Data offset in file.
    pub vox_offset: i64,
    /// Units of `pixdim[4]`.
    pub temporal_units: TemporalUnits,
    /// Description string.
    pub descrip: String,
    /// File endianness (true = little endian).
    pub(crate) little_endian: bool,
}

impl Default for NiftiHeader {
    fn default() -> Self {
        Self {
            version: NiftiVersion::Nifti1,
            ndim: 3,
            dim: [1, 1, 1, 1, 1, 1, 1],
            datatype: DataType::Float32,
            pixdim: [1.0; 8],
            vox_offset: NiftiVersion::Nifti1.default_vox_offset(),
            temporal_units: TemporalUnits::Unknown,
            descrip: String::new(),
            little_endian: true,
        }
    }
}

// NIfTI-1 stores pixdim as f32. Widening through the shortest decimal keeps a
// TR of 0.72 from turning into 0.7200000286102295 in the design file.
fn widen_f32(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

impl NiftiHeader {
    /// Size of NIfTI-1 header in bytes.
    pub const SIZE: usize = 348;

    /// Size of NIfTI-2 header in bytes.
    pub const SIZE_V2: usize = 540;

    /// Read header from bytes with automatic version and endianness detection.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "header too short to detect version",
            )));
        }

        // Detect version and endianness from sizeof_hdr field
        let sizeof_hdr_le = LittleEndian::read_i32(&bytes[0..4]);
        let sizeof_hdr_be = BigEndian::read_i32(&bytes[0..4]);

        let (version, little_endian) = if sizeof_hdr_le == 348 {
            (NiftiVersion::Nifti1, true)
        } else if sizeof_hdr_be == 348 {
            (NiftiVersion::Nifti1, false)
        } else if sizeof_hdr_le == 540 {
            (NiftiVersion::Nifti2, true)
        } else if sizeof_hdr_be == 540 {
            (NiftiVersion::Nifti2, false)
        } else {
            return Err(Error::InvalidMagic([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]));
        };

        let required_size = version.header_size();
        if bytes.len() < required_size {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "header too short: got {} bytes, need {} for {:?}",
                    bytes.len(),
                    required_size,
                    version
                ),
            )));
        }

        match (version, little_endian) {
            (NiftiVersion::Nifti1, true) => Self::parse_v1::<LittleEndian>(bytes, true),
            (NiftiVersion::Nifti1, false) => Self::parse_v1::<BigEndian>(bytes, false),
            (NiftiVersion::Nifti2, true) => Self::parse_v2::<LittleEndian>(bytes, true),
            (NiftiVersion::Nifti2, false) => Self::parse_v2::<BigEndian>(bytes, false),
        }
    }

    #[allow(clippy::wildcard_imports)]
    fn parse_v1<E: ByteOrder>(bytes: &[u8], little_endian: bool) -> Result<Self> {
        use offsets_v1::*;

        let magic = &bytes[MAGIC..MAGIC + 4];
        if magic != b"n+1\0" && magic != b"ni1\0" {
            return Err(Error::InvalidMagic([
                magic[0], magic[1], magic[2], magic[3],
            ]));
        }

        let ndim_raw = E::read_i16(&bytes[DIM..DIM + 2]);
        if !(1..=7).contains(&ndim_raw) {
            return Err(Error::InvalidDimensions(format!(
                "ndim must be 1..=7, got {}",
                ndim_raw
            )));
        }

        let mut dim = [0i64; 7];
        for (i, dim_val) in dim.iter_mut().enumerate() {
            let offset = DIM + 2 + i * 2;
            let dim_raw = E::read_i16(&bytes[offset..offset + 2]);
            if dim_raw < 0 {
                return Err(Error::InvalidDimensions(format!(
                    "dimension {} has negative value: {}",
                    i, dim_raw
                )));
            }
            *dim_val = i64::from(dim_raw);
        }

        let datatype = DataType::from_code(E::read_i16(&bytes[DATATYPE..DATATYPE + 2]));

        let mut pixdim = [0.0f64; 8];
        for (i, pix_val) in pixdim.iter_mut().enumerate() {
            let offset = PIXDIM + i * 4;
            *pix_val = widen_f32(E::read_f32(&bytes[offset..offset + 4]));
        }

        // Only single-file images locate their data through vox_offset.
        let vox_offset_raw = E::read_f32(&bytes[VOX_OFFSET..VOX_OFFSET + 4]);
        let single_file = magic == b"n+1\0";
        if single_file && (!vox_offset_raw.is_finite() || vox_offset_raw.fract() != 0.0) {
            return Err(Error::InvalidDimensions(format!(
                "vox_offset must be a finite integer, got {}",
                vox_offset_raw
            )));
        }

        let descrip = String::from_utf8_lossy(&bytes[DESCRIP..AUX_FILE])
            .trim_end_matches('\0')
            .to_string();

        let header = Self {
            version: NiftiVersion::Nifti1,
            ndim: ndim_raw as u8,
            dim,
            datatype,
            pixdim,
            vox_offset: vox_offset_raw as i64,
            temporal_units: TemporalUnits::from_code(bytes[XYZT_UNITS]),
            descrip,
            little_endian,
        };

        header.validate()?;
        if single_file {
            header.check_vox_offset()?;
        }
        Ok(header)
    }

    #[allow(clippy::wildcard_imports)]
    fn parse_v2<E: ByteOrder>(bytes: &[u8], little_endian: bool) -> Result<Self> {
        use offsets_v2::*;

        let magic = &bytes[MAGIC..MAGIC + 8];
        if magic != b"n+2\0\r\n\x1a\n" && magic != b"ni2\0\r\n\x1a\n" {
            return Err(Error::InvalidMagic([
                magic[0], magic[1], magic[2], magic[3],
            ]));
        }

        // dim[0] is ndim, stored as i64 at offset 16
        let ndim_raw = E::read_i64(&bytes[DIM..DIM + 8]);
        if !(1..=7).contains(&ndim_raw) {
            return Err(Error::InvalidDimensions(format!(
                "ndim must be 1..=7, got {}",
                ndim_raw
            )));
        }

        let mut dim = [0i64; 7];
        for (i, dim_val) in dim.iter_mut().enumerate() {
            let offset = DIM + 8 + i * 8;
            *dim_val = E::read_i64(&bytes[offset..offset + 8]);
            if *dim_val < 0 {
                return Err(Error::InvalidDimensions(format!(
                    "dimension {} has negative value: {}",
                    i, *dim_val
                )));
            }
        }

        let datatype = DataType::from_code(E::read_i16(&bytes[DATATYPE..DATATYPE + 2]));

        let mut pixdim = [0.0f64; 8];
        for (i, pix_val) in pixdim.iter_mut().enumerate() {
            let offset = PIXDIM + i * 8;
            *pix_val = E::read_f64(&bytes[offset..offset + 8]);
        }

        let xyzt_units = E::read_i32(&bytes[XYZT_UNITS..XYZT_UNITS + 4]) as u8;

        let descrip = String::from_utf8_lossy(&bytes[DESCRIP..DESCRIP + 80])
            .trim_end_matches('\0')
            .to_string();

        let header = Self {
            version: NiftiVersion::Nifti2,
            ndim: ndim_raw as u8,
            dim,
            datatype,
            pixdim,
            vox_offset: E::read_i64(&bytes[VOX_OFFSET..VOX_OFFSET + 8]),
            temporal_units: TemporalUnits::from_code(xyzt_units),
            descrip,
            little_endian,
        };

        header.validate()?;
        if magic.starts_with(b"n+2") {
            header.check_vox_offset()?;
        }
        Ok(header)
    }

    /// Serialize the header (little endian) in this header's version.
    ///
    /// Fields this type does not model are written as zero, with scaling
    /// slope 1 and millimetre spatial units.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.version {
            NiftiVersion::Nifti1 => self.to_bytes_v1(),
            NiftiVersion::Nifti2 => self.to_bytes_v2(),
        }
    }

    #[allow(clippy::wildcard_imports)]
    fn to_bytes_v1(&self) -> Vec<u8> {
        use offsets_v1::*;

        let mut buf = vec![0u8; Self::SIZE];

        LittleEndian::write_i32(&mut buf[SIZEOF_HDR..SIZEOF_HDR + 4], 348);

        LittleEndian::write_i16(&mut buf[DIM..DIM + 2], i16::from(self.ndim));
        for (i, &d) in self.dim.iter().enumerate() {
            let offset = DIM + 2 + i * 2;
            let dim_val = d.min(i64::from(i16::MAX)) as i16;
            LittleEndian::write_i16(&mut buf[offset..offset + 2], dim_val);
        }

        LittleEndian::write_i16(&mut buf[DATATYPE..DATATYPE + 2], self.datatype.code());
        LittleEndian::write_i16(
            &mut buf[BITPIX..BITPIX + 2],
            self.datatype.bitpix().unwrap_or(0),
        );

        for (i, &value) in self.pixdim.iter().enumerate() {
            let offset = PIXDIM + i * 4;
            LittleEndian::write_f32(&mut buf[offset..offset + 4], value as f32);
        }

        LittleEndian::write_f32(&mut buf[VOX_OFFSET..VOX_OFFSET + 4], self.vox_offset as f32);
        // scl_slope
        LittleEndian::write_f32(&mut buf[112..116], 1.0);

        buf[XYZT_UNITS] = SPATIAL_UNITS_MM | self.temporal_units.to_code();

        let descrip_bytes = self.descrip.as_bytes();
        let len = descrip_bytes.len().min(79);
        buf[DESCRIP..DESCRIP + len].copy_from_slice(&descrip_bytes[..len]);

        buf[MAGIC..MAGIC + 4].copy_from_slice(b"n+1\0");

        buf
    }

    #[allow(clippy::wildcard_imports)]
    fn to_bytes_v2(&self) -> Vec<u8> {
        use offsets_v2::*;

        let mut buf = vec![0u8; Self::SIZE_V2];

        LittleEndian::write_i32(&mut buf[SIZEOF_HDR..SIZEOF_HDR + 4], 540);
        buf[MAGIC..MAGIC + 8].copy_from_slice(b"n+2\0\r\n\x1a\n");

        LittleEndian::write_i16(&mut buf[DATATYPE..DATATYPE + 2], self.datatype.code());
        LittleEndian::write_i16(
            &mut buf[BITPIX..BITPIX + 2],
            self.datatype.bitpix().unwrap_or(0),
        );

        LittleEndian::write_i64(&mut buf[DIM..DIM + 8], i64::from(self.ndim));
        for (i, &d) in self.dim.iter().enumerate() {
            let offset = DIM + 8 + i * 8;
            LittleEndian::write_i64(&mut buf[offset..offset + 8], d);
        }

        for (i, &value) in self.pixdim.iter().enumerate() {
            let offset = PIXDIM + i * 8;
            LittleEndian::write_f64(&mut buf[offset..offset + 8], value);
        }

        LittleEndian::write_i64(&mut buf[VOX_OFFSET..VOX_OFFSET + 8], self.vox_offset);
        // scl_slope
        LittleEndian::write_f64(&mut buf[176..184], 1.0);

        let xyzt_code = i32::from(SPATIAL_UNITS_MM | self.temporal_units.to_code());
        LittleEndian::write_i32(&mut buf[XYZT_UNITS..XYZT_UNITS + 4], xyzt_code);

        let descrip_bytes = self.descrip.as_bytes();
        let len = descrip_bytes.len().min(79);
        buf[DESCRIP..DESCRIP + len].copy_from_slice(&descrip_bytes[..len]);

        buf
    }

    /// Image shape (up to ndim elements).
    pub fn shape(&self) -> Vec<u64> {
        self.dim[..self.ndim as usize]
            .iter()
            .map(|&d| d as u64)
            .collect()
    }

    /// Total number of voxels across every axis, time included.
    pub fn num_voxels(&self) -> u64 {
        self.shape().iter().product()
    }

    /// Returns true if file is little endian.
    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    /// Validate header fields for basic NIfTI invariants.
    ///
    /// Spacing, datatype and bitpix are not checked here; a non-positive TR
    /// is reported by [`super::metadata`] instead.
    pub fn validate(&self) -> Result<()> {
        if self.ndim == 0 || self.ndim > 7 {
            return Err(Error::InvalidDimensions(format!(
                "ndim must be 1..=7, got {}",
                self.ndim
            )));
        }

        for i in 0..self.ndim as usize {
            if self.dim[i] == 0 {
                return Err(Error::InvalidDimensions(format!("dimension {} is zero", i)));
            }
        }

        let mut voxels: u64 = 1;
        for i in 0..self.ndim as usize {
            voxels = voxels
                .checked_mul(self.dim[i] as u64)
                .ok_or_else(|| Error::InvalidDimensions("dimension product overflow".into()))?;
        }

        Ok(())
    }

    /// A single-file image (`n+1` / `n+2`) keeps its data after the header.
    fn check_vox_offset(&self) -> Result<()> {
        let min_offset = self.version.header_size() as i64;
        if self.vox_offset < min_offset {
            return Err(Error::InvalidDimensions(format!(
                "vox_offset {} before header end ({})",
                self.vox_offset, min_offset
            )));
        }
        Ok(())
    }
}
