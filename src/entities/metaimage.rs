//! MetaImage (`.mha` / `.mhd`) reader. A LOCAL float writer is built for tests.
//!
//! A MetaImage file is an ASCII header of `Key = Value` lines terminated by
//! `ElementDataFile`, followed either by the raw pixel payload (`LOCAL`) or
//! by nothing, in which case the payload lives in a separate file named by
//! `ElementDataFile` relative to the header.
//!
//! Only 2D images are read (3D with a single slice is accepted). Every
//! element type is widened to `f32`, which is what field consumers need.

#[cfg(test)]
use flate2::Compression;
use flate2::read::ZlibDecoder;
#[cfg(test)]
use flate2::write::ZlibEncoder;
use log::{debug, trace};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
#[cfg(test)]
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing MetaImage files
#[derive(Error, Debug)]
pub enum MetaImageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("header ended before ElementDataFile")]
    UnterminatedHeader,
    #[error("missing header key: {0}")]
    MissingKey(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("unsupported element type: {0}")]
    UnsupportedElementType(String),
    #[error("only 2D images are supported (got DimSize {0:?})")]
    UnsupportedDimensions(Vec<usize>),
    #[error("pixel data truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("failed to decompress pixel data: {0}")]
    Decompress(#[source] std::io::Error),
}

impl MetaImageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn invalid(key: &str, value: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Scalar type of each stored component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    UChar,
    Char,
    UShort,
    Short,
    UInt,
    Int,
    ULong,
    Long,
    ULongLong,
    LongLong,
    Float,
    Double,
}

impl ElementType {
    pub fn parse(s: &str) -> Result<Self, MetaImageError> {
        Ok(match s {
            "MET_UCHAR" => Self::UChar,
            "MET_CHAR" => Self::Char,
            "MET_USHORT" => Self::UShort,
            "MET_SHORT" => Self::Short,
            "MET_UINT" => Self::UInt,
            "MET_INT" => Self::Int,
            "MET_ULONG" => Self::ULong,
            "MET_LONG" => Self::Long,
            "MET_ULONG_LONG" => Self::ULongLong,
            "MET_LONG_LONG" => Self::LongLong,
            "MET_FLOAT" => Self::Float,
            "MET_DOUBLE" => Self::Double,
            other => return Err(MetaImageError::UnsupportedElementType(other.to_string())),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UChar => "MET_UCHAR",
            Self::Char => "MET_CHAR",
            Self::UShort => "MET_USHORT",
            Self::Short => "MET_SHORT",
            Self::UInt => "MET_UINT",
            Self::Int => "MET_INT",
            Self::ULong => "MET_ULONG",
            Self::Long => "MET_LONG",
            Self::ULongLong => "MET_ULONG_LONG",
            Self::LongLong => "MET_LONG_LONG",
            Self::Float => "MET_FLOAT",
            Self::Double => "MET_DOUBLE",
        }
    }

    /// Size in bytes. MET_LONG/MET_ULONG are 32-bit in files ITK writes.
    pub fn size(&self) -> usize {
        match self {
            Self::UChar | Self::Char => 1,
            Self::UShort | Self::Short => 2,
            Self::UInt | Self::Int | Self::ULong | Self::Long | Self::Float => 4,
            Self::ULongLong | Self::LongLong | Self::Double => 8,
        }
    }

    fn decode(&self, b: &[u8], big_endian: bool) -> f32 {
        macro_rules! read {
            ($t:ty, $n:expr) => {{
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&b[..$n]);
                if big_endian {
                    <$t>::from_be_bytes(raw)
                } else {
                    <$t>::from_le_bytes(raw)
                }
            }};
        }
        match self {
            Self::UChar => b[0] as f32,
            Self::Char => b[0] as i8 as f32,
            Self::UShort => read!(u16, 2) as f32,
            Self::Short => read!(i16, 2) as f32,
            Self::UInt | Self::ULong => read!(u32, 4) as f32,
            Self::Int | Self::Long => read!(i32, 4) as f32,
            Self::ULongLong => read!(u64, 8) as f32,
            Self::LongLong => read!(i64, 8) as f32,
            Self::Float => read!(f32, 4),
            Self::Double => read!(f64, 8) as f32,
        }
    }
}

/// Parsed header fields relevant to 2D vector images.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaHeader {
    pub width: usize,
    pub height: usize,
    pub components: usize,
    pub element_type: ElementType,
    pub big_endian: bool,
    pub compressed: bool,
    pub header_size: Option<i64>,
    /// `None` for LOCAL data.
    pub data_file: Option<String>,
}

/// Decoded image: `width * height * components` interleaved values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaImage {
    pub width: usize,
    pub height: usize,
    pub components: usize,
    pub data: Vec<f32>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool, MetaImageError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(MetaImageError::invalid(key, value)),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, MetaImageError> {
    value
        .trim()
        .parse()
        .map_err(|_| MetaImageError::invalid(key, value))
}

/// Parse the header at the start of `bytes`.
///
/// Returns the header and the offset of the first payload byte.
pub fn parse_header(bytes: &[u8]) -> Result<(MetaHeader, usize), MetaImageError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut pos = 0;
    let mut terminated = false;

    while pos < bytes.len() {
        let end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| pos + i + 1)
            .unwrap_or(bytes.len());
        let line = String::from_utf8_lossy(&bytes[pos..end]);
        pos = end;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        trace!("mha header: {} = {}", key, value);
        fields.insert(key.to_string(), value.to_string());
        if key == "ElementDataFile" {
            terminated = true;
            break;
        }
    }
    if !terminated {
        return Err(MetaImageError::UnterminatedHeader);
    }

    let get = |key: &'static str| fields.get(key).ok_or(MetaImageError::MissingKey(key));

    let ndims: usize = parse_num("NDims", get("NDims")?)?;
    let dims = get("DimSize")?
        .split_whitespace()
        .map(|v| parse_num::<usize>("DimSize", v))
        .collect::<Result<Vec<_>, _>>()?;
    if dims.len() != ndims {
        return Err(MetaImageError::invalid("DimSize", get("DimSize")?));
    }
    let (width, height) = match dims.as_slice() {
        [w, h] => (*w, *h),
        [w, h, 1] => (*w, *h),
        _ => return Err(MetaImageError::UnsupportedDimensions(dims)),
    };

    let element_type = ElementType::parse(get("ElementType")?)?;
    let components = match fields.get("ElementNumberOfChannels") {
        Some(v) => parse_num("ElementNumberOfChannels", v)?,
        None => 1,
    };
    if components == 0 {
        return Err(MetaImageError::invalid("ElementNumberOfChannels", "0"));
    }

    let big_endian = match fields
        .get("BinaryDataByteOrderMSB")
        .or_else(|| fields.get("ElementByteOrderMSB"))
    {
        Some(v) => parse_bool("BinaryDataByteOrderMSB", v)?,
        None => false,
    };
    let compressed = match fields.get("CompressedData") {
        Some(v) => parse_bool("CompressedData", v)?,
        None => false,
    };
    let header_size = match fields.get("HeaderSize") {
        Some(v) => Some(parse_num("HeaderSize", v)?),
        None => None,
    };
    let data_file = match get("ElementDataFile")?.as_str() {
        "LOCAL" | "Local" | "local" => None,
        other => Some(other.to_string()),
    };

    Ok((
        MetaHeader {
            width,
            height,
            components,
            element_type,
            big_endian,
            compressed,
            header_size,
            data_file,
        },
        pos,
    ))
}

impl MetaHeader {
    /// Payload size in bytes, or an error when the dimensions overflow.
    pub fn payload_len(&self) -> Result<usize, MetaImageError> {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.components))
            .and_then(|n| n.checked_mul(self.element_type.size()))
            .ok_or_else(|| {
                MetaImageError::invalid(
                    "DimSize",
                    &format!("{} {} x{}", self.width, self.height, self.components),
                )
            })
    }
}

/// Decode a payload according to `header`.
pub fn decode_payload(header: &MetaHeader, payload: &[u8]) -> Result<Vec<f32>, MetaImageError> {
    let expected = header.payload_len()?;
    let elem = header.element_type.size();

    let inflated;
    let raw: &[u8] = if header.compressed {
        // Inflate at most one byte past the expected size.
        let mut out = Vec::new();
        ZlibDecoder::new(payload)
            .take(expected as u64 + 1)
            .read_to_end(&mut out)
            .map_err(MetaImageError::Decompress)?;
        inflated = out;
        &inflated
    } else {
        payload
    };

    if raw.len() < expected {
        return Err(MetaImageError::Truncated {
            expected,
            actual: raw.len(),
        });
    }

    Ok(raw[..expected]
        .chunks_exact(elem)
        .map(|b| header.element_type.decode(b, header.big_endian))
        .collect())
}

/// Read a `.mha` or `.mhd` file.
pub fn read(path: &Path) -> Result<MetaImage, MetaImageError> {
    let bytes = fs::read(path).map_err(|e| MetaImageError::io(path, e))?;
    let (header, offset) = parse_header(&bytes)?;
    debug!(
        "MetaImage {}: {}x{} x{} {} (compressed: {}, external: {:?})",
        path.display(),
        header.width,
        header.height,
        header.components,
        header.element_type.as_str(),
        header.compressed,
        header.data_file
    );

    let data = match &header.data_file {
        None => decode_payload(&header, &bytes[offset..])?,
        Some(name) => {
            let raw_path = path
                .parent()
                .map(|dir| dir.join(name))
                .unwrap_or_else(|| PathBuf::from(name));
            let raw = fs::read(&raw_path).map_err(|e| MetaImageError::io(&raw_path, e))?;
            let payload = match header.header_size {
                Some(-1) if !header.compressed => {
                    let n = header.payload_len()?;
                    &raw[raw.len().saturating_sub(n)..]
                }
                Some(skip) if skip > 0 => &raw[(skip as usize).min(raw.len())..],
                _ => &raw[..],
            };
            decode_payload(&header, payload)?
        }
    };

    Ok(MetaImage {
        width: header.width,
        height: header.height,
        components: header.components,
        data,
    })
}

/// Write a LOCAL `.mha` with MET_FLOAT little-endian data.
#[cfg(test)]
pub fn write(path: &Path, image: &MetaImage, compress: bool) -> Result<(), MetaImageError> {
    let expected = image.width * image.height * image.components;
    if image.data.len() != expected {
        return Err(MetaImageError::Truncated {
            expected,
            actual: image.data.len(),
        });
    }

    let mut raw = Vec::with_capacity(expected * 4);
    for v in &image.data {
        raw.extend_from_slice(&v.to_le_bytes());
    }
    let payload = if compress {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&raw).map_err(|e| MetaImageError::io(path, e))?;
        enc.finish().map_err(|e| MetaImageError::io(path, e))?
    } else {
        raw
    };

    let mut header = String::new();
    header.push_str("ObjectType = Image\n");
    header.push_str("NDims = 2\n");
    header.push_str("BinaryData = True\n");
    header.push_str("BinaryDataByteOrderMSB = False\n");
    header.push_str(&format!(
        "CompressedData = {}\n",
        if compress { "True" } else { "False" }
    ));
    if compress {
        header.push_str(&format!("CompressedDataSize = {}\n", payload.len()));
    }
    header.push_str(&format!("DimSize = {} {}\n", image.width, image.height));
    header.push_str(&format!(
        "ElementNumberOfChannels = {}\n",
        image.components
    ));
    header.push_str("ElementType = MET_FLOAT\n");
    header.push_str("ElementDataFile = LOCAL\n");

    let mut file = fs::File::create(path).map_err(|e| MetaImageError::io(path, e))?;
    file.write_all(header.as_bytes())
        .and_then(|_| file.write_all(&payload))
        .map_err(|e| MetaImageError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(lines: &[&str]) -> Vec<u8> {
        let mut s = lines.join("\n");
        s.push('\n');
        s.into_bytes()
    }

    #[test]
    fn parses_itk_vector_header() {
        let bytes = header_bytes(&[
            "ObjectType = Image",
            "NDims = 2",
            "BinaryData = True",
            "BinaryDataByteOrderMSB = False",
            "CompressedData = False",
            "TransformMatrix = 1 0 0 1",
            "Offset = 0 0",
            "ElementSpacing = 1 1",
            "DimSize = 4 3",
            "ElementNumberOfChannels = 3",
            "ElementType = MET_FLOAT",
            "ElementDataFile = LOCAL",
        ]);
        let (h, offset) = parse_header(&bytes).unwrap();
        assert_eq!((h.width, h.height, h.components), (4, 3, 3));
        assert_eq!(h.element_type, ElementType::Float);
        assert!(!h.big_endian && !h.compressed);
        assert_eq!(h.data_file, None);
        assert_eq!(offset, bytes.len());
    }

    #[test]
    fn single_slice_volume_is_accepted() {
        let bytes = header_bytes(&[
            "NDims = 3",
            "DimSize = 5 6 1",
            "ElementType = MET_SHORT",
            "ElementDataFile = field.raw",
        ]);
        let (h, _) = parse_header(&bytes).unwrap();
        assert_eq!((h.width, h.height, h.components), (5, 6, 1));
        assert_eq!(h.data_file.as_deref(), Some("field.raw"));
    }

    #[test]
    fn header_errors() {
        let missing = header_bytes(&["NDims = 2", "ElementType = MET_FLOAT", "ElementDataFile = LOCAL"]);
        assert!(matches!(parse_header(&missing), Err(MetaImageError::MissingKey("DimSize"))));

        let volume = header_bytes(&["NDims = 3", "DimSize = 2 2 2", "ElementType = MET_FLOAT", "ElementDataFile = LOCAL"]);
        assert!(matches!(parse_header(&volume), Err(MetaImageError::UnsupportedDimensions(_))));

        let bad_type = header_bytes(&["NDims = 2", "DimSize = 2 2", "ElementType = MET_BOOL", "ElementDataFile = LOCAL"]);
        assert!(matches!(parse_header(&bad_type), Err(MetaImageError::UnsupportedElementType(_))));

        let open = header_bytes(&["NDims = 2", "DimSize = 2 2"]);
        assert!(matches!(parse_header(&open), Err(MetaImageError::UnterminatedHeader)));
    }

    #[test]
    fn decodes_big_endian_ints() {
        let header = MetaHeader {
            width: 2,
            height: 1,
            components: 2,
            element_type: ElementType::Int,
            big_endian: true,
            compressed: false,
            header_size: None,
            data_file: None,
        };
        let mut payload = Vec::new();
        for v in [7i32, -3, 100, 0] {
            payload.extend_from_slice(&v.to_be_bytes());
        }
        assert_eq!(decode_payload(&header, &payload).unwrap(), vec![7.0, -3.0, 100.0, 0.0]);
        assert!(matches!(
            decode_payload(&header, &payload[..10]),
            Err(MetaImageError::Truncated { expected: 16, actual: 10 })
        ));
    }

    #[test]
    fn compressed_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nnf.mha");
        let image = MetaImage {
            width: 3,
            height: 2,
            components: 2,
            data: (0..12).map(|v| v as f32 * 0.5).collect(),
        };
        write(&path, &image, true).unwrap();
        assert_eq!(read(&path).unwrap(), image);
    }

    #[test]
    fn reads_mhd_with_external_raw() {
        let dir = tempfile::tempdir().unwrap();
        let raw: Vec<u8> = [1u16, 2, 3, 4].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut with_prefix = vec![0xAA; 6];
        with_prefix.extend_from_slice(&raw);
        fs::write(dir.path().join("data.raw"), &with_prefix).unwrap();
        fs::write(
            dir.path().join("data.mhd"),
            header_bytes(&[
                "NDims = 2",
                "DimSize = 2 1",
                "ElementNumberOfChannels = 2",
                "ElementType = MET_USHORT",
                "HeaderSize = 6",
                "ElementDataFile = data.raw",
            ]),
        )
        .unwrap();

        let img = read(&dir.path().join("data.mhd")).unwrap();
        assert_eq!(img.data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        let mut bytes = header_bytes(&[
            "NDims = 2",
            "DimSize = 4294967296 4294967296",
            "ElementNumberOfChannels = 2",
            "ElementType = MET_FLOAT",
            "ElementDataFile = LOCAL",
        ]);
        bytes.extend_from_slice(&[0u8; 16]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.mha");
        fs::write(&path, &bytes).unwrap();
        match read(&path) {
            Err(MetaImageError::InvalidValue { key, .. }) => assert_eq!(key, "DimSize"),
            other => panic!("expected InvalidValue, got {:?}", other.map(|i| i.width)),
        }
    }

    #[test]
    fn compressed_payload_inflates_only_what_is_needed() {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&[0u8; 4096]).unwrap();
        let payload = enc.finish().unwrap();
        let (header, _) = parse_header(&header_bytes(&[
            "NDims = 2",
            "DimSize = 2 1",
            "ElementNumberOfChannels = 2",
            "ElementType = MET_FLOAT",
            "CompressedData = True",
            "ElementDataFile = LOCAL",
        ]))
        .unwrap();
        assert_eq!(header.payload_len().unwrap(), 16);
        assert_eq!(decode_payload(&header, &payload).unwrap(), vec![0.0; 4]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read(Path::new("/definitely/not/here.mha")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.mha"));
    }
}
