//! Top-level PLY parsing entry points.
//!
//! Takes the complete bytes of a PLY file and returns the decoded vertex
//! [`Geometry`]. Only ASCII bodies are decoded; any other format yields an
//! empty geometry and a warning.

use serde::{Deserialize, Serialize};

use crate::body::{decode_vertices, BlankLines};
use crate::error::{PlyError, PlyResult};
use crate::geometry::Geometry;
use crate::header::scan_header;

/// Options controlling how a PLY body is decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub blank_lines: BlankLines,
}

impl LoadOptions {
    /// Skip blank lines in the body instead of giving each one a row.
    pub fn skip_blank_lines(mut self) -> Self {
        self.blank_lines = BlankLines::Skip;
        self
    }
}

/// Parse a PLY file from its raw bytes with default options.
///
/// # Example
///
/// ```
/// let data = b"ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n4 5 6\n";
/// let geometry = ply_loader::parse(data).unwrap();
/// assert_eq!(geometry.get("position").unwrap().data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// ```
pub fn parse(data: &[u8]) -> PlyResult<Geometry> {
    parse_with_options(data, &LoadOptions::default())
}

/// Parse a PLY file from its raw bytes.
///
/// Bytes are decoded as UTF-8, replacing invalid sequences.
///
/// # Errors
///
/// Fails on a malformed header, a missing `vertex` element, a missing
/// `x`/`y`/`z` property or a truncated body. A non-ASCII format is not an
/// error: the result is an empty [`Geometry`].
pub fn parse_with_options(data: &[u8], options: &LoadOptions) -> PlyResult<Geometry> {
    let text = String::from_utf8_lossy(data);
    parse_str_with_options(&text, options)
}

/// Parse PLY text with default options.
pub fn parse_str(content: &str) -> PlyResult<Geometry> {
    parse_str_with_options(content, &LoadOptions::default())
}

/// Parse PLY text.
pub fn parse_str_with_options(content: &str, options: &LoadOptions) -> PlyResult<Geometry> {
    // Format first: an unsupported file without end_header is still not an error.
    let (header, terminated) = scan_header(content)?;

    if !header.is_ascii() {
        log::warn!(
            "Only ASCII PLY is supported, got format '{}'; returning empty geometry",
            header.format
        );
        return Ok(Geometry::default());
    }
    if !terminated {
        return Err(PlyError::MissingEndHeader);
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let geometry = decode_vertices(&header, &lines, options.blank_lines)?;

    log::info!(
        "Loaded PLY: {} vertices, {} attributes",
        geometry.vertex_count(),
        geometry.attribute_names().count()
    );

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_vertex_positions() {
        let ply = "ply
format ascii 1.0
element vertex 2
property float x
property float y
property float z
end_header
1 2 3
4 5 6
";
        let geometry = parse(ply.as_bytes()).unwrap();

        assert_eq!(
            geometry.get("position").unwrap().data,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert_eq!(geometry.vertex_count(), 2);
        assert!(!geometry.has("normal"));
    }

    #[test]
    fn test_synthetic_cloud_with_normals_and_custom() {
        let rows = 25;
        let mut ply = String::from(
            "ply\nformat ascii 1.0\ncomment synthetic\nelement vertex 25\n\
             property float x\nproperty float y\nproperty float z\n\
             property float nx\nproperty float ny\nproperty float nz\n\
             property float custom1\nend_header\n",
        );
        for i in 0..rows {
            ply.push_str(&format!(
                "{} {} {} 0 0 1 {}\n",
                i,
                i * 2,
                i * 3,
                i * 10
            ));
        }

        let geometry = parse_str(&ply).unwrap();

        assert_eq!(geometry.get("position").unwrap().data.len(), 3 * rows);
        assert_eq!(geometry.get("normal").unwrap().data.len(), 3 * rows);

        let custom = geometry.get("custom1").unwrap();
        assert_eq!(custom.item_size, 1);
        let expected: Vec<f32> = (0..rows).map(|i| (i * 10) as f32).collect();
        assert_eq!(custom.data, expected);

        let positions = geometry.positions().unwrap();
        assert_eq!(positions[24], glam::Vec3::new(24.0, 48.0, 72.0));
    }

    #[test]
    fn test_binary_format_yields_empty() {
        let mut data =
            b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n"
                .to_vec();
        data.extend_from_slice(&1.0f32.to_le_bytes());
        data.extend_from_slice(&[0xff, 0xfe, 0x00, 0x80]);

        let geometry = parse(&data).unwrap();
        assert!(geometry.is_empty());
        assert!(!geometry.has("position"));
    }

    #[test]
    fn test_unterminated_header() {
        let binary = "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\n";
        assert!(parse_str(binary).unwrap().is_empty());

        let ascii = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n";
        assert_eq!(parse_str(ascii), Err(PlyError::MissingEndHeader));
    }

    #[test]
    fn test_missing_format_yields_empty() {
        let geometry = parse_str("ply\nelement vertex 0\nend_header\n").unwrap();
        assert!(geometry.is_empty());
    }

    #[test]
    fn test_header_errors_surface_before_format_check() {
        let ply = "ply\nformat binary_big_endian 1.0\nproperty float x\nend_header\n";
        assert!(matches!(
            parse_str(ply),
            Err(PlyError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut data = b"ply\nformat ascii 1.0\ncomment ".to_vec();
        data.push(0xc3);
        data.extend_from_slice(
            b"\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n",
        );

        let geometry = parse(&data).unwrap();
        assert_eq!(geometry.vertex_count(), 1);
    }

    #[test]
    fn test_options_select_blank_line_mode() {
        let ply = "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n\n1 2 3\n4 5 6\n";

        let positional = parse_str(ply).unwrap();
        assert_eq!(
            positional.get("position").unwrap().data,
            vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]
        );

        let options = LoadOptions::default().skip_blank_lines();
        let skipped = parse_str_with_options(ply, &options).unwrap();
        assert_eq!(
            skipped.get("position").unwrap().data,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: LoadOptions = serde_json::from_str(r#"{"blank_lines": "skip"}"#).unwrap();
        assert_eq!(options.blank_lines, BlankLines::Skip);

        let options: LoadOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, LoadOptions::default());
    }

    #[test]
    fn test_vertex_after_face_reads_from_first_data_line() {
        let ply = "ply
format ascii 1.0
element face 0
property list uchar int vertex_indices
element vertex 1
property float x
property float y
property float z
end_header
7 8 9
";
        let geometry = parse_str(ply).unwrap();
        assert_eq!(geometry.get("position").unwrap().data, vec![7.0, 8.0, 9.0]);
    }
}
