//! PLY header parser.
//!
//! Scans the line-oriented preamble up to `end_header` and records the
//! format tag, comments and the ordered element/property declarations.
//!
//! # Supported Directives
//!
//! - `format <fmt> <version>`
//! - `comment <free text>`
//! - `element <name> <count>`
//! - `property <type...> <name>` (the name is always the last token, so
//!   `property list uchar int vertex_indices` declares `vertex_indices`)
//!
//! Any other leading token (including the `ply` magic line) is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{PlyError, PlyResult};

/// A single typed scalar column declared on an element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Declared type token (`float`, `uchar`, `list`, ...). Informational only.
    #[serde(rename = "type")]
    pub data_type: String,

    pub name: String,
}

/// A named group of rows, e.g. `vertex` or `face`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,

    /// Number of data rows belonging to this element.
    pub count: usize,

    /// Properties in declaration order.
    pub properties: Vec<Property>,
}

impl Element {
    /// Position of the first property called `name`.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    /// Check if the element declares a property called `name`.
    pub fn has_property(&self, name: &str) -> bool {
        self.property_index(name).is_some()
    }
}

/// Structured description of a PLY preamble.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Format tag (`ascii`, `binary_little_endian`, ...). Empty when absent.
    pub format: String,

    /// Format version string. Empty when absent.
    pub version: String,

    /// Comment lines in source order.
    pub comments: Vec<String>,

    /// Elements in declaration order.
    pub elements: Vec<Element>,

    /// Number of lines consumed by the header, including `end_header`.
    /// This is also the index of the first data line.
    pub header_length: usize,
}

impl Header {
    /// Check whether the body is ASCII encoded.
    pub fn is_ascii(&self) -> bool {
        self.format == "ascii"
    }

    /// Find an element by name.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// One classified header line.
#[derive(Debug, PartialEq)]
enum HeaderLine<'a> {
    Format {
        format: Option<&'a str>,
        version: Option<&'a str>,
    },
    Comment(String),
    Element {
        name: &'a str,
        count: usize,
    },
    Property {
        data_type: &'a str,
        name: &'a str,
    },
    EndHeader,
    /// `ply`, `obj_info`, blank lines and anything else we don't handle.
    Ignored,
}

impl<'a> HeaderLine<'a> {
    /// Classify an already trimmed line. `line_num` is 1-based.
    fn classify(line: &'a str, line_num: usize) -> PlyResult<Self> {
        if line == "end_header" {
            return Ok(Self::EndHeader);
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(Self::Ignored);
        };

        let parsed = match keyword {
            "format" => Self::Format {
                format: tokens.next(),
                version: tokens.next(),
            },
            "comment" => Self::Comment(tokens.collect::<Vec<_>>().join(" ")),
            "element" => {
                let name = tokens
                    .next()
                    .ok_or_else(|| PlyError::malformed(line_num, "element line has no name"))?;
                let count = tokens.next().ok_or_else(|| {
                    PlyError::malformed(line_num, format!("element '{}' has no count", name))
                })?;
                let count = parse_count(count).ok_or_else(|| {
                    PlyError::malformed(
                        line_num,
                        format!("element '{}' has invalid count '{}'", name, count),
                    )
                })?;
                Self::Element { name, count }
            }
            "property" => {
                let rest: Vec<&str> = tokens.collect();
                match (rest.first(), rest.last()) {
                    (Some(&data_type), Some(&name)) => Self::Property { data_type, name },
                    _ => {
                        return Err(PlyError::malformed(
                            line_num,
                            "property line has no type or name",
                        ))
                    }
                }
            }
            _ => Self::Ignored,
        };

        Ok(parsed)
    }
}

/// Parse an element count from its leading decimal digits.
///
/// `"3"`, `"+3"`, `"1.0"` and `"3abc"` are accepted (as 3, 3, 1 and 3);
/// negative counts and tokens without leading digits are not.
fn parse_count(token: &str) -> Option<usize> {
    let digits = token.strip_prefix('+').unwrap_or(token);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Parse the header of an ASCII PLY document.
///
/// Lines are split on `\n` and trimmed before interpretation. Scanning stops
/// at the first `end_header` line; nothing after it is inspected. The format
/// is not validated here, so a binary header parses just as well.
///
/// # Errors
///
/// - [`PlyError::MalformedHeader`] for a `property` line before any
///   `element`, or an element without a valid count
/// - [`PlyError::MissingEndHeader`] if the text has no `end_header` line
pub fn parse_header(content: &str) -> PlyResult<Header> {
    match scan_header(content)? {
        (header, true) => Ok(header),
        (_, false) => Err(PlyError::MissingEndHeader),
    }
}

/// Scan header directives, returning what was read and whether an
/// `end_header` line terminated it.
pub(crate) fn scan_header(content: &str) -> PlyResult<(Header, bool)> {
    let mut header = Header::default();

    for (i, raw) in content.split('\n').enumerate() {
        let line_num = i + 1;

        match HeaderLine::classify(raw.trim(), line_num)? {
            HeaderLine::EndHeader => {
                header.header_length = line_num;
                log::debug!(
                    "PLY header: format={} elements={} comments={} length={}",
                    header.format,
                    header.elements.len(),
                    header.comments.len(),
                    header.header_length
                );
                return Ok((header, true));
            }
            HeaderLine::Format { format, version } => {
                header.format = format.unwrap_or_default().to_string();
                header.version = version.unwrap_or_default().to_string();
            }
            HeaderLine::Comment(text) => header.comments.push(text),
            HeaderLine::Element { name, count } => header.elements.push(Element {
                name: name.to_string(),
                count,
                properties: Vec::new(),
            }),
            HeaderLine::Property { data_type, name } => {
                let element = header.elements.last_mut().ok_or_else(|| {
                    PlyError::malformed(
                        line_num,
                        format!("property '{}' declared before any element", name),
                    )
                })?;
                element.properties.push(Property {
                    data_type: data_type.to_string(),
                    name: name.to_string(),
                });
            }
            HeaderLine::Ignored => {}
        }
    }

    Ok((header, false))
}
