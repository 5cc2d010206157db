//! ASCII body decoding for the `vertex` element.
//!
//! Decoding happens in two phases. Rows are first written into a
//! column store, one `f32` column per declared property. The columns are
//! then assembled into an immutable [`Geometry`]: `x,y,z` become `position`,
//! `nx,ny,nz` become `normal`, and every other non-color property is passed
//! through as a 1-component attribute.

use serde::{Deserialize, Serialize};

use crate::error::{PlyError, PlyResult};
use crate::geometry::{Attribute, Geometry};
use crate::header::{Element, Header};

/// Name of the only element this decoder reads.
pub const VERTEX_ELEMENT: &str = "vertex";

/// Property names never exposed as generic attributes.
pub const RESERVED_PROPERTIES: [&str; 10] = [
    "x", "y", "z", "nx", "ny", "nz", "red", "green", "blue", "alpha",
];

const POSITION_COLUMNS: [&str; 3] = ["x", "y", "z"];
const NORMAL_COLUMNS: [&str; 3] = ["nx", "ny", "nz"];

/// How blank lines inside the vertex body are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankLines {
    /// Row `i` always comes from data line `i`. A blank line leaves its row
    /// zero-filled and still uses up the slot, so a file with `N` blank
    /// lines among `count` rows never reads its last `N` data lines.
    #[default]
    Positional,

    /// Blank lines are skipped without using a row slot; `count` non-blank
    /// lines are read.
    Skip,
}

/// Write-phase column storage for one element.
///
/// Each declared property maps positionally to a column slot, built once
/// from the header. Duplicate property names share one column, so the last
/// declaration wins per row.
#[derive(Debug)]
pub(crate) struct ColumnStore {
    names: Vec<String>,
    columns: Vec<Vec<f32>>,
    /// Column index for each declared property, in declaration order.
    slots: Vec<usize>,
    rows: usize,
}

impl ColumnStore {
    /// Allocate zero-filled columns for every property of `element`.
    pub(crate) fn new(element: &Element) -> Self {
        let rows = element.count;
        let mut names: Vec<String> = Vec::new();
        let mut columns = Vec::new();
        let mut slots = Vec::with_capacity(element.properties.len());

        for property in &element.properties {
            let slot = match names.iter().position(|n| *n == property.name) {
                Some(existing) => existing,
                None => {
                    names.push(property.name.clone());
                    columns.push(vec![0.0; rows]);
                    names.len() - 1
                }
            };
            slots.push(slot);
        }

        Self {
            names,
            columns,
            slots,
            rows,
        }
    }

    /// Number of rows each column holds.
    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    /// Decode one data line into row `row`.
    ///
    /// Tokens are matched to properties by position. Missing tokens and
    /// tokens with no numeric prefix store `NaN`; extra tokens are ignored.
    /// `row` must be below [`ColumnStore::rows`].
    pub(crate) fn write_row(&mut self, row: usize, line: &str) {
        let mut tokens = line.split_whitespace();
        for &slot in &self.slots {
            let value = tokens.next().map_or(f32::NAN, parse_float);
            self.columns[slot][row] = value;
        }
    }

    /// Borrow a column by property name.
    pub(crate) fn column(&self, name: &str) -> Option<&[f32]> {
        let index = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[index])
    }

    fn has_all(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.column(n).is_some())
    }

    /// Interleave three columns into an `xyz xyz ...` buffer.
    fn interleave(&self, names: &[&str; 3]) -> PlyResult<Vec<f32>> {
        let mut parts: [&[f32]; 3] = [&[]; 3];
        for (part, name) in parts.iter_mut().zip(names) {
            *part = self
                .column(name)
                .ok_or_else(|| PlyError::MissingProperty(name.to_string()))?;
        }

        let mut out = Vec::with_capacity(self.rows * 3);
        for i in 0..self.rows {
            out.push(parts[0][i]);
            out.push(parts[1][i]);
            out.push(parts[2][i]);
        }
        Ok(out)
    }

    /// Assemble the read-phase geometry.
    ///
    /// # Errors
    ///
    /// [`PlyError::MissingProperty`] if `x`, `y` or `z` was not declared.
    pub(crate) fn into_geometry(self) -> PlyResult<Geometry> {
        let mut geometry = Geometry::default();

        let position = self.interleave(&POSITION_COLUMNS)?;
        geometry.insert("position", Attribute::new(position, 3));

        if self.has_all(&NORMAL_COLUMNS) {
            let normal = self.interleave(&NORMAL_COLUMNS)?;
            geometry.insert("normal", Attribute::new(normal, 3));
        }

        for (name, column) in self.names.into_iter().zip(self.columns) {
            if RESERVED_PROPERTIES.contains(&name.as_str()) {
                continue;
            }
            geometry.insert(name, Attribute::new(column, 1));
        }

        Ok(geometry)
    }
}

/// Decode the `vertex` element rows that follow the header.
///
/// `lines` is the whole document split on `\n`; reading starts at
/// `header.header_length`.
///
/// # Errors
///
/// - [`PlyError::MissingElement`] if no `vertex` element is declared
/// - [`PlyError::MissingProperty`] if `x`, `y` or `z` is not declared
/// - [`PlyError::UnexpectedEof`] if the lines run out before `count` rows
pub fn decode_vertices(
    header: &Header,
    lines: &[&str],
    blank_lines: BlankLines,
) -> PlyResult<Geometry> {
    let vertex = header
        .element(VERTEX_ELEMENT)
        .ok_or_else(|| PlyError::MissingElement(VERTEX_ELEMENT.to_string()))?;

    if header.elements.first().map(|e| e.name.as_str()) != Some(VERTEX_ELEMENT) {
        log::warn!(
            "PLY vertex element is not declared first; reading its rows from line {} anyway",
            header.header_length + 1
        );
    }

    // Every row needs its own line, so a count the body cannot hold is
    // rejected before the columns are allocated.
    let start = header.header_length;
    if vertex.count > lines.len().saturating_sub(start) {
        return Err(PlyError::UnexpectedEof {
            line: lines.len() + 1,
            expected_rows: vertex.count,
        });
    }

    let mut store = ColumnStore::new(vertex);
    let eof = |index: usize| PlyError::UnexpectedEof {
        line: index + 1,
        expected_rows: vertex.count,
    };

    match blank_lines {
        BlankLines::Positional => {
            for row in 0..store.rows() {
                let index = start + row;
                let line = lines.get(index).ok_or_else(|| eof(index))?.trim();
                if line.is_empty() {
                    continue;
                }
                store.write_row(row, line);
            }
        }
        BlankLines::Skip => {
            let mut cursor = start;
            for row in 0..store.rows() {
                let line = loop {
                    let line = lines.get(cursor).ok_or_else(|| eof(cursor))?.trim();
                    cursor += 1;
                    if !line.is_empty() {
                        break line;
                    }
                };
                store.write_row(row, line);
            }
        }
    }

    let geometry = store.into_geometry()?;
    log::debug!(
        "Decoded {} vertices with attributes {:?}",
        vertex.count,
        geometry.attribute_names().collect::<Vec<_>>()
    );
    Ok(geometry)
}

/// Lenient decimal parse: uses the longest numeric prefix of `token`.
///
/// `"1.5e3"`, `"-2"`, `".5"` and `"Infinity"` parse; `"3.2abc"` gives `3.2`;
/// a token with no numeric prefix gives `NaN`.
pub fn parse_float(token: &str) -> f32 {
    let bytes = token.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if token[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        };
    }

    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = digits(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return f32::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    // Parse at double precision then narrow, matching a float32 buffer store.
    token[..end].parse::<f64>().map_or(f32::NAN, |v| v as f32)
}
