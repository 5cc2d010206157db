//! Decoded vertex geometry.
//!
//! A [`Geometry`] is a read-only bag of named, flat `f32` attribute buffers,
//! ready to be uploaded as vertex buffers by a renderer. It always contains
//! `position` unless the source was an unsupported (binary) file.

use glam::Vec3;

/// A flat attribute buffer with `item_size` components per vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub data: Vec<f32>,
    pub item_size: usize,
}

impl Attribute {
    pub fn new(data: Vec<f32>, item_size: usize) -> Self {
        Self { data, item_size }
    }

    /// Number of vertices covered by this buffer.
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.data.len() / self.item_size
        }
    }

    /// View a 3-component buffer as vectors.
    fn as_vec3s(&self) -> Option<Vec<Vec3>> {
        if self.item_size != 3 {
            return None;
        }
        let triples: &[[f32; 3]] = bytemuck::try_cast_slice(&self.data).ok()?;
        Some(triples.iter().copied().map(Vec3::from_array).collect())
    }
}

/// Axis-aligned bounds of a point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Compute bounds over the points, ignoring any point with a NaN coordinate.
    ///
    /// Returns `None` when no usable point remains.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let mut usable = points.iter().filter(|p| !p.is_nan());
        let first = *usable.next()?;

        let (min, max) = usable.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    /// Center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Diagonal length of the box.
    pub fn size(&self) -> f32 {
        (self.max - self.min).length()
    }
}

/// Named vertex attributes decoded from a PLY file.
///
/// Attributes keep insertion order: `position`, then `normal` when present,
/// then generic attributes in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    attributes: Vec<(String, Attribute)>,
}

impl Geometry {
    /// Add or replace an attribute.
    pub(crate) fn insert(&mut self, name: impl Into<String>, attribute: Attribute) {
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = attribute,
            None => self.attributes.push((name, attribute)),
        }
    }

    /// Get an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    /// Check if an attribute exists.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, attribute)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(n, a)| (n.as_str(), a))
    }

    /// True for the empty result returned for unsupported formats.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of vertices, taken from the `position` buffer.
    pub fn vertex_count(&self) -> usize {
        self.get("position").map_or(0, Attribute::count)
    }

    /// Vertex positions as vectors.
    pub fn positions(&self) -> Option<Vec<Vec3>> {
        self.get("position")?.as_vec3s()
    }

    /// Vertex normals as vectors, if the file declared `nx`, `ny` and `nz`.
    pub fn normals(&self) -> Option<Vec<Vec3>> {
        self.get("normal")?.as_vec3s()
    }

    /// Bounding box of the positions.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.positions()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Geometry {
        let mut geometry = Geometry::default();
        geometry.insert(
            "position",
            Attribute::new(vec![-1.0, 0.0, 2.0, 3.0, 4.0, -5.0], 3),
        );
        geometry.insert("intensity", Attribute::new(vec![0.25, 0.75], 1));
        geometry
    }

    #[test]
    fn test_attribute_count() {
        let geometry = sample();
        assert_eq!(geometry.vertex_count(), 2);
        assert_eq!(geometry.get("intensity").unwrap().count(), 2);
        assert_eq!(Attribute::new(vec![1.0], 0).count(), 0);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut geometry = sample();
        geometry.insert("position", Attribute::new(vec![0.0; 3], 3));

        let names: Vec<&str> = geometry.attribute_names().collect();
        assert_eq!(names, vec!["position", "intensity"]);
        assert_eq!(geometry.vertex_count(), 1);
    }

    #[test]
    fn test_positions_as_vectors() {
        let geometry = sample();
        let positions = geometry.positions().unwrap();

        assert_eq!(positions, vec![Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, -5.0)]);
        assert!(geometry.normals().is_none());
    }

    #[test]
    fn test_bounds() {
        let bounds = sample().bounds().unwrap();

        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -5.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 4.0, 2.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 2.0, -1.5));
        assert!((bounds.size() - 9.0).abs() < 0.001);
    }

    #[test]
    fn test_bounds_skip_nan() {
        let points = [
            Vec3::new(f32::NAN, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(2.0, -1.0, 0.0),
        ];
        let bounds = Bounds::from_points(&points).unwrap();

        assert_eq!(bounds.min, Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 1.0, 1.0));
        assert!(Bounds::from_points(&points[..1]).is_none());
    }

    #[test]
    fn test_empty_geometry() {
        let geometry = Geometry::default();
        assert!(geometry.is_empty());
        assert_eq!(geometry.vertex_count(), 0);
        assert!(geometry.bounds().is_none());
    }
}
