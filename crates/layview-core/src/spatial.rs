use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::{BBox, Point};

/// An entry in the R-tree spatial index, referencing a drawn primitive by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into the owning renderer's primitive list.
    pub index: usize,
    /// Bounding box of the primitive.
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Spatial index for point queries and overall bounds of rendered primitives.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.len())
            .finish()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
        }
    }

    /// Build the index from a list of primitive bounding boxes.
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Insert a single entry.
    pub fn insert(&mut self, entry: SpatialEntry) {
        self.tree.insert(entry);
    }

    /// Find all entries whose bounding box contains the given point, edges included.
    pub fn query_point(&self, point: &Point) -> Vec<&SpatialEntry> {
        let at = AABB::from_point([point.x, point.y]);
        self.tree
            .locate_in_envelope_intersecting(&at)
            .collect()
    }

    /// Find all entries that intersect with the given region.
    pub fn query_region(&self, region: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners(
            [region.min.x, region.min.y],
            [region.max.x, region.max.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Bounding box of everything in the index.
    pub fn bounds(&self) -> Option<BBox> {
        if self.is_empty() {
            return None;
        }
        let envelope = self.tree.root().envelope();
        let (min, max) = (envelope.lower(), envelope.upper());
        Some(BBox::new(Point::new(min[0], min[1]), Point::new(max[0], max[1])))
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
