//! Grouping of stroke width pixels into connected components.
//!
//! Every pixel with an assigned width is a vertex. Two neighbouring vertices are
//! joined when their widths differ by at most the configured ratio. Components are
//! the connected components of that graph, found with a disjoint-set forest.

use crate::processors::geometry::{PixelCoord, StrokeSample};
use crate::processors::stroke_width::StrokeWidthMap;

/// Pixels of one connected region of consistent stroke width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    pub pixels: Vec<PixelCoord>,
}

impl Component {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The component's pixels with their widths read from `map`.
    pub fn samples<'a>(&'a self, map: &'a StrokeWidthMap) -> impl Iterator<Item = StrokeSample> + 'a {
        self.pixels.iter().filter_map(|&coord| {
            map.width_at(coord.x, coord.y)
                .map(|width| StrokeSample { coord, width })
        })
    }
}

/// Disjoint-set forest with path halving and union by size.
#[derive(Debug, Clone)]
struct DisjointSet {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut v: u32) -> u32 {
        while self.parent[v as usize] != v {
            let grandparent = self.parent[self.parent[v as usize] as usize];
            self.parent[v as usize] = grandparent;
            v = grandparent;
        }
        v
    }

    fn union(&mut self, a: u32, b: u32) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra as usize] < self.size[rb as usize] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb as usize] = ra;
        self.size[ra as usize] += self.size[rb as usize];
    }
}

/// Neighbours checked for every pixel; together they cover all 8-neighbours once.
const FORWARD_NEIGHBOURS: [(i64, i64); 4] = [(1, 0), (1, 1), (0, 1), (-1, 1)];

/// Vertex and edge sets of the stroke width pixel graph.
#[derive(Debug, Clone)]
pub struct PixelGraph {
    width: u32,
    /// Dense pixel index into `vertices`.
    index: Vec<Option<u32>>,
    vertices: Vec<PixelCoord>,
    edges: Vec<(u32, u32)>,
}

impl PixelGraph {
    /// Builds the graph of `map`.
    ///
    /// # Arguments
    ///
    /// * `map` - Refined stroke width map.
    /// * `max_ratio` - Neighbours are joined when `max(w) / min(w) <= max_ratio`.
    pub fn build(map: &StrokeWidthMap, max_ratio: f32) -> Self {
        let (width, height) = (map.width(), map.height());
        let mut index = vec![None; width as usize * height as usize];
        let mut vertices = Vec::new();
        for sample in map.samples() {
            let i = sample.coord.y as usize * width as usize + sample.coord.x as usize;
            index[i] = Some(vertices.len() as u32);
            vertices.push(sample.coord);
        }

        let mut edges = Vec::new();
        for (v, coord) in vertices.iter().enumerate() {
            let Some(w) = map.width_at(coord.x, coord.y) else {
                continue;
            };
            for (dx, dy) in FORWARD_NEIGHBOURS {
                let (nx, ny) = (coord.x as i64 + dx, coord.y as i64 + dy);
                if nx < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                let Some(nw) = map.width_at(nx, ny) else {
                    continue;
                };
                if w.max(nw) / w.min(nw) <= max_ratio
                    && let Some(n) = index[ny as usize * width as usize + nx as usize]
                {
                    edges.push((v as u32, n));
                }
            }
        }

        Self {
            width,
            index,
            vertices,
            edges,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertex id of a pixel, if it has a width.
    pub fn vertex_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width {
            return None;
        }
        self.index
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .flatten()
    }

    /// Connected components, ordered by their first vertex in row-major order.
    pub fn connected_components(&self) -> Vec<Component> {
        let mut sets = DisjointSet::new(self.vertices.len());
        for &(a, b) in &self.edges {
            sets.union(a, b);
        }

        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut components: Vec<Component> = Vec::new();
        for (v, &coord) in self.vertices.iter().enumerate() {
            let root = sets.find(v as u32) as usize;
            let slot = *slot_of_root[root].get_or_insert_with(|| {
                components.push(Component::default());
                components.len() - 1
            });
            components[slot].pixels.push(coord);
        }
        components
    }
}

/// Groups the pixels of `map` into connected components of consistent width.
pub fn find_components(map: &StrokeWidthMap, max_ratio: f32) -> Vec<Component> {
    PixelGraph::build(map, max_ratio).connected_components()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from_rows(rows: &[&[f32]]) -> StrokeWidthMap {
        let mut map = StrokeWidthMap::new(rows[0].len() as u32, rows.len() as u32);
        for (y, row) in rows.iter().enumerate() {
            for (x, &w) in row.iter().enumerate() {
                if w > 0.0 {
                    map.set_min(x as u32, y as u32, w);
                }
            }
        }
        map
    }

    #[test]
    fn test_diagonal_neighbours_connect() {
        let map = map_from_rows(&[
            &[2.0, 0.0, 0.0, 2.0],
            &[0.0, 2.0, 2.0, 0.0],
            &[0.0, 0.0, 0.0, 0.0],
        ]);
        let components = find_components(&map, 3.0);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 4);
    }

    #[test]
    fn test_width_ratio_splits_components() {
        let map = map_from_rows(&[&[1.0, 1.0, 4.0, 4.0]]);
        let components = find_components(&map, 3.0);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].pixels, vec![PixelCoord::new(0, 0), PixelCoord::new(1, 0)]);

        // Exactly 3.0 still joins.
        let map = map_from_rows(&[&[1.0, 3.0]]);
        assert_eq!(find_components(&map, 3.0).len(), 1);
    }

    #[test]
    fn test_components_partition_set_pixels() {
        let map = map_from_rows(&[
            &[1.0, 1.0, 0.0, 5.0, 5.0],
            &[0.0, 0.0, 0.0, 0.0, 5.0],
            &[2.0, 0.0, 9.0, 0.0, 0.0],
            &[2.0, 2.0, 0.0, 0.0, 1.0],
        ]);
        let graph = PixelGraph::build(&map, 3.0);
        let components = graph.connected_components();

        let mut seen: Vec<PixelCoord> = components.iter().flat_map(|c| c.pixels.clone()).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(total, seen.len());
        assert_eq!(total, map.set_count());
        assert_eq!(graph.vertex_count(), map.set_count());
        assert_eq!(components.len(), 5);
        // First vertex order: (0,0), (3,0), (0,2), (2,2), (4,3)
        assert_eq!(components[1].pixels[0], PixelCoord::new(3, 0));
        assert_eq!(components[4].pixels, vec![PixelCoord::new(4, 3)]);
    }

    #[test]
    fn test_vertex_lookup() {
        let map = map_from_rows(&[&[0.0, 3.0], &[3.0, 0.0]]);
        let graph = PixelGraph::build(&map, 3.0);
        assert_eq!(graph.vertex_at(1, 0), Some(0));
        assert_eq!(graph.vertex_at(0, 1), Some(1));
        assert_eq!(graph.vertex_at(0, 0), None);
        assert_eq!(graph.vertex_at(2, 0), None);
        assert_eq!(graph.edge_count(), 1);
    }
}
