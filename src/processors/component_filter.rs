//! Geometric filtering of raw components into character candidates.
//!
//! A first pass drops components by stroke width variance, height, position and
//! rotated aspect ratio. A second pass drops components that overlap several
//! other survivors, counted by [`NestedRule`].

use crate::core::config::{ComponentFilterConfig, LogCategories, NestedRule};
use crate::processors::components::Component;
use crate::processors::geometry::{
    PixelBox, PixelCoord, Point, RotatedExtent, min_area_extent, ratio_within,
};
use crate::processors::stroke_width::StrokeWidthMap;
use tracing::debug;

/// Stroke width statistics and extent of a raw component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStats {
    pub mean: f32,
    pub variance: f32,
    /// Element at index `len / 2` of the sorted widths.
    pub median: f32,
    pub bbox: PixelBox,
}

impl ComponentStats {
    /// Computes statistics over the pixels of `component`, or `None` when none has a width.
    pub fn compute(component: &Component, map: &StrokeWidthMap) -> Option<Self> {
        let mut widths: Vec<f32> = component.samples(map).map(|s| s.width).collect();
        if widths.is_empty() {
            return None;
        }
        let bbox = PixelBox::enclosing(&component.pixels)?;

        let count = widths.len() as f32;
        let mean = widths.iter().sum::<f32>() / count;
        let variance = widths.iter().map(|w| (w - mean) * (w - mean)).sum::<f32>() / count;
        widths.sort_unstable_by(f32::total_cmp);
        let median = widths[widths.len() / 2];

        Some(Self {
            mean,
            variance,
            median,
            bbox,
        })
    }
}

/// A component that passed the geometry filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidComponent {
    pub pixels: Vec<PixelCoord>,
    pub bbox: PixelBox,
    pub center: Point,
    pub median: f32,
    /// Minimal-area rotated box of the pixels.
    pub rotated: RotatedExtent,
}

impl ValidComponent {
    /// Number of columns covered by the bounding box.
    pub fn width(&self) -> u32 {
        self.bbox.width()
    }

    /// Number of rows covered by the bounding box.
    pub fn height(&self) -> u32 {
        self.bbox.height()
    }
}

/// Components accepted by the filter. Indices into this set identify components
/// in chains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSet {
    components: Vec<ValidComponent>,
}

impl ComponentSet {
    pub fn new(components: Vec<ValidComponent>) -> Self {
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ValidComponent> {
        self.components.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidComponent> {
        self.components.iter()
    }

    pub fn centers(&self) -> Vec<Point> {
        self.components.iter().map(|c| c.center).collect()
    }
}

impl std::ops::Index<usize> for ComponentSet {
    type Output = ValidComponent;

    fn index(&self, index: usize) -> &ValidComponent {
        &self.components[index]
    }
}

/// Reason a component was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Variance,
    FontHeight,
    Border,
    AspectRatio,
    Nested,
}

/// Geometry filter bound to one image.
#[derive(Debug, Clone)]
pub struct ComponentFilter<'a> {
    config: &'a ComponentFilterConfig,
    image_height: u32,
    top_border: u32,
    bottom_border: u32,
    log: LogCategories,
}

impl<'a> ComponentFilter<'a> {
    pub fn new(config: &'a ComponentFilterConfig, image_height: u32) -> Self {
        Self {
            config,
            image_height,
            top_border: 0,
            bottom_border: 0,
            log: LogCategories::none(),
        }
    }

    /// Ignore components reaching into the top or bottom rows.
    pub fn with_borders(mut self, top: u32, bottom: u32) -> Self {
        self.top_border = top;
        self.bottom_border = bottom;
        self
    }

    pub fn with_log(mut self, log: LogCategories) -> Self {
        self.log = log;
        self
    }

    /// Applies both filter passes. Surviving components keep their relative order.
    pub fn filter(&self, components: Vec<Component>, map: &StrokeWidthMap) -> ComponentSet {
        let candidates: Vec<ValidComponent> = components
            .into_iter()
            .enumerate()
            .filter_map(|(i, component)| match self.check(component, map) {
                Ok(valid) => Some(valid),
                Err(reason) => {
                    if self.log.components {
                        debug!(component = i, ?reason, "component rejected");
                    }
                    None
                }
            })
            .collect();

        if !self.config.reject_nested {
            return ComponentSet::new(candidates);
        }

        let rule = self.config.nested_rule;
        let nested: Vec<bool> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let overlaps = candidates
                    .iter()
                    .enumerate()
                    .filter(|&(j, other)| {
                        j != i
                            && match rule {
                                NestedRule::CenterInside => other.bbox.contains(c.center),
                                NestedRule::EnclosesCenters => c.bbox.contains(other.center),
                            }
                    })
                    .count();
                overlaps >= self.config.max_nested_centers
            })
            .collect();

        let kept = candidates
            .into_iter()
            .zip(nested)
            .filter_map(|(c, is_nested)| {
                if is_nested && self.log.components {
                    debug!(bbox = ?c.bbox, reason = ?Rejection::Nested, "component rejected");
                }
                (!is_nested).then_some(c)
            })
            .collect();
        ComponentSet::new(kept)
    }

    /// First-pass checks for a single component.
    fn check(&self, component: Component, map: &StrokeWidthMap) -> Result<ValidComponent, Rejection> {
        let stats = ComponentStats::compute(&component, map).ok_or(Rejection::Empty)?;

        if let Some(ratio) = self.config.max_variance_ratio
            && stats.variance > ratio * stats.mean
        {
            return Err(Rejection::Variance);
        }

        // Font height is the axis-aligned row count, not a rotated extent.
        let bbox = stats.bbox;
        if bbox.height() > self.config.max_font_height {
            return Err(Rejection::FontHeight);
        }

        let lowest_allowed = self.image_height as i64 - self.bottom_border as i64;
        if bbox.min_y < self.top_border || bbox.max_y as i64 > lowest_allowed {
            return Err(Rejection::Border);
        }

        let rotated = min_area_extent(&component.pixels, &bbox, self.config.rotation_divisions);
        if !ratio_within(rotated.aspect_ratio(), self.config.max_aspect_ratio) {
            return Err(Rejection::AspectRatio);
        }

        if self.log.components {
            debug!(
                bbox = ?bbox,
                mean = stats.mean,
                variance = stats.variance,
                median = stats.median,
                length = rotated.length,
                width = rotated.width,
                "component accepted"
            );
        }

        Ok(ValidComponent {
            pixels: component.pixels,
            center: bbox.center(),
            bbox,
            median: stats.median,
            rotated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(map: &mut StrokeWidthMap, x0: u32, y0: u32, w: u32, h: u32, width: f32) -> Component {
        let mut pixels = Vec::new();
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                map.set_min(x, y, width);
                pixels.push(PixelCoord::new(x, y));
            }
        }
        Component { pixels }
    }

    #[test]
    fn test_stats() {
        let mut map = StrokeWidthMap::new(4, 1);
        for (x, w) in [(0, 2.0), (1, 4.0), (2, 4.0), (3, 6.0)] {
            map.set_min(x, 0, w);
        }
        let component = Component {
            pixels: (0..4).map(|x| PixelCoord::new(x, 0)).collect(),
        };
        let stats = ComponentStats::compute(&component, &map).unwrap();
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.variance, 2.0);
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.bbox, PixelBox::new(0, 0, 3, 0));
    }

    #[test]
    fn test_aspect_ratio_filter() {
        let mut map = StrokeWidthMap::new(60, 60);
        let square = filled(&mut map, 2, 2, 10, 10, 3.0);
        let bar = filled(&mut map, 20, 2, 4, 30, 3.0);
        let config = ComponentFilterConfig::default();
        let set = ComponentFilter::new(&config, 60).filter(vec![square, bar], &map);

        assert_eq!(set.len(), 1);
        assert_eq!(set[0].bbox, PixelBox::new(2, 2, 11, 11));
        assert_eq!(set[0].center, Point::new(6.5, 6.5));
        assert_eq!(set[0].median, 3.0);
    }

    #[test]
    fn test_border_and_height_filters() {
        let mut map = StrokeWidthMap::new(40, 40);
        let top = filled(&mut map, 2, 1, 6, 6, 2.0);
        let middle = filled(&mut map, 12, 15, 6, 6, 2.0);
        let bottom = filled(&mut map, 22, 33, 6, 6, 2.0);
        let config = ComponentFilterConfig::default();

        let set = ComponentFilter::new(&config, 40)
            .with_borders(5, 5)
            .filter(vec![top.clone(), middle.clone(), bottom.clone()], &map);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].bbox.min_y, 15);

        let short = ComponentFilterConfig {
            max_font_height: 5,
            ..ComponentFilterConfig::default()
        };
        let set = ComponentFilter::new(&short, 40).filter(vec![top, middle, bottom], &map);
        assert!(set.is_empty());
    }

    #[test]
    fn test_variance_filter_is_optional() {
        let mut map = StrokeWidthMap::new(12, 12);
        let mut component = filled(&mut map, 0, 0, 6, 6, 1.0);
        for y in 6..12 {
            for x in 0..6 {
                map.set_min(x, y, 9.0);
                component.pixels.push(PixelCoord::new(x, y));
            }
        }
        // 6x12 fails the aspect test; widen it to a square.
        for y in 0..12 {
            for x in 6..12 {
                map.set_min(x, y, 9.0);
                component.pixels.push(PixelCoord::new(x, y));
            }
        }

        let lenient = ComponentFilterConfig::default();
        let set = ComponentFilter::new(&lenient, 12).filter(vec![component.clone()], &map);
        assert_eq!(set.len(), 1);

        let strict = ComponentFilterConfig::default().with_max_variance_ratio(Some(0.5));
        let set = ComponentFilter::new(&strict, 12).filter(vec![component], &map);
        assert!(set.is_empty());
    }

    fn frame(map: &mut StrokeWidthMap, x0: u32, y0: u32, size: u32) -> Component {
        let mut pixels = Vec::new();
        for i in 0..size {
            let far = size - 1;
            for (x, y) in [(i, 0), (i, far), (0, i), (far, i)] {
                map.set_min(x0 + x, y0 + y, 2.0);
                pixels.push(PixelCoord::new(x0 + x, y0 + y));
            }
        }
        pixels.sort();
        pixels.dedup();
        Component { pixels }
    }

    #[test]
    fn test_frame_around_glyphs() {
        let mut map = StrokeWidthMap::new(60, 60);
        let outline = frame(&mut map, 0, 0, 40);
        let a = filled(&mut map, 8, 15, 8, 8, 2.0);
        let b = filled(&mut map, 20, 15, 8, 8, 2.0);
        let components = vec![outline, a, b];

        // Each glyph center lies in the frame only, and the frame center in no glyph.
        let config = ComponentFilterConfig::default();
        let set = ComponentFilter::new(&config, 60).filter(components.clone(), &map);
        assert_eq!(set.len(), 3);

        let enclosing = config.clone().with_nested_rule(NestedRule::EnclosesCenters);
        let set = ComponentFilter::new(&enclosing, 60).filter(components.clone(), &map);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|c| c.width() == 8));

        let keep_all = enclosing.with_reject_nested(false);
        let set = ComponentFilter::new(&keep_all, 60).filter(components, &map);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_component_inside_two_others() {
        let mut map = StrokeWidthMap::new(60, 60);
        let first = frame(&mut map, 0, 0, 30);
        let second = frame(&mut map, 10, 10, 30);
        let dot = filled(&mut map, 15, 15, 4, 4, 2.0);
        let components = vec![first, second, dot];

        let config = ComponentFilterConfig::default();
        let set = ComponentFilter::new(&config, 60).filter(components.clone(), &map);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|c| c.width() == 30));

        // Each frame holds the dot's center and the other frame's center.
        let enclosing = config.with_nested_rule(NestedRule::EnclosesCenters);
        let set = ComponentFilter::new(&enclosing, 60).filter(components, &map);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].bbox, PixelBox::new(15, 15, 18, 18));
    }
}
