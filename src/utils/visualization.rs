//! Debug renderings of intermediate detection results.
//!
//! Nothing here touches the filesystem; callers decide whether to save the
//! images.

use crate::processors::{Chain, ComponentSet, PixelBox, StrokeWidthMap};

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const BACKGROUND: u8 = 255;

/// Colors cycled through when drawing component boxes.
const BOX_COLORS: [Rgb<u8>; 3] = [Rgb([0, 0, 255]), Rgb([0, 255, 0]), Rgb([255, 0, 0])];

const CHAIN_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Images captured during a detection run.
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    /// Refined stroke width map, see [`render_stroke_widths`].
    pub stroke_widths: GrayImage,
    /// Valid components with their bounding boxes.
    pub components: RgbImage,
    /// Chain bounding boxes over the valid components.
    pub chains: RgbImage,
}

/// Scales assigned widths linearly to `0..=255`; unassigned pixels are white.
pub fn render_stroke_widths(map: &StrokeWidthMap) -> GrayImage {
    let mut image = GrayImage::from_pixel(map.width(), map.height(), Luma([BACKGROUND]));
    let Some((lo, hi)) = map.value_range() else {
        return image;
    };
    let span = hi - lo;
    for sample in map.samples() {
        let level = if span > 0.0 {
            (sample.width - lo) / span * 255.0
        } else {
            0.0
        };
        image.put_pixel(sample.coord.x, sample.coord.y, Luma([level.round() as u8]));
    }
    image
}

/// Draws only the pixels of valid components, shaded by stroke width.
fn component_canvas(map: &StrokeWidthMap, components: &ComponentSet) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(map.width(), map.height(), Rgb([BACKGROUND; 3]));
    let Some((lo, hi)) = map.value_range() else {
        return canvas;
    };
    let span = hi - lo;
    for component in components.iter() {
        for p in &component.pixels {
            let Some(width) = map.width_at(p.x, p.y) else {
                continue;
            };
            let level = if span > 0.0 {
                ((width - lo) / span * 255.0).round() as u8
            } else {
                0
            };
            canvas.put_pixel(p.x, p.y, Rgb([level; 3]));
        }
    }
    canvas
}

fn to_rect(bbox: &PixelBox) -> Rect {
    Rect::at(bbox.min_x as i32, bbox.min_y as i32).of_size(bbox.width(), bbox.height())
}

/// Renders valid components with bounding boxes in cycling colors.
pub fn render_components(map: &StrokeWidthMap, components: &ComponentSet) -> RgbImage {
    let mut canvas = component_canvas(map, components);
    for (i, component) in components.iter().enumerate() {
        draw_hollow_rect_mut(
            &mut canvas,
            to_rect(&component.bbox),
            BOX_COLORS[i % BOX_COLORS.len()],
        );
    }
    canvas
}

/// Renders valid components with the bounding box of every chain.
pub fn render_chains(map: &StrokeWidthMap, components: &ComponentSet, chains: &[Chain]) -> RgbImage {
    let mut canvas = component_canvas(map, components);
    for chain in chains {
        let bbox = chain
            .members
            .iter()
            .filter_map(|&m| components.get(m))
            .map(|c| c.bbox)
            .reduce(|a, b| a.union(&b));
        if let Some(bbox) = bbox {
            draw_hollow_rect_mut(&mut canvas, to_rect(&bbox), CHAIN_COLOR);
        }
    }
    canvas
}

/// Renders all debug images for one run.
pub fn capture(map: &StrokeWidthMap, components: &ComponentSet, chains: &[Chain]) -> DebugArtifacts {
    DebugArtifacts {
        stroke_widths: render_stroke_widths(map),
        components: render_components(map, components),
        chains: render_chains(map, components, chains),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::{PixelCoord, Point, RotatedExtent, ValidComponent};

    #[test]
    fn test_stroke_widths_scaled() {
        let mut map = StrokeWidthMap::new(3, 1);
        map.set_min(0, 0, 2.0);
        map.set_min(1, 0, 6.0);
        let image = render_stroke_widths(&map);
        assert_eq!(image.get_pixel(0, 0)[0], 0);
        assert_eq!(image.get_pixel(1, 0)[0], 255);
        assert_eq!(image.get_pixel(2, 0)[0], BACKGROUND);
    }

    #[test]
    fn test_components_and_chains_drawn() {
        let mut map = StrokeWidthMap::new(20, 20);
        let mut pixels = Vec::new();
        for y in 4..10 {
            for x in 4..10 {
                map.set_min(x, y, 3.0);
                pixels.push(PixelCoord::new(x, y));
            }
        }
        let bbox = PixelBox::new(4, 4, 9, 9);
        let set = ComponentSet::new(vec![ValidComponent {
            pixels,
            bbox,
            center: bbox.center(),
            median: 3.0,
            rotated: RotatedExtent {
                length: 6.0,
                width: 6.0,
                angle: 0.0,
            },
        }]);

        let components = render_components(&map, &set);
        assert_eq!(*components.get_pixel(4, 4), BOX_COLORS[0]);
        assert_eq!(*components.get_pixel(6, 6), Rgb([0, 0, 0]));
        assert_eq!(*components.get_pixel(0, 0), Rgb([BACKGROUND; 3]));

        let chain = Chain {
            p: 0,
            q: 0,
            members: vec![0],
            dist: 0.0,
            direction: Point::new(1.0, 0.0),
        };
        let artifacts = capture(&map, &set, &[chain]);
        assert_eq!(*artifacts.chains.get_pixel(9, 9), CHAIN_COLOR);
        assert_eq!(artifacts.stroke_widths.dimensions(), (20, 20));
    }
}
