//! Second pass of the stroke width transform.
//!
//! Rays crossing a stroke corner are longer than the stroke is wide. Clamping
//! every ray to the median of the widths along it removes those outliers.

use crate::processors::stroke_width::{Ray, StrokeWidthMap};

/// Lowers every pixel on each ray to the median width along that ray.
///
/// The median is the element at index `len / 2` of the sorted widths. Values only
/// ever decrease, so the order in which rays are processed is irrelevant for
/// pixels covered by a single ray.
pub fn refine_with_ray_medians(map: &mut StrokeWidthMap, rays: &[Ray]) {
    let mut widths = Vec::new();
    for ray in rays {
        widths.clear();
        widths.extend(ray.points.iter().filter_map(|p| map.width_at(p.x, p.y)));
        if widths.is_empty() {
            continue;
        }
        widths.sort_unstable_by(f32::total_cmp);
        let median = widths[widths.len() / 2];

        for p in &ray.points {
            map.set_min(p.x, p.y, median);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::geometry::PixelCoord;

    fn ray(points: &[(u32, u32)], width: f32) -> Ray {
        let points: Vec<PixelCoord> = points.iter().map(|&(x, y)| PixelCoord::new(x, y)).collect();
        Ray {
            p: points[0],
            q: points[points.len() - 1],
            points,
            width,
        }
    }

    #[test]
    fn test_outlier_clamped_to_median() {
        let mut map = StrokeWidthMap::new(5, 1);
        for (x, w) in [(0, 3.0), (1, 3.0), (2, 9.0), (3, 3.0), (4, 4.0)] {
            map.set_min(x, 0, w);
        }
        let r = ray(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)], 4.0);

        refine_with_ray_medians(&mut map, &[r]);
        // sorted: 3 3 3 4 9, median at index 2
        assert_eq!(map.get(2, 0), Some(3.0));
        assert_eq!(map.get(4, 0), Some(3.0));
    }

    #[test]
    fn test_refinement_never_increases() {
        let mut map = StrokeWidthMap::new(4, 1);
        for (x, w) in [(0, 1.0), (1, 8.0), (2, 8.0), (3, 8.0)] {
            map.set_min(x, 0, w);
        }
        let before: Vec<f32> = (0..4).filter_map(|x| map.get(x, 0)).collect();
        refine_with_ray_medians(&mut map, &[ray(&[(0, 0), (1, 0), (2, 0), (3, 0)], 8.0)]);
        let after: Vec<f32> = (0..4).filter_map(|x| map.get(x, 0)).collect();

        assert!(before.iter().zip(&after).all(|(b, a)| a <= b));
        assert_eq!(after, vec![1.0, 8.0, 8.0, 8.0]);
    }
}
