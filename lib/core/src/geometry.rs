//! Bounding-box arithmetic and greedy layout clustering
//!
//! Every clustering pass sorts its input by a full positional key first, so
//! results depend only on where boxes are, never on the order they arrive in.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Integer pixel rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl BoundingBox {
    pub const fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> i64 {
        self.x.saturating_add(self.w.max(0))
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(self.h.max(0))
    }

    /// Area in px², 0 for degenerate boxes
    #[inline]
    pub fn area(&self) -> f64 {
        (self.w.max(0) as f64) * (self.h.max(0) as f64)
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.w.max(0) as f64 / 2.0,
            self.y as f64 + self.h.max(0) as f64 / 2.0,
        )
    }

    /// Portion of the box inside the horizontal strip `[0, limit)`
    pub fn clip_to_height(&self, limit: i64) -> Option<BoundingBox> {
        let top = self.y.max(0);
        let bottom = self.bottom().min(limit);
        (bottom > top && self.w > 0).then(|| BoundingBox::new(self.x, top, self.w, bottom.saturating_sub(top)))
    }

    fn sort_key(&self) -> (i64, i64, i64, i64) {
        (self.y, self.x, self.h, self.w)
    }
}

/// Intersection area of two boxes, 0 when they do not overlap
pub fn overlap_area(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let w = a.right().min(b.right()).saturating_sub(a.x.max(b.x));
    let h = a.bottom().min(b.bottom()).saturating_sub(a.y.max(b.y));
    if w <= 0 || h <= 0 {
        0.0
    } else {
        (w as f64) * (h as f64)
    }
}

/// Indices of `boxes` in canonical top-to-bottom, left-to-right order
fn canonical_order(boxes: &[BoundingBox]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by_key(|&i| boxes[i].sort_key());
    order
}

/// Greedy proximity clustering.
///
/// Walking boxes in canonical order, each unvisited box seeds a group and
/// pulls in every unvisited box whose center lies within `threshold` px of the
/// seed's center. Returns groups of indices into `boxes`, or nothing for
/// fewer than two boxes.
pub fn proximity_groups(boxes: &[BoundingBox], threshold: f64) -> Vec<Vec<usize>> {
    if boxes.len() < 2 {
        return Vec::new();
    }
    let order = canonical_order(boxes);
    let mut visited = vec![false; boxes.len()];
    let mut groups = Vec::new();

    for (pos, &seed) in order.iter().enumerate() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let (sx, sy) = boxes[seed].center();
        let mut group = vec![seed];

        for &candidate in &order[pos + 1..] {
            if visited[candidate] {
                continue;
            }
            let (cx, cy) = boxes[candidate].center();
            if ((cx - sx).powi(2) + (cy - sy).powi(2)).sqrt() <= threshold {
                visited[candidate] = true;
                group.push(candidate);
            }
        }
        groups.push(group);
    }

    groups
}

/// A horizontal band of boxes whose top edges sit close together
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    boxes: Vec<BoundingBox>,
}

impl Band {
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn top(&self) -> i64 {
        self.boxes.iter().map(|b| b.y).min().unwrap_or(0)
    }

    pub fn bottom(&self) -> i64 {
        self.boxes.iter().map(BoundingBox::bottom).max().unwrap_or(0)
    }
}

/// Group boxes into top-to-bottom bands.
///
/// Boxes are sorted by top edge; a box joins the current band when its top is
/// within `y_threshold` px of the previous box's top, otherwise it opens a
/// new band. Fewer than two boxes form no bands.
pub fn horizontal_bands(boxes: &[BoundingBox], y_threshold: i64) -> Vec<Band> {
    if boxes.len() < 2 {
        return Vec::new();
    }
    let mut bands: Vec<Band> = Vec::new();
    let mut prev_top: Option<i64> = None;

    for i in canonical_order(boxes) {
        let b = boxes[i];
        match (prev_top, bands.last_mut()) {
            (Some(top), Some(band)) if b.y.saturating_sub(top) <= y_threshold => band.boxes.push(b),
            _ => bands.push(Band { boxes: vec![b] }),
        }
        prev_top = Some(b.y);
    }

    bands
}

/// Positive gaps between each band's bottom edge and the next band's top
pub fn vertical_gaps(bands: &[Band]) -> Vec<f64> {
    bands
        .windows(2)
        .map(|pair| pair[1].top().saturating_sub(pair[0].bottom()) as f64)
        .filter(|gap| *gap > 0.0)
        .collect()
}

/// Positive gaps between horizontally consecutive boxes within each band
pub fn horizontal_gaps(bands: &[Band]) -> Vec<f64> {
    let mut gaps = Vec::new();
    for band in bands {
        let mut row: Vec<&BoundingBox> = band.boxes.iter().collect();
        row.sort_by_key(|b| (b.x, b.w, b.y, b.h));
        gaps.extend(
            row.windows(2)
                .map(|pair| pair[1].x.saturating_sub(pair[0].right()) as f64)
                .filter(|gap| *gap > 0.0),
        );
    }
    gaps
}

/// A cluster of aligned edge positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentLine {
    /// Mean position of the clustered edges
    pub position: f64,
    /// Number of edges in the cluster
    pub count: usize,
}

/// Detect alignment lines among edge positions.
///
/// Positions are sorted and bucketed while they stay within `tolerance` of
/// the bucket's first position. Only buckets with at least `min_cluster_size`
/// members count as lines; without that floor every distinct position would
/// be its own line and any layout would look perfectly regular.
pub fn alignment_lines(
    positions: &[f64],
    tolerance: f64,
    min_cluster_size: usize,
) -> Vec<AlignmentLine> {
    let mut sorted: Vec<f64> = positions.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by_key(|p| OrderedFloat(*p));

    let mut lines = Vec::new();
    let mut cluster: Vec<f64> = Vec::new();

    let mut flush = |cluster: &mut Vec<f64>| {
        if !cluster.is_empty() && cluster.len() >= min_cluster_size {
            lines.push(AlignmentLine {
                position: cluster.iter().sum::<f64>() / cluster.len() as f64,
                count: cluster.len(),
            });
        }
        cluster.clear();
    };

    for p in sorted {
        if let Some(&start) = cluster.first() {
            if p - start > tolerance {
                flush(&mut cluster);
            }
        }
        cluster.push(p);
    }
    flush(&mut cluster);

    lines
}

/// Fraction of positions lying within `tolerance` of some alignment line
pub fn alignment_coverage(positions: &[f64], lines: &[AlignmentLine], tolerance: f64) -> f64 {
    if positions.is_empty() || lines.is_empty() {
        return 0.0;
    }
    let covered = positions
        .iter()
        .filter(|p| lines.iter().any(|l| (l.position - **p).abs() <= tolerance))
        .count();
    covered as f64 / positions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(x: i64, y: i64, w: i64, h: i64) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    #[test]
    fn test_overlap_area() {
        let a = bx(0, 0, 10, 10);
        assert_eq!(overlap_area(&a, &bx(5, 5, 10, 10)), 25.0);
        assert_eq!(overlap_area(&a, &bx(10, 0, 10, 10)), 0.0);
        assert_eq!(overlap_area(&a, &bx(50, 50, 1, 1)), 0.0);
        assert_eq!(overlap_area(&a, &bx(2, 2, 3, 3)), 9.0);
        assert_eq!(overlap_area(&bx(5, 5, 10, 10), &a), overlap_area(&a, &bx(5, 5, 10, 10)));
    }

    #[test]
    fn test_clip_to_height() {
        assert_eq!(bx(0, 700, 100, 200).clip_to_height(800), Some(bx(0, 700, 100, 100)));
        assert_eq!(bx(0, 900, 100, 200).clip_to_height(800), None);
    }

    #[test]
    fn test_proximity_groups() {
        let boxes = [bx(0, 0, 10, 10), bx(5, 5, 10, 10), bx(500, 500, 10, 10)];
        let groups = proximity_groups(&boxes, 20.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![0, 1]);
        assert_eq!(groups[1], vec![2]);

        assert!(proximity_groups(&[], 10.0).is_empty());
        assert!(proximity_groups(&[bx(0, 0, 1, 1)], 10.0).is_empty());
    }

    #[test]
    fn test_groups_independent_of_input_order() {
        let boxes = vec![bx(0, 0, 10, 10), bx(15, 0, 10, 10), bx(30, 0, 10, 10), bx(300, 40, 10, 10)];
        let mut reversed = boxes.clone();
        reversed.reverse();

        let sizes = |bs: &[BoundingBox]| {
            let mut s: Vec<usize> = proximity_groups(bs, 20.0).iter().map(Vec::len).collect();
            s.sort_unstable();
            s
        };
        assert_eq!(sizes(&boxes), sizes(&reversed));
    }

    #[test]
    fn test_horizontal_bands_and_gaps() {
        let boxes = [
            bx(0, 0, 100, 50),
            bx(120, 5, 100, 50),
            bx(0, 100, 100, 50),
            bx(0, 300, 220, 40),
        ];
        let bands = horizontal_bands(&boxes, 10);
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].len(), 2);
        assert_eq!(bands[0].top(), 0);
        assert_eq!(bands[0].bottom(), 55);

        assert_eq!(vertical_gaps(&bands), vec![45.0, 150.0]);
        assert_eq!(horizontal_gaps(&bands), vec![20.0]);
    }

    #[test]
    fn test_overlapping_bands_drop_negative_gaps() {
        let boxes = [bx(0, 0, 100, 200), bx(0, 50, 100, 20), bx(0, 400, 100, 20)];
        let bands = horizontal_bands(&boxes, 10);
        assert_eq!(bands.len(), 3);
        // Band 2 starts inside band 1, so only the last gap is reported
        assert_eq!(vertical_gaps(&bands), vec![330.0]);
    }

    #[test]
    fn test_bands_empty_input() {
        assert!(horizontal_bands(&[], 10).is_empty());
        assert!(horizontal_bands(&[bx(0, 0, 100, 100)], 10).is_empty());
        assert!(vertical_gaps(&[]).is_empty());
        assert!(horizontal_gaps(&[]).is_empty());
    }

    #[test]
    fn test_extreme_coordinates_saturate() {
        let far = bx(i64::MAX - 10, i64::MAX - 10, 100, 100);
        assert_eq!(far.right(), i64::MAX);
        assert_eq!(far.bottom(), i64::MAX);
        assert_eq!(overlap_area(&far, &bx(i64::MIN, i64::MIN, 10, 10)), 0.0);

        let boxes = [bx(0, i64::MIN, 10, 10), far, bx(0, 0, 10, 10)];
        let bands = horizontal_bands(&boxes, 24);
        assert_eq!(bands.len(), 3);
        assert!(vertical_gaps(&bands).iter().all(|g| g.is_finite() && *g > 0.0));
        assert_eq!(far.clip_to_height(i64::MAX), Some(bx(i64::MAX - 10, i64::MAX - 10, 100, 10)));
    }

    #[test]
    fn test_bounding_box_json_shape() {
        let b = bx(10, 20, 300, 40);
        let json = serde_json::to_value(b).unwrap();
        assert_eq!(json, serde_json::json!({"x": 10, "y": 20, "w": 300, "h": 40}));
        let back: BoundingBox = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_alignment_lines_require_min_cluster() {
        let positions = [0.0, 2.0, 4.0, 200.0, 201.0, 500.0];
        let lines = alignment_lines(&positions, 5.0, 3);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].count, 3);
        assert!((lines[0].position - 2.0).abs() < 1e-9);

        let loose = alignment_lines(&positions, 5.0, 1);
        assert_eq!(loose.len(), 3);
    }

    #[test]
    fn test_alignment_does_not_chain() {
        // Each step is within tolerance of the previous one but not of the start
        let positions = [0.0, 4.0, 8.0, 12.0, 16.0];
        assert!(alignment_lines(&positions, 5.0, 3).is_empty());
        assert_eq!(alignment_lines(&positions, 5.0, 2).len(), 2);
    }

    #[test]
    fn test_alignment_coverage() {
        let positions = [0.0, 1.0, 2.0, 100.0];
        let lines = alignment_lines(&positions, 5.0, 3);
        assert!((alignment_coverage(&positions, &lines, 5.0) - 0.75).abs() < 1e-9);
        assert_eq!(alignment_coverage(&positions, &[], 5.0), 0.0);
        assert_eq!(alignment_coverage(&[], &lines, 5.0), 0.0);
    }
}
