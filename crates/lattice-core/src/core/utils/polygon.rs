//! Planar conversions between polygon contours and boolean slices.

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

/// A vertex in fractional `(row, column)` pixel coordinates.
pub type PixelVertex = (f64, f64);

/// Clockwise Moore neighbourhood in image coordinates (rows grow downwards),
/// starting from the western neighbour.
const NEIGHBOURS: [(isize, isize); 8] = [
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
];

/// Fills a closed polygon into `plane` using the even-odd rule at pixel centres.
///
/// Pixels whose centre lies on a crossing, and the pixels nearest to each vertex, are
/// included so that boundaries traced through pixel centres survive a round trip.
/// Returns the number of pixels that changed from false to true.
pub fn fill_polygon(plane: &mut ArrayViewMut2<bool>, vertices: &[PixelVertex]) -> usize {
    let (rows, columns) = plane.dim();
    if vertices.is_empty() || rows == 0 || columns == 0 {
        return 0;
    }

    let mut newly_set = 0;
    let mut mark = |plane: &mut ArrayViewMut2<bool>, r: usize, c: usize| {
        if !plane[[r, c]] {
            plane[[r, c]] = true;
            newly_set += 1;
        }
    };

    let min_row = vertices.iter().map(|v| v.0).fold(f64::INFINITY, f64::min);
    let max_row = vertices.iter().map(|v| v.0).fold(f64::NEG_INFINITY, f64::max);
    let first_row = min_row.ceil().max(0.0) as usize;
    let last_row = max_row.floor().min((rows - 1) as f64);

    if last_row >= 0.0 {
        let mut crossings = Vec::new();
        for r in first_row..=(last_row as usize) {
            let y = r as f64;
            crossings.clear();
            for (i, a) in vertices.iter().enumerate() {
                let b = vertices[(i + 1) % vertices.len()];
                if a.0 == y && b.0 == y {
                    let start = a.1.min(b.1).ceil().max(0.0);
                    let end = a.1.max(b.1).floor().min((columns - 1) as f64);
                    if end >= start {
                        for c in (start as usize)..=(end as usize) {
                            mark(plane, r, c);
                        }
                    }
                } else if (a.0 > y) != (b.0 > y) {
                    crossings.push(a.1 + (y - a.0) * (b.1 - a.1) / (b.0 - a.0));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = span[0].ceil().max(0.0);
                let end = span[1].floor().min((columns - 1) as f64);
                if end < start {
                    continue;
                }
                for c in (start as usize)..=(end as usize) {
                    mark(plane, r, c);
                }
            }
        }
    }

    for &(row, column) in vertices {
        let (r, c) = (row.round(), column.round());
        if r >= 0.0 && c >= 0.0 && (r as usize) < rows && (c as usize) < columns {
            mark(plane, r as usize, c as usize);
        }
    }

    newly_set
}

/// Labels 8-connected components of `plane`. Label `0` is background; components are
/// numbered from 1 in raster order of their first pixel.
pub fn label_components(plane: ArrayView2<bool>) -> (Array2<u32>, u32) {
    let (rows, columns) = plane.dim();
    let mut labels = Array2::<u32>::zeros((rows, columns));
    let mut count = 0;
    let mut stack = Vec::new();

    for ((r, c), &value) in plane.indexed_iter() {
        if !value || labels[[r, c]] != 0 {
            continue;
        }
        count += 1;
        labels[[r, c]] = count;
        stack.push((r, c));
        while let Some((pr, pc)) = stack.pop() {
            for (dr, dc) in NEIGHBOURS {
                let (nr, nc) = (pr as isize + dr, pc as isize + dc);
                if nr < 0 || nc < 0 || nr as usize >= rows || nc as usize >= columns {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if plane[[nr, nc]] && labels[[nr, nc]] == 0 {
                    labels[[nr, nc]] = count;
                    stack.push((nr, nc));
                }
            }
        }
    }
    (labels, count)
}

/// Traces the outer boundary of every 8-connected component of `plane`.
///
/// Each boundary is an ordered list of `(row, column)` pixel indices walked clockwise
/// through boundary pixel centres, without repeating the starting pixel. An isolated
/// pixel yields a single-point boundary.
pub fn trace_boundaries(plane: ArrayView2<bool>) -> Vec<Vec<(usize, usize)>> {
    let (labels, count) = label_components(plane);
    let mut starts: Vec<Option<(usize, usize)>> = vec![None; count as usize];
    let mut areas = vec![0usize; count as usize];
    for ((r, c), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        let slot = (label - 1) as usize;
        areas[slot] += 1;
        starts[slot].get_or_insert((r, c));
    }

    starts
        .into_iter()
        .zip(areas)
        .enumerate()
        .filter_map(|(i, (start, area))| {
            start.map(|s| trace_component(&labels, (i + 1) as u32, s, area))
        })
        .collect()
}

fn trace_component(
    labels: &Array2<u32>,
    label: u32,
    start: (usize, usize),
    area: usize,
) -> Vec<(usize, usize)> {
    let (rows, columns) = labels.dim();
    let inside = |r: isize, c: isize| {
        r >= 0
            && c >= 0
            && (r as usize) < rows
            && (c as usize) < columns
            && labels[[r as usize, c as usize]] == label
    };

    let mut boundary = vec![start];
    let mut current = start;
    // The start is the first pixel in raster order, so its western neighbour is outside.
    let mut backtrack_dir = 0;
    let mut first_step: Option<(usize, usize)> = None;

    for _ in 0..(4 * area + 8) {
        let mut next = None;
        for k in 1..=8 {
            let dir = (backtrack_dir + k) % 8;
            let (dr, dc) = NEIGHBOURS[dir];
            let (r, c) = (current.0 as isize + dr, current.1 as isize + dc);
            if inside(r, c) {
                let (br, bc) = NEIGHBOURS[(dir + 7) % 8];
                next = Some((
                    (r as usize, c as usize),
                    (current.0 as isize + br, current.1 as isize + bc),
                ));
                break;
            }
        }
        let Some((candidate, backtrack)) = next else {
            break;
        };

        if current == start {
            match first_step {
                Some(first) if first == candidate => break,
                Some(_) => {}
                None => first_step = Some(candidate),
            }
        }

        let delta = (
            backtrack.0 - candidate.0 as isize,
            backtrack.1 - candidate.1 as isize,
        );
        backtrack_dir = NEIGHBOURS.iter().position(|d| *d == delta).unwrap_or(0);
        current = candidate;
        boundary.push(current);
    }

    if boundary.len() > 1 && boundary.last() == Some(&start) {
        boundary.pop();
    }
    boundary
}
