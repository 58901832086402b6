//! Geometry repair.
//!
//! Polygons are deduplicated, dissolved when a ring crosses itself, and
//! oriented with counter-clockwise exteriors. Lines are deduplicated and
//! unwrapped when they jump across the antimeridian. The repair is pure and
//! idempotent: fixing a fixed geometry returns it unchanged.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::orient::{Direction, Orient};
use geo::{
    BooleanOps, Coord, Geometry, GeometryCollection, Line, LineString, MultiLineString,
    MultiPolygon, Polygon,
};

use super::{geometry_kind, GeometryError};

/// Repairs a geometry so spatial operations on it are well defined.
pub fn fix(geometry: &Geometry<f64>) -> Result<Geometry<f64>, GeometryError> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(fix_polygons(vec![polygon.clone()], true)),
        Geometry::MultiPolygon(mp) => Ok(fix_polygons(mp.0.clone(), false)),
        Geometry::Rect(rect) => Ok(fix_polygons(vec![rect.to_polygon()], true)),
        Geometry::Triangle(triangle) => Ok(fix_polygons(vec![triangle.to_polygon()], true)),
        Geometry::LineString(line) => Ok(Geometry::LineString(fix_line(line))),
        Geometry::Line(line) => Ok(Geometry::LineString(fix_line(&LineString::from(vec![
            line.start, line.end,
        ])))),
        Geometry::MultiLineString(mls) => Ok(Geometry::MultiLineString(MultiLineString::new(
            mls.0.iter().map(fix_line).collect(),
        ))),
        Geometry::GeometryCollection(collection) => {
            let fixed = collection
                .0
                .iter()
                .map(fix)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::GeometryCollection(GeometryCollection::new_from(
                fixed,
            )))
        }
        other => Err(GeometryError::Unsupported(geometry_kind(other))),
    }
}

fn fix_polygons(polygons: Vec<Polygon<f64>>, single: bool) -> Geometry<f64> {
    let deduped: Vec<Polygon<f64>> = polygons.iter().map(dedupe_polygon).collect();

    let needs_repair = deduped.iter().any(|p| {
        ring_self_intersects(p.exterior()) || p.interiors().iter().any(ring_self_intersects)
    });

    let repaired = if needs_repair {
        MultiPolygon::new(deduped).union(&MultiPolygon::new(Vec::new()))
    } else {
        MultiPolygon::new(deduped)
    };

    let oriented = repaired.orient(Direction::Default);
    if single && oriented.0.len() == 1 {
        let mut polygons = oriented.0;
        Geometry::Polygon(polygons.remove(0))
    } else {
        Geometry::MultiPolygon(oriented)
    }
}

fn dedupe_polygon(polygon: &Polygon<f64>) -> Polygon<f64> {
    Polygon::new(
        dedupe_ring(polygon.exterior()),
        polygon.interiors().iter().map(dedupe_ring).collect(),
    )
}

fn dedupe_ring(ring: &LineString<f64>) -> LineString<f64> {
    let mut coords = dedupe_coords(&ring.0);
    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if first != last {
            coords.push(first);
        }
    }
    LineString::new(coords)
}

fn dedupe_coords(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for c in coords {
        if out.last() != Some(c) {
            out.push(*c);
        }
    }
    out
}

fn fix_line(line: &LineString<f64>) -> LineString<f64> {
    let mut coords = dedupe_coords(&line.0);
    let (min_x, max_x) = coords
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.x), hi.max(c.x))
        });
    if max_x - min_x >= 180.0 {
        for c in coords.iter_mut() {
            if c.x < 0.0 {
                c.x += 360.0;
            }
        }
    }
    LineString::new(coords)
}

/// Returns true when a closed ring crosses or folds back over itself.
///
/// Rings with fewer than four coordinates cannot enclose area and are
/// reported as invalid too.
pub fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    let segments: Vec<Line<f64>> = ring.lines().collect();
    let n = segments.len();
    if n < 3 {
        return n > 0;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                // Neighbours always share an endpoint; only overlap is a fold
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return true,
            }
        }
    }
    false
}
