//! Tests for tile ids and bounding boxes

use super::*;

#[test]
fn test_bounding_box_accepts_ordered_edges() {
    let bbox = BoundingBox::new(175.0, -1.0, 179.0, 1.0).unwrap();
    assert_eq!(bbox.to_array(), [175.0, -1.0, 179.0, 1.0]);
    assert_eq!(bbox.width(), 4.0);
}

#[test]
fn test_bounding_box_rejects_wrapping_edges() {
    let result = BoundingBox::new(179.0, -1.0, -179.0, 1.0);
    assert!(matches!(result, Err(CoordError::WrappingBox { .. })));
}

#[test]
fn test_bounding_box_rejects_inverted_latitudes() {
    let result = BoundingBox::new(0.0, 10.0, 1.0, -10.0);
    assert!(matches!(result, Err(CoordError::InvertedBox { .. })));
}

#[test]
fn test_bounding_box_rejects_nan() {
    assert!(BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
}

#[test]
fn test_zero_width_box_is_allowed() {
    let bbox = BoundingBox::new(180.0, -1.0, 180.0, 1.0).unwrap();
    assert_eq!(bbox.width(), 0.0);
}

#[test]
fn test_bounding_box_intersects() {
    let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0).unwrap();
    let b = BoundingBox::new(1.0, 1.0, 3.0, 3.0).unwrap();
    let c = BoundingBox::new(5.0, 5.0, 6.0, 6.0).unwrap();
    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
}

#[test]
fn test_wrap_longitude() {
    assert_eq!(wrap_longitude(0.0), 0.0);
    assert_eq!(wrap_longitude(181.0), -179.0);
    assert_eq!(wrap_longitude(-181.0), 179.0);
    assert_eq!(wrap_longitude(180.0), -180.0);
    assert_eq!(wrap_longitude(540.0), -180.0);
}

#[test]
fn test_tile_id_display_and_parse_grid() {
    let id = TileId::grid(66, 22);
    assert_eq!(id.to_string(), "66,22");
    assert_eq!("66,22".parse::<TileId>().unwrap(), id);
}

#[test]
fn test_tile_id_display_and_parse_pathrow() {
    let id = TileId::pathrow(73, 72);
    assert_eq!(id.to_string(), "073/072");
    assert_eq!("073/072".parse::<TileId>().unwrap(), id);
}

#[test]
fn test_tile_id_parse_named() {
    let id: TileId = "FJI-12".parse().unwrap();
    assert_eq!(
        id,
        TileId::Named {
            code: "FJI".to_string(),
            seq: 12
        }
    );
}

#[test]
fn test_tile_id_parse_negative_grid() {
    let id: TileId = "-3,7".parse().unwrap();
    assert_eq!(id, TileId::grid(-3, 7));
}

#[test]
fn test_tile_id_parse_invalid() {
    assert!(matches!(
        "nonsense".parse::<TileId>(),
        Err(CoordError::InvalidTileId(_))
    ));
    assert!("a,b".parse::<TileId>().is_err());
}

#[test]
fn test_tile_id_parts_and_pathrow() {
    assert_eq!(TileId::grid(1, 2).parts(), vec!["1", "2"]);
    assert_eq!(TileId::pathrow(73, 72).as_pathrow(), Some((73, 72)));
    assert_eq!(TileId::grid(73, 72).as_pathrow(), None);
}

#[test]
fn test_zero_pad3() {
    assert_eq!(zero_pad3(7), "007");
    assert_eq!(zero_pad3("66"), "066");
    assert_eq!(zero_pad3(1234), "1234");
}
