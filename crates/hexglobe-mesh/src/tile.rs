//! Tile records and the compact array format they are shipped in.
//!
//! Each tile is a JSON array `[v, a, t, l, x0, y0, z0, x1, y1, z1, ...]`:
//! an optional scalar value, an anomaly flag, an integer type, the integer
//! longitude band used by the intro reveal, then the boundary vertices as
//! flat xyz triples already on the globe surface.

use serde_json::Value;
use thiserror::Error;

const FIELD_VALUE: usize = 0;
const FIELD_ANOMALY: usize = 1;
const FIELD_TYPE: usize = 2;
const FIELD_LNG: usize = 3;
const FIELD_BOUNDARY: usize = 4;

#[derive(Debug, Error)]
pub enum TileParseError {
    #[error("tile file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tile file must be a JSON array of tiles")]
    NotAList,

    #[error("tile {index} is not an array")]
    NotAnArray { index: usize },

    #[error("tile {index} has {len} fields, need at least 4")]
    TooShort { index: usize, len: usize },

    #[error("tile {index} field '{field}' has the wrong type")]
    InvalidField { index: usize, field: &'static str },

    #[error("tile {index} boundary has {len} coordinates, not a multiple of 3")]
    RaggedBoundary { index: usize, len: usize },
}

/// One polygon patch of the globe surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Scalar driving the tile color. Missing values are colored randomly.
    pub value: Option<f64>,
    /// Anomalous tiles use the override color instead of the scheme.
    pub anomaly: bool,
    pub kind: i64,
    /// Longitude band, read by the intro reveal.
    pub lng: i64,
    /// Boundary vertices in order; five for a pentagon, six for a hexagon.
    pub boundary: Vec<[f32; 3]>,
}

impl Tile {
    /// Parse a single tile from its compact array form.
    pub fn from_tiny(index: usize, value: &Value) -> Result<Self, TileParseError> {
        let fields = value.as_array().ok_or(TileParseError::NotAnArray { index })?;
        if fields.len() < FIELD_BOUNDARY {
            return Err(TileParseError::TooShort {
                index,
                len: fields.len(),
            });
        }
        let invalid = |field| TileParseError::InvalidField { index, field };

        let v = match &fields[FIELD_VALUE] {
            Value::Null => None,
            other => Some(other.as_f64().ok_or(invalid("v"))?),
        };
        let anomaly = match &fields[FIELD_ANOMALY] {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
            _ => return Err(invalid("a")),
        };
        let int = |i: usize, name| fields[i].as_f64().map(|x| x as i64).ok_or(invalid(name));
        let kind = int(FIELD_TYPE, "t")?;
        let lng = int(FIELD_LNG, "l")?;

        let coords = &fields[FIELD_BOUNDARY..];
        if coords.len() % 3 != 0 {
            return Err(TileParseError::RaggedBoundary {
                index,
                len: coords.len(),
            });
        }
        let boundary = coords
            .chunks_exact(3)
            .map(|xyz| {
                let c = |v: &Value| v.as_f64().map(|f| f as f32).ok_or(invalid("boundary"));
                Ok([c(&xyz[0])?, c(&xyz[1])?, c(&xyz[2])?])
            })
            .collect::<Result<Vec<_>, TileParseError>>()?;

        Ok(Self {
            value: v,
            anomaly,
            kind,
            lng,
            boundary,
        })
    }
}

/// Parse a JSON array of compact tiles.
pub fn parse_tiles(json: &str) -> Result<Vec<Tile>, TileParseError> {
    let root: Value = serde_json::from_str(json)?;
    let list = root.as_array().ok_or(TileParseError::NotAList)?;
    list.iter()
        .enumerate()
        .map(|(i, v)| Tile::from_tiny(i, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_hexagon() {
        let tiles = parse_tiles(
            r#"[[0.5, false, 1, -42,
                 0,0,0, 1,0,0, 2,0,0, 3,0,0, 4,0,0, 5,0,0]]"#,
        )
        .unwrap();
        assert_eq!(tiles.len(), 1);
        let t = &tiles[0];
        assert_eq!(t.value, Some(0.5));
        assert!(!t.anomaly);
        assert_eq!((t.kind, t.lng), (1, -42));
        assert_eq!(t.boundary.len(), 6);
        assert_eq!(t.boundary[5], [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_null_value_and_numeric_anomaly() {
        let tiles = parse_tiles("[[null, 1, 0, 10, 0,0,0]]").unwrap();
        assert_eq!(tiles[0].value, None);
        assert!(tiles[0].anomaly);
    }

    #[test]
    fn test_rejects_ragged_boundary() {
        let err = parse_tiles("[[0.1, false, 0, 0, 1, 2]]").unwrap_err();
        assert!(matches!(err, TileParseError::RaggedBoundary { index: 0, len: 2 }));
    }

    #[test]
    fn test_rejects_short_and_non_array_tiles() {
        assert!(matches!(
            parse_tiles("[[0.1, false]]").unwrap_err(),
            TileParseError::TooShort { index: 0, len: 2 }
        ));
        assert!(matches!(
            parse_tiles(r#"[[0,false,0,0], {"v": 1}]"#).unwrap_err(),
            TileParseError::NotAnArray { index: 1 }
        ));
        assert!(matches!(parse_tiles("{}").unwrap_err(), TileParseError::NotAList));
        assert!(matches!(parse_tiles("[").unwrap_err(), TileParseError::Json(_)));
    }

    #[test]
    fn test_rejects_wrong_field_types() {
        assert!(matches!(
            parse_tiles(r#"[["x", false, 0, 0]]"#).unwrap_err(),
            TileParseError::InvalidField { field: "v", .. }
        ));
        assert!(matches!(
            parse_tiles(r#"[[0, false, 0, 0, 1, 2, "z"]]"#).unwrap_err(),
            TileParseError::InvalidField { field: "boundary", .. }
        ));
    }
}
