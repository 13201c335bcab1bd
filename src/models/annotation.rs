// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the shapes drawn over the image, the annotation that
//! labels a shape with an organism class, and the fixed class taxonomy.
//! All coordinates are in unscaled image space.

use serde::{Deserialize, Serialize};

/// A 2D point. Depending on context this is in screen or image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Kind of shape the editor draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rectangle => write!(f, "rectangle"),
            Self::Circle => write!(f, "circle"),
        }
    }
}

/// A geometric shape in image space.
///
/// Rectangles keep the signed extents of the drag that produced them, so
/// `width`/`height` may be negative. Use [`Shape::bounds`] for the axis-aligned
/// box. The original exporter omitted zero extents, hence the field defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle {
        x: f64,
        y: f64,
        #[serde(default)]
        width: f64,
        #[serde(default)]
        height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        #[serde(default)]
        radius: f64,
    },
}

/// Axis-aligned bounds with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

impl Shape {
    /// Build the shape spanned by a drag from `anchor` to `point`.
    ///
    /// Rectangles keep `anchor` as their corner and signed extents; circles
    /// are centred on `anchor` with the drag length as radius.
    pub fn from_drag(kind: ShapeKind, anchor: Point, point: Point) -> Self {
        match kind {
            ShapeKind::Rectangle => Shape::Rectangle {
                x: anchor.x,
                y: anchor.y,
                width: point.x - anchor.x,
                height: point.y - anchor.y,
            },
            ShapeKind::Circle => Shape::Circle {
                x: anchor.x,
                y: anchor.y,
                radius: anchor.distance(&point),
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Circle { .. } => ShapeKind::Circle,
        }
    }

    /// Normalized axis-aligned bounds.
    pub fn bounds(&self) -> Bounds {
        match *self {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => Bounds {
                min: Point::new(x.min(x + width), y.min(y + height)),
                max: Point::new(x.max(x + width), y.max(y + height)),
            },
            Shape::Circle { x, y, radius } => Bounds {
                min: Point::new(x - radius, y - radius),
                max: Point::new(x + radius, y + radius),
            },
        }
    }

    /// Distance from `point` to the shape's outline (not its interior).
    pub fn outline_distance(&self, point: &Point) -> f64 {
        match *self {
            Shape::Circle { x, y, radius } => (Point::new(x, y).distance(point) - radius).abs(),
            Shape::Rectangle { .. } => {
                let b = self.bounds();
                let dx = (b.min.x - point.x).max(point.x - b.max.x).max(0.0);
                let dy = (b.min.y - point.y).max(point.y - b.max.y).max(0.0);
                if dx > 0.0 || dy > 0.0 {
                    dx.hypot(dy)
                } else {
                    // Inside: nearest edge
                    (point.x - b.min.x)
                        .min(b.max.x - point.x)
                        .min(point.y - b.min.y)
                        .min(b.max.y - point.y)
                }
            }
        }
    }

    /// Check that every numeric field is usable.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                if [x, y, width, height].iter().all(|v| v.is_finite()) {
                    Ok(())
                } else {
                    Err("rectangle has a non-finite coordinate".to_string())
                }
            }
            Shape::Circle { x, y, radius } => {
                if ![x, y, radius].iter().all(|v| v.is_finite()) {
                    Err("circle has a non-finite coordinate".to_string())
                } else if radius < 0.0 {
                    Err(format!("circle radius {radius} is negative"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// An entry of the organism taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganismClass {
    pub name: &'static str,
    pub color: &'static str,
}

/// Fixed taxonomy offered by the class picker.
pub const ORGANISM_CLASSES: &[OrganismClass] = &[
    OrganismClass { name: "Bacteria", color: "#e6194b" },
    OrganismClass { name: "Virus", color: "#3cb44b" },
    OrganismClass { name: "Fungus", color: "#ffe119" },
    OrganismClass { name: "Protozoa", color: "#4363d8" },
    OrganismClass { name: "Alga", color: "#f58231" },
    OrganismClass { name: "Archaea", color: "#911eb4" },
    OrganismClass { name: "Helminth", color: "#46f0f0" },
    OrganismClass { name: "Unknown", color: "#f032e6" },
];

/// A labeled shape drawn on the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub shape: Shape,
    pub organism_class: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
    /// UI state only, never persisted.
    #[serde(skip)]
    pub selected: bool,
}

impl Annotation {
    /// Create an unselected annotation with an empty description.
    pub fn new(shape: Shape, class: &OrganismClass) -> Self {
        Self {
            shape,
            organism_class: class.name.to_string(),
            color: class.color.to_string(),
            description: String::new(),
            selected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_from_drag_keeps_signed_extents() {
        let shape = Shape::from_drag(
            ShapeKind::Rectangle,
            Point::new(50.0, 30.0),
            Point::new(10.0, 10.0),
        );
        assert_eq!(
            shape,
            Shape::Rectangle {
                x: 50.0,
                y: 30.0,
                width: -40.0,
                height: -20.0
            }
        );

        let bounds = shape.bounds();
        assert_eq!(bounds.min, Point::new(10.0, 10.0));
        assert_eq!(bounds.max, Point::new(50.0, 30.0));
    }

    #[test]
    fn test_circle_from_drag_uses_distance() {
        let shape = Shape::from_drag(ShapeKind::Circle, Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(
            shape,
            Shape::Circle {
                x: 0.0,
                y: 0.0,
                radius: 5.0
            }
        );
    }

    #[test]
    fn test_outline_distance() {
        let rect = Shape::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert_eq!(rect.outline_distance(&Point::new(5.0, 1.0)), 1.0);
        assert_eq!(rect.outline_distance(&Point::new(13.0, 14.0)), 5.0);

        let circle = Shape::Circle {
            x: 0.0,
            y: 0.0,
            radius: 10.0,
        };
        assert_eq!(circle.outline_distance(&Point::new(0.0, 0.0)), 10.0);
        assert_eq!(circle.outline_distance(&Point::new(12.0, 0.0)), 2.0);
    }

    #[test]
    fn test_shape_wire_format() {
        let shape = Shape::Rectangle {
            x: 10.0,
            y: 10.0,
            width: 40.0,
            height: 20.0,
        };
        let json = serde_json::to_value(shape).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "rectangle", "x": 10.0, "y": 10.0, "width": 40.0, "height": 20.0})
        );

        let legacy: Shape = serde_json::from_str(r#"{"type":"circle","x":100,"y":100}"#).unwrap();
        assert_eq!(
            legacy,
            Shape::Circle {
                x: 100.0,
                y: 100.0,
                radius: 0.0
            }
        );
    }

    #[test]
    fn test_validate_rejects_negative_radius() {
        let circle = Shape::Circle {
            x: 0.0,
            y: 0.0,
            radius: -1.0,
        };
        assert!(circle.validate().is_err());
    }

    #[test]
    fn test_selected_not_serialized() {
        let mut annotation = Annotation::new(
            Shape::Circle {
                x: 1.0,
                y: 2.0,
                radius: 3.0,
            },
            &ORGANISM_CLASSES[0],
        );
        annotation.selected = true;

        let json = serde_json::to_value(&annotation).unwrap();
        assert!(json.get("selected").is_none());
        assert_eq!(json["organismClass"], "Bacteria");
        assert_eq!(json["description"], "");
    }
}
