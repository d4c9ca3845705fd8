//! 2D shape primitives and overlap tests
//!
//! Screen space is Y-down, so a rectangle's `top` is its smallest Y. All
//! rectangle comparisons use open intervals: rectangles that only share an
//! edge do not overlap.

use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center
    pub position: Vec2,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Create a circle
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }

    /// Whether `point` lies strictly inside the circle
    pub fn contains_point(&self, point: Vec2) -> bool {
        (point - self.position).norm_squared() < self.radius * self.radius
    }

    /// Whether the two circles' outlines touch or cross
    ///
    /// A circle fully inside another without touching its outline does not
    /// overlap it.
    pub fn overlaps_circle(&self, other: &Circle) -> bool {
        let distance_squared = (self.position - other.position).norm_squared();
        let sum = self.radius + other.radius;
        let difference = self.radius - other.radius;
        distance_squared <= sum * sum && distance_squared >= difference * difference
    }
}

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Top-left corner
    pub position: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rectangle {
    /// Create a rectangle from its top-left corner and size
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Smallest X
    pub fn left(&self) -> f32 {
        self.position.x
    }

    /// Largest X
    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    /// Smallest Y
    pub fn top(&self) -> f32 {
        self.position.y
    }

    /// Largest Y
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    /// Whether `point` lies strictly inside the rectangle
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x > self.left() && point.x < self.right() && point.y > self.top() && point.y < self.bottom()
    }

    /// Open-interval AABB overlap
    pub fn overlaps_rectangle(&self, other: &Rectangle) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// World-space shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Circle
    Circle(Circle),
    /// Axis-aligned rectangle
    Rectangle(Rectangle),
}

impl Shape {
    /// Pairwise overlap test
    ///
    /// Mixed circle/rectangle pairs never overlap.
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Circle(a), Shape::Circle(b)) => a.overlaps_circle(b),
            (Shape::Rectangle(a), Shape::Rectangle(b)) => a.overlaps_rectangle(b),
            (Shape::Circle(_), Shape::Rectangle(_)) | (Shape::Rectangle(_), Shape::Circle(_)) => false,
        }
    }

    /// Whether `point` lies strictly inside the shape
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(circle) => circle.contains_point(point),
            Shape::Rectangle(rectangle) => rectangle.contains_point(point),
        }
    }
}

/// Local shape description carried by a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Circle centered on the node's position
    Circle {
        /// Unscaled radius
        radius: f32,
    },
    /// Rectangle with its top-left at the node's position
    Rectangle {
        /// Unscaled size
        size: Vec2,
    },
}

impl ShapeKind {
    /// Unscaled extent: diameter × diameter for circles, size for rectangles
    pub fn base_size(&self) -> Vec2 {
        match *self {
            ShapeKind::Circle { radius } => Vec2::new(radius * 2.0, radius * 2.0),
            ShapeKind::Rectangle { size } => size,
        }
    }

    /// Place the shape in world space
    ///
    /// Circles scale their radius by the smaller scale component so they stay
    /// circular.
    pub fn to_world(&self, position: Vec2, scale: Vec2) -> Shape {
        match *self {
            ShapeKind::Circle { radius } => Shape::Circle(Circle::new(position, scale.x.min(scale.y) * radius)),
            ShapeKind::Rectangle { size } => Shape::Rectangle(Rectangle::new(position, scale.component_mul(&size))),
        }
    }
}
