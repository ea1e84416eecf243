//! Plane shapes behind an explicitly implemented trait.

use std::f64::consts::PI;

pub trait Shape {
  fn area(&self) -> f64;
  fn perimeter(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
  pub width: f64,
  pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
  pub radius: f64,
}

/// A right triangle with legs `base` and `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
  pub base: f64,
  pub height: f64,
}

impl Shape for Rectangle {
  fn area(&self) -> f64 {
    self.width * self.height
  }

  fn perimeter(&self) -> f64 {
    2.0 * (self.width + self.height)
  }
}

impl Shape for Circle {
  fn area(&self) -> f64 {
    PI * self.radius * self.radius
  }

  fn perimeter(&self) -> f64 {
    2.0 * PI * self.radius
  }
}

impl Shape for Triangle {
  fn area(&self) -> f64 {
    self.base * self.height * 0.5
  }

  fn perimeter(&self) -> f64 {
    self.base + self.height + self.base.hypot(self.height)
  }
}

pub fn total_area(shapes: &[&dyn Shape]) -> f64 {
  shapes.iter().map(|shape| shape.area()).sum()
}
