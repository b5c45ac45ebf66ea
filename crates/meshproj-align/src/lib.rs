#![warn(missing_docs)]

//! Camera-relative orientation for mesh projection.
//!
//! - [`Camera`] - View orientation, eye position and projection mode
//! - [`axis`] - Snapping rotations to canonical axes
//! - [`orient`] - Align a selection of objects to the view
//! - [`mirror`] - Reflect transforms and geometry across a plane
//!
//! # Example
//!
//! ```
//! use meshproj_align::{axis::axis_align_rotation_matrix, Camera};
//! use meshproj_math::{Mat3, Point3, Transform};
//!
//! let camera = Camera::new(Mat3::identity(), Point3::new(0.0, 0.0, 10.0), true);
//! assert!((camera.forward().z + 1.0).abs() < 1e-12);
//!
//! let tilted = Transform::rotation_z(0.2).linear();
//! let snapped = axis_align_rotation_matrix(&tilted);
//! assert_eq!(snapped, Mat3::identity());
//! ```

pub mod axis;
mod error;
pub mod mirror;
pub mod orient;
mod parent;
mod view;

pub use error::{AlignError, Result};
pub use orient::{AlignMode, AlignPlan, AlignSelection, AlignSettings};
pub use parent::{largest_object, LargestBy, ParentRule, SceneObject};
pub use view::Camera;
