//! Tolerances and shape options of a fillet build.

use crate::geometry::surface::SectionKind;

/// Cross-section of the blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilletShape {
    /// Circular section, parameterised uniformly in angle.
    #[default]
    Rational,
    /// Circular section, parameterised by the tangent of the half angle.
    QuasiAngular,
    /// Cubic polynomial approximation of the circular section.
    Polynomial,
    /// Straight section joining the two contact lines.
    Chamfer,
}

impl FilletShape {
    /// Section kind used for swept blend surfaces of this shape.
    #[must_use]
    pub fn section_kind(self) -> SectionKind {
        match self {
            Self::Rational => SectionKind::Rational,
            Self::QuasiAngular => SectionKind::QuasiAngular,
            Self::Polynomial => SectionKind::Polynomial,
            Self::Chamfer => SectionKind::Straight,
        }
    }

    /// Whether the section is a circular arc (possibly approximated).
    #[must_use]
    pub fn is_rounded(self) -> bool {
        self != Self::Chamfer
    }
}

/// Continuity required of the radius along a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuity {
    /// Any continuous radius.
    #[default]
    Tangent,
    /// The radius slope must not turn by more than `continuity_angle` at
    /// contour vertices or inside an edge.
    Curvature,
}

/// Numeric tolerances handed to the blend solver.
#[derive(Debug, Clone, PartialEq)]
pub struct FilletParams {
    /// Angle (radians) below which two directions count as tangent.
    pub angular_tolerance: f64,
    /// Distance below which two points coincide.
    pub spatial_tolerance: f64,
    /// Step of the one-sided radius slopes compared under
    /// [`Continuity::Curvature`].
    pub parametric_tolerance: f64,
    /// Radius difference below which blends count as equal: a blend stays
    /// cylindrical, blends meeting at a vertex may be joined.
    pub approx_tolerance_3d: f64,
    /// Tolerance used when simplifying sampled radius laws.
    pub approx_tolerance_2d: f64,
    /// Maximum chordal deviation of a sampled radius law.
    pub max_sag: f64,
    pub continuity: Continuity,
    /// Angle (radians) within which consecutive contour edges continue each
    /// other and radius slopes count as equal.
    pub continuity_angle: f64,
}

impl Default for FilletParams {
    fn default() -> Self {
        Self {
            angular_tolerance: 1e-2,
            spatial_tolerance: 1e-4,
            parametric_tolerance: 1e-5,
            approx_tolerance_3d: 1e-4,
            approx_tolerance_2d: 1e-5,
            max_sag: 1e-3,
            continuity: Continuity::Tangent,
            continuity_angle: 1e-2,
        }
    }
}

impl FilletParams {
    #[must_use]
    pub fn with_angular_tolerance(mut self, tolerance: f64) -> Self {
        self.angular_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_spatial_tolerance(mut self, tolerance: f64) -> Self {
        self.spatial_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_parametric_tolerance(mut self, tolerance: f64) -> Self {
        self.parametric_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_approx_tolerances(mut self, tolerance_3d: f64, tolerance_2d: f64) -> Self {
        self.approx_tolerance_3d = tolerance_3d;
        self.approx_tolerance_2d = tolerance_2d;
        self
    }

    #[must_use]
    pub fn with_max_sag(mut self, sag: f64) -> Self {
        self.max_sag = sag;
        self
    }

    #[must_use]
    pub fn with_continuity(mut self, continuity: Continuity, angle: f64) -> Self {
        self.continuity = continuity;
        self.continuity_angle = angle;
        self
    }
}
