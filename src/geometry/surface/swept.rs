use crate::error::{GeometryError, Result};
use crate::math::{try_normalize, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// Shape of the cross-section swept along a blend spine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Exact circular arc, uniform in angle.
    Rational,
    /// Exact circular arc, parameterised by the tangent of the half angle.
    QuasiAngular,
    /// Cubic Bezier approximation of the circular arc.
    Polynomial,
    /// Straight segment between the two contact points (chamfer).
    Straight,
}

/// A blend surface swept along a straight spine segment.
///
/// At spine parameter `u` in `[0, 1]` the section lies in the plane normal
/// to the spine through `P(u) = origin + u * spine`. The section joins the
/// two contact points `P(u) + s(u) * first_dir` and `P(u) + s(u) * second_dir`,
/// where `first_dir` and `second_dir` are the in-face directions leaving the
/// spine on each support face and `s(u) = r(u) / tan(alpha / 2)` for the
/// opening angle `alpha` between them. The radius varies linearly from
/// `start_radius` to `end_radius`. Rounded sections are tangent to both
/// support planes for every `u`.
///
/// `v` in `[0, 1]` runs across the section from the first contact point to
/// the second.
#[derive(Debug, Clone)]
pub struct SweptBlend {
    origin: Point3,
    spine: Vector3,
    first_dir: Vector3,
    second_dir: Vector3,
    start_radius: f64,
    end_radius: f64,
    kind: SectionKind,
}

impl SweptBlend {
    /// Creates a swept blend.
    ///
    /// # Errors
    ///
    /// Returns an error if the spine is degenerate, the face directions are
    /// not unit-length-able, not normal to the spine, or (anti)parallel to
    /// each other, or if a radius is non-positive.
    pub fn new(
        origin: Point3,
        spine: Vector3,
        first_dir: Vector3,
        second_dir: Vector3,
        radii: (f64, f64),
        kind: SectionKind,
    ) -> Result<Self> {
        let axis = try_normalize(&spine).ok_or(GeometryError::ZeroVector)?;
        let first_dir = try_normalize(&first_dir).ok_or(GeometryError::ZeroVector)?;
        let second_dir = try_normalize(&second_dir).ok_or(GeometryError::ZeroVector)?;
        if first_dir.dot(&axis).abs() > 1e-9 || second_dir.dot(&axis).abs() > 1e-9 {
            return Err(GeometryError::Degenerate(
                "section directions must be normal to the spine".into(),
            )
            .into());
        }
        if first_dir.cross(&second_dir).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "support faces are tangent or folded onto each other".into(),
            )
            .into());
        }
        let (start_radius, end_radius) = radii;
        if start_radius < TOLERANCE || end_radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("blend radius must be positive".into()).into(),
            );
        }
        Ok(Self {
            origin,
            spine,
            first_dir,
            second_dir,
            start_radius,
            end_radius,
            kind,
        })
    }

    /// Returns the section kind.
    #[must_use]
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Point on the spine at parameter `u`.
    #[must_use]
    pub fn spine_point(&self, u: f64) -> Point3 {
        self.origin + self.spine * u
    }

    /// Blend radius at parameter `u`.
    #[must_use]
    pub fn radius_at(&self, u: f64) -> f64 {
        self.start_radius + (self.end_radius - self.start_radius) * u
    }

    fn half_angle(&self) -> f64 {
        0.5 * self.first_dir.dot(&self.second_dir).clamp(-1.0, 1.0).acos()
    }

    /// Distance from the spine to the contact points at parameter `u`.
    #[must_use]
    pub fn setback_at(&self, u: f64) -> f64 {
        self.radius_at(u) / self.half_angle().tan()
    }

    /// Center of the rolling circle at parameter `u`.
    #[must_use]
    pub fn center_at(&self, u: f64) -> Point3 {
        let bisector = (self.first_dir + self.second_dir).normalize();
        self.spine_point(u) + bisector * (self.radius_at(u) / self.half_angle().sin())
    }

    /// Contact point on the first support face at parameter `u`.
    #[must_use]
    pub fn first_contact(&self, u: f64) -> Point3 {
        self.spine_point(u) + self.first_dir * self.setback_at(u)
    }

    /// Contact point on the second support face at parameter `u`.
    #[must_use]
    pub fn second_contact(&self, u: f64) -> Point3 {
        self.spine_point(u) + self.second_dir * self.setback_at(u)
    }

    /// Evaluates the section at spine parameter `u`, cross parameter `v`.
    fn section_point(&self, u: f64, v: f64) -> Point3 {
        let q1 = self.first_contact(u);
        let q2 = self.second_contact(u);
        if self.kind == SectionKind::Straight {
            return q1 + (q2 - q1) * v;
        }
        let r = self.radius_at(u);
        let c = self.center_at(u);
        let opening = std::f64::consts::PI - 2.0 * self.half_angle();
        match self.kind {
            SectionKind::Polynomial => {
                let k = 4.0 / 3.0 * (opening / 4.0).tan() * r;
                let p1 = q1 - self.first_dir * k;
                let p2 = q2 - self.second_dir * k;
                let w = 1.0 - v;
                Point3::from(
                    q1.coords * (w * w * w)
                        + p1.coords * (3.0 * w * w * v)
                        + p2.coords * (3.0 * w * v * v)
                        + q2.coords * (v * v * v),
                )
            }
            SectionKind::QuasiAngular => {
                let theta = 2.0 * (v * (opening / 2.0).tan()).atan();
                slerp(&c, &q1, &q2, r, opening, theta / opening)
            }
            SectionKind::Rational | SectionKind::Straight => {
                slerp(&c, &q1, &q2, r, opening, v)
            }
        }
    }
}

/// Spherical interpolation on the circle of radius `r` around `c` from `a` to `b`.
fn slerp(c: &Point3, a: &Point3, b: &Point3, r: f64, opening: f64, t: f64) -> Point3 {
    let ea = (a - c) / r;
    let eb = (b - c) / r;
    let s = opening.sin();
    c + (ea * ((1.0 - t) * opening).sin() + eb * (t * opening).sin()) * (r / s)
}

impl Surface for SweptBlend {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.section_point(u, v))
    }

    /// Normal oriented towards the spine side of the section.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        const H: f64 = 1e-6;
        let du = self.section_point(u + H, v) - self.section_point(u - H, v);
        let dv = self.section_point(u, v + H) - self.section_point(u, v - H);
        let n = try_normalize(&du.cross(&dv)).ok_or(GeometryError::ZeroVector)?;
        let towards_spine = self.spine_point(u) - self.section_point(u, v);
        Ok(if n.dot(&towards_spine) < 0.0 { -n } else { n })
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::UNIT
    }
}
