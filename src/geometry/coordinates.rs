//! Coordinate representations of points on the unit sphere
//!
//! Every type enforces its own invariant in its constructor (unit length,
//! wrapped angles, clamped texture coordinates). Conversions are explicit
//! named functions; nothing converts implicitly.
//!
//! Conventions: +Y is "up". Spherical elevation is the polar angle measured
//! from +Y in [0, π]; azimuth is measured in the x-z plane from +X toward +Z
//! in [0, 2π).

use glam::{DVec2, DVec3};
use std::f64::consts::{PI, TAU};

/// A point on the unit sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedCartesianCoordinates {
    data: DVec3,
}

impl NormalizedCartesianCoordinates {
    /// Normalize `vector` onto the unit sphere. `None` for zero/non-finite input.
    pub fn new(vector: DVec3) -> Option<Self> {
        vector.try_normalize().map(|data| Self { data })
    }

    /// The underlying unit vector
    #[inline]
    pub fn data(&self) -> DVec3 {
        self.data
    }

    pub fn to_spherical(&self) -> NormalizedSphericalCoordinates {
        let elevation = self.data.y.clamp(-1.0, 1.0).acos();
        let azimuth = self.data.z.atan2(self.data.x);
        NormalizedSphericalCoordinates::new(elevation, azimuth)
    }

    pub fn to_octahedral(&self) -> OctahedralCoordinates {
        let manhattan = self.data.x.abs() + self.data.y.abs() + self.data.z.abs();
        // A unit vector always has a Manhattan length in [1, √3].
        OctahedralCoordinates {
            data: self.data / manhattan,
        }
    }

    pub fn to_uv(&self) -> UvCoordinates {
        self.to_spherical().to_uv()
    }

    pub fn to_octahedral_uv(&self) -> OctahedralUvCoordinates {
        self.to_octahedral().to_octahedral_uv()
    }
}

/// Polar/azimuthal angles of a point on the unit sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSphericalCoordinates {
    elevation: f64,
    azimuth: f64,
}

impl NormalizedSphericalCoordinates {
    /// Wrap arbitrary angles into elevation ∈ [0, π], azimuth ∈ [0, 2π).
    ///
    /// Elevations past a pole continue down the other side of the sphere,
    /// which flips the azimuth by π.
    pub fn new(elevation: f64, azimuth: f64) -> Self {
        let mut elevation = elevation.rem_euclid(TAU);
        let mut azimuth = azimuth;
        if elevation > PI {
            elevation = TAU - elevation;
            azimuth += PI;
        }
        let mut azimuth = azimuth.rem_euclid(TAU);
        if azimuth >= TAU {
            azimuth = 0.0;
        }
        Self { elevation, azimuth }
    }

    #[inline]
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    #[inline]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn to_cartesian(&self) -> NormalizedCartesianCoordinates {
        let (sin_elevation, cos_elevation) = self.elevation.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        NormalizedCartesianCoordinates {
            data: DVec3::new(
                sin_elevation * cos_azimuth,
                cos_elevation,
                sin_elevation * sin_azimuth,
            ),
        }
    }

    /// Equirectangular texture coordinates (v = 1 at the north pole)
    pub fn to_uv(&self) -> UvCoordinates {
        UvCoordinates::new(DVec2::new(self.azimuth / TAU, 1.0 - self.elevation / PI))
    }
}

/// Equirectangular texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvCoordinates {
    uv: DVec2,
}

impl UvCoordinates {
    /// u wraps around [0, 1); v is clamped to [0, 1].
    pub fn new(uv: DVec2) -> Self {
        let mut u = uv.x.rem_euclid(1.0);
        if u >= 1.0 {
            u = 0.0;
        }
        Self {
            uv: DVec2::new(u, uv.y.clamp(0.0, 1.0)),
        }
    }

    #[inline]
    pub fn uv(&self) -> DVec2 {
        self.uv
    }

    pub fn to_spherical(&self) -> NormalizedSphericalCoordinates {
        NormalizedSphericalCoordinates::new((1.0 - self.uv.y) * PI, self.uv.x * TAU)
    }

    pub fn to_cartesian(&self) -> NormalizedCartesianCoordinates {
        self.to_spherical().to_cartesian()
    }
}

/// A point on the surface of the unit octahedron (|x| + |y| + |z| = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctahedralCoordinates {
    data: DVec3,
}

impl OctahedralCoordinates {
    /// Project `vector` onto the octahedron. `None` for zero/non-finite input.
    pub fn new(vector: DVec3) -> Option<Self> {
        let manhattan = vector.x.abs() + vector.y.abs() + vector.z.abs();
        if manhattan > 0.0 && manhattan.is_finite() {
            Some(Self {
                data: vector / manhattan,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn data(&self) -> DVec3 {
        self.data
    }

    pub fn to_cartesian(&self) -> NormalizedCartesianCoordinates {
        // The octahedron never touches the origin, so this cannot be zero.
        NormalizedCartesianCoordinates {
            data: self.data.normalize(),
        }
    }

    /// Unfold the octahedron into the unit square: the upper (+Y) half maps to
    /// the inner diamond, the lower half folds out into the corners.
    pub fn to_octahedral_uv(&self) -> OctahedralUvCoordinates {
        let mut st = DVec2::new(self.data.x, self.data.z);
        if self.data.y < 0.0 {
            st = fold(st);
        }
        OctahedralUvCoordinates::new(st * 0.5 + DVec2::splat(0.5))
    }
}

/// Octahedral texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctahedralUvCoordinates {
    uv: DVec2,
}

impl OctahedralUvCoordinates {
    /// Clamped to [0, 1] on both axes.
    pub fn new(uv: DVec2) -> Self {
        Self {
            uv: uv.clamp(DVec2::ZERO, DVec2::ONE),
        }
    }

    #[inline]
    pub fn uv(&self) -> DVec2 {
        self.uv
    }

    pub fn to_octahedral(&self) -> OctahedralCoordinates {
        let st = self.uv * 2.0 - DVec2::ONE;
        let y = 1.0 - st.x.abs() - st.y.abs();
        let st = if y < 0.0 { fold(st) } else { st };
        OctahedralCoordinates {
            data: DVec3::new(st.x, y, st.y),
        }
    }

    pub fn to_cartesian(&self) -> NormalizedCartesianCoordinates {
        self.to_octahedral().to_cartesian()
    }
}

/// Reflect a point across the diamond |s| + |t| = 1 (its own inverse).
fn fold(st: DVec2) -> DVec2 {
    DVec2::new(
        (1.0 - st.y.abs()) * sign_not_zero(st.x),
        (1.0 - st.x.abs()) * sign_not_zero(st.y),
    )
}

#[inline]
fn sign_not_zero(value: f64) -> f64 {
    if value >= 0.0 { 1.0 } else { -1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f64::consts::FRAC_PI_2;

    fn random_unit(rng: &mut Pcg32) -> DVec3 {
        loop {
            let v = DVec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            );
            if v.length_squared() > 0.01 && v.length_squared() <= 1.0 {
                return v.normalize();
            }
        }
    }

    #[test]
    fn test_cartesian_rejects_zero() {
        assert!(NormalizedCartesianCoordinates::new(DVec3::ZERO).is_none());
        let c = NormalizedCartesianCoordinates::new(DVec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((c.data().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spherical_wraps_past_pole() {
        // Walking 0.1 past the north pole lands on the other side.
        let s = NormalizedSphericalCoordinates::new(-0.1, 0.0);
        assert!((s.elevation() - 0.1).abs() < 1e-12);
        assert!((s.azimuth() - PI).abs() < 1e-12);

        let s = NormalizedSphericalCoordinates::new(FRAC_PI_2, -FRAC_PI_2);
        assert!((s.azimuth() - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_spherical_axes() {
        let up = NormalizedSphericalCoordinates::new(0.0, 1.234).to_cartesian();
        assert!(up.data().abs_diff_eq(DVec3::Y, 1e-12));
        let x = NormalizedSphericalCoordinates::new(FRAC_PI_2, 0.0).to_cartesian();
        assert!(x.data().abs_diff_eq(DVec3::X, 1e-12));
        let z = NormalizedSphericalCoordinates::new(FRAC_PI_2, FRAC_PI_2).to_cartesian();
        assert!(z.data().abs_diff_eq(DVec3::Z, 1e-12));
    }

    #[test]
    fn test_cartesian_spherical_round_trip() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let v = random_unit(&mut rng);
            let c = NormalizedCartesianCoordinates::new(v).unwrap();
            let back = c.to_spherical().to_cartesian();
            assert!(back.data().abs_diff_eq(v, 1e-9), "{v:?} -> {:?}", back.data());
        }
    }

    #[test]
    fn test_uv_round_trip_and_clamping() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let v = random_unit(&mut rng);
            let c = NormalizedCartesianCoordinates::new(v).unwrap();
            let back = c.to_uv().to_cartesian();
            assert!(back.data().abs_diff_eq(v, 1e-9));
        }

        let uv = UvCoordinates::new(DVec2::new(1.25, 7.0));
        assert!((uv.uv().x - 0.25).abs() < 1e-12);
        assert_eq!(uv.uv().y, 1.0);
        assert!(uv.to_cartesian().data().abs_diff_eq(DVec3::Y, 1e-12));
    }

    #[test]
    fn test_octahedral_round_trip() {
        let mut rng = Pcg32::seed_from_u64(13);
        for _ in 0..200 {
            let v = random_unit(&mut rng);
            let c = NormalizedCartesianCoordinates::new(v).unwrap();
            let octahedral = c.to_octahedral();
            let d = octahedral.data();
            assert!((d.x.abs() + d.y.abs() + d.z.abs() - 1.0).abs() < 1e-12);

            let uv = c.to_octahedral_uv();
            assert!(uv.uv().cmpge(DVec2::ZERO).all() && uv.uv().cmple(DVec2::ONE).all());
            let back = uv.to_cartesian();
            assert!(back.data().abs_diff_eq(v, 1e-9), "{v:?} -> {:?}", back.data());
        }
    }

    #[test]
    fn test_octahedral_poles() {
        let north = NormalizedCartesianCoordinates::new(DVec3::Y).unwrap();
        assert!(north.to_octahedral_uv().uv().abs_diff_eq(DVec2::splat(0.5), 1e-12));
        let south = NormalizedCartesianCoordinates::new(-DVec3::Y).unwrap();
        let back = south.to_octahedral_uv().to_cartesian();
        assert!(back.data().abs_diff_eq(-DVec3::Y, 1e-12));
    }
}
