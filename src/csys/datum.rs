//! Horizontal datums and prime meridians: the anchoring of a coordinate
//! system to the physical earth, and the optional Bursa-Wolf parameters
//! describing its relation to WGS84.

use crate::authoring::*;

/// Arc seconds to radians
pub(crate) const SEC_TO_RAD: f64 = 4.848_136_811_095_359_935_899_141e-6;

/// The seven Bursa-Wolf (Helmert) parameters of a datum's relation to
/// WGS84: shifts in metres, rotations in arc-seconds, scale in parts
/// per million
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Wgs84ConversionInfo {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub ex: f64,
    pub ey: f64,
    pub ez: f64,
    pub ppm: f64,
}

impl Wgs84ConversionInfo {
    pub fn new(dx: f64, dy: f64, dz: f64, ex: f64, ey: f64, ez: f64, ppm: f64) -> Self {
        Wgs84ConversionInfo {
            dx,
            dy,
            dz,
            ex,
            ey,
            ez,
            ppm,
        }
    }

    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Wgs84ConversionInfo::new(dx, dy, dz, 0., 0., 0., 0.)
    }

    /// All seven parameters zero: no measurable shift to WGS84
    #[must_use]
    pub fn has_zero_values_only(&self) -> bool {
        !(self.dx != 0.
            || self.dy != 0.
            || self.dz != 0.
            || self.ex != 0.
            || self.ey != 0.
            || self.ez != 0.
            || self.ppm != 0.)
    }

    /// The derived constant vector of the linearized Helmert transform:
    /// `[scale, rx, ry, rz, dx, dy, dz]` with the rotations in radians
    /// and pre-multiplied by the scale
    #[must_use]
    pub fn helmert_constants(&self) -> [f64; 7] {
        let scale = 1.0 + self.ppm * 1e-6;
        [
            scale,
            self.ex * SEC_TO_RAD * scale,
            self.ey * SEC_TO_RAD * scale,
            self.ez * SEC_TO_RAD * scale,
            self.dx,
            self.dy,
            self.dz,
        ]
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!(
            "TOWGS84[{}, {}, {}, {}, {}, {}, {}]",
            self.dx, self.dy, self.dz, self.ex, self.ey, self.ez, self.ppm
        )
    }
}

/// The kind of anchoring a horizontal datum provides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DatumKind {
    /// Centered on the earth's center of mass
    #[default]
    Geocentric,
    /// A classical horizontal datum based on surface observations
    HorizontalClassic,
    /// A purely local anchoring
    HorizontalLocal,
}

/// A horizontal datum: a reference ellipsoid and its positioning,
/// optionally tied to WGS84 by Bursa-Wolf parameters
#[derive(Clone, Debug)]
pub struct HorizontalDatum {
    pub name: String,
    pub authority: Authority,
    pub kind: DatumKind,
    pub ellipsoid: Ellipsoid,
    pub wgs84: Option<Wgs84ConversionInfo>,
}

impl HorizontalDatum {
    pub fn new(
        name: &str,
        kind: DatumKind,
        ellipsoid: Ellipsoid,
        wgs84: Option<Wgs84ConversionInfo>,
        authority: Authority,
    ) -> HorizontalDatum {
        HorizontalDatum {
            name: name.to_string(),
            authority,
            kind,
            ellipsoid,
            wgs84,
        }
    }

    /// World Geodetic System 1984 (EPSG 6326)
    #[must_use]
    pub fn wgs84() -> HorizontalDatum {
        HorizontalDatum::new(
            "World Geodetic System 1984",
            DatumKind::Geocentric,
            Ellipsoid::wgs84(),
            None,
            Authority::new("EPSG", 6326),
        )
    }

    /// Defining-parameter equality: ellipsoid, datum kind and the
    /// Bursa-Wolf parameters
    #[must_use]
    pub fn equal_params(&self, other: &HorizontalDatum) -> bool {
        self.wgs84 == other.wgs84
            && self.kind == other.kind
            && self.ellipsoid.equal_params(&other.ellipsoid)
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        let mut wkt = format!("DATUM[\"{}\", {}", self.name, self.ellipsoid.wkt());
        if let Some(info) = &self.wgs84 {
            wkt += &format!(", {}", info.wkt());
        }
        wkt += &self.authority.wkt_tail();
        wkt + "]"
    }
}

/// A prime meridian: the longitude origin, as an offset from Greenwich
/// in the meridian's own angular unit
#[derive(Clone, Debug)]
pub struct PrimeMeridian {
    pub name: String,
    pub authority: Authority,
    pub longitude: f64,
    pub angular_unit: AngularUnit,
}

impl PrimeMeridian {
    pub fn new(
        name: &str,
        longitude: f64,
        angular_unit: AngularUnit,
        authority: Authority,
    ) -> PrimeMeridian {
        PrimeMeridian {
            name: name.to_string(),
            authority,
            longitude,
            angular_unit,
        }
    }

    /// Greenwich (EPSG 8901)
    #[must_use]
    pub fn greenwich() -> PrimeMeridian {
        PrimeMeridian::new("Greenwich", 0.0, AngularUnit::degrees(), Authority::new("EPSG", 8901))
    }

    #[must_use]
    pub fn equal_params(&self, other: &PrimeMeridian) -> bool {
        self.angular_unit.equal_params(&other.angular_unit) && self.longitude == other.longitude
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!(
            "PRIMEM[\"{}\", {}{}]",
            self.name,
            self.longitude,
            self.authority.wkt_tail()
        )
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn helmert_constants() {
        let info = Wgs84ConversionInfo::new(-87., -98., -121., 0., 0., 0., 0.);
        assert!(!info.has_zero_values_only());
        let v = info.helmert_constants();
        assert_eq!(v, [1.0, 0.0, 0.0, 0.0, -87.0, -98.0, -121.0]);

        // Scale enters both the scale slot and the rotations
        let info = Wgs84ConversionInfo::new(0., 0., 0., 1., 0., 0., 2.5);
        let v = info.helmert_constants();
        assert_float_eq!(v[0], 1.000_002_5, abs <= 1e-12);
        assert_float_eq!(v[1], SEC_TO_RAD * 1.000_002_5, abs <= 1e-18);
    }

    #[test]
    fn datum_equality() {
        let a = HorizontalDatum::wgs84();
        let mut b = HorizontalDatum::wgs84();
        b.name = "wgs84_renamed".to_string();
        b.authority = Authority::none();
        assert!(a.equal_params(&b));

        // An all-zero conversion info is still a different description
        // than an absent one
        b.wgs84 = Some(Wgs84ConversionInfo::default());
        assert!(!a.equal_params(&b));
    }

    #[test]
    fn wkt() {
        let info = Wgs84ConversionInfo::translation(-87., -98., -121.);
        assert_eq!(info.wkt(), "TOWGS84[-87, -98, -121, 0, 0, 0, 0]");
        assert_eq!(
            PrimeMeridian::greenwich().wkt(),
            "PRIMEM[\"Greenwich\", 0, AUTHORITY[\"EPSG\", \"8901\"]]"
        );
    }
}
