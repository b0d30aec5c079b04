//! Reference ellipsoids: the rotational ellipsoid approximating the figure
//! of the earth that a datum anchors to.
//!
//! Some ellipsoids are defined by semi-major axis and inverse flattening,
//! others by both semi-axes. The `ivf_definitive` flag records which, so the
//! dependent value is always derived and never drifts by rounding.

use crate::authoring::*;

/// A reference ellipsoid
#[derive(Clone, Debug)]
pub struct Ellipsoid {
    name: String,
    authority: Authority,
    semi_major: f64,
    semi_minor: f64,
    inverse_flattening: f64,
    ivf_definitive: bool,
    unit: LinearUnit,
}

impl Ellipsoid {
    /// When `ivf_definitive`, the semi-minor axis argument is ignored and
    /// derived from the inverse flattening instead (a sphere when the
    /// inverse flattening is 0 or infinite)
    pub fn new(
        name: &str,
        semi_major: f64,
        semi_minor: f64,
        inverse_flattening: f64,
        ivf_definitive: bool,
        unit: LinearUnit,
        authority: Authority,
    ) -> Ellipsoid {
        let semi_minor = if ivf_definitive {
            if inverse_flattening == 0.0 || inverse_flattening.is_infinite() {
                semi_major
            } else {
                (1.0 - 1.0 / inverse_flattening) * semi_major
            }
        } else {
            semi_minor
        };
        Ellipsoid {
            name: name.to_string(),
            authority,
            semi_major,
            semi_minor,
            inverse_flattening,
            ivf_definitive,
            unit,
        }
    }

    /// An ellipsoid given by semi-major axis and definitive inverse
    /// flattening, in metres. The form every WKT `SPHEROID` clause takes
    pub fn from_inverse_flattening(
        name: &str,
        semi_major: f64,
        inverse_flattening: f64,
        authority: Authority,
    ) -> Ellipsoid {
        Ellipsoid::new(
            name,
            semi_major,
            0.0,
            inverse_flattening,
            true,
            LinearUnit::metre(),
            authority,
        )
    }

    // ----- B U I L T I N S -----------------------------------------------------------

    /// WGS 84 (EPSG 7030)
    #[must_use]
    pub fn wgs84() -> Ellipsoid {
        Ellipsoid::from_inverse_flattening("WGS 84", 6_378_137., 298.257_223_563, Authority::new("EPSG", 7030))
    }

    /// GRS 1980 (EPSG 7019)
    #[must_use]
    pub fn grs80() -> Ellipsoid {
        Ellipsoid::from_inverse_flattening("GRS 1980", 6_378_137., 298.257_222_101, Authority::new("EPSG", 7019))
    }

    /// WGS 72 (EPSG 7043)
    #[must_use]
    pub fn wgs72() -> Ellipsoid {
        Ellipsoid::from_inverse_flattening("WGS 72", 6_378_135., 298.26, Authority::new("EPSG", 7043))
    }

    /// International 1924, aka Hayford 1909 (EPSG 7022)
    #[must_use]
    pub fn international_1924() -> Ellipsoid {
        Ellipsoid::from_inverse_flattening("International 1924", 6_378_388., 297., Authority::new("EPSG", 7022))
    }

    /// Look up a builtin ellipsoid by conventional short name
    pub fn named(name: &str) -> Result<Ellipsoid, Error> {
        match name {
            "WGS84" => Ok(Ellipsoid::wgs84()),
            "GRS80" => Ok(Ellipsoid::grs80()),
            "WGS72" => Ok(Ellipsoid::wgs72()),
            "intl" => Ok(Ellipsoid::international_1924()),
            _ => Err(Error::UnknownEllipsoid(name.to_string())),
        }
    }

    // ----- A C C E S S O R S ---------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    #[must_use]
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major
    }

    #[must_use]
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_minor
    }

    #[must_use]
    pub fn inverse_flattening(&self) -> f64 {
        self.inverse_flattening
    }

    #[must_use]
    pub fn is_ivf_definitive(&self) -> bool {
        self.ivf_definitive
    }

    #[must_use]
    pub fn unit(&self) -> &LinearUnit {
        &self.unit
    }

    /// The squared eccentricity *e² = (a² - b²) / a²*
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        let a = self.semi_major;
        let b = self.semi_minor;
        (a * a - b * b) / (a * a)
    }

    #[must_use]
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity_squared().sqrt()
    }

    // ----- E Q U A L I T Y   A N D   W K T -------------------------------------------

    /// Defining-parameter equality: names, aliases and authority codes are
    /// not compared
    #[must_use]
    pub fn equal_params(&self, other: &Ellipsoid) -> bool {
        self.inverse_flattening == other.inverse_flattening
            && self.ivf_definitive == other.ivf_definitive
            && self.semi_major == other.semi_major
            && self.semi_minor == other.semi_minor
            && self.unit.equal_params(&other.unit)
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!(
            "SPHEROID[\"{}\", {}, {}{}]",
            self.name,
            self.semi_major,
            self.inverse_flattening,
            self.authority.wkt_tail()
        )
    }
}

// ----- T E S T S ---------------------------------------------------------------------
