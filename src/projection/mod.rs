//! The map projection library: shared ellipsoidal machinery, per-projection
//! kernels working in radians and metres, and the name-based dispatch used
//! by the transformation planner.
//!
//! Each projection file holds one kernel. The [`ProjectionBase`] here wraps
//! the kernels into the common outer form: degrees and projection units on
//! the outside, radians and metres on the inside, false origin and unit
//! factor applied on the way through.

use crate::authoring::*;

mod albers;
mod cassini;
mod krovak;
mod lcc;
mod mercator;
mod omerc;
mod polyconic;
mod sterea;
mod tmerc;

pub use albers::Albers;
pub use cassini::CassiniSoldner;
pub use krovak::Krovak;
pub use lcc::LambertConformalConic;
pub use mercator::Mercator;
pub use omerc::ObliqueMercator;
pub use polyconic::Polyconic;
pub use sterea::ObliqueStereographic;
pub use tmerc::TransverseMercator;

pub(crate) const EPSLN: f64 = 1.0e-10;

// Meridian arc series coefficients (Snyder 3-21)
const C00: f64 = 1.0;
const C02: f64 = 0.25;
const C04: f64 = 0.046875;
const C06: f64 = 0.01953125;
const C08: f64 = 0.01068115234375;
const C22: f64 = 0.75;
const C44: f64 = 0.46875;
const C46: f64 = 0.01302083333333333333;
const C48: f64 = 0.00712076822916666666;
const C66: f64 = 0.36458333333333333333;
const C68: f64 = 0.00569661458333333333;
const C88: f64 = 0.3076171875;

const MLFN_TOL: f64 = 1e-11;

/// Ellipsoid constants and natural-origin parameters shared by every
/// projection kernel
#[derive(Clone, Debug)]
pub struct ProjectionBase {
    pub semi_major: f64,
    pub semi_minor: f64,
    pub meters_per_unit: f64,
    /// First eccentricity squared, from `2f - f^2`
    pub es: f64,
    pub e: f64,
    pub scale_factor: f64,
    pub central_meridian: f64,
    pub lat_origin: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    en: [f64; 5],
}

impl ProjectionBase {
    /// Reads the parameters every projection shares. The axes and the
    /// unit factor are mandatory, the natural origin accepts the EPSG
    /// alternate names, the offsets default to zero
    pub fn new(params: &ParameterSet) -> Result<ProjectionBase, Error> {
        let semi_major = params.value("semi_major", &[])?;
        let semi_minor = params.value("semi_minor", &[])?;
        let meters_per_unit = params.value("unit", &[])?;

        let f = (semi_major - semi_minor) / semi_major;
        let es = 2.0 * f - f * f;

        let scale_factor = params.optional("scale_factor", &[], 1.0);
        let central_meridian = params
            .value("central_meridian", &["longitude_of_center"])?
            .to_radians();
        let lat_origin = params
            .value("latitude_of_origin", &["latitude_of_center"])?
            .to_radians();
        let false_easting = params.optional("false_easting", &[], 0.0) * meters_per_unit;
        let false_northing = params.optional("false_northing", &[], 0.0) * meters_per_unit;

        let t2 = es * es;
        let t3 = t2 * es;
        let en = [
            C00 - es * (C02 + es * (C04 + es * (C06 + es * C08))),
            es * (C22 - es * (C04 + es * (C06 + es * C08))),
            t2 * (C44 - es * (C46 + es * C48)),
            t3 * (C66 - es * C68),
            t3 * es * C88,
        ];

        Ok(ProjectionBase {
            semi_major,
            semi_minor,
            meters_per_unit,
            es,
            e: es.sqrt(),
            scale_factor,
            central_meridian,
            lat_origin,
            false_easting,
            false_northing,
            en,
        })
    }

    /// Meridian arc length from the equator to `phi`, as a fraction of
    /// the semi-major axis
    pub(crate) fn mlfn(&self, phi: f64, sphi: f64, cphi: f64) -> f64 {
        let cphi = cphi * sphi;
        let sphi = sphi * sphi;
        let en = &self.en;
        en[0] * phi - cphi * (en[1] + sphi * (en[2] + sphi * (en[3] + sphi * en[4])))
    }

    /// Latitude from a meridian arc length, by Newton iteration
    pub(crate) fn inv_mlfn(&self, arg: f64) -> Result<f64, Error> {
        let k = 1.0 / (1.0 - self.es);
        let mut phi = arg;
        // rarely goes over 5 iterations
        for _ in 0..20 {
            let s = phi.sin();
            let mut t = 1.0 - self.es * s * s;
            t = (self.mlfn(phi, s, phi.cos()) - arg) * (t * t.sqrt()) * k;
            phi -= t;
            if t.abs() < MLFN_TOL {
                return Ok(phi);
            }
        }
        Err(Error::NoConvergence("meridian arc inversion"))
    }

    /// Outer forward step: degrees in, projection units out. The kernel
    /// works in radians and metres and never sees the false origin
    pub(crate) fn degrees_to_meters<K>(&self, point: &[f64], kernel: K) -> Result<Vec<f64>, Error>
    where
        K: Fn(f64, f64) -> Result<(f64, f64), Error>,
    {
        let (x, y) = kernel(point[0].to_radians(), point[1].to_radians())?;
        let mut out = point.to_vec();
        out[0] = (x + self.false_easting) / self.meters_per_unit;
        out[1] = (y + self.false_northing) / self.meters_per_unit;
        Ok(out)
    }

    /// Outer inverse step: projection units in, degrees out
    pub(crate) fn meters_to_degrees<K>(&self, point: &[f64], kernel: K) -> Result<Vec<f64>, Error>
    where
        K: Fn(f64, f64) -> Result<(f64, f64), Error>,
    {
        let x = point[0] * self.meters_per_unit - self.false_easting;
        let y = point[1] * self.meters_per_unit - self.false_northing;
        let (lon, lat) = kernel(x, y)?;
        let mut out = point.to_vec();
        out[0] = lon.to_degrees();
        out[1] = lat.to_degrees();
        Ok(out)
    }
}

// ----- S H A R E D   S P H E R O I D A L   F U N C T I O N S -------------------------

/// Bring a longitude into the [-pi, pi] range
pub(crate) fn adjust_lon(mut x: f64) -> f64 {
    for _ in 0..4 {
        if x.abs() <= std::f64::consts::PI {
            break;
        }
        if (x / std::f64::consts::PI).abs() < 2.0 {
            x -= x.signum() * std::f64::consts::TAU;
        } else {
            x -= (x / std::f64::consts::TAU).trunc() * std::f64::consts::TAU;
        }
    }
    x
}

/// Radius of the parallel of latitude, as a fraction of the semi-major
/// axis (Snyder 14-15)
pub(crate) fn msfnz(eccent: f64, sinphi: f64, cosphi: f64) -> f64 {
    let con = eccent * sinphi;
    cosphi / (1.0 - con * con).sqrt()
}

/// The isometric-latitude auxiliary t (Snyder 15-9), used by the
/// conformal conic family
pub(crate) fn tsfnz(eccent: f64, phi: f64, sinphi: f64) -> f64 {
    let con = eccent * sinphi;
    let com = 0.5 * eccent;
    let con = ((1.0 - con) / (1.0 + con)).powf(com);
    (0.5 * (std::f64::consts::FRAC_PI_2 - phi)).tan() / con
}

/// Latitude from the auxiliary t, by fixed-point iteration (Snyder 7-9)
pub(crate) fn phi2z(eccent: f64, ts: f64) -> Result<f64, Error> {
    let eccnth = 0.5 * eccent;
    let mut chi = std::f64::consts::FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..=15 {
        let con = eccent * chi.sin();
        let dphi = std::f64::consts::FRAC_PI_2
            - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(eccnth)).atan()
            - chi;
        chi += dphi;
        if dphi.abs() <= 1e-10 {
            return Ok(chi);
        }
    }
    Err(Error::NoConvergence("conformal latitude iteration"))
}

/// Arcsine guarded against the argument drifting just outside [-1, 1]
pub(crate) fn asinz(con: f64) -> f64 {
    con.clamp(-1.0, 1.0).asin()
}

// ----- D I S P A T C H ---------------------------------------------------------------

/// Instantiate a projection by its WKT classification name. The name is
/// matched case-insensitively with spaces treated as underscores, and
/// the common EPSG spelling variants are accepted
pub fn named(name: &str, params: &ParameterSet) -> Result<Box<dyn Transform>, Error> {
    let key = name.to_lowercase().replace(' ', "_");
    debug!("instantiating projection '{key}'");
    Ok(match key.as_str() {
        "mercator" | "mercator_1sp" | "mercator_2sp" => Box::new(Mercator::new(params)?),
        "pseudo-mercator" | "popular_visualisation_pseudo-mercator" | "google_mercator" => {
            Box::new(Mercator::pseudo(params)?)
        }
        "transverse_mercator" => Box::new(TransverseMercator::new(params)?),
        "albers" | "albers_conic_equal_area" => Box::new(Albers::new(params)?),
        "krovak" => Box::new(Krovak::new(params)?),
        "polyconic" => Box::new(Polyconic::new(params)?),
        "lambert_conformal_conic"
        | "lambert_conformal_conic_2sp"
        | "lambert_conic_conformal_(2sp)" => Box::new(LambertConformalConic::new(params)?),
        "cassini_soldner" => Box::new(CassiniSoldner::new(params)?),
        "hotine_oblique_mercator" => Box::new(ObliqueMercator::hotine(params)?),
        "oblique_mercator" => Box::new(ObliqueMercator::new(params)?),
        "oblique_stereographic" => Box::new(ObliqueStereographic::new(params)?),
        _ => return Err(Error::UnknownProjection(name.to_string())),
    })
}

// ----- T E S T S ---------------------------------------------------------------------
