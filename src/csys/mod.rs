//! The coordinate system descriptor model: the typed value records the WKT
//! reader produces and the transformation planner consumes.
//!
//! A [`CoordinateSystem`] is a closed sum over the four variants the engine
//! routes between: geographic, geocentric, projected and fitted. Everything
//! is an immutable value; equality for routing purposes is *parameter*
//! equality (`equal_params`), which ignores names, aliases and authority
//! codes throughout.

use crate::authoring::*;
use once_cell::sync::Lazy;

mod datum;
mod ellipsoid;
mod parameters;
mod unit;

pub use datum::{DatumKind, HorizontalDatum, PrimeMeridian, Wgs84ConversionInfo};
pub use ellipsoid::Ellipsoid;
pub use parameters::ParameterSet;
pub use unit::{AngularUnit, LinearUnit};

// ----- A U T H O R I T Y -------------------------------------------------------------

/// An authority/code pair identifying a descriptor in some registry
/// (typically EPSG). Plays no role in equality or routing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Authority {
    pub name: String,
    pub code: i64,
}

impl Authority {
    pub fn new(name: &str, code: i64) -> Authority {
        Authority {
            name: name.to_string(),
            code,
        }
    }

    #[must_use]
    pub fn none() -> Authority {
        Authority::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() || self.code <= 0
    }

    /// The `, AUTHORITY["...", "..."]` tail of a WKT clause, empty when
    /// the authority is undefined or its code is non-positive
    #[must_use]
    pub fn wkt_tail(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!(", AUTHORITY[\"{}\", \"{}\"]", self.name, self.code)
    }
}

// ----- A X E S -----------------------------------------------------------------------

/// Axis direction, as the WKT orientation keywords
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisOrientation {
    Down,
    East,
    North,
    Other,
    South,
    Up,
    West,
}

impl AxisOrientation {
    /// Case-insensitive: the word is upper-cased before matching
    pub fn parse(word: &str) -> Result<AxisOrientation, Error> {
        match word.to_uppercase().as_str() {
            "DOWN" => Ok(AxisOrientation::Down),
            "EAST" => Ok(AxisOrientation::East),
            "NORTH" => Ok(AxisOrientation::North),
            "OTHER" => Ok(AxisOrientation::Other),
            "SOUTH" => Ok(AxisOrientation::South),
            "UP" => Ok(AxisOrientation::Up),
            "WEST" => Ok(AxisOrientation::West),
            _ => Err(Error::BadParam("AXIS".to_string(), word.to_string())),
        }
    }

    #[must_use]
    pub fn as_wkt(&self) -> &'static str {
        match self {
            AxisOrientation::Down => "DOWN",
            AxisOrientation::East => "EAST",
            AxisOrientation::North => "NORTH",
            AxisOrientation::Other => "OTHER",
            AxisOrientation::South => "SOUTH",
            AxisOrientation::Up => "UP",
            AxisOrientation::West => "WEST",
        }
    }
}

/// One axis of a coordinate system
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisInfo {
    pub name: String,
    pub orientation: AxisOrientation,
}

impl AxisInfo {
    pub fn new(name: &str, orientation: AxisOrientation) -> AxisInfo {
        AxisInfo {
            name: name.to_string(),
            orientation,
        }
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!("AXIS[\"{}\", {}]", self.name, self.orientation.as_wkt())
    }
}

fn axes_match(axes: &[AxisInfo], defaults: &[AxisInfo]) -> bool {
    axes.len() == defaults.len() && axes.iter().zip(defaults).all(|(a, d)| a == d)
}

fn orientations_match(a: &[AxisInfo], b: &[AxisInfo]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.orientation == y.orientation)
}

// ----- P R O J E C T I O N   D E S C R I P T O R -------------------------------------

/// The projection clause of a projected system: a classification name
/// (dispatched on by the planner) and its parameter list
#[derive(Clone, Debug)]
pub struct ProjectionDef {
    pub name: String,
    pub class_name: String,
    pub authority: Authority,
    pub parameters: ParameterSet,
}

impl ProjectionDef {
    pub fn new(class_name: &str, parameters: ParameterSet) -> ProjectionDef {
        ProjectionDef {
            name: class_name.to_string(),
            class_name: class_name.to_string(),
            authority: Authority::none(),
            parameters,
        }
    }

    #[must_use]
    pub fn equal_params(&self, other: &ProjectionDef) -> bool {
        self.class_name.eq_ignore_ascii_case(&other.class_name)
            && self.parameters.equal_params(&other.parameters)
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!("PROJECTION[\"{}\"{}]", self.name, self.authority.wkt_tail())
    }
}

// ----- T H E   F O U R   V A R I A N T S ---------------------------------------------

/// A geographic (longitude/latitude) coordinate system
#[derive(Clone, Debug)]
pub struct GeographicCs {
    pub name: String,
    pub authority: Authority,
    pub angular_unit: AngularUnit,
    pub datum: HorizontalDatum,
    pub prime_meridian: PrimeMeridian,
    pub axes: Vec<AxisInfo>,
}

static WGS84_GEOGRAPHIC: Lazy<GeographicCs> = Lazy::new(|| GeographicCs {
    name: "WGS 84".to_string(),
    authority: Authority::new("EPSG", 4326),
    angular_unit: AngularUnit::degrees(),
    datum: HorizontalDatum::wgs84(),
    prime_meridian: PrimeMeridian::greenwich(),
    axes: GeographicCs::default_axes(),
});

impl GeographicCs {
    /// The axis list substituted when a `GEOGCS` clause carries none
    #[must_use]
    pub fn default_axes() -> Vec<AxisInfo> {
        vec![
            AxisInfo::new("Lon", AxisOrientation::East),
            AxisInfo::new("Lat", AxisOrientation::North),
        ]
    }

    /// WGS 84 (EPSG 4326)
    #[must_use]
    pub fn wgs84() -> GeographicCs {
        WGS84_GEOGRAPHIC.clone()
    }

    #[must_use]
    pub fn equal_params(&self, other: &GeographicCs) -> bool {
        orientations_match(&self.axes, &other.axes)
            && self.angular_unit.equal_params(&other.angular_unit)
            && self.datum.equal_params(&other.datum)
            && self.prime_meridian.equal_params(&other.prime_meridian)
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        let mut wkt = format!(
            "GEOGCS[\"{}\", {}, {}, {}",
            self.name,
            self.datum.wkt(),
            self.prime_meridian.wkt(),
            self.angular_unit.wkt()
        );
        if !axes_match(&self.axes, &Self::default_axes()) {
            for axis in &self.axes {
                wkt += &format!(", {}", axis.wkt());
            }
        }
        wkt += &self.authority.wkt_tail();
        wkt + "]"
    }
}

/// A geocentric (earth-centered cartesian) coordinate system
#[derive(Clone, Debug)]
pub struct GeocentricCs {
    pub name: String,
    pub authority: Authority,
    pub linear_unit: LinearUnit,
    pub datum: HorizontalDatum,
    pub prime_meridian: PrimeMeridian,
    pub axes: Vec<AxisInfo>,
}

impl GeocentricCs {
    #[must_use]
    pub fn default_axes() -> Vec<AxisInfo> {
        vec![
            AxisInfo::new("X", AxisOrientation::Other),
            AxisInfo::new("Y", AxisOrientation::East),
            AxisInfo::new("Z", AxisOrientation::North),
        ]
    }

    pub fn new(
        name: &str,
        datum: HorizontalDatum,
        linear_unit: LinearUnit,
        prime_meridian: PrimeMeridian,
    ) -> GeocentricCs {
        GeocentricCs {
            name: name.to_string(),
            authority: Authority::none(),
            linear_unit,
            datum,
            prime_meridian,
            axes: Self::default_axes(),
        }
    }

    /// WGS84 geocentric, in metres from the earth's center of mass
    #[must_use]
    pub fn wgs84() -> GeocentricCs {
        GeocentricCs::new(
            "WGS84 Geocentric",
            HorizontalDatum::wgs84(),
            LinearUnit::metre(),
            PrimeMeridian::greenwich(),
        )
    }

    #[must_use]
    pub fn equal_params(&self, other: &GeocentricCs) -> bool {
        orientations_match(&self.axes, &other.axes)
            && self.linear_unit.equal_params(&other.linear_unit)
            && self.datum.equal_params(&other.datum)
            && self.prime_meridian.equal_params(&other.prime_meridian)
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        let mut wkt = format!(
            "GEOCCS[\"{}\", {}, {}, {}",
            self.name,
            self.datum.wkt(),
            self.prime_meridian.wkt(),
            self.linear_unit.wkt()
        );
        if !axes_match(&self.axes, &Self::default_axes()) {
            for axis in &self.axes {
                wkt += &format!(", {}", axis.wkt());
            }
        }
        wkt += &self.authority.wkt_tail();
        wkt + "]"
    }
}

/// A projected (cartographic plane) coordinate system
#[derive(Clone, Debug)]
pub struct ProjectedCs {
    pub name: String,
    pub authority: Authority,
    pub geographic: GeographicCs,
    pub linear_unit: LinearUnit,
    pub projection: ProjectionDef,
    pub axes: Vec<AxisInfo>,
}

impl ProjectedCs {
    /// The axis list substituted when a `PROJCS` clause carries none
    #[must_use]
    pub fn default_axes() -> Vec<AxisInfo> {
        vec![
            AxisInfo::new("X", AxisOrientation::East),
            AxisInfo::new("Y", AxisOrientation::North),
        ]
    }

    /// WGS84 / UTM: transverse mercator on a 6 degree zone, scale 0.9996
    /// at the central meridian (EPSG 326xx north, 327xx south)
    pub fn wgs84_utm(zone: u8, north: bool) -> Result<ProjectedCs, Error> {
        if zone < 1 || zone > 60 {
            return Err(Error::General("UTM zone must be between 1 and 60"));
        }
        let parameters = ParameterSet::from_pairs([
            ("latitude_of_origin", 0.0),
            ("central_meridian", f64::from(zone) * 6.0 - 183.0),
            ("scale_factor", 0.9996),
            ("false_easting", 500_000.0),
            ("false_northing", if north { 0.0 } else { 10_000_000.0 }),
        ]);
        let mut projection = ProjectionDef::new("Transverse_Mercator", parameters);
        projection.name = format!("UTM{}{}", zone, if north { "N" } else { "S" });
        let code = 32_600 + i64::from(zone) + if north { 0 } else { 100 };
        projection.authority = Authority::new("EPSG", code);

        Ok(ProjectedCs {
            name: format!(
                "WGS 84 / UTM zone {}{}",
                zone,
                if north { "N" } else { "S" }
            ),
            authority: Authority::new("EPSG", code),
            geographic: GeographicCs::wgs84(),
            linear_unit: LinearUnit::metre(),
            projection,
            axes: vec![
                AxisInfo::new("East", AxisOrientation::East),
                AxisInfo::new("North", AxisOrientation::North),
            ],
        })
    }

    /// WGS 84 / Pseudo-Mercator, the web mapping de-facto standard
    /// (EPSG 3857)
    #[must_use]
    pub fn web_mercator() -> ProjectedCs {
        let parameters = ParameterSet::from_pairs([
            ("latitude_of_origin", 0.0),
            ("central_meridian", 0.0),
            ("false_easting", 0.0),
            ("false_northing", 0.0),
        ]);
        let mut projection =
            ProjectionDef::new("Popular Visualisation Pseudo-Mercator", parameters);
        projection.authority = Authority::new("EPSG", 3856);

        ProjectedCs {
            name: "WGS 84 / Pseudo-Mercator".to_string(),
            authority: Authority::new("EPSG", 3857),
            geographic: GeographicCs::wgs84(),
            linear_unit: LinearUnit::metre(),
            projection,
            axes: vec![
                AxisInfo::new("East", AxisOrientation::East),
                AxisInfo::new("North", AxisOrientation::North),
            ],
        }
    }

    #[must_use]
    pub fn equal_params(&self, other: &ProjectedCs) -> bool {
        orientations_match(&self.axes, &other.axes)
            && self.geographic.equal_params(&other.geographic)
            && self.linear_unit.equal_params(&other.linear_unit)
            && self.projection.equal_params(&other.projection)
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        let mut wkt = format!(
            "PROJCS[\"{}\", {}, {}",
            self.name,
            self.geographic.wkt(),
            self.projection.wkt()
        );
        if !self.projection.parameters.is_empty() {
            wkt += &format!(", {}", self.projection.parameters.wkt());
        }
        wkt += &format!(", {}", self.linear_unit.wkt());
        if !axes_match(&self.axes, &Self::default_axes()) {
            for axis in &self.axes {
                wkt += &format!(", {}", axis.wkt());
            }
        }
        wkt += &self.authority.wkt_tail();
        wkt + "]"
    }
}

/// A coordinate system sitting inside a base system, connected to it by
/// an affine "to base" transform
#[derive(Clone, Debug)]
pub struct FittedCs {
    pub name: String,
    pub authority: Authority,
    pub to_base: AffineTransform,
    pub base: Box<CoordinateSystem>,
}

impl FittedCs {
    /// The to-base transform maps fitted coordinates into the base
    /// system, so its target dimension must match the base system
    pub fn new(
        name: &str,
        to_base: AffineTransform,
        base: CoordinateSystem,
    ) -> Result<FittedCs, Error> {
        if to_base.dim_target() != base.dimension() {
            return Err(Error::DimensionMismatch {
                expected: base.dimension(),
                found: to_base.dim_target(),
            });
        }
        Ok(FittedCs {
            name: name.to_string(),
            authority: Authority::none(),
            to_base,
            base: Box::new(base),
        })
    }

    /// Structural equality: parameter-equal base systems and element-wise
    /// equal to-base matrices
    #[must_use]
    pub fn equal_params(&self, other: &FittedCs) -> bool {
        self.base.equal_params(&other.base) && self.to_base == other.to_base
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!(
            "FITTED_CS[\"{}\", {}, {}]",
            self.name,
            self.to_base.wkt(),
            self.base.wkt()
        )
    }
}

// ----- T H E   C L O S E D   S U M ---------------------------------------------------

/// Any of the four coordinate system variants the planner routes between
#[derive(Clone, Debug)]
pub enum CoordinateSystem {
    Geographic(GeographicCs),
    Geocentric(GeocentricCs),
    Projected(ProjectedCs),
    Fitted(FittedCs),
}

impl CoordinateSystem {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            CoordinateSystem::Geographic(cs) => &cs.name,
            CoordinateSystem::Geocentric(cs) => &cs.name,
            CoordinateSystem::Projected(cs) => &cs.name,
            CoordinateSystem::Fitted(cs) => &cs.name,
        }
    }

    /// The number of coordinates of a point in this system. A fitted
    /// system inherits its base system's axes
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            CoordinateSystem::Geographic(cs) => cs.axes.len(),
            CoordinateSystem::Geocentric(cs) => cs.axes.len(),
            CoordinateSystem::Projected(cs) => cs.axes.len(),
            CoordinateSystem::Fitted(cs) => cs.base.dimension(),
        }
    }

    #[must_use]
    pub fn equal_params(&self, other: &CoordinateSystem) -> bool {
        match (self, other) {
            (CoordinateSystem::Geographic(a), CoordinateSystem::Geographic(b)) => {
                a.equal_params(b)
            }
            (CoordinateSystem::Geocentric(a), CoordinateSystem::Geocentric(b)) => {
                a.equal_params(b)
            }
            (CoordinateSystem::Projected(a), CoordinateSystem::Projected(b)) => a.equal_params(b),
            (CoordinateSystem::Fitted(a), CoordinateSystem::Fitted(b)) => a.equal_params(b),
            _ => false,
        }
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        match self {
            CoordinateSystem::Geographic(cs) => cs.wkt(),
            CoordinateSystem::Geocentric(cs) => cs.wkt(),
            CoordinateSystem::Projected(cs) => cs.wkt(),
            CoordinateSystem::Fitted(cs) => cs.wkt(),
        }
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() -> Result<(), Error> {
        assert_eq!(CoordinateSystem::Geographic(GeographicCs::wgs84()).dimension(), 2);
        assert_eq!(CoordinateSystem::Geocentric(GeocentricCs::wgs84()).dimension(), 3);
        let utm = ProjectedCs::wgs84_utm(31, true)?;
        assert_eq!(CoordinateSystem::Projected(utm).dimension(), 2);
        Ok(())
    }

    #[test]
    fn authority_tail() {
        assert_eq!(Authority::none().wkt_tail(), "");
        assert_eq!(Authority::new("EPSG", 0).wkt_tail(), "");
        assert_eq!(
            Authority::new("EPSG", 4326).wkt_tail(),
            ", AUTHORITY[\"EPSG\", \"4326\"]"
        );
    }

    #[test]
    fn axis_orientation_is_case_insensitive() -> Result<(), Error> {
        assert_eq!(AxisOrientation::parse("north")?, AxisOrientation::North);
        assert_eq!(AxisOrientation::parse("EAST")?, AxisOrientation::East);
        assert!(AxisOrientation::parse("SIDEWAYS").is_err());
        Ok(())
    }

    #[test]
    fn renamed_systems_stay_equal() {
        let a = GeographicCs::wgs84();
        let mut b = GeographicCs::wgs84();
        b.name = "WGS_1984".to_string();
        b.authority = Authority::none();
        b.axes[0].name = "Longitude".to_string();
        assert!(a.equal_params(&b));

        // A different datum is a different system
        let mut c = GeographicCs::wgs84();
        c.datum.ellipsoid = Ellipsoid::international_1924();
        assert!(!a.equal_params(&c));
    }

    #[test]
    fn utm_descriptor() -> Result<(), Error> {
        let utm = ProjectedCs::wgs84_utm(31, true)?;
        assert_eq!(utm.authority.code, 32_631);
        assert_eq!(utm.projection.parameters.get("central_meridian"), Some(3.0));
        assert_eq!(utm.projection.parameters.get("false_northing"), Some(0.0));

        let south = ProjectedCs::wgs84_utm(31, false)?;
        assert_eq!(south.authority.code, 32_731);
        assert_eq!(south.projection.parameters.get("false_northing"), Some(10_000_000.0));

        assert!(ProjectedCs::wgs84_utm(61, true).is_err());
        Ok(())
    }
}
