//! Linear and angular units of measure. The planner cares about exactly one
//! thing: the conversion factor to the SI base (metres, radians). Names and
//! authority codes ride along for diagnostics and WKT round-tripping.

use crate::authoring::*;

// Angular unit factors closer than this are considered equal
const ANGULAR_TOLERANCE: f64 = 2.0e-17;

/// A unit of length, described by its conversion factor to metres
#[derive(Clone, Debug)]
pub struct LinearUnit {
    pub name: String,
    pub authority: Authority,
    pub meters_per_unit: f64,
}

impl LinearUnit {
    pub fn new(name: &str, meters_per_unit: f64, authority: Authority) -> LinearUnit {
        LinearUnit {
            name: name.to_string(),
            authority,
            meters_per_unit,
        }
    }

    /// The international metre, SI standard unit (EPSG 9001)
    #[must_use]
    pub fn metre() -> LinearUnit {
        LinearUnit::new("metre", 1.0, Authority::new("EPSG", 9001))
    }

    /// International foot, 1 ft = 0.3048 m (EPSG 9002)
    #[must_use]
    pub fn foot() -> LinearUnit {
        LinearUnit::new("foot", 0.3048, Authority::new("EPSG", 9002))
    }

    /// US survey foot, 1 ft = 1200/3937 m (EPSG 9003)
    #[must_use]
    pub fn us_survey_foot() -> LinearUnit {
        LinearUnit::new("US survey foot", 1200.0 / 3937.0, Authority::new("EPSG", 9003))
    }

    /// Unit equality disregards names and authority codes
    #[must_use]
    pub fn equal_params(&self, other: &LinearUnit) -> bool {
        self.meters_per_unit == other.meters_per_unit
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!(
            "UNIT[\"{}\", {}{}]",
            self.name,
            self.meters_per_unit,
            self.authority.wkt_tail()
        )
    }
}

/// A unit of angle, described by its conversion factor to radians
#[derive(Clone, Debug)]
pub struct AngularUnit {
    pub name: String,
    pub authority: Authority,
    pub radians_per_unit: f64,
}

impl AngularUnit {
    pub fn new(name: &str, radians_per_unit: f64, authority: Authority) -> AngularUnit {
        AngularUnit {
            name: name.to_string(),
            authority,
            radians_per_unit,
        }
    }

    /// The degree, π/180 radians (EPSG 9102)
    #[must_use]
    pub fn degrees() -> AngularUnit {
        AngularUnit::new(
            "degree",
            0.017_453_292_519_943_295,
            Authority::new("EPSG", 9102),
        )
    }

    /// The radian, SI standard unit (EPSG 9101)
    #[must_use]
    pub fn radian() -> AngularUnit {
        AngularUnit::new("radian", 1.0, Authority::new("EPSG", 9101))
    }

    /// Unit equality disregards names and authority codes, and absorbs
    /// last-ulp differences in the factor
    #[must_use]
    pub fn equal_params(&self, other: &AngularUnit) -> bool {
        (self.radians_per_unit - other.radians_per_unit).abs() < ANGULAR_TOLERANCE
    }

    #[must_use]
    pub fn wkt(&self) -> String {
        format!(
            "UNIT[\"{}\", {}{}]",
            self.name,
            self.radians_per_unit,
            self.authority.wkt_tail()
        )
    }
}

// ----- T E S T S ---------------------------------------------------------------------
