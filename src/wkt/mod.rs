//! The WKT reader: recursive descent over the token stream, producing
//! coordinate system descriptors and affine math transforms.
//!
//! Each `read_*` method is entered with its keyword already consumed and
//! leaves with the matching closing bracket consumed. Clause order follows
//! common usage: a `GEOGCS` body is strict (`DATUM`, `PRIMEM`, `UNIT`, then
//! optional axes and authority), while a `PROJCS` body accepts its
//! `PROJECTION`, `UNIT`, `AXIS` and `AUTHORITY` clauses in any order.
//!
//! A clause that carries no `AXIS` entries gets the conventional default
//! axes substituted, and a missing `AUTHORITY` stays empty; both are
//! ignored by parameter equality anyway.

use crate::authoring::*;

/// Any value a free-standing WKT string can describe
#[derive(Clone, Debug)]
pub enum WktObject {
    LinearUnit(LinearUnit),
    Ellipsoid(Ellipsoid),
    Datum(HorizontalDatum),
    PrimeMeridian(PrimeMeridian),
    CoordinateSystem(CoordinateSystem),
    MathTransform(AffineTransform),
}

/// Parse any free-standing WKT clause, dispatching on its keyword
pub fn parse(text: &str) -> Result<WktObject, Error> {
    let mut reader = WktReader::new(text);
    let token = reader.next();
    match token.text.as_str() {
        "UNIT" => Ok(WktObject::LinearUnit(reader.read_linear_unit()?)),
        "SPHEROID" => Ok(WktObject::Ellipsoid(reader.read_ellipsoid()?)),
        "DATUM" => Ok(WktObject::Datum(reader.read_datum()?)),
        "PRIMEM" => Ok(WktObject::PrimeMeridian(reader.read_prime_meridian()?)),
        "PARAM_MT" => Ok(WktObject::MathTransform(reader.read_affine_transform()?)),
        _ => Ok(WktObject::CoordinateSystem(
            reader.coordinate_system(token)?,
        )),
    }
}

/// Parse a `GEOGCS`, `PROJCS` or `FITTED_CS` clause
pub fn parse_coordinate_system(text: &str) -> Result<CoordinateSystem, Error> {
    let mut reader = WktReader::new(text);
    let token = reader.next();
    reader.coordinate_system(token)
}

/// Parse a `PARAM_MT["Affine", ...]` clause
pub fn parse_math_transform(text: &str) -> Result<AffineTransform, Error> {
    let mut reader = WktReader::new(text);
    let token = reader.next();
    if token.kind == TokenKind::Eof {
        return Err(Error::Syntax("empty WKT string".to_string()));
    }
    if token.text != "PARAM_MT" {
        return Err(Error::Syntax(format!(
            "'{}' is not recognized.",
            token.text
        )));
    }
    reader.read_affine_transform()
}

fn unexpected(token: &Token, expected: &str) -> Error {
    Error::Syntax(format!(
        "Expecting ('{}') but got a '{}' at line {} column {}.",
        expected, token.text, token.line, token.column
    ))
}

// ----- T H E   R E A D E R -----------------------------------------------------------

/// The tokenizer plus one token of pushback: the parameter list reader
/// has to look past a parameter to know the list has ended
struct WktReader {
    tok: Tokenizer,
    pending: Option<Token>,
}

impl WktReader {
    fn new(text: &str) -> WktReader {
        WktReader {
            tok: Tokenizer::new(text),
            pending: None,
        }
    }

    fn next(&mut self) -> Token {
        match self.pending.take() {
            Some(token) => token,
            None => self.tok.next_token(),
        }
    }

    fn push_back(&mut self, token: Token) {
        self.pending = Some(token);
    }

    fn expect(&mut self, expected: &str) -> Result<(), Error> {
        let token = self.next();
        if token.text != expected {
            return Err(unexpected(&token, expected));
        }
        Ok(())
    }

    fn number(&mut self) -> Result<f64, Error> {
        match self.pending.take() {
            Some(token) => token.number(),
            None => self.tok.read_number(),
        }
    }

    fn quoted(&mut self) -> Result<String, Error> {
        self.expect("\"")?;
        let mut word = String::new();
        loop {
            let token = self.tok.next_token_any();
            match token.kind {
                TokenKind::Eof => {
                    return Err(Error::Syntax(format!(
                        "Unterminated quoted string at line {} column {}.",
                        token.line, token.column
                    )))
                }
                _ if token.text == "\"" => return Ok(word),
                _ => word.push_str(&token.text),
            }
        }
    }

    fn authority(&mut self) -> Result<Authority, Error> {
        self.tok.read_authority()
    }

    /// The tail of a simple clause: either the closing bracket right away,
    /// or a comma, an `AUTHORITY` sub-clause and then the closing bracket
    fn authority_tail(&mut self) -> Result<Authority, Error> {
        let token = self.next();
        if token.text == "]" {
            return Ok(Authority::none());
        }
        if token.text == "," {
            self.expect("AUTHORITY")?;
            let authority = self.authority()?;
            self.expect("]")?;
            return Ok(authority);
        }
        Err(unexpected(&token, "]"))
    }

    // ----- S I M P L E   C L A U S E S -----------------------------------------------

    fn read_linear_unit(&mut self) -> Result<LinearUnit, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        let meters_per_unit = self.number()?;
        let authority = self.authority_tail()?;
        Ok(LinearUnit::new(&name, meters_per_unit, authority))
    }

    fn read_angular_unit(&mut self) -> Result<AngularUnit, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        let radians_per_unit = self.number()?;
        let authority = self.authority_tail()?;
        Ok(AngularUnit::new(&name, radians_per_unit, authority))
    }

    /// A `SPHEROID` clause always gives semi-major axis in metres and a
    /// definitive inverse flattening
    fn read_ellipsoid(&mut self) -> Result<Ellipsoid, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        let semi_major = self.number()?;
        self.expect(",")?;
        let inverse_flattening = self.number()?;
        let authority = self.authority_tail()?;
        Ok(Ellipsoid::from_inverse_flattening(
            &name,
            semi_major,
            inverse_flattening,
            authority,
        ))
    }

    /// A `PRIMEM` clause carries no unit of its own; the longitude is
    /// taken to be in degrees
    fn read_prime_meridian(&mut self) -> Result<PrimeMeridian, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        let longitude = self.number()?;
        let authority = self.authority_tail()?;
        Ok(PrimeMeridian::new(
            &name,
            longitude,
            AngularUnit::degrees(),
            authority,
        ))
    }

    /// A `TOWGS84` clause with 3, 6 or 7 values; absent values are zero
    fn read_towgs84(&mut self) -> Result<Wgs84ConversionInfo, Error> {
        self.expect("[")?;
        let dx = self.number()?;
        self.expect(",")?;
        let dy = self.number()?;
        self.expect(",")?;
        let dz = self.number()?;
        let mut info = Wgs84ConversionInfo::translation(dx, dy, dz);

        let mut token = self.next();
        if token.text == "," {
            info.ex = self.number()?;
            self.expect(",")?;
            info.ey = self.number()?;
            self.expect(",")?;
            info.ez = self.number()?;
            token = self.next();
            if token.text == "," {
                info.ppm = self.number()?;
                token = self.next();
            }
        }
        if token.text != "]" {
            return Err(unexpected(&token, "]"));
        }
        Ok(info)
    }

    fn read_axis(&mut self) -> Result<AxisInfo, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        let word = self.next();
        let orientation = AxisOrientation::parse(&word.text)?;
        self.expect("]")?;
        Ok(AxisInfo { name, orientation })
    }

    // ----- C O M P O U N D   C L A U S E S -------------------------------------------

    fn read_datum(&mut self) -> Result<HorizontalDatum, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        self.expect("SPHEROID")?;
        let ellipsoid = self.read_ellipsoid()?;

        let mut wgs84 = None;
        let mut authority = Authority::none();
        loop {
            let token = self.next();
            match token.text.as_str() {
                "," => continue,
                "TOWGS84" => wgs84 = Some(self.read_towgs84()?),
                "AUTHORITY" => authority = self.authority()?,
                "]" => break,
                _ => return Err(unexpected(&token, "]")),
            }
        }
        Ok(HorizontalDatum::new(
            &name,
            DatumKind::Geocentric,
            ellipsoid,
            wgs84,
            authority,
        ))
    }

    fn read_geographic(&mut self) -> Result<GeographicCs, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        self.expect("DATUM")?;
        let datum = self.read_datum()?;
        self.expect(",")?;
        self.expect("PRIMEM")?;
        let prime_meridian = self.read_prime_meridian()?;
        self.expect(",")?;
        self.expect("UNIT")?;
        let angular_unit = self.read_angular_unit()?;

        let mut axes = Vec::new();
        let mut authority = Authority::none();
        loop {
            let token = self.next();
            match token.text.as_str() {
                "," => continue,
                "AXIS" => axes.push(self.read_axis()?),
                "AUTHORITY" => authority = self.authority()?,
                "]" => break,
                _ => return Err(unexpected(&token, "]")),
            }
        }
        if axes.is_empty() {
            axes = GeographicCs::default_axes();
        }
        Ok(GeographicCs {
            name,
            authority,
            angular_unit,
            datum,
            prime_meridian,
            axes,
        })
    }

    /// The `PROJECTION` clause plus the `PARAMETER` list that follows it
    /// as siblings in the enclosing `PROJCS`
    fn read_projection(&mut self) -> Result<ProjectionDef, Error> {
        self.expect("[")?;
        let class_name = self.quoted()?;
        let authority = self.authority_tail()?;
        self.expect(",")?;
        self.expect("PARAMETER")?;

        let mut pairs: Vec<(String, f64)> = Vec::new();
        loop {
            self.expect("[")?;
            let name = self.quoted()?;
            self.expect(",")?;
            let value = self.number()?;
            self.expect("]")?;
            pairs.push((name, value));

            // A comma and another PARAMETER keyword continue the list;
            // anything else belongs to the enclosing clause
            let token = self.next();
            if token.text != "," {
                self.push_back(token);
                break;
            }
            let word = self.next();
            if word.text != "PARAMETER" {
                self.push_back(word);
                break;
            }
        }

        let mut projection = ProjectionDef::new(&class_name, ParameterSet::from_pairs(pairs));
        projection.authority = authority;
        Ok(projection)
    }

    fn read_projected(&mut self) -> Result<ProjectedCs, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        self.expect("GEOGCS")?;
        let geographic = self.read_geographic()?;

        let mut projection = None;
        let mut linear_unit = None;
        let mut axes = Vec::new();
        let mut authority = Authority::none();
        loop {
            let token = self.next();
            match token.text.as_str() {
                "," => continue,
                "PROJECTION" => projection = Some(self.read_projection()?),
                "UNIT" => linear_unit = Some(self.read_linear_unit()?),
                "AXIS" => axes.push(self.read_axis()?),
                "AUTHORITY" => authority = self.authority()?,
                "]" => break,
                _ => return Err(unexpected(&token, "]")),
            }
        }

        let projection = projection.ok_or_else(|| {
            Error::Syntax(format!("the PROJCS clause '{name}' has no PROJECTION"))
        })?;
        let linear_unit = linear_unit
            .ok_or_else(|| Error::Syntax(format!("the PROJCS clause '{name}' has no UNIT")))?;
        if axes.is_empty() {
            axes = ProjectedCs::default_axes();
        }
        Ok(ProjectedCs {
            name,
            authority,
            geographic,
            linear_unit,
            projection,
            axes,
        })
    }

    fn read_fitted(&mut self) -> Result<FittedCs, Error> {
        self.expect("[")?;
        let name = self.quoted()?;
        self.expect(",")?;
        self.expect("PARAM_MT")?;
        let to_base = self.read_affine_transform()?;
        self.expect(",")?;

        let word = self.next();
        let base = match word.text.as_str() {
            "GEOGCS" => CoordinateSystem::Geographic(self.read_geographic()?),
            "PROJCS" => CoordinateSystem::Projected(self.read_projected()?),
            _ => {
                return Err(Error::Unsupported(format!(
                    "'{}' as the base of a fitted coordinate system",
                    word.text
                )))
            }
        };

        let mut authority = Authority::none();
        loop {
            let token = self.next();
            match token.text.as_str() {
                "," => continue,
                "AUTHORITY" => authority = self.authority()?,
                "]" => break,
                _ => return Err(unexpected(&token, "]")),
            }
        }
        let mut fitted = FittedCs::new(&name, to_base, base)?;
        fitted.authority = authority;
        Ok(fitted)
    }

    fn coordinate_system(&mut self, keyword: Token) -> Result<CoordinateSystem, Error> {
        if keyword.kind == TokenKind::Eof {
            return Err(Error::Syntax("empty WKT string".to_string()));
        }
        match keyword.text.as_str() {
            "GEOGCS" => Ok(CoordinateSystem::Geographic(self.read_geographic()?)),
            "PROJCS" => Ok(CoordinateSystem::Projected(self.read_projected()?)),
            "FITTED_CS" => Ok(CoordinateSystem::Fitted(self.read_fitted()?)),
            "GEOCCS" | "COMPD_CS" | "LOCAL_CS" | "VERT_CS" => Err(Error::Unsupported(format!(
                "{} coordinate systems",
                keyword.text
            ))),
            _ => Err(Error::Syntax(format!(
                "'{}' is not recognized.",
                keyword.text
            ))),
        }
    }

    // ----- M A T H   T R A N S F O R M S ---------------------------------------------

    /// The body of a `PARAM_MT` clause. The only transform classification
    /// in use is "Affine": a `num_row` x `num_col` matrix with its cells
    /// given as `elt_<row>_<col>` parameters. Cells left out stay zero,
    /// and parameter names that match no cell are ignored
    fn read_affine_transform(&mut self) -> Result<AffineTransform, Error> {
        self.expect("[")?;
        let class_name = self.quoted()?;
        if !class_name.eq_ignore_ascii_case("affine") {
            return Err(Error::Unsupported(format!(
                "'{class_name}' math transforms"
            )));
        }
        self.expect(",")?;

        let mut params: Vec<(String, f64)> = Vec::new();
        let mut token = self.next();
        while token.text == "PARAMETER" {
            self.expect("[")?;
            let name = self.quoted()?;
            self.expect(",")?;
            let value = self.number()?;
            self.expect("]")?;
            params.push((name, value));

            token = self.next();
            if token.text == "," {
                token = self.next();
            }
        }
        if token.text != "]" {
            return Err(unexpected(&token, "]"));
        }

        let lookup = |key: &str| {
            params
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(key))
                .map(|(_, v)| *v)
        };
        let num_row = lookup("num_row").ok_or_else(|| Error::MissingParam("num_row".to_string()))?;
        let num_col = lookup("num_col").ok_or_else(|| Error::MissingParam("num_col".to_string()))?;
        if num_row < 1.0 || num_row.fract() != 0.0 {
            return Err(Error::BadParam("num_row".to_string(), num_row.to_string()));
        }
        if num_col < 1.0 || num_col.fract() != 0.0 {
            return Err(Error::BadParam("num_col".to_string(), num_col.to_string()));
        }

        let rows = num_row as usize;
        let cols = num_col as usize;
        let mut matrix = vec![vec![0.0; cols]; rows];
        for (name, value) in &params {
            let lower = name.to_lowercase();
            let Some(cell) = lower.strip_prefix("elt_") else {
                continue;
            };
            let Some((r, c)) = cell.split_once('_') else {
                continue;
            };
            let (Ok(r), Ok(c)) = (r.parse::<usize>(), c.parse::<usize>()) else {
                continue;
            };
            if r < rows && c < cols {
                matrix[r][c] = *value;
            }
        }
        AffineTransform::new(matrix)
    }
}

// ----- T E S T S ---------------------------------------------------------------------
