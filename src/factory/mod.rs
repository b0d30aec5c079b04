//! The transformation planner: given two coordinate system descriptors,
//! assemble the chain of transform legs that carries points from one to
//! the other.
//!
//! Routing is structural. Same-datum geographic pairs get a plain rebase;
//! different datums route through geocentric space, where the Bursa-Wolf
//! parameters of each side (when present and non-zero) supply the shift
//! legs via WGS84. A projected system reaches anything else through its
//! base geographic system, and a fitted system through its to-base affine.
//! A pair with no structural route, a projected/geocentric pair, or a
//! datum pair with no Bursa-Wolf information at all, is a planning error,
//! never a silent identity.

use crate::authoring::*;

/// Plan the transformation pipeline from `source` to `target`
pub fn transformation_between(
    source: &CoordinateSystem,
    target: &CoordinateSystem,
) -> Result<Box<dyn Transform>, Error> {
    use CoordinateSystem::*;
    debug!(
        "planning a transformation from '{}' to '{}'",
        source.name(),
        target.name()
    );
    match (source, target) {
        (Fitted(s), _) => fitted_to_any(s, target),
        (_, Fitted(t)) => any_to_fitted(source, t),
        (Geographic(s), Geographic(t)) => geographic_to_geographic(s, t),
        (Geographic(s), Projected(t)) => geographic_to_projected(s, t),
        (Geographic(s), Geocentric(t)) => geographic_to_geocentric(s, t),
        (Projected(s), Geographic(t)) => projected_to_geographic(s, t),
        (Projected(s), Projected(t)) => projected_to_projected(s, t),
        (Geocentric(s), Geographic(t)) => geocentric_to_geographic(s, t),
        (Geocentric(s), Geocentric(t)) => match geocentric_to_geocentric(s, t)? {
            Some(shift) => Ok(shift),
            None => Err(no_path(source, target)),
        },
        _ => Err(no_path(source, target)),
    }
}

fn no_path(source: &CoordinateSystem, target: &CoordinateSystem) -> Error {
    Error::NoPath(source.name().to_string(), target.name().to_string())
}

/// A single leg stays bare; several become a concatenation
fn chain(mut legs: Vec<Box<dyn Transform>>) -> Result<Box<dyn Transform>, Error> {
    if legs.len() == 1 {
        if let Some(leg) = legs.pop() {
            return Ok(leg);
        }
    }
    Ok(Box::new(Concatenated::new(legs)?))
}

// ----- P R O J E C T E D -------------------------------------------------------------

/// The forward map projection of a projected system: its parameter list
/// completed with the ellipsoid axes and the grid unit factor
fn projection_transform(projected: &ProjectedCs) -> Result<Box<dyn Transform>, Error> {
    let ellipsoid = &projected.geographic.datum.ellipsoid;
    let mut params = projected
        .projection
        .parameters
        .with("semi_major", ellipsoid.semi_major_axis())
        .with("semi_minor", ellipsoid.semi_minor_axis());
    if params.get("unit").is_none() {
        params = params.with("unit", projected.linear_unit.meters_per_unit);
    }
    projection::named(&projected.projection.class_name, &params)
}

fn geographic_to_projected(
    source: &GeographicCs,
    target: &ProjectedCs,
) -> Result<Box<dyn Transform>, Error> {
    if target.geographic.equal_params(source) {
        debug!("direct projection onto '{}'", target.name);
        return projection_transform(target);
    }
    debug!(
        "aligning '{}' with the base of '{}' before projecting",
        source.name, target.name
    );
    chain(vec![
        geographic_to_geographic(source, &target.geographic)?,
        projection_transform(target)?,
    ])
}

fn projected_to_geographic(
    source: &ProjectedCs,
    target: &GeographicCs,
) -> Result<Box<dyn Transform>, Error> {
    if source.geographic.equal_params(target) {
        debug!("direct unprojection of '{}'", source.name);
        return projection_transform(source)?.inverse();
    }
    debug!(
        "unprojecting '{}' before aligning with '{}'",
        source.name, target.name
    );
    chain(vec![
        projection_transform(source)?.inverse()?,
        geographic_to_geographic(&source.geographic, target)?,
    ])
}

fn projected_to_projected(
    source: &ProjectedCs,
    target: &ProjectedCs,
) -> Result<Box<dyn Transform>, Error> {
    chain(vec![
        projected_to_geographic(source, &source.geographic)?,
        geographic_to_projected(&source.geographic, target)?,
    ])
}

// ----- G E O G R A P H I C -----------------------------------------------------------

fn geographic_to_geographic(
    source: &GeographicCs,
    target: &GeographicCs,
) -> Result<Box<dyn Transform>, Error> {
    if source.datum.equal_params(&target.datum) {
        debug!(
            "same datum: rebasing '{}' onto '{}'",
            source.name, target.name
        );
        return Ok(Box::new(GeographicTransform::new(
            source.clone(),
            target.clone(),
        )));
    }

    debug!(
        "routing '{}' to '{}' through geocentric space",
        source.name, target.name
    );
    // Both synthesized frames keep the source prime meridian; the closing
    // geocentric-to-geographic leg rebases onto the target meridian
    let source_geocentric = GeocentricCs::new(
        &format!("{} Geocentric", source.datum.name),
        source.datum.clone(),
        LinearUnit::metre(),
        source.prime_meridian.clone(),
    );
    let target_geocentric = GeocentricCs::new(
        &format!("{} Geocentric", target.datum.name),
        target.datum.clone(),
        LinearUnit::metre(),
        source.prime_meridian.clone(),
    );

    let mut legs = Vec::new();
    legs.push(geographic_to_geocentric(source, &source_geocentric)?);
    match geocentric_to_geocentric(&source_geocentric, &target_geocentric)? {
        Some(shift) => legs.push(shift),
        None => {
            return Err(Error::NoPath(
                source.name.clone(),
                target.name.clone(),
            ))
        }
    }
    legs.push(geocentric_to_geographic(&target_geocentric, target)?);
    chain(legs)
}

// ----- G E O C E N T R I C -----------------------------------------------------------

fn geographic_to_geocentric(
    source: &GeographicCs,
    target: &GeocentricCs,
) -> Result<Box<dyn Transform>, Error> {
    let geocentric: Box<dyn Transform> =
        Box::new(GeocentricTransform::for_ellipsoid(&target.datum.ellipsoid)?);
    if source
        .prime_meridian
        .equal_params(&target.prime_meridian)
    {
        return Ok(geocentric);
    }
    let rebase = PrimeMeridianTransform::new(
        source.prime_meridian.clone(),
        target.prime_meridian.clone(),
    )?;
    chain(vec![Box::new(rebase), geocentric])
}

fn geocentric_to_geographic(
    source: &GeocentricCs,
    target: &GeographicCs,
) -> Result<Box<dyn Transform>, Error> {
    let geodetic = GeocentricTransform::for_ellipsoid(&source.datum.ellipsoid)?.inverse()?;
    if source
        .prime_meridian
        .equal_params(&target.prime_meridian)
    {
        return Ok(geodetic);
    }
    let rebase = PrimeMeridianTransform::new(
        source.prime_meridian.clone(),
        target.prime_meridian.clone(),
    )?;
    chain(vec![geodetic, Box::new(rebase)])
}

/// The datum shift between two geocentric frames, via WGS84: the source
/// side's Bursa-Wolf parameters forward, the target side's inverted.
/// `None` when neither side contributes a leg, which the caller turns
/// into a routing error rather than a silent identity
fn geocentric_to_geocentric(
    source: &GeocentricCs,
    target: &GeocentricCs,
) -> Result<Option<Box<dyn Transform>>, Error> {
    let mut legs: Vec<Box<dyn Transform>> = Vec::new();
    if let Some(info) = &source.datum.wgs84 {
        if !info.has_zero_values_only() {
            debug!("datum shift '{}' to WGS84", source.datum.name);
            legs.push(Box::new(DatumTransform::new(info)));
        }
    }
    if let Some(info) = &target.datum.wgs84 {
        if !info.has_zero_values_only() {
            debug!("datum shift WGS84 to '{}'", target.datum.name);
            legs.push(DatumTransform::new(info).inverse()?);
        }
    }
    if legs.is_empty() {
        return Ok(None);
    }
    Ok(Some(chain(legs)?))
}

// ----- F I T T E D -------------------------------------------------------------------

fn fitted_to_any(
    source: &FittedCs,
    target: &CoordinateSystem,
) -> Result<Box<dyn Transform>, Error> {
    let to_base: Box<dyn Transform> = Box::new(source.to_base.clone());
    if source.base.equal_params(target) {
        debug!("'{}' maps straight onto its base", source.name);
        return Ok(to_base);
    }
    chain(vec![to_base, transformation_between(&source.base, target)?])
}

fn any_to_fitted(
    source: &CoordinateSystem,
    target: &FittedCs,
) -> Result<Box<dyn Transform>, Error> {
    let from_base: Box<dyn Transform> = Box::new(target.to_base.inverted()?);
    if target.base.equal_params(source) {
        debug!("'{}' is reached straight from its base", target.name);
        return Ok(from_base);
    }
    chain(vec![
        transformation_between(source, &target.base)?,
        from_base,
    ])
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    fn ed50() -> GeographicCs {
        GeographicCs {
            name: "ED50".to_string(),
            authority: Authority::new("EPSG", 4230),
            angular_unit: AngularUnit::degrees(),
            datum: HorizontalDatum::new(
                "European Datum 1950",
                DatumKind::Geocentric,
                Ellipsoid::international_1924(),
                Some(Wgs84ConversionInfo::translation(-87., -98., -121.)),
                Authority::new("EPSG", 6230),
            ),
            prime_meridian: PrimeMeridian::greenwich(),
            axes: GeographicCs::default_axes(),
        }
    }

    #[test]
    fn geographic_to_utm_is_a_single_projection_leg() -> Result<(), Error> {
        let pipeline = transformation_between(
            &CoordinateSystem::Geographic(GeographicCs::wgs84()),
            &CoordinateSystem::Projected(ProjectedCs::wgs84_utm(32, true)?),
        )?;

        let p = pipeline.apply(&[12.0, 55.0])?;
        assert_float_eq!(p[0], 691_875.6, abs <= 1.0);
        assert_float_eq!(p[1], 6_098_907.8, abs <= 1.0);

        let back = pipeline.inverse()?.apply(&p)?;
        assert_float_eq!(back[0], 12.0, abs <= 1e-8);
        assert_float_eq!(back[1], 55.0, abs <= 1e-8);
        Ok(())
    }

    #[test]
    fn datum_shift_routes_through_geocentric_space() -> Result<(), Error> {
        let source = CoordinateSystem::Geographic(ed50());
        let target = CoordinateSystem::Geographic(GeographicCs::wgs84());
        let pipeline = transformation_between(&source, &target)?;

        // The ED50 graticule sits about 100 m away from WGS84 in Europe
        let p = pipeline.apply(&[12.0, 55.0, 0.0])?;
        let shift_lon = (p[0] - 12.0).abs() * 111_000.0;
        let shift_lat = (p[1] - 55.0).abs() * 111_000.0;
        assert!(shift_lon > 10.0 && shift_lon < 500.0);
        assert!(shift_lat > 10.0 && shift_lat < 500.0);

        let back = transformation_between(&target, &source)?.apply(&p)?;
        assert_float_eq!(back[0], 12.0, abs <= 1e-7);
        assert_float_eq!(back[1], 55.0, abs <= 1e-7);
        Ok(())
    }

    #[test]
    fn datumless_pairs_have_no_path() {
        // Neither datum carries Bursa-Wolf parameters
        let mut nad27_style = ed50();
        nad27_style.datum.wgs84 = None;
        let err = transformation_between(
            &CoordinateSystem::Geographic(nad27_style),
            &CoordinateSystem::Geographic(GeographicCs::wgs84()),
        );
        assert!(matches!(err, Err(Error::NoPath(_, _))));

        let geocentric = CoordinateSystem::Geocentric(GeocentricCs::wgs84());
        let err = transformation_between(&geocentric, &geocentric);
        assert!(matches!(err, Err(Error::NoPath(_, _))));
    }

    #[test]
    fn projected_and_geocentric_do_not_connect() -> Result<(), Error> {
        let utm = CoordinateSystem::Projected(ProjectedCs::wgs84_utm(31, true)?);
        let geocentric = CoordinateSystem::Geocentric(GeocentricCs::wgs84());
        assert!(matches!(
            transformation_between(&utm, &geocentric),
            Err(Error::NoPath(_, _))
        ));
        assert!(matches!(
            transformation_between(&geocentric, &utm),
            Err(Error::NoPath(_, _))
        ));
        Ok(())
    }

    #[test]
    fn geographic_to_geocentric_and_back() -> Result<(), Error> {
        let geographic = CoordinateSystem::Geographic(GeographicCs::wgs84());
        let geocentric = CoordinateSystem::Geocentric(GeocentricCs::wgs84());

        let up = transformation_between(&geographic, &geocentric)?;
        let down = transformation_between(&geocentric, &geographic)?;

        let p = up.apply(&[9.0, 48.0, 250.0])?;
        assert_eq!(p.len(), 3);
        let back = down.apply(&p)?;
        // Within the accuracy of the single-pass cartesian-to-geodetic step
        assert_float_eq!(back[0], 9.0, abs <= 1e-7);
        assert_float_eq!(back[1], 48.0, abs <= 1e-7);
        assert_float_eq!(back[2], 250.0, abs <= 1e-2);
        Ok(())
    }

    #[test]
    fn fitted_reaches_its_base_through_the_affine() -> Result<(), Error> {
        let affine = AffineTransform::new_2d(1., 0., 0.5, 0., 1., -0.25);
        let fitted = FittedCs::new(
            "offset graticule",
            affine,
            CoordinateSystem::Geographic(GeographicCs::wgs84()),
        )?;

        let pipeline = transformation_between(
            &CoordinateSystem::Fitted(fitted.clone()),
            &CoordinateSystem::Geographic(GeographicCs::wgs84()),
        )?;
        let p = pipeline.apply(&[12.0, 55.0])?;
        assert_float_eq!(p[0], 12.5, abs <= 1e-12);
        assert_float_eq!(p[1], 54.75, abs <= 1e-12);

        // And the other way round, through the inverted affine
        let pipeline = transformation_between(
            &CoordinateSystem::Geographic(GeographicCs::wgs84()),
            &CoordinateSystem::Fitted(fitted),
        )?;
        let back = pipeline.apply(&p)?;
        assert_float_eq!(back[0], 12.0, abs <= 1e-12);
        assert_float_eq!(back[1], 55.0, abs <= 1e-12);
        Ok(())
    }

    #[test]
    fn projected_to_projected_runs_both_projections() -> Result<(), Error> {
        let utm32 = CoordinateSystem::Projected(ProjectedCs::wgs84_utm(32, true)?);
        let utm33 = CoordinateSystem::Projected(ProjectedCs::wgs84_utm(33, true)?);
        let pipeline = transformation_between(&utm32, &utm33)?;

        // A point near the zone boundary survives the round trip
        let p32 = [691_875.6, 6_098_907.8];
        let p33 = pipeline.apply(&p32)?;
        let back = pipeline.inverse()?.apply(&p33)?;
        assert_float_eq!(back[0], p32[0], abs <= 1e-4);
        assert_float_eq!(back[1], p32[1], abs <= 1e-4);
        Ok(())
    }
}
