//! End-to-end scenarios: WKT text in, planned pipeline, points through.

use float_eq::assert_float_eq;
use geocrs::prelude::*;

const WGS84_GEOGCS: &str = r#"GEOGCS["WGS 84",
    DATUM["WGS_1984", SPHEROID["WGS 84", 6378137, 298.257223563]],
    PRIMEM["Greenwich", 0],
    UNIT["degree", 0.017453292519943295],
    AUTHORITY["EPSG", "4326"]]"#;

fn utm31n_wkt() -> String {
    format!(
        r#"PROJCS["WGS 84 / UTM zone 31N", {WGS84_GEOGCS},
        PROJECTION["Transverse_Mercator"],
        PARAMETER["latitude_of_origin", 0],
        PARAMETER["central_meridian", 3],
        PARAMETER["scale_factor", 0.9996],
        PARAMETER["false_easting", 500000],
        PARAMETER["false_northing", 0],
        UNIT["metre", 1],
        AUTHORITY["EPSG", "32631"]]"#
    )
}

#[test]
fn utm_from_wkt_text() -> Result<(), Error> {
    let geographic = parse_coordinate_system(WGS84_GEOGCS)?;
    let projected = parse_coordinate_system(&utm31n_wkt())?;

    let pipeline = transformation_between(&geographic, &projected)?;

    // On the central meridian the easting is exactly the false easting
    let p = pipeline.apply(&[3.0, 50.0])?;
    assert_float_eq!(p[0], 500_000.0, abs <= 1e-6);
    assert_float_eq!(p[1], 5_538_630.7, abs <= 1.0);

    let back = pipeline.inverse()?.apply(&p)?;
    assert_float_eq!(back[0], 3.0, abs <= 1e-8);
    assert_float_eq!(back[1], 50.0, abs <= 1e-8);
    Ok(())
}

#[test]
fn datum_shift_pipeline_from_wkt_text() -> Result<(), Error> {
    let ed50 = parse_coordinate_system(
        r#"GEOGCS["ED50",
            DATUM["European_Datum_1950",
                SPHEROID["International 1924", 6378388, 297],
                TOWGS84[-87, -98, -121, 0, 0, 0, 0]],
            PRIMEM["Greenwich", 0],
            UNIT["degree", 0.017453292519943295],
            AUTHORITY["EPSG", "4230"]]"#,
    )?;
    let wgs84 = parse_coordinate_system(WGS84_GEOGCS)?;

    let pipeline = transformation_between(&ed50, &wgs84)?;
    let p = pipeline.apply(&[2.35, 48.85, 0.0])?;

    // A translation-only shift moves continental Europe by roughly
    // a hundred metres and stays invertible to survey accuracy
    assert!((p[0] - 2.35).abs() * 111_000.0 < 300.0);
    assert!((p[1] - 48.85).abs() * 111_000.0 < 300.0);
    assert!((p[0] - 2.35).abs() + (p[1] - 48.85).abs() > 1e-5);

    let back = transformation_between(&wgs84, &ed50)?.apply(&p)?;
    assert_float_eq!(back[0], 2.35, abs <= 1e-7);
    assert_float_eq!(back[1], 48.85, abs <= 1e-7);
    Ok(())
}

#[test]
fn mercator_worked_example() -> Result<(), Error> {
    // Makassar / NEIEZ style parameters on Bessel 1841
    let projected = parse_coordinate_system(
        r#"PROJCS["Makassar / NEIEZ",
            GEOGCS["Makassar",
                DATUM["Makassar", SPHEROID["Bessel 1841", 6377397.155, 299.15281]],
                PRIMEM["Greenwich", 0],
                UNIT["degree", 0.017453292519943295]],
            PROJECTION["Mercator_1SP"],
            PARAMETER["latitude_of_origin", 0],
            PARAMETER["central_meridian", 110],
            PARAMETER["scale_factor", 0.997],
            PARAMETER["false_easting", 3900000],
            PARAMETER["false_northing", 900000],
            UNIT["metre", 1]]"#,
    )?;
    let CoordinateSystem::Projected(ref cs) = projected else {
        panic!("expected a projected system");
    };
    let geographic = CoordinateSystem::Geographic(cs.geographic.clone());

    let pipeline = transformation_between(&geographic, &projected)?;
    let p = pipeline.apply(&[120.0, -3.0])?;
    assert_float_eq!(p[0], 5_009_726.58, abs <= 0.1);
    assert_float_eq!(p[1], 569_150.82, abs <= 0.1);
    Ok(())
}

#[test]
fn coordinate_systems_roundtrip_through_wkt() -> Result<(), Error> {
    let systems = [
        CoordinateSystem::Geographic(GeographicCs::wgs84()),
        CoordinateSystem::Projected(ProjectedCs::web_mercator()),
    ];
    for original in systems {
        let reparsed = parse_coordinate_system(&original.wkt())?;
        assert!(
            reparsed.equal_params(&original),
            "WKT round trip changed {}",
            original.name()
        );
    }
    Ok(())
}

#[test]
fn two_spellings_of_the_same_system_are_equal() -> Result<(), Error> {
    let verbose = parse_coordinate_system(WGS84_GEOGCS)?;
    let terse = parse_coordinate_system(
        r#"GEOGCS["unnamed",
            DATUM["different label", SPHEROID["sphd", 6378137, 298.257223563]],
            PRIMEM["Greenwich", 0],
            UNIT["deg", 0.017453292519943295]]"#,
    )?;
    assert!(verbose.equal_params(&terse));
    Ok(())
}

#[test]
fn fitted_system_pipeline() -> Result<(), Error> {
    // A local grid 100 m along each axis away from UTM 31N
    let fitted = parse_coordinate_system(&format!(
        r#"FITTED_CS["site grid",
            PARAM_MT["Affine",
                PARAMETER["num_row", 3], PARAMETER["num_col", 3],
                PARAMETER["elt_0_0", 1], PARAMETER["elt_0_1", 0], PARAMETER["elt_0_2", 100],
                PARAMETER["elt_1_0", 0], PARAMETER["elt_1_1", 1], PARAMETER["elt_1_2", 100],
                PARAMETER["elt_2_0", 0], PARAMETER["elt_2_1", 0], PARAMETER["elt_2_2", 1]],
            {}]"#,
        utm31n_wkt()
    ))?;
    let geographic = parse_coordinate_system(WGS84_GEOGCS)?;

    let pipeline = transformation_between(&fitted, &geographic)?;
    // The fitted origin of the site sits 100 m from the grid point it
    // shadows, so unprojecting it lands just off the central meridian
    let p = pipeline.apply(&[499_900.0, 5_538_530.7])?;
    assert_float_eq!(p[0], 3.0, abs <= 1e-4);
    assert_float_eq!(p[1], 50.0, abs <= 1e-4);
    Ok(())
}

#[test]
fn degenerate_projections_fail_at_planning_time() -> Result<(), Error> {
    // Mirrored standard parallels leave the Albers cone undefined
    let albers = parse_coordinate_system(
        &format!(
            r#"PROJCS["mirrored albers", {WGS84_GEOGCS},
            PROJECTION["Albers_Conic_Equal_Area"],
            PARAMETER["latitude_of_origin", 0],
            PARAMETER["central_meridian", -96],
            PARAMETER["standard_parallel_1", -30],
            PARAMETER["standard_parallel_2", 30],
            PARAMETER["false_easting", 0],
            PARAMETER["false_northing", 0],
            UNIT["metre", 1]]"#
        ),
    )?;
    let geographic = parse_coordinate_system(WGS84_GEOGCS)?;
    assert!(transformation_between(&geographic, &albers).is_err());
    Ok(())
}
