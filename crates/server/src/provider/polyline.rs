use haulplan::shared::Coordinate;

use crate::provider::Error;

/// Decodes an encoded polyline (Google's algorithm, as OSRM and Valhalla
/// emit it) with `precision` decimal places.
pub fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, Error> {
    let factor = 10_f64.powi(precision as i32);
    let mut bytes = encoded.bytes();
    let mut points = Vec::with_capacity(encoded.len() / 4);
    let (mut latitude, mut longitude) = (0i64, 0i64);

    while bytes.len() > 0 {
        latitude += next_value(&mut bytes)?;
        longitude += next_value(&mut bytes)?;
        points.push(Coordinate::new(
            latitude as f64 / factor,
            longitude as f64 / factor,
        ));
    }
    Ok(points)
}

fn next_value(bytes: &mut std::str::Bytes<'_>) -> Result<i64, Error> {
    let mut result = 0i64;
    let mut shift = 0;
    loop {
        let byte = bytes.next().ok_or_else(|| invalid("polyline ends mid value"))?;
        let chunk = i64::from(byte)
            .checked_sub(63)
            .filter(|chunk| (0..64).contains(chunk))
            .ok_or_else(|| invalid("character outside the polyline alphabet"))?;
        if shift > 60 {
            return Err(invalid("polyline value overflows"));
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

fn invalid(message: &str) -> Error {
    Error::Decode {
        service: "polyline",
        message: message.into(),
    }
}

#[test]
fn decodes_reference_polyline() {
    // Example from Google's polyline algorithm documentation
    let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 5).unwrap();
    let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
    assert_eq!(points.len(), expected.len());
    for (point, (latitude, longitude)) in points.iter().zip(expected) {
        assert!((point.latitude - latitude).abs() < 1e-9);
        assert!((point.longitude - longitude).abs() < 1e-9);
    }
}

#[test]
fn empty_polyline_has_no_points() {
    assert!(decode_polyline("", 5).unwrap().is_empty());
}

#[test]
fn truncated_polyline_is_rejected() {
    // Latitude without its longitude
    assert!(decode_polyline("_p~iF", 5).is_err());
    assert!(decode_polyline("_p~iF~ps|", 5).is_err());
}

#[test]
fn precision_six_scales_down() {
    let five = decode_polyline("_p~iF~ps|U", 5).unwrap();
    let six = decode_polyline("_p~iF~ps|U", 6).unwrap();
    assert!((five[0].latitude - six[0].latitude * 10.0).abs() < 1e-9);
}
