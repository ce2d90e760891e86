use lab_radiometry::{
    compute_nedt, compute_temperature_curve, deficit::TemperatureDeficit, linear_regression,
    spectral::SpectralResponseLoader, weighted_mean, BrightnessTemperatureError, Channel,
    ChannelCalibration, ChannelReport, Error, PixelRange,
};
use strum::IntoEnumIterator;

fn channel_report(channel: Channel) -> Result<ChannelReport, Error> {
    Ok(ChannelReport::from_channel(channel)?)
}

#[test]
fn lab_calibration_points() {
    for channel in Channel::iter() {
        let report = channel_report(channel).unwrap();
        let point = channel.calibration_point();
        let t = report.curve.temperature_at(point.pixel).unwrap();
        assert!(
            (t - point.temperature).abs() < 0.5,
            "{channel}: T({})={t}",
            point.pixel
        );
    }
}

#[test]
fn curve_and_nedt_lengths() {
    let calibration = ChannelCalibration::new(9, 10.788, -0.071857, 17.413);
    for n in [2, 3, 10, 2701] {
        let curve = compute_temperature_curve(&calibration, PixelRange::new(0., 270.), n).unwrap();
        assert_eq!(curve.len(), n);
        assert!(curve.pixel().windows(2).all(|w| w[0] < w[1]));
        let nedt = compute_nedt(curve.pixel(), curve.temperature(), 0.86).unwrap();
        assert_eq!(nedt.len(), n - 1);
        assert_eq!(nedt.pixel(), &curve.pixel()[1..]);
    }
}

#[test]
fn strict_callers_see_domain_errors() -> Result<(), Error> {
    let calibration = Channel::Ten.calibration();
    let curve = compute_temperature_curve(&calibration, [0., 200.], 201)?;
    curve.check()?;
    let curve = compute_temperature_curve(&calibration, [0., 270.], 271)?;
    match curve.check() {
        Err(BrightnessTemperatureError::Domain { pixel, .. }) => {
            assert!(calibration.response(pixel) <= 0.)
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn nedt_scales_with_pixel_noise() -> Result<(), Error> {
    let pixel = [0., 0.1, 0.2];
    let temperature = [300., 300.2, 300.5];
    let nedt = compute_nedt(&pixel, &temperature, 0.86)?;
    let expected = [0.86 * 0.2 / 0.1, 0.86 * 0.3 / 0.1];
    for (n, e) in nedt.nedt().iter().zip(expected) {
        assert!((n - e).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn lab_tools() -> Result<(), Error> {
    let wm = weighted_mean(&[52.083, 51.456, 51.604, 51.987, 51.964], &[
        0.289, 0.799, 0.398, 0.339, 0.801,
    ])?;
    assert!(wm.mean > 51.4 && wm.mean < 52.1);

    let fit = linear_regression(&[782., 808., 616., 324., 422.], &[
        6.071, 6.563, 2.893, -2.673, -0.773,
    ])?;
    assert!(fit.slope > 0. && fit.rvalue > 0.9);

    let table = "header\n\n\n\n\n\n10.5 0.2\n11.0 0.6\n11.5 0.2\n";
    let wavelength = SpectralResponseLoader::default()
        .read(table.as_bytes())?
        .characteristic_wavelength()?;
    assert!((wavelength - 11.).abs() < 1e-12);

    let deficit = TemperatureDeficit::read("x dt9 dt10\n0 0 0\n50 2.5 4\n100 5 8\n".as_bytes())?;
    let fit = deficit.fit()?;
    assert!((fit.k9.slope - 0.05).abs() < 1e-12);
    assert!((fit.k10.slope - 0.08).abs() < 1e-12);
    Ok(())
}
