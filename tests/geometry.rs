use hybrid_chart_wasm::domain::chart::{GeometryMapper, PlotRect, VOLUME_BAR_FILL, VolumeMapper, svg_path};
use hybrid_chart_wasm::domain::market_data::series_math::moving_average;
use hybrid_chart_wasm::domain::market_data::{Bar, BarSeries, OHLCV, Period, Price, Timestamp, Volume};
use quickcheck_macros::quickcheck;
use wasm_bindgen_test::*;

fn rect() -> PlotRect {
    PlotRect::new(0.0, 0.0, 100.0, 50.0)
}

fn series(bars: &[(f64, f64, u64)]) -> BarSeries {
    let bars = bars
        .iter()
        .enumerate()
        .map(|(i, (open, close, volume))| {
            let (o, c) = (Price::from(*open), Price::from(*close));
            let (low, high) = (Price::from(open.min(*close)), Price::from(open.max(*close)));
            Bar::new(Timestamp::from_millis(i as i64 * 60_000), OHLCV::new(o, high, low, c, Volume::from(*volume)))
        })
        .collect();
    BarSeries::new(Period::OneDay, bars)
}

#[wasm_bindgen_test]
fn price_path_snapshot() {
    let data = series(&[(10.0, 10.0, 1), (10.0, 20.0, 1), (20.0, 15.0, 1)]);
    let mapper = GeometryMapper::new(rect(), data.len(), 10.0, 20.0);
    insta::assert_snapshot!(mapper.price_path(&data), @"M0.00,50.00 L50.00,0.00 L100.00,25.00");
}

#[wasm_bindgen_test]
fn overlay_gaps_split_the_path() {
    let mapper = GeometryMapper::new(rect(), 3, 10.0, 20.0);
    assert_eq!(mapper.overlay_path(&vec![None, Some(20.0), Some(15.0)]), "M50.00,0.00 L100.00,25.00");
    assert_eq!(mapper.overlay_path(&vec![Some(10.0), None, Some(15.0)]), "M0.00,50.00 M100.00,25.00");
    assert_eq!(mapper.overlay_path(&vec![None, None, None]), "");
}

#[wasm_bindgen_test]
fn degenerate_inputs_do_not_produce_nan() {
    let single = GeometryMapper::new(rect(), 1, 10.0, 20.0);
    assert_eq!(single.x(0), None);
    assert!(single.polyline(&[15.0]).is_empty());

    let flat = GeometryMapper::new(rect(), 3, 42.0, 42.0);
    assert_eq!(flat.y(42.0), 50.0);
    assert!(flat.polyline(&[42.0, 42.0, 42.0]).iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    assert_eq!(svg_path(&[]), "");
}

#[quickcheck]
fn y_is_inverted_and_monotonic(a: u16, b: u16) -> bool {
    let mapper = GeometryMapper::new(rect(), 10, 0.0, 1000.0);
    let (a, b) = (f64::from(a % 1001), f64::from(b % 1001));
    let bottom = mapper.y(0.0) == 50.0;
    let top = mapper.y(1000.0).abs() < 1e-9;
    let ordered = if a < b { mapper.y(a) > mapper.y(b) } else { mapper.y(a) <= mapper.y(b) };
    bottom && top && ordered
}

#[quickcheck]
fn x_positions_stay_inside_rect(len: u8) -> bool {
    let len = usize::from(len).max(2);
    let mapper = GeometryMapper::new(rect(), len, 0.0, 1.0);
    (0..len).filter_map(|i| mapper.x(i)).all(|x| (0.0..=100.0).contains(&x))
        && mapper.x(0) == Some(0.0)
        && mapper.x(len - 1) == Some(100.0)
}

#[wasm_bindgen_test]
fn volume_bars_scale_to_loudest_bar() {
    let data = series(&[(10.0, 11.0, 500), (11.0, 10.0, 1000), (10.0, 10.0, 0)]);
    let volume_rect = PlotRect::new(0.0, 100.0, 90.0, 60.0);
    let bars = VolumeMapper::new(volume_rect, data.len(), data.max_volume()).bars(&data);

    assert_eq!(bars.len(), 3);
    assert!((bars[1].height - 60.0).abs() < 1e-9);
    assert!((bars[1].y - 100.0).abs() < 1e-9);
    assert!((bars[0].height - 30.0).abs() < 1e-9);
    assert_eq!(bars[2].height, 0.0);
    assert!(bars[0].bullish && !bars[1].bullish && bars[2].bullish);
    assert!((bars[0].width - 30.0 * VOLUME_BAR_FILL).abs() < 1e-9);
    assert!(bars.iter().all(|b| b.y + b.height <= volume_rect.bottom() + 1e-9));
}

#[wasm_bindgen_test]
fn silent_series_draws_empty_volume() {
    let data = series(&[(1.0, 1.0, 0), (1.0, 1.0, 0)]);
    let bars = VolumeMapper::new(rect(), data.len(), data.max_volume()).bars(&data);
    assert!(bars.iter().all(|b| b.height == 0.0 && b.y == 50.0));
}

#[quickcheck]
fn mapping_the_same_series_twice_is_identical(raw: Vec<(u16, u16, u32)>) -> bool {
    let bars: Vec<_> = raw.iter().map(|(o, c, v)| (f64::from(*o) / 4.0, f64::from(*c) / 4.0, u64::from(*v))).collect();
    let data = series(&bars);
    let closes = data.closes();
    let (min, max) = bars.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (o, c, _)| (lo.min(o.min(*c)), hi.max(o.max(*c))));
    let (min, max) = if bars.is_empty() { (0.0, 1.0) } else { (min, max) };

    let mapper = GeometryMapper::new(rect(), data.len(), min, max);
    let volume = VolumeMapper::new(PlotRect::new(0.0, 60.0, 100.0, 20.0), data.len(), data.max_volume());
    let overlay = moving_average(&closes, 3);

    mapper.price_path(&data) == mapper.price_path(&data)
        && mapper.overlay_path(&overlay) == mapper.overlay_path(&overlay)
        && mapper.polyline(&closes) == mapper.polyline(&closes)
        && volume.bars(&data) == volume.bars(&data)
}
