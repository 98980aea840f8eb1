use std::ops::Range;

/// Clamp a requested `[start, end)` window of bucket indexes into
/// `[0, history_len]`. Each endpoint is clamped on its own, so the result may
/// still be empty or inverted; use [`window_slice`] to apply it.
pub fn clamp_window(start: i64, end: i64, history_len: usize) -> Range<usize> {
    let high = i64::try_from(history_len).unwrap_or(i64::MAX);
    let clamp = |index: i64| index.clamp(0, high) as usize;
    clamp(start)..clamp(end)
}

/// The part of `series` covered by `window`. A window that runs past the end
/// of the series is cut short there; an inverted one, or one that starts past
/// the end, gives an empty slice.
pub fn window_slice<'a>(series: &'a [f64], window: &Range<usize>) -> &'a [f64] {
    let end = window.end.min(series.len());
    series.get(window.start..end).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::{
        clamp_window,
        window_slice,
    };

    #[test]
    fn test_clamp_out_of_range() {
        assert_eq!(clamp_window(-5, 1000, 100), 0..100);
        assert_eq!(clamp_window(i64::MIN, i64::MAX, 60), 0..60);
        assert_eq!(clamp_window(10, 20, 60), 10..20);
    }

    #[test]
    fn test_clamp_keeps_inverted_windows() {
        assert_eq!(clamp_window(50, 10, 60), 50..10);
        assert_eq!(clamp_window(200, -3, 60), 60..0);
    }

    #[test]
    fn test_slice_tolerates_empty_and_inverted() {
        let series = [1.0, 2.0, 3.0];
        assert_eq!(window_slice(&series, &(0..2)), &[1.0, 2.0]);
        assert!(window_slice(&series, &(2..2)).is_empty());
        assert!(window_slice(&series, &(3..1)).is_empty());
    }

    #[test]
    fn test_slice_cut_at_series_end() {
        let series = [1.0, 2.0, 3.0];
        assert_eq!(window_slice(&series, &(1..5)), &[2.0, 3.0]);
        assert_eq!(window_slice(&series, &(0..usize::MAX)), &series);
        assert!(window_slice(&series, &(3..5)).is_empty());
        assert!(window_slice(&series, &(4..9)).is_empty());
        assert!(window_slice(&[], &(0..2)).is_empty());
    }
}
