use crate::models::{Bin, Distribution, Metric, ReadingHistory};

pub const BIN_COUNT: usize = 20;

/// Histogram of the present values of `metric` over the whole history,
/// using `BIN_COUNT` equal-width bins from the smallest to the largest value.
pub fn summarize(history: &ReadingHistory, metric: Metric) -> Distribution {
    let values: Vec<f64> = history.values(metric).collect();
    let excluded = history.len() - values.len();

    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Distribution {
            excluded,
            ..Distribution::empty(metric)
        };
    };

    // A single distinct value still gets bins of non-zero width.
    let (low, high) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (high - low) / BIN_COUNT as f64;

    let mut bins: Vec<Bin> = (0..BIN_COUNT)
        .map(|i| Bin {
            start: low + width * i as f64,
            end: if i + 1 == BIN_COUNT { high } else { low + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - low) / width).floor() as usize).min(BIN_COUNT - 1);
        bins[index].count += 1;
    }

    Distribution {
        metric,
        bins,
        excluded,
    }
}
