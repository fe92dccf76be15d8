use crate::models::{DashboardSnapshot, Distribution, Gauge, Metric, TrendPoint};
use crate::renderer::colours::Colours;
use crate::renderer::drawing;
use crate::renderer::fonts::Fonts;
use image::{Rgba, RgbaImage};

pub(crate) struct RenderContext<'a> {
    pub fonts: Option<&'a Fonts>,
    pub snapshot: &'a DashboardSnapshot,
    pub image: &'a mut RgbaImage,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

const PADDING: u32 = 10;

pub(crate) fn render_header(ctx: &mut RenderContext) {
    let colours = Colours::default();
    let title = ctx.fonts.map(|f| &f.title);
    let small = ctx.fonts.map(|f| &f.small);

    drawing::text(
        ctx.image,
        colours.header,
        (ctx.x + PADDING) as i32,
        ctx.y as i32 + 4,
        title,
        "Temperature and Humidity monitoring",
    );

    let updated = format!(
        "{} readings | {}",
        ctx.snapshot.reading_count,
        ctx.snapshot.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    drawing::text(
        ctx.image,
        colours.text,
        ctx.x as i32 + ctx.width as i32 - 230,
        ctx.y as i32 + 10,
        small,
        &updated,
    );
}

pub(crate) fn render_alerts(ctx: &mut RenderContext) {
    if ctx.snapshot.alerts.is_empty() {
        return;
    }
    let colours = Colours::default();
    let regular = ctx.fonts.map(|f| &f.regular);

    drawing::filled_rect(
        ctx.image,
        ctx.x as i32,
        ctx.y as i32,
        ctx.width,
        ctx.height,
        colours.alert,
    );

    let line_height = ctx.height / ctx.snapshot.alerts.len() as u32;
    for (i, alert) in ctx.snapshot.alerts.iter().enumerate() {
        drawing::text(
            ctx.image,
            Rgba([255, 255, 255, 255]),
            (ctx.x + PADDING) as i32,
            (ctx.y + i as u32 * line_height) as i32 + 2,
            regular,
            alert,
        );
    }
}

fn gauge_colour(colours: &Colours, gauge: &Gauge) -> Rgba<u8> {
    match gauge.value {
        None => colours.muted,
        Some(v) if v > gauge.threshold => colours.threshold,
        Some(_) => match gauge.metric {
            Metric::Temperature => colours.temperature,
            Metric::Humidity => colours.humidity,
        },
    }
}

fn render_gauge(ctx: &mut RenderContext, gauge: &Gauge, x: u32, width: u32) {
    let colours = Colours::default();
    let regular = ctx.fonts.map(|f| &f.regular);
    let small = ctx.fonts.map(|f| &f.small);

    let label = format!("{} ({})", gauge.title, gauge.value_display);
    drawing::text(ctx.image, colours.text, (x + PADDING) as i32, ctx.y as i32, regular, &label);

    // The gauge spans 0..threshold, as on the web dashboard.
    let fraction = match gauge.value {
        Some(v) if gauge.threshold > 0.0 => (v / gauge.threshold) as f32,
        Some(v) if v > gauge.threshold => 1.0,
        _ => 0.0,
    };

    let bar_y = ctx.y + 28;
    let bar_width = width.saturating_sub(2 * PADDING);
    let bar_height = ctx.height.saturating_sub(48);
    drawing::progress_bar(
        ctx.image,
        (x + PADDING) as i32,
        bar_y as i32,
        bar_width,
        bar_height,
        fraction,
        gauge_colour(&colours, gauge),
    );

    // Threshold marker at the right edge of the range.
    let marker_x = x + PADDING + bar_width.saturating_sub(1);
    drawing::vertical_line(ctx.image, marker_x, bar_y.saturating_sub(4), bar_y + bar_height + 4, colours.threshold);

    let limit = format!("limit {}{}", gauge.threshold, gauge.unit);
    drawing::text(
        ctx.image,
        colours.text,
        (x + PADDING) as i32,
        (bar_y + bar_height + 4) as i32,
        small,
        &limit,
    );
}

pub(crate) fn render_gauges(ctx: &mut RenderContext) {
    let half = ctx.width / 2;
    let snapshot = ctx.snapshot;
    let x = ctx.x;
    render_gauge(ctx, &snapshot.temperature_gauge, x, half);
    render_gauge(ctx, &snapshot.humidity_gauge, x + half, half);
}

/// Linear map from `[from_low, from_high]` to `[to_low, to_high]`.
fn scale(value: f64, from_low: f64, from_high: f64, to_low: f64, to_high: f64) -> f32 {
    if from_high <= from_low {
        return ((to_low + to_high) / 2.0) as f32;
    }
    (to_low + (value - from_low) / (from_high - from_low) * (to_high - to_low)) as f32
}

fn value_range(points: &[TrendPoint], limits: [f64; 2]) -> (f64, f64) {
    let values = points
        .iter()
        .flat_map(|p| [p.temperature, p.humidity])
        .flatten()
        .chain(limits);
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if high > low {
        (low, high)
    } else {
        (low - 1.0, high + 1.0)
    }
}

pub(crate) fn render_trend(ctx: &mut RenderContext) {
    let colours = Colours::default();
    let small = ctx.fonts.map(|f| &f.small);
    let snapshot = ctx.snapshot;
    let points = &snapshot.trend.points;

    let left = ctx.x + PADDING;
    let top = ctx.y + 20;
    let plot_width = ctx.width.saturating_sub(2 * PADDING);
    let plot_height = ctx.height.saturating_sub(30);
    drawing::hollow_rect(ctx.image, left as i32, top as i32, plot_width, plot_height, colours.grid);
    drawing::text(
        ctx.image,
        colours.header,
        left as i32,
        ctx.y as i32,
        small,
        "Temperature and Humidity Sensors data",
    );

    let (low, high) = value_range(
        points,
        [snapshot.temperature_gauge.threshold, snapshot.humidity_gauge.threshold],
    );
    let to_y = |v: f64| scale(v, low, high, (top + plot_height - 2) as f64, (top + 2) as f64);

    for limit in [snapshot.temperature_gauge.threshold, snapshot.humidity_gauge.threshold] {
        drawing::horizontal_line(ctx.image, left, to_y(limit) as u32, plot_width, colours.grid);
    }

    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    let t0 = first.timestamp.and_utc().timestamp() as f64;
    let t1 = last.timestamp.and_utc().timestamp() as f64;
    let to_x = |p: &TrendPoint| {
        scale(
            p.timestamp.and_utc().timestamp() as f64,
            t0,
            t1,
            (left + 2) as f64,
            (left + plot_width - 2) as f64,
        )
    };

    for (metric, colour) in [
        (Metric::Temperature, colours.temperature),
        (Metric::Humidity, colours.humidity),
    ] {
        let value = |p: &TrendPoint| match metric {
            Metric::Temperature => p.temperature,
            Metric::Humidity => p.humidity,
        };

        // Segments only join consecutive present values, leaving gaps.
        for pair in points.windows(2) {
            if let (Some(a), Some(b)) = (value(&pair[0]), value(&pair[1])) {
                drawing::segment(ctx.image, (to_x(&pair[0]), to_y(a)), (to_x(&pair[1]), to_y(b)), colour);
            }
        }
        for point in points {
            if let Some(v) = value(point) {
                drawing::filled_rect(ctx.image, to_x(point) as i32 - 1, to_y(v) as i32 - 1, 3, 3, colour);
            }
        }
    }

    let range = format!(
        "{} .. {}",
        first.timestamp.format("%m/%d %H:%M"),
        last.timestamp.format("%m/%d %H:%M")
    );
    drawing::text(
        ctx.image,
        colours.text,
        (left + plot_width) as i32 - 170,
        ctx.y as i32,
        small,
        &range,
    );
}

fn render_distribution(ctx: &mut RenderContext, dist: &Distribution, x: u32, width: u32) {
    let colours = Colours::default();
    let small = ctx.fonts.map(|f| &f.small);

    let left = x + PADDING;
    let top = ctx.y + 20;
    let plot_width = width.saturating_sub(2 * PADDING);
    let plot_height = ctx.height.saturating_sub(40);

    let title = format!("{} Distribution", dist.metric.name());
    drawing::text(ctx.image, colours.header, left as i32, ctx.y as i32, small, &title);
    drawing::hollow_rect(ctx.image, left as i32, top as i32, plot_width, plot_height, colours.grid);

    let max_count = dist.max_count();
    if dist.bins.is_empty() || max_count == 0 {
        return;
    }

    let colour = match dist.metric {
        Metric::Temperature => colours.temperature,
        Metric::Humidity => colours.humidity,
    };
    let bar_width = plot_width / dist.bins.len() as u32;
    for (i, bin) in dist.bins.iter().enumerate() {
        let bar_height = (bin.count as f64 / max_count as f64 * plot_height.saturating_sub(2) as f64) as u32;
        let bar_x = left + i as u32 * bar_width + 1;
        let bar_y = top + plot_height - 1 - bar_height;
        drawing::filled_rect(
            ctx.image,
            bar_x as i32,
            bar_y as i32,
            bar_width.saturating_sub(1),
            bar_height,
            colour,
        );
    }

    let (Some(first), Some(last)) = (dist.bins.first(), dist.bins.last()) else {
        return;
    };
    let axis = format!("{:.1}{unit} .. {:.1}{unit}", first.start, last.end, unit = dist.metric.unit());
    drawing::text(
        ctx.image,
        colours.text,
        left as i32,
        (top + plot_height + 2) as i32,
        small,
        &axis,
    );
}

pub(crate) fn render_distributions(ctx: &mut RenderContext) {
    let half = ctx.width / 2;
    let snapshot = ctx.snapshot;
    let x = ctx.x;
    render_distribution(ctx, &snapshot.temperature_distribution, x, half);
    render_distribution(ctx, &snapshot.humidity_distribution, x + half, half);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale() {
        assert_eq!(scale(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
        assert_eq!(scale(0.0, 0.0, 10.0, 100.0, 0.0), 100.0);
        // Degenerate input range lands in the middle.
        assert_eq!(scale(3.0, 3.0, 3.0, 0.0, 100.0), 50.0);
    }

    #[test]
    fn test_value_range_includes_limits() {
        let (low, high) = value_range(&[], [25.0, 60.0]);
        assert_eq!((low, high), (25.0, 60.0));

        let (low, high) = value_range(&[], [25.0, 25.0]);
        assert_eq!((low, high), (24.0, 26.0));
    }
}
