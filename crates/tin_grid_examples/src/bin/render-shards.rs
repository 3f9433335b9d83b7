//! Grids and renders one field of an existing run.
//!
//! Usage: `render-shards <folder> <shard-count> <dx> [time-step] [z|d|c] [subsample]
//! [--crange LO,HI] [--zrange LO,HI] [--reverse]`
//!
//! `--crange` clips cumulative change before gridding, `--zrange` fixes the values mapped to
//! the ends of the color scale and `--reverse` flips the scale.
use std::env;

use anyhow::{bail, Context};
use tin_grid::prelude::*;
use tin_grid_examples::{init_tracing, render_view_to_png, ColorScale, RenderConfig};

const USAGE: &str = "usage: render-shards <folder> <shard-count> <dx> [time-step] [z|d|c] \
                     [subsample] [--crange LO,HI] [--zrange LO,HI] [--reverse]";

#[derive(Debug, PartialEq)]
struct Args {
    folder: String,
    shard_count: u32,
    dx: f64,
    time_step: u32,
    selector: String,
    subsample: usize,
    clip_range: Option<(f64, f64)>,
    value_range: Option<(f64, f64)>,
    reverse: bool,
}

fn parse_range(flag: &str, value: Option<&String>) -> anyhow::Result<(f64, f64)> {
    let value = value.with_context(|| format!("{flag} expects LO,HI"))?;
    let (lo, hi) = value
        .split_once(',')
        .with_context(|| format!("{flag} expects LO,HI, got '{value}'"))?;
    let lo: f64 = lo.trim().parse().with_context(|| format!("{flag}: bad lower bound"))?;
    let hi: f64 = hi.trim().parse().with_context(|| format!("{flag}: bad upper bound"))?;
    Ok((lo, hi))
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut clip_range = None;
    let mut value_range = None;
    let mut reverse = false;

    let mut it = raw.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--crange" => clip_range = Some(parse_range("--crange", it.next())?),
            "--zrange" => value_range = Some(parse_range("--zrange", it.next())?),
            "--reverse" => reverse = true,
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
            _ => positional.push(arg.as_str()),
        }
    }
    if positional.len() < 3 {
        bail!(USAGE);
    }

    Ok(Args {
        folder: positional[0].to_string(),
        shard_count: positional[1]
            .parse()
            .context("shard count must be an integer")?,
        dx: positional[2].parse().context("dx must be a number")?,
        time_step: match positional.get(3) {
            Some(s) => s.parse().context("time step must be an integer")?,
            None => 0,
        },
        selector: positional.get(4).copied().unwrap_or("z").to_string(),
        subsample: match positional.get(5) {
            Some(s) => s.parse().context("subsample must be an integer")?,
            None => 1,
        },
        clip_range,
        value_range,
        reverse,
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    let mut config = LoadConfig::new(&args.folder)
        .with_shard_count(args.shard_count)
        .with_dx(args.dx)
        .with_time_step(args.time_step);
    if let Some((lo, hi)) = args.clip_range {
        config = config.with_clip_range(lo, hi);
    }
    let loader = SurfaceLoader::open(config, Box::new(JsonShardSource::new()))?;

    let view = loader.view(&args.selector)?;
    let (xr, yr) = view.axis_ranges();
    println!("{}", view.kind.title(args.time_step));
    println!("x range {xr:?}, y range {yr:?}");

    let mut scale = match view.kind {
        FieldKind::CumulativeChange => ColorScale::rd_bu(),
        _ => ColorScale::yl_gn_bu(),
    };
    if args.reverse {
        scale = scale.reversed();
    }
    let mut rc = RenderConfig::new(scale).with_subsample(args.subsample);
    if let Some((lo, hi)) = args.value_range {
        rc = rc.with_value_range(lo, hi);
    }
    render_view_to_png(
        &view,
        &rc,
        format!("render-shards-{}-t{}.png", view.kind, args.time_step),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positional_arguments_fall_back_to_defaults() {
        let args = parse_args(&strings(&["out", "4", "25"])).unwrap();
        assert_eq!(args.folder, "out");
        assert_eq!(args.shard_count, 4);
        assert_eq!(args.dx, 25.0);
        assert_eq!(args.time_step, 0);
        assert_eq!(args.selector, "z");
        assert_eq!(args.subsample, 1);
        assert!(args.clip_range.is_none());
        assert!(args.value_range.is_none());
        assert!(!args.reverse);
    }

    #[test]
    fn range_and_reverse_options_are_parsed_anywhere() {
        let args = parse_args(&strings(&[
            "--crange", "-5,5", "out", "2", "10", "3", "c", "--reverse", "2", "--zrange",
            "-1.5, 2",
        ]))
        .unwrap();
        assert_eq!(args.time_step, 3);
        assert_eq!(args.selector, "c");
        assert_eq!(args.subsample, 2);
        assert_eq!(args.clip_range, Some((-5.0, 5.0)));
        assert_eq!(args.value_range, Some((-1.5, 2.0)));
        assert!(args.reverse);
    }

    #[test]
    fn malformed_options_are_rejected() {
        assert!(parse_args(&strings(&["out", "2"])).is_err());
        assert!(parse_args(&strings(&["out", "2", "10", "--crange"])).is_err());
        assert!(parse_args(&strings(&["out", "2", "10", "--crange", "5"])).is_err());
        assert!(parse_args(&strings(&["out", "2", "10", "--zrange", "a,b"])).is_err());
        assert!(parse_args(&strings(&["out", "2", "10", "--bogus"])).is_err());
    }
}
