use std::fs;
use std::path::PathBuf;

use tin_grid::prelude::*;
use tin_grid_examples::{init_tracing, render_view_to_png, ColorScale, RenderConfig, SyntheticRun};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Write two time steps of a 4-shard run, the way a parallel simulation would.
    let out_dir = PathBuf::from("synthetic-badlands-output");
    fs::create_dir_all(&out_dir)?;
    let run = SyntheticRun::default();
    for step in 0..2 {
        run.write_json(&out_dir, step)?;
    }

    let config = LoadConfig::new(&out_dir)
        .with_shard_count(run.shards)
        .with_dx(50.0)
        .with_clip_range(-40.0, 10.0);
    let mut loader = SurfaceLoader::try_new_with(config, JsonShardSource::new())?;

    for step in 0..2 {
        loader.load_time_step(step)?;
        for (selector, scale) in [
            ("z", ColorScale::yl_gn_bu()),
            ("d", ColorScale::yl_gn_bu()),
            ("c", ColorScale::rd_bu()),
        ] {
            let view = loader.view(selector)?;
            println!("{}", view.kind.title(step));
            let rc = RenderConfig::new(scale).with_pixels_per_node(2);
            render_view_to_png(
                &view,
                &rc,
                format!("synthetic-badlands-{}-t{step}.png", view.kind),
            )?;
        }
    }
    Ok(())
}
