mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tin_grid::shard::{merge_shards, MemoryShardSource, ShardFields};

const SHARD_COUNTS: [u32; 4] = [1, 4, 16, 64];
const POINTS_PER_SHARD: usize = 5_000;

fn source_with_shards(shards: u32) -> MemoryShardSource {
    let mut source = MemoryShardSource::with_capacity(shards as usize);
    for shard in 0..shards {
        let cloud = common::random_cloud(POINTS_PER_SHARD, 1_000.0, shard as u64);
        let coords = cloud
            .positions()
            .iter()
            .map(|p| mint::Vector3::from(*p))
            .collect();
        source.insert(
            0,
            shard,
            ShardFields::new(
                coords,
                cloud.cumulative_change().to_vec(),
                cloud.discharge().to_vec(),
            ),
        );
    }
    source
}

fn merge_benches(c: &mut Criterion) {
    let dir = std::env::temp_dir();
    let mut group = c.benchmark_group("shard/merge");

    for &shards in &SHARD_COUNTS {
        let source = source_with_shards(shards);
        group.throughput(common::elements_throughput(
            shards as usize * POINTS_PER_SHARD,
        ));

        group.bench_with_input(BenchmarkId::from_parameter(shards), &shards, |b, &n| {
            b.iter(|| {
                let cloud = merge_shards(&source, &dir, 0, n).unwrap();
                black_box(cloud.len());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = merge_benches
}
criterion_main!(benches);
