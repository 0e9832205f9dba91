use env_logger;
use log;

use kway_merge::{KWayMerger, KWayMergerBuilder, MergeStrategy};

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();

    let merger: KWayMerger = KWayMergerBuilder::new()
        .with_strategy(MergeStrategy::Tournament)
        .with_threads_number(4)
        .build()
        .unwrap();

    let cases = vec![
        vec![vec![1, 4, 5], vec![1, 3, 4], vec![2, 6]],
        vec![],
        vec![vec![]],
        vec![vec![1, 2, 3]],
        vec![vec![1, 3, 5], vec![], vec![2, 4, 6]],
        vec![vec![1, 1, 3], vec![1, 2, 2], vec![2, 3, 3]],
    ];

    for (idx, lists) in cases.into_iter().enumerate() {
        let description = format!("{:?}", lists);
        let merged = merger.merge(lists);
        println!("case {}: {} -> {:?}", idx + 1, description, merged);
    }
}
