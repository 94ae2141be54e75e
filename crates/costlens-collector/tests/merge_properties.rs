//! Property tests: fan-in merging never drops, duplicates or reorders items of
//! one input, whatever the number and sizes of inputs.

use costlens_collector::FanIn;
use proptest::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sizes of 0..8 inputs, each with 0..40 items.
fn arb_input_sizes() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..40, 0..8)
}

/// Spawn one producer per input; item `(i, j)` is the j-th item of input i.
fn spawn_producers(sizes: &[usize], capacity: usize) -> Vec<mpsc::Receiver<(usize, usize)>> {
    sizes
        .iter()
        .enumerate()
        .map(|(input, &size)| {
            let (tx, rx) = mpsc::channel(capacity);
            tokio::spawn(async move {
                for seq in 0..size {
                    if seq % 3 == 0 {
                        tokio::task::yield_now().await;
                    }
                    if tx.send((input, seq)).await.is_err() {
                        break;
                    }
                }
            });
            rx
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// The merged output is exactly the union of inputs, with per-input order kept.
    #[test]
    fn merged_output_is_ordered_union(
        sizes in arb_input_sizes(),
        capacity in 1usize..4,
    ) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        let (items, summary) = rt.block_on(async {
            let inputs = spawn_producers(&sizes, capacity);
            let mut merged = FanIn::merge(inputs, capacity, CancellationToken::new());
            let mut items = Vec::new();
            while let Some(item) = merged.recv().await {
                items.push(item);
            }
            (items, merged.finish().await.unwrap())
        });

        let total: usize = sizes.iter().sum();
        prop_assert_eq!(items.len(), total);
        prop_assert_eq!(summary.inputs, sizes.len());
        prop_assert_eq!(summary.forwarded, total);
        prop_assert!(summary.is_clean());

        for (input, &size) in sizes.iter().enumerate() {
            let seqs: Vec<usize> = items
                .iter()
                .filter(|(i, _)| *i == input)
                .map(|(_, seq)| *seq)
                .collect();
            prop_assert_eq!(seqs, (0..size).collect::<Vec<_>>());
        }
    }

    /// Cancelling mid-stream always lets the merged output close.
    #[test]
    fn cancelled_merge_always_closes(
        sizes in arb_input_sizes(),
        stop_after in 0usize..20,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        let received = rt.block_on(async {
            let inputs = spawn_producers(&sizes, 1);
            let cancel = CancellationToken::new();
            let mut merged = FanIn::merge(inputs, 1, cancel.clone());

            let mut received = 0usize;
            let drained = tokio::time::timeout(std::time::Duration::from_secs(5), async {
                while merged.recv().await.is_some() {
                    received += 1;
                    if received == stop_after {
                        cancel.cancel();
                    }
                }
            })
            .await;
            assert!(drained.is_ok(), "merged output did not close");
            merged.finish().await.unwrap();
            received
        });

        prop_assert!(received <= sizes.iter().sum::<usize>());
    }
}
