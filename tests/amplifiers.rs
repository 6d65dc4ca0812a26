use intcode_vm::compose::amplifier::{best_pipeline, best_ring, run_pipeline, run_ring};

const SERIAL_43210: [i64; 17] = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];

const SERIAL_54321: [i64; 25] = [
    3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23, 23, 4, 23, 99,
    0, 0,
];

const SERIAL_65210: [i64; 34] = [
    3, 31, 3, 32, 1002, 32, 10, 32, 1001, 31, -2, 31, 1007, 31, 0, 33, 1002, 33, 7, 33, 1, 33,
    31, 31, 1, 32, 31, 31, 4, 31, 99, 0, 0, 0,
];

const FEEDBACK_139629729: [i64; 29] = [
    3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
    1005, 28, 6, 99, 0, 0, 5,
];

const FEEDBACK_18216: [i64; 57] = [
    3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001, 54, -5,
    54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53, 55, 53, 4, 53,
    1001, 56, -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
];

#[tokio::test]
async fn test_pipeline_signals() {
    assert_eq!(run_pipeline(&SERIAL_43210, &[4, 3, 2, 1, 0]).await.unwrap(), 43210);
    assert_eq!(run_pipeline(&SERIAL_54321, &[0, 1, 2, 3, 4]).await.unwrap(), 54321);
    assert_eq!(run_pipeline(&SERIAL_65210, &[1, 0, 4, 3, 2]).await.unwrap(), 65210);
}

#[tokio::test]
async fn test_best_pipeline_orderings() {
    let best = best_pipeline(&SERIAL_54321, &[0, 1, 2, 3, 4]).await.unwrap();
    assert_eq!(best.signal, 54321);
    assert_eq!(best.phases, vec![0, 1, 2, 3, 4]);

    let best = best_pipeline(&SERIAL_65210, &[0, 1, 2, 3, 4]).await.unwrap();
    assert_eq!(best.signal, 65210);
    assert_eq!(best.phases, vec![1, 0, 4, 3, 2]);
}

#[tokio::test]
async fn test_ring_signals() {
    assert_eq!(
        run_ring(&FEEDBACK_139629729, &[9, 8, 7, 6, 5]).await.unwrap(),
        139629729
    );
    assert_eq!(
        run_ring(&FEEDBACK_18216, &[9, 7, 8, 5, 6]).await.unwrap(),
        18216
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_best_ring_is_stable_across_runs() {
    let first = best_ring(&FEEDBACK_139629729, &[5, 6, 7, 8, 9]).await.unwrap();
    assert_eq!(first.signal, 139629729);
    assert_eq!(first.phases, vec![9, 8, 7, 6, 5]);

    for _ in 0..3 {
        let again = best_ring(&FEEDBACK_139629729, &[5, 6, 7, 8, 9]).await.unwrap();
        assert_eq!(again, first);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_ordering_is_deterministic() {
    for phases in [[0, 1, 2, 3, 4], [4, 2, 0, 3, 1], [3, 4, 1, 0, 2]] {
        let first = run_pipeline(&SERIAL_65210, &phases).await.unwrap();
        let second = run_pipeline(&SERIAL_65210, &phases).await.unwrap();
        assert_eq!(first, second);
    }
}
