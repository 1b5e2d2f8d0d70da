#[cfg(test)]
mod test_suite {
    use pqueue::test::suite;

    use crate::{ChanneledQueue, LockedQueue};

    struct LockTester;

    impl suite::Tester<LockedQueue<u64>> for LockTester {
        fn create_queue(&self) -> LockedQueue<u64> {
            LockedQueue::new(1_000)
        }
    }

    struct ChannelTester;

    impl suite::Tester<ChanneledQueue<u64>> for ChannelTester {
        fn create_queue(&self) -> ChanneledQueue<u64> {
            ChanneledQueue::new(1_000).expect("worker thread spawns")
        }
    }

    macro_rules! suite_for {
        ($module:ident, $tester:expr) => {
            mod $module {
                use super::*;

                #[test]
                fn min_extraction_order() {
                    suite::test_min_extraction_order($tester);
                }

                #[test]
                fn peek_pop_agreement() {
                    suite::test_peek_pop_agreement($tester);
                }

                #[test]
                fn update_reorders() {
                    suite::test_update_reorders($tester);
                }

                #[test]
                fn size_accounting() {
                    suite::test_size_accounting($tester);
                }

                #[test]
                fn empty_queue() {
                    suite::test_empty_queue($tester);
                }

                #[test]
                fn stale_and_foreign_keys() {
                    suite::test_stale_and_foreign_keys($tester);
                }

                #[test]
                fn concurrent_push() {
                    suite::test_concurrent_push($tester);
                }

                #[test]
                fn concurrent_push_pop_update() {
                    suite::test_concurrent_push_pop_update($tester);
                }
            }
        };
    }

    suite_for!(locked, LockTester);
    suite_for!(channeled, ChannelTester);
}

#[cfg(test)]
mod stress {
    use std::sync::Arc;

    use pqueue::test::stress::{StressTestConfig, run_stress_test};

    use crate::{ChanneledQueue, LockedQueue};

    fn short_run() -> StressTestConfig {
        StressTestConfig {
            num_producers: 4,
            num_ops: 2_000,
            num_consumers: 2,
            drain_batch_size: 16,
            run_duration_seconds: 5,
            ..StressTestConfig::default()
        }
    }

    #[test]
    fn locked_queue_survives_stress() {
        let _ = env_logger::builder().is_test(true).try_init();
        let results = run_stress_test(Arc::new(LockedQueue::<u64>::new(8_000)), short_run());

        assert!(results.is_consistent(), "{results:?}");
    }

    #[test]
    fn channeled_queue_survives_stress() {
        let _ = env_logger::builder().is_test(true).try_init();
        let queue = ChanneledQueue::<u64>::new(8_000).unwrap();
        let results = run_stress_test(Arc::new(queue), short_run());

        assert!(results.is_consistent(), "{results:?}");
    }
}
