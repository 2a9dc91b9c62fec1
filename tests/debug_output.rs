//! Driver progress output (`ITEREC_DEBUG_EVAL`) with configs built in code.

mod common;

use iterec::config::DEBUG_EVAL_ENV;
use iterec::demos::Demos;
use iterec::{TrampolineConfig, Value};
use std::env;

#[test]
fn test_zero_progress_period_from_code() {
    // Built directly, so validation never ran on it
    let config = TrampolineConfig {
        debug_every: 0,
        ..TrampolineConfig::default()
    };
    env::set_var(DEBUG_EVAL_ENV, "1");

    let demos = Demos::with_config(config);
    let result = demos.trampoline.invoke(demos.sum_to, [3]);
    assert_eq!(result.unwrap(), Value::Long(6));
}

#[test]
fn test_zero_progress_period_after_set_config() {
    let mut demos = common::demos();
    demos.trampoline.set_config(TrampolineConfig {
        debug_every: 0,
        memoize: false,
        ..TrampolineConfig::default()
    });
    env::set_var(DEBUG_EVAL_ENV, "1");
    let result = demos.trampoline.invoke(demos.fact, [6]);
    assert_eq!(result.unwrap(), Value::Long(720));
}
