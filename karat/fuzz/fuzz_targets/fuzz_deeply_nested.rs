#![no_main]

use karat::{parse_expression, ResourceLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|depth: u8| {
    let depth = depth as usize + 1;

    let mut expr = String::from("x");
    for i in 0..depth {
        expr = if i % 2 == 0 {
            format!("({} + 1)", expr)
        } else {
            format!("x > 0 ? {} : -1", expr)
        };
    }

    let _ = parse_expression(&expr, &ResourceLimits::default());
});
