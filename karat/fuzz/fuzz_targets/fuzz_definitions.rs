#![no_main]

use karat::{Context, Engine, EvaluationMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let engine = Engine::new();
        if let Ok(definition) = engine.load_definition(s) {
            let _ = engine.evaluate_definition(&definition, &Context::new(), EvaluationMode::Commit);
        }
    }
});
