// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use pipebench_track::test_helpers::create_tracker;

use crate::engine::Engine;

#[must_use]
pub fn start_test(full_filepath: &str) -> Engine {
    Engine::new(&create_tracker(full_filepath))
}
