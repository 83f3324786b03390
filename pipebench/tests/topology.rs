// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use pipebench::config::Configuration;
use pipebench::error::BenchError;
use pipebench::stage::StageRole;
use pipebench::topology::assemble;

fn config(pipe_count: usize, stage_count: usize) -> Configuration {
    Configuration {
        pipe_count,
        stage_count,
        sample_count: 1000,
        copy_bound: 64,
        ..Configuration::default()
    }
}

#[test]
fn pipe_shape() {
    for (pipes, stages) in [(1, 1), (5, 6), (3, 10)] {
        let topology = assemble(&config(pipes, stages)).unwrap();
        assert_eq!(topology.pipes().len(), pipes);
        for pipeline in topology.pipes() {
            assert_eq!(pipeline.node_count(), stages + 3);
            assert_eq!(pipeline.edge_count(), stages + 2);
            for edge in pipeline.edges() {
                assert!(edge.from < pipeline.node_count());
                assert!(edge.to < pipeline.node_count());
            }
        }
        assert_eq!(topology.node_count(), pipes * (stages + 3));
        assert_eq!(topology.edge_count(), pipes * (stages + 2));
    }
}

#[test]
fn every_interior_stage_has_one_input_and_one_output() {
    let topology = assemble(&config(2, 4)).unwrap();
    for pipeline in topology.pipes() {
        let n = pipeline.node_count();
        let mut inputs = vec![0; n];
        let mut outputs = vec![0; n];
        for edge in pipeline.edges() {
            outputs[edge.from] += 1;
            inputs[edge.to] += 1;
        }
        assert_eq!(inputs[0], 0);
        assert_eq!(outputs[n - 1], 0);
        for i in 1..n - 1 {
            assert_eq!((inputs[i], outputs[i]), (1, 1));
        }
    }
}

#[test]
fn no_pipes() {
    let topology = assemble(&config(0, 6)).unwrap();
    assert!(topology.pipes().is_empty());
    assert_eq!(topology.node_count(), 0);
    assert_eq!(topology.edge_count(), 0);
}

#[test]
fn single_stage_chain() {
    let topology = assemble(&config(1, 1)).unwrap();
    let stages = topology.pipes()[0].stages();
    assert_eq!(stages.len(), 4);
    assert!(matches!(stages[0].role, StageRole::Source { .. }));
    assert!(matches!(stages[1].role, StageRole::Truncator { sample_count: 1000 }));
    assert!(matches!(stages[2].role, StageRole::Copy { copy_bound: 64 }));
    assert!(matches!(stages[3].role, StageRole::Sink { .. }));
}

#[test]
fn deterministic() {
    assert_eq!(assemble(&config(4, 3)).unwrap(), assemble(&config(4, 3)).unwrap());
    assert_ne!(assemble(&config(4, 3)).unwrap(), assemble(&config(4, 2)).unwrap());
}

#[test]
fn zero_stages_rejected() {
    assert!(matches!(
        assemble(&config(5, 0)),
        Err(BenchError::InvalidConfiguration(_))
    ));
    // Rejected even when no pipes would be built
    assert!(matches!(
        assemble(&config(0, 0)),
        Err(BenchError::InvalidConfiguration(_))
    ));
}

#[test]
fn zero_copy_bound_rejected() {
    let config = Configuration {
        copy_bound: 0,
        ..config(1, 1)
    };
    assert!(matches!(
        assemble(&config),
        Err(BenchError::InvalidConfiguration(_))
    ));
}
