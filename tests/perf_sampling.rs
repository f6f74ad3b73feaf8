use scenelens::fixture::FixturePage;
use scenelens::perf::PerfSnapshot;
use scenelens::protocol::{InspectorRequest, InspectorResponse};
use scenelens::InspectorServer;
use std::rc::Rc;

fn sample(server: &mut InspectorServer) -> PerfSnapshot {
    let response = server.handle(InspectorRequest::GetPerf).expect("perf reply");
    match response {
        InspectorResponse::Perf { data } => data,
        other => panic!("unexpected perf reply: {other:?}"),
    }
}

#[test]
fn modern_fixture_reads_the_profiler_block() {
    let mut server = InspectorServer::new(Rc::new(FixturePage::v3()));
    let perf = sample(&mut server);
    assert_eq!(perf.fps, Some(60.0), "profiler fps counter is rounded");
    assert_eq!(perf.draw_calls, Some(14.0));
    assert_eq!(perf.triangles, Some(5_600.0));
    assert_eq!(perf.nodes, Some(6));
    assert_eq!(perf.version.as_deref(), Some("3.8.2"));
    let memory = perf.memory.expect("heap stats exposed by the fixture");
    assert_eq!(memory.to_string(), "50.0MB / 512MB");
}

#[test]
fn legacy_fixture_walks_the_older_ladders() {
    let mut server = InspectorServer::new(Rc::new(FixturePage::v2()));
    let perf = sample(&mut server);
    assert_eq!(perf.fps, Some(60.0), "frame time inverts to fps");
    assert_eq!(perf.draw_calls, Some(23.0), "renderer counter");
    assert_eq!(perf.triangles, Some(864.0), "director render stats");
    assert_eq!(perf.nodes, Some(4));
    assert_eq!(perf.version.as_deref(), Some("2.4.13"));
}

#[test]
fn perf_is_silent_without_an_engine() {
    struct EmptyHost;
    impl scenelens::page::PageHost for EmptyHost {
        fn globals(&self) -> scenelens::object::ObjectRef {
            scenelens::object::new_object()
        }
    }

    let mut server = InspectorServer::new(Rc::new(EmptyHost));
    assert!(
        server.handle(InspectorRequest::GetPerf).is_none(),
        "page-panel requests degrade to silence, not errors"
    );
}
