use crate::adapter::{count_nodes, EngineAdapter};
use crate::object::{walk_path, ObjectRef, Value};
use crate::page::HeapStats;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

impl fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.used_bytes as f64 / 1024.0 / 1024.0;
        let limit = self.limit_bytes as f64 / 1024.0 / 1024.0;
        write!(f, "{used:.1}MB / {limit:.0}MB")
    }
}

impl From<HeapStats> for MemoryUsage {
    fn from(stats: HeapStats) -> Self {
        Self { used_bytes: stats.used_bytes, limit_bytes: stats.limit_bytes }
    }
}

/// One best-effort reading of the engine's frame statistics. Metrics the
/// current engine build does not expose stay `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfSnapshot {
    pub fps: Option<f64>,
    #[serde(rename = "drawcalls")]
    pub draw_calls: Option<f64>,
    pub triangles: Option<f64>,
    pub nodes: Option<u64>,
    pub version: Option<String>,
    pub memory: Option<MemoryUsage>,
}

/// Renders a metric for text surfaces, with the placeholder for missing ones.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value}"),
        None => "--".to_string(),
    }
}

/// Samples frame statistics from whatever the engine build exposes. Every
/// metric walks its own ladder of known locations and keeps the first usable
/// value.
pub struct PerfSampler {
    adapter: Rc<EngineAdapter>,
}

impl PerfSampler {
    pub fn new(adapter: Rc<EngineAdapter>) -> Self {
        Self { adapter }
    }

    pub fn sample(&self) -> PerfSnapshot {
        let Some(handle) = self.adapter.detect() else {
            return PerfSnapshot::default();
        };
        let root = &handle.root;

        let mut fps = frame_rate(root);
        if fps.is_none() {
            fps = numeric_path(root, &["profiler", "_stats", "fps", "counter", "value"])
                .map(f64::round);
        }
        let mut draw_calls = draw_call_ladder(root);
        let mut triangles = triangle_ladder(root);
        if draw_calls.is_none() || triangles.is_none() {
            if let Some(text) = self.adapter.page().stats_overlay_text() {
                if draw_calls.is_none() {
                    draw_calls = scrape(&text, r"(?i)draw[:\s]*(\d+)");
                }
                if triangles.is_none() {
                    triangles = scrape(&text, r"(?i)tri[:\s]*(\d+)");
                }
            }
        }

        let nodes = self
            .adapter
            .current_scene(&handle)
            .map(|scene| count_nodes(&scene) as u64);
        let memory = self.adapter.page().heap_stats().map(MemoryUsage::from);

        PerfSnapshot {
            fps,
            draw_calls,
            triangles,
            nodes,
            version: Some(handle.version.clone()),
            memory,
        }
    }
}

fn numeric_path(root: &ObjectRef, path: &[&str]) -> Option<f64> {
    walk_path(root, path).and_then(|v| v.as_f64())
}

fn frame_rate(root: &ObjectRef) -> Option<f64> {
    if let Some(frame_time) = numeric_path(root, &["game", "_frameTime"]).filter(|v| *v > 0.0) {
        return Some((1000.0 / frame_time).round());
    }
    if let Some(delta) = numeric_path(root, &["director", "_deltaTime"]).filter(|v| *v > 0.0) {
        return Some((1.0 / delta).round());
    }
    // The configured target rate, only meaningful when non-zero.
    numeric_path(root, &["game", "frameRate"]).filter(|v| *v != 0.0 && !v.is_nan())
}

fn draw_call_ladder(root: &ObjectRef) -> Option<f64> {
    numeric_path(root, &["profiler", "_stats", "draws", "counter", "value"])
        .or_else(|| numeric_path(root, &["director", "root", "device", "numDrawCalls"]))
        .or_else(|| numeric_path(root, &["debug", "_stats", "drawcalls"]))
        .or_else(|| numeric_path(root, &["renderer", "drawCalls"]))
        .or_else(|| numeric_path(root, &["renderer", "_drawCalls"]))
        .or_else(|| numeric_path(root, &["director", "_renderStats", "drawCalls"]))
        .or_else(|| numeric_path(root, &["game", "_renderStats", "drawCalls"]))
        .or_else(|| counter_or_direct(root, &["internal", "profiler", "_stats", "draws"]))
}

fn triangle_ladder(root: &ObjectRef) -> Option<f64> {
    numeric_path(root, &["profiler", "_stats", "tricount", "counter", "value"])
        .or_else(|| numeric_path(root, &["debug", "_stats", "triangles"]))
        .or_else(|| numeric_path(root, &["director", "_renderStats", "triangles"]))
        .or_else(|| numeric_path(root, &["game", "_renderStats", "triangles"]))
        .or_else(|| counter_or_direct(root, &["internal", "profiler", "_stats", "tricount"]))
}

/// Some stat tables wrap values in a counter object, some store them directly.
fn counter_or_direct(root: &ObjectRef, path: &[&str]) -> Option<f64> {
    match walk_path(root, path)? {
        Value::Number(n) => Some(n),
        Value::Object(stat) => walk_path(&stat, &["counter", "value"]).and_then(|v| v.as_f64()),
        _ => None,
    }
}

fn scrape(text: &str, pattern: &str) -> Option<f64> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{field_object, new_object, set_field};
    use crate::page::PageHost;

    struct StatsHost {
        globals: ObjectRef,
        heap: Option<HeapStats>,
        overlay: Option<String>,
    }

    impl PageHost for StatsHost {
        fn globals(&self) -> ObjectRef {
            self.globals.clone()
        }

        fn heap_stats(&self) -> Option<HeapStats> {
            self.heap
        }

        fn stats_overlay_text(&self) -> Option<String> {
            self.overlay.clone()
        }
    }

    fn engine_root(version: &str) -> ObjectRef {
        let director = new_object();
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![]));
        set_field(&director, "_scene", scene);
        let root = new_object();
        set_field(&root, "ENGINE_VERSION", version);
        set_field(&root, "director", director);
        root
    }

    fn sampler(root: ObjectRef, heap: Option<HeapStats>, overlay: Option<String>) -> PerfSampler {
        let globals = new_object();
        set_field(&globals, "cc", root);
        let host = Rc::new(StatsHost { globals, heap, overlay });
        PerfSampler::new(Rc::new(EngineAdapter::new(host)))
    }

    #[test]
    fn absent_engine_yields_an_empty_snapshot() {
        let globals = new_object();
        let host = Rc::new(StatsHost { globals, heap: None, overlay: None });
        let sampler = PerfSampler::new(Rc::new(EngineAdapter::new(host)));
        assert_eq!(sampler.sample(), PerfSnapshot::default());
    }

    #[test]
    fn fps_prefers_frame_time_over_delta_and_target() {
        let root = engine_root("3.8.0");
        let game = new_object();
        set_field(&game, "_frameTime", 20.0);
        set_field(&game, "frameRate", 30.0);
        set_field(&root, "game", game);
        let director = field_object(&root, "director").expect("director");
        set_field(&director, "_deltaTime", 0.025);

        let snapshot = sampler(root, None, None).sample();
        assert_eq!(snapshot.fps, Some(50.0));
    }

    #[test]
    fn fps_falls_through_delta_time_to_target_rate() {
        let root = engine_root("2.4.13");
        let director = field_object(&root, "director").expect("director");
        set_field(&director, "_deltaTime", 0.025);
        let snapshot = sampler(root.clone(), None, None).sample();
        assert_eq!(snapshot.fps, Some(40.0));

        let root = engine_root("2.4.13");
        let game = new_object();
        set_field(&game, "frameRate", 30.0);
        set_field(&root, "game", game);
        let snapshot = sampler(root, None, None).sample();
        assert_eq!(snapshot.fps, Some(30.0));
    }

    #[test]
    fn profiler_counters_feed_all_three_metrics() {
        let root = engine_root("3.8.0");
        let stats = new_object();
        for (name, value) in [("fps", 59.7), ("draws", 12.0), ("tricount", 340.0)] {
            let counter = new_object();
            set_field(&counter, "value", value);
            let wrapped = new_object();
            set_field(&wrapped, "counter", counter);
            set_field(&stats, name, wrapped);
        }
        let profiler = new_object();
        set_field(&profiler, "_stats", stats);
        set_field(&root, "profiler", profiler);

        let snapshot = sampler(root, None, None).sample();
        assert_eq!(snapshot.fps, Some(60.0), "counter fps is rounded");
        assert_eq!(snapshot.draw_calls, Some(12.0));
        assert_eq!(snapshot.triangles, Some(340.0));
    }

    #[test]
    fn legacy_renderer_field_wins_before_the_underscored_one() {
        let root = engine_root("2.4.13");
        let renderer = new_object();
        set_field(&renderer, "drawCalls", 5.0);
        set_field(&renderer, "_drawCalls", 9.0);
        set_field(&root, "renderer", renderer);

        let snapshot = sampler(root, None, None).sample();
        assert_eq!(snapshot.draw_calls, Some(5.0));
    }

    #[test]
    fn internal_stats_accept_direct_numbers() {
        let root = engine_root("3.8.0");
        let stats = new_object();
        set_field(&stats, "draws", 9.0);
        set_field(&stats, "tricount", 18.0);
        let profiler = new_object();
        set_field(&profiler, "_stats", stats);
        let internal = new_object();
        set_field(&internal, "profiler", profiler);
        set_field(&root, "internal", internal);

        let snapshot = sampler(root, None, None).sample();
        assert_eq!(snapshot.draw_calls, Some(9.0));
        assert_eq!(snapshot.triangles, Some(18.0));
    }

    #[test]
    fn overlay_text_is_the_last_resort() {
        let root = engine_root("3.8.0");
        let renderer = new_object();
        set_field(&renderer, "drawCalls", 5.0);
        set_field(&root, "renderer", renderer);

        let overlay = Some("GFX draws: 23 | tris: 456".to_string());
        let snapshot = sampler(root, None, overlay).sample();
        // A ladder hit keeps the scrape out; only the missing metric scrapes.
        assert_eq!(snapshot.draw_calls, Some(5.0));
        assert_eq!(snapshot.triangles, Some(456.0));
    }

    #[test]
    fn node_count_version_and_memory_ride_along() {
        let root = engine_root("3.8.0");
        let scene = walk_path(&root, &["director", "_scene"])
            .and_then(|v| v.as_object().cloned())
            .expect("scene");
        let child = new_object();
        set_field(&child, "uuid", "c1");
        set_field(&scene, "children", Value::array(vec![Value::Object(child)]));

        let heap = HeapStats { used_bytes: 13_107_200, limit_bytes: 2_147_483_648 };
        let snapshot = sampler(root, Some(heap), None).sample();
        assert_eq!(snapshot.nodes, Some(2));
        assert_eq!(snapshot.version.as_deref(), Some("3.8.0"));
        let memory = snapshot.memory.expect("heap stats mapped");
        assert_eq!(memory.to_string(), "12.5MB / 2048MB");
    }

    #[test]
    fn placeholder_rendering_for_missing_metrics() {
        assert_eq!(format_metric(Some(60.0)), "60");
        assert_eq!(format_metric(Some(59.5)), "59.5");
        assert_eq!(format_metric(None), "--");
    }
}
