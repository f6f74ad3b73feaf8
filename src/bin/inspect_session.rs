use anyhow::{Context, Result};
use scenelens::adapter::VersionFamily;
use scenelens::cli::CliArgs;
use scenelens::config::InspectorConfig;
use scenelens::fixture::FixturePage;
use scenelens::float::{draw_call_rating, fps_rating, FloatPanel};
use scenelens::page::PageHost;
use scenelens::perf::format_metric;
use scenelens::props::{PropertyGroup, PropertyValue};
use scenelens::protocol::StatusUpdate;
use scenelens::tree::NodeTreeEntry;
use scenelens::{InProcessTransport, InspectorServer, PanelDriver, PanelObserver, Relay};
use std::env;
use std::io::Cursor;
use std::process;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let raw: Vec<String> = env::args().collect();
    if raw.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return Ok(());
    }
    let args = CliArgs::parse(raw.iter().map(String::as_str))?;

    let mut config = InspectorConfig::load_or_default("config/inspector.json");
    let overrides = args.config_overrides();
    if !overrides.is_empty() {
        eprintln!("[session] command line overrides: {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);

    let family = args.family().unwrap_or(VersionFamily::V3);
    let ticks = args.ticks().unwrap_or(3);

    let page = Rc::new(FixturePage::for_family(family));
    devtools_session(&config, Rc::clone(&page) as Rc<dyn PageHost>, family, ticks);
    float_session(&config, page as Rc<dyn PageHost>)
}

fn print_usage() {
    eprintln!(
        "Inspect Session

Usage:
  inspect_session [--family v2|v3] [--ticks N] [--interval MS] [--timeout MS]

Runs a deterministic inspector session against a built-in fixture page:
a few devtools polling ticks with a live edit and a highlight, then the
float-panel flow (perf readout, sprite list, texture swap and reset).
Interval and timeout override config/inspector.json when given.
"
    );
}

fn devtools_session(config: &InspectorConfig, page: Rc<dyn PageHost>, family: VersionFamily, ticks: u32) {
    println!("== devtools panel ==");
    let server = InspectorServer::new(page);
    let relay = Relay::new(InProcessTransport::new(server), config.reply_window());
    let mut driver = PanelDriver::new(relay);
    let mut observer = PrintingObserver;

    let target = match family {
        VersionFamily::V3 => "player-1",
        VersionFamily::V2 => "hero-1",
    };
    driver.select(target);

    for tick in 0..ticks {
        println!("-- tick {tick} --");
        driver.tick(&mut observer);
        if tick == 0 {
            // A rename lands on the live graph; the next tick reports it once.
            driver.set_prop(target, "Node", "name", "Inspected");
            driver.highlight(target);
        }
        if tick + 1 < ticks {
            thread::sleep(config.poll_interval());
        }
    }

    match driver.relay().transport().server().overlay() {
        Some(rect) => println!(
            "[highlight] x={:.1} y={:.1} w={:.1} h={:.1}",
            rect.x, rect.y, rect.width, rect.height
        ),
        None => println!("[highlight] no overlay"),
    }
}

fn float_session(config: &InspectorConfig, page: Rc<dyn PageHost>) -> Result<()> {
    println!("== float panel ==");
    let server = InspectorServer::new(page);
    let relay = Relay::new(InProcessTransport::new(server), config.reply_window());
    let mut panel = FloatPanel::new(relay, config.engine_wait_retries);

    while !panel.poll_engine() {
        if panel.gave_up() {
            eprintln!("[float] engine never appeared, panel stays hidden");
            return Ok(());
        }
        thread::sleep(Duration::from_millis(200));
    }

    let perf = panel.refresh_perf().clone();
    let fps_note = perf.fps.map(|v| fps_rating(v).as_str()).unwrap_or("--");
    let draw_note = perf.draw_calls.map(|v| draw_call_rating(v).as_str()).unwrap_or("--");
    println!("  FPS         {} ({fps_note})", format_metric(perf.fps));
    println!("  Draw Calls  {} ({draw_note})", format_metric(perf.draw_calls));
    println!("  Triangles   {}", format_metric(perf.triangles));
    println!("  Nodes       {}", perf.nodes.map_or_else(|| "--".to_string(), |n| n.to_string()));
    println!("  Version     {}", perf.version.as_deref().unwrap_or("--"));
    println!("  Memory      {}", perf.memory.as_ref().map_or_else(|| "--".to_string(), |m| m.to_string()));

    panel.refresh_nodes();
    println!("[float] sprite nodes:");
    for node in panel.visible_nodes() {
        let frame = if node.sprite_frame.is_empty() { "no texture" } else { &node.sprite_frame };
        println!("  {} ({frame})", node.name);
    }

    let Some(target) = panel.visible_nodes().first().map(|node| node.uuid.clone()) else {
        println!("[float] no sprite nodes to swap");
        return Ok(());
    };
    panel.select(target);
    panel.set_pending_image(demo_png()?);
    panel.apply_replacement();
    println!("[float] {}", panel.last_outcome().unwrap_or("no outcome"));
    panel.reset_replacement();
    println!("[float] {}", panel.last_outcome().unwrap_or("no outcome"));
    Ok(())
}

fn demo_png() -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .context("encode replacement image")?;
    Ok(out.into_inner())
}

struct PrintingObserver;

impl PanelObserver for PrintingObserver {
    fn tree_changed(&mut self, tree: &[NodeTreeEntry], version: Option<&str>) {
        println!("[tree] engine {}", version.unwrap_or("unknown"));
        for entry in tree {
            print_node(entry, 1);
        }
    }

    fn props_changed(&mut self, uuid: &str, props: &[PropertyGroup]) {
        println!("[props] {uuid}");
        for group in props {
            println!("  {}", group.name);
            for prop in &group.properties {
                let marker = if prop.editable { "" } else { " (ro)" };
                println!("    {}{marker} = {}", prop.name, value_summary(&prop.value));
            }
        }
    }

    fn status_changed(&mut self, status: &StatusUpdate) {
        match &status.version {
            Some(version) => println!("[status] {:?} ({version})", status.status),
            None => println!("[status] {:?}", status.status),
        }
    }
}

fn print_node(entry: &NodeTreeEntry, depth: usize) {
    let flag = if entry.active { "" } else { " [inactive]" };
    println!("{}{} <{:?}>{flag}", "  ".repeat(depth), entry.name, entry.node_type);
    for child in &entry.children {
        print_node(child, depth + 1);
    }
}

fn value_summary(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Number { value } => format!("{value}"),
        PropertyValue::String { value } => format!("{value:?}"),
        PropertyValue::Boolean { value } => format!("{value}"),
        PropertyValue::Vec2 { x, y } => format!("({x}, {y})"),
        PropertyValue::Vec3 { x, y, z } => format!("({x}, {y}, {z})"),
        PropertyValue::Size { width, height } => format!("{width}x{height}"),
        PropertyValue::Color { r, g, b, a } => format!("rgba({r}, {g}, {b}, {a})"),
        PropertyValue::Enum { value, options } => {
            match options.iter().find(|option| option.value == *value) {
                Some(option) => format!("{} ({value})", option.name),
                None => format!("{value}"),
            }
        }
        PropertyValue::NodeRef { display, .. } => display.clone(),
    }
}
