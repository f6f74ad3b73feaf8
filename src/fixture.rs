use crate::adapter::VersionFamily;
use crate::object::{new_object, object_with_class, set_field, ObjectRef, Value};
use crate::page::{HeapStats, PageHost, PageRect};

/// A self-contained page with a deterministic engine graph, one per supported
/// engine generation. Sessions and tests run against these when no live page
/// is around; every uuid, size, and counter below is fixed.
pub struct FixturePage {
    globals: ObjectRef,
    canvas: PageRect,
    heap: HeapStats,
}

impl FixturePage {
    pub fn for_family(family: VersionFamily) -> Self {
        match family {
            VersionFamily::V2 => Self::v2(),
            VersionFamily::V3 => Self::v3(),
        }
    }

    /// Modern-family page: component-based transforms, live enum tables, a
    /// profiler block, and the asset constructors texture swaps need.
    pub fn v3() -> Self {
        let player = node_v3("player-1", "Player", 320.0, 240.0);
        attach(&player, ui_transform(100.0, 50.0));
        attach(&player, sprite_component("player.png", true));

        let score = node_v3("score-1", "Score", 480.0, 600.0);
        attach(&score, ui_transform(120.0, 40.0));
        attach(&score, label_component("0"));

        let button = node_v3("button-1", "StartButton", 480.0, 120.0);
        attach(&button, ui_transform(200.0, 80.0));
        attach(&button, sprite_component("button.png", true));
        attach(&button, button_component());

        let paused = node_v3("paused-1", "PausedOverlay", 480.0, 320.0);
        set_field(&paused, "active", false);
        attach(&paused, ui_transform(960.0, 640.0));
        attach(&paused, widget_component());

        let canvas = node_v3("canvas-1", "Canvas", 480.0, 320.0);
        attach(&canvas, ui_transform(960.0, 640.0));
        attach(&canvas, canvas_component());
        set_children(&canvas, vec![player, score, button, paused]);

        let scene = new_object();
        set_field(&scene, "uuid", "scene-root");
        set_field(&scene, "name", "Main");
        set_children(&scene, vec![canvas]);

        let root = engine_root_v3(scene);
        let globals = new_object();
        set_field(&globals, "cc", root);

        Self {
            globals,
            canvas: PageRect { left: 0.0, top: 0.0, width: 960.0, height: 640.0 },
            heap: HeapStats { used_bytes: 52_428_800, limit_bytes: 536_870_912 },
        }
    }

    /// Legacy-family page: inline node geometry, a private scene field, and no
    /// live enum tables so the documented fallbacks apply.
    pub fn v2() -> Self {
        let hero = node_v2("hero-1", "Hero", 160.0, 120.0, 64.0, 64.0);
        attach(&hero, sprite_component("hero.png", false));
        attach(&hero, hero_controller());

        let title = node_v2("title-1", "Title", 240.0, 280.0, 200.0, 48.0);
        attach(&title, label_component("My Game"));

        let play = node_v2("play-button-1", "PlayButton", 240.0, 80.0, 120.0, 48.0);
        attach(&play, sprite_component("play.png", false));
        attach(&play, button_component());

        let scene = new_object();
        set_field(&scene, "uuid", "scene-root");
        set_field(&scene, "name", "Stage");
        set_children(&scene, vec![hero, title, play]);

        let root = engine_root_v2(scene);
        let globals = new_object();
        set_field(&globals, "cc", root);

        Self {
            globals,
            canvas: PageRect { left: 0.0, top: 0.0, width: 960.0, height: 640.0 },
            heap: HeapStats { used_bytes: 52_428_800, limit_bytes: 536_870_912 },
        }
    }
}

impl PageHost for FixturePage {
    fn globals(&self) -> ObjectRef {
        self.globals.clone()
    }

    fn canvas_rect(&self) -> Option<PageRect> {
        Some(self.canvas)
    }

    fn heap_stats(&self) -> Option<HeapStats> {
        Some(self.heap)
    }
}

fn engine_root_v3(scene: ObjectRef) -> ObjectRef {
    let director = new_object();
    director.borrow_mut().define_method("getScene", move |_, _| Value::Object(scene.clone()));

    let visible = size_object(960.0, 640.0);
    let view = new_object();
    view.borrow_mut().define_method("getVisibleSize", move |_, _| Value::Object(visible.clone()));

    let profiler = new_object();
    let stats = new_object();
    set_field(&stats, "fps", counter(60.2));
    set_field(&stats, "draws", counter(14.0));
    set_field(&stats, "tricount", counter(5_600.0));
    set_field(&profiler, "_stats", stats);

    let root = new_object();
    set_field(&root, "ENGINE_VERSION", "3.8.2");
    set_field(&root, "director", director);
    set_field(&root, "view", view);
    set_field(&root, "profiler", profiler);
    set_field(&root, "game", new_object());

    let layers = new_object();
    let layer_enum = new_object();
    set_field(&layer_enum, "UI_2D", (1u32 << 25) as f64);
    set_field(&layer_enum, "DEFAULT", (1u32 << 30) as f64);
    set_field(&layers, "Enum", layer_enum);
    set_field(&root, "Layers", layers);

    let sprite_class = object_with_class("Sprite");
    set_field(&sprite_class, "Type", enum_table(&[("SIMPLE", 0.0), ("SLICED", 1.0), ("TILED", 2.0), ("FILLED", 3.0)]));
    set_field(&sprite_class, "SizeMode", enum_table(&[("CUSTOM", 0.0), ("TRIMMED", 1.0), ("RAW", 2.0)]));
    set_field(&sprite_class, "FillType", enum_table(&[("HORIZONTAL", 0.0), ("VERTICAL", 1.0), ("RADIAL", 2.0)]));
    set_field(&root, "Sprite", sprite_class);

    let label_class = object_with_class("Label");
    set_field(&label_class, "HorizontalAlign", enum_table(&[("LEFT", 0.0), ("CENTER", 1.0), ("RIGHT", 2.0)]));
    set_field(&label_class, "VerticalAlign", enum_table(&[("TOP", 0.0), ("CENTER", 1.0), ("BOTTOM", 2.0)]));
    set_field(&label_class, "Overflow", enum_table(&[("NONE", 0.0), ("CLAMP", 1.0), ("SHRINK", 2.0), ("RESIZE_HEIGHT", 3.0)]));
    set_field(&root, "Label", label_class);

    set_field(&root, "SpriteFrame", object_with_class("SpriteFrame"));
    set_field(&root, "Texture2D", object_with_class("Texture2D"));
    set_field(&root, "ImageAsset", object_with_class("ImageAsset"));
    root
}

fn engine_root_v2(scene: ObjectRef) -> ObjectRef {
    let director = new_object();
    set_field(&director, "_scene", scene);
    let render_stats = new_object();
    set_field(&render_stats, "triangles", 864.0);
    set_field(&director, "_renderStats", render_stats);

    let game = new_object();
    set_field(&game, "_frameTime", 1000.0 / 60.0);

    let renderer = new_object();
    set_field(&renderer, "drawCalls", 23.0);

    let root = new_object();
    set_field(&root, "ENGINE_VERSION", "2.4.13");
    set_field(&root, "director", director);
    set_field(&root, "game", game);
    set_field(&root, "renderer", renderer);
    set_field(&root, "winSize", size_object(480.0, 320.0));
    set_field(&root, "SpriteFrame", object_with_class("SpriteFrame"));
    set_field(&root, "Texture2D", object_with_class("Texture2D"));
    root
}

fn node_v3(uuid: &str, name: &str, x: f64, y: f64) -> ObjectRef {
    let node = new_object();
    set_field(&node, "uuid", uuid);
    set_field(&node, "name", name);
    set_field(&node, "active", true);
    set_field(&node, "position", vec3_object(x, y, 0.0));
    set_field(&node, "worldPosition", vec3_object(x, y, 0.0));
    set_field(&node, "eulerAngles", vec3_object(0.0, 0.0, 0.0));
    set_field(&node, "angle", 0.0);
    set_field(&node, "scale", vec3_object(1.0, 1.0, 1.0));
    set_field(&node, "layer", (1u32 << 25) as f64);
    set_field(&node, "components", Value::array(vec![]));
    set_field(&node, "children", Value::array(vec![]));
    node
}

fn node_v2(uuid: &str, name: &str, x: f64, y: f64, width: f64, height: f64) -> ObjectRef {
    let node = new_object();
    set_field(&node, "uuid", uuid);
    set_field(&node, "name", name);
    set_field(&node, "active", true);
    set_field(&node, "x", x);
    set_field(&node, "y", y);
    set_field(&node, "width", width);
    set_field(&node, "height", height);
    set_field(&node, "anchorX", 0.5);
    set_field(&node, "anchorY", 0.5);
    set_field(&node, "scaleX", 1.0);
    set_field(&node, "scaleY", 1.0);
    set_field(&node, "angle", 0.0);
    set_field(&node, "opacity", 255.0);
    set_field(&node, "zIndex", 0.0);
    set_field(&node, "color", color_object(255.0, 255.0, 255.0));
    set_field(&node, "components", Value::array(vec![]));
    set_field(&node, "children", Value::array(vec![]));
    node
}

fn attach(node: &ObjectRef, comp: ObjectRef) {
    set_field(&comp, "node", node.clone());
    if let Some(Value::Array(components)) = node.borrow().get("components") {
        components.borrow_mut().push(Value::Object(comp));
    }
}

fn set_children(node: &ObjectRef, children: Vec<ObjectRef>) {
    set_field(node, "children", Value::array(children.into_iter().map(Value::Object).collect()));
}

fn ui_transform(width: f64, height: f64) -> ObjectRef {
    let comp = object_with_class("cc.UITransform");
    set_field(&comp, "contentSize", size_object(width, height));
    set_field(&comp, "anchorPoint", vec2_object(0.5, 0.5));
    comp
}

fn sprite_component(frame_name: &str, modern: bool) -> ObjectRef {
    let texture = if modern {
        let asset = object_with_class("cc.ImageAsset");
        set_field(&asset, "width", 64.0);
        set_field(&asset, "height", 64.0);
        let texture = object_with_class("cc.Texture2D");
        set_field(&texture, "image", asset);
        texture
    } else {
        object_with_class("cc.Texture2D")
    };
    let frame = object_with_class("cc.SpriteFrame");
    set_field(&frame, "name", frame_name);
    set_field(&frame, "texture", texture);

    let comp = object_with_class("cc.Sprite");
    set_field(&comp, "enabled", true);
    set_field(&comp, "spriteFrame", frame);
    set_field(&comp, "type", 0.0);
    set_field(&comp, "sizeMode", 1.0);
    set_field(&comp, "color", color_object(255.0, 255.0, 255.0));
    comp
}

fn label_component(text: &str) -> ObjectRef {
    let comp = object_with_class("cc.Label");
    set_field(&comp, "enabled", true);
    set_field(&comp, "string", text);
    set_field(&comp, "fontSize", 24.0);
    set_field(&comp, "lineHeight", 32.0);
    set_field(&comp, "horizontalAlign", 1.0);
    set_field(&comp, "verticalAlign", 1.0);
    set_field(&comp, "overflow", 0.0);
    comp
}

fn button_component() -> ObjectRef {
    let comp = object_with_class("cc.Button");
    set_field(&comp, "enabled", true);
    set_field(&comp, "interactable", true);
    set_field(&comp, "zoomScale", 1.2);
    comp
}

fn canvas_component() -> ObjectRef {
    let comp = object_with_class("cc.Canvas");
    set_field(&comp, "enabled", true);
    comp
}

fn widget_component() -> ObjectRef {
    let comp = object_with_class("cc.Widget");
    set_field(&comp, "enabled", true);
    set_field(&comp, "isAlignTop", true);
    set_field(&comp, "isAlignBottom", true);
    set_field(&comp, "isAlignLeft", true);
    set_field(&comp, "isAlignRight", true);
    comp
}

/// Game-side script component; its fields only reach the panel through the
/// generic scan.
fn hero_controller() -> ObjectRef {
    let comp = object_with_class("game.HeroController");
    set_field(&comp, "enabled", true);
    set_field(&comp, "hp", 3.0);
    set_field(&comp, "speed", 140.0);
    comp
}

fn counter(value: f64) -> ObjectRef {
    let inner = new_object();
    set_field(&inner, "value", value);
    let stat = new_object();
    set_field(&stat, "counter", inner);
    stat
}

fn enum_table(entries: &[(&str, f64)]) -> ObjectRef {
    let table = new_object();
    for (name, value) in entries {
        set_field(&table, *name, *value);
    }
    table
}

fn vec2_object(x: f64, y: f64) -> ObjectRef {
    let v = new_object();
    set_field(&v, "x", x);
    set_field(&v, "y", y);
    v
}

fn vec3_object(x: f64, y: f64, z: f64) -> ObjectRef {
    let v = new_object();
    set_field(&v, "x", x);
    set_field(&v, "y", y);
    set_field(&v, "z", z);
    v
}

fn size_object(width: f64, height: f64) -> ObjectRef {
    let s = new_object();
    set_field(&s, "width", width);
    set_field(&s, "height", height);
    s
}

fn color_object(r: f64, g: f64, b: f64) -> ObjectRef {
    let c = object_with_class("Color");
    set_field(&c, "r", r);
    set_field(&c, "g", g);
    set_field(&c, "b", b);
    set_field(&c, "a", 255.0);
    c
}
