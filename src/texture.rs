use crate::adapter::{find_by_uuid, find_component, EngineAdapter, VersionFamily};
use crate::object::{
    field, field_object, new_object, object_with_class, set_field, ObjectRef, Value,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Node key holding the sprite frame that was live before the first
/// replacement. Underscore-prefixed so the property scan never surfaces it.
const STASH_KEY: &str = "__inspectorOriginalSpriteFrame";

/// User-visible result of a texture operation. Failures are reported here,
/// never as errors, so a broken upload cannot take the session down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplaceOutcome {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

/// Swaps the texture of a node's sprite component for a decoded image and
/// restores the original on request.
pub struct TextureReplacer {
    adapter: Rc<EngineAdapter>,
}

impl TextureReplacer {
    pub fn new(adapter: Rc<EngineAdapter>) -> Self {
        Self { adapter }
    }

    /// Decodes `bytes` and installs the result as the sprite frame of the
    /// node's sprite component. The first replacement stashes the frame that
    /// was live at the time; later replacements leave that stash alone.
    pub async fn replace_sprite_texture(&self, uuid: &str, bytes: &[u8]) -> ReplaceOutcome {
        let Some(handle) = self.adapter.detect() else {
            return ReplaceOutcome::fail("engine not detected");
        };
        let Some(node) = self
            .adapter
            .current_scene(&handle)
            .and_then(|scene| find_by_uuid(&scene, uuid))
        else {
            return ReplaceOutcome::fail("node not found");
        };
        let Some(sprite) = find_component(&node, "Sprite") else {
            return ReplaceOutcome::fail("no Sprite component");
        };

        if field_object(&node, STASH_KEY).is_none() {
            if let Some(current) = field_object(&sprite, "spriteFrame") {
                set_field(&node, STASH_KEY, current);
            }
        }

        let image = match decode(bytes).await {
            Ok(image) => image,
            Err(err) => return ReplaceOutcome::fail(format!("image decode failed: {err}")),
        };
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        let frame = if handle.family == VersionFamily::V3 && class_exposed(&handle.root, "ImageAsset")
        {
            modern_frame(width, height, data)
        } else if class_exposed(&handle.root, "Texture2D") {
            legacy_frame(width, height, data)
        } else {
            return ReplaceOutcome::fail("unsupported engine version");
        };
        set_field(&sprite, "spriteFrame", frame);
        ReplaceOutcome::ok()
    }

    /// Puts the stashed original frame back and forgets the stash, so the next
    /// replacement records a fresh original.
    pub fn reset_sprite_texture(&self, uuid: &str) -> ReplaceOutcome {
        let node = self
            .adapter
            .detect()
            .and_then(|handle| self.adapter.current_scene(&handle))
            .and_then(|scene| find_by_uuid(&scene, uuid));
        let Some(node) = node else {
            return ReplaceOutcome::fail("node not found");
        };
        let Some(original) = field_object(&node, STASH_KEY) else {
            return ReplaceOutcome::fail("no original texture saved");
        };
        let Some(sprite) = find_component(&node, "Sprite") else {
            return ReplaceOutcome::fail("no Sprite component");
        };
        set_field(&sprite, "spriteFrame", original);
        node.borrow_mut().remove(STASH_KEY);
        ReplaceOutcome::ok()
    }
}

async fn decode(bytes: &[u8]) -> image::ImageResult<image::DynamicImage> {
    image::load_from_memory(bytes)
}

/// The engine exposes a constructor when the root carries a binding for it.
fn class_exposed(root: &ObjectRef, name: &str) -> bool {
    !matches!(field(root, name), None | Some(Value::Null) | Some(Value::Bool(false)))
}

fn modern_frame(width: u32, height: u32, data: Vec<u8>) -> ObjectRef {
    let asset = object_with_class("ImageAsset");
    set_field(&asset, "width", width as f64);
    set_field(&asset, "height", height as f64);
    set_field(&asset, "data", Value::bytes(data));
    let texture = object_with_class("Texture2D");
    set_field(&texture, "width", width as f64);
    set_field(&texture, "height", height as f64);
    set_field(&texture, "image", asset);
    let frame = object_with_class("SpriteFrame");
    set_field(&frame, "texture", texture);
    set_field(&frame, "name", "");
    frame
}

fn legacy_frame(width: u32, height: u32, data: Vec<u8>) -> ObjectRef {
    let texture = object_with_class("Texture2D");
    set_field(&texture, "width", width as f64);
    set_field(&texture, "height", height as f64);
    set_field(&texture, "data", Value::bytes(data));
    let rect = new_object();
    set_field(&rect, "x", 0.0);
    set_field(&rect, "y", 0.0);
    set_field(&rect, "width", width as f64);
    set_field(&rect, "height", height as f64);
    let frame = object_with_class("SpriteFrame");
    set_field(&frame, "texture", texture);
    set_field(&frame, "rect", rect);
    set_field(&frame, "name", "");
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{class_of, field_f64, field_str};
    use crate::page::PageHost;
    use std::io::Cursor;

    struct BareHost {
        globals: ObjectRef,
    }

    impl PageHost for BareHost {
        fn globals(&self) -> ObjectRef {
            self.globals.clone()
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).expect("png encode");
        buf.into_inner()
    }

    fn sprite_node(uuid: &str) -> (ObjectRef, ObjectRef) {
        let frame = object_with_class("SpriteFrame");
        set_field(&frame, "name", "original.png");
        let sprite = object_with_class("cc.Sprite");
        set_field(&sprite, "spriteFrame", frame);
        let node = new_object();
        set_field(&node, "uuid", uuid);
        set_field(&node, "components", Value::array(vec![Value::Object(sprite.clone())]));
        (node, sprite)
    }

    fn make_replacer(version: &str, scene: ObjectRef, markers: &[&str]) -> TextureReplacer {
        let director = new_object();
        set_field(&director, "_scene", scene);
        let root = new_object();
        set_field(&root, "ENGINE_VERSION", version);
        set_field(&root, "director", director);
        for marker in markers {
            set_field(&root, *marker, object_with_class(*marker));
        }
        let globals = new_object();
        set_field(&globals, "cc", root);
        let adapter = Rc::new(EngineAdapter::new(Rc::new(BareHost { globals })));
        TextureReplacer::new(adapter)
    }

    #[test]
    fn replacement_fails_cleanly_without_engine_or_node_or_sprite() {
        let globals = new_object();
        let adapter = Rc::new(EngineAdapter::new(Rc::new(BareHost { globals })));
        let replacer = TextureReplacer::new(adapter);
        let outcome = pollster::block_on(replacer.replace_sprite_texture("n1", &[]));
        assert_eq!(outcome, ReplaceOutcome::fail("engine not detected"));

        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![]));
        let replacer = make_replacer("3.8.0", scene, &["ImageAsset"]);
        let outcome = pollster::block_on(replacer.replace_sprite_texture("n1", &[]));
        assert_eq!(outcome, ReplaceOutcome::fail("node not found"));

        let bare = new_object();
        set_field(&bare, "uuid", "n1");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(bare)]));
        let replacer = make_replacer("3.8.0", scene, &["ImageAsset"]);
        let outcome = pollster::block_on(replacer.replace_sprite_texture("n1", &[]));
        assert_eq!(outcome, ReplaceOutcome::fail("no Sprite component"));
    }

    #[test]
    fn undecodable_bytes_leave_the_frame_alone() {
        let (node, sprite) = sprite_node("n1");
        let before = field_object(&sprite, "spriteFrame").expect("frame present");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node)]));
        let replacer = make_replacer("3.8.0", scene, &["ImageAsset"]);

        let outcome =
            pollster::block_on(replacer.replace_sprite_texture("n1", b"definitely not an image"));
        assert!(!outcome.success);
        let error = outcome.error.expect("decode error reported");
        assert!(error.contains("decode"), "unexpected error: {error}");
        let after = field_object(&sprite, "spriteFrame").expect("frame present");
        assert!(Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn modern_replacement_builds_the_image_asset_chain() {
        let (node, sprite) = sprite_node("n1");
        let original = field_object(&sprite, "spriteFrame").expect("frame present");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let replacer = make_replacer("3.8.0", scene, &["ImageAsset", "Texture2D", "SpriteFrame"]);

        let outcome = pollster::block_on(replacer.replace_sprite_texture("n1", &png_bytes(2, 3)));
        assert_eq!(outcome, ReplaceOutcome::ok());

        let frame = field_object(&sprite, "spriteFrame").expect("frame present");
        assert_eq!(class_of(&frame).as_deref(), Some("SpriteFrame"));
        assert_eq!(field_str(&frame, "name"), Some(String::new()));
        let texture = field_object(&frame, "texture").expect("texture");
        let asset = field_object(&texture, "image").expect("image asset");
        assert_eq!(field_f64(&asset, "width"), Some(2.0));
        assert_eq!(field_f64(&asset, "height"), Some(3.0));
        let data = field(&asset, "data").expect("pixel data");
        assert_eq!(data.as_bytes().map(<[u8]>::len), Some(2 * 3 * 4));

        // The pre-replacement frame is stashed on the node.
        let stashed = field_object(&node, STASH_KEY).expect("stash");
        assert!(Rc::ptr_eq(&stashed, &original));
    }

    #[test]
    fn legacy_replacement_carries_an_explicit_rect() {
        let (node, sprite) = sprite_node("n1");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node)]));
        let replacer = make_replacer("2.4.13", scene, &["Texture2D", "SpriteFrame"]);

        let outcome = pollster::block_on(replacer.replace_sprite_texture("n1", &png_bytes(4, 2)));
        assert_eq!(outcome, ReplaceOutcome::ok());

        let frame = field_object(&sprite, "spriteFrame").expect("frame present");
        let rect = field_object(&frame, "rect").expect("rect");
        assert_eq!(field_f64(&rect, "width"), Some(4.0));
        assert_eq!(field_f64(&rect, "height"), Some(2.0));
        let texture = field_object(&frame, "texture").expect("texture");
        assert!(field(&texture, "data").is_some());
        assert!(field_object(&texture, "image").is_none());
    }

    #[test]
    fn engines_without_construction_classes_are_rejected() {
        let (node, sprite) = sprite_node("n1");
        let before = field_object(&sprite, "spriteFrame").expect("frame present");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node)]));
        let replacer = make_replacer("3.8.0", scene, &[]);

        let outcome = pollster::block_on(replacer.replace_sprite_texture("n1", &png_bytes(1, 1)));
        assert_eq!(outcome, ReplaceOutcome::fail("unsupported engine version"));
        let after = field_object(&sprite, "spriteFrame").expect("frame present");
        assert!(Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn repeat_replacements_keep_the_first_stash() {
        let (node, sprite) = sprite_node("n1");
        let original = field_object(&sprite, "spriteFrame").expect("frame present");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let replacer = make_replacer("3.8.0", scene, &["ImageAsset"]);

        for _ in 0..2 {
            let outcome =
                pollster::block_on(replacer.replace_sprite_texture("n1", &png_bytes(1, 1)));
            assert!(outcome.success);
        }
        let stashed = field_object(&node, STASH_KEY).expect("stash");
        assert!(Rc::ptr_eq(&stashed, &original));
    }

    #[test]
    fn reset_restores_the_original_and_forgets_it() {
        let (node, sprite) = sprite_node("n1");
        let original = field_object(&sprite, "spriteFrame").expect("frame present");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let replacer = make_replacer("3.8.0", scene, &["ImageAsset"]);

        let outcome = pollster::block_on(replacer.replace_sprite_texture("n1", &png_bytes(1, 1)));
        assert!(outcome.success);
        assert!(!Rc::ptr_eq(
            &field_object(&sprite, "spriteFrame").expect("replaced frame"),
            &original
        ));

        assert_eq!(replacer.reset_sprite_texture("n1"), ReplaceOutcome::ok());
        let restored = field_object(&sprite, "spriteFrame").expect("frame present");
        assert!(Rc::ptr_eq(&restored, &original));
        assert!(field_object(&node, STASH_KEY).is_none());

        // The stash is gone, so a second reset has nothing to restore.
        assert_eq!(
            replacer.reset_sprite_texture("n1"),
            ReplaceOutcome::fail("no original texture saved")
        );
    }

    #[test]
    fn reset_without_any_replacement_fails() {
        let (node, _) = sprite_node("n1");
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node)]));
        let replacer = make_replacer("2.4.13", scene, &["Texture2D"]);

        assert_eq!(
            replacer.reset_sprite_texture("n1"),
            ReplaceOutcome::fail("no original texture saved")
        );
        assert_eq!(
            replacer.reset_sprite_texture("missing"),
            ReplaceOutcome::fail("node not found")
        );
    }
}
