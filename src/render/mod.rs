//! The paint pass: walks the scene in draw order and dispatches to a
//! host-provided `Painter`.
//!
//! The engine owns what to draw and in what order; the host owns how to
//! rasterize it. Animation frames are requested here, once per node per
//! paint, so the director sees every visible entity every frame.

use std::sync::Arc;

use image::RgbaImage;
use tracing::warn;

use crate::assets::{AssetLibrary, ImageSlot};
use crate::core::types::PlayerId;
use crate::level::AssetKind;
use crate::scene::{NodeKind, SceneGraph, SceneNode};
use crate::sprites::{AnimationDirector, FrameRequest};

/// Sprite name holding every emote animation.
pub const EMOTE_SPRITE: &str = "emotes";

/// Host-side drawing surface. Every method has a no-op default so hosts
/// implement only what they can draw. Coordinates are world units; the
/// host applies camera translation and zoom.
pub trait Painter {
    fn background(&mut self, _file: &str, _slot: &ImageSlot) {}
    fn grid(&mut self, _cell_size: u32, _color: &str, _line_width: f32) {}
    /// A character sprite centered at (x, y), scaled to `height`.
    fn character(&mut self, _id: &PlayerId, _x: f32, _y: f32, _height: f32, _frame: &Arc<RgbaImage>) {}
    /// The server's translucent copy of the local player.
    fn server_shadow(&mut self, _x: f32, _y: f32, _height: f32, _frame: &Arc<RgbaImage>) {}
    fn static_asset(&mut self, _file: &str, _x: f32, _y: f32, _slot: &ImageSlot) {}
    fn animated_asset(&mut self, _file: &str, _x: f32, _y: f32, _frame: &Arc<RgbaImage>) {}
    /// An emote frame above a player's head line.
    fn emote(&mut self, _player: &PlayerId, _x: f32, _head_y: f32, _frame: &Arc<RgbaImage>) {}
    fn chat_bubble(&mut self, _player: &PlayerId, _x: f32, _head_y: f32, _content: &str) {}
    fn player_stats(&mut self, _x: f32, _y: f32, _head_y: f32, _foot_y: f32) {}
    fn cursor_readout(&mut self) {}
    fn level_overlay(&mut self) {}
    fn windows(&mut self) {}
}

/// Walk the scene in draw order and paint every node.
///
/// Returns the players whose emote animation finished this paint; the
/// caller clears their emote state (and, for the local player, re-sends the
/// position without it).
pub fn paint<P: Painter>(
    scene: &mut SceneGraph,
    director: &mut AnimationDirector,
    assets: &AssetLibrary,
    painter: &mut P,
) -> Vec<PlayerId> {
    let order = scene.sorted_keys().to_vec();
    let mut finished_emotes = Vec::new();
    let mut measured = Vec::new();

    for key in &order {
        let Some(node) = scene.node(key).cloned() else {
            continue;
        };
        match node {
            SceneNode::Background { file, .. } => {
                painter.background(&file, &assets.image(&file));
            }
            SceneNode::Grid { cell_size, color, line_width, .. } => {
                painter.grid(cell_size, &color, line_width);
            }
            SceneNode::CurrentPlayer {
                id,
                x,
                y,
                height,
                head_y,
                action,
                character,
                emote,
                ..
            } => {
                let Some(character) = character else {
                    continue;
                };
                let animation_id = PlayerId::from(NodeKind::CurrentPlayer.key());
                let request =
                    director.request_animation(assets, &animation_id, action.as_deref(), &character);
                if let Some(frame) = request.ready() {
                    if let Some(player) = &id {
                        painter.character(player, x, y, height, frame);
                    }
                }
                if let (Some(player), Some(emote)) = (id, emote) {
                    paint_emote(director, assets, painter, &player, &emote, x, head_y, &mut finished_emotes);
                }
            }
            SceneNode::OtherPlayers { players, .. } => {
                for (id, player) in &players {
                    if let Some(emote) = &player.emote {
                        paint_emote(
                            director,
                            assets,
                            painter,
                            id,
                            emote,
                            player.x,
                            player.head_y,
                            &mut finished_emotes,
                        );
                    }
                    let Some(character) = &player.character else {
                        continue;
                    };
                    let request =
                        director.request_animation(assets, id, player.action.as_deref(), character);
                    if let Some(frame) = request.ready() {
                        painter.character(id, player.x, player.y, player.height, frame);
                    }
                }
            }
            SceneNode::ServerShadow { x, y, height, action, character, .. } => {
                let Some(character) = character else {
                    continue;
                };
                let animation_id = PlayerId::from(NodeKind::ServerShadow.key());
                let request =
                    director.request_animation(assets, &animation_id, action.as_deref(), &character);
                if let Some(frame) = request.ready() {
                    painter.server_shadow(x, y, height, frame);
                }
            }
            SceneNode::Asset { kind, file, x, y, width, .. } => match kind {
                AssetKind::Static => {
                    let slot = assets.image(&file);
                    if width == 0.0 {
                        if let Some((w, h)) = assets.image_size(&file) {
                            measured.push((key.clone(), w as f32, h as f32));
                        }
                    }
                    painter.static_asset(&file, x, y, &slot);
                }
                AssetKind::Animated => {
                    let animation_id = PlayerId(format!("anim_{file}_{x}_{y}"));
                    let request = director.request_animation(assets, &animation_id, None, &file);
                    if let Some(frame) = request.ready() {
                        painter.animated_asset(&file, x, y, frame);
                    }
                }
            },
            SceneNode::ChatBubble { player, content, current, .. } => {
                let anchor = bubble_anchor(scene, &player, current);
                let Some((x, head_y)) = anchor else {
                    warn!(player = %player, "no player node for chat bubble");
                    continue;
                };
                painter.chat_bubble(&player, x, head_y, &content);
            }
            SceneNode::PlayerStats { .. } => {
                if let Some(SceneNode::CurrentPlayer { x, y, head_y, foot_y, .. }) =
                    scene.node(NodeKind::CurrentPlayer.key())
                {
                    painter.player_stats(*x, *y, *head_y, *foot_y);
                }
                if let Some(SceneNode::OtherPlayers { players, .. }) =
                    scene.node(NodeKind::OtherPlayers.key())
                {
                    for player in players.values() {
                        painter.player_stats(player.x, player.y, player.head_y, player.foot_y);
                    }
                }
            }
            SceneNode::CursorReadout { .. } => painter.cursor_readout(),
            SceneNode::LevelOverlay { .. } => painter.level_overlay(),
            SceneNode::Windows { .. } => painter.windows(),
        }
    }

    for (key, width, height) in measured {
        scene.set_asset_size(&key, width, height);
    }

    finished_emotes
}

#[allow(clippy::too_many_arguments)]
fn paint_emote<P: Painter>(
    director: &mut AnimationDirector,
    assets: &AssetLibrary,
    painter: &mut P,
    player: &PlayerId,
    emote: &str,
    x: f32,
    head_y: f32,
    finished: &mut Vec<PlayerId>,
) {
    let animation_id = PlayerId(format!("emote_{player}"));
    match director.request_animation(assets, &animation_id, Some(emote), EMOTE_SPRITE) {
        FrameRequest::Ready(frame) => painter.emote(player, x, head_y, &frame),
        FrameRequest::Pending => {}
        FrameRequest::Finished | FrameRequest::Unconfigured => finished.push(player.clone()),
    }
}

fn bubble_anchor(scene: &SceneGraph, player: &PlayerId, current: bool) -> Option<(f32, f32)> {
    if current {
        match scene.node(NodeKind::CurrentPlayer.key()) {
            Some(SceneNode::CurrentPlayer { x, head_y, .. }) => Some((*x, *head_y)),
            _ => None,
        }
    } else {
        match scene.node(NodeKind::OtherPlayers.key()) {
            Some(SceneNode::OtherPlayers { players, .. }) => {
                players.get(player).map(|node| (node.x, node.head_y))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SheetKey;
    use crate::core::config::ClientConfig;
    use crate::sprites::config::{AnimationRow, SheetConfig, SpriteConfig, SpriteLibrary};
    use crate::store::PlayerStore;
    use crate::collision::CollisionEngine;

    #[derive(Default)]
    struct RecordingPainter {
        backgrounds: Vec<String>,
        characters: Vec<PlayerId>,
        emotes: Vec<PlayerId>,
        bubbles: Vec<String>,
        animated_assets: Vec<String>,
    }

    impl Painter for RecordingPainter {
        fn background(&mut self, file: &str, _slot: &ImageSlot) {
            self.backgrounds.push(file.to_string());
        }
        fn character(&mut self, id: &PlayerId, _x: f32, _y: f32, _height: f32, _frame: &Arc<RgbaImage>) {
            self.characters.push(id.clone());
        }
        fn emote(&mut self, player: &PlayerId, _x: f32, _head_y: f32, _frame: &Arc<RgbaImage>) {
            self.emotes.push(player.clone());
        }
        fn chat_bubble(&mut self, _player: &PlayerId, _x: f32, _head_y: f32, content: &str) {
            self.bubbles.push(content.to_string());
        }
        fn animated_asset(&mut self, file: &str, _x: f32, _y: f32, _frame: &Arc<RgbaImage>) {
            self.animated_assets.push(file.to_string());
        }
    }

    fn library() -> SpriteLibrary {
        let simple_sheet = |name: &str, action: &str, finite: bool| SheetConfig {
            name: name.to_string(),
            rows: 1,
            cols: 2,
            max_width: None,
            max_height: None,
            animations: vec![AnimationRow { row: 0, name: action.to_string(), finite }],
        };
        SpriteLibrary {
            sprites: vec![
                SpriteConfig {
                    name: "TheAdventurer".to_string(),
                    sheets: vec![simple_sheet("idle.png", "Sidle", false)],
                },
                SpriteConfig {
                    name: "campfire.png".to_string(),
                    sheets: vec![simple_sheet("campfire.png", "burn", false)],
                },
                SpriteConfig {
                    name: EMOTE_SPRITE.to_string(),
                    sheets: vec![simple_sheet("pop.png", "pop", true)],
                },
            ],
        }
    }

    fn assets() -> AssetLibrary {
        let mut assets = AssetLibrary::new();
        assets.insert_sheet(SheetKey::new("TheAdventurer", "idle.png"), RgbaImage::new(4, 2));
        assets.insert_sheet(SheetKey::new("campfire.png", "campfire.png"), RgbaImage::new(4, 2));
        assets.insert_sheet(SheetKey::new(EMOTE_SPRITE, "pop.png"), RgbaImage::new(4, 2));
        assets.insert_image("DemoMap_01.png", RgbaImage::new(64, 64));
        assets
    }

    fn populated_scene() -> (SceneGraph, PlayerStore) {
        let config = ClientConfig::default();
        let mut scene = SceneGraph::new(&config);
        let mut store = PlayerStore::new();
        let me = PlayerId::from("me");
        store.set_self_id(me.clone());
        store.initialize_player(me, 0.0, 0.0, 32.0, Some("TheAdventurer".to_string()));
        scene.update_positions(&store, &CollisionEngine::new());
        (scene, store)
    }

    #[test]
    fn test_paint_visits_background_and_player() {
        let (mut scene, _store) = populated_scene();
        let mut director = AnimationDirector::new(library(), &ClientConfig::default());
        let assets = assets();
        let mut painter = RecordingPainter::default();

        let finished = paint(&mut scene, &mut director, &assets, &mut painter);
        assert!(finished.is_empty());
        assert_eq!(painter.backgrounds, vec!["DemoMap_01.png"]);
        assert_eq!(painter.characters, vec![PlayerId::from("me")]);
    }

    #[test]
    fn test_animated_assets_draw_frames() {
        let (mut scene, _store) = populated_scene();
        scene.add_asset("campfire.png", 10.0, 10.0, AssetKind::Animated, 0.0, 2.0);
        let mut director = AnimationDirector::new(library(), &ClientConfig::default());
        let assets = assets();
        let mut painter = RecordingPainter::default();

        paint(&mut scene, &mut director, &assets, &mut painter);
        assert_eq!(painter.animated_assets, vec!["campfire.png"]);
    }

    #[test]
    fn test_finished_emote_is_reported_for_cleanup() {
        let (mut scene, mut store) = populated_scene();
        let me = PlayerId::from("me");
        store.set_player_position(&me, 0.0, 0.0, None, Some("pop".to_string()));
        scene.update_positions(&store, &CollisionEngine::new());

        let mut director = AnimationDirector::new(library(), &ClientConfig::default());
        let assets = assets();
        let mut painter = RecordingPainter::default();

        // First paint starts the finite emote.
        let finished = paint(&mut scene, &mut director, &assets, &mut painter);
        assert!(finished.is_empty());
        assert_eq!(painter.emotes, vec![me.clone()]);

        // Run the animation through its full cycle (2 cols): last frame,
        // then wrap to 0 with completed set.
        director.tick();
        paint(&mut scene, &mut director, &assets, &mut painter);
        director.tick();
        let finished = paint(&mut scene, &mut director, &assets, &mut painter);
        assert_eq!(finished, vec![me]);
    }

    #[test]
    fn test_bubble_skipped_without_player_node() {
        let config = ClientConfig::default();
        let mut scene = SceneGraph::new(&config);
        scene.create_chat_bubble(0, "hi", PlayerId::from("ghost"), false);

        let mut director = AnimationDirector::new(library(), &ClientConfig::default());
        let assets = assets();
        let mut painter = RecordingPainter::default();

        paint(&mut scene, &mut director, &assets, &mut painter);
        assert!(painter.bubbles.is_empty());
    }

    #[test]
    fn test_bubble_anchors_to_current_player() {
        let (mut scene, _store) = populated_scene();
        scene.create_chat_bubble(0, "hello there", PlayerId::from("me"), true);

        let mut director = AnimationDirector::new(library(), &ClientConfig::default());
        let assets = assets();
        let mut painter = RecordingPainter::default();

        paint(&mut scene, &mut director, &assets, &mut painter);
        assert_eq!(painter.bubbles, vec!["hello there"]);
    }
}
