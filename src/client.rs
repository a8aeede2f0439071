//! The engine facade: owns every subsystem and drives the frame loop.
//!
//! The host feeds in decoded images, network events, raw key events, and a
//! monotonic clock; the engine turns those into store updates, scene
//! changes, and outbound position messages. `advance` runs the simulation
//! to `now`, `frame` paints the current scene.

use tracing::info;

use crate::assets::AssetLibrary;
use crate::camera::Camera;
use crate::collision::CollisionEngine;
use crate::core::config::ClientConfig;
use crate::core::types::{Millis, PlayerId};
use crate::input::{emote_for_key, InputSampler, MoveKey};
use crate::level::LevelData;
use crate::movement::MovementResolver;
use crate::net::{NetworkEvent, NetworkSink, PositionUpdate};
use crate::render::{paint, Painter};
use crate::scene::SceneGraph;
use crate::sprites::{AnimationDirector, SpriteLibrary};
use crate::store::PlayerStore;

/// Character assigned to players whose handshake carries none.
const DEFAULT_CHARACTER: &str = "TheFemaleAdventurer";

pub struct GameClient<N: NetworkSink> {
    config: ClientConfig,
    pub assets: AssetLibrary,
    pub camera: Camera,
    pub store: PlayerStore,
    pub scene: SceneGraph,
    pub director: AnimationDirector,
    resolver: MovementResolver,
    input: InputSampler,
    collision: CollisionEngine,
    level: Option<LevelData>,
    sink: N,
}

impl<N: NetworkSink> GameClient<N> {
    pub fn new(
        config: ClientConfig,
        sprites: SpriteLibrary,
        screen_width: f32,
        screen_height: f32,
        sink: N,
    ) -> Self {
        Self {
            camera: Camera::new(&config, screen_width, screen_height),
            scene: SceneGraph::new(&config),
            director: AnimationDirector::new(sprites, &config),
            resolver: MovementResolver::new(&config),
            input: InputSampler::new(&config),
            collision: CollisionEngine::new(),
            assets: AssetLibrary::new(),
            store: PlayerStore::new(),
            level: None,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn level(&self) -> Option<&LevelData> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut LevelData> {
        self.level.as_mut()
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Install the level: its assets become scene nodes and its barriers
    /// constrain movement from here on.
    pub fn load_level(&mut self, level: LevelData) {
        self.scene.load_level(&level);
        self.level = Some(level);
    }

    /// Publish the decoded background map and propagate its dimensions as
    /// the camera's map bounds.
    pub fn set_background_decoded(&mut self, file: impl Into<String>, image: image::RgbaImage) {
        let (width, height) = (image.width() as f32, image.height() as f32);
        self.assets.insert_image(file, image);
        self.camera.set_map_bounds(width, height);
    }

    pub fn handle_network_event(&mut self, event: NetworkEvent, now: Millis) {
        match event {
            NetworkEvent::Init(payload) => {
                info!(player = %payload.id, "handshake complete");
                self.store.set_self_id(payload.id.clone());
                self.camera.move_to_position(payload.x, payload.y);
                let character = payload
                    .character
                    .unwrap_or_else(|| DEFAULT_CHARACTER.to_string());
                self.store.initialize_player(
                    payload.id,
                    payload.x,
                    payload.y,
                    payload.base_height,
                    Some(character),
                );
                self.scene.update_positions(&self.store, &self.collision);
            }
            NetworkEvent::Roster(roster) => {
                self.store.apply_server_roster(&roster, self.config.entity_height);
                self.scene.update_positions(&self.store, &self.collision);
            }
            NetworkEvent::Chat(message) => {
                let current = self.store.self_id() == Some(&message.player_id);
                self.scene
                    .create_chat_bubble(now, message.content, message.player_id, current);
            }
            NetworkEvent::Disconnect(id) => {
                self.store.remove_player(&id);
                self.director.remove_state(&id);
                self.scene.update_positions(&self.store, &self.collision);
            }
        }
    }

    pub fn key_down(&mut self, key: MoveKey) {
        self.input.press(key);
    }

    pub fn key_up(&mut self, key: MoveKey, now: Millis) {
        self.input.release(key, now);
    }

    /// Play the emote bound to a digit key, if any.
    pub fn emote_key(&mut self, key: char) {
        if let Some(label) = emote_for_key(key) {
            self.emote(label);
        }
    }

    /// Play an emote on the local player: position and action are resent
    /// unchanged with the emote attached.
    pub fn emote(&mut self, label: &str) {
        let Some(id) = self.store.self_id().cloned() else {
            return;
        };
        let Some(player) = self.store.player(&id) else {
            return;
        };
        let (x, y, action) = (player.x, player.y, player.action.clone());
        self.apply_movement(&id, x, y, action, Some(label.to_string()));
    }

    /// Step the zoom one notch and re-center the camera at the new zoom.
    pub fn zoom(&mut self, zoom_in: bool) {
        if let Some(zoom) = self.resolver.handle_zoom(zoom_in) {
            self.camera.set_zoom(zoom);
        }
    }

    /// Run the simulation to `now`: sample input into validated movement,
    /// fire the idle demotion, advance animations, expire chat bubbles.
    pub fn advance(&mut self, now: Millis) {
        let commands = self.input.advance(now);
        if let Some(id) = self.store.self_id().cloned() {
            for command in commands {
                let resolved = self.resolver.validate(
                    now,
                    &self.store,
                    self.level.as_ref(),
                    &id,
                    command.dx,
                    command.dy,
                    Some(command.direction),
                );
                if let Some(resolved) = resolved {
                    self.apply_movement(&id, resolved.x, resolved.y, Some(resolved.action), None);
                }
            }
        }

        if let Some((id, resolved)) = self.resolver.poll_idle(now, &self.store) {
            self.apply_movement(&id, resolved.x, resolved.y, Some(resolved.action), None);
        }

        self.director.advance(now);
        self.scene.expire_bubbles(now);
    }

    /// Paint the scene. Emotes that finished this frame are cleared; the
    /// local player's clear is resent so the server drops it too.
    pub fn frame<P: Painter>(&mut self, painter: &mut P) {
        let finished = paint(&mut self.scene, &mut self.director, &self.assets, painter);
        for player in finished {
            if self.store.self_id() == Some(&player) {
                if let Some(state) = self.store.player(&player) {
                    let (x, y, action) = (state.x, state.y, state.action.clone());
                    self.apply_movement(&player, x, y, action, None);
                }
            }
        }
    }

    /// The single write path for local player movement: camera follows,
    /// store updates, the server hears about it, and the scene re-syncs.
    fn apply_movement(
        &mut self,
        id: &PlayerId,
        x: f32,
        y: f32,
        action: Option<String>,
        emote: Option<String>,
    ) {
        self.camera.move_to_position(x, y);
        self.store.set_player_position(id, x, y, action.clone(), emote.clone());
        let character = self.store.player(id).and_then(|p| p.character.clone());
        self.sink.send_position(&PositionUpdate {
            x,
            y,
            current_action_state: action,
            character,
            emote_state: emote,
        });
        self.scene.update_positions(&self.store, &self.collision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{InitPayload, RecordingSink};

    fn client() -> GameClient<RecordingSink> {
        GameClient::new(
            ClientConfig::default(),
            SpriteLibrary::default(),
            800.0,
            600.0,
            RecordingSink::default(),
        )
    }

    fn init(client: &mut GameClient<RecordingSink>) -> PlayerId {
        let id = PlayerId::from("me");
        client.handle_network_event(
            NetworkEvent::Init(InitPayload {
                id: id.clone(),
                x: 0.0,
                y: 0.0,
                base_height: 32.0,
                character: None,
            }),
            0,
        );
        id
    }

    #[test]
    fn test_init_seeds_store_and_default_character() {
        let mut client = client();
        let id = init(&mut client);
        let player = client.store.player(&id).unwrap();
        assert_eq!(player.character.as_deref(), Some("TheFemaleAdventurer"));
        assert_eq!(client.store.self_id(), Some(&id));
    }

    #[test]
    fn test_held_key_moves_player_and_notifies_server() {
        let mut client = client();
        let id = init(&mut client);

        client.advance(0);
        client.key_down(MoveKey::Down);
        client.advance(16);

        let player = client.store.player(&id).unwrap();
        assert_eq!(player.y, 10.0);
        assert_eq!(player.action.as_deref(), Some("Swalk"));
        assert_eq!(client.sink().sent.len(), 1);
        assert_eq!(client.sink().sent[0].y, 10.0);
    }

    #[test]
    fn test_idle_demotion_after_release() {
        let mut client = client();
        let id = init(&mut client);

        client.advance(0);
        client.key_down(MoveKey::Down);
        client.advance(16);
        client.key_up(MoveKey::Down, 16);

        // Past the idle threshold the action demotes without moving.
        client.advance(200);
        let player = client.store.player(&id).unwrap();
        assert_eq!(player.action.as_deref(), Some("Sidle"));
        assert_eq!(player.y, 10.0);
    }

    #[test]
    fn test_emote_resends_position_with_label() {
        let mut client = client();
        let id = init(&mut client);
        client.emote("pop");

        let player = client.store.player(&id).unwrap();
        assert_eq!(player.emote.as_deref(), Some("pop"));
        let sent = client.sink().sent.last().unwrap();
        assert_eq!(sent.emote_state.as_deref(), Some("pop"));
    }

    #[test]
    fn test_digit_key_plays_bound_emote() {
        let mut client = client();
        let id = init(&mut client);

        client.emote_key('1');
        assert_eq!(client.store.player(&id).unwrap().emote.as_deref(), Some("pop"));
        assert_eq!(client.sink().sent.len(), 1);

        // Unbound keys do nothing.
        client.emote_key('0');
        assert_eq!(client.sink().sent.len(), 1);
    }

    #[test]
    fn test_zoom_clamps_at_range_edges() {
        let mut client = client();
        client.zoom(true);
        assert_eq!(client.camera.zoom, 4.0);
        for _ in 0..20 {
            client.zoom(true);
        }
        assert_eq!(client.camera.zoom, 10.0);
    }

    #[test]
    fn test_background_sets_map_bounds() {
        let mut client = client();
        client.set_background_decoded("DemoMap_01.png", image::RgbaImage::new(640, 480));
        assert_eq!(client.camera.map_bounds(), Some(glam::Vec2::new(640.0, 480.0)));
    }
}
