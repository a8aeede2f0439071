//! The layer-sorted scene graph.
//!
//! Nodes live in a flat keyed collection; draw order is a stable sort by
//! layer, memoized until a node is added, removed, or re-layered. Singleton
//! nodes (background, grid, the current player) key by their kind; placed
//! assets and chat bubbles get generated keys.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::collision::{AssetFootprint, CenterRect, CollisionEngine, CornerRect, DepthPosition};
use crate::core::config::ClientConfig;
use crate::core::types::{Millis, PlayerId};
use crate::level::{AssetKind, LevelData};
use crate::store::PlayerStore;

/// Singleton node kinds, keyed by their fixed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Background,
    Grid,
    OtherPlayers,
    ServerShadow,
    CurrentPlayer,
    PlayerStats,
    Windows,
    CursorReadout,
    LevelOverlay,
}

impl NodeKind {
    pub fn key(self) -> &'static str {
        match self {
            NodeKind::Background => "background",
            NodeKind::Grid => "grid",
            NodeKind::OtherPlayers => "otherPlayers",
            NodeKind::ServerShadow => "serverShadow",
            NodeKind::CurrentPlayer => "currentPlayer",
            NodeKind::PlayerStats => "playerStats",
            NodeKind::Windows => "windows",
            NodeKind::CursorReadout => "cursorPosition",
            NodeKind::LevelOverlay => "levelOverlay",
        }
    }
}

/// One remote player inside the `OtherPlayers` node.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayerNode {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub head_y: f32,
    pub foot_y: f32,
    pub action: Option<String>,
    pub character: Option<String>,
    pub emote: Option<String>,
}

/// A drawable node. Layers follow the depth chart: 0 background, 0.5 grid,
/// 1 players, 2+ assets, 3 level overlay, 99 text UI, 100 windows.
#[derive(Debug, Clone)]
pub enum SceneNode {
    Background {
        layer: f32,
        file: String,
    },
    Grid {
        layer: f32,
        cell_size: u32,
        color: String,
        line_width: f32,
    },
    OtherPlayers {
        layer: f32,
        players: AHashMap<PlayerId, RemotePlayerNode>,
    },
    ServerShadow {
        layer: f32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        action: Option<String>,
        character: Option<String>,
    },
    CurrentPlayer {
        layer: f32,
        id: Option<PlayerId>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        head_y: f32,
        foot_y: f32,
        action: Option<String>,
        character: Option<String>,
        emote: Option<String>,
    },
    PlayerStats {
        layer: f32,
    },
    ChatBubble {
        layer: f32,
        current: bool,
        player: PlayerId,
        content: String,
        created_at: Millis,
        duration_ms: u64,
    },
    Asset {
        layer: f32,
        kind: AssetKind,
        file: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        depth_line: f32,
    },
    Windows {
        layer: f32,
    },
    CursorReadout {
        layer: f32,
    },
    LevelOverlay {
        layer: f32,
    },
}

impl SceneNode {
    pub fn layer(&self) -> f32 {
        match self {
            SceneNode::Background { layer, .. }
            | SceneNode::Grid { layer, .. }
            | SceneNode::OtherPlayers { layer, .. }
            | SceneNode::ServerShadow { layer, .. }
            | SceneNode::CurrentPlayer { layer, .. }
            | SceneNode::PlayerStats { layer }
            | SceneNode::ChatBubble { layer, .. }
            | SceneNode::Asset { layer, .. }
            | SceneNode::Windows { layer }
            | SceneNode::CursorReadout { layer }
            | SceneNode::LevelOverlay { layer } => *layer,
        }
    }
}

/// Flat keyed node collection with a memoized layer sort.
pub struct SceneGraph {
    nodes: AHashMap<String, SceneNode>,
    insertion_order: Vec<String>,
    sorted: Vec<String>,
    version: u64,
    sorted_version: u64,

    asset_counter: u64,
    bubble_expiries: AHashMap<PlayerId, (String, Millis)>,

    entity_width: f32,
    entity_height: f32,
    bubble_duration_ms: u64,
}

impl SceneGraph {
    /// Build the default tree: background, current player, other players,
    /// and the window layer.
    pub fn new(config: &ClientConfig) -> Self {
        let mut graph = Self {
            nodes: AHashMap::new(),
            insertion_order: Vec::new(),
            sorted: Vec::new(),
            version: 1,
            sorted_version: 0,
            asset_counter: 0,
            bubble_expiries: AHashMap::new(),
            entity_width: config.entity_width,
            entity_height: config.entity_height,
            bubble_duration_ms: config.bubble_duration_ms,
        };
        graph.add_node(NodeKind::Background);
        graph.add_node(NodeKind::CurrentPlayer);
        graph.add_node(NodeKind::OtherPlayers);
        graph.add_node(NodeKind::Windows);
        graph
    }

    fn default_node(&self, kind: NodeKind) -> SceneNode {
        match kind {
            NodeKind::Background => SceneNode::Background {
                layer: 0.0,
                file: "DemoMap_01.png".to_string(),
            },
            NodeKind::Grid => SceneNode::Grid {
                layer: 0.5,
                cell_size: 64,
                color: "#FFFFFF".to_string(),
                line_width: 1.0,
            },
            NodeKind::OtherPlayers => SceneNode::OtherPlayers {
                layer: 1.0,
                players: AHashMap::new(),
            },
            NodeKind::ServerShadow => SceneNode::ServerShadow {
                layer: 1.0,
                x: 0.0,
                y: 0.0,
                width: self.entity_width,
                height: self.entity_height,
                action: None,
                character: None,
            },
            NodeKind::CurrentPlayer => SceneNode::CurrentPlayer {
                layer: 1.0,
                id: None,
                x: 0.0,
                y: 0.0,
                width: self.entity_width,
                height: self.entity_height,
                head_y: 0.0,
                foot_y: 0.0,
                action: None,
                character: None,
                emote: None,
            },
            NodeKind::PlayerStats => SceneNode::PlayerStats { layer: 1.0 },
            NodeKind::Windows => SceneNode::Windows { layer: 100.0 },
            NodeKind::CursorReadout => SceneNode::CursorReadout { layer: 99.0 },
            NodeKind::LevelOverlay => SceneNode::LevelOverlay { layer: 3.0 },
        }
    }

    /// Insert a singleton node with its default configuration.
    pub fn add_node(&mut self, kind: NodeKind) {
        self.insert(kind.key().to_string(), self.default_node(kind));
    }

    fn insert(&mut self, key: String, node: SceneNode) {
        if !self.nodes.contains_key(&key) {
            self.insertion_order.push(key.clone());
        }
        self.nodes.insert(key, node);
        self.version += 1;
    }

    pub fn remove_node(&mut self, key: &str) -> bool {
        let removed = self.nodes.remove(key).is_some();
        if removed {
            self.insertion_order.retain(|existing| existing != key);
            self.version += 1;
        } else {
            debug!(key, "remove of missing node ignored");
        }
        removed
    }

    pub fn node(&self, key: &str) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: &str) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn has_node(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Current mutation version; bumped on every structural or layer change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Keys in draw order: a stable sort by layer, ties broken by insertion
    /// order. Memoized against the version counter, so repeated reads
    /// between mutations are free.
    pub fn sorted_keys(&mut self) -> &[String] {
        if self.sorted_version != self.version {
            let mut keys = self.insertion_order.clone();
            keys.sort_by_key(|key| {
                OrderedFloat(self.nodes.get(key).map(SceneNode::layer).unwrap_or(0.0))
            });
            self.sorted = keys;
            self.sorted_version = self.version;
        }
        &self.sorted
    }

    // --- Assets ---

    /// Place an asset node and return its generated key.
    pub fn add_asset(
        &mut self,
        file: impl Into<String>,
        x: f32,
        y: f32,
        kind: AssetKind,
        depth_line: f32,
        layer: f32,
    ) -> String {
        let key = format!("asset_{}", self.asset_counter);
        self.asset_counter += 1;
        self.insert(
            key.clone(),
            SceneNode::Asset {
                layer,
                kind,
                file: file.into(),
                x,
                y,
                width: 0.0,
                height: 0.0,
                depth_line,
            },
        );
        key
    }

    /// Record an asset's pixel dimensions once its image has been measured.
    /// Zero-sized assets are excluded from the depth pass until then.
    pub fn set_asset_size(&mut self, key: &str, width: f32, height: f32) {
        match self.nodes.get_mut(key) {
            Some(SceneNode::Asset { width: w, height: h, .. }) => {
                *w = width;
                *h = height;
                self.version += 1;
            }
            _ => warn!(key, "asset size for missing node"),
        }
    }

    /// Add nodes for every asset a level places. Animated assets carry the
    /// entity box; static assets are measured from their image later.
    pub fn load_level(&mut self, level: &LevelData) {
        for asset in &level.static_assets {
            self.add_asset(
                asset.file.clone(),
                asset.x,
                asset.y,
                AssetKind::Static,
                asset.depth_line,
                asset.layer,
            );
        }
        for asset in &level.animated_assets {
            self.add_asset(asset.file.clone(), asset.x, asset.y, AssetKind::Animated, 0.0, 2.0);
        }
    }

    // --- Visibility toggles ---

    pub fn set_grid_visible(&mut self, visible: bool) {
        if visible {
            self.add_node(NodeKind::Grid);
        } else {
            self.remove_node(NodeKind::Grid.key());
        }
    }

    pub fn set_cursor_readout_visible(&mut self, visible: bool) {
        if visible {
            self.add_node(NodeKind::CursorReadout);
        } else {
            self.remove_node(NodeKind::CursorReadout.key());
        }
    }

    pub fn set_player_stats_visible(&mut self, visible: bool) {
        if visible {
            self.add_node(NodeKind::PlayerStats);
        } else {
            self.remove_node(NodeKind::PlayerStats.key());
        }
    }

    pub fn set_level_overlay_visible(&mut self, visible: bool) {
        if visible {
            self.add_node(NodeKind::LevelOverlay);
        } else {
            self.remove_node(NodeKind::LevelOverlay.key());
        }
    }

    pub fn toggle_server_shadow(&mut self) {
        if self.has_node(NodeKind::ServerShadow.key()) {
            self.remove_node(NodeKind::ServerShadow.key());
        } else {
            self.add_node(NodeKind::ServerShadow);
        }
    }

    // --- Chat bubbles ---

    /// Create (or replace) a player's chat bubble. A replacement restarts
    /// the lifetime.
    pub fn create_chat_bubble(
        &mut self,
        now: Millis,
        content: impl Into<String>,
        player: PlayerId,
        current: bool,
    ) {
        let kind = if current { "currentPlayerBubble" } else { "otherPlayerBubble" };
        let key = format!("{kind}-{player}");
        self.remove_node(&key);
        self.insert(
            key.clone(),
            SceneNode::ChatBubble {
                layer: 1.0,
                current,
                player: player.clone(),
                content: content.into(),
                created_at: now,
                duration_ms: self.bubble_duration_ms,
            },
        );
        self.bubble_expiries.insert(player, (key, now + self.bubble_duration_ms));
    }

    /// Remove bubbles whose lifetime has elapsed.
    pub fn expire_bubbles(&mut self, now: Millis) {
        let expired: Vec<(PlayerId, String)> = self
            .bubble_expiries
            .iter()
            .filter(|(_, (_, at))| now >= *at)
            .map(|(player, (key, _))| (player.clone(), key.clone()))
            .collect();
        for (player, key) in expired {
            self.remove_node(&key);
            self.bubble_expiries.remove(&player);
        }
    }

    // --- Player sync ---

    /// Rebuild player nodes from the store and re-layer the current player
    /// against overlapping assets.
    ///
    /// Overlap resolution mirrors the depth chart: an asset the player
    /// stands in front of pushes the player above its layer; one the player
    /// stands behind pulls the player below it. Later hits win.
    pub fn update_positions(&mut self, store: &PlayerStore, engine: &CollisionEngine) {
        let self_id = store.self_id().cloned();

        // Other players are rebuilt wholesale from the roster.
        let (entity_width, entity_height) = (self.entity_width, self.entity_height);
        if let Some(SceneNode::OtherPlayers { players, .. }) =
            self.nodes.get_mut(NodeKind::OtherPlayers.key())
        {
            players.clear();
            for (id, state) in store.players() {
                if Some(id) == self_id.as_ref() {
                    continue;
                }
                players.insert(
                    id.clone(),
                    RemotePlayerNode {
                        id: id.clone(),
                        x: state.x,
                        y: state.y,
                        width: entity_width,
                        height: entity_height,
                        head_y: state.head_y,
                        foot_y: state.foot_y,
                        action: state.action.clone(),
                        character: state.character.clone(),
                        emote: state.emote.clone(),
                    },
                );
            }
        }

        // Merge the current player's state into its node.
        let mut player_rect = None;
        if let Some(state) = store.current_player() {
            if let Some(SceneNode::CurrentPlayer {
                id,
                x,
                y,
                width,
                height,
                head_y,
                foot_y,
                action,
                character,
                emote,
                ..
            }) = self.nodes.get_mut(NodeKind::CurrentPlayer.key())
            {
                *id = Some(state.id.clone());
                *x = state.x;
                *y = state.y;
                *width = entity_width;
                *height = entity_height;
                *head_y = state.head_y;
                *foot_y = state.foot_y;
                *action = state.action.clone();
                *character = state.character.clone();
                *emote = state.emote.clone();
                player_rect = Some(CornerRect {
                    x: state.x - entity_width / 2.0,
                    y: state.y - entity_height / 2.0,
                    width: entity_width,
                    height: entity_height,
                });
            }
        }

        // Mirror the server's copy of the self into the shadow, if shown.
        if let Some(shadow) = store.server_self().cloned() {
            if let Some(SceneNode::ServerShadow { x, y, action, character, .. }) =
                self.nodes.get_mut(NodeKind::ServerShadow.key())
            {
                *x = shadow.x;
                *y = shadow.y;
                *action = shadow.action;
                *character = shadow.character;
            }
        }

        let Some(player_rect) = player_rect else {
            return;
        };

        let footprints: Vec<AssetFootprint> = self
            .insertion_order
            .iter()
            .filter_map(|key| match self.nodes.get(key) {
                Some(SceneNode::Asset { file, x, y, width, height, depth_line, .. }) => {
                    Some(AssetFootprint {
                        key: key.clone(),
                        file: file.clone(),
                        rect: CenterRect { x: *x, y: *y, width: *width, height: *height },
                        depth_line: *depth_line,
                    })
                }
                _ => None,
            })
            .collect();

        let hits = engine.depth_pass(&player_rect, &footprints);
        if hits.is_empty() {
            return;
        }

        let mut new_layer: f32 = 1.0;
        for hit in &hits {
            let asset_layer = self
                .nodes
                .get(&hit.key)
                .map(SceneNode::layer)
                .unwrap_or(2.0);
            match hit.position {
                DepthPosition::Low => new_layer = new_layer.max(asset_layer + 1.0),
                DepthPosition::High => new_layer = (asset_layer - 1.0).max(1.0),
            }
        }

        if let Some(node) = self.nodes.get_mut(NodeKind::CurrentPlayer.key()) {
            if let SceneNode::CurrentPlayer { layer, .. } = node {
                if *layer != new_layer {
                    *layer = new_layer;
                    self.version += 1;
                }
            }
        }
    }
}
